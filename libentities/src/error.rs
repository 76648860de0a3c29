//! Error types and diagnostics for entities file parsing.
//!
//! Grammar problems are never returned as Rust errors. They are recorded in a
//! [`Diagnostics`] sink and parsing carries on with the next construct. Only
//! file-level faults surface as [`EntitiesError`].

use std::path::PathBuf;

use thiserror::Error;
use tracing::trace;

/// Result type for file-level entities operations.
pub type Result<T> = std::result::Result<T, EntitiesError>;

/// Faults raised outside the grammar: missing source, unreadable input,
/// unwritable destination.
#[derive(Error, Debug)]
pub enum EntitiesError {
    /// The source path does not exist. Raised before anything is read.
    #[error("Entities file not found in path: {}", .0.display())]
    NotFound(PathBuf),

    /// Reading or writing failed at the I/O layer.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Parse context carrying the source name for log events.
#[derive(Clone, Debug, Default)]
pub struct ParseContext {
    pub filename: Option<String>,
}

impl ParseContext {
    /// Create a new parse context.
    pub fn new(filename: Option<&str>) -> Self {
        Self {
            filename: filename.map(String::from),
        }
    }

    /// Name used for this source in log events.
    pub fn source_name(&self) -> &str {
        self.filename.as_deref().unwrap_or("<memory>")
    }
}

/// Accumulated warnings and errors of one parse invocation.
///
/// Each entry reads `Line <n>: <message>`, with `n` the 1-based physical line
/// of the source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a grammar violation.
    pub fn error(&mut self, line: usize, message: impl AsRef<str>) {
        let entry = format!("Line {}: {}", line, message.as_ref());
        trace!(diagnostic = %entry, "error");
        self.errors.push(entry);
    }

    /// Record a structurally valid but suspicious construct.
    pub fn warning(&mut self, line: usize, message: impl AsRef<str>) {
        let entry = format!("Line {}: {}", line, message.as_ref());
        trace!(diagnostic = %entry, "warning");
        self.warnings.push(entry);
    }

    /// `true` when nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty() && self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_are_line_prefixed() {
        let mut diags = Diagnostics::new();
        diags.error(3, "missing ';'");
        diags.warning(7, "suspicious");
        assert_eq!(diags.errors, vec!["Line 3: missing ';'"]);
        assert_eq!(diags.warnings, vec!["Line 7: suspicious"]);
        assert!(!diags.is_empty());
    }

    #[test]
    fn test_not_found_message() {
        let err = EntitiesError::NotFound(PathBuf::from("maps/e1m1.entities"));
        assert_eq!(
            err.to_string(),
            "Entities file not found in path: maps/e1m1.entities"
        );
    }

    #[test]
    fn test_source_name() {
        assert_eq!(ParseContext::new(None).source_name(), "<memory>");
        assert_eq!(ParseContext::new(Some("a.entities")).source_name(), "a.entities");
    }
}
