//! Reader and writer for id Tech entities files.
//!
//! An entities file lists the objects of a game level. Each `entity` block
//! carries optional layers, an instance id and an original name, plus an
//! `entityDef` holding a tree of named properties.
//!
//! # Parsing Pipeline
//!
//! 1. **Scanner**: Trims each physical line, drops blank ones and keeps the
//!    line number with the text.
//!
//! 2. **Entity Reader**: Reads the header lines, then cuts the line stream
//!    into `entity` blocks by counting the braces that end each line.
//!
//! 3. **Property Parser**: Recursively turns an `entityDef` block into
//!    properties, deciding array or object for every nested block and parsing
//!    scalars at the leaves.
//!
//! Parsing does not stop at the first problem. Every grammar violation is
//! recorded as a `Line <n>: <message>` entry and the reader carries on, so a
//! [`ParseResult`] always holds a document along with its errors and
//! warnings. Only file-level faults are returned as [`EntitiesError`].

mod document;
mod encode;
mod error;
mod parser;
mod reader;
mod scanner;
mod value;

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use tracing::debug;

pub use document::{
    is_valid_entity_def_name, is_valid_property_name, Document, Entity, EntityDef,
    EntityProperty,
};
pub use encode::{encode, encode_entity};
pub use error::{Diagnostics, EntitiesError, ParseContext, Result};
pub use parser::parse_scalar;
pub use reader::ParseResult;
pub use value::{PropertyValue, ValueKind};

use reader::EntityReader;
use scanner::{scan, scan_line, Line};

/// Parse entities text held in memory.
///
/// # Example
///
/// ```
/// use libentities::parse;
///
/// let result = parse("entity {\n\tentityDef light {\n\t\tradius = 2.5;\n\t}\n}\n");
/// assert!(result.errors.is_empty());
/// assert_eq!(result.document.entities.len(), 1);
/// ```
pub fn parse(input: &str) -> ParseResult {
    parse_with_filename(input, None)
}

/// Parse entities text with a source name for log events.
pub fn parse_with_filename(input: &str, filename: Option<&str>) -> ParseResult {
    let ctx = ParseContext::new(filename);
    let result = read_lines(scan(input));
    log_summary(&result, &ctx);
    result
}

/// Parse entities text from any buffered reader.
///
/// Fails only when the reader does, including on input that is not UTF-8.
pub fn parse_reader<R: BufRead>(reader: R) -> Result<ParseResult> {
    parse_reader_with_context(reader, &ParseContext::default())
}

fn parse_reader_with_context<R: BufRead>(reader: R, ctx: &ParseContext) -> Result<ParseResult> {
    // Reading stops at the first I/O failure, which then replaces the result.
    let mut failure = None;
    let lines = reader
        .lines()
        .enumerate()
        .map_while(|(i, raw)| match raw {
            Ok(raw) => Some((i, raw)),
            Err(err) => {
                failure = Some(err);
                None
            }
        })
        .filter_map(|(i, raw)| scan_line(i + 1, &raw));

    let result = read_lines(lines);
    if let Some(err) = failure {
        return Err(err.into());
    }

    log_summary(&result, ctx);
    Ok(result)
}

/// Parse an entities file.
///
/// A missing path is [`EntitiesError::NotFound`]. The file is read line by
/// line and only the entity currently being read is kept in memory.
pub fn parse_file(path: impl AsRef<Path>) -> Result<ParseResult> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(EntitiesError::NotFound(path.to_path_buf()));
    }

    let ctx = ParseContext::new(path.to_str());
    debug!(file = %ctx.source_name(), "reading entities file");

    let file = File::open(path)?;
    parse_reader_with_context(BufReader::new(file), &ctx)
}

/// Write a document to `path` in canonical form, replacing any existing file.
pub fn write_file(document: &Document, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let text = encode(document);

    let mut out = BufWriter::new(File::create(path)?);
    out.write_all(text.as_bytes())?;
    out.flush()?;

    debug!(
        file = %path.display(),
        entities = document.entities.len(),
        "wrote entities file"
    );
    Ok(())
}

/// Run scanned lines through the entity reader.
fn read_lines(lines: impl Iterator<Item = Line>) -> ParseResult {
    let mut diags = Diagnostics::new();
    let mut reader = EntityReader::new(&mut diags);
    for line in lines {
        reader.feed(line);
    }
    let document = reader.finish();
    ParseResult::new(document, diags)
}

fn log_summary(result: &ParseResult, ctx: &ParseContext) {
    debug!(
        source = %ctx.source_name(),
        entities = result.document.entities.len(),
        errors = result.errors.len(),
        warnings = result.warnings.len(),
        "parsed entities"
    );
}
