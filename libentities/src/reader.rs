//! Phase 2: Entity Reader
//!
//! The reader consumes scanned lines one at a time. It recognizes the
//! `Version` and `HierarchyVersion` headers, cuts the stream into `entity`
//! blocks by brace counting, and parses each finished block into an
//! [`Entity`]. Only the block currently being read is held in memory.

use std::mem;

use tracing::trace;

use crate::document::{Document, Entity};
use crate::error::Diagnostics;
use crate::parser::{parse_entity_def, parse_scalar, split_assignment};
use crate::scanner::{find_block, BraceCounter, Line};
use crate::value::PropertyValue;

/// Outcome of parsing one entities source.
///
/// The document holds every entity that could be built, even when `errors`
/// is non-empty.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseResult {
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    pub document: Document,
}

impl ParseResult {
    pub(crate) fn new(document: Document, diags: Diagnostics) -> Self {
        Self {
            warnings: diags.warnings,
            errors: diags.errors,
            document,
        }
    }

    /// No errors and no warnings were recorded.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

/// Streaming splitter from lines to entities.
pub(crate) struct EntityReader<'d> {
    diags: &'d mut Diagnostics,
    document: Document,
    /// Lines of the entity block being read. Empty between blocks.
    block: Vec<Line>,
    braces: BraceCounter,
    /// Headers are only recognized before the first entity block.
    in_header: bool,
    last_line: usize,
}

impl<'d> EntityReader<'d> {
    pub(crate) fn new(diags: &'d mut Diagnostics) -> Self {
        Self {
            diags,
            document: Document::new(),
            block: Vec::new(),
            braces: BraceCounter::default(),
            in_header: true,
            last_line: 0,
        }
    }

    /// Consume the next non-blank line.
    pub(crate) fn feed(&mut self, line: Line) {
        self.last_line = line.number;
        if self.block.is_empty() {
            self.feed_between_entities(line);
        } else {
            self.feed_inside_entity(line);
        }
    }

    /// End of input. A block still open is reported and parsed as is.
    pub(crate) fn finish(mut self) -> Document {
        if !self.block.is_empty() {
            self.diags.error(self.last_line, "missing '}'");
            self.flush();
        }
        self.document
    }

    fn feed_between_entities(&mut self, line: Line) {
        if self.in_header && self.read_header(&line) {
            return;
        }

        if is_entity_start(&line.text) {
            self.open_entity(line);
        } else if line.text == "entity" {
            self.diags.error(line.number, "missing '{'");
        } else {
            self.diags
                .error(line.number, format!("unexpected '{}'", line.text));
        }
    }

    fn feed_inside_entity(&mut self, line: Line) {
        self.braces.count(&line);

        let bare = line.text == "entity";
        if bare {
            self.diags.error(line.number, "missing '{'");
        }

        if bare || is_entity_start(&line.text) {
            // The new entity's own `{` has just been counted.
            let expected = if line.opens_block() {
                self.braces.opened - 1
            } else {
                self.braces.opened
            };
            if expected != self.braces.closed {
                self.diags.error(line.number, "missing '}'");
            }
            self.flush();
            self.open_entity(line);
            return;
        }

        self.block.push(line);
        if self.braces.is_balanced() {
            self.flush();
        }
    }

    /// Recognize `Version X` or `HierarchyVersion X`.
    fn read_header(&mut self, line: &Line) -> bool {
        let parts: Vec<&str> = line.text.split(' ').collect();
        match parts.as_slice() {
            ["Version", value] => {
                self.document.format_version = Some(value.to_string());
                true
            }
            ["HierarchyVersion", value] => {
                self.document.hierarchy_version = Some(value.to_string());
                true
            }
            _ => false,
        }
    }

    fn open_entity(&mut self, line: Line) {
        self.in_header = false;
        self.braces = BraceCounter {
            opened: 1,
            closed: 0,
        };
        self.block.push(line);
    }

    /// Parse the buffered block and keep the entity if its entityDef parsed.
    fn flush(&mut self) {
        let lines = mem::take(&mut self.block);
        self.braces = BraceCounter::default();

        let entity = parse_entity(&lines, self.diags);
        let Some(def) = &entity.entity_def else {
            trace!(line = lines[0].number, "entity dropped without entityDef");
            return;
        };
        trace!(def = %def.name, line = lines[0].number, "entity");
        self.document.entities.push(entity);
    }
}

/// `entity {` or `entity{`.
fn is_entity_start(text: &str) -> bool {
    text == "entity {" || text == "entity{"
}

/// Lines inside an entity block that carry no data.
fn is_structural(text: &str) -> bool {
    matches!(text, "entity {" | "entity{" | "entity" | "{" | "}")
}

/// The identifier a line starts with, up to whitespace, `=` or `{`.
fn leading_keyword(text: &str) -> &str {
    let end = text
        .find(|c: char| c.is_whitespace() || c == '=' || c == '{')
        .unwrap_or(text.len());
    &text[..end]
}

// ============================================================================
// Entity Parsing
// ============================================================================

/// Parse one entity block into its fields.
///
/// The returned entity has no entityDef when the def was missing or failed to
/// parse; the caller decides whether to keep it.
pub(crate) fn parse_entity(lines: &[Line], diags: &mut Diagnostics) -> Entity {
    let mut entity = Entity::default();
    let mut i = 0;

    while i < lines.len() {
        let line = &lines[i];

        if line.text == "layers {" || line.text == "layers{" {
            let (layers, next) = parse_layers(lines, i, diags);
            entity.layers = Some(layers);
            i = next;
            continue;
        }

        match leading_keyword(&line.text) {
            "originalName" => match parse_entity_field(line, diags) {
                Some(PropertyValue::String(name)) => entity.original_name = Some(name),
                Some(_) => diags.error(line.number, "'originalName' value must be a string"),
                None => {}
            },
            "instanceId" => match parse_entity_field(line, diags) {
                Some(PropertyValue::Long(id)) => entity.instance_id = Some(id),
                Some(_) => diags.error(line.number, "'instanceId' value must be a number"),
                None => {}
            },
            "entityDef" => {
                if !line.opens_block() {
                    diags.error(line.number, "missing '{'");
                    i += 1;
                    continue;
                }
                let span = find_block(lines, i);
                entity.entity_def = parse_entity_def(span.lines(lines), diags);
                i = span.end;
                continue;
            }
            _ if is_structural(&line.text) => {}
            _ => diags.error(
                line.number,
                format!("unexpected '{}' inside entity definition", line.text),
            ),
        }

        i += 1;
    }

    entity
}

/// Parse a `layers {` block starting at `start`. Returns the layer names and
/// the index after the block.
fn parse_layers(lines: &[Line], start: usize, diags: &mut Diagnostics) -> (Vec<String>, usize) {
    let mut layers = Vec::new();

    for (i, line) in lines.iter().enumerate().skip(start + 1) {
        if line.text == "}" {
            return (layers, i + 1);
        }
        match parse_scalar(&line.text, line.number, diags) {
            Some(PropertyValue::String(layer)) => layers.push(layer),
            Some(_) => diags.error(line.number, "layer must be a string"),
            None => {}
        }
    }

    let last = lines.last().map_or(lines[start].number, |l| l.number);
    diags.error(last, "missing '}'");
    (layers, lines.len())
}

/// Parse `originalName = ...;` or `instanceId = ...;` down to its value.
fn parse_entity_field(line: &Line, diags: &mut Diagnostics) -> Option<PropertyValue> {
    let Some((_, value)) = split_assignment(&line.text) else {
        diags.error(
            line.number,
            format!("bad property declaration '{}'", line.text),
        );
        return None;
    };

    let Some(literal) = value.strip_suffix(';') else {
        diags.error(line.number, "missing ';'");
        return None;
    };

    parse_scalar(literal.trim(), line.number, diags)
}
