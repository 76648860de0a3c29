//! Phase 3: Property-Tree Parser
//!
//! Recursively parses an entityDef block into its property tree. It handles:
//! - The `entityDef NAME {` declaration line
//! - Scalar properties: `name = <literal>;`
//! - Block properties: `name = {` or `name = ! {` followed by nested lines,
//!   which become arrays when they carry a `num` entry and objects otherwise
//! - Scalar literals: NULL, strings, booleans, longs, doubles
//!
//! Every problem is recorded in the [`Diagnostics`] sink and the offending
//! line, property or block is skipped.

use crate::document::{is_valid_entity_def_name, is_valid_property_name, EntityDef, EntityProperty};
use crate::error::Diagnostics;
use crate::scanner::{find_block, Line};
use crate::value::PropertyValue;

/// A property together with the line it was declared on.
#[derive(Debug)]
struct ParsedProperty {
    line: usize,
    property: EntityProperty,
}

/// The direct children of one block.
#[derive(Debug, Default)]
struct ParsedBlock {
    properties: Vec<ParsedProperty>,
    /// Line of the first scalar `num` entry, whether or not its value parsed.
    num_line: Option<usize>,
}

// ============================================================================
// EntityDef Parsing
// ============================================================================

/// Parse one entityDef block: the declaration line, the properties, and the
/// closing line if present.
///
/// A bad declaration line yields `None`; there is no partial def.
pub fn parse_entity_def(block: &[Line], diags: &mut Diagnostics) -> Option<EntityDef> {
    let (header, body) = block.split_first()?;
    let name = parse_entity_def_header(header, diags)?;
    let properties = parse_properties(body, diags)
        .properties
        .into_iter()
        .map(|p| p.property)
        .collect();
    Some(EntityDef { name, properties })
}

/// Extract the name from `entityDef NAME {` or `entityDef NAME{`.
fn parse_entity_def_header(line: &Line, diags: &mut Diagnostics) -> Option<String> {
    let parts: Vec<&str> = line.text.split(' ').collect();

    if parts[0] != "entityDef" && parts[0] != "entityDef{" {
        diags.error(line.number, format!("unknown type '{}'", parts[0]));
        return None;
    }

    let name = match parts.as_slice() {
        [_] => {
            diags.error(line.number, "missing entityDef name");
            return None;
        }
        [_, "{"] => {
            diags.error(line.number, "missing entityDef name");
            return None;
        }
        [_, attached] => match attached.strip_suffix('{') {
            Some(name) => name,
            None => {
                diags.error(line.number, "missing '{'");
                return None;
            }
        },
        [_, name, "{"] => *name,
        [_, _, _] => {
            diags.error(line.number, "missing '{'");
            return None;
        }
        _ => {
            diags.error(line.number, "expected entityDef declaration not found");
            return None;
        }
    };

    if !is_valid_entity_def_name(name) {
        diags.error(line.number, format!("invalid entityDef name '{}'", name));
        return None;
    }

    Some(name.to_string())
}

// ============================================================================
// Property Parsing
// ============================================================================

/// Parse the lines inside a block (after its opening line) into properties.
///
/// Lone `{` and `}` lines are skipped, which covers the block's own closing
/// line.
fn parse_properties(lines: &[Line], diags: &mut Diagnostics) -> ParsedBlock {
    let mut block = ParsedBlock::default();
    let mut i = 0;

    while i < lines.len() {
        let line = &lines[i];

        if line.text == "{" || line.text == "}" {
            i += 1;
            continue;
        }

        let Some((name, value)) = split_assignment(&line.text) else {
            diags.error(line.number, format!("unexpected '{}'", line.text));
            i += 1;
            continue;
        };

        if value.is_empty() {
            diags.error(line.number, "missing property value");
            i += 1;
            continue;
        }

        if value.ends_with('{') {
            let span = find_block(lines, i);
            let important = value.len() > 1 && value.starts_with('!');
            if let Some(p) = parse_block_property(name, important, span.lines(lines), diags) {
                block.properties.push(p);
            }
            i = span.end;
        } else {
            if name == "num" && block.num_line.is_none() {
                block.num_line = Some(line.number);
            }
            if let Some(p) = parse_scalar_property(line, name, value, diags) {
                block.properties.push(p);
            }
            i += 1;
        }
    }

    block
}

/// Split `name = value` on its single `=`. Both sides come back trimmed.
/// Returns `None` unless there is exactly one `=` and a non-empty name.
pub(crate) fn split_assignment(text: &str) -> Option<(&str, &str)> {
    let (name, value) = text.split_once('=')?;
    if value.contains('=') {
        return None;
    }
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some((name, value.trim()))
}

/// Parse `name = <literal>;`.
///
/// An invalid name is reported but the property is kept under that name.
fn parse_scalar_property(
    line: &Line,
    name: &str,
    value: &str,
    diags: &mut Diagnostics,
) -> Option<ParsedProperty> {
    let literal = match value.strip_suffix(';') {
        Some(stripped) => stripped.trim(),
        None => {
            diags.error(line.number, "missing ';'");
            value
        }
    };

    let value = parse_scalar(literal, line.number, diags)?;

    if !is_valid_property_name(name) {
        diags.error(line.number, format!("invalid property name '{}'", name));
    }

    Some(ParsedProperty {
        line: line.number,
        property: EntityProperty {
            name: name.to_string(),
            important: false,
            value,
        },
    })
}

/// Parse a `name = {` block into an array or object property.
///
/// The block is an array when one of its direct scalar children is named
/// `num`, even if that child's value failed to parse. An invalid name drops
/// the whole property.
fn parse_block_property(
    name: &str,
    important: bool,
    block: &[Line],
    diags: &mut Diagnostics,
) -> Option<ParsedProperty> {
    let opening_line = block[0].number;
    let children = parse_properties(&block[1..], diags);

    let value = match children.num_line {
        None => PropertyValue::Object(
            children
                .properties
                .into_iter()
                .map(|c| c.property)
                .collect(),
        ),
        Some(num_line) => build_array(children.properties, num_line, diags),
    };

    if !is_valid_property_name(name) {
        diags.error(opening_line, format!("invalid property name '{}'", name));
        return None;
    }

    Some(ParsedProperty {
        line: opening_line,
        property: EntityProperty {
            name: name.to_string(),
            important,
            value,
        },
    })
}

/// Collect array elements from a block's children and check them against
/// the `num` entry declared on `num_line`.
///
/// Every child named `num` is left out of the elements. When the `num` value
/// itself failed to parse, that error has already been reported and no count
/// check is made.
fn build_array(
    children: Vec<ParsedProperty>,
    num_line: usize,
    diags: &mut Diagnostics,
) -> PropertyValue {
    let declared = children
        .iter()
        .find(|c| c.line == num_line && c.property.name == "num")
        .map(|c| c.property.value.as_long());

    let items: Vec<PropertyValue> = children
        .into_iter()
        .filter(|c| c.property.name != "num")
        .map(|c| c.property.value)
        .collect();

    match declared {
        None => {}
        Some(None) => diags.error(num_line, "'num' property value must be a number"),
        Some(Some(n)) if n != items.len() as i64 => diags.warning(
            num_line,
            format!(
                "'num' property value '{}' doesn't match the array's actual element count '{}'",
                n,
                items.len()
            ),
        ),
        Some(Some(_)) => {}
    }

    PropertyValue::Array(items)
}

// ============================================================================
// Scalar Parsing
// ============================================================================

/// Parse a scalar literal. The trailing `;` must already be stripped.
///
/// Literals are tried in order: `NULL`, quoted string, `true`/`false`,
/// 64-bit integer, and, only when the text contains a `.`, a double.
/// Strings are taken verbatim between the quotes; there are no escapes.
pub fn parse_scalar(text: &str, line: usize, diags: &mut Diagnostics) -> Option<PropertyValue> {
    if text.trim().is_empty() {
        diags.error(line, "missing property value");
        return None;
    }

    if text == "NULL" {
        return Some(PropertyValue::Null);
    }

    if let Some(rest) = text.strip_prefix('"') {
        return match rest.strip_suffix('"') {
            Some(inner) => Some(PropertyValue::String(inner.to_string())),
            None => {
                diags.error(line, "missing '\"'");
                None
            }
        };
    }

    match text {
        "true" => return Some(PropertyValue::Bool(true)),
        "false" => return Some(PropertyValue::Bool(false)),
        _ => {}
    }

    if let Ok(n) = text.parse::<i64>() {
        return Some(PropertyValue::Long(n));
    }

    // Overflowing literals parse as infinity, which has no text form.
    if text.contains('.') {
        if let Ok(f) = text.parse::<f64>() {
            if f.is_finite() {
                return Some(PropertyValue::Double(f));
            }
        }
    }

    diags.error(line, format!("invalid property value: {}", text));
    None
}
