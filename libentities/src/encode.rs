//! Encode documents to canonical entities text.
//!
//! The output uses one tab per nesting level, one blank line between
//! entities, and a trailing newline. Any document built by the reader without
//! errors reads back to an equal document.

use crate::document::{Document, Entity, EntityProperty};
use crate::value::PropertyValue;

/// Encode a whole document.
pub fn encode(document: &Document) -> String {
    let mut out = String::new();

    if let Some(version) = non_empty(&document.format_version) {
        out.push_str(&format!("Version {}\n", version));
    }
    if let Some(version) = non_empty(&document.hierarchy_version) {
        out.push_str(&format!("HierarchyVersion {}\n", version));
    }

    for (i, entity) in document.entities.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        encode_entity_into(&mut out, entity);
    }

    out
}

/// Encode a single `entity { ... }` block.
pub fn encode_entity(entity: &Entity) -> String {
    let mut out = String::new();
    encode_entity_into(&mut out, entity);
    out
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn encode_entity_into(out: &mut String, entity: &Entity) {
    push_line(out, 0, "entity {");

    if let Some(layers) = &entity.layers {
        push_line(out, 1, "layers {");
        for layer in layers {
            push_line(out, 2, &format!("\"{}\"", layer));
        }
        push_line(out, 1, "}");
    }

    if let Some(id) = entity.instance_id {
        push_line(out, 1, &format!("instanceId = {};", id));
    }

    if let Some(name) = &entity.original_name {
        push_line(out, 1, &format!("originalName = \"{}\";", name));
    }

    if let Some(def) = &entity.entity_def {
        push_line(out, 1, &format!("entityDef {} {{", def.name));
        for property in &def.properties {
            encode_property(out, property, 2);
        }
        push_line(out, 1, "}");
    }

    push_line(out, 0, "}");
}

fn encode_property(out: &mut String, property: &EntityProperty, indent: usize) {
    encode_named_value(out, &property.name, property.important, &property.value, indent);
}

/// Write `name = value`, as one line for scalars or as a block for arrays
/// and objects.
fn encode_named_value(
    out: &mut String,
    name: &str,
    important: bool,
    value: &PropertyValue,
    indent: usize,
) {
    match value {
        PropertyValue::Array(items) => {
            open_block(out, name, important, indent);
            push_line(out, indent + 1, &format!("num = {};", items.len()));
            for (i, item) in items.iter().enumerate() {
                encode_named_value(out, &format!("item[{}]", i), false, item, indent + 1);
            }
            push_line(out, indent, "}");
        }
        PropertyValue::Object(properties) => {
            open_block(out, name, important, indent);
            for property in properties {
                encode_property(out, property, indent + 1);
            }
            push_line(out, indent, "}");
        }
        PropertyValue::Null => push_scalar(out, indent, name, "NULL"),
        PropertyValue::String(s) => push_scalar(out, indent, name, &format!("\"{}\"", s)),
        PropertyValue::Bool(b) => push_scalar(out, indent, name, if *b { "true" } else { "false" }),
        PropertyValue::Long(n) => push_scalar(out, indent, name, &n.to_string()),
        PropertyValue::Double(f) => push_scalar(out, indent, name, &encode_double(*f)),
    }
}

/// Shortest round-trip form. Integral values get a `.0` so they read back as
/// doubles rather than longs.
fn encode_double(f: f64) -> String {
    let s = f.to_string();
    if f.is_finite() && !s.contains('.') {
        format!("{}.0", s)
    } else {
        s
    }
}

fn open_block(out: &mut String, name: &str, important: bool, indent: usize) {
    let marker = if important { "! " } else { "" };
    push_line(out, indent, &format!("{} = {}{{", name, marker));
}

fn push_scalar(out: &mut String, indent: usize, name: &str, literal: &str) {
    push_line(out, indent, &format!("{} = {};", name, literal));
}

fn push_line(out: &mut String, indent: usize, text: &str) {
    for _ in 0..indent {
        out.push('\t');
    }
    out.push_str(text);
    out.push('\n');
}
