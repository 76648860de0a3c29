//! Property value representation.

use std::fmt;

use crate::document::EntityProperty;

/// The value of an entityDef property.
#[derive(Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PropertyValue {
    /// `NULL` literal.
    Null,
    /// Quoted string, stored without the quotes and without escape processing.
    String(String),
    /// `true` or `false`.
    Bool(bool),
    /// Signed 64-bit integer.
    Long(i64),
    /// 64-bit float. Only literals containing a `.` parse as doubles.
    Double(f64),
    /// Block with a `num` entry. Element names are not kept.
    Array(Vec<PropertyValue>),
    /// Block without a `num` entry.
    Object(Vec<EntityProperty>),
}

/// Discriminant of a [`PropertyValue`], for messages and quick checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Null,
    String,
    Bool,
    Long,
    Double,
    Array,
    Object,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Null => "null",
            ValueKind::String => "string",
            ValueKind::Bool => "boolean",
            ValueKind::Long => "long",
            ValueKind::Double => "double",
            ValueKind::Array => "array",
            ValueKind::Object => "object",
        };
        f.write_str(name)
    }
}

impl PropertyValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            PropertyValue::Null => ValueKind::Null,
            PropertyValue::String(_) => ValueKind::String,
            PropertyValue::Bool(_) => ValueKind::Bool,
            PropertyValue::Long(_) => ValueKind::Long,
            PropertyValue::Double(_) => ValueKind::Double,
            PropertyValue::Array(_) => ValueKind::Array,
            PropertyValue::Object(_) => ValueKind::Object,
        }
    }

    /// Returns `true` if this value is `NULL`.
    pub fn is_null(&self) -> bool {
        matches!(self, PropertyValue::Null)
    }

    /// Returns `true` for arrays and objects, the values written as blocks.
    pub fn is_container(&self) -> bool {
        matches!(self, PropertyValue::Array(_) | PropertyValue::Object(_))
    }

    /// Returns a reference to the string if this is a `String`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the boolean value if this is a `Bool`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the integer if this is a `Long`.
    pub fn as_long(&self) -> Option<i64> {
        match self {
            PropertyValue::Long(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the float if this is a `Double`.
    pub fn as_double(&self) -> Option<f64> {
        match self {
            PropertyValue::Double(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the elements if this is an `Array`.
    pub fn as_array(&self) -> Option<&[PropertyValue]> {
        match self {
            PropertyValue::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the properties if this is an `Object`.
    pub fn as_object(&self) -> Option<&[EntityProperty]> {
        match self {
            PropertyValue::Object(props) => Some(props),
            _ => None,
        }
    }
}

impl fmt::Debug for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Null => write!(f, "NULL"),
            PropertyValue::String(s) => write!(f, "{:?}", s),
            PropertyValue::Bool(b) => write!(f, "{}", b),
            PropertyValue::Long(n) => write!(f, "{}", n),
            PropertyValue::Double(n) => write!(f, "{:?}", n),
            PropertyValue::Array(items) => f.debug_list().entries(items).finish(),
            PropertyValue::Object(props) => f
                .debug_map()
                .entries(props.iter().map(|p| (&p.name, &p.value)))
                .finish(),
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        PropertyValue::Bool(b)
    }
}

impl From<i64> for PropertyValue {
    fn from(n: i64) -> Self {
        PropertyValue::Long(n)
    }
}

impl From<f64> for PropertyValue {
    fn from(f: f64) -> Self {
        PropertyValue::Double(f)
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::String(s)
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::String(s.to_string())
    }
}

impl From<Vec<PropertyValue>> for PropertyValue {
    fn from(items: Vec<PropertyValue>) -> Self {
        PropertyValue::Array(items)
    }
}

impl From<Vec<EntityProperty>> for PropertyValue {
    fn from(props: Vec<EntityProperty>) -> Self {
        PropertyValue::Object(props)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors_match_variant() {
        assert_eq!(PropertyValue::from(42i64).as_long(), Some(42));
        assert_eq!(PropertyValue::from(42i64).as_double(), None);
        assert_eq!(PropertyValue::from("info_player").as_str(), Some("info_player"));
        assert_eq!(PropertyValue::from(false).as_bool(), Some(false));
        assert!(PropertyValue::Null.is_null());
        assert!(!PropertyValue::Null.is_container());
    }

    #[test]
    fn test_containers() {
        let array = PropertyValue::from(vec![PropertyValue::Long(1), PropertyValue::Long(2)]);
        assert!(array.is_container());
        assert_eq!(array.as_array().map(|a| a.len()), Some(2));
        assert_eq!(array.kind(), ValueKind::Array);

        let object = PropertyValue::from(vec![EntityProperty::new("x", 1.5f64)]);
        assert_eq!(object.kind().to_string(), "object");
        assert_eq!(object.as_object().map(|o| o[0].name.as_str()), Some("x"));
    }

    #[test]
    fn test_debug_format() {
        let object = PropertyValue::Object(vec![
            EntityProperty::new("spawn", true),
            EntityProperty::new("offset", PropertyValue::Array(vec![0.5f64.into(), PropertyValue::Null])),
        ]);
        assert_eq!(
            format!("{:?}", object),
            r#"{"spawn": true, "offset": [0.5, NULL]}"#
        );
    }
}
