//! Document model: the parsed contents of an entities file.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::value::PropertyValue;

static ENTITY_DEF_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_/]+$").unwrap());

static INDEXED_PROPERTY_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_/]+\[[0-9]+\]$").unwrap());

/// Check a property name: a plain identifier or an indexed one like `item[3]`.
pub fn is_valid_property_name(name: &str) -> bool {
    ENTITY_DEF_NAME.is_match(name) || INDEXED_PROPERTY_NAME.is_match(name)
}

/// Check an entityDef name. Indexed forms are not allowed here.
pub fn is_valid_entity_def_name(name: &str) -> bool {
    ENTITY_DEF_NAME.is_match(name)
}

/// A whole entities file.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Document {
    /// Value of the `Version` header line.
    pub format_version: Option<String>,
    /// Value of the `HierarchyVersion` header line.
    pub hierarchy_version: Option<String>,
    /// Entities in file order.
    pub entities: Vec<Entity>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// First entity whose `originalName` equals `name`.
    pub fn find_by_original_name(&self, name: &str) -> Option<&Entity> {
        self.entities
            .iter()
            .find(|e| e.original_name.as_deref() == Some(name))
    }

    /// First entity whose `instanceId` equals `id`.
    pub fn find_by_instance_id(&self, id: i64) -> Option<&Entity> {
        self.entities.iter().find(|e| e.instance_id == Some(id))
    }
}

/// One `entity { ... }` block.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Entity {
    /// Layer tags. `Some(vec![])` is an explicit empty `layers` block.
    pub layers: Option<Vec<String>>,
    pub original_name: Option<String>,
    pub instance_id: Option<i64>,
    /// Absent only while an entity is being assembled; the reader drops
    /// entities whose entityDef failed to parse.
    pub entity_def: Option<EntityDef>,
}

impl Entity {
    /// Entity holding just an entityDef.
    pub fn with_def(entity_def: EntityDef) -> Self {
        Self {
            entity_def: Some(entity_def),
            ..Self::default()
        }
    }
}

/// The named property tree of an entity.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityDef {
    pub name: String,
    pub properties: Vec<EntityProperty>,
}

impl EntityDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: Vec::new(),
        }
    }

    /// First top-level property called `name`.
    pub fn property(&self, name: &str) -> Option<&EntityProperty> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Mutable access to the first top-level property called `name`.
    pub fn property_mut(&mut self, name: &str) -> Option<&mut EntityProperty> {
        self.properties.iter_mut().find(|p| p.name == name)
    }
}

/// A named value inside an entityDef or an object.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityProperty {
    pub name: String,
    /// The `!` marker: this block overrides an inherited property of the
    /// same name. Only written for arrays and objects.
    pub important: bool,
    pub value: PropertyValue,
}

impl EntityProperty {
    pub fn new(name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        Self {
            name: name.into(),
            important: false,
            value: value.into(),
        }
    }

    /// Property carrying the `!` marker.
    pub fn important(name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        Self {
            important: true,
            ..Self::new(name, value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_names() {
        assert!(is_valid_property_name("spawnPosition"));
        assert!(is_valid_property_name("edit/renderModel"));
        assert!(is_valid_property_name("item[12]"));
        assert!(!is_valid_property_name("item[]"));
        assert!(!is_valid_property_name("item[1]]"));
        assert!(!is_valid_property_name("bad-name"));
        assert!(!is_valid_property_name(""));
    }

    #[test]
    fn test_entity_def_names() {
        assert!(is_valid_entity_def_name("idTarget_Spawn"));
        assert!(is_valid_entity_def_name("2_spawner"));
        assert!(!is_valid_entity_def_name("item[0]"));
        assert!(!is_valid_entity_def_name("has space"));
    }

    #[test]
    fn test_lookups() {
        let mut def = EntityDef::new("player_start");
        def.properties.push(EntityProperty::new("health", 100i64));
        def.properties
            .push(EntityProperty::important("flags", PropertyValue::Object(vec![])));

        let mut doc = Document::new();
        doc.entities.push(Entity {
            original_name: Some("player_start_1".into()),
            instance_id: Some(7),
            ..Entity::with_def(def)
        });

        let entity = doc.find_by_original_name("player_start_1").unwrap();
        assert_eq!(doc.find_by_instance_id(7), Some(entity));
        assert!(doc.find_by_instance_id(8).is_none());

        let def = entity.entity_def.as_ref().unwrap();
        assert_eq!(def.property("health").unwrap().value.as_long(), Some(100));
        assert!(def.property("flags").unwrap().important);
        assert!(def.property("missing").is_none());
    }

    #[test]
    fn test_property_mut() {
        let mut def = EntityDef::new("light");
        def.properties.push(EntityProperty::new("radius", 1.0f64));
        def.property_mut("radius").unwrap().value = PropertyValue::Double(2.5);
        assert_eq!(def.property("radius").unwrap().value.as_double(), Some(2.5));
    }
}
