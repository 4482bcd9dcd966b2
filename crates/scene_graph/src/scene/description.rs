//! External, declarative node descriptions
//!
//! A description is what the graph builder consumes: a type name, a flat map
//! of typed values, and an ordered list of child descriptions. The core never
//! parses text itself; [`NodeDescription::from_ron`] is a serde convenience
//! for applications.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::error::{SceneError, SceneResult};
use super::node::DEFAULT_SLOT;
use super::param::{ParamData, ParamType, ParamValue};

/// Description of one node and its subtree
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeDescription {
    /// Registered type name to instantiate
    pub type_name: String,

    /// Optional node name, used for paths and by-name references
    #[serde(default)]
    pub name: Option<String>,

    /// Slot of the parent this node plugs into (`"child"` when absent)
    #[serde(default)]
    pub slot: Option<String>,

    /// Raw typed values, picked up by the node type's `populate`
    #[serde(default)]
    pub values: BTreeMap<String, ParamValue>,

    /// Child descriptions, in order
    #[serde(default)]
    pub children: Vec<NodeDescription>,
}

impl NodeDescription {
    /// Describe a node of the given type with no values or children
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            ..Default::default()
        }
    }

    /// Set the node name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the parent slot
    pub fn with_slot(mut self, slot: impl Into<String>) -> Self {
        self.slot = Some(slot.into());
        self
    }

    /// Add a typed value
    pub fn with_value<T: ParamData>(mut self, name: impl Into<String>, value: T) -> Self {
        self.values.insert(name.into(), value.into_value());
        self
    }

    /// Append a child description
    pub fn with_child(mut self, child: NodeDescription) -> Self {
        self.children.push(child);
        self
    }

    /// Slot this node plugs into
    pub fn slot_name(&self) -> &str {
        self.slot.as_deref().unwrap_or(DEFAULT_SLOT)
    }

    /// Raw value by name
    pub fn value(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    /// Typed value by name
    ///
    /// `Ok(None)` when absent; [`SceneError::TypeMismatch`] when present at
    /// another type.
    pub fn get<T: ParamData>(&self, name: &str) -> SceneResult<Option<&T>> {
        match self.values.get(name) {
            None => Ok(None),
            Some(value) => T::from_value(value).map(Some).ok_or_else(|| SceneError::TypeMismatch {
                name: name.to_string(),
                expected: T::TYPE,
                found: value.type_tag(),
            }),
        }
    }

    /// Check that every listed value, when present, has its expected type
    pub fn check_types(&self, schema: &[(&str, ParamType)]) -> SceneResult<()> {
        for (name, expected) in schema {
            if let Some(value) = self.values.get(*name) {
                if value.type_tag() != *expected {
                    return Err(SceneError::TypeMismatch {
                        name: (*name).to_string(),
                        expected: *expected,
                        found: value.type_tag(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Parse a description from RON text
    pub fn from_ron(text: &str) -> SceneResult<Self> {
        ron::from_str(text).map_err(|e| SceneError::Serialization(e.to_string()))
    }

    /// Write this description as pretty RON text
    pub fn to_ron(&self) -> SceneResult<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| SceneError::Serialization(e.to_string()))
    }

    /// Number of descriptions in this subtree, including this one
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Self::node_count).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;

    #[test]
    fn test_typed_get() {
        let description = NodeDescription::new("Sphere").with_value("radius", 2.0_f32);
        assert_eq!(description.get::<f32>("radius").unwrap(), Some(&2.0));
        assert_eq!(description.get::<f32>("center").unwrap(), None);
        assert!(matches!(
            description.get::<i32>("radius"),
            Err(SceneError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_default_slot() {
        assert_eq!(NodeDescription::new("Group").slot_name(), "child");
        assert_eq!(NodeDescription::new("Camera").with_slot("camera").slot_name(), "camera");
    }

    #[test]
    fn test_ron_round_trip() {
        let description = NodeDescription::new("Group")
            .with_name("root")
            .with_child(
                NodeDescription::new("Sphere")
                    .with_value("radius", 2.0_f32)
                    .with_value("center", Vec3::new(1.0, 2.0, 3.0)),
            );

        let text = description.to_ron().unwrap();
        let parsed = NodeDescription::from_ron(&text).unwrap();
        assert_eq!(parsed, description);
        assert_eq!(parsed.node_count(), 2);
    }

    #[test]
    fn test_from_ron_reports_errors() {
        assert!(matches!(
            NodeDescription::from_ron("(type_name: 5)"),
            Err(SceneError::Serialization(_))
        ));
    }
}
