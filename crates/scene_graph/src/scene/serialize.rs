//! Flat record serialization of a tree

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::error::{SceneError, SceneResult};
use super::graph::SceneGraph;
use super::param::{NodeRef, ParamValue};
use crate::foundation::collections::NodeId;

/// One node, flattened
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneRecord {
    /// `/`-separated path of the node
    pub path: String,

    /// Registered type name
    pub type_name: String,

    /// Node's self-description
    pub label: String,

    /// Explicitly set parameters; node handles appear as by-name references
    #[serde(default)]
    pub parameters: BTreeMap<String, ParamValue>,
}

/// Pre-order serialization traversal
pub struct Serializer;

impl Serializer {
    /// Flatten the tree at `root` into records, parents before children
    pub fn serialize(graph: &SceneGraph, root: NodeId) -> Vec<SceneRecord> {
        let mut records = Vec::new();
        if let Some(path) = graph.path(root) {
            Self::record_node(graph, root, path, &mut records);
        }
        records
    }

    /// Flatten every tree in the graph
    pub fn serialize_all(graph: &SceneGraph) -> Vec<SceneRecord> {
        graph
            .roots()
            .iter()
            .flat_map(|root| Self::serialize(graph, *root))
            .collect()
    }

    /// Write records as pretty RON text
    pub fn to_ron(records: &[SceneRecord]) -> SceneResult<String> {
        ron::ser::to_string_pretty(records, ron::ser::PrettyConfig::default())
            .map_err(|e| SceneError::Serialization(e.to_string()))
    }

    /// Read records back from RON text
    pub fn from_ron(text: &str) -> SceneResult<Vec<SceneRecord>> {
        ron::from_str(text).map_err(|e| SceneError::Serialization(e.to_string()))
    }

    fn record_node(graph: &SceneGraph, id: NodeId, path: String, records: &mut Vec<SceneRecord>) {
        let Some(node) = graph.get(id) else {
            return;
        };

        let mut parameters = BTreeMap::new();
        for param in node.core().parameters() {
            match Self::persistable(graph, param.value()) {
                Some(value) => {
                    parameters.insert(param.name().to_string(), value);
                }
                None => log::warn!(
                    "Skipping parameter '{}' of {}: referenced node no longer exists",
                    param.name(),
                    path
                ),
            }
        }

        records.push(SceneRecord {
            path: path.clone(),
            type_name: node.type_name().to_string(),
            label: node.describe(),
            parameters,
        });

        for child in node.children() {
            if let Some(child_node) = graph.get(child) {
                let child_path = format!("{}/{}", path, child_node.path_segment());
                Self::record_node(graph, child, child_path, records);
            }
        }
    }

    /// Node handles become references to the target's name, or its path when unnamed
    fn persistable(graph: &SceneGraph, value: &ParamValue) -> Option<ParamValue> {
        match value {
            ParamValue::Node(target) => {
                let node = graph.get(*target)?;
                let name = if node.name().is_empty() {
                    graph.path(*target)?
                } else {
                    node.name().to_string()
                };
                Some(ParamValue::Reference(NodeRef(name)))
            }
            other => Some(other.clone()),
        }
    }
}
