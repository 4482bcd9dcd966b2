//! Description → node tree construction
//!
//! The builder walks a [`NodeDescription`] depth-first, instantiates each
//! node through the [`TypeRegistry`], lets it populate itself, and plugs it
//! into its parent's slot. Failures are local: an unknown type or a rejected
//! slot drops that subtree only, and every error is collected into the
//! [`BuildReport`] instead of aborting the build.

use super::description::NodeDescription;
use super::error::SceneError;
use super::graph::SceneGraph;
use super::param::ParamValue;
use super::registry::TypeRegistry;
use crate::config::SceneConfig;
use crate::foundation::collections::NodeId;

/// Outcome of one build
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Root of the built tree; `None` only if the root description itself failed
    pub root: Option<NodeId>,

    /// Errors accumulated along the way, in encounter order
    pub errors: Vec<SceneError>,
}

impl BuildReport {
    /// Whether the build produced a root and no errors
    pub fn is_clean(&self) -> bool {
        self.root.is_some() && self.errors.is_empty()
    }
}

/// Builds node trees from descriptions
pub struct GraphBuilder<'a> {
    registry: &'a TypeRegistry,
    config: SceneConfig,
}

impl<'a> GraphBuilder<'a> {
    /// Create a builder resolving types through `registry`, with default settings
    pub fn new(registry: &'a TypeRegistry) -> Self {
        Self {
            registry,
            config: SceneConfig::default(),
        }
    }

    /// Use the given configuration
    pub fn with_config(mut self, config: SceneConfig) -> Self {
        self.config = config;
        self
    }

    /// Build `description` into `graph`
    ///
    /// The resulting tree is populated but not committed.
    pub fn build(&self, graph: &mut SceneGraph, description: &NodeDescription) -> BuildReport {
        let mut report = BuildReport::default();
        report.root = self.build_node(graph, description, 1, &mut report.errors);

        if let Some(root) = report.root {
            if self.config.resolve_references {
                resolve_references(graph, root, &mut report.errors);
            }
        }

        log::info!(
            "Built scene from {} description(s): {} node(s) in graph, {} error(s)",
            description.node_count(),
            graph.len(),
            report.errors.len()
        );
        report
    }

    fn build_node(
        &self,
        graph: &mut SceneGraph,
        description: &NodeDescription,
        depth: usize,
        errors: &mut Vec<SceneError>,
    ) -> Option<NodeId> {
        if depth > self.config.max_depth {
            accumulate(errors, SceneError::DepthLimitExceeded(self.config.max_depth));
            return None;
        }

        let mut node = match self.registry.create(&description.type_name) {
            Ok(node) => node,
            Err(err) => {
                accumulate(errors, err);
                return None;
            }
        };
        if let Some(name) = &description.name {
            node.core_mut().set_name(name.clone());
        }
        if let Err(err) = node.populate_from(description) {
            accumulate(errors, err);
        }
        log::debug!("Created {}", node.describe());
        let id = graph.insert(node);

        for child_description in &description.children {
            let Some(child) = self.build_node(graph, child_description, depth + 1, errors) else {
                continue;
            };
            if let Err(err) = graph.attach(id, child_description.slot_name(), child) {
                accumulate(errors, err);
                if let Err(err) = graph.remove(child) {
                    log::error!("Failed to release rejected child: {}", err);
                }
            }
        }

        Some(id)
    }
}

fn accumulate(errors: &mut Vec<SceneError>, err: SceneError) {
    log::warn!("{}", err);
    errors.push(err);
}

/// Replace by-name references inside the tree at `root` with node handles
///
/// Names are looked up in the built tree first, then across the whole graph.
/// A target starting with `/` is a node path, as written for unnamed nodes.
fn resolve_references(graph: &mut SceneGraph, root: NodeId, errors: &mut Vec<SceneError>) {
    let subtree = graph.pre_order(root);

    for id in &subtree {
        let pending: Vec<(String, String)> = match graph.get(*id) {
            Some(node) => node
                .core()
                .parameters()
                .filter_map(|param| match param.value() {
                    ParamValue::Reference(target) => {
                        Some((param.name().to_string(), target.0.clone()))
                    }
                    _ => None,
                })
                .collect(),
            None => continue,
        };

        for (param, target) in pending {
            let found = if target.starts_with('/') {
                subtree
                    .iter()
                    .copied()
                    .find(|candidate| graph.path(*candidate).as_deref() == Some(target.as_str()))
                    .or_else(|| graph.find_by_path(&target))
            } else {
                subtree
                    .iter()
                    .copied()
                    .find(|candidate| graph.get(*candidate).is_some_and(|n| n.name() == target))
                    .or_else(|| graph.find_by_name(&target))
            };

            match found {
                Some(target_id) => {
                    if let Some(node) = graph.get_mut(*id) {
                        node.core_mut().set_value(param, ParamValue::Node(target_id));
                    }
                }
                None => {
                    let node = graph.path(*id).unwrap_or_default();
                    accumulate(
                        errors,
                        SceneError::SchemaMismatch {
                            node,
                            detail: format!("parameter '{param}' references unknown node '{target}'"),
                        },
                    );
                }
            }
        }
    }
}
