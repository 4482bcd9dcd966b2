//! Node arena and tree structure
//!
//! The [`SceneGraph`] owns every node. Tree edges are owning: a node's
//! [`children`](Node::children) belong to it and are released with it.
//! [`ParamValue::Node`](super::param::ParamValue::Node) handles are
//! non-owning cross-references and are never followed for destruction.

use super::bounds::AABB;
use super::error::{SceneError, SceneResult};
use super::node::Node;
use super::param::ParamData;
use crate::foundation::collections::{NodeId, NodeMap, NodeSideTable};
use crate::foundation::math::Mat4;

/// Owner of all nodes of one scene
#[derive(Default)]
pub struct SceneGraph {
    /// Node storage
    nodes: NodeMap<Box<dyn Node>>,

    /// Parent of every attached node
    parents: NodeSideTable<NodeId>,

    /// Nodes without a parent, in insertion order
    roots: Vec<NodeId>,
}

impl SceneGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a node; it is a root until attached somewhere
    pub fn insert(&mut self, node: Box<dyn Node>) -> NodeId {
        let id = self.nodes.insert(node);
        self.roots.push(id);
        id
    }

    /// Plug `child` into `slot` of `parent`, following the parent type's attachment policy
    ///
    /// Fails if either node is missing, if `child` already has a parent, if
    /// the attachment would create a cycle, or if the parent rejects the slot.
    pub fn attach(&mut self, parent: NodeId, slot: &str, child: NodeId) -> SceneResult<()> {
        if !self.nodes.contains_key(child) {
            return Err(SceneError::NodeNotFound);
        }
        let parent_name = self
            .get(parent)
            .ok_or(SceneError::NodeNotFound)?
            .path_segment()
            .to_string();
        if self.parents.contains_key(child) {
            return Err(SceneError::SchemaMismatch {
                node: parent_name,
                detail: "child is already attached to another node".to_string(),
            });
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(SceneError::SchemaMismatch {
                node: parent_name,
                detail: "attachment would create a cycle".to_string(),
            });
        }

        self.nodes
            .get_mut(parent)
            .ok_or(SceneError::NodeNotFound)?
            .attach(slot, child)?;
        self.parents.insert(child, parent);
        self.roots.retain(|root| *root != child);
        Ok(())
    }

    fn is_ancestor_or_self(&self, candidate: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == candidate {
                return true;
            }
            current = self.parents.get(id).copied();
        }
        false
    }

    /// Node by handle
    pub fn get(&self, id: NodeId) -> Option<&(dyn Node + 'static)> {
        self.nodes.get(id).map(|node| node.as_ref())
    }

    /// Node by handle, mutably
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut (dyn Node + 'static)> {
        self.nodes.get_mut(id).map(|node| node.as_mut())
    }

    /// Set a typed parameter on a node, marking it stale
    pub fn set_parameter<T: ParamData>(
        &mut self,
        id: NodeId,
        name: impl Into<String>,
        value: T,
    ) -> SceneResult<()> {
        self.get_mut(id)
            .ok_or(SceneError::NodeNotFound)?
            .set_parameter(name, value);
        Ok(())
    }

    /// Whether `id` names a live node
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph holds no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes without a parent
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Parent of a node, if attached
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parents.get(id).copied()
    }

    /// Owned children of a node (empty for missing nodes)
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.get(id).map(|node| node.children()).unwrap_or_default()
    }

    /// All nodes of the subtree at `root`, parents before children
    pub fn pre_order(&self, root: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.get(id) else { continue };
            order.push(id);
            stack.extend(node.children().into_iter().rev());
        }
        order
    }

    /// First node named `name`, searching each root's subtree in pre-order
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.roots
            .iter()
            .flat_map(|root| self.pre_order(*root))
            .find(|id| self.get(*id).is_some_and(|node| node.name() == name))
    }

    /// First node, in root order then pre-order, whose path is exactly `path`
    pub fn find_by_path(&self, path: &str) -> Option<NodeId> {
        self.roots
            .iter()
            .flat_map(|root| self.pre_order(*root))
            .find(|id| self.path(*id).as_deref() == Some(path))
    }

    /// `/`-separated path from the node's root, e.g. `/scene/Sphere`
    pub fn path(&self, id: NodeId) -> Option<String> {
        let mut segments = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            segments.push(self.get(node_id)?.path_segment());
            current = self.parent(node_id);
        }
        segments.reverse();
        Some(format!("/{}", segments.join("/")))
    }

    /// Accumulated transform of all ancestors of `id` (identity at a root)
    pub fn parent_transform(&self, id: NodeId) -> Mat4 {
        let mut transform = Mat4::identity();
        let mut current = self.parent(id);
        while let Some(ancestor) = current {
            if let Some(node) = self.get(ancestor) {
                transform = node.local_transform() * transform;
            }
            current = self.parent(ancestor);
        }
        transform
    }

    /// Bounds of a node in its parent's frame; empty for missing nodes
    pub fn local_bounds(&self, id: NodeId) -> AABB {
        self.get(id).map_or_else(AABB::empty, |node| node.local_bounds(self))
    }

    /// Bounds of a node in world space, through all of its ancestors' transforms
    pub fn world_bounds(&self, id: NodeId) -> AABB {
        self.local_bounds(id).transformed(&self.parent_transform(id))
    }

    /// Union of the parent-frame bounds of sibling nodes
    pub fn bounds_of(&self, ids: &[NodeId]) -> AABB {
        ids.iter()
            .fold(AABB::empty(), |acc, id| acc.union(&self.local_bounds(*id)))
    }

    /// Remove a node and its owned subtree, returning how many nodes were released
    ///
    /// The node is detached from its parent first. Children are released
    /// before their parents. Handles to removed nodes stop resolving.
    pub fn remove(&mut self, id: NodeId) -> SceneResult<usize> {
        if !self.contains(id) {
            return Err(SceneError::NodeNotFound);
        }
        match self.parents.remove(id) {
            Some(parent) => {
                if let Some(parent_node) = self.nodes.get_mut(parent) {
                    parent_node.detach(id);
                }
            }
            None => self.roots.retain(|root| *root != id),
        }
        let released = self.release(id);
        log::debug!("Released {} node(s)", released);
        Ok(released)
    }

    fn release(&mut self, id: NodeId) -> usize {
        let mut released = 0;
        for child in self.children(id) {
            self.parents.remove(child);
            released += self.release(child);
        }
        if self.nodes.remove(id).is_some() {
            released += 1;
        }
        released
    }
}
