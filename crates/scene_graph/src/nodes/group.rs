//! Plain grouping node

use super::ChildList;
use crate::foundation::collections::NodeId;
use crate::scene::{Node, NodeCore, SceneGraph, SceneResult, AABB};

/// Ordered collection of children; bounds are the union of theirs
#[derive(Default)]
pub struct Group {
    core: NodeCore,
    children: ChildList,
}

impl Group {
    /// Registered type name
    pub const TYPE_NAME: &'static str = "Group";

    /// Factory for the type registry
    pub fn create() -> Box<dyn Node> {
        Box::new(Self::default())
    }
}

impl Node for Group {
    node_boilerplate!();

    fn describe(&self) -> String {
        format!("Group '{}' ({} children)", self.core.name(), self.children.len())
    }

    fn attach(&mut self, slot: &str, child: NodeId) -> SceneResult<()> {
        self.children.attach(Self::TYPE_NAME, slot, child)
    }

    fn detach(&mut self, child: NodeId) -> bool {
        self.children.detach(child)
    }

    fn children(&self) -> Vec<NodeId> {
        self.children.ids().to_vec()
    }

    fn local_bounds(&self, graph: &SceneGraph) -> AABB {
        graph.bounds_of(self.children.ids())
    }
}
