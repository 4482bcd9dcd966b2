//! Affine transform node

use super::{copy_values, ChildList};
use crate::foundation::collections::NodeId;
use crate::foundation::math::{self, Mat4, Vec3};
use crate::scene::{
    CommitContext, Node, NodeCore, NodeDescription, ParamType, SceneGraph, SceneResult, AABB,
};

const SCHEMA: &[(&str, ParamType)] = &[
    ("translation", ParamType::Vec3),
    ("rotation", ParamType::Vec3),
    ("scale", ParamType::Vec3),
];

/// Applies translation, XYZ Euler rotation (radians) and scale to its children
///
/// The matrix is resolved at commit; until then the node acts as identity.
pub struct Transform {
    core: NodeCore,
    children: ChildList,
    matrix: Mat4,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            core: NodeCore::new(),
            children: ChildList::default(),
            matrix: Mat4::identity(),
        }
    }
}

impl Transform {
    /// Registered type name
    pub const TYPE_NAME: &'static str = "Transform";

    /// Factory for the type registry
    pub fn create() -> Box<dyn Node> {
        Box::new(Self::default())
    }

    fn resolve(&self) -> math::Transform {
        math::Transform::from_euler(
            self.core.value_or("translation", Vec3::zeros()),
            self.core.value_or("rotation", Vec3::zeros()),
            self.core.value_or("scale", Vec3::repeat(1.0)),
        )
    }
}

impl Node for Transform {
    node_boilerplate!();

    fn describe(&self) -> String {
        let resolved = self.resolve();
        format!(
            "Transform '{}' (translation {:?}, scale {:?})",
            self.core.name(),
            resolved.position.as_slice(),
            resolved.scale.as_slice()
        )
    }

    fn populate(&mut self, description: &NodeDescription) -> SceneResult<()> {
        copy_values(&mut self.core, description, SCHEMA)
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

    fn local_transform(&self) -> Mat4 {
        self.matrix
    }

    fn commit(&mut self, _ctx: &CommitContext) {
        self.matrix = self.resolve().to_matrix();
    }

    fn local_bounds(&self, graph: &SceneGraph) -> AABB {
        graph.bounds_of(self.children.ids()).transformed(&self.matrix)
    }
}
