//! Streamline geometry: round tubes between consecutive vertices

use super::{copy_values, count_value};
use crate::foundation::math::Vec3;
use crate::scene::{
    CommitContext, Node, NodeCore, NodeDescription, ParamType, RenderContext, RenderKind,
    RenderObject, RenderScope, SceneGraph, SceneResult, AABB,
};

const DEFAULT_RADIUS: f32 = 0.1;

const SCHEMA: &[(&str, ParamType)] = &[
    ("radius", ParamType::Float),
    ("vertex", ParamType::Vec3Array),
    ("index", ParamType::IntArray),
];

/// Tubes of a common `radius`
///
/// Each entry `i` of `index` links `vertex[i]` to `vertex[i + 1]`. Entries
/// without a following vertex are dropped at commit.
#[derive(Default)]
pub struct StreamLines {
    core: NodeCore,
    links: Vec<usize>,
    bounds: AABB,
}

impl StreamLines {
    /// Registered type name
    pub const TYPE_NAME: &'static str = "StreamLines";

    /// Factory for the type registry
    pub fn create() -> Box<dyn Node> {
        Box::new(Self::default())
    }

    /// Tube radius
    pub fn radius(&self) -> f32 {
        self.core.value_or("radius", DEFAULT_RADIUS)
    }

    /// Number of valid links as of the last commit
    pub fn link_count(&self) -> usize {
        self.links.len()
    }
}

impl Node for StreamLines {
    node_boilerplate!();

    fn describe(&self) -> String {
        format!("StreamLines '{}' ({} links)", self.core.name(), self.links.len())
    }

    fn populate(&mut self, description: &NodeDescription) -> SceneResult<()> {
        copy_values(&mut self.core, description, SCHEMA)
    }

    fn commit(&mut self, _ctx: &CommitContext) {
        let vertices: Vec<Vec3> = self.core.value_or("vertex", Vec::new());
        let indices: Vec<i32> = self.core.value_or("index", Vec::new());

        self.links = indices
            .iter()
            .filter_map(|index| usize::try_from(*index).ok())
            .filter(|start| start + 1 < vertices.len())
            .collect();
        let dropped = indices.len() - self.links.len();
        if dropped > 0 {
            log::warn!(
                "StreamLines '{}': dropped {} link(s) pointing past {} vertices",
                self.core.name(),
                dropped,
                vertices.len()
            );
        }

        self.bounds = AABB::from_points(&vertices).expanded(self.radius());
    }

    fn contribute(&self, scope: &RenderScope<'_>, ctx: &mut dyn RenderContext) {
        let object = RenderObject::new(scope, RenderKind::Geometry, self.describe())
            .with_bounds(self.bounds.transformed(&scope.transform))
            .with_attribute("radius", self.radius())
            .with_attribute("link_count", count_value(self.links.len()));
        ctx.attach(object);
    }

    fn local_bounds(&self, _graph: &SceneGraph) -> AABB {
        self.bounds
    }
}
