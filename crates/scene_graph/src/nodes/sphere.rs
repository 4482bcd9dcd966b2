//! Sphere geometry

use super::copy_values;
use crate::foundation::math::{self, Vec3};
use crate::scene::{
    CommitContext, Node, NodeCore, NodeDescription, ParamType, RenderContext, RenderKind,
    RenderObject, RenderScope, SceneGraph, SceneResult, AABB,
};

const DEFAULT_RADIUS: f32 = 1.0;

const SCHEMA: &[(&str, ParamType)] = &[("radius", ParamType::Float), ("center", ParamType::Vec3)];

/// A sphere given by `center` and `radius`
pub struct Sphere {
    core: NodeCore,
    bounds: AABB,
    world_center: Vec3,
}

impl Default for Sphere {
    fn default() -> Self {
        Self {
            core: NodeCore::new(),
            bounds: AABB::empty(),
            world_center: Vec3::zeros(),
        }
    }
}

impl Sphere {
    /// Registered type name
    pub const TYPE_NAME: &'static str = "Sphere";

    /// Factory for the type registry
    pub fn create() -> Box<dyn Node> {
        Box::new(Self::default())
    }

    /// Current radius; negative values count as zero
    pub fn radius(&self) -> f32 {
        self.core.value_or("radius", DEFAULT_RADIUS).max(0.0)
    }

    /// Current center, in the parent's frame
    pub fn center(&self) -> Vec3 {
        self.core.value_or("center", Vec3::zeros())
    }

    /// World-space center as of the last commit
    pub fn committed_world_center(&self) -> Vec3 {
        self.world_center
    }

    fn shape_bounds(&self) -> AABB {
        AABB::from_center_extents(self.center(), Vec3::repeat(self.radius()))
    }
}

impl Node for Sphere {
    node_boilerplate!();

    fn describe(&self) -> String {
        format!("Sphere '{}' (radius {})", self.core.name(), self.radius())
    }

    fn populate(&mut self, description: &NodeDescription) -> SceneResult<()> {
        copy_values(&mut self.core, description, SCHEMA)
    }

    fn commit(&mut self, ctx: &CommitContext) {
        if self.core.value_or("radius", DEFAULT_RADIUS) < 0.0 {
            log::warn!("Sphere '{}' has a negative radius, treating it as 0", self.core.name());
        }
        self.bounds = self.shape_bounds();
        self.world_center = math::transform_point(&ctx.world_transform, &self.center());
    }

    fn contribute(&self, scope: &RenderScope<'_>, ctx: &mut dyn RenderContext) {
        let center = math::transform_point(&scope.transform, &self.center());
        let object = RenderObject::new(scope, RenderKind::Geometry, self.describe())
            .with_bounds(self.shape_bounds().transformed(&scope.transform))
            .with_attribute("center", center)
            .with_attribute("radius", self.radius());
        ctx.attach(object);
    }

    fn local_bounds(&self, _graph: &SceneGraph) -> AABB {
        self.bounds
    }
}
