//! Point and directional lights

use super::copy_values;
use crate::foundation::math::{self, Vec3};
use crate::scene::{
    Node, NodeCore, NodeDescription, ParamType, RenderContext, RenderKind, RenderObject,
    RenderScope, SceneResult,
};

const POINT_SCHEMA: &[(&str, ParamType)] = &[
    ("position", ParamType::Vec3),
    ("color", ParamType::Vec3),
    ("intensity", ParamType::Float),
];

const DIRECTIONAL_SCHEMA: &[(&str, ParamType)] = &[
    ("direction", ParamType::Vec3),
    ("color", ParamType::Vec3),
    ("intensity", ParamType::Float),
];

fn color(core: &NodeCore) -> Vec3 {
    core.value_or("color", Vec3::repeat(1.0))
}

fn intensity(core: &NodeCore) -> f32 {
    core.value_or("intensity", 1.0)
}

/// Omnidirectional light at `position`
#[derive(Default)]
pub struct PointLight {
    core: NodeCore,
}

impl PointLight {
    /// Registered type name
    pub const TYPE_NAME: &'static str = "PointLight";

    /// Factory for the type registry
    pub fn create() -> Box<dyn Node> {
        Box::new(Self::default())
    }
}

impl Node for PointLight {
    node_boilerplate!();

    fn describe(&self) -> String {
        format!("PointLight '{}' (intensity {})", self.core.name(), intensity(&self.core))
    }

    fn populate(&mut self, description: &NodeDescription) -> SceneResult<()> {
        copy_values(&mut self.core, description, POINT_SCHEMA)
    }

    fn contribute(&self, scope: &RenderScope<'_>, ctx: &mut dyn RenderContext) {
        let position = self.core.value_or("position", Vec3::zeros());
        let object = RenderObject::new(scope, RenderKind::Light, self.describe())
            .with_attribute("light_type", "point".to_string())
            .with_attribute("position", math::transform_point(&scope.transform, &position))
            .with_attribute("color", color(&self.core))
            .with_attribute("intensity", intensity(&self.core));
        ctx.attach(object);
    }
}

/// Light arriving from infinitely far away along `direction`
#[derive(Default)]
pub struct DirectionalLight {
    core: NodeCore,
}

impl DirectionalLight {
    /// Registered type name
    pub const TYPE_NAME: &'static str = "DirectionalLight";

    /// Factory for the type registry
    pub fn create() -> Box<dyn Node> {
        Box::new(Self::default())
    }
}

impl Node for DirectionalLight {
    node_boilerplate!();

    fn describe(&self) -> String {
        format!("DirectionalLight '{}' (intensity {})", self.core.name(), intensity(&self.core))
    }

    fn populate(&mut self, description: &NodeDescription) -> SceneResult<()> {
        copy_values(&mut self.core, description, DIRECTIONAL_SCHEMA)
    }

    fn contribute(&self, scope: &RenderScope<'_>, ctx: &mut dyn RenderContext) {
        let direction = self.core.value_or("direction", Vec3::new(0.0, -1.0, 0.0));
        let direction = math::transform_vector(&scope.transform, &direction);
        let object = RenderObject::new(scope, RenderKind::Light, self.describe())
            .with_attribute("light_type", "directional".to_string())
            .with_attribute("direction", direction.try_normalize(f32::EPSILON).unwrap_or(direction))
            .with_attribute("color", color(&self.core))
            .with_attribute("intensity", intensity(&self.core));
        ctx.attach(object);
    }
}
