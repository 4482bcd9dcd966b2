//! Perspective camera

use super::copy_values;
use crate::foundation::math::{self, Vec3};
use crate::scene::{
    Node, NodeCore, NodeDescription, ParamType, RenderContext, RenderKind, RenderObject,
    RenderScope, SceneResult,
};

const SCHEMA: &[(&str, ParamType)] = &[
    ("position", ParamType::Vec3),
    ("direction", ParamType::Vec3),
    ("up", ParamType::Vec3),
    ("fovy", ParamType::Float),
    ("aspect", ParamType::Float),
];

/// Pinhole camera looking along `direction`; `fovy` is in degrees
#[derive(Default)]
pub struct Camera {
    core: NodeCore,
}

impl Camera {
    /// Registered type name
    pub const TYPE_NAME: &'static str = "Camera";

    /// Factory for the type registry
    pub fn create() -> Box<dyn Node> {
        Box::new(Self::default())
    }

    /// Eye position
    pub fn position(&self) -> Vec3 {
        self.core.value_or("position", Vec3::zeros())
    }

    /// Viewing direction
    pub fn direction(&self) -> Vec3 {
        self.core.value_or("direction", Vec3::z())
    }

    /// Up vector
    pub fn up(&self) -> Vec3 {
        self.core.value_or("up", Vec3::y())
    }
}

impl Node for Camera {
    node_boilerplate!();

    fn describe(&self) -> String {
        format!("Camera '{}' at {:?}", self.core.name(), self.position().as_slice())
    }

    fn populate(&mut self, description: &NodeDescription) -> SceneResult<()> {
        copy_values(&mut self.core, description, SCHEMA)
    }

    fn contribute(&self, scope: &RenderScope<'_>, ctx: &mut dyn RenderContext) {
        let direction = math::transform_vector(&scope.transform, &self.direction());
        let up = math::transform_vector(&scope.transform, &self.up());
        let object = RenderObject::new(scope, RenderKind::Camera, self.describe())
            .with_attribute("position", math::transform_point(&scope.transform, &self.position()))
            .with_attribute("direction", direction.try_normalize(f32::EPSILON).unwrap_or(direction))
            .with_attribute("up", up.try_normalize(f32::EPSILON).unwrap_or(up))
            .with_attribute("fovy", self.core.value_or("fovy", 60.0_f32))
            .with_attribute("aspect", self.core.value_or("aspect", 1.0_f32));
        ctx.attach(object);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::Transform;
    use crate::scene::{CommitWalker, RenderEmitter, RenderQueue, SceneGraph};
    use approx::assert_relative_eq;

    #[test]
    fn test_defaults_emitted() {
        let mut graph = SceneGraph::new();
        let camera = graph.insert(Camera::create());
        let mut queue = RenderQueue::new();
        RenderEmitter::emit(&graph, camera, &mut queue);

        let object = queue.find_by_path("/Camera").unwrap();
        assert_eq!(object.kind, RenderKind::Camera);
        assert_eq!(object.attribute_as::<Vec3>("direction"), Some(&Vec3::z()));
        assert_eq!(object.attribute_as::<f32>("fovy"), Some(&60.0));
    }

    #[test]
    fn test_position_follows_parent_transform() {
        let mut graph = SceneGraph::new();
        let xfm = graph.insert(Transform::create());
        let camera = graph.insert(Camera::create());
        graph.attach(xfm, "child", camera).unwrap();
        graph.set_parameter(xfm, "translation", Vec3::new(0.0, 0.0, -5.0)).unwrap();
        CommitWalker::commit(&mut graph, xfm);

        let mut queue = RenderQueue::new();
        RenderEmitter::emit(&graph, xfm, &mut queue);
        let position = queue.objects()[0].attribute_as::<Vec3>("position").unwrap();
        assert_relative_eq!(*position, Vec3::new(0.0, 0.0, -5.0), epsilon = 1e-6);
    }
}
