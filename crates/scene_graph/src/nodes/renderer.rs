//! Renderer settings node
//!
//! Ties a camera, a model and any number of lights together with the
//! settings a ray-casting backend needs: the shade mode and whether to
//! trace shadow rays.

use std::fmt;
use std::str::FromStr;

use super::{copy_values, count_value, DirectionalLight, PointLight};
use crate::foundation::collections::NodeId;
use crate::scene::{
    CommitContext, Node, NodeCore, NodeDescription, ParamType, ParamValue, RenderContext,
    RenderKind, RenderObject, RenderScope, SceneError, SceneGraph, SceneResult, AABB,
};

const SCHEMA: &[(&str, ParamType)] = &[
    ("shade_mode", ParamType::Text),
    ("shadows", ParamType::Bool),
    ("world", ParamType::Node),
];

/// What the backend writes per pixel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ShadeMode {
    /// Simple eye-light shading
    #[default]
    Eyelight,
    /// Color by primitive id
    PrimId,
    /// Color by geometry id
    GeomId,
    /// Color by instance id
    InstId,
    /// Geometric normal as color
    GNormal,
    /// Eye light plus one shadow ray per light
    TestShadow,
}

impl ShadeMode {
    /// Name as written in descriptions
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eyelight => "eyelight",
            Self::PrimId => "primid",
            Self::GeomId => "geomid",
            Self::InstId => "instid",
            Self::GNormal => "gnormal",
            Self::TestShadow => "testshadow",
        }
    }
}

impl FromStr for ShadeMode {
    type Err = SceneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "eyelight" => Ok(Self::Eyelight),
            "primid" => Ok(Self::PrimId),
            "geomid" => Ok(Self::GeomId),
            "instid" => Ok(Self::InstId),
            "gnormal" => Ok(Self::GNormal),
            "testshadow" => Ok(Self::TestShadow),
            other => Err(SceneError::SchemaMismatch {
                node: Renderer::TYPE_NAME.to_string(),
                detail: format!("unknown shade mode '{other}'"),
            }),
        }
    }
}

impl fmt::Display for ShadeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Renderer with `camera` and `model` slots (one each) and a `light` list
#[derive(Default)]
pub struct Renderer {
    core: NodeCore,
    camera: Option<NodeId>,
    model: Option<NodeId>,
    lights: Vec<NodeId>,
    shade_mode: ShadeMode,
}

impl Renderer {
    /// Registered type name
    pub const TYPE_NAME: &'static str = "Renderer";

    /// Factory for the type registry
    pub fn create() -> Box<dyn Node> {
        Box::new(Self::default())
    }

    /// Shade mode as of the last commit
    pub fn shade_mode(&self) -> ShadeMode {
        self.shade_mode
    }

    /// Attached camera
    pub fn camera(&self) -> Option<NodeId> {
        self.camera
    }

    /// Attached lights, in attachment order
    pub fn lights(&self) -> &[NodeId] {
        &self.lights
    }

    /// Node to render: the `world` reference when resolved, else the `model` child
    pub fn world(&self) -> Option<NodeId> {
        match self.core.get_parameter("world").map(|param| param.value()) {
            Some(ParamValue::Node(id)) => Some(*id),
            _ => self.model,
        }
    }

    fn fill(slot: &mut Option<NodeId>, name: &str, child: NodeId) -> SceneResult<()> {
        if slot.is_some() {
            return Err(SceneError::SchemaMismatch {
                node: Self::TYPE_NAME.to_string(),
                detail: format!("slot '{name}' is already occupied"),
            });
        }
        *slot = Some(child);
        Ok(())
    }
}

impl Node for Renderer {
    node_boilerplate!();

    fn describe(&self) -> String {
        format!(
            "Renderer '{}' ({}, {} lights)",
            self.core.name(),
            self.shade_mode,
            self.lights.len()
        )
    }

    fn populate(&mut self, description: &NodeDescription) -> SceneResult<()> {
        copy_values(&mut self.core, description, SCHEMA)
    }

    fn attach(&mut self, slot: &str, child: NodeId) -> SceneResult<()> {
        match slot {
            "camera" => Self::fill(&mut self.camera, slot, child)?,
            "model" => Self::fill(&mut self.model, slot, child)?,
            "light" => self.lights.push(child),
            _ => return Err(SceneError::unknown_slot(Self::TYPE_NAME, slot)),
        }
        self.core.touch();
        Ok(())
    }

    fn detach(&mut self, child: NodeId) -> bool {
        let detached = if self.camera == Some(child) {
            self.camera = None;
            true
        } else if self.model == Some(child) {
            self.model = None;
            true
        } else {
            let before = self.lights.len();
            self.lights.retain(|id| *id != child);
            self.lights.len() != before
        };
        if detached {
            self.core.touch();
        }
        detached
    }

    fn children(&self) -> Vec<NodeId> {
        self.camera
            .into_iter()
            .chain(self.model)
            .chain(self.lights.iter().copied())
            .collect()
    }

    fn commit(&mut self, _ctx: &CommitContext) {
        let requested: String = self.core.value_or("shade_mode", ShadeMode::default().to_string());
        self.shade_mode = requested.parse().unwrap_or_else(|err| {
            log::warn!("{}, falling back to {}", err, ShadeMode::default());
            ShadeMode::default()
        });
        if self.camera.is_none() {
            log::warn!("Renderer '{}' has no camera", self.core.name());
        }
    }

    fn contribute(&self, scope: &RenderScope<'_>, ctx: &mut dyn RenderContext) {
        let graph = scope.graph;
        let point_lights = self
            .lights
            .iter()
            .filter_map(|id| graph.get(*id))
            .filter(|light| light.downcast_ref::<PointLight>().is_some())
            .count();
        let directional_lights = self
            .lights
            .iter()
            .filter_map(|id| graph.get(*id))
            .filter(|light| light.downcast_ref::<DirectionalLight>().is_some())
            .count();

        let mut object = RenderObject::new(scope, RenderKind::Renderer, self.describe())
            .with_attribute("shade_mode", self.shade_mode.to_string())
            .with_attribute("shadows", self.core.value_or("shadows", false))
            .with_attribute("light_count", count_value(self.lights.len()))
            .with_attribute("point_lights", count_value(point_lights))
            .with_attribute("directional_lights", count_value(directional_lights));
        if let Some(camera) = self.camera {
            object = object.with_attribute("camera", camera);
        }
        if let Some(world) = self.world().filter(|id| graph.contains(*id)) {
            object = object
                .with_attribute("world", world)
                .with_bounds(graph.world_bounds(world));
        }
        ctx.attach(object);
    }

    fn local_bounds(&self, graph: &SceneGraph) -> AABB {
        self.model.map_or_else(AABB::empty, |model| graph.local_bounds(model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::{Camera, Group, Sphere};
    use crate::scene::{CommitWalker, RenderEmitter, RenderQueue};

    fn renderer_with_children(graph: &mut SceneGraph) -> NodeId {
        let renderer = graph.insert(Renderer::create());
        let camera = graph.insert(Camera::create());
        let model = graph.insert(Group::create());
        let sphere = graph.insert(Sphere::create());
        let point = graph.insert(PointLight::create());
        let sun = graph.insert(DirectionalLight::create());
        graph.attach(model, "child", sphere).unwrap();
        graph.attach(renderer, "camera", camera).unwrap();
        graph.attach(renderer, "model", model).unwrap();
        graph.attach(renderer, "light", point).unwrap();
        graph.attach(renderer, "light", sun).unwrap();
        renderer
    }

    #[test]
    fn test_shade_mode_parsing() {
        assert_eq!("primid".parse::<ShadeMode>().unwrap(), ShadeMode::PrimId);
        assert_eq!("TestShadow".parse::<ShadeMode>().unwrap(), ShadeMode::TestShadow);
        assert!("raytrace".parse::<ShadeMode>().is_err());
        assert_eq!(ShadeMode::GNormal.to_string(), "gnormal");
    }

    #[test]
    fn test_slots() {
        let mut graph = SceneGraph::new();
        let renderer = renderer_with_children(&mut graph);
        assert_eq!(graph.children(renderer).len(), 4);

        let second_camera = graph.insert(Camera::create());
        assert!(graph.attach(renderer, "camera", second_camera).is_err());
        assert!(graph.attach(renderer, "child", second_camera).is_err());
        assert_eq!(graph.parent(second_camera), None);
    }

    #[test]
    fn test_commit_and_emit() {
        let mut graph = SceneGraph::new();
        let renderer = renderer_with_children(&mut graph);
        graph
            .set_parameter(renderer, "shade_mode", "geomid".to_string())
            .unwrap();
        CommitWalker::commit(&mut graph, renderer);

        let node = graph.get(renderer).unwrap().downcast_ref::<Renderer>().unwrap();
        assert_eq!(node.shade_mode(), ShadeMode::GeomId);

        let mut queue = RenderQueue::new();
        assert_eq!(RenderEmitter::emit(&graph, renderer, &mut queue), 6);
        let object = queue.find_by_path("/Renderer").unwrap();
        assert_eq!(object.attribute_as::<i32>("point_lights"), Some(&1));
        assert_eq!(object.attribute_as::<i32>("directional_lights"), Some(&1));
        assert_eq!(object.attribute_as::<String>("shade_mode").unwrap(), "geomid");
        assert_eq!(object.bounds.max, crate::foundation::math::Vec3::repeat(1.0));
        assert_eq!(queue.count_of(RenderKind::Light), 2);
        assert_eq!(queue.count_of(RenderKind::Camera), 1);
    }

    #[test]
    fn test_unknown_shade_mode_falls_back() {
        let mut graph = SceneGraph::new();
        let renderer = graph.insert(Renderer::create());
        graph.set_parameter(renderer, "shade_mode", "raytrace".to_string()).unwrap();
        CommitWalker::commit(&mut graph, renderer);
        let node = graph.get(renderer).unwrap().downcast_ref::<Renderer>().unwrap();
        assert_eq!(node.shade_mode(), ShadeMode::Eyelight);
    }

    #[test]
    fn test_removing_light_detaches_it() {
        let mut graph = SceneGraph::new();
        let renderer = renderer_with_children(&mut graph);
        CommitWalker::commit(&mut graph, renderer);
        let light = graph.get(renderer).unwrap().downcast_ref::<Renderer>().unwrap().lights()[0];

        graph.remove(light).unwrap();
        let node = graph.get(renderer).unwrap();
        assert!(node.is_stale());
        assert_eq!(node.downcast_ref::<Renderer>().unwrap().lights().len(), 1);
    }
}
