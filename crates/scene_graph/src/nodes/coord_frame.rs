//! Coordinate frame helper geometry
//!
//! Three arrows of unit length along +X, +Y and +Z. Each arrow is a ring of
//! shaft quads, a flat disc closing the back of the head, and a cone to the
//! tip; every quad is split into two triangles.

use std::f32::consts::TAU;

use super::{copy_values, count_value};
use crate::foundation::math::Vec3;
use crate::scene::{
    CommitContext, Node, NodeCore, NodeDescription, ParamType, RenderContext, RenderKind,
    RenderObject, RenderScope, SceneGraph, SceneResult, AABB,
};

const DEFAULT_SHAFT_THICKNESS: f32 = 0.1;
const DEFAULT_HEAD_LENGTH: f32 = 0.2;
const DEFAULT_NUM_SEGMENTS: i32 = 16;
const MIN_SEGMENTS: i32 = 3;

const SCHEMA: &[(&str, ParamType)] = &[
    ("shaft_thickness", ParamType::Float),
    ("head_length", ParamType::Float),
    ("num_segments", ParamType::Int),
];

/// Indexed triangle mesh with per-vertex normals and a flat color
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleMesh {
    /// Vertex positions
    pub vertices: Vec<Vec3>,
    /// Unit normals, one per vertex
    pub normals: Vec<Vec3>,
    /// Vertex index triples
    pub triangles: Vec<[usize; 3]>,
    /// Display color
    pub color: Vec3,
}

impl TriangleMesh {
    /// Append a quad as two triangles `(0, 1, 2)` and `(0, 2, 3)`
    pub fn add_quad(&mut self, corners: [Vec3; 4], normals: [Vec3; 4]) {
        let base = self.vertices.len();
        self.vertices.extend_from_slice(&corners);
        self.normals
            .extend(normals.iter().map(|n| n.try_normalize(f32::EPSILON).unwrap_or(*n)));
        self.triangles.push([base, base + 1, base + 2]);
        self.triangles.push([base, base + 2, base + 3]);
    }

    /// Bounds of all vertices
    pub fn bounds(&self) -> AABB {
        AABB::from_points(&self.vertices)
    }
}

/// Orthonormal frame whose first axis is `axis`
struct Frame {
    axis: Vec3,
    u: Vec3,
    v: Vec3,
}

impl Frame {
    fn along(axis: Vec3) -> Self {
        let helper = if axis.x.abs() < 0.9 { Vec3::x() } else { Vec3::y() };
        let v = axis.cross(&helper).normalize();
        let u = v.cross(&axis);
        Self { axis, u, v }
    }

    fn point(&self, p: Vec3) -> Vec3 {
        self.axis * p.x + self.u * p.y + self.v * p.z
    }
}

/// Axis arrows for visualizing a coordinate system
#[derive(Default)]
pub struct CoordFrame {
    core: NodeCore,
    arrows: Vec<TriangleMesh>,
    bounds: AABB,
}

impl CoordFrame {
    /// Registered type name
    pub const TYPE_NAME: &'static str = "CoordFrame";

    /// Factory for the type registry
    pub fn create() -> Box<dyn Node> {
        Box::new(Self::default())
    }

    /// Arrow meshes along X, Y and Z; empty until the first commit
    pub fn arrows(&self) -> &[TriangleMesh] {
        &self.arrows
    }

    fn segments(&self) -> usize {
        let requested = self.core.value_or("num_segments", DEFAULT_NUM_SEGMENTS);
        if requested < MIN_SEGMENTS {
            log::warn!(
                "CoordFrame '{}': {} segments requested, using {}",
                self.core.name(),
                requested,
                MIN_SEGMENTS
            );
        }
        usize::try_from(requested.max(MIN_SEGMENTS)).unwrap_or(3)
    }

    fn make_arrow(&self, axis: Vec3, segments: usize) -> TriangleMesh {
        let thickness = self.core.value_or("shaft_thickness", DEFAULT_SHAFT_THICKNESS);
        let head = self.core.value_or("head_length", DEFAULT_HEAD_LENGTH);
        let neck = 1.0 - head;
        let frame = Frame::along(axis);
        let to_world = |p: Vec3| frame.point(p);

        let mut mesh = TriangleMesh {
            color: axis,
            ..Default::default()
        };

        #[allow(clippy::cast_precision_loss)]
        let step = TAU / segments as f32;
        for i in 0..segments {
            #[allow(clippy::cast_precision_loss)]
            let (f0, f1) = (i as f32 * step, (i + 1) as f32 * step);
            let (u0, v0) = (f0.cos(), f0.sin());
            let (u1, v1) = (f1.cos(), f1.sin());

            let shaft0 = Vec3::new(0.0, thickness * u0, thickness * v0);
            let shaft1 = Vec3::new(neck, thickness * u0, thickness * v0);
            let shaft2 = Vec3::new(neck, thickness * u1, thickness * v1);
            let shaft3 = Vec3::new(0.0, thickness * u1, thickness * v1);
            let rim0 = Vec3::new(neck, head * u0, head * v0);
            let rim1 = Vec3::new(neck, head * u1, head * v1);
            let tip = Vec3::new(1.0, 0.0, 0.0);

            let out0 = frame.point(Vec3::new(0.0, u0, v0));
            let out1 = frame.point(Vec3::new(0.0, u1, v1));
            mesh.add_quad(
                [shaft0, shaft1, shaft2, shaft3].map(to_world),
                [out0, out0, out1, out1],
            );

            let back = -axis;
            mesh.add_quad([rim0, shaft1, shaft2, rim1].map(to_world), [back; 4]);

            let cone0 = frame.point(Vec3::new(1.0, u0, v0));
            let cone1 = frame.point(Vec3::new(1.0, u1, v1));
            mesh.add_quad([rim0, tip, tip, rim1].map(to_world), [cone0, cone0, cone1, cone1]);
        }
        mesh
    }
}

impl Node for CoordFrame {
    node_boilerplate!();

    fn describe(&self) -> String {
        format!("CoordFrame '{}'", self.core.name())
    }

    fn populate(&mut self, description: &NodeDescription) -> SceneResult<()> {
        copy_values(&mut self.core, description, SCHEMA)
    }

    fn commit(&mut self, _ctx: &CommitContext) {
        let segments = self.segments();
        self.arrows = [Vec3::x(), Vec3::y(), Vec3::z()]
            .into_iter()
            .map(|axis| self.make_arrow(axis, segments))
            .collect();
        self.bounds = self
            .arrows
            .iter()
            .fold(AABB::empty(), |acc, arrow| acc.union(&arrow.bounds()));
        log::debug!("CoordFrame '{}': built 3 arrows of {} segments", self.core.name(), segments);
    }

    fn contribute(&self, scope: &RenderScope<'_>, ctx: &mut dyn RenderContext) {
        let triangles: usize = self.arrows.iter().map(|arrow| arrow.triangles.len()).sum();
        let object = RenderObject::new(scope, RenderKind::Geometry, self.describe())
            .with_bounds(self.bounds.transformed(&scope.transform))
            .with_attribute("triangle_count", count_value(triangles));
        ctx.attach(object);
    }

    fn local_bounds(&self, _graph: &SceneGraph) -> AABB {
        self.bounds
    }
}
