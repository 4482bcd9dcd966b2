//! Render emission
//!
//! [`RenderEmitter`] walks a committed tree and lets each node contribute
//! [`RenderObject`]s to a backend [`RenderContext`]. The emitter never
//! mutates nodes and never commits on its own: callers batch edits, commit
//! once, then emit.
//!
//! [`RenderQueue`] is the built-in context. It keeps objects in emission
//! order and groups them into per-kind batches on request.

use std::collections::BTreeMap;

use super::bounds::AABB;
use super::graph::SceneGraph;
use super::param::{ParamData, ParamValue};
use crate::foundation::collections::NodeId;
use crate::foundation::math::Mat4;

/// Category of a render object, used for batching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RenderKind {
    /// Something with a surface
    Geometry,
    /// A light source
    Light,
    /// A viewpoint
    Camera,
    /// Renderer settings
    Renderer,
}

/// Backend-facing representation of one node
#[derive(Debug, Clone, PartialEq)]
pub struct RenderObject {
    /// Node that produced this object
    pub node: NodeId,

    /// Path of that node in the tree
    pub path: String,

    /// Category for batching
    pub kind: RenderKind,

    /// Node's self-description
    pub label: String,

    /// Accumulated transform from the node's ancestors
    pub transform: Mat4,

    /// World-space bounds (empty when not spatial)
    pub bounds: AABB,

    /// Backend-specific values
    pub attributes: BTreeMap<String, ParamValue>,
}

impl RenderObject {
    /// Create an object for the node in `scope`
    pub fn new(scope: &RenderScope<'_>, kind: RenderKind, label: impl Into<String>) -> Self {
        Self {
            node: scope.id,
            path: scope.path.to_string(),
            kind,
            label: label.into(),
            transform: scope.transform,
            bounds: AABB::empty(),
            attributes: BTreeMap::new(),
        }
    }

    /// Add a backend attribute
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Set the world-space bounds
    pub fn with_bounds(mut self, bounds: AABB) -> Self {
        self.bounds = bounds;
        self
    }

    /// Attribute by name
    pub fn attribute(&self, name: &str) -> Option<&ParamValue> {
        self.attributes.get(name)
    }

    /// Attribute by name, if present at type `T`
    pub fn attribute_as<T: ParamData>(&self, name: &str) -> Option<&T> {
        self.attributes.get(name).and_then(T::from_value)
    }
}

/// Receiver of render objects
pub trait RenderContext {
    /// Take one object produced by a node
    fn attach(&mut self, object: RenderObject);
}

/// Where in the tree a node is being emitted
#[derive(Clone, Copy)]
pub struct RenderScope<'a> {
    /// Node being emitted
    pub id: NodeId,

    /// `/`-separated path of the node
    pub path: &'a str,

    /// Accumulated transform of the node's ancestors (identity at a root)
    pub transform: Mat4,

    /// Graph being emitted, for resolving handle parameters
    pub graph: &'a SceneGraph,
}

/// Objects of one kind, in emission order
#[derive(Debug, Clone)]
pub struct RenderBatch {
    /// Kind shared by all objects in the batch
    pub kind: RenderKind,

    /// Objects in this batch
    pub objects: Vec<RenderObject>,
}

impl RenderBatch {
    /// Create an empty batch
    pub fn new(kind: RenderKind) -> Self {
        Self {
            kind,
            objects: Vec::new(),
        }
    }

    /// Add an object to this batch
    pub fn add_object(&mut self, object: RenderObject) {
        self.objects.push(object);
    }

    /// Number of objects in this batch
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }
}

/// Collects emitted objects for a backend
#[derive(Debug, Default)]
pub struct RenderQueue {
    objects: Vec<RenderObject>,
}

impl RenderQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// All objects, in emission order
    pub fn objects(&self) -> &[RenderObject] {
        &self.objects
    }

    /// Objects grouped by kind, batches ordered by kind
    pub fn batches(&self) -> Vec<RenderBatch> {
        let mut batches: BTreeMap<RenderKind, RenderBatch> = BTreeMap::new();
        for object in &self.objects {
            batches
                .entry(object.kind)
                .or_insert_with(|| RenderBatch::new(object.kind))
                .add_object(object.clone());
        }
        batches.into_values().collect()
    }

    /// Number of objects of `kind`
    pub fn count_of(&self, kind: RenderKind) -> usize {
        self.objects.iter().filter(|object| object.kind == kind).count()
    }

    /// Total number of objects
    pub fn total_object_count(&self) -> usize {
        self.objects.len()
    }

    /// Whether nothing was emitted
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// First object emitted by the node at `path`
    pub fn find_by_path(&self, path: &str) -> Option<&RenderObject> {
        self.objects.iter().find(|object| object.path == path)
    }

    /// Union of the bounds of all geometry
    pub fn bounds(&self) -> AABB {
        self.objects
            .iter()
            .filter(|object| object.kind == RenderKind::Geometry)
            .fold(AABB::empty(), |acc, object| acc.union(&object.bounds))
    }

    /// Drop all objects, e.g. before re-emitting a frame
    pub fn clear(&mut self) {
        self.objects.clear();
    }
}

impl RenderContext for RenderQueue {
    fn attach(&mut self, object: RenderObject) {
        self.objects.push(object);
    }
}

/// Pre-order render traversal
pub struct RenderEmitter;

impl RenderEmitter {
    /// Let every node of the tree at `root` contribute to `ctx`
    ///
    /// Returns the number of nodes visited.
    pub fn emit(graph: &SceneGraph, root: NodeId, ctx: &mut dyn RenderContext) -> usize {
        let Some(path) = graph.path(root) else {
            return 0;
        };
        let visited = Self::emit_node(graph, root, &path, graph.parent_transform(root), ctx);
        log::debug!("Emitted {} node(s) from {}", visited, path);
        visited
    }

    /// Emit every tree in the graph
    pub fn emit_all(graph: &SceneGraph, ctx: &mut dyn RenderContext) -> usize {
        graph
            .roots()
            .iter()
            .map(|root| Self::emit(graph, *root, ctx))
            .sum()
    }

    fn emit_node(
        graph: &SceneGraph,
        id: NodeId,
        path: &str,
        transform: Mat4,
        ctx: &mut dyn RenderContext,
    ) -> usize {
        let Some(node) = graph.get(id) else {
            return 0;
        };
        let scope = RenderScope {
            id,
            path,
            transform,
            graph,
        };
        node.contribute(&scope, ctx);

        let child_transform = transform * node.local_transform();
        let mut visited = 1;
        for child in node.children() {
            let Some(child_node) = graph.get(child) else {
                continue;
            };
            let child_path = format!("{}/{}", path, child_node.path_segment());
            visited += Self::emit_node(graph, child, &child_path, child_transform, ctx);
        }
        visited
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use crate::nodes::{Camera, Group, Sphere};
    use crate::scene::commit::CommitWalker;

    fn object(kind: RenderKind, path: &str) -> RenderObject {
        let graph = SceneGraph::new();
        let scope = RenderScope {
            id: NodeId::default(),
            path,
            transform: Mat4::identity(),
            graph: &graph,
        };
        RenderObject::new(&scope, kind, path)
    }

    #[test]
    fn test_batches_grouped_by_kind() {
        let mut queue = RenderQueue::new();
        queue.attach(object(RenderKind::Light, "/a"));
        queue.attach(object(RenderKind::Geometry, "/b"));
        queue.attach(object(RenderKind::Light, "/c"));

        let batches = queue.batches();
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].kind, RenderKind::Geometry);
        assert_eq!(batches[1].object_count(), 2);
        assert_eq!(batches[1].objects[1].path, "/c");
        assert_eq!(queue.count_of(RenderKind::Camera), 0);
    }

    #[test]
    fn test_attributes() {
        let obj = object(RenderKind::Geometry, "/s").with_attribute("radius", 2.0_f32);
        assert_eq!(obj.attribute_as::<f32>("radius"), Some(&2.0));
        assert_eq!(obj.attribute_as::<i32>("radius"), None);
        assert!(obj.attribute("center").is_none());
    }

    #[test]
    fn test_emit_visits_every_node_without_mutating() {
        let mut graph = SceneGraph::new();
        let group = graph.insert(Group::create());
        let sphere = graph.insert(Sphere::create());
        let camera = graph.insert(Camera::create());
        graph.attach(group, "child", sphere).unwrap();
        graph.attach(group, "child", camera).unwrap();
        CommitWalker::commit(&mut graph, group);
        let stamp = graph.get(sphere).unwrap().core().last_committed();

        let mut queue = RenderQueue::new();
        assert_eq!(RenderEmitter::emit(&graph, group, &mut queue), 3);
        assert_eq!(queue.total_object_count(), 2);
        assert_eq!(queue.objects()[0].path, "/Group/Sphere");
        assert_eq!(queue.objects()[1].kind, RenderKind::Camera);
        assert_eq!(graph.get(sphere).unwrap().core().last_committed(), stamp);
    }

    #[test]
    fn test_queue_bounds_and_clear() {
        let mut graph = SceneGraph::new();
        let sphere = graph.insert(Sphere::create());
        graph.set_parameter(sphere, "center", Vec3::new(2.0, 0.0, 0.0)).unwrap();
        CommitWalker::commit_all(&mut graph);

        let mut queue = RenderQueue::new();
        RenderEmitter::emit_all(&graph, &mut queue);
        let bounds = queue.bounds();
        assert_eq!(bounds.min, Vec3::new(1.0, -1.0, -1.0));
        assert_eq!(bounds.max, Vec3::new(3.0, 1.0, 1.0));

        queue.clear();
        assert!(queue.is_empty());
        assert!(queue.bounds().is_empty());
    }
}
