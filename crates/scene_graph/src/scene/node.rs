//! The polymorphic scene graph node
//!
//! Every concrete node type embeds a [`NodeCore`] (name, parameters, and the
//! modified/committed stamp pair) and implements [`Node`]. All hooks except
//! [`Node::describe`] default to no-ops, so a type only overrides what it
//! actually participates in.
//!
//! ## Dirty tracking
//!
//! ```text
//! Constructed (dirty) -> Populated (dirty) -> Committed (clean) <-> Dirty
//! ```
//!
//! A node is stale while `last_modified > last_committed`. Only the typed
//! setters move `last_modified`; only the commit walker moves
//! `last_committed`.

use std::any::Any;
use std::collections::HashMap;

use super::bounds::AABB;
use super::commit::CommitContext;
use super::description::NodeDescription;
use super::error::{SceneError, SceneResult};
use super::graph::SceneGraph;
use super::param::{ParamData, ParamValue, Parameter};
use super::render::{RenderContext, RenderScope};
use super::version::VersionStamp;
use crate::foundation::collections::NodeId;
use crate::foundation::math::Mat4;

/// Slot name used when a description does not name one
pub const DEFAULT_SLOT: &str = "child";

/// State shared by every node type
#[derive(Debug)]
pub struct NodeCore {
    name: String,
    parameters: HashMap<String, Parameter>,
    last_modified: VersionStamp,
    last_committed: VersionStamp,
    committed_under: Option<Mat4>,
    populated: bool,
}

impl Default for NodeCore {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeCore {
    /// Create an unnamed core with no parameters
    ///
    /// The core starts dirty: `last_committed` is [`VersionStamp::NEVER`] and
    /// `last_modified` is a fresh stamp.
    pub fn new() -> Self {
        Self {
            name: String::new(),
            parameters: HashMap::new(),
            last_modified: VersionStamp::now(),
            last_committed: VersionStamp::NEVER,
            committed_under: None,
            populated: false,
        }
    }

    /// Node name (empty when unnamed)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the node
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Look up a parameter; `None` means "use the default"
    pub fn get_parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.get(name)
    }

    /// Insert or replace a typed parameter and mark the node modified
    pub fn set_parameter<T: ParamData>(&mut self, name: impl Into<String>, value: T) {
        self.set_value(name, value.into_value());
    }

    /// Insert or replace a type-erased parameter and mark the node modified
    pub fn set_value(&mut self, name: impl Into<String>, value: ParamValue) {
        let name = name.into();
        self.parameters.insert(name.clone(), Parameter::from_value(name, value));
        self.last_modified = VersionStamp::now();
    }

    /// Mark the node modified without changing a parameter, e.g. after a structural edit
    pub fn touch(&mut self) {
        self.last_modified = VersionStamp::now();
    }

    /// All parameters, in no particular order
    pub fn parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.values()
    }

    /// Number of parameters
    pub fn parameter_count(&self) -> usize {
        self.parameters.len()
    }

    /// Read a parameter as `T`, falling back to `default` when it is absent
    ///
    /// A parameter stored at a different type is a programming error: it
    /// panics in debug builds and is logged (and the default used) otherwise.
    pub fn value_or<T: ParamData>(&self, name: &str, default: T) -> T {
        let Some(param) = self.parameters.get(name) else {
            return default;
        };
        match param.value_as::<T>() {
            Ok(value) => value.clone(),
            Err(err) => {
                log::error!("{} on node '{}', using default", err, self.name);
                if cfg!(debug_assertions) {
                    panic!("{err}");
                }
                default
            }
        }
    }

    /// Stamp of the most recent parameter change
    pub fn last_modified(&self) -> VersionStamp {
        self.last_modified
    }

    /// Stamp of the most recent commit
    pub fn last_committed(&self) -> VersionStamp {
        self.last_committed
    }

    /// Whether the node changed since it was last committed
    pub fn is_stale(&self) -> bool {
        self.last_modified > self.last_committed
    }

    /// Ancestor transform the node last committed under
    pub fn committed_transform(&self) -> Option<&Mat4> {
        self.committed_under.as_ref()
    }

    /// Whether a commit under `world_transform` would change anything
    ///
    /// True while the node is stale, and also when its ancestors moved since
    /// the last commit.
    pub fn needs_commit(&self, world_transform: &Mat4) -> bool {
        self.is_stale() || self.committed_under.as_ref() != Some(world_transform)
    }

    /// Whether the node has been populated from a description
    pub fn is_populated(&self) -> bool {
        self.populated
    }

    pub(crate) fn mark_committed(&mut self, stamp: VersionStamp, world_transform: Mat4) {
        debug_assert!(stamp >= self.last_modified);
        self.last_committed = stamp;
        self.committed_under = Some(world_transform);
    }

    fn begin_population(&mut self) -> SceneResult<()> {
        if self.populated {
            return Err(SceneError::AlreadyPopulated(self.name.clone()));
        }
        self.populated = true;
        Ok(())
    }
}

/// A scene graph node
///
/// Concrete types are created by name through the
/// [`TypeRegistry`](super::registry::TypeRegistry) and stored in a
/// [`SceneGraph`], which owns them. Children are referenced by [`NodeId`].
pub trait Node: Any + Send + Sync {
    /// Shared node state
    fn core(&self) -> &NodeCore;

    /// Shared node state, mutably
    fn core_mut(&mut self) -> &mut NodeCore;

    /// For downcasting to the concrete type
    fn as_any(&self) -> &dyn Any;

    /// Name this type is registered under
    fn type_name(&self) -> &'static str;

    /// Self-identifying label for diagnostics and serialization
    fn describe(&self) -> String;

    /// Pull recognized typed values out of `description` into parameters
    ///
    /// Unrecognized values are ignored. Call through
    /// [`populate_from`](Node::populate_from), which refuses a second population.
    fn populate(&mut self, _description: &NodeDescription) -> SceneResult<()> {
        Ok(())
    }

    /// Plug `child` into the slot named `slot`
    ///
    /// The default rejects every slot.
    fn attach(&mut self, slot: &str, _child: NodeId) -> SceneResult<()> {
        Err(SceneError::unknown_slot(self.type_name(), slot))
    }

    /// Remove `child` from whatever slot holds it; `false` if it was not attached here
    fn detach(&mut self, _child: NodeId) -> bool {
        false
    }

    /// Owned children, in traversal order
    fn children(&self) -> Vec<NodeId> {
        Vec::new()
    }

    /// Transform this node applies to its children
    fn local_transform(&self) -> Mat4 {
        Mat4::identity()
    }

    /// Recompute derived state from the current parameters
    ///
    /// Called by the commit walker while the node is stale or its ancestor
    /// transform changed; safe to call repeatedly.
    fn commit(&mut self, _ctx: &CommitContext) {}

    /// Create or update this node's backend counterpart under `ctx`
    fn contribute(&self, _scope: &RenderScope<'_>, _ctx: &mut dyn RenderContext) {}

    /// Bounds in the coordinate frame of the node's parent
    ///
    /// Valid after a commit. Nodes without spatial meaning return the empty box.
    /// [`SceneGraph::world_bounds`] lifts this into world space.
    fn local_bounds(&self, _graph: &SceneGraph) -> AABB {
        AABB::empty()
    }
}

impl<'a> dyn Node + 'a {
    /// Node name (empty when unnamed)
    pub fn name(&self) -> &str {
        self.core().name()
    }

    /// Look up a parameter; `None` means "use the default"
    pub fn get_parameter(&self, name: &str) -> Option<&Parameter> {
        self.core().get_parameter(name)
    }

    /// Insert or replace a typed parameter and mark the node modified
    pub fn set_parameter<T: ParamData>(&mut self, name: impl Into<String>, value: T) {
        self.core_mut().set_parameter(name, value);
    }

    /// Whether the node changed since it was last committed
    pub fn is_stale(&self) -> bool {
        self.core().is_stale()
    }

    /// Populate from `description`, exactly once
    ///
    /// A second call fails with [`SceneError::AlreadyPopulated`] and leaves
    /// the node untouched.
    pub fn populate_from(&mut self, description: &NodeDescription) -> SceneResult<()> {
        self.core_mut().begin_population()?;
        self.populate(description)
    }

    /// Path segment for this node: its name, or its type name when unnamed
    pub fn path_segment(&self) -> &str {
        let name = self.core().name();
        if name.is_empty() {
            self.type_name()
        } else {
            name
        }
    }

    /// Downcast to a concrete node type
    pub fn downcast_ref<T: Node>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Blank {
        core: NodeCore,
    }

    impl Node for Blank {
        fn core(&self) -> &NodeCore {
            &self.core
        }

        fn core_mut(&mut self) -> &mut NodeCore {
            &mut self.core
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn type_name(&self) -> &'static str {
            "Blank"
        }

        fn describe(&self) -> String {
            "Blank".to_string()
        }
    }

    #[test]
    fn test_fresh_node_is_dirty() {
        let node = Blank::default();
        assert!(node.core.last_modified() > node.core.last_committed());
        assert!(node.core.is_stale());
    }

    #[test]
    fn test_set_parameter_advances_modified() {
        let mut node: Box<dyn Node> = Box::new(Blank::default());
        node.core_mut().mark_committed(VersionStamp::now(), Mat4::identity());
        assert!(!node.is_stale());

        let mut previous = node.core().last_modified();
        for radius in [1.0_f32, 2.0, 3.0] {
            node.set_parameter("radius", radius);
            let modified = node.core().last_modified();
            assert!(modified > previous);
            assert!(modified > node.core().last_committed());
            previous = modified;
        }
        assert!(node.is_stale());
    }

    #[test]
    fn test_missing_parameter_uses_default() {
        let node = Blank::default();
        assert!(node.core.get_parameter("radius").is_none());
        assert_eq!(node.core.value_or("radius", 4.0_f32), 4.0);
    }

    #[test]
    fn test_second_population_is_rejected() {
        let mut node: Box<dyn Node> = Box::new(Blank::default());
        let description = NodeDescription::new("Blank");
        assert!(node.populate_from(&description).is_ok());
        assert_eq!(
            node.populate_from(&description),
            Err(SceneError::AlreadyPopulated(String::new()))
        );
    }

    #[test]
    fn test_default_attach_rejects_slot() {
        let mut node = Blank::default();
        let mut graph = SceneGraph::new();
        let child = graph.insert(Box::new(Blank::default()));
        assert!(matches!(
            node.attach("camera", child),
            Err(SceneError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn test_path_segment_falls_back_to_type() {
        let mut node: Box<dyn Node> = Box::new(Blank::default());
        assert_eq!(node.path_segment(), "Blank");
        node.core_mut().set_name("blank_a");
        assert_eq!(node.path_segment(), "blank_a");
    }

    #[test]
    fn test_moved_ancestor_needs_commit() {
        let mut core = NodeCore::new();
        let origin = Mat4::identity();
        assert!(core.needs_commit(&origin));

        core.mark_committed(VersionStamp::now(), origin);
        assert!(!core.needs_commit(&origin));
        assert_eq!(core.committed_transform(), Some(&origin));

        let moved = Mat4::new_translation(&crate::foundation::math::Vec3::new(7.0, 0.0, 0.0));
        assert!(!core.is_stale());
        assert!(core.needs_commit(&moved));
    }
}
