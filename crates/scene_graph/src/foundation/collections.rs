//! Handle-based storage for scene nodes

pub use slotmap::{SecondaryMap, SlotMap};

slotmap::new_key_type! {
    /// Stable, generation-checked handle to a node stored in a [`SceneGraph`](crate::scene::SceneGraph)
    ///
    /// A handle never owns the node it names. Handles to removed nodes simply
    /// stop resolving; they never alias a newer node.
    pub struct NodeId;
}

/// Arena of values addressed by [`NodeId`]
pub type NodeMap<T> = SlotMap<NodeId, T>;

/// Side table keyed by handles issued from a [`NodeMap`]
pub type NodeSideTable<T> = SecondaryMap<NodeId, T>;
