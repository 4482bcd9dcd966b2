//! Retained-mode scene graph core
//!
//! ## Architecture
//!
//! ```text
//! NodeDescription
//!      ↓  GraphBuilder (TypeRegistry)
//! SceneGraph (arena of Box<dyn Node>)
//!      ↓  CommitWalker
//! committed tree
//!      ↓                  ↓
//! RenderEmitter       Serializer
//! (RenderContext)     (SceneRecord list)
//! ```
//!
//! Nodes carry named, typed [`Parameter`]s and a modified/committed
//! [`VersionStamp`] pair. Setting a parameter makes the node stale; a commit
//! pass recomputes derived state for stale nodes only. Both traversals are
//! read-only.

mod bounds;
mod builder;
mod commit;
mod description;
mod error;
mod graph;
mod node;
mod param;
mod registry;
mod render;
mod serialize;
mod version;

pub use bounds::AABB;
pub use builder::{BuildReport, GraphBuilder};
pub use commit::{CommitContext, CommitStats, CommitWalker};
pub use description::NodeDescription;
pub use error::{SceneError, SceneResult};
pub use graph::SceneGraph;
pub use node::{Node, NodeCore, DEFAULT_SLOT};
pub use param::{NodeRef, ParamData, ParamType, ParamValue, Parameter};
pub use registry::{NodeFactory, TypeRegistry};
pub use render::{
    RenderBatch, RenderContext, RenderEmitter, RenderKind, RenderObject, RenderQueue, RenderScope,
};
pub use serialize::{SceneRecord, Serializer};
pub use version::VersionStamp;
