//! # Scene Graph
//!
//! A retained-mode scene graph: a mutable, versioned tree of typed nodes
//! (geometry, lights, cameras, renderers) that is built from a declarative
//! description, committed incrementally as values change, and traversed
//! either into render objects for a backend or into flat records for
//! persistence.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scene_graph::prelude::*;
//!
//! fn main() -> Result<(), SceneError> {
//!     let registry = TypeRegistry::new();
//!     register_builtin_nodes(&registry)?;
//!
//!     let description = NodeDescription::new("Group")
//!         .with_child(NodeDescription::new("Sphere").with_value("radius", 2.0_f32));
//!
//!     let mut graph = SceneGraph::new();
//!     let report = GraphBuilder::new(&registry).build(&mut graph, &description);
//!     let root = report.root.ok_or(SceneError::NodeNotFound)?;
//!
//!     CommitWalker::commit(&mut graph, root);
//!     let mut queue = RenderQueue::new();
//!     RenderEmitter::emit(&graph, root, &mut queue);
//!     println!("{}", Serializer::to_ron(&Serializer::serialize(&graph, root))?);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod foundation;
pub mod nodes;
pub mod scene;

#[cfg(test)]
mod tests;

/// Common imports for scene graph users
pub mod prelude {
    pub use crate::{
        config::{Config, SceneConfig},
        foundation::{
            collections::NodeId,
            math::{Mat4, Vec3},
        },
        nodes::register_builtin_nodes,
        scene::{
            BuildReport, CommitWalker, GraphBuilder, Node, NodeDescription, ParamValue,
            RenderEmitter, RenderQueue, SceneError, SceneGraph, SceneResult, Serializer,
            TypeRegistry,
        },
    };
}
