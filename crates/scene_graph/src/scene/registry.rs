//! Name → factory registry for node types
//!
//! Lets the graph builder instantiate the right concrete node given only a
//! type name. Registration is explicit (see
//! [`register_builtin_nodes`](crate::nodes::register_builtin_nodes)), so there
//! is no dependence on static initialization order.

use std::any::{Any, TypeId};
use std::collections::HashMap;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use super::error::{SceneError, SceneResult};
use super::node::Node;

/// Zero-argument constructor for a concrete node type
pub type NodeFactory = fn() -> Box<dyn Node>;

/// Process-wide registry, created on first use and never reset
static GLOBAL_REGISTRY: Lazy<TypeRegistry> = Lazy::new(TypeRegistry::new);

#[derive(Clone, Copy)]
struct Registration {
    factory: NodeFactory,
    // Concrete type the factory builds, sampled once at registration
    node_type: TypeId,
}

/// Append-only mapping from type name to factory
pub struct TypeRegistry {
    factories: RwLock<HashMap<String, Registration>>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            factories: RwLock::new(HashMap::new()),
        }
    }

    /// The process-wide registry
    pub fn global() -> &'static TypeRegistry {
        &GLOBAL_REGISTRY
    }

    /// Register `factory` under `name`
    ///
    /// Factories are told apart by the concrete node type they build, not by
    /// function address, so re-registering a factory for the same type is
    /// harmless. A factory for a different type under an existing name fails with
    /// [`SceneError::DuplicateTypeRegistration`]; callers should treat that as
    /// fatal at startup.
    pub fn register(&self, name: impl Into<String>, factory: NodeFactory) -> SceneResult<()> {
        let name = name.into();
        let node_type = Any::type_id(factory().as_any());
        let mut factories = self.factories.write();
        match factories.get(&name) {
            Some(existing) if existing.node_type == node_type => Ok(()),
            Some(_) => {
                log::error!("Conflicting registration for node type '{}'", name);
                Err(SceneError::DuplicateTypeRegistration(name))
            }
            None => {
                log::debug!("Registered node type '{}'", name);
                factories.insert(name, Registration { factory, node_type });
                Ok(())
            }
        }
    }

    /// Create a new, default-constructed node of the named type
    ///
    /// Fails with [`SceneError::UnknownNodeType`] without constructing anything
    /// if the name was never registered.
    pub fn create(&self, name: &str) -> SceneResult<Box<dyn Node>> {
        let factory = self
            .factories
            .read()
            .get(name)
            .map(|registration| registration.factory)
            .ok_or_else(|| SceneError::UnknownNodeType(name.to_string()))?;
        Ok(factory())
    }

    /// Whether `name` is registered
    pub fn contains(&self, name: &str) -> bool {
        self.factories.read().contains_key(name)
    }

    /// All registered names, sorted
    pub fn type_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.factories.read().len()
    }

    /// Whether no types are registered
    pub fn is_empty(&self) -> bool {
        self.factories.read().is_empty()
    }
}
