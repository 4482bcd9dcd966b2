//! Built-in node library
//!
//! Every type here is registered through the same public
//! [`TypeRegistry::register`] call a plugin would use; see
//! [`register_builtin_nodes`].
//!
//! | Type               | Slots                          | Renders as  |
//! |--------------------|--------------------------------|-------------|
//! | [`Group`]          | `child`                        | -           |
//! | [`Transform`]      | `child`                        | -           |
//! | [`Sphere`]         | -                              | geometry    |
//! | [`StreamLines`]    | -                              | geometry    |
//! | [`CoordFrame`]     | -                              | geometry    |
//! | [`Camera`]         | -                              | camera      |
//! | [`PointLight`]     | -                              | light       |
//! | [`DirectionalLight`] | -                            | light       |
//! | [`Renderer`]       | `camera`, `model`, `light`     | renderer    |

use crate::foundation::collections::NodeId;
use crate::scene::{
    NodeCore, NodeDescription, ParamType, ParamValue, SceneError, SceneResult, TypeRegistry,
    DEFAULT_SLOT,
};

/// Implements the bookkeeping half of [`Node`](crate::scene::Node) for a
/// struct with a `core: NodeCore` field and a `TYPE_NAME` constant
macro_rules! node_boilerplate {
    () => {
        fn core(&self) -> &$crate::scene::NodeCore {
            &self.core
        }

        fn core_mut(&mut self) -> &mut $crate::scene::NodeCore {
            &mut self.core
        }

        fn as_any(&self) -> &dyn ::std::any::Any {
            self
        }

        fn type_name(&self) -> &'static str {
            Self::TYPE_NAME
        }
    };
}

mod camera;
mod coord_frame;
mod group;
mod light;
mod renderer;
mod sphere;
mod streamlines;
mod transform;

pub use camera::Camera;
pub use coord_frame::{CoordFrame, TriangleMesh};
pub use group::Group;
pub use light::{DirectionalLight, PointLight};
pub use renderer::{Renderer, ShadeMode};
pub use sphere::Sphere;
pub use streamlines::StreamLines;
pub use transform::Transform;

/// Register every built-in node type with `registry`
///
/// Idempotent for the same registry. Fails only if one of the names is
/// already taken by a different factory.
pub fn register_builtin_nodes(registry: &TypeRegistry) -> SceneResult<()> {
    registry.register(Group::TYPE_NAME, Group::create)?;
    registry.register(Transform::TYPE_NAME, Transform::create)?;
    registry.register(Sphere::TYPE_NAME, Sphere::create)?;
    registry.register(StreamLines::TYPE_NAME, StreamLines::create)?;
    registry.register(CoordFrame::TYPE_NAME, CoordFrame::create)?;
    registry.register(Camera::TYPE_NAME, Camera::create)?;
    registry.register(PointLight::TYPE_NAME, PointLight::create)?;
    registry.register(DirectionalLight::TYPE_NAME, DirectionalLight::create)?;
    registry.register(Renderer::TYPE_NAME, Renderer::create)?;
    log::info!("Registered built-in node types ({} total)", registry.len());
    Ok(())
}

/// Copy the values named in `schema` from `description` into parameters
///
/// Values of the wrong type are skipped and the first one is reported as a
/// [`SceneError::TypeMismatch`]; the rest of the schema is still copied. A
/// `Node` entry also accepts a by-name reference, resolved later by the
/// builder.
pub(crate) fn copy_values(
    core: &mut NodeCore,
    description: &NodeDescription,
    schema: &[(&str, ParamType)],
) -> SceneResult<()> {
    let mut first_error = None;
    for (name, expected) in schema {
        let Some(value) = description.value(name) else {
            continue;
        };
        let found = value.type_tag();
        if found == *expected || (*expected == ParamType::Node && found == ParamType::Reference) {
            core.set_value(*name, value.clone());
        } else if first_error.is_none() {
            first_error = Some(SceneError::TypeMismatch {
                name: (*name).to_string(),
                expected: *expected,
                found,
            });
        }
    }
    first_error.map_or(Ok(()), Err)
}

/// Count as an `Int` render attribute
pub(crate) fn count_value(count: usize) -> ParamValue {
    ParamValue::Int(i32::try_from(count).unwrap_or(i32::MAX))
}

/// Ordered list of owned children behind the default `child` slot
#[derive(Debug, Default, Clone)]
pub(crate) struct ChildList {
    ids: Vec<NodeId>,
}

impl ChildList {
    pub(crate) fn attach(&mut self, owner: &str, slot: &str, child: NodeId) -> SceneResult<()> {
        if slot != DEFAULT_SLOT {
            return Err(SceneError::unknown_slot(owner, slot));
        }
        self.ids.push(child);
        Ok(())
    }

    pub(crate) fn detach(&mut self, child: NodeId) -> bool {
        let before = self.ids.len();
        self.ids.retain(|id| *id != child);
        self.ids.len() != before
    }

    pub(crate) fn ids(&self) -> &[NodeId] {
        &self.ids
    }

    pub(crate) fn len(&self) -> usize {
        self.ids.len()
    }
}
