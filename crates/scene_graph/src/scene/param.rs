//! Named, typed node parameters
//!
//! A [`Parameter`] is type-erased at the node boundary (it stores a
//! [`ParamValue`]) and concretely typed at the retrieval site through
//! [`ParamData`]. Parameters are never edited in place: a node replaces the
//! whole parameter when a value changes.

use serde::{Deserialize, Serialize};

use super::error::{SceneError, SceneResult};
use crate::foundation::collections::NodeId;
use crate::foundation::math::Vec3;

/// Type tag of a parameter value, available without inspecting the payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ParamType {
    /// `bool`
    Bool,
    /// `i32`
    Int,
    /// `f32`
    Float,
    /// [`Vec3`]
    Vec3,
    /// `String`
    Text,
    /// `Vec<i32>`
    IntArray,
    /// `Vec<f32>`
    FloatArray,
    /// `Vec<Vec3>`
    Vec3Array,
    /// Non-owning handle to another node in the same graph
    Node,
    /// Reference to another node by name, as written in descriptions
    Reference,
}

/// Name of a node referenced from a description, resolved to a [`NodeId`] after building
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeRef(pub String);

/// Type-erased parameter value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParamValue {
    /// Boolean flag
    Bool(bool),
    /// Signed integer
    Int(i32),
    /// Scalar float
    Float(f32),
    /// 3-component vector
    Vec3(Vec3),
    /// String
    Text(String),
    /// Integer array
    IntArray(Vec<i32>),
    /// Float array
    FloatArray(Vec<f32>),
    /// Vector array
    Vec3Array(Vec<Vec3>),
    /// Resolved, non-owning node handle; only meaningful inside one graph
    #[serde(skip)]
    Node(NodeId),
    /// Unresolved by-name node reference
    Reference(NodeRef),
}

impl ParamValue {
    /// Type tag of this value
    pub fn type_tag(&self) -> ParamType {
        match self {
            Self::Bool(_) => ParamType::Bool,
            Self::Int(_) => ParamType::Int,
            Self::Float(_) => ParamType::Float,
            Self::Vec3(_) => ParamType::Vec3,
            Self::Text(_) => ParamType::Text,
            Self::IntArray(_) => ParamType::IntArray,
            Self::FloatArray(_) => ParamType::FloatArray,
            Self::Vec3Array(_) => ParamType::Vec3Array,
            Self::Node(_) => ParamType::Node,
            Self::Reference(_) => ParamType::Reference,
        }
    }
}

/// Rust types that can be stored in a [`Parameter`]
pub trait ParamData: Sized + Clone + 'static {
    /// Tag stored alongside values of this type
    const TYPE: ParamType;

    /// Borrow the payload if `value` holds this type
    fn from_value(value: &ParamValue) -> Option<&Self>;

    /// Wrap into a type-erased value
    fn into_value(self) -> ParamValue;
}

macro_rules! param_data {
    ($ty:ty, $variant:ident) => {
        impl ParamData for $ty {
            const TYPE: ParamType = ParamType::$variant;

            fn from_value(value: &ParamValue) -> Option<&Self> {
                match value {
                    ParamValue::$variant(inner) => Some(inner),
                    _ => None,
                }
            }

            fn into_value(self) -> ParamValue {
                ParamValue::$variant(self)
            }
        }

        impl From<$ty> for ParamValue {
            fn from(value: $ty) -> Self {
                ParamValue::$variant(value)
            }
        }
    };
}

param_data!(bool, Bool);
param_data!(i32, Int);
param_data!(f32, Float);
param_data!(Vec3, Vec3);
param_data!(String, Text);
param_data!(Vec<i32>, IntArray);
param_data!(Vec<f32>, FloatArray);
param_data!(Vec<Vec3>, Vec3Array);
param_data!(NodeId, Node);
param_data!(NodeRef, Reference);

/// A named, typed value owned by one node
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    name: String,
    value: ParamValue,
}

impl Parameter {
    /// Create a parameter holding `value`
    pub fn new<T: ParamData>(name: impl Into<String>, value: T) -> Self {
        Self::from_value(name, value.into_value())
    }

    /// Create a parameter from an already type-erased value
    pub fn from_value(name: impl Into<String>, value: ParamValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// Parameter name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type tag of the stored value
    pub fn type_tag(&self) -> ParamType {
        self.value.type_tag()
    }

    /// The stored value, type-erased
    pub fn value(&self) -> &ParamValue {
        &self.value
    }

    /// The stored value as `T`
    ///
    /// Fails with [`SceneError::TypeMismatch`] if `T` is not the stored type.
    pub fn value_as<T: ParamData>(&self) -> SceneResult<&T> {
        T::from_value(&self.value).ok_or_else(|| SceneError::TypeMismatch {
            name: self.name.clone(),
            expected: T::TYPE,
            found: self.type_tag(),
        })
    }
}
