//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the scene graph:
//! - Math types and transform composition
//! - Handle-based node storage
//! - Logging initialization

pub mod math;
pub mod collections;
pub mod logging;
