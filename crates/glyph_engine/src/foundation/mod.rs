//! Foundation module - Core utilities and types
//!
//! - Math types for node transforms
//! - Logging setup shared by the library and the baking tool

pub mod math;
pub mod logging;
