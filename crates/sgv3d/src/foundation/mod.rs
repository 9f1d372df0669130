//! Foundation module - Core utilities and types
//!
//! - Math types and matrix constructors
//! - Frame clocks
//! - Logging setup

pub mod math;
pub mod time;
pub mod logging;
