//! Utility functions module
//!
//! Naming rules for containers and local files, and console pauses.

pub mod interactive;
pub mod naming;

pub use interactive::*;
pub use naming::*;
