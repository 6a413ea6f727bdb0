//! CLI module for quickblob
//!
//! Argument parsing and the single command the binary runs.

pub mod commands;

pub use commands::*;
