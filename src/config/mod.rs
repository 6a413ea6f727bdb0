//! Configuration management module
//!
//! This module handles configuration loading and validation from multiple
//! sources including command-line arguments, environment variables,
//! configuration files, and default values.

pub mod settings;

pub use settings::*;
