//! Configuration module for kubectl-sealer
//!
//! This module provides configuration management including:
//! - Config directory resolution
//! - Settings file loading with environment overrides

pub mod paths;
pub mod settings;

pub use paths::SealerPaths;
pub use settings::Settings;
