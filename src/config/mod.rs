//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Config struct definitions and loading
//! - [`defaults`]: serde default value functions
//! - [`validation`]: startup validation

pub mod defaults;
mod types;
pub mod validation;

pub use types::{
    Config, ConfigError, HttpConfig, LimitsConfig, ListenConfig, LivenessConfig, ServerConfig,
};
