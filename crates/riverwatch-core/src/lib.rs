//! Core types, configuration, and utilities for riverwatch.
//!
//! This crate provides:
//! - Configuration parsing from TOML
//! - Logging setup
//! - Error types shared across the workspace

pub mod config;
pub mod error;
pub mod logging;

pub use config::{Config, ControlConfig};
pub use error::{Error, Result};
