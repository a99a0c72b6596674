//! Core utilities for the softscene renderer.
//!
//! This crate provides foundational types and utilities used across the renderer:
//! - Error types and result aliases
//! - Logging initialization
//! - Timer utilities
//! - Configuration loading

pub mod config;
mod error;
mod logging;
mod timer;

pub use config::{load_toml, parse_toml};
pub use error::{Error, Result};
pub use logging::init_logging;
pub use timer::Timer;
