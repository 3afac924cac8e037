//! Core types and configuration for the newscorr pipeline.
//!
//! This crate provides shared types used across all other crates:
//! - Price, news, indicator and sentiment records
//! - Configuration structures
//! - Common error types

pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use types::*;
