//! # Stowage Core Infrastructure
//!
//! File: cli/src/core/mod.rs
//!
//! ## Overview
//!
//! This module aggregates the infrastructure shared by every command:
//! - `config`: rule file models and loading (JSON or TOML)
//! - `error`: the `StowageError` enum and the crate-wide `Result` alias
//!
//! ## Usage
//!
//! ```rust
//! use crate::core::config::{ConfigSource, PackageConfig};
//! use crate::core::error::{Result, StowageError};
//! ```
//!
pub mod config;
pub mod error;
