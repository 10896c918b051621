//! # Stowage Selection Engine (`engine`)
//!
//! File: cli/src/engine/mod.rs
//!
//! ## Overview
//!
//! The selection engine turns a rule section and a directory tree into the set
//! of files to package and the path each one gets in the output.
//!
//! ## Architecture
//!
//! - **`resolver`**: flattens a section and its `inherit` chain into `Filters`.
//! - **`matcher`**: compiled glob/regex patterns, first-match-wins lookups and
//!   destination tags.
//! - **`scanner`**: lazy, sorted walk of the package root.
//! - **`selection`**: combines the three into a `ScanResult`.
//!
//! ## Usage
//!
//! ```rust
//! use crate::engine::{resolver, selection};
//!
//! let filters = resolver::resolve(&config, "assets")?;
//! let scan = selection::select(root, &filters)?;
//! for placement in scan.pairs() {
//!     println!("{} -> {}", placement.source.display(), placement.destination.display());
//! }
//! ```
//!
pub mod matcher;
pub mod resolver;
pub mod scanner;
pub mod selection;
