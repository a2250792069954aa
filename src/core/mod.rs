//! core
//!
//! Core domain types and configuration.
//!
//! # Modules
//!
//! - [`types`] - Strong types: RepoCoordinate, ContentRef
//! - [`config`] - Configuration schema and loading

pub mod config;
pub mod types;
