//! forgekit - repository content operations and deploy hooks for agents
//!
//! forgekit gives automation agents a small, typed surface over a hosted
//! Git service's file API (read, list, write, delete, tree) plus a deploy
//! hook trigger and a timezone-aware clock.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface layer (parses args, prints JSON)
//! - [`core`] - Domain types and configuration
//! - [`forge`] - Content forge trait, GitHub implementation, mock
//! - [`deploy`] - Deploy target resolution and hook invocation
//! - [`clock`] - Current time in a zone or city
//! - [`ui`] - Output and logging
//!
//! # Concurrency
//!
//! Writes and deletes use optimistic concurrency: the caller supplies the
//! content hash it last read, and a stale hash fails with
//! [`forge::ForgeError::Conflict`]. The library never retries.

pub mod cli;
pub mod clock;
pub mod core;
pub mod deploy;
pub mod forge;
pub mod ui;
