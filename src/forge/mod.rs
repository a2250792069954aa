//! forge
//!
//! Access to the file tree of a remote repository (GitHub v1).
//!
//! # Architecture
//!
//! The `ContentForge` trait defines the interface for reading and mutating
//! repository contents. Callers hold a `&dyn ContentForge` and never import
//! a specific implementation directly.
//!
//! # Modules
//!
//! - `traits`: Core `ContentForge` trait, request/response types and `ForgeError`
//! - [`transport`]: Authenticated HTTP transport (headers, timeout, URL assembly)
//! - [`github`]: GitHub implementation over the contents and git trees endpoints
//! - [`tree`]: Tree entry mapping and path prefix filtering
//! - [`mock`]: In-memory implementation for deterministic testing
//! - `factory`: Construction of the configured forge
//!
//! # Example
//!
//! ```ignore
//! use forgekit::forge::{create_forge, ContentForge};
//!
//! let forge = create_forge(&config)?;
//! let listing = forge.list_tree(&repo, "main", true, Some("src/")).await?;
//! println!("{} entries (truncated: {})", listing.entries.len(), listing.truncated);
//! ```

mod factory;
pub mod github;
pub mod mock;
mod traits;
pub mod transport;
pub mod tree;

pub use factory::create_forge;
pub use traits::*;
pub use transport::HttpError;
