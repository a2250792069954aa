//! ui
//!
//! Output and logging.
//!
//! # Modules
//!
//! - [`output`] - JSON output, error documents, logger setup

pub mod output;
