//! Core crate for Spendwise.
//!
//! # Architecture
//!
//! - [`types`] — [`ProviderIdentity`], the closed set of upstream vendors
//! - [`config`] — JSON config schema, loader, and env var overrides
//! - [`utils`] — data directory paths, timestamps, string helpers

pub mod config;
pub mod types;
pub mod utils;

pub use types::{ParseProviderError, ProviderIdentity};
