//! Shared types, error model, and configuration for bylines.
//!
//! This crate is the foundation depended on by the other bylines crates.
//! It provides:
//! - [`BylinesError`] — the unified error type
//! - Domain types ([`Contributor`], [`PageCacheEntry`], [`CacheDocument`], [`PageContext`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{AppConfig, CONFIG_FILE_NAME, init_config, load_config, load_config_from};
pub use error::{BylinesError, Result};
pub use types::{
    CacheDocument, Contributor, DATE_FORMAT, PageCacheEntry, PageContext, today_utc,
};
