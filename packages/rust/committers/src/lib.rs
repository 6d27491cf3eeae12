//! Committers resolution for static documentation sites.
//!
//! This crate provides:
//! - [`exclude`] — glob-based page exclusion
//! - [`GitHistory`] — last-commit-date lookup in the local repository
//! - [`ContributorClient`] — contributors-list fetching and HTML scraping
//! - [`cache`] — the persisted page-authors document
//! - [`BuildSession`] — the lifecycle orchestrator tying it all together

pub mod cache;
pub mod exclude;
pub mod fetch;
pub mod history;
pub mod session;

pub use exclude::exclude;
pub use fetch::{ContributorClient, parse_contributors};
pub use history::GitHistory;
pub use session::BuildSession;
