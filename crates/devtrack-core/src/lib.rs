//! Core types, configuration, and error handling for devtrack.
//!
//! This crate provides the shared foundation used by all other devtrack crates:
//! - [`DevtrackError`]: unified error type using `thiserror`
//! - [`TrackerConfig`]: configuration loaded from `.devtrack.toml`
//! - Shared records: [`ProjectMeta`], [`ContributorRecord`], [`EventRecord`],
//!   [`SeriesPoint`], plus [`EventKind`] and [`OutputFormat`]

mod config;
mod error;
mod types;

pub use config::{DashboardConfig, DataConfig, FilterConfig, TagMatch, TrackerConfig};
pub use error::DevtrackError;
pub use types::{
    ContributorRecord, Dated, EventKind, EventRecord, OutputFormat, ProjectMeta, SeriesPoint,
    Titled,
};

/// A convenience `Result` type for devtrack operations.
pub type Result<T> = std::result::Result<T, DevtrackError>;
