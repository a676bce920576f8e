//! Dataset loading and tag extraction.
//!
//! Reads the three pre-computed CSV datasets (project metadata, monthly
//! contributor counts, monthly GitHub event counts) into immutable tables,
//! memoizes loads in a [`cache::LoadCache`], and derives the normalized tag
//! set from the metadata table's free-text tag column.

pub mod cache;
pub mod dates;
pub mod loader;
pub mod tags;
