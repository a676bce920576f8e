//! Selection and aggregation over developer activity tables.
//!
//! Selects rows by project title or by tag through escaped, case-insensitive
//! regex alternations, and collapses the selected contributor rows into a
//! single monthly time series.

pub mod aggregate;
pub mod filter;

#[cfg(test)]
mod proptests;
