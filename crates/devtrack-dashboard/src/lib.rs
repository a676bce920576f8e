//! The reactive dashboard controller.
//!
//! A [`DashboardContext`] is built once from configuration and holds the
//! loaded tables. Each call to [`DashboardContext::render`] is one full pass:
//! project and tag selections go through the filter engine and aggregator
//! into chart specs, collected in a [`DashboardView`]. A [`Session`] keeps the
//! current selection across interactions and re-renders after every change.

mod context;
mod session;
mod view;

pub use context::{DashboardContext, Selection};
pub use session::{Interaction, InteractionError, Outcome, Session, HELP};
pub use view::{DashboardCharts, DashboardView};
