// Faceted listing filters: query sync, state, and listing matching

pub mod matcher;
pub mod query;
pub mod state;

pub use matcher::{filter_listings, matches};
pub use query::QueryParams;
pub use state::{ActiveFilter, FilterState, FilterSync};
