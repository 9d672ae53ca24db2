//! Filtering, deep search and pagination of the main listing.
//!
//! A local filter is a case-insensitive substring match over the loaded
//! entries. Deep search replaces the view with the result of a recursive
//! server-side search; it runs only when explicitly performed.

mod pagination;
mod state;

pub use pagination::Pagination;
pub use state::{SearchFilter, SearchOutcome, SearchTicket};
