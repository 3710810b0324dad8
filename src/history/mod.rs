//! Durable history of completed downloads.
//!
//! The store owns an ordered, append-only collection of [`HistoryEntry`]
//! values, most-recent-first, persisted as a single JSON array. Entries are
//! created exactly once, at the moment a request succeeds, and never mutated
//! afterwards.

mod entry;
mod error;
mod store;

pub use entry::HistoryEntry;
pub use error::HistoryError;
pub use store::{HistoryStore, LibraryStats, default_history_path};
