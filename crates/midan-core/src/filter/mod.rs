//! Pure filter/sort engines over the catalogue.
//!
//! Both engines return a fresh `Vec` of references and never touch their
//! input, so a view can be rebuilt from the same state any number of times.

pub mod events;
pub mod teams;

pub use events::{EventFilter, EventSort, filter_events, trending_score, trending_strip};
pub use teams::{TeamFilter, filter_and_sort_teams};

/// Case-insensitive substring test used by both search boxes.
pub(crate) fn contains_folded(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}
