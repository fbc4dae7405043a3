//! Per-event emoji reaction counters and the session user's selection.
//!
//! Serialized as one blob (`{counts, user}`) and written back after every
//! mutation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Storage key of the reaction blob.
pub const REACTIONS_KEY: &str = "midan:reactions:v1";

/// The reaction that drives trending and the "Hot" mood.
pub const FIRE: &str = "🔥";

/// Reaction counters plus the user's active reaction per event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReactionState {
    pub counts: BTreeMap<String, BTreeMap<String, u64>>,
    /// Older blobs store a cleared selection as `null`.
    pub user: BTreeMap<String, Option<String>>,
}

/// What a [`ReactionState::set_reaction`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionChange {
    Set,
    Cleared,
}

impl ReactionState {
    /// Count for one emoji on one event.
    #[must_use]
    pub fn count(&self, event_id: &str, emoji: &str) -> u64 {
        self.counts
            .get(event_id)
            .and_then(|counts| counts.get(emoji))
            .copied()
            .unwrap_or(0)
    }

    /// All counts for an event, with the fire counter always present.
    #[must_use]
    pub fn counts_for(&self, event_id: &str) -> BTreeMap<String, u64> {
        let mut counts = self.counts.get(event_id).cloned().unwrap_or_default();
        counts.entry(FIRE.to_string()).or_insert(0);
        counts
    }

    /// The user's active reaction on an event.
    #[must_use]
    pub fn selected(&self, event_id: &str) -> Option<&str> {
        self.user.get(event_id).and_then(Option::as_deref)
    }

    /// Toggle the user's reaction on `event_id`.
    ///
    /// Picking the active emoji clears it; picking another moves the single
    /// selection, decrementing the previous emoji only while its count is
    /// positive.
    pub fn set_reaction(&mut self, event_id: &str, emoji: &str) -> ReactionChange {
        let previous = self.selected(event_id).map(str::to_string);
        let counts = self.counts.entry(event_id.to_string()).or_default();

        if let Some(prev) = &previous {
            if let Some(count) = counts.get_mut(prev.as_str()) {
                if *count > 0 {
                    *count -= 1;
                }
            }
        }

        if previous.as_deref() == Some(emoji) {
            self.user.remove(event_id);
            return ReactionChange::Cleared;
        }

        *counts.entry(emoji.to_string()).or_insert(0) += 1;
        self.user.insert(event_id.to_string(), Some(emoji.to_string()));
        ReactionChange::Set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_reaction_sets_and_counts() {
        let mut state = ReactionState::default();
        assert_eq!(state.set_reaction("sonic-trade", FIRE), ReactionChange::Set);
        assert_eq!(state.count("sonic-trade", FIRE), 1);
        assert_eq!(state.selected("sonic-trade"), Some(FIRE));
    }

    #[test]
    fn same_emoji_twice_restores_prior_state() {
        let mut state = ReactionState::default();
        state.counts.entry("e".into()).or_default().insert(FIRE.into(), 5);
        let before_count = state.count("e", FIRE);
        let before_selected = state.selected("e").map(str::to_string);

        state.set_reaction("e", FIRE);
        assert_eq!(state.set_reaction("e", FIRE), ReactionChange::Cleared);

        assert_eq!(state.count("e", FIRE), before_count);
        assert_eq!(state.selected("e").map(str::to_string), before_selected);
    }

    #[test]
    fn switching_emoji_moves_the_single_selection() {
        let mut state = ReactionState::default();
        state.set_reaction("e", FIRE);
        state.set_reaction("e", "👀");
        assert_eq!(state.count("e", FIRE), 0);
        assert_eq!(state.count("e", "👀"), 1);
        assert_eq!(state.selected("e"), Some("👀"));
    }

    #[test]
    fn previous_count_is_floored_at_zero() {
        let mut state = ReactionState::default();
        state.user.insert("e".into(), Some(FIRE.into()));
        state.set_reaction("e", "👀");
        assert_eq!(state.count("e", FIRE), 0);
        assert_eq!(state.count("e", "👀"), 1);
    }

    #[test]
    fn counts_for_always_includes_fire() {
        let state = ReactionState::default();
        assert_eq!(state.counts_for("nope").get(FIRE), Some(&0));
    }

    #[test]
    fn blob_with_null_selection_parses() {
        let raw = r#"{"counts":{"e":{"🔥":2}},"user":{"e":null}}"#;
        let state: ReactionState = serde_json::from_str(raw).expect("parse blob");
        assert_eq!(state.count("e", FIRE), 2);
        assert_eq!(state.selected("e"), None);
    }

    #[test]
    fn blob_missing_fields_defaults() {
        let state: ReactionState = serde_json::from_str("{}").expect("parse blob");
        assert_eq!(state, ReactionState::default());
    }
}
