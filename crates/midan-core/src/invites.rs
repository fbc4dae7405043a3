//! Referral attribution: how many times a shared event link was opened, and
//! by whose link.

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// Storage key of the invite blob.
pub const INVITES_KEY: &str = "midan:invites:v1";

/// Referral key used when no wallet is connected.
pub const GUEST_REF: &str = "guest";

/// How many referrers the stats view lists.
const TOP_REFS: usize = 3;

/// Per-referrer open counts in first-seen order.
///
/// Stored as a JSON object whose key order is the order referrers were first
/// counted; ties in the stats keep that order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefCounts(Vec<(String, u64)>);

impl RefCounts {
    fn bump(&mut self, referrer: &str) {
        match self.0.iter_mut().find(|(key, _)| key == referrer) {
            Some((_, count)) => *count += 1,
            None => self.0.push((referrer.to_string(), 1)),
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(key, count)| (key.as_str(), *count))
    }
}

impl Serialize for RefCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.entries())
    }
}

impl<'de> Deserialize<'de> for RefCounts {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RefCountsVisitor;

        impl<'de> Visitor<'de> for RefCountsVisitor {
            type Value = RefCounts;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of referrer to open count")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<RefCounts, A::Error> {
                let mut counts = RefCounts::default();
                while let Some((key, count)) = map.next_entry::<String, u64>()? {
                    // A repeated key replaces the earlier value in place.
                    match counts.0.iter_mut().find(|(k, _)| *k == key) {
                        Some((_, existing)) => *existing = count,
                        None => counts.0.push((key, count)),
                    }
                }
                Ok(counts)
            }
        }

        deserializer.deserialize_map(RefCountsVisitor)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EventInvites {
    pub total: u64,
    pub by_ref: RefCounts,
}

/// Persisted invite counters for every event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InviteState {
    pub by_event: BTreeMap<String, EventInvites>,
}

/// Summary shown on the competition overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InviteStats {
    pub total: u64,
    pub top_refs: Vec<(String, u64)>,
}

impl InviteState {
    /// Count one open of `event_id`'s shared link from referrer `referrer`.
    pub fn record_open(&mut self, event_id: &str, referrer: &str) {
        let entry = self.by_event.entry(event_id.to_string()).or_default();
        entry.total += 1;
        entry.by_ref.bump(referrer);
    }

    /// Total opens and the top referrers by count. Equal counts keep
    /// first-seen order.
    #[must_use]
    pub fn stats(&self, event_id: &str) -> InviteStats {
        let Some(entry) = self.by_event.get(event_id) else {
            return InviteStats {
                total: 0,
                top_refs: Vec::new(),
            };
        };
        let mut refs: Vec<(String, u64)> = entry
            .by_ref
            .entries()
            .map(|(key, count)| (key.to_string(), count))
            .collect();
        refs.sort_by(|a, b| b.1.cmp(&a.1));
        refs.truncate(TOP_REFS);
        InviteStats {
            total: entry.total,
            top_refs: refs,
        }
    }
}

/// Session-scoped set of (event, referrer) pairs already attributed.
#[derive(Debug, Clone, Default)]
pub struct SeenRefs {
    seen: HashSet<(String, String)>,
}

impl SeenRefs {
    /// Mark the pair as seen; `true` when this is its first sighting.
    pub fn first_sighting(&mut self, event_id: &str, referrer: &str) -> bool {
        self.seen
            .insert((event_id.to_string(), referrer.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_open_counts_total_and_by_ref() {
        let mut state = InviteState::default();
        state.record_open("sonic-trade", "0xA100…0000");
        state.record_open("sonic-trade", "0xA100…0000");
        state.record_open("sonic-trade", "guest");
        let stats = state.stats("sonic-trade");
        assert_eq!(stats.total, 3);
        assert_eq!(stats.top_refs[0], ("0xA100…0000".to_string(), 2));
    }

    #[test]
    fn stats_keep_top_three() {
        let mut state = InviteState::default();
        for (key, n) in [("a", 1), ("b", 4), ("c", 2), ("d", 3)] {
            for _ in 0..n {
                state.record_open("e", key);
            }
        }
        let stats = state.stats("e");
        let keys: Vec<_> = stats.top_refs.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["b", "d", "c"]);
        assert_eq!(stats.total, 10);
    }

    #[test]
    fn tied_referrers_keep_first_seen_order() {
        let mut state = InviteState::default();
        for key in ["zed", "amy", "mia", "amy", "zed", "mia", "bob"] {
            state.record_open("e", key);
        }
        let keys: Vec<_> = state
            .stats("e")
            .top_refs
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(keys, ["zed", "amy", "mia"]);
    }

    #[test]
    fn ref_order_survives_the_blob() {
        let raw = r#"{"byEvent":{"e":{"total":4,"byRef":{"zed":2,"amy":2}}}}"#;
        let state: InviteState = serde_json::from_str(raw).expect("parse");
        assert_eq!(state.stats("e").top_refs[0].0, "zed");
        assert_eq!(serde_json::to_string(&state).expect("serialize"), raw);
    }

    #[test]
    fn unknown_event_has_empty_stats() {
        let stats = InviteState::default().stats("nope");
        assert_eq!(stats.total, 0);
        assert!(stats.top_refs.is_empty());
    }

    #[test]
    fn blob_uses_camel_case_keys() {
        let mut state = InviteState::default();
        state.record_open("e", "r");
        let json = serde_json::to_value(&state).expect("serialize");
        assert_eq!(json["byEvent"]["e"]["byRef"]["r"], 1);
        assert_eq!(json["byEvent"]["e"]["total"], 1);
    }

    #[test]
    fn seen_refs_dedupes_pairs() {
        let mut seen = SeenRefs::default();
        assert!(seen.first_sighting("e", "r"));
        assert!(!seen.first_sighting("e", "r"));
        assert!(seen.first_sighting("e", "s"));
        assert!(seen.first_sighting("f", "r"));
    }
}
