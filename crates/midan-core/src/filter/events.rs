use chrono::{DateTime, Utc};
use serde::Serialize;
use std::{fmt, str::FromStr};
use tracing::debug;

use crate::filter::contains_folded;
use crate::model::{Event, EventStatus, EventType, ParseEnumError};
use crate::reactions::{FIRE, ReactionState};

/// How many events the trending strip shows.
const TRENDING_STRIP_LEN: usize = 3;

/// Ordering applied after the events are filtered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventSort {
    /// Descending trending score.
    Trending,
    /// Ongoing events first.
    Active,
}

impl EventSort {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trending => "trending",
            Self::Active => "active",
        }
    }
}

impl fmt::Display for EventSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventSort {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trending" => Ok(Self::Trending),
            "active" => Ok(Self::Active),
            _ => Err(ParseEnumError {
                expected: "sort",
                got: s.to_string(),
            }),
        }
    }
}

/// Filters of the events list. `None` and an empty search mean "no filter".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EventFilter {
    pub search: String,
    pub event_type: Option<EventType>,
    pub status: Option<EventStatus>,
    /// `None` keeps the filtered order.
    pub sort: Option<EventSort>,
}

impl EventFilter {
    /// True when neither a type nor a status narrows the list (the "All" chip).
    #[must_use]
    pub const fn is_all(&self) -> bool {
        self.event_type.is_none() && self.status.is_none()
    }
}

/// Trending score: one point per fire reaction, plus 1 while ongoing or 0.2
/// while upcoming.
#[must_use]
pub fn trending_score(event: &Event, now: DateTime<Utc>, reactions: &ReactionState) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let fire = reactions.count(&event.id, FIRE) as f64;
    let boost = match event.status(now) {
        EventStatus::Ongoing => 1.0,
        EventStatus::Upcoming => 0.2,
        EventStatus::Completed => 0.0,
    };
    fire + boost
}

/// Apply search, type, status and sort, in that order.
#[must_use]
pub fn filter_events<'a>(
    events: &'a [Event],
    filter: &EventFilter,
    now: DateTime<Utc>,
    reactions: &ReactionState,
) -> Vec<&'a Event> {
    let needle = filter.search.to_lowercase();
    let mut out: Vec<&Event> = events
        .iter()
        .filter(|e| {
            needle.is_empty()
                || contains_folded(&e.name, &needle)
                || contains_folded(&e.subtitle, &needle)
        })
        .filter(|e| filter.event_type.is_none_or(|kind| e.event_type == kind))
        .filter(|e| filter.status.is_none_or(|status| e.status(now) == status))
        .collect();

    match filter.sort {
        Some(EventSort::Trending) => {
            out.sort_by(|a, b| {
                trending_score(b, now, reactions).total_cmp(&trending_score(a, now, reactions))
            });
        }
        Some(EventSort::Active) => {
            out.sort_by_key(|e| !e.is_ongoing(now));
        }
        None => {}
    }

    debug!(
        total = events.len(),
        matched = out.len(),
        sort = filter.sort.map_or("none", EventSort::as_str),
        "events filtered"
    );
    out
}

/// Up to three events with at least one fire reaction, hottest first.
#[must_use]
pub fn trending_strip<'a>(events: &'a [Event], reactions: &ReactionState) -> Vec<(&'a Event, u64)> {
    let mut hot: Vec<(&Event, u64)> = events
        .iter()
        .map(|e| (e, reactions.count(&e.id, FIRE)))
        .filter(|(_, fire)| *fire > 0)
        .collect();
    hot.sort_by(|a, b| b.1.cmp(&a.1));
    hot.truncate(TRENDING_STRIP_LEN);
    hot
}
