use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Gradient pairs assigned to event covers.
pub const THEME_COLORS: [[&str; 2]; 6] = [
    ["#6366F1", "#8B5CF6"],
    ["#10B981", "#34D399"],
    ["#F59E0B", "#FBBF24"],
    ["#EF4444", "#F87171"],
    ["#3B82F6", "#60A5FA"],
    ["#EC4899", "#F472B6"],
];

/// The kinds of event users can form teams around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Trade,
    Hackathon,
    Official,
    Alpha,
    Competition,
    Launchpad,
    Quest,
}

impl EventType {
    pub const ALL: [Self; 7] = [
        Self::Trade,
        Self::Hackathon,
        Self::Official,
        Self::Alpha,
        Self::Competition,
        Self::Launchpad,
        Self::Quest,
    ];

    /// Query-string key, also the prefix of generated event ids.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trade => "trade",
            Self::Hackathon => "hackathon",
            Self::Official => "official",
            Self::Alpha => "alpha",
            Self::Competition => "competition",
            Self::Launchpad => "launchpad",
            Self::Quest => "quest",
        }
    }

    /// Human label shown on cards and filter chips.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Trade => "Trade",
            Self::Hackathon => "Hackathon",
            Self::Official => "Official",
            Self::Alpha => "Alpha Finding",
            Self::Competition => "Competition",
            Self::Launchpad => "Launchpad",
            Self::Quest => "Quest",
        }
    }
}

/// Where an event sits relative to "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Upcoming,
    Ongoing,
    Completed,
}

impl EventStatus {
    /// `now < start` is upcoming, `now > end` is completed, anything else
    /// (both bounds inclusive) is ongoing.
    #[must_use]
    pub fn at(start: DateTime<Utc>, end: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        if now < start {
            Self::Upcoming
        } else if now > end {
            Self::Completed
        } else {
            Self::Ongoing
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::Ongoing => "ongoing",
            Self::Completed => "completed",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Upcoming => "Upcoming",
            Self::Ongoing => "Ongoing",
            Self::Completed => "Completed",
        }
    }
}

/// A time-boxed activity users form teams around.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub name: String,
    pub subtitle: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub tags: Vec<String>,
    pub color: [String; 2],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_cap: Option<u32>,
}

impl Event {
    #[must_use]
    pub fn status(&self, now: DateTime<Utc>) -> EventStatus {
        EventStatus::at(self.start, self.end, now)
    }

    #[must_use]
    pub fn is_ongoing(&self, now: DateTime<Utc>) -> bool {
        self.status(now) == EventStatus::Ongoing
    }

    /// Calendar-date span, e.g. `2025-03-01 – 2025-03-15`.
    #[must_use]
    pub fn date_range(&self) -> String {
        format!(
            "{} – {}",
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        )
    }
}

/// Error returned when parsing an enum value from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    pub expected: &'static str,
    pub got: String,
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: '{}'", self.expected, self.got)
    }
}

impl std::error::Error for ParseEnumError {}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn normalize(input: &str) -> String {
    input.trim().to_ascii_lowercase()
}

impl FromStr for EventType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize(s);
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| ParseEnumError {
                expected: "event type",
                got: s.to_string(),
            })
    }
}

impl FromStr for EventStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "upcoming" => Ok(Self::Upcoming),
            "ongoing" => Ok(Self::Ongoing),
            "completed" => Ok(Self::Completed),
            _ => Err(ParseEnumError {
                expected: "status",
                got: s.to_string(),
            }),
        }
    }
}
