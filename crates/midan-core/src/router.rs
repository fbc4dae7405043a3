//! Hash-location routing.
//!
//! A location is the fragment part of a page address (`#/path?query`). It is
//! parsed once into a [`Location`], and [`route`] turns that into exactly one
//! [`Route`] with its query already typed. Anything unroutable becomes a
//! redirect to [`DEFAULT_PATH`].
//!
//! ```text
//! /events                              -> Route::Events
//! /me/teams                            -> Route::MyTeams
//! /competition/{id}                    -> Route::CompetitionOverview
//! /competition/{id}/team/{teamId}[/..] -> Route::TeamDetail
//! anything else                        -> Route::Redirect("/events")
//! ```

use serde::Serialize;
use std::fmt::Write as _;
use tracing::debug;

use crate::filter::{EventFilter, EventSort, TeamFilter};
use crate::model::Event;

/// Canonical landing path.
pub const DEFAULT_PATH: &str = "/events";

/// Title used when no route-specific title applies.
pub const APP_TITLE: &str = "Midan";

// ---------------------------------------------------------------------------
// Location
// ---------------------------------------------------------------------------

/// Decoded query pairs in their original order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    /// Parse `a=1&b=two+words`. Pairs without `=` get an empty value.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let pairs = raw
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                (decode_form(key), decode_form(value))
            })
            .collect();
        Self(pairs)
    }

    /// First value recorded for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Like [`get`](Self::get), but an empty value counts as absent.
    #[must_use]
    pub fn non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    /// `true` only when the value is exactly `1`.
    #[must_use]
    pub fn flag(&self, key: &str) -> bool {
        self.get(key) == Some("1")
    }
}

/// A parsed hash location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub path: String,
    pub query: QueryParams,
}

impl Location {
    /// Parse `#/path?query`. The leading `#` is optional and an empty
    /// location means [`DEFAULT_PATH`].
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let raw = raw.strip_prefix('#').unwrap_or(raw);
        let (path, query) = raw.split_once('?').unwrap_or((raw, ""));

        let path = if path.is_empty() {
            DEFAULT_PATH.to_string()
        } else if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };

        Self {
            path,
            query: QueryParams::parse(query),
        }
    }

    /// Document title for this location. Competition paths take the event's
    /// name when it resolves.
    #[must_use]
    pub fn title(&self, events: &[Event]) -> String {
        match self.path.as_str() {
            "/events" => format!("Explore Events — {APP_TITLE}"),
            "/me/teams" => format!("My Teams — {APP_TITLE}"),
            path => match path.strip_prefix("/competition/") {
                Some(rest) => {
                    let id = decode_component(rest.split('/').next().unwrap_or_default());
                    events.iter().find(|e| e.id == id).map_or_else(
                        || format!("Event — {APP_TITLE}"),
                        |e| format!("{} — {APP_TITLE}", e.name),
                    )
                }
                None => APP_TITLE.to_string(),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Routes
// ---------------------------------------------------------------------------

/// The single destination selected for a location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "route", rename_all = "snake_case")]
pub enum Route {
    Events {
        filter: EventFilter,
    },
    MyTeams,
    CompetitionOverview {
        event_id: String,
        filter: TeamFilter,
        /// Referral key from a shared link.
        referrer: Option<String>,
    },
    TeamDetail {
        event_id: String,
        /// `None` when the team segment is not a number; the view renders
        /// it as a missing team.
        team_id: Option<u64>,
        /// One-shot join-code prefill from an invite link.
        prefill_code: Option<String>,
    },
    Redirect {
        to: &'static str,
    },
}

/// Select the route for a parsed location.
#[must_use]
pub fn route(location: &Location) -> Route {
    let query = &location.query;
    let route = match location.path.as_str() {
        "/events" => Route::Events {
            filter: EventFilter::from_query(query),
        },
        "/me/teams" => Route::MyTeams,
        path if path.starts_with("/competition/") => competition_route(path, query),
        _ => Route::Redirect { to: DEFAULT_PATH },
    };
    debug!(path = %location.path, ?route, "routed");
    route
}

fn competition_route(path: &str, query: &QueryParams) -> Route {
    let parts: Vec<&str> = path.split('/').collect();
    let event_id = decode_component(parts[2]);

    if parts.len() == 3 {
        return Route::CompetitionOverview {
            event_id,
            filter: TeamFilter::from_query(query),
            referrer: query.non_empty("ref").map(str::to_string),
        };
    }
    if parts.len() >= 5 && parts[3] == "team" {
        return Route::TeamDetail {
            event_id,
            team_id: parts[4].trim().parse().ok(),
            prefill_code: query.non_empty("prefillCode").map(str::to_string),
        };
    }
    Route::Redirect { to: DEFAULT_PATH }
}

// ---------------------------------------------------------------------------
// Typed queries
// ---------------------------------------------------------------------------

impl EventFilter {
    /// Read `q`, `type`, `status` and `sort`. Empty or unknown values mean
    /// no filter and unchanged order.
    #[must_use]
    pub fn from_query(query: &QueryParams) -> Self {
        fn lenient<T: std::str::FromStr>(query: &QueryParams, key: &str) -> Option<T> {
            let raw = query.non_empty(key)?;
            let parsed = raw.parse().ok();
            if parsed.is_none() {
                debug!(key, value = raw, "ignoring unknown query value");
            }
            parsed
        }

        Self {
            search: query.get("q").unwrap_or_default().to_string(),
            event_type: lenient(query, "type"),
            status: lenient(query, "status"),
            sort: lenient(query, "sort"),
        }
    }

    /// Canonical query string. All four keys are always written; a missing
    /// sort is written as `active`.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        let mut out = String::new();
        push_pair(&mut out, "type", self.event_type.map_or("", |t| t.as_str()));
        push_pair(&mut out, "status", self.status.map_or("", |s| s.as_str()));
        push_pair(&mut out, "q", &self.search);
        push_pair(
            &mut out,
            "sort",
            self.sort.unwrap_or(EventSort::Active).as_str(),
        );
        out
    }
}

impl TeamFilter {
    #[must_use]
    pub fn from_query(query: &QueryParams) -> Self {
        Self {
            joinable: query.flag("joinable"),
            public_only: query.flag("public"),
            private_only: query.flag("private"),
            search: query.get("q").unwrap_or_default().to_string(),
        }
    }

    #[must_use]
    pub fn to_query_string(&self) -> String {
        let bit = |on: bool| if on { "1" } else { "0" };
        let mut out = String::new();
        push_pair(&mut out, "joinable", bit(self.joinable));
        push_pair(&mut out, "public", bit(self.public_only));
        push_pair(&mut out, "private", bit(self.private_only));
        push_pair(&mut out, "q", &self.search);
        out
    }
}

fn push_pair(out: &mut String, key: &str, value: &str) {
    if !out.is_empty() {
        out.push('&');
    }
    out.push_str(key);
    out.push('=');
    out.push_str(&encode_form(value));
}

/// Link to an event overview carrying a referral key.
#[must_use]
pub fn share_link(event_id: &str, referrer: &str) -> String {
    format!(
        "#/competition/{}?ref={}",
        encode_component(event_id),
        encode_component(referrer)
    )
}

/// Link to a team's detail page.
#[must_use]
pub fn team_link(event_id: &str, team_id: u64) -> String {
    format!("#/competition/{}/team/{team_id}", encode_component(event_id))
}

// ---------------------------------------------------------------------------
// Percent codec
// ---------------------------------------------------------------------------

/// Form encoding: space becomes `+`, only `A-Za-z0-9*-._` stay literal.
#[must_use]
pub fn encode_form(value: &str) -> String {
    encode(value, b"*-._", true)
}

/// Component encoding: `A-Za-z0-9-_.!~*'()` stay literal, space is `%20`.
#[must_use]
pub fn encode_component(value: &str) -> String {
    encode(value, b"-_.!~*'()", false)
}

fn encode(value: &str, keep: &[u8], plus_for_space: bool) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        if byte.is_ascii_alphanumeric() || keep.contains(&byte) {
            out.push(char::from(byte));
        } else if byte == b' ' && plus_for_space {
            out.push('+');
        } else {
            let _ = write!(out, "%{byte:02X}");
        }
    }
    out
}

fn decode_form(raw: &str) -> String {
    decode(raw, true)
}

fn decode_component(raw: &str) -> String {
    decode(raw, false)
}

/// Malformed escapes are kept literally; invalid UTF-8 is replaced.
fn decode(raw: &str, plus_is_space: bool) -> String {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' if plus_is_space => out.push(b' '),
            b'%' => {
                let hex = bytes
                    .get(i + 1..i + 3)
                    .and_then(|h| std::str::from_utf8(h).ok())
                    .and_then(|h| u8::from_str_radix(h, 16).ok());
                if let Some(byte) = hex {
                    out.push(byte);
                    i += 2;
                } else {
                    out.push(b'%');
                }
            }
            other => out.push(other),
        }
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EventStatus, EventType};
    use crate::seed::seed;
    use chrono::Utc;

    fn route_of(raw: &str) -> Route {
        route(&Location::parse(raw))
    }

    #[test]
    fn empty_location_is_events() {
        assert_eq!(Location::parse("").path, "/events");
        assert_eq!(Location::parse("#").path, "/events");
        assert!(matches!(route_of("#/events"), Route::Events { .. }));
    }

    #[test]
    fn my_teams_route() {
        assert_eq!(route_of("#/me/teams"), Route::MyTeams);
    }

    #[test]
    fn overview_requires_exactly_three_segments() {
        match route_of("#/competition/sonic-trade?ref=guest&joinable=1") {
            Route::CompetitionOverview {
                event_id,
                filter,
                referrer,
            } => {
                assert_eq!(event_id, "sonic-trade");
                assert!(filter.joinable);
                assert_eq!(referrer.as_deref(), Some("guest"));
            }
            other => panic!("unexpected route {other:?}"),
        }
        assert_eq!(
            route_of("#/competition/sonic-trade/"),
            Route::Redirect { to: DEFAULT_PATH }
        );
        assert_eq!(
            route_of("#/competition/sonic-trade/members/1"),
            Route::Redirect { to: DEFAULT_PATH }
        );
    }

    #[test]
    fn detail_parses_team_id_and_prefill() {
        assert_eq!(
            route_of("#/competition/sonic-trade/team/2?prefillCode=BETA1234"),
            Route::TeamDetail {
                event_id: "sonic-trade".into(),
                team_id: Some(2),
                prefill_code: Some("BETA1234".into()),
            }
        );
        assert!(matches!(
            route_of("#/competition/sonic-trade/team/2/extra"),
            Route::TeamDetail { team_id: Some(2), .. }
        ));
    }

    #[test]
    fn non_numeric_team_routes_to_missing_team() {
        assert_eq!(
            route_of("#/competition/sonic-trade/team/abc"),
            Route::TeamDetail {
                event_id: "sonic-trade".into(),
                team_id: None,
                prefill_code: None,
            }
        );
    }

    #[test]
    fn unroutable_paths_redirect() {
        for raw in ["#/", "#/competition", "#/nowhere", "#/me"] {
            assert_eq!(route_of(raw), Route::Redirect { to: DEFAULT_PATH }, "{raw}");
        }
    }

    #[test]
    fn event_query_parses_leniently() {
        let query = QueryParams::parse("type=alpha&status=&q=on+chain&sort=weird");
        let filter = EventFilter::from_query(&query);
        assert_eq!(filter.event_type, Some(EventType::Alpha));
        assert_eq!(filter.status, None);
        assert_eq!(filter.search, "on chain");
        assert_eq!(filter.sort, None);
    }

    #[test]
    fn event_query_string_writes_all_keys() {
        let filter = EventFilter {
            search: "a&b c".into(),
            status: Some(EventStatus::Upcoming),
            ..EventFilter::default()
        };
        assert_eq!(
            filter.to_query_string(),
            "type=&status=upcoming&q=a%26b+c&sort=active"
        );
        let back = EventFilter::from_query(&QueryParams::parse(&filter.to_query_string()));
        assert_eq!(back.search, "a&b c");
        assert_eq!(back.sort, Some(EventSort::Active));
    }

    #[test]
    fn team_query_flags_are_strict_ones() {
        let filter = TeamFilter::from_query(&QueryParams::parse("joinable=true&public=1&private=0"));
        assert!(!filter.joinable);
        assert!(filter.public_only);
        assert!(!filter.private_only);
        assert_eq!(
            filter.to_query_string(),
            "joinable=0&public=1&private=0&q="
        );
    }

    #[test]
    fn share_link_encodes_referrer() {
        assert_eq!(
            share_link("sonic-trade", "0xYOU0…0000"),
            "#/competition/sonic-trade?ref=0xYOU0%E2%80%A60000"
        );
        match route_of(&share_link("sonic-trade", "0xYOU0…0000")) {
            Route::CompetitionOverview { referrer, .. } => {
                assert_eq!(referrer.as_deref(), Some("0xYOU0…0000"));
            }
            other => panic!("unexpected route {other:?}"),
        }
    }

    #[test]
    fn malformed_escapes_survive() {
        assert_eq!(QueryParams::parse("q=100%").get("q"), Some("100%"));
        assert_eq!(QueryParams::parse("q=%zz").get("q"), Some("%zz"));
    }

    #[test]
    fn titles_follow_the_path() {
        let events = seed(Utc::now()).events;
        assert_eq!(
            Location::parse("#/events").title(&events),
            "Explore Events — Midan"
        );
        assert_eq!(Location::parse("#/me/teams").title(&events), "My Teams — Midan");
        assert_eq!(
            Location::parse("#/competition/sonic-hack/team/9").title(&events),
            "Sonic SVM Internal Hackathon Grouping — Midan"
        );
        assert_eq!(
            Location::parse("#/competition/missing").title(&events),
            "Event — Midan"
        );
        assert_eq!(Location::parse("#/elsewhere").title(&events), "Midan");
    }
}
