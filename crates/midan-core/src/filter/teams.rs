use serde::Serialize;
use std::cmp::Reverse;
use tracing::debug;

use crate::filter::contains_folded;
use crate::model::Team;

/// Filters of an event's team list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TeamFilter {
    /// Keep only teams with an open spot.
    pub joinable: bool,
    pub public_only: bool,
    pub private_only: bool,
    /// Matches the team name or the captain's short address.
    pub search: String,
}

impl TeamFilter {
    /// Privacy filter in effect. Setting both flags cancels privacy
    /// filtering entirely.
    #[must_use]
    pub const fn privacy(&self) -> Option<bool> {
        match (self.public_only, self.private_only) {
            (true, false) => Some(false),
            (false, true) => Some(true),
            _ => None,
        }
    }
}

/// Filter, then order by member count descending and newest first.
#[must_use]
pub fn filter_and_sort_teams<'a>(teams: &'a [Team], filter: &TeamFilter) -> Vec<&'a Team> {
    let needle = filter.search.to_lowercase();
    let privacy = filter.privacy();

    let mut out: Vec<&Team> = teams
        .iter()
        .filter(|t| !filter.joinable || !t.is_full())
        .filter(|t| privacy.is_none_or(|private| t.is_private == private))
        .filter(|t| {
            needle.is_empty()
                || contains_folded(&t.name, &needle)
                || contains_folded(&t.captain.short(), &needle)
        })
        .collect();

    out.sort_by_key(|t| (Reverse(t.member_count()), Reverse(t.created_at)));

    debug!(total = teams.len(), matched = out.len(), "teams filtered");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::seed;
    use chrono::Utc;

    fn names<'a>(teams: &[&'a Team]) -> Vec<&'a str> {
        teams.iter().map(|t| t.name.as_str()).collect()
    }

    fn trade_teams() -> Vec<Team> {
        seed(Utc::now()).teams["sonic-trade"].clone()
    }

    #[test]
    fn default_orders_by_size_then_recency() {
        let teams = trade_teams();
        let out = filter_and_sort_teams(&teams, &TeamFilter::default());
        assert_eq!(
            names(&out),
            ["Gamma Traders", "Alpha Squad", "Beta Wolves", "Delta Focus"]
        );
    }

    #[test]
    fn joinable_excludes_exactly_the_full_team() {
        let teams = trade_teams();
        let filter = TeamFilter {
            joinable: true,
            ..TeamFilter::default()
        };
        let out = filter_and_sort_teams(&teams, &filter);
        assert_eq!(out.len(), 3);
        assert!(out.iter().all(|t| t.name != "Gamma Traders"));
    }

    #[test]
    fn single_privacy_flag_filters() {
        let teams = trade_teams();
        let private = TeamFilter {
            private_only: true,
            ..TeamFilter::default()
        };
        assert_eq!(
            names(&filter_and_sort_teams(&teams, &private)),
            ["Beta Wolves", "Delta Focus"]
        );

        let public = TeamFilter {
            public_only: true,
            ..TeamFilter::default()
        };
        assert_eq!(
            names(&filter_and_sort_teams(&teams, &public)),
            ["Gamma Traders", "Alpha Squad"]
        );
    }

    #[test]
    fn both_privacy_flags_cancel_out() {
        let teams = trade_teams();
        let both = TeamFilter {
            public_only: true,
            private_only: true,
            ..TeamFilter::default()
        };
        assert_eq!(filter_and_sort_teams(&teams, &both).len(), 4);
    }

    #[test]
    fn search_matches_name_or_captain_short_form() {
        let teams = trade_teams();
        let by_name = TeamFilter {
            search: "wolves".into(),
            ..TeamFilter::default()
        };
        assert_eq!(names(&filter_and_sort_teams(&teams, &by_name)), ["Beta Wolves"]);

        let by_captain = TeamFilter {
            search: "0xD1".into(),
            ..TeamFilter::default()
        };
        assert_eq!(names(&filter_and_sort_teams(&teams, &by_captain)), ["Delta Focus"]);
    }

    #[test]
    fn search_keeps_surrounding_whitespace() {
        let teams = trade_teams();
        let padded = TeamFilter {
            search: " wolves".into(),
            ..TeamFilter::default()
        };
        assert_eq!(names(&filter_and_sort_teams(&teams, &padded)), ["Beta Wolves"]);

        let blank = TeamFilter {
            search: "   ".into(),
            ..TeamFilter::default()
        };
        assert!(filter_and_sort_teams(&teams, &blank).is_empty());
    }
}
