//! The mock catalogue every session starts from.
//!
//! Times are relative to `now`, so the same events are ongoing or upcoming
//! no matter when the seed is built.

use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;

use crate::model::event::THEME_COLORS;
use crate::model::{Address, Event, EventType, Team};

/// Seeded events plus the team list of each event.
#[derive(Debug, Clone)]
pub struct SeedCatalog {
    pub events: Vec<Event>,
    pub teams: BTreeMap<String, Vec<Team>>,
}

fn event(
    id: &str,
    name: &str,
    subtitle: &str,
    (start, end): (DateTime<Utc>, DateTime<Utc>),
    event_type: EventType,
    tags: &[&str],
    color: usize,
) -> Event {
    let [from, to] = THEME_COLORS[color % THEME_COLORS.len()];
    Event {
        id: id.to_string(),
        name: name.to_string(),
        subtitle: subtitle.to_string(),
        start,
        end,
        event_type,
        tags: tags.iter().map(|t| (*t).to_string()).collect(),
        color: [from.to_string(), to.to_string()],
        team_cap: None,
    }
}

fn addrs(seeds: &[&str]) -> Vec<Address> {
    seeds.iter().map(|seed| Address::mock(seed)).collect()
}

/// Build the seeded catalogue: six events, four teams on `sonic-trade`.
#[must_use]
pub fn seed(now: DateTime<Utc>) -> SeedCatalog {
    let day = Duration::days(1);
    let span = |from: i64, to: i64| (now + Duration::days(from), now + Duration::days(to));

    let events = vec![
        event(
            "sonic-trade",
            "Sonic SVM On‑Chain Trading Competition",
            "A trading tournament hosted by Sonic SVM with a prize pool of up to $1,000,000. Form a team and climb the leaderboard.",
            span(-1, 14),
            EventType::Trade,
            &["Trading", "DeFi"],
            0,
        ),
        event(
            "sonic-hack",
            "Sonic SVM Internal Hackathon Grouping",
            "Team up for the Sonic SVM internal hackathon. Find collaborators and build fast.",
            span(-2, 7),
            EventType::Hackathon,
            &["Hackathon", "Builders"],
            1,
        ),
        event(
            "goodr-alpha",
            "Goodr — Alpha Finding",
            "Scout promising narratives and early signals on the Goodr Launchpad. Share research, validate theses, and surface Alpha.",
            span(-5, 20),
            EventType::Alpha,
            &["Launchpad", "Research"],
            2,
        ),
        event(
            "chaos-group",
            "Chaos Finance — Official Group",
            "Join the official Chaos Finance group for AMAs, product updates, and direct Q&A with the team.",
            span(-3, 30),
            EventType::Official,
            &["AMA", "Community"],
            3,
        ),
        event(
            "chillonic-otc",
            "Chillonic — OTC Group",
            "Peer‑to‑peer OTC hub for exchanging Chillonic NFTs. Find counterparties safely and coordinate trades.",
            span(-2, 15),
            EventType::Trade,
            &["NFT", "OTC"],
            4,
        ),
        event(
            "fomoney-gov",
            "FoMoney — Governance Event",
            "Back your favorite ticker and participate in governance decisions. Rally a team for coordinated voting.",
            span(1, 7),
            EventType::Official,
            &["Governance", "Voting"],
            5,
        ),
    ];

    let trade_teams = vec![
        Team::public(1, "Alpha Squad", 10, Address::mock("A1"), now - Duration::hours(1))
            .with_members(addrs(&["A2", "A3"]))
            .with_description(
                "High‑frequency strategy experiments and cross‑venue market making. Daily PnL reviews and fast iteration.",
            ),
        Team::private(2, "Beta Wolves", 6, Address::mock("B1"), now - Duration::hours(2), "BETA1234")
            .with_members(addrs(&["B2"]))
            .with_description(
                "Private quant pod focused on momentum and breakout systems. Invite‑only; share code and risk rules.",
            ),
        Team::public(3, "Gamma Traders", 4, Address::mock("C1"), now - day)
            .with_members(addrs(&["C2", "C3", "C4"]))
            .with_description(
                "Discretionary team tracking catalysts and narrative rotations across the Sonic ecosystem.",
            ),
        Team::private(4, "Delta Focus", 8, Address::mock("D1"), now - Duration::milliseconds(12_000_000), "DELTA8888")
            .with_description("Options and basis desk optimizing funding and carry. Calm risk, steady edge."),
    ];

    let mut teams: BTreeMap<String, Vec<Team>> =
        events.iter().map(|e| (e.id.clone(), Vec::new())).collect();
    teams.insert("sonic-trade".to_string(), trade_teams);

    SeedCatalog { events, teams }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EventStatus;

    #[test]
    fn seeds_six_events_with_team_lists() {
        let now = Utc::now();
        let catalog = seed(now);
        assert_eq!(catalog.events.len(), 6);
        for event in &catalog.events {
            assert!(catalog.teams.contains_key(&event.id), "missing {}", event.id);
        }
        assert_eq!(catalog.teams["sonic-trade"].len(), 4);
        assert!(catalog.teams["sonic-hack"].is_empty());
    }

    #[test]
    fn only_governance_event_is_upcoming() {
        let now = Utc::now();
        let catalog = seed(now);
        let upcoming: Vec<_> = catalog
            .events
            .iter()
            .filter(|e| e.status(now) == EventStatus::Upcoming)
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(upcoming, ["fomoney-gov"]);
    }

    #[test]
    fn seeded_teams_hold_invariants() {
        let catalog = seed(Utc::now());
        for team in &catalog.teams["sonic-trade"] {
            assert_eq!(team.join_code.is_some(), team.is_private);
            assert!(team.member_count() <= team.max_members as usize);
            assert_eq!(team.members.first(), Some(&team.captain));
        }
        let gamma = &catalog.teams["sonic-trade"][2];
        assert_eq!(gamma.name, "Gamma Traders");
        assert!(gamma.is_full());
    }
}
