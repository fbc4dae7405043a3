//! View-models: plain serializable data describing what a page shows.
//!
//! Builders read an [`AppState`] and never mutate it. Missing events and
//! teams are view states, not errors.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::app::{AppState, JoinForm};
use crate::chat::ChatLaunch;
use crate::filter::{EventFilter, TeamFilter, filter_and_sort_teams, filter_events, trending_strip};
use crate::invites::InviteStats;
use crate::model::{Address, Event, EventStatus, EventType, Privacy, Team};
use crate::reactions::FIRE;
use crate::router::{Location, Route, share_link, team_link};

/// Tag pills shown on an event card before collapsing into "+N".
const CARD_TAGS: usize = 2;

/// Member avatars shown on a team card before collapsing into "+N".
const CARD_AVATARS: usize = 4;

const SHARE_PUBLIC_HINT: &str = "Share this link so anyone can join while spots last.";
const SHARE_PRIVATE_HINT: &str =
    "This link does not include the join code. Share the code separately.";

/// A fully built page.
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    pub title: String,
    pub path: String,
    /// The requested location was unroutable and the landing page was shown.
    pub redirected: bool,
    pub header: Header,
    pub view: View,
    pub join_form: Option<JoinFormView>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum View {
    Events(EventsView),
    MyTeams(MyTeamsView),
    CompetitionOverview(OverviewView),
    TeamDetail(TeamDetailView),
}

#[derive(Debug, Clone, Serialize)]
pub struct Header {
    /// Short address when connected, otherwise "Connect Wallet".
    pub connect_label: String,
    pub connected: bool,
    pub my_teams_enabled: bool,
    pub create_event_enabled: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct JoinFormView {
    pub event_id: String,
    pub team_id: u64,
    pub team_name: Option<String>,
    pub code: String,
}

// ---------------------------------------------------------------------------
// Events list
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct EventsView {
    pub filter: EventFilter,
    /// Canonical query string of the filters.
    pub query: String,
    /// The "All" chip is active (no type and no status filter).
    pub all_selected: bool,
    pub trending: Vec<TrendingItem>,
    pub cards: Vec<EventCard>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendingItem {
    pub event_id: String,
    pub name: String,
    pub fire: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct EventCard {
    pub id: String,
    pub name: String,
    pub subtitle: String,
    pub event_type: EventType,
    pub type_label: &'static str,
    pub tags: Vec<String>,
    pub more_tags: usize,
    pub status: EventStatus,
    pub date_range: String,
    pub color: [String; 2],
    pub team_count: usize,
    pub team_cap: Option<u32>,
    pub member_count: usize,
    pub reactions: BTreeMap<String, u64>,
    pub fire: u64,
    pub my_reaction: Option<String>,
    /// At least one fire reaction.
    pub hot: bool,
}

// ---------------------------------------------------------------------------
// My teams
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct MyTeamsView {
    /// Join order. Entries whose event or team no longer resolve are left out.
    pub entries: Vec<MyTeamEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MyTeamEntry {
    pub event_id: String,
    pub event_name: String,
    pub team_id: u64,
    pub team_name: String,
    pub privacy: Privacy,
    pub member_count: usize,
    pub max_members: u32,
    pub link: String,
}

// ---------------------------------------------------------------------------
// Competition overview
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum OverviewView {
    NotFound { event_id: String },
    Found(Box<CompetitionOverview>),
}

#[derive(Debug, Clone, Serialize)]
pub struct CompetitionOverview {
    pub event_id: String,
    pub name: String,
    pub subtitle: String,
    pub status: EventStatus,
    pub date_range: String,
    pub filter: TeamFilter,
    pub query: String,
    pub team_count: usize,
    pub total_members: usize,
    pub invites: InviteStats,
    pub share_link: String,
    pub my_team: Option<u64>,
    pub teams: Vec<TeamCard>,
}

/// Call to action on a team card, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CardAction {
    Full,
    AlreadyInTeam,
    JoinWithCode,
    Join,
}

#[derive(Debug, Clone, Serialize)]
pub struct TeamCard {
    pub team_id: u64,
    pub name: String,
    pub description: String,
    pub privacy: Privacy,
    pub member_count: usize,
    pub max_members: u32,
    pub captain: String,
    pub avatars: Vec<String>,
    pub more_members: usize,
    pub action: CardAction,
    pub link: String,
}

// ---------------------------------------------------------------------------
// Team detail
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TeamDetailView {
    NotFound {
        event_id: String,
        team_id: Option<u64>,
    },
    Found(Box<TeamDetail>),
}

/// Call to action on a team page, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailAction {
    Connect,
    Invite,
    AlreadyInTeam,
    Full,
    JoinWithCode,
    Join,
}

#[derive(Debug, Clone, Serialize)]
pub struct TeamDetail {
    pub event_id: String,
    pub team_id: u64,
    pub name: String,
    pub description: String,
    pub privacy: Privacy,
    pub member_count: usize,
    pub max_members: u32,
    pub captain: String,
    pub members: Vec<MemberView>,
    pub action: DetailAction,
    pub is_member: bool,
    /// Members only.
    pub share: Option<ShareSection>,
    /// Members only.
    pub chat: Option<ChatEmbed>,
    pub back_link: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MemberView {
    pub address: Address,
    pub short: String,
    pub initials: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShareSection {
    pub link: String,
    pub hint: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatEmbed {
    pub launch: ChatLaunch,
    pub query: String,
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

/// Build the page for an already routed location.
#[must_use]
pub fn page(
    app: &AppState,
    location: &Location,
    route: &Route,
    redirected: bool,
    now: DateTime<Utc>,
) -> Page {
    let view = match route {
        Route::Events { filter } => {
            let mut filter = filter.clone();
            if filter.sort.is_none() {
                filter.sort = app.default_sort();
            }
            View::Events(events_view(app, filter, now))
        }
        Route::MyTeams => View::MyTeams(my_teams_view(app)),
        Route::CompetitionOverview {
            event_id, filter, ..
        } => View::CompetitionOverview(overview_view(app, event_id, filter.clone(), now)),
        Route::TeamDetail {
            event_id, team_id, ..
        } => View::TeamDetail(team_detail_view(app, event_id, *team_id)),
        // Only reachable when the landing page itself failed to route.
        Route::Redirect { .. } => View::Events(events_view(app, EventFilter::default(), now)),
    };

    Page {
        title: location.title(app.events()),
        path: location.path.clone(),
        redirected,
        header: header(app),
        view,
        join_form: app.join_form().map(|form| join_form_view(app, form)),
    }
}

#[must_use]
pub fn header(app: &AppState) -> Header {
    let user = app.user();
    Header {
        connect_label: user.map_or_else(|| "Connect Wallet".to_string(), Address::short),
        connected: user.is_some(),
        my_teams_enabled: !app.memberships().is_empty(),
        create_event_enabled: user.is_some(),
    }
}

fn join_form_view(app: &AppState, form: &JoinForm) -> JoinFormView {
    JoinFormView {
        event_id: form.event_id.clone(),
        team_id: form.team_id,
        team_name: app
            .roster()
            .team(&form.event_id, form.team_id)
            .map(|t| t.name.clone()),
        code: form.code.clone(),
    }
}

#[must_use]
pub fn events_view(app: &AppState, filter: EventFilter, now: DateTime<Utc>) -> EventsView {
    let reactions = app.reactions();
    let trending = trending_strip(app.events(), reactions)
        .into_iter()
        .map(|(event, fire)| TrendingItem {
            event_id: event.id.clone(),
            name: event.name.clone(),
            fire,
        })
        .collect();
    let cards = filter_events(app.events(), &filter, now, reactions)
        .into_iter()
        .map(|event| event_card(app, event, now))
        .collect();

    EventsView {
        query: filter.to_query_string(),
        all_selected: filter.is_all(),
        filter,
        trending,
        cards,
    }
}

fn event_card(app: &AppState, event: &Event, now: DateTime<Utc>) -> EventCard {
    let teams = app.roster().teams(&event.id);
    let reactions = app.reactions();
    let fire = reactions.count(&event.id, FIRE);
    EventCard {
        id: event.id.clone(),
        name: event.name.clone(),
        subtitle: event.subtitle.clone(),
        event_type: event.event_type,
        type_label: event.event_type.label(),
        tags: event.tags.iter().take(CARD_TAGS).cloned().collect(),
        more_tags: event.tags.len().saturating_sub(CARD_TAGS),
        status: event.status(now),
        date_range: event.date_range(),
        color: event.color.clone(),
        team_count: teams.len(),
        team_cap: event.team_cap,
        member_count: teams.iter().map(Team::member_count).sum(),
        reactions: reactions.counts_for(&event.id),
        fire,
        my_reaction: reactions.selected(&event.id).map(str::to_string),
        hot: fire > 0,
    }
}

#[must_use]
pub fn my_teams_view(app: &AppState) -> MyTeamsView {
    let entries = app
        .memberships()
        .iter()
        .filter_map(|entry| {
            let event = app.event(&entry.event_id)?;
            let team = app.roster().team(&entry.event_id, entry.team_id)?;
            Some(MyTeamEntry {
                event_id: event.id.clone(),
                event_name: event.name.clone(),
                team_id: team.team_id,
                team_name: team.name.clone(),
                privacy: team.privacy(),
                member_count: team.member_count(),
                max_members: team.max_members,
                link: team_link(&event.id, team.team_id),
            })
        })
        .collect();
    MyTeamsView { entries }
}

#[must_use]
pub fn overview_view(
    app: &AppState,
    event_id: &str,
    filter: TeamFilter,
    now: DateTime<Utc>,
) -> OverviewView {
    let Some(event) = app.event(event_id) else {
        return OverviewView::NotFound {
            event_id: event_id.to_string(),
        };
    };
    let roster = app.roster();
    let all_teams = roster.teams(event_id);
    let my_team = app.memberships().team_for(event_id);

    let teams = filter_and_sort_teams(all_teams, &filter)
        .into_iter()
        .map(|team| team_card(event_id, team, my_team.is_some()))
        .collect();

    OverviewView::Found(Box::new(CompetitionOverview {
        event_id: event.id.clone(),
        name: event.name.clone(),
        subtitle: event.subtitle.clone(),
        status: event.status(now),
        date_range: event.date_range(),
        query: filter.to_query_string(),
        filter,
        team_count: all_teams.len(),
        total_members: roster.total_members(event_id),
        invites: app.invites().stats(event_id),
        share_link: share_link(event_id, &app.referral_key()),
        my_team,
        teams,
    }))
}

fn team_card(event_id: &str, team: &Team, in_team: bool) -> TeamCard {
    let action = if team.is_full() {
        CardAction::Full
    } else if in_team {
        CardAction::AlreadyInTeam
    } else if team.is_private {
        CardAction::JoinWithCode
    } else {
        CardAction::Join
    };
    TeamCard {
        team_id: team.team_id,
        name: team.name.clone(),
        description: team.description.clone(),
        privacy: team.privacy(),
        member_count: team.member_count(),
        max_members: team.max_members,
        captain: team.captain.short(),
        avatars: team
            .members
            .iter()
            .take(CARD_AVATARS)
            .map(Address::initials)
            .collect(),
        more_members: team.member_count().saturating_sub(CARD_AVATARS),
        action,
        link: team_link(event_id, team.team_id),
    }
}

#[must_use]
pub fn team_detail_view(app: &AppState, event_id: &str, team_id: Option<u64>) -> TeamDetailView {
    let Some(team) = team_id.and_then(|id| app.roster().team(event_id, id)) else {
        return TeamDetailView::NotFound {
            event_id: event_id.to_string(),
            team_id,
        };
    };
    let my_team = app.memberships().team_for(event_id);
    let is_member = my_team == Some(team.team_id);
    let in_other_team = my_team.is_some() && !is_member;

    let action = if app.user().is_none() {
        DetailAction::Connect
    } else if is_member {
        DetailAction::Invite
    } else if in_other_team {
        DetailAction::AlreadyInTeam
    } else if team.is_full() {
        DetailAction::Full
    } else if team.is_private {
        DetailAction::JoinWithCode
    } else {
        DetailAction::Join
    };

    let share = is_member.then(|| ShareSection {
        link: team_link(event_id, team.team_id),
        hint: if team.is_private {
            SHARE_PRIVATE_HINT
        } else {
            SHARE_PUBLIC_HINT
        },
    });
    let chat = is_member.then(|| {
        let launch = ChatLaunch::embedded_member(team.team_id);
        ChatEmbed {
            query: launch.to_query_string(),
            launch,
        }
    });

    TeamDetailView::Found(Box::new(TeamDetail {
        event_id: event_id.to_string(),
        team_id: team.team_id,
        name: team.name.clone(),
        description: team.description.clone(),
        privacy: team.privacy(),
        member_count: team.member_count(),
        max_members: team.max_members,
        captain: team.captain.short(),
        members: team
            .members
            .iter()
            .map(|address| MemberView {
                address: address.clone(),
                short: address.short(),
                initials: address.initials(),
            })
            .collect(),
        action,
        is_member,
        share,
        chat,
        back_link: format!("#/competition/{event_id}"),
    }))
}
