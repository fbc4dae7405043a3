//! Rendering of a routed [`Page`] in every output mode.
//!
//! JSON emits the page view-model unchanged; text and pretty walk the view
//! and print the parts a terminal user needs.

use midan_core::view::{
    CardAction, CompetitionOverview, DetailAction, EventsView, MyTeamsView, OverviewView, Page,
    TeamDetail, TeamDetailView, View,
};
use std::io::{self, Write};

use crate::output::{OutputMode, pretty_kv, pretty_rule, pretty_section, render_mode};

/// Print `page` to stdout.
///
/// # Errors
///
/// Returns an error if writing to stdout fails.
pub fn render_page(mode: OutputMode, page: &Page) -> anyhow::Result<()> {
    render_mode(mode, page, render_text, render_pretty)
}

const fn card_action_label(action: CardAction) -> &'static str {
    match action {
        CardAction::Full => "full",
        CardAction::AlreadyInTeam => "in-team",
        CardAction::JoinWithCode => "join-with-code",
        CardAction::Join => "join",
    }
}

const fn detail_action_label(action: DetailAction) -> &'static str {
    match action {
        DetailAction::Connect => "Connect Wallet",
        DetailAction::Invite => "Invite",
        DetailAction::AlreadyInTeam => "Already in a team",
        DetailAction::Full => "Team Full",
        DetailAction::JoinWithCode => "Join with Code",
        DetailAction::Join => "Join Team",
    }
}

// ---------------------------------------------------------------------------
// Text
// ---------------------------------------------------------------------------

fn render_text(page: &Page, w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "# {}  {}", page.title, page.path)?;
    if page.redirected {
        writeln!(w, "# redirected")?;
    }
    match &page.view {
        View::Events(view) => events_text(view, w)?,
        View::MyTeams(view) => my_teams_text(view, w)?,
        View::CompetitionOverview(OverviewView::Found(overview)) => overview_text(overview, w)?,
        View::CompetitionOverview(OverviewView::NotFound { event_id }) => {
            writeln!(w, "event not found: {event_id}")?;
        }
        View::TeamDetail(TeamDetailView::Found(detail)) => detail_text(detail, w)?,
        View::TeamDetail(TeamDetailView::NotFound { event_id, team_id }) => {
            let team = team_id.map_or_else(|| "?".to_string(), |id| id.to_string());
            writeln!(w, "team not found: {event_id}/{team}")?;
        }
    }
    if let Some(form) = &page.join_form {
        writeln!(w, "join-form  {}  {}  {}", form.event_id, form.team_id, form.code)?;
    }
    Ok(())
}

fn events_text(view: &EventsView, w: &mut dyn Write) -> io::Result<()> {
    if view.cards.is_empty() {
        return writeln!(w, "no events match");
    }
    writeln!(w, "ID  TYPE  STATUS  TEAMS  MEMBERS  FIRE  NAME")?;
    for card in &view.cards {
        writeln!(
            w,
            "{}  {}  {}  {}  {}  {}  {}",
            card.id,
            card.event_type,
            card.status,
            card.team_count,
            card.member_count,
            card.fire,
            card.name
        )?;
    }
    Ok(())
}

fn my_teams_text(view: &MyTeamsView, w: &mut dyn Write) -> io::Result<()> {
    if view.entries.is_empty() {
        return writeln!(w, "no teams joined");
    }
    writeln!(w, "EVENT  TEAM  PRIVACY  MEMBERS  NAME")?;
    for entry in &view.entries {
        writeln!(
            w,
            "{}  {}  {}  {}/{}  {}",
            entry.event_id,
            entry.team_id,
            entry.privacy,
            entry.member_count,
            entry.max_members,
            entry.team_name
        )?;
    }
    Ok(())
}

fn overview_text(overview: &CompetitionOverview, w: &mut dyn Write) -> io::Result<()> {
    writeln!(
        w,
        "{}  {}  teams={}  members={}  invites={}",
        overview.event_id,
        overview.status,
        overview.team_count,
        overview.total_members,
        overview.invites.total
    )?;
    if overview.teams.is_empty() {
        return writeln!(w, "no teams match");
    }
    writeln!(w, "TEAM  PRIVACY  MEMBERS  ACTION  NAME")?;
    for team in &overview.teams {
        writeln!(
            w,
            "{}  {}  {}/{}  {}  {}",
            team.team_id,
            team.privacy,
            team.member_count,
            team.max_members,
            card_action_label(team.action),
            team.name
        )?;
    }
    Ok(())
}

fn detail_text(detail: &TeamDetail, w: &mut dyn Write) -> io::Result<()> {
    writeln!(
        w,
        "{}  {}  {}  {}/{}  {}",
        detail.event_id,
        detail.team_id,
        detail.privacy,
        detail.member_count,
        detail.max_members,
        detail.name
    )?;
    writeln!(w, "action  {}", detail_action_label(detail.action))?;
    for member in &detail.members {
        writeln!(w, "member  {}", member.address)?;
    }
    if let Some(share) = &detail.share {
        writeln!(w, "share  {}", share.link)?;
    }
    if let Some(chat) = &detail.chat {
        writeln!(w, "chat  {}", chat.query)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Pretty
// ---------------------------------------------------------------------------

fn render_pretty(page: &Page, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, &page.title)?;
    pretty_kv(w, "Location", &page.path)?;
    pretty_kv(w, "Wallet", &page.header.connect_label)?;
    if page.redirected {
        pretty_kv(w, "Note", "unknown location, showing events")?;
    }
    writeln!(w)?;

    match &page.view {
        View::Events(view) => events_pretty(view, w)?,
        View::MyTeams(view) => my_teams_pretty(view, w)?,
        View::CompetitionOverview(OverviewView::Found(overview)) => {
            overview_pretty(overview, w)?;
        }
        View::CompetitionOverview(OverviewView::NotFound { event_id }) => {
            writeln!(w, "Event not found: {event_id}")?;
        }
        View::TeamDetail(TeamDetailView::Found(detail)) => detail_pretty(detail, w)?,
        View::TeamDetail(TeamDetailView::NotFound { .. }) => writeln!(w, "Team not found")?,
    }

    if let Some(form) = &page.join_form {
        writeln!(w)?;
        pretty_section(w, "Join with code")?;
        pretty_kv(w, "Team", form.team_name.as_deref().unwrap_or("?"))?;
        pretty_kv(w, "Code", &form.code)?;
    }
    Ok(())
}

fn events_pretty(view: &EventsView, w: &mut dyn Write) -> io::Result<()> {
    if !view.trending.is_empty() {
        pretty_section(w, "Trending")?;
        for item in &view.trending {
            writeln!(w, "  🔥 {:<4} {}", item.fire, item.name)?;
        }
        writeln!(w)?;
    }
    pretty_section(w, &format!("Events ({})", view.cards.len()))?;
    if view.cards.is_empty() {
        writeln!(w, "No events match these filters.")?;
    }
    for card in &view.cards {
        let hot = if card.hot { "  Hot" } else { "" };
        writeln!(w, "{}  [{}] [{}]{hot}", card.name, card.type_label, card.status.label())?;
        writeln!(w, "  {}  {}", card.id, card.date_range)?;
        let mut tags = card.tags.join(", ");
        if card.more_tags > 0 {
            tags.push_str(&format!(" +{}", card.more_tags));
        }
        writeln!(
            w,
            "  {} teams, {} members  {}",
            card.team_count, card.member_count, tags
        )?;
    }
    Ok(())
}

fn my_teams_pretty(view: &MyTeamsView, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, "My Teams")?;
    if view.entries.is_empty() {
        return writeln!(w, "You have not joined any team yet.");
    }
    for entry in &view.entries {
        writeln!(
            w,
            "{}  ({}, {}/{})",
            entry.team_name, entry.privacy, entry.member_count, entry.max_members
        )?;
        writeln!(w, "  {}  {}", entry.event_name, entry.link)?;
    }
    Ok(())
}

fn overview_pretty(overview: &CompetitionOverview, w: &mut dyn Write) -> io::Result<()> {
    pretty_kv(w, "Event", &overview.name)?;
    pretty_kv(w, "Status", overview.status.label())?;
    pretty_kv(w, "Dates", &overview.date_range)?;
    pretty_kv(w, "Teams", overview.team_count.to_string())?;
    pretty_kv(w, "Members", overview.total_members.to_string())?;
    pretty_kv(w, "Invites", overview.invites.total.to_string())?;
    pretty_kv(w, "Share", &overview.share_link)?;
    writeln!(w)?;

    pretty_section(w, "Teams")?;
    if overview.teams.is_empty() {
        writeln!(w, "No teams match these filters.")?;
    }
    for team in &overview.teams {
        writeln!(
            w,
            "#{:<4} {}  ({}, {}/{})  -> {}",
            team.team_id,
            team.name,
            team.privacy,
            team.member_count,
            team.max_members,
            card_action_label(team.action)
        )?;
        writeln!(w, "      captain {}  {}", team.captain, team.link)?;
    }
    Ok(())
}

fn detail_pretty(detail: &TeamDetail, w: &mut dyn Write) -> io::Result<()> {
    pretty_kv(w, "Team", format!("#{} {}", detail.team_id, detail.name))?;
    pretty_kv(w, "Privacy", detail.privacy.to_string())?;
    pretty_kv(
        w,
        "Members",
        format!("{}/{}", detail.member_count, detail.max_members),
    )?;
    pretty_kv(w, "Captain", &detail.captain)?;
    pretty_kv(w, "Action", detail_action_label(detail.action))?;
    if !detail.description.is_empty() {
        writeln!(w)?;
        writeln!(w, "{}", detail.description)?;
    }
    writeln!(w)?;
    pretty_rule(w)?;
    for member in &detail.members {
        writeln!(w, "  [{}] {}", member.initials, member.short)?;
    }
    if let Some(share) = &detail.share {
        writeln!(w)?;
        pretty_kv(w, "Share", &share.link)?;
        writeln!(w, "  {}", share.hint)?;
    }
    if let Some(chat) = &detail.chat {
        pretty_kv(w, "Chat", &chat.query)?;
    }
    Ok(())
}
