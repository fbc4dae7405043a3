//! `midan react`: toggle the session user's reaction on an event.

use clap::Args;
use midan_core::reactions::ReactionChange;
use serde::Serialize;
use std::io::Write;

use super::Context;
use crate::output::{pretty_kv, render_mode};

#[derive(Args, Debug)]
pub struct ReactArgs {
    /// Event id, e.g. `sonic-trade`.
    pub event: String,

    /// Emoji to toggle. Picking the active one clears it.
    pub emoji: String,
}

#[derive(Debug, Serialize)]
pub struct ReactOutput {
    pub event_id: String,
    pub emoji: String,
    pub change: ReactionChange,
    /// Count of `emoji` after the toggle.
    pub count: u64,
    pub selected: Option<String>,
}

/// Execute `midan react <event> <emoji>`. Needs `--connect`.
///
/// # Errors
///
/// Returns the domain error when the wallet is not connected, the event is
/// unknown or the emoji is blank.
pub fn run_react(args: &ReactArgs, ctx: &Context) -> anyhow::Result<()> {
    let mut app = ctx.open_app()?;
    let change = app.react(&args.event, &args.emoji)?;

    let emoji = args.emoji.trim().to_string();
    let reactions = app.reactions();
    let result = ReactOutput {
        count: reactions.count(&args.event, &emoji),
        selected: reactions.selected(&args.event).map(str::to_string),
        event_id: args.event.clone(),
        emoji,
        change,
    };

    render_mode(
        ctx.output,
        &result,
        |r, w| {
            let verb = match r.change {
                ReactionChange::Set => "set",
                ReactionChange::Cleared => "cleared",
            };
            writeln!(w, "{}  {}  {verb}  {}", r.event_id, r.emoji, r.count)
        },
        |r, w| {
            let verb = match r.change {
                ReactionChange::Set => "Reacted",
                ReactionChange::Cleared => "Reaction cleared",
            };
            writeln!(w, "✓ {verb} {} on {}", r.emoji, r.event_id)?;
            pretty_kv(w, "Count", r.count.to_string())
        },
    )
}
