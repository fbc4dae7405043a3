//! `midan invites`: referral stats for one event.

use clap::Args;
use midan_core::MidanError;
use midan_core::invites::InviteStats;
use serde::Serialize;
use std::io::Write;

use super::Context;
use crate::output::{pretty_kv, pretty_section, render_mode};

#[derive(Args, Debug)]
pub struct InvitesArgs {
    /// Event id, e.g. `sonic-trade`.
    pub event: String,
}

#[derive(Debug, Serialize)]
pub struct InvitesOutput {
    pub event_id: String,
    #[serde(flatten)]
    pub stats: InviteStats,
}

/// Execute `midan invites <event>`.
///
/// # Errors
///
/// Returns [`MidanError::EventNotFound`] for an unknown event.
pub fn run_invites(args: &InvitesArgs, ctx: &Context) -> anyhow::Result<()> {
    let app = ctx.open_app()?;
    if app.event(&args.event).is_none() {
        return Err(MidanError::EventNotFound(args.event.clone()).into());
    }
    let result = InvitesOutput {
        event_id: args.event.clone(),
        stats: app.invites().stats(&args.event),
    };

    render_mode(
        ctx.output,
        &result,
        |r, w| {
            writeln!(w, "{}  total={}", r.event_id, r.stats.total)?;
            for (referrer, count) in &r.stats.top_refs {
                writeln!(w, "{referrer}  {count}")?;
            }
            Ok(())
        },
        |r, w| {
            pretty_section(w, &format!("Invites for {}", r.event_id))?;
            pretty_kv(w, "Opens", r.stats.total.to_string())?;
            if r.stats.top_refs.is_empty() {
                return writeln!(w, "No shared links opened yet.");
            }
            for (referrer, count) in &r.stats.top_refs {
                writeln!(w, "  {count:>4}  {referrer}")?;
            }
            Ok(())
        },
    )
}
