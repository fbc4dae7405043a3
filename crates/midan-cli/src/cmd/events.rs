//! `midan events`: list the event catalogue with filters.

use clap::Args;
use midan_core::filter::EventSort;
use midan_core::model::{EventStatus, EventType};
use midan_core::router::encode_form;

use super::Context;
use super::page::render_page;

#[derive(Args, Debug, Default)]
pub struct EventsArgs {
    /// Only events of this type (trade, hackathon, alpha, official).
    #[arg(long = "type", value_name = "TYPE")]
    pub event_type: Option<EventType>,

    /// Only events in this phase (ongoing, upcoming).
    #[arg(long)]
    pub status: Option<EventStatus>,

    /// Case-insensitive search over event names and subtitles.
    #[arg(long = "q", value_name = "TEXT", default_value = "")]
    pub search: String,

    /// Order of the list (trending, active). Unset uses the configured
    /// default or keeps the catalogue order.
    #[arg(long)]
    pub sort: Option<EventSort>,
}

impl EventsArgs {
    /// Location of the events list with these filters. A missing sort is
    /// left out so the configured default can apply.
    pub fn location(&self) -> String {
        let mut pairs = Vec::new();
        if let Some(event_type) = self.event_type {
            pairs.push(format!("type={}", event_type.as_str()));
        }
        if let Some(status) = self.status {
            pairs.push(format!("status={}", status.as_str()));
        }
        if !self.search.is_empty() {
            pairs.push(format!("q={}", encode_form(&self.search)));
        }
        if let Some(sort) = self.sort {
            pairs.push(format!("sort={}", sort.as_str()));
        }
        if pairs.is_empty() {
            "/events".to_string()
        } else {
            format!("/events?{}", pairs.join("&"))
        }
    }
}

/// Execute `midan events`.
///
/// # Errors
///
/// Returns an error if the data directory is unusable or output fails.
pub fn run_events(args: &EventsArgs, ctx: &Context) -> anyhow::Result<()> {
    let mut app = ctx.open_app()?;
    let page = app.open(&args.location(), ctx.now);
    render_page(ctx.output, &page)
}
