//! `midan teams`: show an event's overview and team list.

use clap::Args;
use midan_core::filter::TeamFilter;
use midan_core::router::encode_component;

use super::Context;
use super::page::render_page;

#[derive(Args, Debug, Default)]
pub struct TeamsArgs {
    /// Event id, e.g. `sonic-trade`.
    pub event: String,

    /// Only teams with an open spot.
    #[arg(long)]
    pub joinable: bool,

    /// Only public teams.
    #[arg(long)]
    pub public: bool,

    /// Only private teams.
    #[arg(long)]
    pub private: bool,

    /// Search team names and captain addresses.
    #[arg(long = "q", value_name = "TEXT", default_value = "")]
    pub search: String,
}

impl TeamsArgs {
    pub fn location(&self) -> String {
        let filter = TeamFilter {
            joinable: self.joinable,
            public_only: self.public,
            private_only: self.private,
            search: self.search.clone(),
        };
        format!(
            "/competition/{}?{}",
            encode_component(&self.event),
            filter.to_query_string()
        )
    }
}

/// Execute `midan teams <event>`.
///
/// # Errors
///
/// Returns an error if the data directory is unusable or output fails.
pub fn run_teams(args: &TeamsArgs, ctx: &Context) -> anyhow::Result<()> {
    let mut app = ctx.open_app()?;
    let page = app.open(&args.location(), ctx.now);
    render_page(ctx.output, &page)
}
