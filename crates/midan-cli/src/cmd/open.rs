//! `midan open`: route any location and print the resulting page.

use clap::Args;

use super::Context;
use super::page::render_page;

#[derive(Args, Debug)]
pub struct OpenArgs {
    /// Location to open, with or without the leading `#`
    /// (e.g. `#/competition/sonic-trade?ref=0xA1…`).
    pub location: String,
}

/// Execute `midan open <location>`.
///
/// # Errors
///
/// Returns an error if the data directory is unusable or output fails.
pub fn run_open(args: &OpenArgs, ctx: &Context) -> anyhow::Result<()> {
    let mut app = ctx.open_app()?;
    let page = app.open(&args.location, ctx.now);
    render_page(ctx.output, &page)
}
