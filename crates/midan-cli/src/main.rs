#![forbid(unsafe_code)]

mod cmd;
mod output;

use chrono::Utc;
use clap::{CommandFactory, Parser, Subcommand};
use midan_core::config::{CliOverrides, resolve_config};
use output::{CliError, OutputMode, render_error, resolve_output_mode};
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "midan: form teams around time-boxed events",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Output format (overrides `--json`, `FORMAT` and config).
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Directory holding persisted reactions and invites.
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Connect the mock wallet before running the command.
    #[arg(long, global = true)]
    connect: bool,

    /// Suppress non-essential log output.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            format: self.format.map(|mode| mode.as_str().to_string()),
            json: self.json,
            data_dir: self.data_dir.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Browse",
        about = "List events",
        long_about = "List the event catalogue with type, status and search filters, plus the trending strip.",
        after_help = "EXAMPLES:\n    # Ongoing trading events, most reacted first\n    midan events --type trade --status ongoing --sort trending\n\n    # Search names and subtitles\n    midan events --q sonic\n\n    # Emit machine-readable output\n    midan events --json"
    )]
    Events(cmd::events::EventsArgs),

    #[command(
        next_help_heading = "Browse",
        about = "Show an event's teams",
        long_about = "Show the competition overview of one event: stats, invite counts and the filtered team list.",
        after_help = "EXAMPLES:\n    # Teams with an open spot\n    midan teams sonic-trade --joinable\n\n    # Private teams whose name or captain matches\n    midan teams sonic-trade --private --q beta"
    )]
    Teams(cmd::teams::TeamsArgs),

    #[command(
        next_help_heading = "Browse",
        about = "Route a location and print the page",
        long_about = "Route any in-app location (events list, my teams, overview or team page) and print the resulting page.",
        after_help = "EXAMPLES:\n    # A team page\n    midan open '#/competition/sonic-trade/team/1'\n\n    # Open a shared link, counting the invite\n    midan open '#/competition/sonic-trade?ref=0xA100…0000'\n\n    # Unknown locations land on the events list\n    midan open /nowhere --json"
    )]
    Open(cmd::open::OpenArgs),

    #[command(
        next_help_heading = "Engage",
        about = "Toggle a reaction on an event",
        long_about = "Toggle the session user's emoji reaction on an event. Reactions persist across sessions.",
        after_help = "EXAMPLES:\n    # Fire up an event\n    midan --connect react sonic-trade 🔥\n\n    # Reacting again with the same emoji clears it\n    midan --connect react sonic-trade 🔥"
    )]
    React(cmd::react::ReactArgs),

    #[command(
        next_help_heading = "Engage",
        about = "Show invite stats for an event",
        long_about = "Show how many times shared links to an event were opened, and by whose link.",
        after_help = "EXAMPLES:\n    # Invite opens for an event\n    midan invites sonic-trade\n\n    # Emit machine-readable output\n    midan invites sonic-trade --json"
    )]
    Invites(cmd::invites::InvitesArgs),

    #[command(
        next_help_heading = "Engage",
        about = "Replay a scripted session",
        long_about = "Apply a JSON-lines action script to one in-memory session and print one outcome per action.",
        after_help = "EXAMPLES:\n    # Read actions from a file\n    midan session actions.jsonl\n\n    # Read actions from stdin\n    echo '{\"action\":\"connect\"}' | midan session -"
    )]
    Session(cmd::session::SessionArgs),

    #[command(
        next_help_heading = "Setup",
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n    # Bash\n    midan completions bash > ~/.local/share/bash-completion/completions/midan"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool, quiet: bool) {
    let filter = EnvFilter::try_from_env("MIDAN_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "midan=debug,info"
        } else if quiet {
            "error"
        } else {
            "midan=info,warn"
        })
    });

    let format = env::var("MIDAN_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

/// Run the command. Errors carry the output mode they must be rendered in:
/// the flag/env fallback until the config is loaded, the resolved mode after.
fn run(cli: &Cli) -> Result<(), (OutputMode, anyhow::Error)> {
    let fallback = resolve_output_mode(cli.format, cli.json);
    let project_root = env::current_dir().map_err(|e| (fallback, e.into()))?;

    let config = resolve_config(&project_root, &cli.overrides()).map_err(|e| (fallback, e))?;
    let output = OutputMode::from_resolved(&config.resolved_output);
    debug!(output = output.as_str(), data_dir = %config.data_dir.display(), "config resolved");

    let ctx = cmd::Context {
        output,
        config,
        connect: cli.connect,
        now: Utc::now(),
    };

    let result = match &cli.command {
        Commands::Events(args) => cmd::events::run_events(args, &ctx),
        Commands::Teams(args) => cmd::teams::run_teams(args, &ctx),
        Commands::Open(args) => cmd::open::run_open(args, &ctx),
        Commands::React(args) => cmd::react::run_react(args, &ctx),
        Commands::Invites(args) => cmd::invites::run_invites(args, &ctx),
        Commands::Session(args) => cmd::session::run_session(args, &ctx),
        Commands::Completions(args) => {
            let mut command = Cli::command();
            cmd::completions::run_completions(args.shell, &mut command)
        }
    };
    result.map_err(|e| (output, e))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err((mode, err)) => {
            debug!(error = ?err, "command failed");
            if render_error(mode, &CliError::from(&err)).is_err() {
                eprintln!("error: {err:#}");
            }
            ExitCode::FAILURE
        }
    }
}
