//! `midan session`: replay a JSON-lines action script against one session.
//!
//! Each non-blank line is one action object tagged by `action`, e.g.
//!
//! ```text
//! {"action":"connect"}
//! {"action":"join_private","event_id":"sonic-trade","team_id":2,"code":"BETA1234"}
//! {"action":"navigate","location":"#/me/teams"}
//! ```
//!
//! Lines starting with `#` are comments. Every action produces one outcome;
//! a failed action is reported and the script carries on.

use anyhow::Context as _;
use clap::Args;
use midan_core::AppState;
use midan_core::app::CreateEventParams;
use midan_core::error::ErrorCode;
use midan_core::membership::CreateTeamParams;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use tracing::debug;

use super::Context;
use crate::output::{CliError, OutputMode};

#[derive(Args, Debug)]
pub struct SessionArgs {
    /// Script to read; `-` or nothing reads stdin.
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,
}

/// One scripted user action.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    Connect,
    CreateEvent(CreateEventParams),
    CreateTeam {
        event_id: String,
        #[serde(flatten)]
        params: CreateTeamParams,
    },
    JoinPublic {
        event_id: String,
        team_id: u64,
    },
    JoinPrivate {
        event_id: String,
        team_id: u64,
        code: String,
    },
    OpenJoinForm {
        event_id: String,
        team_id: u64,
        #[serde(default)]
        code: Option<String>,
    },
    SubmitJoinForm {
        code: String,
    },
    CloseJoinForm,
    React {
        event_id: String,
        emoji: String,
    },
    Navigate {
        location: String,
    },
}

impl Action {
    const fn name(&self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::CreateEvent(_) => "create_event",
            Self::CreateTeam { .. } => "create_team",
            Self::JoinPublic { .. } => "join_public",
            Self::JoinPrivate { .. } => "join_private",
            Self::OpenJoinForm { .. } => "open_join_form",
            Self::SubmitJoinForm { .. } => "submit_join_form",
            Self::CloseJoinForm => "close_join_form",
            Self::React { .. } => "react",
            Self::Navigate { .. } => "navigate",
        }
    }
}

/// Result of one script line.
#[derive(Debug, Serialize)]
pub struct Outcome {
    pub line: usize,
    pub action: &'static str,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CliError>,
}

/// Execute `midan session [FILE]`.
///
/// # Errors
///
/// Returns an error if the script cannot be read, the data directory is
/// unusable, or writing to stdout fails. Failed actions are outcomes, not
/// errors.
pub fn run_session(args: &SessionArgs, ctx: &Context) -> anyhow::Result<()> {
    let reader: Box<dyn BufRead> = match &args.file {
        Some(path) if path.as_os_str() != "-" => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("Failed to open {}", path.display()))?,
        )),
        _ => Box::new(BufReader::new(io::stdin())),
    };

    let mut app = ctx.open_app()?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for (index, line) in reader.lines().enumerate() {
        let line = line.context("Failed to read session script")?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let outcome = run_line(&mut app, ctx, index + 1, trimmed);
        write_outcome(ctx.output, &outcome, &mut out)?;
    }
    Ok(())
}

fn run_line(app: &mut AppState, ctx: &Context, line: usize, raw: &str) -> Outcome {
    let action = match serde_json::from_str::<Action>(raw) {
        Ok(action) => action,
        Err(err) => {
            return Outcome {
                line,
                action: "invalid",
                ok: false,
                result: None,
                error: Some(CliError::with_details(
                    format!("line {line} is not a valid action: {err}"),
                    "each line must be a JSON object with an `action` field",
                    ErrorCode::InvalidInput.code(),
                )),
            };
        }
    };

    debug!(line, action = action.name(), "session action");
    let name = action.name();
    match apply(app, ctx, action) {
        Ok(result) => Outcome {
            line,
            action: name,
            ok: true,
            result: Some(result),
            error: None,
        },
        Err(err) => Outcome {
            line,
            action: name,
            ok: false,
            result: None,
            error: Some(CliError::from(&err)),
        },
    }
}

/// Apply one action and describe what it produced.
fn apply(app: &mut AppState, ctx: &Context, action: Action) -> anyhow::Result<Value> {
    let value = match action {
        Action::Connect => json!({ "address": app.connect() }),
        Action::CreateEvent(params) => {
            let event_id = app.create_event(&params, ctx.now, &mut rand::thread_rng())?;
            json!({ "event_id": event_id })
        }
        Action::CreateTeam { event_id, params } => {
            let team_id = app.create_team(&event_id, &params, ctx.now)?;
            json!({ "event_id": event_id, "team_id": team_id })
        }
        Action::JoinPublic { event_id, team_id } => {
            app.join_public(&event_id, team_id)?;
            json!({ "event_id": event_id, "team_id": team_id })
        }
        Action::JoinPrivate {
            event_id,
            team_id,
            code,
        } => {
            app.join_private(&event_id, team_id, &code)?;
            json!({ "event_id": event_id, "team_id": team_id })
        }
        Action::OpenJoinForm {
            event_id,
            team_id,
            code,
        } => {
            app.open_join_form(&event_id, team_id, code.as_deref())?;
            serde_json::to_value(app.join_form())?
        }
        Action::SubmitJoinForm { code } => {
            let target = app.join_form().map(|f| (f.event_id.clone(), f.team_id));
            app.submit_join_form(&code)?;
            match target {
                Some((event_id, team_id)) => json!({ "event_id": event_id, "team_id": team_id }),
                None => Value::Null,
            }
        }
        Action::CloseJoinForm => {
            app.close_join_form();
            Value::Null
        }
        Action::React { event_id, emoji } => {
            let change = app.react(&event_id, &emoji)?;
            json!({
                "event_id": event_id,
                "change": change,
                "selected": app.reactions().selected(&event_id),
            })
        }
        Action::Navigate { location } => serde_json::to_value(app.open(&location, ctx.now))?,
    };
    Ok(value)
}

fn write_outcome(mode: OutputMode, outcome: &Outcome, out: &mut dyn Write) -> anyhow::Result<()> {
    match mode {
        OutputMode::Json => {
            serde_json::to_writer(&mut *out, outcome)?;
            writeln!(out)?;
        }
        OutputMode::Text => match &outcome.error {
            None => writeln!(
                out,
                "{}  {}  ok  {}",
                outcome.line,
                outcome.action,
                summary(outcome.result.as_ref())
            )?,
            Some(err) => writeln!(
                out,
                "{}  {}  err  {}  {}",
                outcome.line,
                outcome.action,
                err.error_code.as_deref().unwrap_or("-"),
                err.message
            )?,
        },
        OutputMode::Pretty => match &outcome.error {
            None => writeln!(
                out,
                "✓ {:>3}  {:<17} {}",
                outcome.line,
                outcome.action,
                summary(outcome.result.as_ref())
            )?,
            Some(err) => writeln!(
                out,
                "✗ {:>3}  {:<17} {}",
                outcome.line, outcome.action, err.message
            )?,
        },
    }
    Ok(())
}

/// Short one-line description of an action result for text output.
fn summary(result: Option<&Value>) -> String {
    let Some(Value::Object(map)) = result else {
        return String::new();
    };
    if let Some(Value::String(title)) = map.get("title") {
        return title.clone();
    }
    map.iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| match v {
            Value::String(s) => format!("{k}={s}"),
            other => format!("{k}={other}"),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actions_parse_from_json_lines() {
        let join: Action = serde_json::from_str(
            r#"{"action":"join_private","event_id":"sonic-trade","team_id":2,"code":"BETA1234"}"#,
        )
        .unwrap();
        assert!(matches!(join, Action::JoinPrivate { team_id: 2, .. }));

        let create: Action = serde_json::from_str(
            r#"{"action":"create_team","event_id":"sonic-hack","name":"Night Owls","description":"We ship after midnight.","privacy":"private","join_code":"OWLS2024","max_members":5}"#,
        )
        .unwrap();
        let Action::CreateTeam { event_id, params } = create else {
            panic!("expected create_team");
        };
        assert_eq!(event_id, "sonic-hack");
        assert_eq!(params.join_code, "OWLS2024");

        let event: Action = serde_json::from_str(
            r#"{"action":"create_event","name":"Demo Day","subtitle":"Ship it","type":"hackathon","team_cap":{"fixed":8}}"#,
        )
        .unwrap();
        assert_eq!(event.name(), "create_event");

        let form: Action =
            serde_json::from_str(r#"{"action":"open_join_form","event_id":"e","team_id":4}"#)
                .unwrap();
        assert!(matches!(form, Action::OpenJoinForm { code: None, .. }));
    }

    #[test]
    fn unknown_action_is_rejected() {
        assert!(serde_json::from_str::<Action>(r#"{"action":"teleport"}"#).is_err());
        assert!(serde_json::from_str::<Action>(r#"{"event_id":"x"}"#).is_err());
    }

    #[test]
    fn summary_prefers_page_title() {
        let page = json!({"title": "My Teams — Midan", "path": "/me/teams"});
        assert_eq!(summary(Some(&page)), "My Teams — Midan");
        let join = json!({"event_id": "sonic-trade", "team_id": 1});
        assert_eq!(summary(Some(&join)), "event_id=sonic-trade team_id=1");
        assert_eq!(summary(None), "");
    }
}
