//! E2E CLI tests covering:
//! - `midan events` filters, sorting and the configured default sort
//! - `midan teams` filtering and card actions
//! - `midan open` routing, redirects and referral attribution
//! - `midan react` / `midan invites` persistence across processes
//! - error rendering and exit codes
//!
//! Each test runs the `midan` binary as a subprocess rooted in an isolated
//! temp directory with its own data dir.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::Path;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Test Harness
// ---------------------------------------------------------------------------

/// Build a Command targeting the midan binary, rooted in `dir`.
fn midan_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("midan"));
    cmd.current_dir(dir);
    cmd.env("MIDAN_LOG", "error");
    cmd.env_remove("FORMAT");
    cmd.env_remove("MIDAN_DATA_DIR");
    cmd.arg("--data-dir").arg(dir.join("data"));
    cmd
}

/// Run a command with `--json` and parse stdout.
fn run_json(dir: &Path, args: &[&str]) -> Value {
    let output = midan_cmd(dir)
        .args(args)
        .arg("--json")
        .output()
        .expect("midan should not crash");
    assert!(
        output.status.success(),
        "{args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("--json should produce valid JSON")
}

/// Run a command with `--json` that must fail, returning the error object.
fn run_json_err(dir: &Path, args: &[&str]) -> Value {
    let output = midan_cmd(dir)
        .args(args)
        .arg("--json")
        .output()
        .expect("midan should not crash");
    assert!(!output.status.success(), "{args:?} unexpectedly succeeded");
    let json: Value =
        serde_json::from_slice(&output.stderr).expect("errors should be JSON in --json mode");
    json["error"].clone()
}

fn card_ids(page: &Value) -> Vec<String> {
    page["view"]["cards"]
        .as_array()
        .expect("events view has cards")
        .iter()
        .map(|c| c["id"].as_str().expect("card id").to_string())
        .collect()
}

fn team_ids(page: &Value) -> Vec<u64> {
    page["view"]["teams"]
        .as_array()
        .expect("overview has teams")
        .iter()
        .map(|t| t["team_id"].as_u64().expect("team id"))
        .collect()
}

// ---------------------------------------------------------------------------
// events
// ---------------------------------------------------------------------------

#[test]
fn events_lists_seeded_catalogue() {
    let dir = TempDir::new().expect("tempdir");
    let page = run_json(dir.path(), &["events"]);

    assert_eq!(page["path"], "/events");
    assert_eq!(page["title"], "Explore Events — Midan");
    assert_eq!(page["redirected"], false);
    assert_eq!(page["view"]["kind"], "events");
    assert_eq!(page["view"]["all_selected"], true);
    assert_eq!(
        card_ids(&page),
        [
            "sonic-trade",
            "sonic-hack",
            "goodr-alpha",
            "chaos-group",
            "chillonic-otc",
            "fomoney-gov"
        ]
    );
    assert_eq!(page["header"]["connect_label"], "Connect Wallet");
}

#[test]
fn events_filter_by_status_and_type() {
    let dir = TempDir::new().expect("tempdir");

    let upcoming = run_json(dir.path(), &["events", "--status", "upcoming"]);
    assert_eq!(card_ids(&upcoming), ["fomoney-gov"]);
    assert_eq!(upcoming["view"]["all_selected"], false);

    let trade = run_json(dir.path(), &["events", "--type", "trade", "--status", "ongoing"]);
    assert_eq!(card_ids(&trade), ["sonic-trade", "chillonic-otc"]);

    let search = run_json(dir.path(), &["events", "--q", "VOTING"]);
    assert_eq!(card_ids(&search), ["fomoney-gov"]);
}

#[test]
fn events_text_output_is_row_per_event() {
    let dir = TempDir::new().expect("tempdir");
    midan_cmd(dir.path())
        .args(["events", "--format", "text", "--type", "hackathon"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ID  TYPE  STATUS"))
        .stdout(predicate::str::contains("sonic-hack  hackathon  ongoing  0  0  0"));
}

#[test]
fn configured_default_sort_applies_without_sort_flag() {
    let dir = TempDir::new().expect("tempdir");
    std::fs::create_dir_all(dir.path().join(".midan")).expect("create .midan");
    std::fs::write(
        dir.path().join(".midan/config.toml"),
        "[events]\ndefault_sort = \"trending\"\n",
    )
    .expect("write config");

    run_json(dir.path(), &["--connect", "react", "chillonic-otc", "🔥"]);

    let trending = run_json(dir.path(), &["events"]);
    assert_eq!(card_ids(&trending)[0], "chillonic-otc");
    assert_eq!(card_ids(&trending).last().map(String::as_str), Some("fomoney-gov"));

    let active = run_json(dir.path(), &["events", "--sort", "active"]);
    assert_eq!(card_ids(&active)[0], "sonic-trade");
}

#[test]
fn broken_config_fails_with_parse_code() {
    let dir = TempDir::new().expect("tempdir");
    std::fs::create_dir_all(dir.path().join(".midan")).expect("create .midan");
    std::fs::write(dir.path().join(".midan/config.toml"), "[events\n").expect("write config");

    let err = run_json_err(dir.path(), &["events"]);
    assert_eq!(err["error_code"], "E1002");
    assert!(
        err["message"]
            .as_str()
            .is_some_and(|m| m.contains("Failed to parse")),
        "unexpected message: {err}"
    );
}

// ---------------------------------------------------------------------------
// teams
// ---------------------------------------------------------------------------

#[test]
fn teams_sorted_by_members_then_recency() {
    let dir = TempDir::new().expect("tempdir");
    let page = run_json(dir.path(), &["teams", "sonic-trade"]);

    assert_eq!(page["view"]["kind"], "competition_overview");
    assert_eq!(page["view"]["state"], "found");
    assert_eq!(page["view"]["team_count"], 4);
    assert_eq!(page["view"]["total_members"], 10);
    assert_eq!(team_ids(&page), [3, 1, 2, 4]);

    let actions: Vec<&str> = page["view"]["teams"]
        .as_array()
        .expect("teams")
        .iter()
        .map(|t| t["action"].as_str().expect("action"))
        .collect();
    assert_eq!(actions, ["full", "join", "join_with_code", "join_with_code"]);
}

#[test]
fn teams_filters_combine() {
    let dir = TempDir::new().expect("tempdir");

    let joinable = run_json(dir.path(), &["teams", "sonic-trade", "--joinable"]);
    assert_eq!(team_ids(&joinable), [1, 2, 4]);

    let private = run_json(dir.path(), &["teams", "sonic-trade", "--private"]);
    assert_eq!(team_ids(&private), [2, 4]);

    let both = run_json(dir.path(), &["teams", "sonic-trade", "--public", "--private"]);
    assert_eq!(team_ids(&both), [3, 1, 2, 4]);

    let search = run_json(dir.path(), &["teams", "sonic-trade", "--q", "wolves"]);
    assert_eq!(team_ids(&search), [2]);
}

#[test]
fn unknown_event_is_a_not_found_view() {
    let dir = TempDir::new().expect("tempdir");
    let page = run_json(dir.path(), &["teams", "no-such-event"]);
    assert_eq!(page["view"]["state"], "not_found");
    assert_eq!(page["view"]["event_id"], "no-such-event");
    assert_eq!(page["title"], "Event — Midan");
}

// ---------------------------------------------------------------------------
// open
// ---------------------------------------------------------------------------

#[test]
fn unknown_location_redirects_to_events() {
    let dir = TempDir::new().expect("tempdir");
    let page = run_json(dir.path(), &["open", "#/nowhere/at/all"]);
    assert_eq!(page["redirected"], true);
    assert_eq!(page["path"], "/events");
    assert_eq!(page["view"]["kind"], "events");
}

#[test]
fn team_page_for_visitor_offers_connect() {
    let dir = TempDir::new().expect("tempdir");
    let page = run_json(dir.path(), &["open", "#/competition/sonic-trade/team/1"]);
    assert_eq!(page["view"]["kind"], "team_detail");
    assert_eq!(page["view"]["name"], "Alpha Squad");
    assert_eq!(page["view"]["action"], "connect");
    assert_eq!(page["view"]["is_member"], false);
    assert!(page["view"]["chat"].is_null());

    let connected = run_json(
        dir.path(),
        &["--connect", "open", "#/competition/sonic-trade/team/3"],
    );
    assert_eq!(connected["view"]["action"], "full");
}

#[test]
fn prefill_link_opens_join_form_for_connected_visitor() {
    let dir = TempDir::new().expect("tempdir");
    let page = run_json(
        dir.path(),
        &[
            "--connect",
            "open",
            "#/competition/sonic-trade/team/2?prefillCode=BETA1234",
        ],
    );
    assert_eq!(page["join_form"]["team_id"], 2);
    assert_eq!(page["join_form"]["code"], "BETA1234");
    assert_eq!(page["join_form"]["team_name"], "Beta Wolves");

    let visitor = run_json(
        dir.path(),
        &["open", "#/competition/sonic-trade/team/2?prefillCode=BETA1234"],
    );
    assert!(visitor["join_form"].is_null());
}

#[test]
fn non_numeric_team_segment_is_not_found() {
    let dir = TempDir::new().expect("tempdir");
    let page = run_json(dir.path(), &["open", "#/competition/sonic-trade/team/abc"]);
    assert_eq!(page["view"]["state"], "not_found");
    assert!(page["view"]["team_id"].is_null());
}

// ---------------------------------------------------------------------------
// react / invites
// ---------------------------------------------------------------------------

#[test]
fn react_requires_connected_wallet() {
    let dir = TempDir::new().expect("tempdir");
    let err = run_json_err(dir.path(), &["react", "sonic-trade", "🔥"]);
    assert_eq!(err["error_code"], "E1001");
    assert!(err["suggestion"].is_string());
}

#[test]
fn react_on_unknown_event_fails_in_text_mode() {
    let dir = TempDir::new().expect("tempdir");
    midan_cmd(dir.path())
        .args(["--connect", "--format", "text", "react", "nope", "🔥"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error: event 'nope' not found"))
        .stderr(predicate::str::contains("  suggestion:"));
}

#[test]
fn reactions_persist_and_toggle_across_processes() {
    let dir = TempDir::new().expect("tempdir");

    let first = run_json(dir.path(), &["--connect", "react", "sonic-trade", "🔥"]);
    assert_eq!(first["change"], "set");
    assert_eq!(first["count"], 1);
    assert_eq!(first["selected"], "🔥");

    let page = run_json(dir.path(), &["events"]);
    let card = &page["view"]["cards"][0];
    assert_eq!(card["id"], "sonic-trade");
    assert_eq!(card["fire"], 1);
    assert_eq!(card["hot"], true);
    assert_eq!(page["view"]["trending"][0]["event_id"], "sonic-trade");

    let second = run_json(dir.path(), &["--connect", "react", "sonic-trade", "🔥"]);
    assert_eq!(second["change"], "cleared");
    assert_eq!(second["count"], 0);
    assert!(second["selected"].is_null());
}

#[test]
fn referral_opens_are_counted_per_process() {
    let dir = TempDir::new().expect("tempdir");
    let link = "#/competition/sonic-trade?ref=0xA100…0000";

    run_json(dir.path(), &["open", link]);
    run_json(dir.path(), &["open", link]);

    let stats = run_json(dir.path(), &["invites", "sonic-trade"]);
    assert_eq!(stats["event_id"], "sonic-trade");
    assert_eq!(stats["total"], 2);
    assert_eq!(stats["top_refs"][0][0], "0xA100…0000");
    assert_eq!(stats["top_refs"][0][1], 2);
}

#[test]
fn own_referral_link_is_not_counted() {
    let dir = TempDir::new().expect("tempdir");
    let overview = run_json(dir.path(), &["--connect", "teams", "sonic-trade"]);
    let share = overview["view"]["share_link"]
        .as_str()
        .expect("share link")
        .to_string();
    assert!(share.starts_with("#/competition/sonic-trade?ref="));

    run_json(dir.path(), &["--connect", "open", &share]);
    let stats = run_json(dir.path(), &["invites", "sonic-trade"]);
    assert_eq!(stats["total"], 0);
}

#[test]
fn invites_for_unknown_event_fail() {
    let dir = TempDir::new().expect("tempdir");
    let err = run_json_err(dir.path(), &["invites", "ghost"]);
    assert_eq!(err["error_code"], "E2001");
}

#[test]
fn completions_mention_binary() {
    let dir = TempDir::new().expect("tempdir");
    midan_cmd(dir.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("midan"));
}
