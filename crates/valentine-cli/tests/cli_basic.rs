//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary with `HOME` pointed at a scratch
//! directory, so the config file never touches the real one.

use std::process::Command;

use serde_json::Value;
use tempfile::TempDir;

/// Run a CLI command and return (exit code, stdout, stderr).
fn run_cli(home: &TempDir, args: &[&str]) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_valentine"))
        .args(args)
        .env("HOME", home.path())
        .env_remove("VALENTINE_ENV")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (code, stdout, stderr)
}

/// Parse the event log printed by `simulate`.
fn events(stdout: &str) -> Vec<Value> {
    stdout
        .lines()
        .take_while(|l| l.starts_with('{') && l.ends_with('}'))
        .map(|l| serde_json::from_str(l).expect("event line is JSON"))
        .collect()
}

fn of_type<'a>(events: &'a [Value], ty: &str) -> Vec<&'a Value> {
    events.iter().filter(|e| e["type"] == ty).collect()
}

#[test]
fn test_simulate_accept_reveals_all_stages() {
    let home = TempDir::new().unwrap();
    let (code, stdout, stderr) = run_cli(&home, &["simulate", "--no-attempts", "2", "--accept"]);
    assert_eq!(code, 0, "simulate failed: {stderr}");

    let log = events(&stdout);
    assert_eq!(of_type(&log, "relocated").len(), 2);
    assert_eq!(of_type(&log, "accepted")[0]["attempts"], 2);
    assert_eq!(of_type(&log, "confetti_spawned")[0]["count"], 100);

    let stages: Vec<_> = of_type(&log, "stage_advanced")
        .iter()
        .map(|e| e["stage"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(
        stages,
        vec!["card_shown", "message_shown", "media_shown", "fully_revealed"]
    );
    assert_eq!(of_type(&log, "media_reveal_started").len(), 1);

    // the clip was preloaded during the proposal and never requested again
    assert_eq!(of_type(&log, "media_preload_requested").len(), 1);
}

#[test]
fn test_simulate_max_attempts_removes_target() {
    let home = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli(&home, &["simulate", "--no-attempts", "14", "--view"]);
    assert_eq!(code, 0);

    let log = events(&stdout);
    assert_eq!(of_type(&log, "relocated").len(), 11);
    assert_eq!(of_type(&log, "fading_out").len(), 1);
    assert_eq!(of_type(&log, "evasive_gone").len(), 1);

    let view_start = stdout.find("{\n").expect("view printed");
    let view: Value = serde_json::from_str(&stdout[view_start..]).unwrap();
    assert_eq!(view["screen"], "proposal");
    assert_eq!(view["proposal"]["phase"], "gone");
    assert_eq!(view["proposal"]["attempts"], 12);
    assert_eq!(view["proposal"]["hints"]["destiny"], true);
}

#[test]
fn test_simulate_rapid_attempts_are_dropped() {
    let home = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli(&home, &["simulate", "--no-attempts", "3", "--rapid"]);
    assert_eq!(code, 0);

    let log = events(&stdout);
    assert_eq!(of_type(&log, "attempt_started").len(), 1);
    assert_eq!(of_type(&log, "relocated").len(), 1);
}

#[test]
fn test_simulate_restart_reloads_session() {
    let home = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli(
        &home,
        &["simulate", "--no-attempts", "1", "--restart", "--view"],
    );
    assert_eq!(code, 0);

    let log = events(&stdout);
    assert_eq!(of_type(&log, "restart_requested").len(), 1);
    assert_eq!(of_type(&log, "session_reloaded").len(), 1);
    let sessions = of_type(&log, "session_started");
    assert_eq!(sessions.len(), 2);
    assert_ne!(sessions[0]["session_id"], sessions[1]["session_id"]);

    let view_start = stdout.find("{\n").unwrap();
    let view: Value = serde_json::from_str(&stdout[view_start..]).unwrap();
    assert_eq!(view["screen"], "proposal");
    assert_eq!(view["proposal"]["attempts"], 0);
    assert!(view["celebration"].is_null());
}

#[test]
fn test_simulate_failed_media_still_reveals() {
    let home = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli(
        &home,
        &["simulate", "--no-attempts", "1", "--accept", "--media-fails", "--view"],
    );
    assert_eq!(code, 0);

    let log = events(&stdout);
    // the preload failed before accept, so the celebration asked again
    assert_eq!(of_type(&log, "media_preload_requested").len(), 2);

    let view_start = stdout.find("{\n").unwrap();
    let view: Value = serde_json::from_str(&stdout[view_start..]).unwrap();
    let media = &view["celebration"]["reveal"]["media"];
    assert_eq!(media["container_visible"], true);
    assert_eq!(media["placeholder"], false);
}

#[test]
fn test_inspect_attempts() {
    let home = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli(&home, &["inspect", "attempts", "--attempts", "3"]);
    assert_eq!(code, 0);

    let out: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(out["label"], "Okay wow that hurts 😞");
    assert_eq!(out["accept"]["pulsing"], true);
    assert_eq!(out["accept"]["glow_px"], 12);
    assert!((out["accept"]["scale"].as_f64().unwrap() - 1.195).abs() < 1e-9);
    assert!(out["hints"]["failed_attempts"]
        .as_str()
        .unwrap()
        .starts_with("3 failed attempts"));
}

#[test]
fn test_inspect_anchors() {
    let home = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli(
        &home,
        &["inspect", "anchors", "--container", "390,160,500,480"],
    );
    assert_eq!(code, 0);
    let rows: Vec<Value> = serde_json::from_str(&stdout).unwrap();
    assert_eq!(rows.len(), 8);
    assert_eq!(rows[0]["name"], "left-center");
    assert!(rows.iter().all(|r| !r["position"].is_null()));

    let (code, stdout, _) = run_cli(&home, &["inspect", "anchors"]);
    assert_eq!(code, 0);
    let rows: Vec<Value> = serde_json::from_str(&stdout).unwrap();
    assert!(rows.iter().all(|r| r["position"].is_null()));
}

#[test]
fn test_inspect_confetti_is_seeded() {
    let home = TempDir::new().unwrap();
    let args = ["inspect", "confetti", "--seed", "7", "--count", "5"];
    let (_, first, _) = run_cli(&home, &args);
    let (_, second, _) = run_cli(&home, &args);
    let particles: Vec<Value> = serde_json::from_str(&first).unwrap();
    assert_eq!(particles.len(), 5);
    assert_eq!(first, second);
}

#[test]
fn test_config_get() {
    let home = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli(&home, &["config", "get", "copy.recipient"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "Khushboo");
}

#[test]
fn test_config_set() {
    let home = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli(&home, &["config", "set", "copy.recipient", "Asha"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "ok");

    let (_, stdout, _) = run_cli(&home, &["config", "get", "copy.recipient"]);
    assert_eq!(stdout.trim(), "Asha");
}

#[test]
fn test_config_set_rejects_invalid_value() {
    let home = TempDir::new().unwrap();
    let (code, _, stderr) = run_cli(&home, &["config", "set", "evasion.max_attempts", "0"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));

    let (_, stdout, _) = run_cli(&home, &["config", "get", "evasion.max_attempts"]);
    assert_eq!(stdout.trim(), "12");
}

#[test]
fn test_config_unknown_key() {
    let home = TempDir::new().unwrap();
    let (code, _, stderr) = run_cli(&home, &["config", "get", "copy.nope"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("unknown key"));
}

#[test]
fn test_config_list() {
    let home = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli(&home, &["config", "list"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("[evasion]"));
    assert!(stdout.contains("max_attempts = 12"));
}
