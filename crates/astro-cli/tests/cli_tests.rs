//! End-to-end tests for the `astro` binary against the station demo scenario.

use std::path::PathBuf;
use std::process::{Command, Output};

fn scenario() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../demos/station.toml")
}

fn astro(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_astro"))
        .arg("--color")
        .arg("never")
        .args(args)
        .env_remove("ASTRO_LOG")
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run astro")
}

fn access(verb: &str, rest: &[&str]) -> Output {
    let path = scenario();
    let mut args = vec![verb, "--scenario", path.to_str().unwrap()];
    args.extend_from_slice(rest);
    astro(&args)
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

// ────────────────────────────────────────────────────────────────────────────
// Reads
// ────────────────────────────────────────────────────────────────────────────

#[test]
fn get_part_name() {
    let out = access("get", &["part:100", "NAME"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert_eq!(stdout(&out).trim(), "mk1pod");
}

#[test]
fn get_is_case_insensitive() {
    let out = access("get", &["part:101", "name"]);
    assert!(out.status.success());
    assert_eq!(stdout(&out).trim(), "fuelTank");
}

#[test]
fn eta_reads_through_call_sugar() {
    let out = access("get", &["eta:Kerbal X", "APOAPSIS"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert_eq!(stdout(&out).trim(), "420.5");
}

#[test]
fn unknown_suffix_reports_lookup_failure() {
    let out = access("get", &["part:100", "FROBNICATE"]);
    assert_eq!(out.status.code(), Some(1));
    let err = stderr(&out);
    assert!(err.contains("FROBNICATE"), "stderr: {}", err);
    assert!(err.contains("not found"), "stderr: {}", err);
}

// ────────────────────────────────────────────────────────────────────────────
// Writes and calls
// ────────────────────────────────────────────────────────────────────────────

#[test]
fn set_tag_on_own_vessel() {
    let out = access("set", &["part:101", "TAG", "tank"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert_eq!(stdout(&out).trim(), "ok");
}

#[test]
fn set_tag_on_other_vessel_is_refused() {
    let out = access("set", &["part:200", "TAG", "mine"]);
    assert_eq!(out.status.code(), Some(1));
    let err = stderr(&out);
    assert!(
        err.contains("can only be used on the vessel this CPU is running on"),
        "stderr: {}",
        err
    );
}

#[test]
fn cpu_flag_moves_the_cpu() {
    let out = access("set", &["--cpu", "Station", "part:200", "TAG", "mine"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
}

#[test]
fn call_with_argument() {
    let out = access("call", &["part:100", "HASMODULE", "ModuleCommand"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert_eq!(stdout(&out).trim(), "True");
}

#[test]
fn assigning_read_only_suffix_fails() {
    let out = access("set", &["part:100", "UID", "7"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("help: see"));
}

#[test]
fn config_can_disable_call_sugar() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("astro.toml");
    std::fs::write(&config, "[dispatch]\nzero_arg_call_sugar = false\n").unwrap();

    let path = scenario();
    let out = astro(&[
        "--config",
        config.to_str().unwrap(),
        "get",
        "--scenario",
        path.to_str().unwrap(),
        "eta:Kerbal X",
        "APOAPSIS",
    ]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("must be called"), "stderr: {}", stderr(&out));
}

#[test]
fn missing_scenario_is_a_tool_error() {
    let out = astro(&["get", "--scenario", "/nonexistent/astro.toml", "part:1", "NAME"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("Cannot load scenario"));
}

// ────────────────────────────────────────────────────────────────────────────
// Listings and scope checks
// ────────────────────────────────────────────────────────────────────────────

#[test]
fn members_json_lists_inherited_suffixes() {
    let out = astro(&["members", "DockingPort", "--json"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let listing: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(listing["type"], "DockingPort");
    assert_eq!(listing["inheritance"][1], "Part");
    let names: Vec<&str> = listing["members"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|m| m["name"].as_str())
        .collect();
    assert!(names.contains(&"UNDOCK"));
    assert!(names.contains(&"TAG"));
}

#[test]
fn members_rejects_unknown_type() {
    let out = astro(&["members", "Rocket"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("Known types"));
}

#[test]
fn return_outside_function() {
    let out = astro(&["scope", "RETURN"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("RETURN cannot be used outside a FUNCTION"));
}

#[test]
fn break_inside_loop() {
    let out = astro(&["scope", "break", "--in-loop"]);
    assert!(out.status.success());
    assert!(stdout(&out).contains("BREAK is valid here"));
}
