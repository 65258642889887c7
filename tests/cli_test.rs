//! Integration tests for the appenv binary.

mod common;

use std::process::{Command, Output};

use appenv::source::{MapEnv, ReadEnv};
use common::valid_env;

const DECLARED: &[&str] = &[
    "DATABASE_URL",
    "NODE_ENV",
    "NEXTAUTH_SECRET",
    "NEXTAUTH_URL",
    "GOOGLE_CLIENT_ID",
    "GOOGLE_CLIENT_SECRET",
    "SLACK_CLIENT_ID",
    "SLACK_CLIENT_SECRET",
];

/// Run the binary with exactly the declared variables of `env` and nothing
/// inherited, from a directory without a `.env` file.
fn appenv(env: &MapEnv, args: &[&str]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_appenv"));
    cmd.env_clear().current_dir(std::env::temp_dir()).args(args);
    for name in DECLARED {
        if let Some(value) = env.var(name) {
            cmd.env(name, value);
        }
    }
    cmd.output().expect("failed to run appenv")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// ---------------------------------------------------------------------------
// check
// ---------------------------------------------------------------------------

#[test]
fn check_fails_and_lists_every_missing_variable() {
    let output = appenv(&MapEnv::new(), &["check"]);

    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    for name in [
        "DATABASE_URL",
        "NEXTAUTH_URL",
        "GOOGLE_CLIENT_ID",
        "GOOGLE_CLIENT_SECRET",
        "SLACK_CLIENT_ID",
        "SLACK_CLIENT_SECRET",
    ] {
        assert!(err.contains(name), "{name} missing from:\n{err}");
    }
    assert!(stdout(&output).is_empty());
}

#[test]
fn check_reports_the_failure_once() {
    let output = appenv(&MapEnv::new(), &["check"]);

    let err = stderr(&output);
    assert_eq!(err.matches("DATABASE_URL").count(), 1, "stderr:\n{err}");
}

#[test]
fn check_prints_redacted_json() {
    let output = appenv(&valid_env(), &["check", "--format", "json"]);

    assert_eq!(output.status.code(), Some(0), "stderr:\n{}", stderr(&output));
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["DATABASE_URL"], "[REDACTED]");
    assert_eq!(json["GOOGLE_CLIENT_SECRET"], "[REDACTED]");
    assert_eq!(json["GOOGLE_CLIENT_ID"], "google-id");
    assert_eq!(json["NODE_ENV"], "development");
    assert!(json["NEXTAUTH_SECRET"].is_null());
    assert!(!stdout(&output).contains("s3cret-pw"));
}

#[test]
fn check_prints_redacted_text() {
    let output = appenv(&valid_env(), &["check"]);

    assert_eq!(output.status.code(), Some(0), "stderr:\n{}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("SLACK_CLIENT_ID"));
    assert!(out.contains("slack-id"));
    assert!(out.contains("[REDACTED]"));
    assert!(out.contains("(unset)"));
    assert!(!out.contains("slack-secret"));
}

#[test]
fn check_client_side_ignores_server_variables() {
    let output = appenv(&MapEnv::new(), &["check", "--client"]);

    assert_eq!(output.status.code(), Some(0), "stderr:\n{}", stderr(&output));
    assert!(stdout(&output).contains("No variables declared for the client side."));
}

#[test]
fn check_without_platform_ignores_platform_url() {
    let mut env = valid_env();
    env.remove("NEXTAUTH_URL");
    // VERCEL_URL is not forwarded by `appenv`, so pass it explicitly.
    let output = Command::new(env!("CARGO_BIN_EXE_appenv"))
        .env_clear()
        .current_dir(std::env::temp_dir())
        .envs(DECLARED.iter().filter_map(|n| env.var(n).map(|v| (*n, v))))
        .env("VERCEL_URL", "my-app.vercel.app")
        .args(["check", "--no-platform"])
        .output()
        .expect("failed to run appenv");

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("NEXTAUTH_URL"));
}

// ---------------------------------------------------------------------------
// schema
// ---------------------------------------------------------------------------

#[test]
fn schema_lists_every_declared_variable() {
    let output = appenv(&MapEnv::new(), &["schema", "--format", "json"]);

    assert_eq!(output.status.code(), Some(0));
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let names: Vec<_> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, DECLARED);
}

#[test]
fn schema_follows_the_platform_flag() {
    let with = appenv(&MapEnv::new(), &["schema"]);
    let without = appenv(&MapEnv::new(), &["schema", "--no-platform"]);

    assert!(stdout(&with).contains("(preprocessed)"));
    assert!(!stdout(&without).contains("(preprocessed)"));
}
