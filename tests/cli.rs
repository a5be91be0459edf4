//! Integration tests for the nlq binary.
//!
//! Every run points `--config` into a temp directory so the user's own
//! configuration never leaks into the results.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn nlq(config: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_nlq"))
        .arg("--config")
        .arg(config)
        .args(args)
        .env_remove("NLQ_LOG")
        .output()
        .expect("Failed to run nlq")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn config_in(dir: &TempDir) -> std::path::PathBuf {
    dir.path().join("config.json")
}

#[test]
fn test_parse_json() {
    let dir = TempDir::new().unwrap();
    let out = nlq(&config_in(&dir), &["--json", "parse", "年龄大于18按年龄降序限制5条"]);
    assert!(out.status.success());

    let json: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(json["kind"], "query");
    assert_eq!(json["condition"]["field_hint"], "年龄");
    assert_eq!(json["condition"]["operator"], "GT");
    assert_eq!(json["condition"]["value"], 18);
    assert_eq!(json["pagination"]["limit"], 5);
}

#[test]
fn test_parse_joins_words() {
    let dir = TempDir::new().unwrap();
    let out = nlq(&config_in(&dir), &["--json", "parse", "city", "is", "beijing"]);
    assert!(out.status.success());
    let json: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(json["condition"]["value"], "beijing");
}

#[test]
fn test_parse_tree_output() {
    let dir = TempDir::new().unwrap();
    let out = nlq(&config_in(&dir), &["parse", "按城市分组统计平均年龄"]);
    assert!(out.status.success());
    let text = stdout(&out);
    assert!(text.starts_with("analytics\n"));
    assert!(text.contains("terms_城市 TERMS"));
}

#[test]
fn test_parse_failure_exits_nonzero() {
    let dir = TempDir::new().unwrap();
    let out = nlq(&config_in(&dir), &["parse", "查一下"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("only stop words"));
}

#[test]
fn test_parse_failure_offers_suggestions() {
    let dir = TempDir::new().unwrap();
    let out = nlq(&config_in(&dir), &["parse", "name", "contians", "bob"]);
    assert!(!out.status.success());
    assert!(stdout(&out).contains("contains"));
}

#[test]
fn test_tokens_json() {
    let dir = TempDir::new().unwrap();
    let out = nlq(&config_in(&dir), &["--json", "tokens", "年龄>18"]);
    assert!(out.status.success());

    let json: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    let tokens = json.as_array().unwrap();
    assert_eq!(tokens.len(), 3);
    assert_eq!(tokens[1]["kind"], "operator");
    assert_eq!(tokens[1]["payload"], "GT");
    assert_eq!(tokens[2]["offset"], 7);
}

#[test]
fn test_suggest() {
    let dir = TempDir::new().unwrap();
    let out = nlq(&config_in(&dir), &["suggest", "大雨"]);
    assert!(out.status.success());
    assert!(stdout(&out).contains("大于"));

    let out = nlq(&config_in(&dir), &["suggest", "根本不是操作符"]);
    assert!(out.status.success());
    assert!(stdout(&out).starts_with("no operator close to"));
}

#[test]
fn test_config_init_and_dictionary() {
    let dir = TempDir::new().unwrap();
    let path = config_in(&dir);

    let out = nlq(&path, &["config", "--init"]);
    assert!(out.status.success());
    assert!(path.exists());

    // Before the dictionary knows 超出 nothing is recognized
    assert!(!nlq(&path, &["parse", "年龄超出18"]).status.success());

    fs::write(&path, r#"{"dictionary": {"operators": {"超出": "GT"}}}"#).unwrap();
    let out = nlq(&path, &["--json", "parse", "年龄超出18"]);
    assert!(out.status.success());
    let json: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(json["condition"]["operator"], "GT");
}
