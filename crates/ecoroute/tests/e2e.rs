// SPDX-FileCopyrightText: 2026 ecoroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests for the `ecoroute` binary.
//!
//! Each test runs the compiled binary in an isolated temp directory against
//! a wiremock Ollama server, with the constant-power energy backend so no
//! hardware counters are needed.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn ollama_replying(content: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "model": "any",
            "message": {"role": "assistant", "content": content},
            "done": true
        })))
        .mount(&server)
        .await;
    server
}

fn write_config(dir: &Path, base_url: &str, extra: &str) -> PathBuf {
    let path = dir.join("test.toml");
    let toml = format!(
        "[logging]\nlevel = \"warn\"\n\n\
         [inference]\nbase_url = \"{base_url}\"\ntimeout_secs = 10\n\n\
         [energy]\nbackend = \"constant\"\nconstant_watts = 100.0\n\n\
         [evaluation]\npause_ms = 0\n\n{extra}"
    );
    std::fs::write(&path, toml).unwrap();
    path
}

/// Run the binary inside `dir`, isolated from user and system config.
async fn ecoroute(dir: &Path, args: &[&str]) -> Output {
    let dir = dir.to_path_buf();
    let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
    tokio::task::spawn_blocking(move || {
        Command::new(env!("CARGO_BIN_EXE_ecoroute"))
            .args(&args)
            .current_dir(&dir)
            .env("HOME", &dir)
            .env("XDG_CONFIG_HOME", &dir)
            .env_remove("RUST_LOG")
            .output()
            .unwrap()
    })
    .await
    .unwrap()
}

fn read_rows(path: &Path, delimiter: char) -> Vec<Vec<String>> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| line.split(delimiter).map(str::to_string).collect())
        .collect()
}

#[tokio::test]
async fn config_prints_effective_toml() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "http://ollama.test:11434", "");

    let out = ecoroute(dir.path(), &["--config", config.to_str().unwrap(), "config"]).await;
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("base_url = \"http://ollama.test:11434\""), "{stdout}");
    assert!(stdout.contains("large_threshold = 5"), "{stdout}");
    assert!(stdout.contains("backend = \"constant\""), "{stdout}");
}

#[tokio::test]
async fn unknown_config_key_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "http://x", "[routing]\nlarge_treshold = 7\n");

    let out = ecoroute(dir.path(), &["--config", config.to_str().unwrap(), "config"]).await;
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("large_treshold"), "{stderr}");
}

#[tokio::test]
async fn route_with_missing_input_fails_before_any_call() {
    let server = ollama_replying("3").await;
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), &server.uri(), "");

    let out = ecoroute(
        dir.path(),
        &["--config", config.to_str().unwrap(), "route", "--input", "missing.csv"],
    )
    .await;
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("missing.csv"));
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn route_writes_answer_table() {
    let server = ollama_replying("3").await;
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), &server.uri(), "");
    std::fs::write(
        dir.path().join("prompts.csv"),
        "sess_id;prompt\ns1;What is 2+2?\ns2;Name a colour\n",
    )
    .unwrap();

    let out = ecoroute(dir.path(), &["--config", config.to_str().unwrap(), "route"]).await;
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert!(String::from_utf8_lossy(&out.stdout).contains("2 completed, 0 failed"));

    let rows = read_rows(&dir.path().join("answers.csv"), ';');
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0][0], "sess_id");
    assert_eq!(rows[0][11], "status");
    assert_eq!(rows[1][0], "s1");
    assert_eq!(rows[1][2], "small");
    assert_eq!(rows[1][4], "3");
    assert_eq!(rows[1][11], "ok");
    assert_eq!(rows[3][0], "TOTAL");
    // warm-up, classify, warm-up, answer per prompt
    assert_eq!(server.received_requests().await.unwrap().len(), 8);
}

#[tokio::test]
async fn route_limit_caps_prompts() {
    let server = ollama_replying("8").await;
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), &server.uri(), "");
    std::fs::write(
        dir.path().join("prompts.csv"),
        "sess_id;prompt\ns1;a\ns2;b\ns3;c\n",
    )
    .unwrap();

    let out = ecoroute(
        dir.path(),
        &["--config", config.to_str().unwrap(), "route", "--limit", "1", "--output", "one.csv"],
    )
    .await;
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let rows = read_rows(&dir.path().join("one.csv"), ';');
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[1][2], "large");
}

#[tokio::test]
async fn route_rejects_zero_limit() {
    let server = ollama_replying("1").await;
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), &server.uri(), "");
    std::fs::write(dir.path().join("prompts.csv"), "sess_id;prompt\ns1;a\n").unwrap();

    let out = ecoroute(
        dir.path(),
        &["--config", config.to_str().unwrap(), "route", "--limit", "0"],
    )
    .await;
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("--limit must be at least 1"));
    assert!(!dir.path().join("answers.csv").exists());
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn evaluate_writes_ratings() {
    let server = ollama_replying("Score: 8").await;
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), &server.uri(), "");
    std::fs::write(
        dir.path().join("answers.csv"),
        "sess_id;prompt;answer\ns1;What is 2+2?;4\nTOTAL;;\n",
    )
    .unwrap();

    let out = ecoroute(
        dir.path(),
        &["--config", config.to_str().unwrap(), "evaluate", "--trials", "3"],
    )
    .await;
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert!(String::from_utf8_lossy(&out.stdout).contains("1/1"));

    let rows = read_rows(&dir.path().join("ratings.csv"), ';');
    assert_eq!(rows.len(), 2);
    assert_eq!(
        rows[0],
        ["sess_id", "prompt", "answer", "rating", "mean_score", "variance", "all_scores", "failed_trials"]
    );
    assert_eq!(rows[1][3], "8");
    assert_eq!(rows[1][5], "0");
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn measure_runs_every_model_on_every_prompt() {
    let server = ollama_replying("ok").await;
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(
        dir.path(),
        &server.uri(),
        "[benchmark]\nmodels = [\"m1\", \"m2\"]\n",
    );
    std::fs::write(
        dir.path().join("prompts.csv"),
        "sess_id;prompt\np1;one\np2;two\n",
    )
    .unwrap();

    let out = ecoroute(dir.path(), &["--config", config.to_str().unwrap(), "measure"]).await;
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let rows = read_rows(&dir.path().join("benchmark.csv"), ';');
    assert_eq!(rows.len(), 5);
    assert_eq!(rows[0][0], "global_id");
    assert_eq!(rows[4][0], "4");
    assert_eq!(rows[4][2], "m2");
}
