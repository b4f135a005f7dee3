// Dweve cmdsuite - Command Benchmark & Differential Test Harness
//
// Copyright (c) 2025 Dweve IP B.V. and individual contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! End-to-end tests of the cmdbench binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn cmdbench() -> Command {
    Command::cargo_bin("cmdbench").expect("Failed to find cmdbench binary")
}

/// A config whose only command self-reports instrumentation, so the run
/// needs no GNU time install.
fn inline_config(name: &str) -> String {
    format!(
        r#"{{
            "name": "{name}",
            "timer": "inlinebench",
            "commands": {{
                "fast": ["sh", "-c", "echo out; echo '{{\"cpu [s]\": 0.01, \"wall [s]\": 0.02}}' >&2"],
                "slow": ["sh", "-c", "echo out; echo '{{\"cpu [s]\": 0.04, \"wall [s]\": 0.05}}' >&2"]
            }},
            "setup_cmd": [],
            "cleanup_cmd": []
        }}"#
    )
}

fn write(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_help_output() {
    cmdbench()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Compare command line tools"))
        .stdout(predicate::str::contains("--iterations"));
}

#[test]
fn test_missing_config_path_exits_1() {
    cmdbench()
        .args(["--config", "/nonexistent/bench.json"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_empty_directory_exits_2() {
    let dir = TempDir::new().unwrap();
    cmdbench()
        .arg("--config")
        .arg(dir.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("No valid config files found"));
}

#[test]
fn test_malformed_config_exits_2() {
    let dir = TempDir::new().unwrap();
    let config = write(dir.path(), "broken.json", "{ not json");
    cmdbench()
        .arg("--config")
        .arg(&config)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid config"));
}

#[test]
fn test_unknown_timer_exits_2() {
    let dir = TempDir::new().unwrap();
    let config = write(
        dir.path(),
        "bad_timer.json",
        r#"{"name": "x", "timer": "stopwatch", "commands": {"a": ["true"]}}"#,
    );
    cmdbench()
        .arg("--config")
        .arg(&config)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Choose from ['GNU time', 'InlineBench']"));
}

#[test]
fn test_list_benchmarks() {
    let dir = TempDir::new().unwrap();
    let config = write(dir.path(), "bench.json", &inline_config("listed run"));
    cmdbench()
        .arg("--config")
        .arg(&config)
        .arg("--list-benchmarks")
        .assert()
        .success()
        .stdout(predicate::str::contains(" - listed run"));
}

#[test]
fn test_transient_run_renders_summary() {
    let dir = TempDir::new().unwrap();
    let config = write(dir.path(), "bench.json", &inline_config("transient"));
    cmdbench()
        .args(["--iterations", "2", "--silent", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("transient"))
        .stdout(predicate::str::contains("wall [s]"))
        .stdout(predicate::str::contains("C/T"));
}

#[test]
fn test_persisted_run_allocates_fresh_ids() {
    let dir = TempDir::new().unwrap();
    let config = write(dir.path(), "bench.json", &inline_config("grep comparison"));
    let out = dir.path().join("results");

    for _ in 0..2 {
        cmdbench()
            .args(["--iterations", "2", "--silent", "--config"])
            .arg(&config)
            .arg("--output")
            .arg(&out)
            .assert()
            .success()
            .stdout(predicate::str::contains("results written to"));
    }

    assert!(out.join("grep_comparison_0.json").exists());
    assert!(out.join("grep_comparison_1.json").exists());

    let document: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(out.join("grep_comparison_0.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(document["name"], "grep comparison");
    let walls = document["results"]["fast"]["data"]["wall [s]"].as_array().unwrap();
    assert_eq!(walls.len(), 2);

    // One index per output directory, as a sibling, covering both runs.
    let index_path = dir.path().join("results.results.meta.json");
    let index: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&index_path).unwrap()).unwrap();
    assert!(index.get("grep_comparison_0.json").is_some());
    assert!(index.get("grep_comparison_1.json").is_some());
    assert_eq!(
        index["grep_comparison_1.json"]["plot"],
        "grep_comparison_1.pdf"
    );
}

#[test]
fn test_config_directory_is_scanned_recursively() {
    let dir = TempDir::new().unwrap();
    let nested = dir.path().join("suite");
    fs::create_dir(&nested).unwrap();
    write(&nested, "inner.json", &inline_config("nested run"));
    cmdbench()
        .arg("--config")
        .arg(dir.path())
        .args(["--iterations", "1", "--silent"])
        .assert()
        .success()
        .stdout(predicate::str::contains("nested run"));
}

#[test]
fn test_failing_benchmark_exits_1_with_summary() {
    let dir = TempDir::new().unwrap();
    let config = write(
        dir.path(),
        "missing.json",
        r#"{
            "name": "missing tool",
            "timer": "inlinebench",
            "commands": {"ghost": ["definitely-not-a-binary-7f3a"]},
            "setup_cmd": [],
            "cleanup_cmd": []
        }"#,
    );
    cmdbench()
        .arg("--config")
        .arg(&config)
        .arg("--silent")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not found on PATH"))
        .stderr(predicate::str::contains("1 of 1 benchmarks failed"));
}

#[test]
fn test_timeout_kills_hung_command() {
    let dir = TempDir::new().unwrap();
    let config = write(
        dir.path(),
        "hang.json",
        r#"{
            "name": "hang",
            "timer": "inlinebench",
            "commands": {"hang": ["sleep", "600"]},
            "setup_cmd": [],
            "cleanup_cmd": []
        }"#,
    );
    cmdbench()
        .arg("--config")
        .arg(&config)
        .args(["--timeout", "1", "--silent"])
        .timeout(std::time::Duration::from_secs(60))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("was killed"));
}
