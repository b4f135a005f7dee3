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

//! End-to-end tests of the cmdtest binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn cmdtest() -> Command {
    Command::cargo_bin("cmdtest").expect("Failed to find cmdtest binary")
}

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

/// Reference and candidates all print the same bytes.
const MATCHING: &str = r#"{
    "suites": [
        {
            "name": "ASCII search",
            "reference": ["echo", "Sherlock Holmes"],
            "commands": {
                "same": ["echo", "Sherlock Holmes"],
                "also same": ["printf", "Sherlock Holmes\n"]
            }
        }
    ]
}"#;

/// The second candidate differs from the reference by one trailing byte.
const TRAILING_BYTE: &str = r#"{
    "suites": [
        {
            "name": "trailing byte",
            "reference": ["printf", "match\n"],
            "commands": {
                "good": ["printf", "match\n"],
                "bad": ["printf", "match\n\n"]
            }
        }
    ]
}"#;

const TWO_SUITES: &str = r#"{
    "suites": [
        {
            "name": "plain search",
            "reference": ["echo", "a"],
            "commands": { "same": ["echo", "a"] }
        },
        {
            "name": "regex search",
            "reference": ["echo", "b"],
            "commands": { "same": ["echo", "b"] }
        }
    ]
}"#;

#[test]
fn test_help_output() {
    cmdtest()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Compare command output against a trusted reference",
        ))
        .stdout(predicate::str::contains("--exit-on-failure"));
}

#[test]
fn test_missing_config_exits_1() {
    cmdtest()
        .arg("/nonexistent/testsuite.json")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("failed to read suite config"));
}

#[test]
fn test_matching_candidates_pass() {
    let dir = TempDir::new().unwrap();
    let config = write(dir.path(), "testsuite.json", MATCHING);
    cmdtest()
        .arg(&config)
        .arg("--silent")
        .assert()
        .success()
        .stdout(predicate::str::contains("✅  ASCII search: PASSED"));
}

#[test]
fn test_trailing_byte_difference_fails() {
    let dir = TempDir::new().unwrap();
    let config = write(dir.path(), "testsuite.json", TRAILING_BYTE);
    cmdtest()
        .arg(&config)
        .arg("--silent")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("❌  trailing byte: FAILED"))
        .stdout(predicate::str::contains("bad: failed"))
        .stdout(predicate::str::contains("good: failed").not())
        .stderr(predicate::str::contains("1 of 1 suites failed"));
}

#[test]
fn test_list_benchmarks() {
    let dir = TempDir::new().unwrap();
    let config = write(dir.path(), "testsuite.json", TWO_SUITES);
    cmdtest()
        .arg(&config)
        .arg("--list-benchmarks")
        .assert()
        .success()
        .stdout(predicate::str::contains(" - plain search"))
        .stdout(predicate::str::contains(" - regex search"));
}

#[test]
fn test_filter_selects_by_regex() {
    let dir = TempDir::new().unwrap();
    let config = write(dir.path(), "testsuite.json", TWO_SUITES);
    cmdtest()
        .arg(&config)
        .args(["--silent", "--filter", "regex"])
        .assert()
        .success()
        .stdout(predicate::str::contains("regex search: PASSED"))
        .stdout(predicate::str::contains("plain search").not());
}

#[test]
fn test_invalid_filter_exits_1() {
    let dir = TempDir::new().unwrap();
    let config = write(dir.path(), "testsuite.json", TWO_SUITES);
    cmdtest()
        .arg(&config)
        .args(["--filter", "["])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid filter"));
}

#[test]
fn test_exit_on_failure_stops_after_first_failing_suite() {
    let dir = TempDir::new().unwrap();
    let config = write(
        dir.path(),
        "testsuite.json",
        r#"{
            "suites": [
                {
                    "name": "failing first",
                    "reference": ["echo", "x"],
                    "commands": { "differs": ["echo", "y"] }
                },
                {
                    "name": "never reached",
                    "reference": ["echo", "z"],
                    "commands": { "same": ["echo", "z"] }
                }
            ]
        }"#,
    );
    cmdtest()
        .arg(&config)
        .args(["--silent", "--exit-on-failure"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("failing first: FAILED"))
        .stdout(predicate::str::contains("never reached").not());
}

#[test]
fn test_cleanup_runs_even_with_exit_on_failure() {
    let dir = TempDir::new().unwrap();
    let marker = dir.path().join("cleaned");
    let config = write(
        dir.path(),
        "testsuite.json",
        &format!(
            r#"{{
                "suites": [
                    {{
                        "name": "cleanup check",
                        "reference": ["echo", "x"],
                        "commands": {{ "differs": ["echo", "y"] }},
                        "cleanup_cmd": [["touch", "{}"]]
                    }}
                ]
            }}"#,
            marker.display()
        ),
    );
    cmdtest()
        .arg(&config)
        .args(["--silent", "--exit-on-failure"])
        .assert()
        .code(1);
    assert!(marker.exists(), "cleanup must run before the failure surfaces");
}
