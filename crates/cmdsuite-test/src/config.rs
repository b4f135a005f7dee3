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

//! Typed differential-suite configuration.
//!
//! One JSON document lists any number of suites:
//!
//! ```json
//! {
//!   "suites": [
//!     {
//!       "name": "ASCII search",
//!       "reference": ["grep", "Sherlock", "en.txt"],
//!       "commands": {
//!         "xs": ["xs", "Sherlock", "en.txt"],
//!         "xs -j 1": ["xs", "Sherlock", "en.txt", "-j", "1"]
//!       },
//!       "setup_cmd": [["make", "fixtures"]],
//!       "cleanup_cmd": [["rm", "-f", "fixtures.tmp"]]
//!     }
//!   ]
//! }
//! ```
//!
//! Candidate declaration order follows document order.

use crate::error::{Result, SuiteError};
use crate::suite::DifferentialTestSuite;
use cmdsuite_core::Command;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Deserialize)]
struct RawDocument {
    suites: Vec<RawSuite>,
}

#[derive(Deserialize)]
struct RawSuite {
    name: String,
    reference: Vec<String>,
    commands: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    setup_cmd: Vec<Vec<String>>,
    #[serde(default)]
    cleanup_cmd: Vec<Vec<String>>,
}

/// A parsed differential-suite definition.
#[derive(Debug, Clone)]
pub struct SuiteSpec {
    /// Suite display name.
    pub name: String,
    /// The trusted reference argv.
    pub reference: Vec<String>,
    /// Labelled candidate argvs, in declaration order.
    pub commands: Vec<(String, Vec<String>)>,
    /// Setup argvs, run in order before the reference capture.
    pub setup: Vec<Vec<String>>,
    /// Cleanup argvs, always run after the candidates.
    pub cleanup: Vec<Vec<String>>,
    /// The config file this spec was parsed from.
    pub source: PathBuf,
}

impl SuiteSpec {
    /// Loads every suite defined in one config file, in document order.
    pub fn load_all(path: &Path) -> Result<Vec<Self>> {
        let text = std::fs::read_to_string(path).map_err(|e| SuiteError::ConfigIo {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let parse_err = |message: String| SuiteError::ConfigParse {
            path: path.to_path_buf(),
            message,
        };
        let raw: RawDocument =
            serde_json::from_str(&text).map_err(|e| parse_err(e.to_string()))?;
        let mut specs = Vec::with_capacity(raw.suites.len());
        for suite in raw.suites {
            if suite.reference.is_empty() {
                return Err(parse_err(format!("suite '{}': empty reference", suite.name)));
            }
            let mut commands = Vec::with_capacity(suite.commands.len());
            for (label, value) in suite.commands {
                let argv: Vec<String> = serde_json::from_value(value)
                    .map_err(|e| parse_err(format!("candidate '{label}': {e}")))?;
                if argv.is_empty() {
                    return Err(parse_err(format!("candidate '{label}': empty argv")));
                }
                commands.push((label, argv));
            }
            specs.push(Self {
                name: suite.name,
                reference: suite.reference,
                commands,
                setup: suite.setup_cmd,
                cleanup: suite.cleanup_cmd,
                source: path.to_path_buf(),
            });
        }
        Ok(specs)
    }

    /// Builds the runnable suite.
    pub fn to_suite(&self, fail_fast: bool, timeout: Option<Duration>) -> DifferentialTestSuite {
        let reference_name = self.reference.first().cloned().unwrap_or_default();
        let lifecycle = |argvs: &[Vec<String>]| {
            argvs
                .iter()
                .map(|argv| Command::from_argv(argv.clone()))
                .collect::<Vec<_>>()
        };
        DifferentialTestSuite::new(
            &self.name,
            Command::new(reference_name, self.reference.clone()),
            self.commands
                .iter()
                .map(|(label, argv)| Command::new(label, argv.clone()))
                .collect(),
        )
        .with_setup(lifecycle(&self.setup))
        .with_cleanup(lifecycle(&self.cleanup))
        .with_fail_fast(fail_fast)
        .with_timeout(timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const SAMPLE: &str = r#"{
        "suites": [
            {
                "name": "ASCII search",
                "reference": ["grep", "Sherlock", "en.txt"],
                "commands": {
                    "xs": ["xs", "Sherlock", "en.txt"],
                    "xs -j 1": ["xs", "Sherlock", "en.txt", "-j", "1"]
                }
            },
            {
                "name": "ASCII regex search",
                "reference": ["grep", "She[r ]lock", "en.txt"],
                "commands": { "xs": ["xs", "She[r ]lock", "en.txt"] },
                "setup_cmd": [["touch", "en.txt"]],
                "cleanup_cmd": [["rm", "-f", "en.txt"]]
            }
        ]
    }"#;

    #[test]
    fn test_load_all_keeps_document_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("testsuite.json");
        fs::write(&path, SAMPLE).unwrap();
        let specs = SuiteSpec::load_all(&path).unwrap();
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].name, "ASCII search");
        let labels: Vec<&str> = specs[0].commands.iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(labels, ["xs", "xs -j 1"]);
        assert_eq!(specs[1].setup, vec![vec!["touch", "en.txt"]]);
    }

    #[test]
    fn test_load_all_rejects_empty_reference() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(
            &path,
            r#"{"suites": [{"name": "x", "reference": [], "commands": {}}]}"#,
        )
        .unwrap();
        let err = SuiteSpec::load_all(&path).unwrap_err();
        assert!(err.to_string().contains("empty reference"));
    }

    #[test]
    fn test_to_suite_wires_fail_fast() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("testsuite.json");
        fs::write(&path, SAMPLE).unwrap();
        let specs = SuiteSpec::load_all(&path).unwrap();
        let suite = specs[0].to_suite(true, None);
        assert_eq!(suite.name(), "ASCII search");
    }
}
