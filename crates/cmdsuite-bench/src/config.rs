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

//! Typed benchmark configuration.
//!
//! One JSON document per benchmark:
//!
//! ```json
//! {
//!   "name": "grep comparison",
//!   "timer": "gnu time",
//!   "commands": { "grep": ["grep", "foo", "en.txt"] },
//!   "setup_cmd": [["make", "fixtures"]],
//!   "cleanup_cmd": [["rm", "-f", "fixtures.tmp"]]
//! }
//! ```
//!
//! Command declaration order follows document order and is preserved all
//! the way into the persisted results. An unknown `timer` value is a fatal
//! configuration error surfaced before any command executes.

use crate::engine::BenchmarkEngine;
use crate::error::{BenchError, Result};
use cmdsuite_core::{Command, GnuTimeStrategy, InlineBenchStrategy, TimingStrategy};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The timing backend a benchmark config selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timer {
    /// External GNU `time` supervisor.
    GnuTime,
    /// Instrumentation self-reported by the measured command.
    InlineBench,
}

impl Timer {
    /// Parses the config-file spelling, case-insensitively.
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.to_lowercase().as_str() {
            "gnu time" => Ok(Self::GnuTime),
            "inlinebench" => Ok(Self::InlineBench),
            _ => Err(BenchError::UnknownTimer {
                timer: raw.to_string(),
            }),
        }
    }

    /// The canonical config-file spelling.
    pub fn label(&self) -> &'static str {
        match self {
            Self::GnuTime => "gnu time",
            Self::InlineBench => "inlinebench",
        }
    }

    /// Builds the corresponding strategy.
    pub fn strategy(&self, timeout: Option<Duration>) -> Box<dyn TimingStrategy> {
        match self {
            Self::GnuTime => Box::new(GnuTimeStrategy::new().with_timeout(timeout)),
            Self::InlineBench => Box::new(InlineBenchStrategy::new().with_timeout(timeout)),
        }
    }
}

#[derive(Deserialize)]
struct RawSpec {
    name: String,
    timer: String,
    commands: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    setup_cmd: Vec<Vec<String>>,
    #[serde(default)]
    cleanup_cmd: Vec<Vec<String>>,
}

/// A parsed benchmark configuration.
#[derive(Debug, Clone)]
pub struct BenchmarkSpec {
    /// Benchmark display name.
    pub name: String,
    /// Selected timing backend.
    pub timer: Timer,
    /// Labelled argv vectors, in declaration order.
    pub commands: Vec<(String, Vec<String>)>,
    /// Setup argv vectors, run in order before the first iteration.
    pub setup: Vec<Vec<String>>,
    /// Cleanup argv vectors, always run after the last iteration.
    pub cleanup: Vec<Vec<String>>,
    /// The config file this spec was parsed from.
    pub source: PathBuf,
}

impl BenchmarkSpec {
    /// Loads and validates one benchmark config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| BenchError::ConfigIo {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let parse_err = |message: String| BenchError::ConfigParse {
            path: path.to_path_buf(),
            message,
        };
        let raw: RawSpec = serde_json::from_str(&text).map_err(|e| parse_err(e.to_string()))?;
        let timer = Timer::parse(&raw.timer)?;
        let mut commands = Vec::with_capacity(raw.commands.len());
        for (label, value) in raw.commands {
            let argv: Vec<String> = serde_json::from_value(value)
                .map_err(|e| parse_err(format!("command '{label}': {e}")))?;
            if argv.is_empty() {
                return Err(parse_err(format!("command '{label}': empty argv")));
            }
            commands.push((label, argv));
        }
        Ok(Self {
            name: raw.name,
            timer,
            commands,
            setup: raw.setup_cmd,
            cleanup: raw.cleanup_cmd,
            source: path.to_path_buf(),
        })
    }

    /// Builds an engine for this spec.
    ///
    /// `cwd` applies to every command in the benchmark; `timeout` is the
    /// per-command deadline. Iterations, sleep, and the cache-drop command
    /// are applied afterwards through the engine's builder methods.
    pub fn to_engine(&self, cwd: Option<&Path>, timeout: Option<Duration>) -> BenchmarkEngine {
        let place = |name: &str, argv: &[String]| {
            let mut command = Command::new(name, argv.to_vec());
            if let Some(dir) = cwd {
                command = command.with_cwd(dir);
            }
            command
        };
        let commands = self
            .commands
            .iter()
            .map(|(label, argv)| place(label, argv))
            .collect();
        let lifecycle = |argvs: &[Vec<String>]| {
            argvs
                .iter()
                .map(|argv| {
                    let name = argv.first().cloned().unwrap_or_default();
                    place(&name, argv)
                })
                .collect::<Vec<_>>()
        };
        BenchmarkEngine::new(&self.name, commands, self.timer.strategy(timeout))
            .with_timeout(timeout)
            .with_setup(lifecycle(&self.setup))
            .with_cleanup(lifecycle(&self.cleanup))
    }
}

/// Recursively collects `*.json` config files under `dir`, sorted by path.
///
/// Metadata index files (`*.meta.json`) are skipped.
pub fn collect_config_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    fn walk(dir: &Path, out: &mut Vec<PathBuf>) -> std::io::Result<()> {
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_dir() {
                walk(&path, out)?;
            } else if path.extension().is_some_and(|ext| ext == "json") {
                let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
                if !name.ends_with(".meta.json") {
                    out.push(path);
                }
            }
        }
        Ok(())
    }
    let mut files = Vec::new();
    walk(dir, &mut files)?;
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const SAMPLE: &str = r#"{
        "name": "grep comparison",
        "timer": "GNU time",
        "commands": {
            "grep": ["grep", "foo", "en.txt"],
            "xs": ["xs", "foo", "en.txt"],
            "xs -j 1": ["xs", "foo", "en.txt", "-j", "1"]
        },
        "setup_cmd": [["touch", "en.txt"]],
        "cleanup_cmd": [["rm", "-f", "en.txt"]]
    }"#;

    fn write_config(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_timer_parse_is_case_insensitive() {
        assert_eq!(Timer::parse("GNU time").unwrap(), Timer::GnuTime);
        assert_eq!(Timer::parse("gnu time").unwrap(), Timer::GnuTime);
        assert_eq!(Timer::parse("InlineBench").unwrap(), Timer::InlineBench);
    }

    #[test]
    fn test_timer_parse_rejects_unknown() {
        let err = Timer::parse("stopwatch").unwrap_err();
        assert!(err.to_string().contains("Choose from"));
    }

    #[test]
    fn test_load_preserves_declaration_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "bench.json", SAMPLE);
        let spec = BenchmarkSpec::load(&path).unwrap();
        assert_eq!(spec.name, "grep comparison");
        assert_eq!(spec.timer, Timer::GnuTime);
        let labels: Vec<&str> = spec.commands.iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(labels, ["grep", "xs", "xs -j 1"]);
        assert_eq!(spec.setup, vec![vec!["touch", "en.txt"]]);
    }

    #[test]
    fn test_load_rejects_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "broken.json", "{ not json");
        let err = BenchmarkSpec::load(&path).unwrap_err();
        assert!(matches!(err, BenchError::ConfigParse { .. }));
    }

    #[test]
    fn test_load_rejects_empty_argv() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            "empty.json",
            r#"{"name": "x", "timer": "inlinebench", "commands": {"a": []}}"#,
        );
        let err = BenchmarkSpec::load(&path).unwrap_err();
        assert!(err.to_string().contains("empty argv"));
    }

    #[test]
    fn test_to_engine_applies_cwd() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "bench.json", SAMPLE);
        let spec = BenchmarkSpec::load(&path).unwrap();
        let engine = spec.to_engine(Some(Path::new("/data")), None);
        assert_eq!(engine.name(), "grep comparison");
        assert!(engine
            .commands()
            .iter()
            .all(|c| c.cwd() == Some(Path::new("/data"))));
    }

    #[test]
    fn test_collect_config_files_recurses_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        write_config(dir.path(), "b.json", "{}");
        write_config(&dir.path().join("sub"), "a.json", "{}");
        write_config(dir.path(), "notes.txt", "ignored");
        write_config(dir.path(), "results.results.meta.json", "{}");
        let files = collect_config_files(dir.path()).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().display().to_string())
            .collect();
        assert_eq!(names, ["b.json", "sub/a.json"]);
    }
}
