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

//! Collision-free result persistence and the metadata index.
//!
//! Results are serialized to a stable schema:
//!
//! ```json
//! {
//!   "name": "grep comparison",
//!   "results": {
//!     "grep": { "data": { "wall [s]": [1.2, 1.3], "cpu [s]": [1.0, 1.1] } }
//!   }
//! }
//! ```
//!
//! Output names are allocated by scanning the target directory for the
//! lowest free `<base>_<id>` suffix, so a run never silently overwrites a
//! prior one. The same id names the `.json` result and its `.pdf` plot
//! companion (the plot itself is written by an external renderer).
//!
//! The sibling metadata index (`<output>.results.meta.json`) maps each
//! output name to its run provenance. It is read, merged in memory, and
//! rewritten whole, with no locking: concurrent writers racing on the same
//! index file are undefined behavior — a known limitation, not something
//! this module papers over. Callers must serialize their own invocations
//! against one output directory.

use crate::aggregate::{metric_labels, metric_series};
use crate::engine::BenchmarkRun;
use crate::error::{BenchError, Result};
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};

/// One command's persisted metric series.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredCommand {
    /// The command's display name.
    pub command: String,
    /// Metric label → ordered values, one per iteration.
    pub series: Vec<(String, Vec<f64>)>,
}

/// A benchmark run in its on-disk shape.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRun {
    /// The benchmark's display name.
    pub name: String,
    /// Per-command series in declaration order.
    pub commands: Vec<StoredCommand>,
}

impl StoredRun {
    /// Flattens an in-memory run into the persistable shape.
    pub fn from_run(run: &BenchmarkRun) -> Self {
        let commands = run
            .results
            .iter()
            .map(|result| StoredCommand {
                command: result.command.name().to_string(),
                series: metric_labels(&result.samples)
                    .into_iter()
                    .map(|label| {
                        let values = metric_series(&result.samples, &label);
                        (label, values)
                    })
                    .collect(),
            })
            .collect();
        Self {
            name: run.name.clone(),
            commands,
        }
    }

    /// Builds the stable JSON document, key order preserved.
    pub fn to_value(&self) -> Value {
        let mut results = Map::new();
        for command in &self.commands {
            let mut data = Map::new();
            for (label, values) in &command.series {
                data.insert(label.clone(), json!(values));
            }
            let mut entry = Map::new();
            entry.insert("data".to_string(), Value::Object(data));
            results.insert(command.command.clone(), Value::Object(entry));
        }
        let mut document = Map::new();
        document.insert("name".to_string(), Value::String(self.name.clone()));
        document.insert("results".to_string(), Value::Object(results));
        Value::Object(document)
    }

    /// Parses the stable JSON document back.
    pub fn from_value(value: &Value, path: &Path) -> Result<Self> {
        let malformed = |message: &str| BenchError::ResultParse {
            path: path.to_path_buf(),
            message: message.to_string(),
        };
        let document = value.as_object().ok_or_else(|| malformed("not an object"))?;
        let name = document
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| malformed("missing 'name'"))?
            .to_string();
        let results = document
            .get("results")
            .and_then(Value::as_object)
            .ok_or_else(|| malformed("missing 'results'"))?;
        let mut commands = Vec::with_capacity(results.len());
        for (command, entry) in results {
            let data = entry
                .get("data")
                .and_then(Value::as_object)
                .ok_or_else(|| malformed("missing 'data'"))?;
            let mut series = Vec::with_capacity(data.len());
            for (label, values) in data {
                let values: Vec<f64> = values
                    .as_array()
                    .ok_or_else(|| malformed("metric is not an array"))?
                    .iter()
                    .map(|v| v.as_f64())
                    .collect::<Option<_>>()
                    .ok_or_else(|| malformed("non-numeric sample"))?;
                series.push((label.clone(), values));
            }
            commands.push(StoredCommand {
                command: command.clone(),
                series,
            });
        }
        Ok(Self { name, commands })
    }
}

/// Turns a run name into a file-system-friendly base name.
pub fn sanitize_base(name: &str) -> String {
    name.replace(' ', "_")
}

/// Lowest non-negative id such that `<base>_<id>.json` does not exist in
/// `dir`.
///
/// A pure directory scan; it makes no reservation, so two processes
/// scanning concurrently can race to the same id (see module docs).
pub fn next_free_id(dir: &Path, base: &str) -> u32 {
    let mut id = 0;
    while dir.join(format!("{base}_{id}.json")).exists() {
        id += 1;
    }
    id
}

/// Provenance recorded in the metadata index for one persisted run.
#[derive(Debug, Clone)]
pub struct RunProvenance {
    /// The config file the run was parsed from.
    pub config_file: PathBuf,
    /// The timing backend label.
    pub timer: String,
    /// Configured iteration count.
    pub iterations: u32,
}

/// Paths allocated for one persisted run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedRun {
    /// Index key (`<base>_<id>.json`).
    pub key: String,
    /// Full path of the written result file.
    pub json_path: PathBuf,
    /// Full path reserved for the plot companion.
    pub plot_path: PathBuf,
}

/// Persists runs into one output directory and maintains its index.
#[derive(Debug, Clone)]
pub struct ResultStore {
    out_dir: PathBuf,
    index_path: PathBuf,
}

impl ResultStore {
    /// Creates a store writing into `out_dir`, with the metadata index as
    /// its sibling `<out_dir>.results.meta.json`.
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        let out_dir = out_dir.into();
        let mut index = out_dir.as_os_str().to_os_string();
        index.push(".results.meta.json");
        Self {
            out_dir,
            index_path: PathBuf::from(index),
        }
    }

    /// The directory results are written into.
    pub fn output_dir(&self) -> &Path {
        &self.out_dir
    }

    /// The metadata index path.
    pub fn index_path(&self) -> &Path {
        &self.index_path
    }

    /// Writes one run and records it in the index.
    ///
    /// Fatal on any write error; files written by earlier runs are left
    /// as-is.
    pub fn persist(&self, run: &BenchmarkRun, provenance: &RunProvenance) -> Result<PersistedRun> {
        std::fs::create_dir_all(&self.out_dir)
            .map_err(|e| BenchError::persist(&self.out_dir, e))?;
        let base = sanitize_base(&run.name);
        let id = next_free_id(&self.out_dir, &base);
        let key = format!("{base}_{id}.json");
        let plot = format!("{base}_{id}.pdf");
        let json_path = self.out_dir.join(&key);

        let document = StoredRun::from_run(run).to_value();
        let rendered = serde_json::to_string_pretty(&document)
            .map_err(|e| BenchError::persist(&json_path, e))?;
        std::fs::write(&json_path, rendered).map_err(|e| BenchError::persist(&json_path, e))?;

        self.update_index(&key, &plot, provenance)?;
        Ok(PersistedRun {
            key,
            json_path,
            plot_path: self.out_dir.join(plot),
        })
    }

    /// Reads a persisted result file back into its stored shape.
    pub fn load_run(path: &Path) -> Result<StoredRun> {
        let text = std::fs::read_to_string(path).map_err(|e| BenchError::ResultParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let value: Value = serde_json::from_str(&text).map_err(|e| BenchError::ResultParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        StoredRun::from_value(&value, path)
    }

    fn update_index(&self, key: &str, plot: &str, provenance: &RunProvenance) -> Result<()> {
        let mut index: Map<String, Value> = if self.index_path.exists() {
            let text = std::fs::read_to_string(&self.index_path)
                .map_err(|e| BenchError::persist(&self.index_path, e))?;
            serde_json::from_str(&text).map_err(|e| BenchError::persist(&self.index_path, e))?
        } else {
            Map::new()
        };
        index.insert(
            key.to_string(),
            json!({
                "config_file": provenance.config_file.display().to_string(),
                "plot": plot,
                "timer": provenance.timer,
                "iterations": provenance.iterations,
                "recorded_at": chrono::Utc::now().to_rfc3339(),
            }),
        );
        let rendered = serde_json::to_string_pretty(&Value::Object(index))
            .map_err(|e| BenchError::persist(&self.index_path, e))?;
        std::fs::write(&self.index_path, rendered)
            .map_err(|e| BenchError::persist(&self.index_path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{BenchmarkResult, BenchmarkRun};
    use cmdsuite_core::{Command, TimingSample};
    use std::fs;

    fn sample_run(name: &str) -> BenchmarkRun {
        let mut grep = BenchmarkResult::new(Command::new("grep", vec!["grep".to_string()]));
        grep.samples = vec![TimingSample::new(1.0, 0.8), TimingSample::new(1.1, 0.9)];
        let mut xs = BenchmarkResult::new(Command::new("xs", vec!["xs".to_string()]));
        xs.samples = vec![TimingSample::new(0.5, 0.4), TimingSample::new(0.6, 0.5)];
        BenchmarkRun {
            name: name.to_string(),
            results: vec![grep, xs],
        }
    }

    fn provenance() -> RunProvenance {
        RunProvenance {
            config_file: PathBuf::from("conf/grep.json"),
            timer: "gnu time".to_string(),
            iterations: 2,
        }
    }

    #[test]
    fn test_sanitize_base() {
        assert_eq!(sanitize_base("grep comparison"), "grep_comparison");
    }

    #[test]
    fn test_next_free_id_skips_existing() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(next_free_id(dir.path(), "bench"), 0);
        fs::write(dir.path().join("bench_0.json"), "{}").unwrap();
        fs::write(dir.path().join("bench_1.json"), "{}").unwrap();
        assert_eq!(next_free_id(dir.path(), "bench"), 2);
        // A different base is unaffected.
        assert_eq!(next_free_id(dir.path(), "other"), 0);
    }

    #[test]
    fn test_persist_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("results");
        let store = ResultStore::new(&out);
        let first = store.persist(&sample_run("grep comparison"), &provenance()).unwrap();
        let second = store.persist(&sample_run("grep comparison"), &provenance()).unwrap();
        assert_eq!(first.key, "grep_comparison_0.json");
        assert_eq!(second.key, "grep_comparison_1.json");
        assert!(first.json_path.exists());
        assert!(second.json_path.exists());
        assert_eq!(second.plot_path, out.join("grep_comparison_1.pdf"));
    }

    #[test]
    fn test_round_trip_preserves_order_and_values() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultStore::new(dir.path().join("results"));
        let run = sample_run("round trip");
        let persisted = store.persist(&run, &provenance()).unwrap();

        let loaded = ResultStore::load_run(&persisted.json_path).unwrap();
        assert_eq!(loaded, StoredRun::from_run(&run));
        let commands: Vec<&str> = loaded.commands.iter().map(|c| c.command.as_str()).collect();
        assert_eq!(commands, ["grep", "xs"]);
        let (label, walls) = &loaded.commands[0].series[0];
        assert_eq!(label, "wall [s]");
        assert_eq!(walls, &[1.0, 1.1]);
    }

    #[test]
    fn test_index_merges_across_runs() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("results");
        let store = ResultStore::new(&out);

        // A pre-existing entry from an earlier, independent invocation.
        fs::write(
            store.index_path(),
            r#"{"older_0.json": {"config_file": "old.json", "plot": "older_0.pdf"}}"#,
        )
        .unwrap();

        store.persist(&sample_run("fresh"), &provenance()).unwrap();
        let index: Map<String, Value> =
            serde_json::from_str(&fs::read_to_string(store.index_path()).unwrap()).unwrap();
        assert!(index.contains_key("older_0.json"));
        let entry = index.get("fresh_0.json").unwrap();
        assert_eq!(entry["plot"], "fresh_0.pdf");
        assert_eq!(entry["config_file"], "conf/grep.json");
        assert_eq!(entry["timer"], "gnu time");
        assert_eq!(entry["iterations"], 2);
        assert!(entry["recorded_at"].is_string());
    }

    #[test]
    fn test_index_is_a_sibling_of_the_output_dir() {
        let store = ResultStore::new("results");
        assert_eq!(store.index_path(), Path::new("results.results.meta.json"));
    }

    #[test]
    fn test_load_run_rejects_malformed_documents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, r#"{"name": "x"}"#).unwrap();
        let err = ResultStore::load_run(&path).unwrap_err();
        assert!(matches!(err, BenchError::ResultParse { .. }));
    }
}
