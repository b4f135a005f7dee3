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

//! The cmdsuite benchmark engine.
//!
//! Feeds a typed benchmark config into a SETUP → ITERATE → CLEANUP →
//! AGGREGATE run over external commands, reduces the raw samples to
//! summary statistics, and persists results under collision-free names
//! with a provenance index.
//!
//! ```no_run
//! use cmdsuite_bench::{aggregate_run, BenchmarkSpec, ConsoleRenderer, Renderer};
//! use std::path::Path;
//!
//! let spec = BenchmarkSpec::load(Path::new("bench/grep.json"))?;
//! let run = spec.to_engine(None, None).with_iterations(5).run()?;
//! ConsoleRenderer.render(&aggregate_run(&run));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod aggregate;
pub mod config;
pub mod engine;
pub mod error;
pub mod render;
pub mod store;

pub use aggregate::{aggregate, aggregate_run, AggregatedMetric, AggregatedRun, CommandSummary};
pub use config::{collect_config_files, BenchmarkSpec, Timer};
pub use engine::{BenchmarkEngine, BenchmarkResult, BenchmarkRun, DEFAULT_ITERATIONS};
pub use error::{BenchError, Result};
pub use render::{ConsoleRenderer, Renderer};
pub use store::{next_free_id, PersistedRun, ResultStore, RunProvenance, StoredRun};
