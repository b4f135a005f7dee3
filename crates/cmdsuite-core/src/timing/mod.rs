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

//! Pluggable measurement of one external-command invocation.
//!
//! A [`TimingStrategy`] measures exactly one synchronous invocation and
//! returns a uniform [`TimingSample`]. The two concrete strategies differ
//! only in how the numbers are obtained — wrapping the invocation with an
//! external time supervisor ([`GnuTimeStrategy`]) or reading instrumentation
//! the command emits about itself ([`InlineBenchStrategy`]) — never in what
//! callers see.
//!
//! A measured command exiting non-zero is not an error: the sample is built
//! from whatever metrics were obtainable and the failure is logged.
//! Correctness of the tools under test is the differential suite's job, not
//! the timer's.

mod gnu_time;
mod inline;

pub use gnu_time::GnuTimeStrategy;
pub use inline::InlineBenchStrategy;

use crate::command::Command;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Canonical label for the wall-clock metric, as persisted on disk.
pub const WALL_LABEL: &str = "wall [s]";

/// Canonical label for the CPU-time metric, as persisted on disk.
pub const CPU_LABEL: &str = "cpu [s]";

/// Label for the maximum-resident-set extra metric.
pub const RSS_LABEL: &str = "rss [KiB]";

/// Resource usage of a single command invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingSample {
    /// Elapsed wall-clock time in seconds.
    pub wall_seconds: f64,
    /// Consumed CPU time (user + system) in seconds.
    pub cpu_seconds: f64,
    /// Additional strategy-specific metrics, keyed by label.
    #[serde(default)]
    pub extra: BTreeMap<String, f64>,
}

impl TimingSample {
    /// Creates a sample from the two mandatory metrics.
    pub fn new(wall_seconds: f64, cpu_seconds: f64) -> Self {
        Self {
            wall_seconds,
            cpu_seconds,
            extra: BTreeMap::new(),
        }
    }

    /// Attaches an extra metric.
    pub fn with_extra(mut self, label: impl Into<String>, value: f64) -> Self {
        self.extra.insert(label.into(), value);
        self
    }

    /// All metrics in stable order: wall, cpu, then extras.
    pub fn metrics(&self) -> Vec<(&str, f64)> {
        let mut out = vec![
            (WALL_LABEL, self.wall_seconds),
            (CPU_LABEL, self.cpu_seconds),
        ];
        out.extend(self.extra.iter().map(|(label, value)| (label.as_str(), *value)));
        out
    }
}

/// Measures one invocation of a [`Command`].
pub trait TimingStrategy {
    /// Short identifier used in status lines and provenance records.
    fn name(&self) -> &'static str;

    /// Verifies the strategy can run at all, before a measurement loop starts.
    fn preflight(&self) -> Result<()> {
        Ok(())
    }

    /// Invokes `command` exactly once, to completion, and reports its
    /// resource usage.
    fn measure(&self, command: &Command) -> Result<TimingSample>;
}
