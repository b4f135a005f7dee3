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

//! Timing fed by the measured command's own instrumentation.
//!
//! Tools with a built-in benchmark mode report their resource usage as a
//! JSON object on the last non-empty line of stderr, keyed by the canonical
//! metric labels, e.g.:
//!
//! ```text
//! {"cpu [s]": 0.41, "wall [s]": 0.44, "bytes read": 1048576.0}
//! ```
//!
//! `"cpu [s]"` is mandatory — the whole point of this backend is a CPU
//! figure the supervisor cannot see, such as time spent after warmup.
//! `"wall [s]"` is optional; when absent, the strategy's own monotonic clock
//! around the invocation is used. Every other key is carried through as an
//! extra metric. Stdout is never interpreted.

use crate::command::{run_command, Command};
use crate::error::{CoreError, Result};
use crate::timing::{TimingSample, TimingStrategy, CPU_LABEL, WALL_LABEL};
use std::collections::BTreeMap;
use std::time::Duration;

/// [`TimingStrategy`] reading self-reported instrumentation.
#[derive(Debug, Clone, Default)]
pub struct InlineBenchStrategy {
    timeout: Option<Duration>,
}

impl InlineBenchStrategy {
    /// Creates a strategy with no deadline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Kills the measured command once `timeout` has elapsed.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

impl TimingStrategy for InlineBenchStrategy {
    fn name(&self) -> &'static str {
        "inlinebench"
    }

    fn measure(&self, command: &Command) -> Result<TimingSample> {
        let invocation = run_command(command, self.timeout)?;
        if !invocation.success() {
            tracing::warn!(
                command = command.name(),
                status = ?invocation.status,
                "measured command exited non-zero"
            );
        }
        let instrumentation = |reason: String| CoreError::Instrumentation {
            command: command.name().to_string(),
            reason,
        };
        let text = String::from_utf8_lossy(&invocation.stderr);
        let line = text
            .lines()
            .rev()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .ok_or_else(|| instrumentation("stderr is empty".to_string()))?;
        let mut reported: BTreeMap<String, f64> = serde_json::from_str(line)
            .map_err(|e| instrumentation(format!("bad instrumentation line: {e}")))?;
        let cpu = reported
            .remove(CPU_LABEL)
            .ok_or_else(|| instrumentation(format!("missing '{CPU_LABEL}'")))?;
        let wall = reported
            .remove(WALL_LABEL)
            .unwrap_or_else(|| invocation.wall.as_secs_f64());
        let mut sample = TimingSample::new(wall, cpu);
        sample.extra = reported;
        Ok(sample)
    }
}
