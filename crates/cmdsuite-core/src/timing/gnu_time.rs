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

//! Timing backed by the GNU `time` supervisor.
//!
//! The measured argv is wrapped with `time -f <format> --`, and the
//! supervisor's report is recovered from the tail of stderr. The report line
//! carries a distinctive tag so it cannot be confused with the measured
//! command's own stderr output.

use crate::command::{run_command, Command};
use crate::error::{CoreError, Result};
use crate::timing::{TimingSample, TimingStrategy, RSS_LABEL};
use std::path::PathBuf;
use std::time::Duration;

/// Where GNU time lives on virtually every Linux install.
pub const DEFAULT_TIME_BINARY: &str = "/usr/bin/time";

const REPORT_TAG: &str = "cmdsuite-time:";
const REPORT_FORMAT: &str = "cmdsuite-time: wall=%e user=%U sys=%S rss=%M";

/// [`TimingStrategy`] that delegates measurement to GNU `time`.
#[derive(Debug, Clone)]
pub struct GnuTimeStrategy {
    time_binary: PathBuf,
    timeout: Option<Duration>,
}

impl GnuTimeStrategy {
    /// Creates a strategy using [`DEFAULT_TIME_BINARY`].
    pub fn new() -> Self {
        Self {
            time_binary: PathBuf::from(DEFAULT_TIME_BINARY),
            timeout: None,
        }
    }

    /// Uses a different `time` executable (e.g. gtime on macOS).
    pub fn with_time_binary(mut self, path: impl Into<PathBuf>) -> Self {
        self.time_binary = path.into();
        self
    }

    /// Kills the supervised command once `timeout` has elapsed.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn wrap(&self, command: &Command) -> Command {
        let mut argv = vec![
            self.time_binary.display().to_string(),
            "-f".to_string(),
            REPORT_FORMAT.to_string(),
            "--".to_string(),
        ];
        argv.extend(command.argv().iter().cloned());
        let mut wrapped = Command::new(command.name(), argv);
        if let Some(dir) = command.cwd() {
            wrapped = wrapped.with_cwd(dir);
        }
        wrapped
    }
}

impl Default for GnuTimeStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl TimingStrategy for GnuTimeStrategy {
    fn name(&self) -> &'static str {
        "gnu time"
    }

    fn preflight(&self) -> Result<()> {
        if self.time_binary.is_file() {
            Ok(())
        } else {
            Err(CoreError::BinaryNotFound {
                command: self.name().to_string(),
                binary: self.time_binary.display().to_string(),
            })
        }
    }

    fn measure(&self, command: &Command) -> Result<TimingSample> {
        let invocation = run_command(&self.wrap(command), self.timeout)?;
        if !invocation.success() {
            tracing::warn!(
                command = command.name(),
                status = ?invocation.status,
                "measured command exited non-zero"
            );
        }
        let report =
            parse_report(&invocation.stderr).ok_or_else(|| CoreError::TimeParse {
                command: command.name().to_string(),
            })?;
        Ok(TimingSample::new(report.wall, report.user + report.sys)
            .with_extra(RSS_LABEL, report.rss))
    }
}

struct TimeReport {
    wall: f64,
    user: f64,
    sys: f64,
    rss: f64,
}

/// Extracts the tagged report from the supervisor's stderr.
///
/// Scans from the end: the report is the last thing GNU time prints, after
/// anything the measured command wrote to the same stream.
fn parse_report(stderr: &[u8]) -> Option<TimeReport> {
    let text = String::from_utf8_lossy(stderr);
    let line = text
        .lines()
        .rev()
        .find_map(|line| line.trim().strip_prefix(REPORT_TAG))?;
    let mut wall = None;
    let mut user = None;
    let mut sys = None;
    let mut rss = None;
    for token in line.split_whitespace() {
        let (key, value) = token.split_once('=')?;
        let value: f64 = value.parse().ok()?;
        match key {
            "wall" => wall = Some(value),
            "user" => user = Some(value),
            "sys" => sys = Some(value),
            "rss" => rss = Some(value),
            _ => {}
        }
    }
    Some(TimeReport {
        wall: wall?,
        user: user?,
        sys: sys?,
        rss: rss.unwrap_or(0.0),
    })
}
