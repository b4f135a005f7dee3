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

//! Rendering seam for aggregated results.
//!
//! Plot generation is an external collaborator; the core only hands a
//! [`crate::aggregate::AggregatedRun`] across this interface. The built-in
//! console renderer covers transient runs where no output directory was
//! given.

use crate::aggregate::AggregatedRun;
use colored::Colorize;
use std::fmt::Write;

/// Consumes one aggregated run.
pub trait Renderer {
    /// Render the run for the user.
    fn render(&self, run: &AggregatedRun);
}

/// Prints mean ± standard error per metric, plus the derived ratios.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleRenderer;

impl ConsoleRenderer {
    /// Formats the run without printing, for reuse and testing.
    pub fn format(run: &AggregatedRun) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", run.name.bold());
        for summary in &run.commands {
            let _ = writeln!(out, "  {}", summary.command.cyan());
            for (label, metric) in &summary.metrics {
                match metric.stderr {
                    Some(stderr) => {
                        let _ = writeln!(out, "    {label}: {:.6} ± {:.6}", metric.mean, stderr);
                    }
                    None => {
                        let _ = writeln!(
                            out,
                            "    {label}: {:.6} (single sample, spread undefined)",
                            metric.mean
                        );
                    }
                }
            }
            let _ = writeln!(out, "    C/T: {:.4}", summary.cpu_wall_ratio);
            if let Some(ratio) = summary.dc_dt {
                let _ = writeln!(out, "    dC/dT: {:.4}", ratio);
            }
        }
        out
    }
}

impl Renderer for ConsoleRenderer {
    fn render(&self, run: &AggregatedRun) {
        print!("{}", Self::format(run));
    }
}
