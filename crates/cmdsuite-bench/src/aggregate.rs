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

//! Reduction of raw sample sequences to summary statistics.
//!
//! Per metric: arithmetic mean, Bessel-corrected sample standard deviation,
//! and the standard error of the mean. With a single sample the spread is
//! undefined and reported as `None`, never as a silent zero — consumers must
//! check `n` before trusting the uncertainty.

use crate::engine::BenchmarkRun;
use cmdsuite_core::timing::TimingSample;
use cmdsuite_core::{CPU_LABEL, WALL_LABEL};
use serde::Serialize;

/// Substituted for an exactly-zero denominator in [`dc_dt`].
///
/// The resulting large-magnitude ratio is a degenerate signal, not an error.
pub const DCDT_EPSILON: f64 = 1e-12;

/// Summary statistics of one metric over a sample sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedMetric {
    /// Number of samples the statistics were computed from.
    pub n: usize,
    /// Arithmetic mean.
    pub mean: f64,
    /// Sample standard deviation (n−1 denominator); `None` for n < 2.
    pub stdev: Option<f64>,
    /// Standard error of the mean; `None` for n < 2.
    pub stderr: Option<f64>,
}

/// Reduces one sample sequence; `None` when the sequence is empty.
pub fn aggregate(values: &[f64]) -> Option<AggregatedMetric> {
    if values.is_empty() {
        return None;
    }
    let n = values.len();
    let mean = values.iter().sum::<f64>() / n as f64;
    let (stdev, stderr) = if n >= 2 {
        let variance =
            values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        let stdev = variance.sqrt();
        (Some(stdev), Some(stdev / (n as f64).sqrt()))
    } else {
        (None, None)
    };
    Some(AggregatedMetric {
        n,
        mean,
        stdev,
        stderr,
    })
}

/// Aggregated statistics for one measured command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandSummary {
    /// The command's display name.
    pub command: String,
    /// Per-metric statistics in metric declaration order.
    pub metrics: Vec<(String, AggregatedMetric)>,
    /// Mean CPU time over mean wall time.
    pub cpu_wall_ratio: f64,
    /// Finite-difference ratio against the preceding command; `None` for
    /// the first command of a run.
    pub dc_dt: Option<f64>,
}

impl CommandSummary {
    /// Looks up one metric by label.
    pub fn metric(&self, label: &str) -> Option<&AggregatedMetric> {
        self.metrics
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, m)| m)
    }
}

/// A fully aggregated benchmark run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedRun {
    /// The benchmark's display name.
    pub name: String,
    /// Per-command summaries in declaration order.
    pub commands: Vec<CommandSummary>,
}

/// Metric labels across a sample sequence, in first-seen order.
pub(crate) fn metric_labels(samples: &[TimingSample]) -> Vec<String> {
    let mut labels: Vec<String> = Vec::new();
    for sample in samples {
        for (label, _) in sample.metrics() {
            if !labels.iter().any(|l| l == label) {
                labels.push(label.to_string());
            }
        }
    }
    labels
}

/// Series of one metric across a sample sequence, skipping samples that
/// lack the label.
pub(crate) fn metric_series(samples: &[TimingSample], label: &str) -> Vec<f64> {
    samples
        .iter()
        .filter_map(|sample| {
            sample
                .metrics()
                .iter()
                .find(|(l, _)| *l == label)
                .map(|(_, v)| *v)
        })
        .collect()
}

/// Reduces a whole run to per-command and cross-command statistics.
pub fn aggregate_run(run: &BenchmarkRun) -> AggregatedRun {
    let mut commands: Vec<CommandSummary> = run
        .results
        .iter()
        .map(|result| {
            let metrics: Vec<(String, AggregatedMetric)> = metric_labels(&result.samples)
                .into_iter()
                .filter_map(|label| {
                    aggregate(&metric_series(&result.samples, &label))
                        .map(|agg| (label, agg))
                })
                .collect();
            let mean_of = |label: &str| {
                metrics
                    .iter()
                    .find(|(l, _)| l == label)
                    .map(|(_, m)| m.mean)
                    .unwrap_or(f64::NAN)
            };
            CommandSummary {
                command: result.command.name().to_string(),
                cpu_wall_ratio: mean_of(CPU_LABEL) / mean_of(WALL_LABEL),
                dc_dt: None,
                metrics,
            }
        })
        .collect();

    let points: Vec<(f64, f64)> = commands
        .iter()
        .map(|summary| {
            let mean_of = |label: &str| {
                summary.metric(label).map(|m| m.mean).unwrap_or(f64::NAN)
            };
            (mean_of(CPU_LABEL), mean_of(WALL_LABEL))
        })
        .collect();
    for i in 1..commands.len() {
        commands[i].dc_dt = Some(dc_dt(points[i - 1], points[i]));
    }

    AggregatedRun {
        name: run.name.clone(),
        commands,
    }
}

/// Finite-difference ratio between two adjacent commands' `(cpu, wall)`
/// means: `(C_i − C_{i−1}) / (T_{i−1} − T_i)`.
///
/// An exactly-zero denominator becomes [`DCDT_EPSILON`] instead of dividing
/// by zero.
pub fn dc_dt(previous: (f64, f64), current: (f64, f64)) -> f64 {
    let numerator = current.0 - previous.0;
    let mut denominator = previous.1 - current.1;
    if denominator == 0.0 {
        denominator = DCDT_EPSILON;
    }
    numerator / denominator
}
