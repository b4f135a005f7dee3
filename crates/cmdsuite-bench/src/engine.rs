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

//! The benchmark run state machine.
//!
//! A run moves through SETUP → ITERATE → CLEANUP → AGGREGATE. Setup
//! failures abort before the first iteration; a timed-out, cancelled, or
//! unspawnable measurement aborts mid-run. Cleanup commands run on every
//! exit path — the iterate outcome is captured as a value and re-surfaced
//! only after cleanup finished, so a fatal run never leaks fixtures.
//!
//! Commands within one iteration are measured in declaration order, and
//! iterations are strictly sequential: overlapping external processes would
//! contend for the CPU and cache the benchmark is trying to observe.

use crate::error::{BenchError, Result};
use cmdsuite_core::{
    CancelToken, Command, CoreError, Invoker, ProcessInvoker, Reporter, SilentReporter,
    TimingSample, TimingStrategy,
};
use std::time::Duration;

/// Default iteration count when the caller does not configure one.
pub const DEFAULT_ITERATIONS: u32 = 3;

/// The ordered samples measured for one command over a full run.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkResult {
    /// The measured command.
    pub command: Command,
    /// One sample per iteration, in iteration order.
    pub samples: Vec<TimingSample>,
}

impl BenchmarkResult {
    /// Creates an empty result for `command`.
    pub fn new(command: Command) -> Self {
        Self {
            command,
            samples: Vec::new(),
        }
    }
}

/// All per-command results of one completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkRun {
    /// The benchmark's display name.
    pub name: String,
    /// Per-command results in declaration order.
    pub results: Vec<BenchmarkResult>,
}

/// Orchestrates N iterations over a set of commands with one timing strategy.
pub struct BenchmarkEngine {
    name: String,
    commands: Vec<Command>,
    strategy: Box<dyn TimingStrategy>,
    setup: Vec<Command>,
    cleanup: Vec<Command>,
    drop_cache: Option<Command>,
    iterations: u32,
    sleep: Duration,
    timeout: Option<Duration>,
    invoker: Box<dyn Invoker>,
    reporter: Box<dyn Reporter>,
    cancel: CancelToken,
}

impl BenchmarkEngine {
    /// Creates an engine with default settings: three iterations, no sleep,
    /// no deadline, real process invocation, silent reporting.
    pub fn new(
        name: impl Into<String>,
        commands: Vec<Command>,
        strategy: Box<dyn TimingStrategy>,
    ) -> Self {
        Self {
            name: name.into(),
            commands,
            strategy,
            setup: Vec::new(),
            cleanup: Vec::new(),
            drop_cache: None,
            iterations: DEFAULT_ITERATIONS,
            sleep: Duration::ZERO,
            timeout: None,
            invoker: Box::new(ProcessInvoker),
            reporter: Box::new(SilentReporter),
            cancel: CancelToken::new(),
        }
    }

    /// Commands run to completion, in order, before the first iteration.
    pub fn with_setup(mut self, setup: Vec<Command>) -> Self {
        self.setup = setup;
        self
    }

    /// Commands run to completion, in order, after the last iteration —
    /// on every exit path.
    pub fn with_cleanup(mut self, cleanup: Vec<Command>) -> Self {
        self.cleanup = cleanup;
        self
    }

    /// Command run before each iteration (e.g. dropping RAM caches); its
    /// output is discarded and its failure is fatal.
    pub fn with_drop_cache(mut self, drop_cache: Option<Command>) -> Self {
        self.drop_cache = drop_cache;
        self
    }

    /// Number of iterations; every measured command ends up with exactly
    /// this many samples.
    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    /// Pause before each measurement.
    pub fn with_sleep(mut self, sleep: Duration) -> Self {
        self.sleep = sleep;
        self
    }

    /// Per-command deadline applied to lifecycle commands; the strategy
    /// carries its own copy for measured commands.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Substitute the process-launching seam (used by tests).
    pub fn with_invoker(mut self, invoker: Box<dyn Invoker>) -> Self {
        self.invoker = invoker;
        self
    }

    /// Status-line sink for progress output.
    pub fn with_reporter(mut self, reporter: Box<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Token polled between invocations; triggering it aborts the run.
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// The benchmark's display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The measured commands, in declaration order.
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Executes the full SETUP → ITERATE → CLEANUP run.
    ///
    /// On success every [`BenchmarkResult`] holds exactly `iterations`
    /// samples. On a fatal failure no partial result escapes, but cleanup
    /// has still run.
    pub fn run(&self) -> Result<BenchmarkRun> {
        tracing::debug!(
            benchmark = %self.name,
            iterations = self.iterations,
            strategy = self.strategy.name(),
            "starting benchmark run"
        );
        self.preflight()?;
        let outcome = self.measure_all();
        self.reporter.status("⏳ cleaning up ...");
        // Cleanup ignores the cancel token: once triggered we are already
        // on the way out and fixtures still have to go.
        let cleanup_outcome = self.run_lifecycle(&self.cleanup, false);
        self.reporter.status("✅ cleanup done");
        let results = outcome?;
        cleanup_outcome.map_err(BenchError::Cleanup)?;
        Ok(BenchmarkRun {
            name: self.name.clone(),
            results,
        })
    }

    /// Resolves every binary before anything runs, so a missing tool is a
    /// setup-time error rather than a mid-run surprise.
    fn preflight(&self) -> Result<()> {
        self.strategy.preflight().map_err(BenchError::Setup)?;
        self.commands
            .iter()
            .chain(self.drop_cache.iter())
            .try_for_each(|command| command.resolve().map(|_| ()))
            .map_err(BenchError::Setup)
    }

    fn measure_all(&self) -> Result<Vec<BenchmarkResult>> {
        self.reporter.status("⏳ setting up ...");
        self.run_lifecycle(&self.setup, true)
            .map_err(BenchError::Setup)?;
        self.reporter.status("✅ setup done");

        let mut results: Vec<BenchmarkResult> = self
            .commands
            .iter()
            .map(|command| BenchmarkResult::new(command.clone()))
            .collect();
        for iteration in 1..=self.iterations {
            if let Some(drop_cache) = &self.drop_cache {
                self.cancel.checkpoint(drop_cache.name())?;
                self.invoke_checked(drop_cache)
                    .map_err(BenchError::DropCache)?;
            }
            for (slot, command) in results.iter_mut().zip(&self.commands) {
                self.cancel.checkpoint(command.name())?;
                if !self.sleep.is_zero() {
                    std::thread::sleep(self.sleep);
                }
                self.reporter.status(&format!(
                    "  [{iteration}/{}] measuring {command}",
                    self.iterations
                ));
                let sample = self.strategy.measure(command)?;
                slot.samples.push(sample);
            }
        }
        Ok(results)
    }

    fn run_lifecycle(
        &self,
        commands: &[Command],
        check_cancel: bool,
    ) -> std::result::Result<(), CoreError> {
        for command in commands {
            if check_cancel {
                self.cancel.checkpoint(command.name())?;
            }
            self.invoke_checked(command)?;
        }
        Ok(())
    }

    fn invoke_checked(&self, command: &Command) -> std::result::Result<(), CoreError> {
        let invocation = self.invoker.invoke(command, self.timeout)?;
        if invocation.success() {
            Ok(())
        } else {
            Err(CoreError::command_failed(command.name(), invocation.status))
        }
    }
}
