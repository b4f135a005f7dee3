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

//! The differential suite state machine.
//!
//! SETUP → REFERENCE_CAPTURE → RUN_CANDIDATES → CLEANUP → REPORTED.
//!
//! The reference command runs exactly once; its stdout is retained for the
//! suite's lifetime and every candidate is compared to it byte-for-byte.
//! A mismatch is a failed verdict, not an error. With fail-fast enabled the
//! remaining candidates are skipped, but cleanup still runs before the
//! result surfaces — the outcome is captured as a value and re-raised only
//! after the cleanup commands finished. The `legacy_fail_fast` switch
//! restores the old harness's behavior of aborting straight out of the
//! candidate loop, cleanup included, for consumers that depend on it.
//!
//! The exit status of the reference and the candidates is deliberately
//! ignored: tools like grep exit non-zero on zero matches, and an empty
//! match list is still comparable output.

use crate::error::{Result, SuiteError};
use crate::report::{CommandVerdict, TestReport};
use cmdsuite_core::{
    CancelToken, Command, CoreError, Invoker, ProcessInvoker, Reporter, SilentReporter,
};
use std::time::Duration;

/// Compares candidate commands against one captured reference output.
pub struct DifferentialTestSuite {
    name: String,
    reference: Command,
    candidates: Vec<Command>,
    setup: Vec<Command>,
    cleanup: Vec<Command>,
    fail_fast: bool,
    legacy_fail_fast: bool,
    timeout: Option<Duration>,
    invoker: Box<dyn Invoker>,
    reporter: Box<dyn Reporter>,
    cancel: CancelToken,
}

impl DifferentialTestSuite {
    /// Creates a suite with default settings: no setup/cleanup, no
    /// fail-fast, no deadline, real process invocation, silent reporting.
    pub fn new(name: impl Into<String>, reference: Command, candidates: Vec<Command>) -> Self {
        Self {
            name: name.into(),
            reference,
            candidates,
            setup: Vec::new(),
            cleanup: Vec::new(),
            fail_fast: false,
            legacy_fail_fast: false,
            timeout: None,
            invoker: Box::new(ProcessInvoker),
            reporter: Box::new(SilentReporter),
            cancel: CancelToken::new(),
        }
    }

    /// Commands run in order before the reference is captured. Binaries a
    /// setup step builds are fine: nothing is resolved ahead of time here.
    pub fn with_setup(mut self, setup: Vec<Command>) -> Self {
        self.setup = setup;
        self
    }

    /// Commands run in order after the candidates, on every exit path.
    pub fn with_cleanup(mut self, cleanup: Vec<Command>) -> Self {
        self.cleanup = cleanup;
        self
    }

    /// Stop evaluating candidates after the first failure.
    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Compatibility switch: make a fail-fast failure abort the suite
    /// without running cleanup, as the old harness did. Implies nothing
    /// unless fail-fast is also enabled.
    pub fn with_legacy_fail_fast(mut self, legacy: bool) -> Self {
        self.legacy_fail_fast = legacy;
        self
    }

    /// Per-command deadline.
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

    /// Token polled between invocations; triggering it aborts the suite.
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// The suite's display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Runs the full suite and produces its report.
    pub fn run(&self) -> Result<TestReport> {
        let outcome = self.capture_and_compare();
        if self.legacy_fail_fast && matches!(outcome, Err(SuiteError::TestFailed { .. })) {
            // Legacy escape: the old harness raised straight out of the
            // candidate loop and never reached cleanup.
            return outcome;
        }
        self.reporter.status("⏳ cleaning up ...");
        let cleanup_outcome = self.run_cleanup();
        self.reporter.status("✅ cleanup done");
        let report = outcome?;
        cleanup_outcome.map_err(SuiteError::Cleanup)?;
        Ok(report)
    }

    fn capture_and_compare(&self) -> Result<TestReport> {
        self.reporter.status("⏳ setting up ...");
        for command in &self.setup {
            self.cancel.checkpoint(command.name())?;
            let invocation = self.invoker.invoke(command, self.timeout)?;
            if !invocation.success() {
                return Err(SuiteError::Setup(CoreError::command_failed(
                    command.name(),
                    invocation.status,
                )));
            }
        }
        self.reporter.status("✅ setup done");

        // The reference runs exactly once; its bytes are immutable for the
        // rest of the suite.
        self.cancel.checkpoint(self.reference.name())?;
        self.reporter
            .status(&format!("  capturing reference {}", self.reference));
        let reference_invocation = self.invoker.invoke(&self.reference, self.timeout)?;
        if !reference_invocation.success() {
            tracing::debug!(
                reference = self.reference.name(),
                status = ?reference_invocation.status,
                "reference exited non-zero; comparing its output anyway"
            );
        }
        let reference_output = reference_invocation.stdout;

        let mut verdicts = Vec::new();
        for candidate in &self.candidates {
            self.cancel.checkpoint(candidate.name())?;
            let invocation = self.invoker.invoke(candidate, self.timeout)?;
            let passed = invocation.stdout == reference_output;
            self.reporter.status(&format!(
                "  {} {}",
                if passed { "✅" } else { "❌" },
                candidate.name()
            ));
            verdicts.push(CommandVerdict {
                command: candidate.name().to_string(),
                passed,
            });
            if !passed && self.fail_fast {
                if self.legacy_fail_fast {
                    return Err(SuiteError::TestFailed {
                        suite: self.name.clone(),
                    });
                }
                break;
            }
        }
        Ok(TestReport::new(&self.name, verdicts))
    }

    /// Cleanup ignores the cancel token: once aborting, fixtures still
    /// have to go.
    fn run_cleanup(&self) -> std::result::Result<(), CoreError> {
        for command in &self.cleanup {
            let invocation = self.invoker.invoke(command, self.timeout)?;
            if !invocation.success() {
                return Err(CoreError::command_failed(command.name(), invocation.status));
            }
        }
        Ok(())
    }
}
