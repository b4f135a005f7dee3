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

//! Structured error types for command invocation and measurement.
//!
//! Every failure mode that originates at the process boundary lives here;
//! the engine crates wrap these in their own `thiserror` enums where more
//! context is available.

use std::time::Duration;
use thiserror::Error;

/// Result type for core command and timing operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised while resolving, invoking, or measuring external commands.
#[derive(Error, Debug, Clone)]
pub enum CoreError {
    /// The binary named by `argv[0]` could not be resolved.
    ///
    /// Raised at setup time, before any measurement loop begins, so that a
    /// misconfigured command never fails halfway through a run.
    #[error("binary '{binary}' for command '{command}' was not found on PATH")]
    BinaryNotFound {
        /// User-chosen command label.
        command: String,
        /// The unresolvable binary name.
        binary: String,
    },

    /// The operating system refused to spawn the process.
    #[error("failed to spawn '{command}': {message}")]
    Spawn {
        /// User-chosen command label.
        command: String,
        /// The underlying OS error message.
        message: String,
    },

    /// The command exceeded its configured deadline and was killed.
    #[error("command '{command}' did not finish within {}s and was killed", .limit.as_secs_f64())]
    Timeout {
        /// User-chosen command label.
        command: String,
        /// The configured deadline.
        limit: Duration,
    },

    /// The run was cancelled between command invocations.
    #[error("run cancelled before '{command}' was invoked")]
    Cancelled {
        /// The command that would have run next.
        command: String,
    },

    /// A lifecycle command (setup, cleanup, cache drop) exited non-zero.
    #[error("command '{command}' exited with {status}")]
    CommandFailed {
        /// User-chosen command label.
        command: String,
        /// Exit status rendering ("code 1", "signal").
        status: String,
    },

    /// A self-instrumented command produced no usable instrumentation.
    #[error("command '{command}' emitted no usable instrumentation: {reason}")]
    Instrumentation {
        /// User-chosen command label.
        command: String,
        /// What was wrong with the reported data.
        reason: String,
    },

    /// The external time supervisor's report line could not be parsed.
    #[error("could not parse the time supervisor report for '{command}'")]
    TimeParse {
        /// User-chosen command label.
        command: String,
    },
}

impl CoreError {
    /// Create a spawn error with the command label attached.
    pub fn spawn(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::Spawn {
            command: command.into(),
            message: source.to_string(),
        }
    }

    /// Create a failure error from an exit status.
    pub fn command_failed(command: impl Into<String>, status: Option<i32>) -> Self {
        Self::CommandFailed {
            command: command.into(),
            status: match status {
                Some(code) => format!("code {code}"),
                None => "a signal".to_string(),
            },
        }
    }
}
