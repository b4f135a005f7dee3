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

//! Error types for differential test suites.
//!
//! A comparison mismatch is *not* an error — it is a failed verdict inside
//! a [`crate::TestReport`]. Errors here are the conditions that keep a
//! suite from producing verdicts at all, plus the legacy fail-fast escape.

use cmdsuite_core::CoreError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for suite operations.
pub type Result<T> = std::result::Result<T, SuiteError>;

/// Errors raised while loading or running a differential suite.
#[derive(Error, Debug)]
pub enum SuiteError {
    /// A suite config file could not be read.
    #[error("failed to read suite config '{path}': {message}")]
    ConfigIo {
        /// The config file path.
        path: PathBuf,
        /// The underlying I/O error message.
        message: String,
    },

    /// A suite config file is not a valid suite document.
    #[error("invalid suite config '{path}': {message}")]
    ConfigParse {
        /// The config file path.
        path: PathBuf,
        /// What the parser rejected.
        message: String,
    },

    /// A setup command failed; the suite aborts before the reference runs.
    #[error("setup failed: {0}")]
    Setup(#[source] CoreError),

    /// Invoking the reference or a candidate failed outright
    /// (spawn failure, timeout, cancellation).
    #[error(transparent)]
    Command(#[from] CoreError),

    /// A cleanup command failed after an otherwise successful suite.
    #[error("cleanup failed: {0}")]
    Cleanup(#[source] CoreError),

    /// Legacy fail-fast escape: the first mismatch aborts the suite
    /// without producing a report. Only reachable through
    /// `with_legacy_fail_fast(true)`.
    #[error("Test '{suite}' failed.")]
    TestFailed {
        /// The suite that failed.
        suite: String,
    },
}
