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

//! Error types for benchmark configuration, execution, and persistence.
//!
//! The variants mirror the failure taxonomy: configuration errors surface
//! before any command executes, setup and cache-drop failures are fatal for
//! a run, a timed-out or cancelled measurement aborts the run, and
//! persistence errors leave previously written files untouched.

use cmdsuite_core::CoreError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for benchmark operations.
pub type Result<T> = std::result::Result<T, BenchError>;

/// Errors raised by the benchmark engine and its collaborators.
#[derive(Error, Debug)]
pub enum BenchError {
    /// A config file could not be read.
    #[error("failed to read config '{path}': {message}")]
    ConfigIo {
        /// The config file path.
        path: PathBuf,
        /// The underlying I/O error message.
        message: String,
    },

    /// A config file is not a valid benchmark document.
    #[error("invalid config '{path}': {message}")]
    ConfigParse {
        /// The config file path.
        path: PathBuf,
        /// What the parser rejected.
        message: String,
    },

    /// The config names a timing backend that does not exist.
    #[error("unknown timer '{timer}'. Choose from ['GNU time', 'InlineBench']")]
    UnknownTimer {
        /// The rejected timer value.
        timer: String,
    },

    /// A setup command failed, or a binary did not resolve at setup time.
    #[error("setup failed: {0}")]
    Setup(#[source] CoreError),

    /// The configured cache-drop command failed.
    #[error("cache drop failed: {0}")]
    DropCache(#[source] CoreError),

    /// A measurement aborted the run (timeout, cancellation, spawn failure).
    #[error(transparent)]
    Measure(#[from] CoreError),

    /// A cleanup command failed after an otherwise successful run.
    #[error("cleanup failed: {0}")]
    Cleanup(#[source] CoreError),

    /// A result or index file could not be written.
    #[error("failed to persist '{path}': {message}")]
    Persist {
        /// The file being written.
        path: PathBuf,
        /// The underlying error message.
        message: String,
    },

    /// A persisted result file could not be read back.
    #[error("invalid result file '{path}': {message}")]
    ResultParse {
        /// The result file path.
        path: PathBuf,
        /// What the parser rejected.
        message: String,
    },
}

impl BenchError {
    /// Create a persistence error with path context.
    pub fn persist(path: impl Into<PathBuf>, source: impl ToString) -> Self {
        Self::Persist {
            path: path.into(),
            message: source.to_string(),
        }
    }
}
