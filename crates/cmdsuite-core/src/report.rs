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

//! Status-line reporting seam.
//!
//! Engines receive a [`Reporter`] at construction time. Silencing a run
//! means passing [`SilentReporter`]; there is no process-wide flag.

/// Sink for human-readable progress lines.
pub trait Reporter {
    /// Emit one status line.
    fn status(&self, line: &str);
}

/// Prints status lines to stderr, keeping stdout free for results.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn status(&self, line: &str) {
        eprintln!("{line}");
    }
}

/// Discards all status lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentReporter;

impl Reporter for SilentReporter {
    fn status(&self, _line: &str) {}
}
