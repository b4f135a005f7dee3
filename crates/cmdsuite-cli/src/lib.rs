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

//! Command-line front ends for cmdsuite.
//!
//! Two binaries share this crate: `cmdbench` runs benchmark configs and
//! `cmdtest` runs differential suites. Both are thin shells over the
//! library crates — argument parsing, exit-code policy, and summary lines
//! live here, nothing else.

pub mod bench;
pub mod difftest;

use cmdsuite_core::{ConsoleReporter, Reporter, SilentReporter};
use tracing_subscriber::EnvFilter;

/// Initializes diagnostic logging from `RUST_LOG`, writing to stderr.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

/// The status-line sink selected by `--silent`.
pub(crate) fn reporter(silent: bool) -> Box<dyn Reporter> {
    if silent {
        Box::new(SilentReporter)
    } else {
        Box::new(ConsoleReporter)
    }
}
