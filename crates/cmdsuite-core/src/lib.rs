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

//! Shared primitives for the cmdsuite engines.
//!
//! This crate holds everything the benchmark engine and the differential
//! test suite have in common:
//!
//! - [`Command`] — an invocable external program, plus the blocking
//!   invocation path with timeout enforcement and the [`Invoker`] seam
//! - [`TimingStrategy`] — pluggable measurement of a single invocation,
//!   with the GNU time and inline-instrumentation backends
//! - [`CancelToken`] — cooperative cancellation between invocations
//! - [`Reporter`] — the status-line dependency injected into every engine
//!
//! Execution is strictly sequential by design: no two external commands
//! ever run concurrently, because contention would corrupt the very
//! measurements being collected.

pub mod cancel;
pub mod command;
pub mod error;
pub mod report;
pub mod timing;

pub use cancel::CancelToken;
pub use command::{run_command, Command, Invocation, Invoker, ProcessInvoker};
pub use error::{CoreError, Result};
pub use report::{ConsoleReporter, Reporter, SilentReporter};
pub use timing::{
    GnuTimeStrategy, InlineBenchStrategy, TimingSample, TimingStrategy, CPU_LABEL, RSS_LABEL,
    WALL_LABEL,
};
