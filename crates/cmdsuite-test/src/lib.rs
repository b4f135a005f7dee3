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

//! Differential testing of external commands.
//!
//! A [`DifferentialTestSuite`] captures one trusted reference command's
//! output exactly once, then asserts that each candidate command produces
//! byte-identical output. Suites are defined in JSON ([`SuiteSpec`]) and
//! produce a [`TestReport`] of per-candidate verdicts.

pub mod config;
pub mod error;
pub mod report;
pub mod suite;

pub use config::SuiteSpec;
pub use error::{Result, SuiteError};
pub use report::{CommandVerdict, TestReport};
pub use suite::DifferentialTestSuite;
