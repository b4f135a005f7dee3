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

//! The `cmdtest` runner.
//!
//! Exit codes: `0` when every filtered suite passed, `1` otherwise
//! (failed suites, config errors, bad filter).

use clap::Parser;
use cmdsuite_test::SuiteSpec;
use colored::Colorize;
use regex::Regex;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

/// Compare command output against a trusted reference.
#[derive(Parser, Debug)]
#[command(
    name = "cmdtest",
    version,
    about = "Compare command output against a trusted reference"
)]
pub struct TestArgs {
    /// Suite config file.
    #[arg(value_name = "CONFIG", default_value = "testsuite.json")]
    pub config: PathBuf,

    /// Filter suites by name using a regex (empty matches everything).
    #[arg(long, value_name = "FILTER", default_value = "")]
    pub filter: String,

    /// Stop testing if a single suite fails.
    #[arg(long)]
    pub exit_on_failure: bool,

    /// Do not output status lines.
    #[arg(long)]
    pub silent: bool,

    /// Kill any command that runs longer than this many seconds.
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// List available suites by name and exit.
    #[arg(long)]
    pub list_benchmarks: bool,
}

/// Runs the differential test CLI to completion.
pub fn run(args: TestArgs) -> ExitCode {
    let filter = match Regex::new(&args.filter) {
        Ok(filter) => filter,
        Err(e) => {
            eprintln!("ERROR: invalid filter '{}': {e}", args.filter);
            return ExitCode::from(1);
        }
    };
    let specs = match SuiteSpec::load_all(&args.config) {
        Ok(specs) => specs,
        Err(e) => {
            eprintln!("ERROR: {e}");
            return ExitCode::from(1);
        }
    };

    if args.list_benchmarks {
        println!("The following suites are available:");
        for spec in &specs {
            println!(" - {}", spec.name);
        }
        return ExitCode::SUCCESS;
    }

    let timeout = args.timeout.map(Duration::from_secs);
    let selected: Vec<_> = specs
        .iter()
        .filter(|spec| filter.is_match(&spec.name))
        .collect();

    let total = selected.len();
    let mut failed = 0usize;
    for spec in selected {
        let suite = spec
            .to_suite(args.exit_on_failure, timeout)
            .with_reporter(crate::reporter(args.silent));
        match suite.run() {
            Ok(report) => {
                println!("{report}");
                if !report.passed() {
                    for verdict in report.failed() {
                        println!("   - {verdict}");
                    }
                    failed += 1;
                    if args.exit_on_failure {
                        break;
                    }
                }
            }
            Err(e) => {
                eprintln!("ERROR: {} failed: {e}", spec.name);
                failed += 1;
                if args.exit_on_failure {
                    break;
                }
            }
        }
    }

    if failed > 0 {
        eprintln!("{}", format!("{failed} of {total} suites failed").red());
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}
