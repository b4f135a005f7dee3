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

//! The `cmdbench` runner.
//!
//! Exit codes: `0` success, `1` a `--config` path does not exist or at
//! least one run failed, `2` a configuration error (no valid config in a
//! scanned directory, or a malformed config file).

use clap::Parser;
use cmdsuite_bench::{
    aggregate_run, collect_config_files, BenchmarkSpec, ConsoleRenderer, Renderer, ResultStore,
    RunProvenance,
};
use cmdsuite_core::Command;
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

/// Compare command line tools.
#[derive(Parser, Debug)]
#[command(name = "cmdbench", version, about = "Compare command line tools")]
pub struct BenchArgs {
    /// Path to a config file, or to a directory scanned recursively for
    /// *.json configs.
    #[arg(long, value_name = "PATH", required = true, num_args = 1..)]
    pub config: Vec<PathBuf>,

    /// Directory containing the benchmarked files. Can be omitted when
    /// config files carry absolute or valid relative paths.
    #[arg(long, value_name = "PATH")]
    pub cwd: Option<PathBuf>,

    /// List available benchmarks by name and exit.
    #[arg(long)]
    pub list_benchmarks: bool,

    /// Path to an executable that drops RAM caches, run before each
    /// iteration.
    #[arg(long, value_name = "PATH")]
    pub drop_cache: Option<PathBuf>,

    /// Number of iterations per benchmark.
    #[arg(short, long, value_name = "INTEGER", default_value_t = 3)]
    pub iterations: u32,

    /// Sleep this many seconds before each measurement.
    #[arg(short = 'p', long, value_name = "INTEGER", default_value_t = 0)]
    pub sleep: u64,

    /// Directory results are written to; empty renders them transiently
    /// instead.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Kill any command that runs longer than this many seconds.
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Do not output status lines.
    #[arg(long)]
    pub silent: bool,
}

/// Runs the benchmark CLI to completion.
pub fn run(args: BenchArgs) -> ExitCode {
    for conf in &args.config {
        if !conf.exists() {
            eprintln!("ERROR: {} does not exist.", conf.display());
            return ExitCode::from(1);
        }
    }

    let mut files = Vec::new();
    for conf in &args.config {
        if conf.is_dir() {
            let found = match collect_config_files(conf) {
                Ok(found) => found,
                Err(e) => {
                    eprintln!("ERROR: failed to scan {}: {e}", conf.display());
                    return ExitCode::from(2);
                }
            };
            if found.is_empty() {
                eprintln!("No valid config files found in {}.", conf.display());
                return ExitCode::from(2);
            }
            files.extend(found);
        } else {
            files.push(conf.clone());
        }
    }

    let mut specs = Vec::with_capacity(files.len());
    for file in &files {
        match BenchmarkSpec::load(file) {
            Ok(spec) => specs.push(spec),
            Err(e) => {
                eprintln!("ERROR: {e}");
                return ExitCode::from(2);
            }
        }
    }

    if args.list_benchmarks {
        println!("The following benchmarks are available:");
        for spec in &specs {
            println!(" - {}", spec.name);
        }
        return ExitCode::SUCCESS;
    }

    let timeout = args.timeout.map(Duration::from_secs);
    let persist_to = args
        .output
        .as_ref()
        .filter(|p| !p.as_os_str().is_empty())
        .map(ResultStore::new);

    let total = specs.len();
    let mut failed = 0usize;
    for spec in &specs {
        println!(" Running {}:", spec.name);
        let mut engine = spec
            .to_engine(args.cwd.as_deref(), timeout)
            .with_iterations(args.iterations)
            .with_sleep(Duration::from_secs(args.sleep))
            .with_reporter(crate::reporter(args.silent));
        if let Some(drop_cache) = &args.drop_cache {
            engine = engine.with_drop_cache(Some(Command::new(
                "drop cache",
                vec![drop_cache.display().to_string()],
            )));
        }

        let run = match engine.run() {
            Ok(run) => run,
            Err(e) => {
                eprintln!("ERROR: {} failed: {e}", spec.name);
                failed += 1;
                continue;
            }
        };
        let aggregated = aggregate_run(&run);
        match &persist_to {
            Some(store) => {
                let provenance = RunProvenance {
                    config_file: spec.source.clone(),
                    timer: spec.timer.label().to_string(),
                    iterations: args.iterations,
                };
                match store.persist(&run, &provenance) {
                    Ok(persisted) => {
                        println!("  results written to {}", persisted.json_path.display());
                    }
                    Err(e) => {
                        // Persistence errors are fatal: no partial-result
                        // recovery, earlier files stay as they are.
                        eprintln!("ERROR: {e}");
                        return ExitCode::from(1);
                    }
                }
            }
            None => ConsoleRenderer.render(&aggregated),
        }
    }

    if failed > 0 {
        eprintln!("{}", format!("{failed} of {total} benchmarks failed").red());
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}
