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

//! The external command abstraction and its blocking invocation path.
//!
//! A [`Command`] is a named argv vector with an optional working directory,
//! immutable once constructed. Invocation always runs the process to
//! completion, capturing stdout and stderr through dedicated reader threads
//! so neither pipe can fill up and deadlock the child. An optional deadline
//! is enforced by polling `try_wait` and killing the process once exceeded.
//!
//! Engines launch commands through the [`Invoker`] seam rather than calling
//! [`run_command`] directly, which lets tests substitute a counting double.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::thread;
use std::time::{Duration, Instant};

/// How often the invocation loop checks a running child for completion.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// An invocable external program: a display name, an argument vector, and an
/// optional working directory.
///
/// `argv[0]` is the binary; the remaining elements are passed through
/// verbatim. The value is immutable after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    name: String,
    argv: Vec<String>,
    cwd: Option<PathBuf>,
}

impl Command {
    /// Creates a command with a user-chosen display name.
    pub fn new(name: impl Into<String>, argv: Vec<String>) -> Self {
        Self {
            name: name.into(),
            argv,
            cwd: None,
        }
    }

    /// Creates a command named after its own binary.
    ///
    /// Setup and cleanup commands in config files are unnamed; they borrow
    /// `argv[0]` as their label.
    pub fn from_argv(argv: Vec<String>) -> Self {
        let name = argv.first().cloned().unwrap_or_default();
        Self::new(name, argv)
    }

    /// Sets the working directory the command runs in.
    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// The user-chosen display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The full argument vector, binary first.
    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    /// The binary name (`argv[0]`), or `""` for an empty argv.
    pub fn binary(&self) -> &str {
        self.argv.first().map(String::as_str).unwrap_or("")
    }

    /// The configured working directory, if any.
    pub fn cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    /// Resolves the binary to an existing path.
    ///
    /// Names containing a path separator are checked as-is (relative to the
    /// working directory when one is set); bare names are searched on PATH.
    /// Meant to run at setup time so a missing tool surfaces before any
    /// measurement loop begins.
    pub fn resolve(&self) -> Result<PathBuf> {
        let not_found = || CoreError::BinaryNotFound {
            command: self.name.clone(),
            binary: self.binary().to_string(),
        };
        let binary = self.binary();
        if binary.is_empty() {
            return Err(not_found());
        }
        let as_path = Path::new(binary);
        if as_path.components().count() > 1 || as_path.is_absolute() {
            let candidate = match (&self.cwd, as_path.is_absolute()) {
                (Some(cwd), false) => cwd.join(as_path),
                _ => as_path.to_path_buf(),
            };
            return if candidate.is_file() {
                Ok(candidate)
            } else {
                Err(not_found())
            };
        }
        find_in_path(binary).ok_or_else(not_found)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.argv.join(" "))
    }
}

/// Searches every PATH entry for an existing file named `binary`.
fn find_in_path(binary: &str) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path)
        .map(|dir| dir.join(binary))
        .find(|candidate| candidate.is_file())
}

/// The captured outcome of one completed invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Exit code, or `None` when the process died to a signal.
    pub status: Option<i32>,
    /// Everything the process wrote to stdout.
    pub stdout: Vec<u8>,
    /// Everything the process wrote to stderr.
    pub stderr: Vec<u8>,
    /// Wall-clock time from spawn to exit.
    pub wall: Duration,
}

impl Invocation {
    /// Whether the process exited with status zero.
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Runs `command` to completion, capturing both output streams.
///
/// Blocks until the process exits. When `timeout` is set and the deadline
/// passes, the process is killed, reaped, and a [`CoreError::Timeout`] is
/// returned. Stdin is closed; the child cannot block on input.
pub fn run_command(command: &Command, timeout: Option<Duration>) -> Result<Invocation> {
    let mut builder = std::process::Command::new(command.binary());
    builder
        .args(&command.argv()[1..])
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(dir) = command.cwd() {
        builder.current_dir(dir);
    }
    let mut child = builder
        .spawn()
        .map_err(|e| CoreError::spawn(command.name(), e))?;
    let started = Instant::now();

    // Drain both pipes off-thread so a chatty child cannot deadlock on a
    // full pipe buffer while we wait for it.
    let stdout_handle = {
        let mut stream = child.stdout.take().expect("stdout was piped");
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = stream.read_to_end(&mut buf);
            buf
        })
    };
    let stderr_handle = {
        let mut stream = child.stderr.take().expect("stderr was piped");
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = stream.read_to_end(&mut buf);
            buf
        })
    };

    let status = match timeout {
        // No deadline: block until the child exits.
        None => child
            .wait()
            .map_err(|e| CoreError::spawn(command.name(), e))?,
        Some(limit) => loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {}
                Err(e) => return Err(CoreError::spawn(command.name(), e)),
            }
            if started.elapsed() > limit {
                tracing::debug!(command = command.name(), ?limit, "deadline exceeded, killing");
                let _ = child.kill();
                let _ = child.wait();
                // Reader threads end once the pipes close.
                let _ = stdout_handle.join();
                let _ = stderr_handle.join();
                return Err(CoreError::Timeout {
                    command: command.name().to_string(),
                    limit,
                });
            }
            thread::sleep(POLL_INTERVAL);
        },
    };
    let wall = started.elapsed();

    let stdout = stdout_handle.join().unwrap_or_default();
    let stderr = stderr_handle.join().unwrap_or_default();
    Ok(Invocation {
        status: status.code(),
        stdout,
        stderr,
        wall,
    })
}

/// The seam through which engines launch external processes.
///
/// The default implementation spawns real processes; tests substitute
/// doubles to count invocations or fake outputs.
pub trait Invoker {
    /// Run the command to completion and capture its output.
    fn invoke(&self, command: &Command, timeout: Option<Duration>) -> Result<Invocation>;
}

/// [`Invoker`] that spawns real operating-system processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessInvoker;

impl Invoker for ProcessInvoker {
    fn invoke(&self, command: &Command, timeout: Option<Duration>) -> Result<Invocation> {
        run_command(command, timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh(name: &str, script: &str) -> Command {
        Command::new(
            name,
            vec!["sh".to_string(), "-c".to_string(), script.to_string()],
        )
    }

    #[test]
    fn test_display() {
        let cmd = Command::new("grep", vec!["grep".into(), "foo".into(), "file.txt".into()]);
        assert_eq!(cmd.to_string(), "grep: grep foo file.txt");
    }

    #[test]
    fn test_from_argv_names_after_binary() {
        let cmd = Command::from_argv(vec!["make".into(), "clean".into()]);
        assert_eq!(cmd.name(), "make");
        assert_eq!(cmd.binary(), "make");
    }

    #[test]
    fn test_resolve_path_binary() {
        let cmd = Command::new("sh", vec!["sh".into()]);
        assert!(cmd.resolve().is_ok());
    }

    #[test]
    fn test_resolve_missing_binary() {
        let cmd = Command::new("ghost", vec!["definitely-not-a-binary-7f3a".into()]);
        let err = cmd.resolve().unwrap_err();
        assert!(matches!(err, CoreError::BinaryNotFound { .. }));
    }

    #[test]
    fn test_resolve_empty_argv() {
        let cmd = Command::new("empty", Vec::new());
        assert!(cmd.resolve().is_err());
    }

    #[test]
    fn test_run_captures_stdout_and_stderr() {
        let inv = run_command(&sh("echo", "echo out; echo err >&2"), None).unwrap();
        assert!(inv.success());
        assert_eq!(inv.stdout, b"out\n");
        assert_eq!(inv.stderr, b"err\n");
    }

    #[test]
    fn test_run_reports_exit_code() {
        let inv = run_command(&sh("fail", "exit 3"), None).unwrap();
        assert!(!inv.success());
        assert_eq!(inv.status, Some(3));
    }

    #[test]
    fn test_run_respects_cwd() {
        let dir = tempfile::tempdir().unwrap();
        let cmd = sh("pwd", "pwd").with_cwd(dir.path());
        let inv = run_command(&cmd, None).unwrap();
        let printed = String::from_utf8(inv.stdout).unwrap();
        assert_eq!(
            Path::new(printed.trim()).canonicalize().unwrap(),
            dir.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn test_run_kills_on_timeout() {
        let started = Instant::now();
        let err = run_command(&sh("hang", "sleep 30"), Some(Duration::from_millis(100)))
            .unwrap_err();
        assert!(matches!(err, CoreError::Timeout { .. }));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn test_process_invoker_delegates() {
        let inv = ProcessInvoker.invoke(&sh("echo", "echo hi"), None).unwrap();
        assert_eq!(inv.stdout, b"hi\n");
    }
}
