//! Single test case: fixture loading and the execution protocol.
//!
//! A [`CaseRunner`] is built eagerly from the `args-<n>.txt`, `input-<n>.txt` and `expected-<n>.txt` files
//! of one case-set directory and is immutable afterwards. [`CaseRunner::execute`] runs the target on a
//! dedicated worker thread:
//!
//! 1. the worker opens a [`RedirectScope`] holding the case's input bytes and a fresh capture buffer;
//! 2. the entry point is invoked with a copy of the arguments and the redirected streams;
//! 3. the caller waits at most `timeout` for the worker's result;
//! 4. captured output is optionally persisted as `actual-<n>.txt`;
//! 5. the significant lines of the output are compared with the expected lines.
//!
//! A worker that exceeds the timeout is abandoned, not cancelled. It owns its scope, so whatever it
//! writes afterwards lands in a buffer nobody reads.

use std::any::Any;
use std::fmt;
use std::fs;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;

use blackbox_core::{CaseFile, significant_lines};

use super::config::HarnessConfig;
use super::entry::EntryPoint;
use super::error::{CaseFailure, HarnessError};
use super::outcome::Outcome;
use super::redirect::RedirectScope;

/// A validated, non-negative case number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CaseNumber(u32);

impl CaseNumber {
    pub fn get(self) -> u32 {
        self.0
    }
}

impl From<u32> for CaseNumber {
    fn from(number: u32) -> Self {
        Self(number)
    }
}

impl TryFrom<i64> for CaseNumber {
    type Error = HarnessError;

    fn try_from(number: i64) -> Result<Self, Self::Error> {
        if number < 0 {
            return Err(HarnessError::NegativeCaseNumber(number));
        }
        u32::try_from(number)
            .map(Self)
            .map_err(|_| HarnessError::CaseNumberOutOfRange(number))
    }
}

impl fmt::Display for CaseNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One loaded test case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseRunner {
    number: CaseNumber,
    target: String,
    dir: PathBuf,
    args: Vec<String>,
    input: Vec<u8>,
    expected: Vec<String>,
}

impl CaseRunner {
    /// Load case `number` of `target` from the fixtures in `dir`.
    ///
    /// ## Errors
    ///
    /// Returns [`CaseFailure::FixtureRead`] when a fixture exists but cannot be read or decoded, or when
    /// `expected-<n>.txt` is missing. An absent `args` or `input` file is not an error.
    pub fn load(dir: &Path, target: impl Into<String>, number: CaseNumber) -> Result<Self, CaseFailure> {
        let n = number.get();
        let args = match read_optional(&dir.join(CaseFile::Args.file_name(n)))? {
            Some((path, bytes)) => significant_lines(&decode(&path, bytes)?),
            None => Vec::new(),
        };
        let input = read_optional(&dir.join(CaseFile::Input.file_name(n)))?
            .map(|(_, bytes)| bytes)
            .unwrap_or_default();

        let expected_path = dir.join(CaseFile::Expected.file_name(n));
        let bytes = fs::read(&expected_path).map_err(|e| fixture_error(&expected_path, e))?;
        let expected = significant_lines(&decode(&expected_path, bytes)?);

        Ok(Self {
            number,
            target: target.into(),
            dir: dir.to_path_buf(),
            args,
            input,
            expected,
        })
    }

    pub fn number(&self) -> CaseNumber {
        self.number
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn input(&self) -> &[u8] {
        &self.input
    }

    pub fn expected(&self) -> &[String] {
        &self.expected
    }

    /// Display name of the case, e.g. `clients.first.Summer - 2`.
    pub fn name(&self) -> String {
        format!("{} - {}", self.target, self.number)
    }

    /// Path of the optional `actual-<n>.txt` artifact.
    pub fn actual_path(&self) -> PathBuf {
        self.dir.join(CaseFile::Actual.file_name(self.number.get()))
    }

    /// Run the case against `entry` and report its outcome.
    ///
    /// Never panics and never blocks longer than `config.timeout` (plus the time to write the optional
    /// artifact).
    pub fn execute(&self, entry: Arc<dyn EntryPoint>, config: &HarnessConfig) -> Outcome {
        let output = match self.invoke(entry, config) {
            Ok(output) => output,
            Err(failure) => return Outcome::Failed(failure),
        };

        if config.emit_actual {
            let path = self.actual_path();
            if let Err(e) = fs::write(&path, &output) {
                tracing::warn!("{}: could not write {}: {}", self.name(), path.display(), e);
                return Outcome::Failed(CaseFailure::ActualOutput {
                    path,
                    reason: e.to_string(),
                });
            }
        }

        let actual = significant_lines(&String::from_utf8_lossy(&output));
        if actual == self.expected {
            Outcome::Passed
        } else {
            Outcome::Failed(CaseFailure::Mismatch {
                expected: self.expected.clone(),
                actual,
            })
        }
    }

    /// Invoke `entry` on a worker thread and wait for its captured output.
    fn invoke(&self, entry: Arc<dyn EntryPoint>, config: &HarnessConfig) -> Result<Vec<u8>, CaseFailure> {
        let (tx, rx) = mpsc::channel();
        let args = self.args.clone();
        let input = self.input.clone();

        let spawned = thread::Builder::new()
            .name(format!("case {}", self.name()))
            .spawn(move || {
                let mut scope = RedirectScope::new(input);
                let result = panic::catch_unwind(AssertUnwindSafe(|| {
                    let (stdin, stdout) = scope.streams();
                    entry.invoke(args, stdin, stdout)
                }));
                let report = match result {
                    Ok(Ok(())) => Ok(scope.into_output()),
                    Ok(Err(e)) => Err(e.to_string()),
                    Err(payload) => Err(panic_message(payload.as_ref())),
                };
                // The receiver is gone when the case already timed out.
                let _ = tx.send(report);
            });
        if let Err(e) = spawned {
            return Err(CaseFailure::Invocation(format!("could not start worker: {}", e)));
        }

        match rx.recv_timeout(config.timeout) {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(message)) => {
                tracing::debug!("{}: invocation failed: {}", self.name(), message);
                Err(CaseFailure::Invocation(message))
            }
            Err(RecvTimeoutError::Timeout) => {
                tracing::warn!("{}: abandoned after {:?}", self.name(), config.timeout);
                Err(CaseFailure::Timeout(config.timeout))
            }
            Err(RecvTimeoutError::Disconnected) => Err(CaseFailure::Invocation(
                "worker exited without reporting a result".to_string(),
            )),
        }
    }
}

fn read_optional(path: &Path) -> Result<Option<(PathBuf, Vec<u8>)>, CaseFailure> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some((path.to_path_buf(), bytes))),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(fixture_error(path, e)),
    }
}

fn decode(path: &Path, bytes: Vec<u8>) -> Result<String, CaseFailure> {
    String::from_utf8(bytes).map_err(|e| CaseFailure::FixtureRead {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

fn fixture_error(path: &Path, e: io::Error) -> CaseFailure {
    tracing::warn!("cannot read fixture {}: {}", path.display(), e);
    CaseFailure::FixtureRead {
        path: path.to_path_buf(),
        reason: e.to_string(),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {}", s)
    } else {
        "panicked".to_string()
    }
}
