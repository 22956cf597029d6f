//! Running targets as child processes.
//!
//! [`CommandResolver`] maps `clients.first.Summer` to the executable `<bin_dir>/clients/first/Summer`
//! (with the platform's executable suffix). The child gets the case's arguments, the case's input on a
//! pipe, and its stdout is copied into the captured buffer. A non-zero exit status is an invocation
//! fault; stderr is inherited so diagnostics reach the terminal.
//!
//! Every child runs under a deadline. A child still running when it expires is killed and reaped, so a
//! hanging target never outlives its case.

use std::env::consts::EXE_SUFFIX;
use std::io::{self, BufRead, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use blackbox_core::scope_to_path;

use super::config::DEFAULT_TIMEOUT;
use super::entry::{EntryPoint, EntryPointResolver};
use super::error::InvocationError;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Resolve targets to executables below a binary directory.
#[derive(Debug, Clone)]
pub struct CommandResolver {
    bin_dir: PathBuf,
    timeout: Duration,
}

impl CommandResolver {
    pub fn new(bin_dir: impl Into<PathBuf>) -> Self {
        Self {
            bin_dir: bin_dir.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Deadline handed to every resolved program; match it to the case timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn bin_dir(&self) -> &Path {
        &self.bin_dir
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Path the executable for `qualified_name` would have.
    pub fn program_path(&self, qualified_name: &str) -> PathBuf {
        let mut path = self.bin_dir.join(scope_to_path(qualified_name));
        if !EXE_SUFFIX.is_empty() {
            let mut file_name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
            file_name.push(EXE_SUFFIX);
            path.set_file_name(file_name);
        }
        path
    }
}

impl EntryPointResolver for CommandResolver {
    fn resolve(&self, qualified_name: &str) -> Option<Arc<dyn EntryPoint>> {
        if qualified_name.is_empty() {
            return None;
        }
        let program = self.program_path(qualified_name);
        if is_executable(&program) {
            Some(Arc::new(CommandEntryPoint::new(program).with_timeout(self.timeout)))
        } else {
            None
        }
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// One executable target.
#[derive(Debug, Clone)]
pub struct CommandEntryPoint {
    program: PathBuf,
    timeout: Duration,
}

impl CommandEntryPoint {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl EntryPoint for CommandEntryPoint {
    fn invoke(
        &self,
        args: Vec<String>,
        stdin: &mut dyn BufRead,
        stdout: &mut dyn Write,
    ) -> Result<(), InvocationError> {
        let mut input = Vec::new();
        stdin.read_to_end(&mut input)?;

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| format!("failed to start {}: {}", self.program.display(), e))?;

        // Feed stdin and drain stdout on their own threads so the deadline loop never blocks on a pipe.
        let feeder = child.stdin.take().map(|mut pipe| {
            thread::spawn(move || match pipe.write_all(&input) {
                Err(e) if e.kind() != io::ErrorKind::BrokenPipe => Err(e),
                _ => Ok(()),
            })
        });
        let reader = child.stdout.take().map(|mut pipe| {
            thread::spawn(move || {
                let mut output = Vec::new();
                pipe.read_to_end(&mut output).map(|_| output)
            })
        });

        let status = match wait_until(&mut child, self.timeout) {
            Ok(Some(status)) => status,
            Ok(None) => {
                reap(&mut child);
                tracing::warn!("{} killed after {:?}", self.program.display(), self.timeout);
                let message = format!("{} timed out after {} ms", self.program.display(), self.timeout.as_millis());
                return Err(message.into());
            }
            Err(e) => {
                reap(&mut child);
                return Err(e.into());
            }
        };

        let output = match reader {
            Some(reader) => reader
                .join()
                .map_err(|_| format!("stdout reader for {} panicked", self.program.display()))??,
            None => Vec::new(),
        };
        if let Some(feeder) = feeder {
            feeder
                .join()
                .map_err(|_| format!("stdin feeder for {} panicked", self.program.display()))??;
        }

        stdout.write_all(&output)?;
        if status.success() {
            Ok(())
        } else {
            Err(format!("{} exited with {}", self.program.display(), status).into())
        }
    }
}

/// Poll `child` until it exits or `timeout` elapses; `None` means it is still running.
fn wait_until(child: &mut Child, timeout: Duration) -> io::Result<Option<ExitStatus>> {
    let start = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if start.elapsed() >= timeout {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Kill `child` and collect its exit status so it does not linger as a zombie.
fn reap(child: &mut Child) {
    if let Err(e) = child.kill() {
        tracing::debug!("kill failed: {}", e);
    }
    if let Err(e) = child.wait() {
        tracing::debug!("wait failed: {}", e);
    }
}

#[cfg(all(test, unix))]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Cursor;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    fn script(dir: &Path, rel: &str, body: &str) -> PathBuf {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[test]
    fn test_resolves_nested_executables() {
        let bin = TempDir::new().unwrap();
        script(bin.path(), "clients/first/Echo", "echo \"$@\"");
        fs::write(bin.path().join("NotExecutable"), "").unwrap();

        let resolver = CommandResolver::new(bin.path());
        assert!(resolver.resolve("clients.first.Echo").is_some());
        assert!(resolver.resolve("clients.first.Missing").is_none());
        assert!(resolver.resolve("NotExecutable").is_none());
        assert!(resolver.resolve("").is_none());
    }

    #[test]
    fn test_invoke_pipes_args_and_stdin() {
        let bin = TempDir::new().unwrap();
        script(bin.path(), "Cat", "echo \"$1\"; cat");

        let entry = CommandResolver::new(bin.path()).resolve("Cat").unwrap();
        let mut stdin = Cursor::new(b"line\n".to_vec());
        let mut stdout = Vec::new();
        entry.invoke(vec!["first".into()], &mut stdin, &mut stdout).unwrap();
        assert_eq!(String::from_utf8(stdout).unwrap(), "first\nline\n");
    }

    #[test]
    fn test_non_zero_exit_is_an_error() {
        let bin = TempDir::new().unwrap();
        script(bin.path(), "Fails", "echo partial; exit 3");

        let entry = CommandResolver::new(bin.path()).resolve("Fails").unwrap();
        let mut stdin = Cursor::new(Vec::new());
        let mut stdout = Vec::new();
        let err = entry.invoke(Vec::new(), &mut stdin, &mut stdout).unwrap_err();
        assert!(err.to_string().contains("exited with"));
    }

    #[test]
    fn test_resolver_passes_its_timeout() {
        let bin = TempDir::new().unwrap();
        script(bin.path(), "Echo", "echo hi");

        let resolver = CommandResolver::new(bin.path()).with_timeout(Duration::from_millis(300));
        assert_eq!(resolver.timeout(), Duration::from_millis(300));
        assert_eq!(CommandResolver::new(bin.path()).timeout(), DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_hanging_child_is_killed_at_deadline() {
        let bin = TempDir::new().unwrap();
        let marker = bin.path().join("marker");
        let program = script(bin.path(), "Slow", &format!("sleep 1\ntouch '{}'", marker.display()));

        let entry = CommandEntryPoint::new(program).with_timeout(Duration::from_millis(200));
        let mut stdin = Cursor::new(Vec::new());
        let mut stdout = Vec::new();
        let start = Instant::now();
        let err = entry.invoke(Vec::new(), &mut stdin, &mut stdout).unwrap_err();

        assert!(err.to_string().contains("timed out"), "{err}");
        assert!(start.elapsed() < Duration::from_millis(900));
        thread::sleep(Duration::from_millis(1500));
        assert!(!marker.exists(), "killed child must not finish its script");
    }

    #[test]
    fn test_fast_child_is_unaffected_by_deadline() {
        let bin = TempDir::new().unwrap();
        let program = script(bin.path(), "Cat", "cat");

        let entry = CommandEntryPoint::new(program).with_timeout(Duration::from_secs(5));
        let mut stdin = Cursor::new(b"a\nb\n".to_vec());
        let mut stdout = Vec::new();
        entry.invoke(Vec::new(), &mut stdin, &mut stdout).unwrap();
        assert_eq!(stdout, b"a\nb\n");
    }
}
