//! Shared fixtures for the integration tests: a few small programs and a fixture-tree builder.

#![allow(dead_code)]

use std::fs;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use blackbox::harness::{InvocationError, Registry};
use tempfile::TempDir;

/// Sum of the whitespace-separated integers on stdin.
pub fn summer(_args: Vec<String>, stdin: &mut dyn BufRead, stdout: &mut dyn Write) -> Result<(), InvocationError> {
    let mut text = String::new();
    stdin.read_to_string(&mut text)?;
    let mut total = 0i64;
    for word in text.split_whitespace() {
        total += word.parse::<i64>()?;
    }
    writeln!(stdout, "{}", total)?;
    Ok(())
}

/// Sum of the integer arguments followed by the integers on stdin.
pub fn arg_summer(args: Vec<String>, stdin: &mut dyn BufRead, stdout: &mut dyn Write) -> Result<(), InvocationError> {
    let mut total = 0i64;
    for arg in &args {
        total += arg.parse::<i64>()?;
    }
    let mut text = String::new();
    stdin.read_to_string(&mut text)?;
    for word in text.split_whitespace() {
        total += word.parse::<i64>()?;
    }
    writeln!(stdout, "{}", total)?;
    Ok(())
}

/// Greets every line of stdin.
pub fn greeter(_args: Vec<String>, stdin: &mut dyn BufRead, stdout: &mut dyn Write) -> Result<(), InvocationError> {
    for line in stdin.lines() {
        let line = line?;
        if !line.trim().is_empty() {
            writeln!(stdout, "Hello, {}!", line.trim())?;
        }
    }
    Ok(())
}

/// Sleeps for the number of milliseconds given as the first argument, then prints `done`.
pub fn sleeper(args: Vec<String>, _stdin: &mut dyn BufRead, stdout: &mut dyn Write) -> Result<(), InvocationError> {
    let millis = args.first().map(|a| a.parse::<u64>()).transpose()?.unwrap_or(0);
    thread::sleep(Duration::from_millis(millis));
    writeln!(stdout, "done")?;
    Ok(())
}

pub fn panicker(_args: Vec<String>, _stdin: &mut dyn BufRead, _stdout: &mut dyn Write) -> Result<(), InvocationError> {
    panic!("boom");
}

/// Registry with every demo program under `clients.first.*` and `clients.second.*`.
pub fn demo_registry() -> Registry {
    let mut registry = Registry::new();
    registry
        .register_fn("Top", summer)
        .register_fn("clients.first.Summer", summer)
        .register_fn("clients.first.ArgSummer", arg_summer)
        .register_fn("clients.second.Greeter", greeter)
        .register_fn("slow.Sleeper", sleeper)
        .register_fn("broken.Panicker", panicker);
    registry
}

/// Scratch fixture tree.
pub struct Fixtures {
    pub dir: TempDir,
}

impl Fixtures {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Target directory for a dotted name, created on demand.
    pub fn target(&self, dotted: &str) -> PathBuf {
        let dir = dotted.split('.').fold(self.root().to_path_buf(), |path, part| path.join(part));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// Write case `n` of `dotted`; `args`/`input` are skipped when `None`.
    pub fn case(&self, dotted: &str, n: u32, args: Option<&str>, input: Option<&str>, expected: &str) -> &Self {
        let dir = self.target(dotted);
        if let Some(args) = args {
            fs::write(dir.join(format!("args-{}.txt", n)), args).unwrap();
        }
        if let Some(input) = input {
            fs::write(dir.join(format!("input-{}.txt", n)), input).unwrap();
        }
        fs::write(dir.join(format!("expected-{}.txt", n)), expected).unwrap();
        self
    }
}
