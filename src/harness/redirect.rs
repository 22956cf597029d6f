//! Per-case standard stream redirection.
//!
//! A [`RedirectScope`] owns the stdin bytes and the stdout capture buffer of exactly one case. The scope
//! is created on the case's worker thread and moved nowhere else, so an abandoned (timed out) worker can
//! only ever write into its own buffer; later cases get fresh scopes.

use std::io::{BufRead, Cursor, Write};

pub struct RedirectScope {
    stdin: Cursor<Vec<u8>>,
    stdout: Vec<u8>,
}

impl RedirectScope {
    /// Open a scope whose stdin yields exactly `input`.
    pub fn new(input: Vec<u8>) -> Self {
        Self {
            stdin: Cursor::new(input),
            stdout: Vec::new(),
        }
    }

    /// Borrow the redirected streams for one invocation.
    pub fn streams(&mut self) -> (&mut dyn BufRead, &mut dyn Write) {
        (&mut self.stdin, &mut self.stdout)
    }

    /// Close the scope and return the raw captured output.
    pub fn into_output(self) -> Vec<u8> {
        self.stdout
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn test_scope_feeds_input_and_captures_output() {
        let mut scope = RedirectScope::new(b"hello\nworld\n".to_vec());
        {
            let (stdin, stdout) = scope.streams();
            let mut first = String::new();
            stdin.read_line(&mut first).unwrap();
            write!(stdout, "got {}", first).unwrap();
        }
        assert_eq!(scope.into_output(), b"got hello\n");
    }

    #[test]
    fn test_fresh_scopes_do_not_share_leftovers() {
        let mut first = RedirectScope::new(b"1\n2\n3\n".to_vec());
        {
            let (stdin, _) = first.streams();
            let mut line = String::new();
            stdin.read_line(&mut line).unwrap();
        }

        let mut second = RedirectScope::new(Vec::new());
        let (stdin, _) = second.streams();
        let mut rest = Vec::new();
        stdin.read_to_end(&mut rest).unwrap();
        assert!(rest.is_empty());
    }
}
