//! Fixture file naming.
//!
//! Every case `n` inside a case-set directory is described by up to four files:
//!
//! | file              | role                                                   |
//! |-------------------|--------------------------------------------------------|
//! | `args-<n>.txt`    | optional, one command-line argument per non-blank line |
//! | `input-<n>.txt`   | optional, raw bytes fed to standard input              |
//! | `expected-<n>.txt`| mandatory, the expected transcript                     |
//! | `actual-<n>.txt`  | written by the harness when actual output is emitted   |

/// Name of the file whose presence marks a directory as a case-set root.
pub const CASE_SET_MARKER: &str = "expected-1.txt";

const EXTENSION: &str = ".txt";

/// The kinds of per-case fixture files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaseFile {
    Args,
    Input,
    Expected,
    Actual,
}

impl CaseFile {
    /// The file name prefix (without the dash), e.g. `expected`.
    pub fn prefix(self) -> &'static str {
        match self {
            CaseFile::Args => "args",
            CaseFile::Input => "input",
            CaseFile::Expected => "expected",
            CaseFile::Actual => "actual",
        }
    }

    /// Build the file name for case `number`, e.g. `expected-3.txt`.
    pub fn file_name(self, number: u32) -> String {
        format!("{}-{}{}", self.prefix(), number, EXTENSION)
    }
}

/// Recover the case number from an expected-output file name.
///
/// ## Returns
/// - `Some(n)` for names of the exact form `expected-<digits>.txt` whose number fits in a `u32`.
/// - `None` for every other name, including `expected-.txt`, `expected-+1.txt` and `expected-1.txt.bak`.
pub fn parse_case_number(file_name: &str) -> Option<u32> {
    let digits = file_name
        .strip_prefix(CaseFile::Expected.prefix())?
        .strip_prefix('-')?
        .strip_suffix(EXTENSION)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
