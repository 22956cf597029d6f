//! Transcript normalization.
//!
//! Expected and actual transcripts are compared as sequences of *significant lines*: the text is split
//! on `\n`, every piece is trimmed, and pieces that are empty after trimming are dropped. The same law
//! applies to `args-<n>.txt` files, so a trailing newline or a stray `\r` never produces an argument.

/// Split `text` into its trimmed, non-blank lines.
///
/// ## Examples
/// ```rust
/// use blackbox_core::significant_lines;
/// assert_eq!(significant_lines("  1 \r\n\n 2\n   \n"), vec!["1", "2"]);
/// ```
pub fn significant_lines(text: &str) -> Vec<String> {
    text.split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
