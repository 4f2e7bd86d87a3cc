//! Log-based pass/fail oracle
//!
//! Captured node logs are grepped for error signatures; the concatenated
//! matches form the transcript the harness asserts on after teardown.

/// Lines of `text` containing "error" in any casing.
pub fn error_lines(text: &str) -> Vec<&str> {
    text.lines()
        .filter(|line| line.to_ascii_lowercase().contains("error"))
        .collect()
}

/// True when `text` contains at least one error occurrence.
pub fn scan(text: &str) -> bool {
    !error_lines(text).is_empty()
}
