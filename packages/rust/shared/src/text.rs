//! Text budgeting passes shared by the metric resolver and the reference
//! compressor.
//!
//! Each pass is a function `&str -> String` applied in sequence, mirroring
//! the cleanup-pipeline style used across the codebase.

use std::sync::LazyLock;

use regex::Regex;

/// Marker appended when content is cut at a character ceiling.
pub const TRUNCATION_MARKER: &str = "\n\n[content truncated]";

/// Collapse runs of 3+ blank lines into exactly 2.
pub fn collapse_blank_lines(text: &str) -> String {
    static MULTI_BLANK_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\n{4,}").expect("valid regex"));

    MULTI_BLANK_RE.replace_all(text, "\n\n\n").to_string()
}

/// Trim trailing whitespace from every line.
pub fn trim_trailing_whitespace(text: &str) -> String {
    text.lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Cut `text` at `ceiling` characters, appending [`TRUNCATION_MARKER`].
///
/// The cut lands on a char boundary; text under the ceiling is returned
/// unchanged with no marker.
pub fn truncate_with_marker(text: &str, ceiling: usize) -> String {
    if text.chars().count() <= ceiling {
        return text.to_string();
    }

    let cut: String = text.chars().take(ceiling).collect();
    // Avoid cutting mid-line where possible; dropping a partial final line
    // keeps the output readable.
    let cut = match cut.rfind('\n') {
        Some(pos) if pos > 0 => cut[..pos].to_string(),
        _ => cut,
    };

    format!("{}{TRUNCATION_MARKER}", cut.trim_end())
}

/// Run the standard post-processing passes: collapse blank lines, trim
/// trailing whitespace, enforce the ceiling.
pub fn tidy_with_ceiling(text: &str, ceiling: usize) -> String {
    let collapsed = collapse_blank_lines(text);
    let trimmed = trim_trailing_whitespace(&collapsed);
    truncate_with_marker(trimmed.trim(), ceiling)
}

/// Approximate token count: characters divided by a fixed divisor.
///
/// `chars_per_token` of 0 is treated as 1 so a misconfigured budget can
/// never divide by zero.
pub fn estimate_tokens(text: &str, chars_per_token: usize) -> usize {
    text.chars().count() / chars_per_token.max(1)
}
