//! Diff shaping for model prompts.
//!
//! `truncate_diff` bounds the size of a unified diff before it is sent to the
//! model: at most [`MAX_FILES`] file sections, each cut to [`MAX_LINES_PER_FILE`]
//! lines. Omitted sections collapse into a single marker line.

/// File sections kept from the start of the diff.
pub const MAX_FILES: usize = 4;
/// Lines kept per file section, including the `diff --git` header.
pub const MAX_LINES_PER_FILE: usize = 10;
/// Returned for an empty (or whitespace-only) diff.
pub const EMPTY_DIFF: &str = "No diff available";

const FILE_BOUNDARY: &str = "diff --git";
const MARKER_PREFIX: &str = "[... ";
const MARKER_SUFFIX: &str = " more file(s) truncated ...]";

/// Truncates a unified diff to a bounded shape.
///
/// Deterministic and idempotent: a marker produced by an earlier pass is
/// recognised and its count carried into the new one.
pub fn truncate_diff(diff: &str) -> String {
    if diff.trim().is_empty() {
        return EMPTY_DIFF.to_string();
    }

    let mut lines: Vec<&str> = diff.lines().collect();
    let mut omitted = 0usize;
    if let Some(n) = lines.last().and_then(|l| parse_marker(l)) {
        omitted += n;
        lines.pop();
    }

    let sections = split_sections(&lines);
    omitted += sections.len().saturating_sub(MAX_FILES);

    let mut out: Vec<&str> = Vec::new();
    for section in sections.iter().take(MAX_FILES) {
        out.extend(section.iter().take(MAX_LINES_PER_FILE));
    }

    let mut text = out.join("\n");
    if omitted > 0 {
        if !text.is_empty() {
            text.push('\n');
        }
        text.push_str(&marker(omitted));
    }
    text
}

/// Groups lines into file sections; a blank preamble before the first
/// `diff --git` line is dropped.
fn split_sections<'a>(lines: &[&'a str]) -> Vec<Vec<&'a str>> {
    let mut sections: Vec<Vec<&'a str>> = Vec::new();
    let mut current: Vec<&'a str> = Vec::new();

    for line in lines {
        if line.starts_with(FILE_BOUNDARY) && !current.is_empty() {
            sections.push(std::mem::take(&mut current));
        }
        current.push(line);
    }
    if !current.is_empty() {
        sections.push(current);
    }

    if sections
        .first()
        .is_some_and(|s| !s[0].starts_with(FILE_BOUNDARY) && s.iter().all(|l| l.trim().is_empty()))
    {
        sections.remove(0);
    }
    sections
}

fn marker(n: usize) -> String {
    format!("{MARKER_PREFIX}{n}{MARKER_SUFFIX}")
}

fn parse_marker(line: &str) -> Option<usize> {
    line.trim()
        .strip_prefix(MARKER_PREFIX)?
        .strip_suffix(MARKER_SUFFIX)?
        .parse()
        .ok()
}
