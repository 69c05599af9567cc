//! Reading code out of files for the code operations.

use std::fs;
use std::path::Path;

use crate::{Error, Result};

/// Language tag for a file, from its extension.
pub fn language_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "py" | "pyw" => "python",
        "js" | "mjs" | "cjs" | "jsx" => "javascript",
        "ts" | "tsx" | "mts" => "typescript",
        "java" => "java",
        "cs" => "csharp",
        "c" | "h" => "c",
        "cc" | "cpp" | "cxx" | "hpp" | "hh" => "cpp",
        "html" | "htm" => "html",
        "rs" => "rust",
        "go" => "go",
        "rb" => "ruby",
        "sh" | "bash" => "shellscript",
        _ => "plaintext",
    }
}

/// Text of 1-based line `line`.
pub fn read_line(path: &Path, line: usize) -> Result<String> {
    let text = fs::read_to_string(path)?;
    line.checked_sub(1)
        .and_then(|i| text.lines().nth(i))
        .map(str::to_string)
        .ok_or_else(|| {
            Error::Custom(format!("{} has no line {line}", path.display()))
        })
}

/// Whole file, or the 1-based inclusive range `start:end`.
pub fn read_selection(path: &Path, range: Option<&str>) -> Result<String> {
    let text = fs::read_to_string(path)?;
    let Some(range) = range else {
        return Ok(text);
    };
    let (start, end) = parse_range(range)?;
    let lines: Vec<&str> = text.lines().collect();
    if end > lines.len() {
        return Err(Error::Custom(format!(
            "{} has only {} lines",
            path.display(),
            lines.len()
        )));
    }
    Ok(lines[start - 1..end].join("\n"))
}

fn parse_range(range: &str) -> Result<(usize, usize)> {
    let bad = || Error::Custom(format!("invalid line range '{range}', expected START:END"));
    let (start, end) = match range.split_once(':') {
        Some((s, e)) => (s.trim(), e.trim()),
        None => (range.trim(), range.trim()),
    };
    let start: usize = start.parse().map_err(|_| bad())?;
    let end: usize = end.parse().map_err(|_| bad())?;
    if start == 0 || end < start {
        return Err(bad());
    }
    Ok((start, end))
}
