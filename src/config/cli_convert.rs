//! CLI to Config conversion utilities

use crate::config::cli;
use crate::config::{OutputFormat, Pattern};
use anyhow::{Context, Result};

/// Parse a size string (e.g., "512", "4k", "1M") to bytes
///
/// Suffixes are binary multipliers: `k`/`kb` = 1024, `m`/`mb` = 1024², and so on.
pub fn parse_size(s: &str) -> Result<u64> {
    let s = s.trim().to_lowercase();

    let (num_str, multiplier) = if s.ends_with('k') || s.ends_with("kb") {
        (s.trim_end_matches("kb").trim_end_matches('k'), 1024u64)
    } else if s.ends_with('m') || s.ends_with("mb") {
        (s.trim_end_matches("mb").trim_end_matches('m'), 1024 * 1024)
    } else if s.ends_with('g') || s.ends_with("gb") {
        (s.trim_end_matches("gb").trim_end_matches('g'), 1024 * 1024 * 1024)
    } else if s.ends_with('b') {
        (s.trim_end_matches('b'), 1)
    } else {
        (s.as_str(), 1)
    };

    let num: u64 = num_str
        .trim()
        .parse()
        .with_context(|| format!("Invalid size format: {}", s))?;

    num.checked_mul(multiplier)
        .with_context(|| format!("Size out of range: {}", s))
}

/// Parse a block size string and check that it fits a single read
pub fn parse_block_size(s: &str) -> Result<u32> {
    let bytes = parse_size(s)?;
    u32::try_from(bytes).with_context(|| format!("Block size too large: {}", s))
}

/// Parse a duration string (e.g., "2", "60s", "5m", "1h") to whole seconds
pub fn parse_duration(s: &str) -> Result<u32> {
    let s = s.trim().to_lowercase();

    let (num_str, multiplier) = if s.ends_with("sec") || s.ends_with('s') {
        (s.trim_end_matches("sec").trim_end_matches('s'), 1u32)
    } else if s.ends_with("min") || s.ends_with('m') {
        (s.trim_end_matches("min").trim_end_matches('m'), 60)
    } else if s.ends_with("hr") || s.ends_with('h') {
        (s.trim_end_matches("hr").trim_end_matches('h'), 3600)
    } else {
        (s.as_str(), 1)
    };

    let num: u32 = num_str
        .trim()
        .parse()
        .with_context(|| format!("Invalid duration format: {}", s))?;

    num.checked_mul(multiplier)
        .with_context(|| format!("Duration out of range: {}", s))
}

/// Convert CLI PatternArg to config Pattern
pub fn convert_pattern(cli_pattern: cli::PatternArg) -> Pattern {
    match cli_pattern {
        cli::PatternArg::Random => Pattern::Random,
        cli::PatternArg::Sequential => Pattern::Sequential,
    }
}

/// Convert CLI FormatArg to config OutputFormat
pub fn convert_format(cli_format: cli::FormatArg) -> OutputFormat {
    match cli_format {
        cli::FormatArg::Text => OutputFormat::Text,
        cli::FormatArg::Json => OutputFormat::Json,
    }
}
