//! Human-readable text output
//!
//! One line per iteration:
//!
//! ```text
//! 4 KiB blocks: 51234.5 IO/s, 200.1 MiB/s (1.7 Gbit/s)
//! ```
//!
//! Bit rates always use decimal prefixes, as is customary for link speeds;
//! machine-readable mode prints every quantity unscaled.

use super::Reporter;
use crate::coordinator::sampler::AggregateResult;
use crate::util::units::{format, UnitMode};
use std::io::{self, Write};

/// Writes one report line per iteration
pub struct TextReporter<W: Write> {
    out: W,
    units: UnitMode,
}

impl<W: Write> TextReporter<W> {
    pub fn new(out: W, units: UnitMode) -> Self {
        Self { out, units }
    }
}

/// Render the report line for `result`, without trailing newline
pub fn format_result(result: &AggregateResult, units: UnitMode) -> String {
    let bit_units = match units {
        UnitMode::Raw => UnitMode::Raw,
        _ => UnitMode::Si,
    };

    format!(
        "{}B blocks: {:.1} IO/s, {}B/s ({}bit/s)",
        format(f64::from(result.block_size_bytes), 0, units),
        result.iops_total,
        format(result.bandwidth_bytes_per_sec, 1, units),
        format(result.bandwidth_bytes_per_sec * 8.0, 1, bit_units),
    )
}

impl<W: Write> Reporter for TextReporter<W> {
    fn report(&mut self, result: &AggregateResult) -> io::Result<()> {
        writeln!(self.out, "{}", format_result(result, self.units))?;
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(block_size: u32, iops: f64) -> AggregateResult {
        AggregateResult {
            block_size_bytes: block_size,
            iops_total: iops,
            bandwidth_bytes_per_sec: f64::from(block_size) * iops,
            ops_completed: iops as u64 * 2,
            elapsed_seconds: 2.0,
        }
    }

    #[test]
    fn test_iec_line() {
        let line = format_result(&result(4096, 1000.0), UnitMode::Iec);
        assert_eq!(line, "4 KiB blocks: 1000.0 IO/s, 3.9 MiB/s (32.8 Mbit/s)");
    }

    #[test]
    fn test_si_line() {
        let line = format_result(&result(512, 2000.0), UnitMode::Si);
        assert_eq!(line, "512 B blocks: 2000.0 IO/s, 1.0 MB/s (8.2 Mbit/s)");
    }

    #[test]
    fn test_machine_readable_line() {
        let line = format_result(&result(4096, 1000.0), UnitMode::Raw);
        assert_eq!(line, "4096 B blocks: 1000.0 IO/s, 4096000.0 B/s (32768000.0 bit/s)");
    }

    #[test]
    fn test_reporter_writes_lines() {
        let mut out = Vec::new();
        let mut reporter = TextReporter::new(&mut out, UnitMode::Iec);
        reporter.report(&result(512, 10.0)).unwrap();
        reporter.report(&result(1024, 10.0)).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("512 B blocks"));
        assert!(lines[1].starts_with("1 KiB blocks"));
    }
}
