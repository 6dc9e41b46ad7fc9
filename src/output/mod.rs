//! Output formatting
//!
//! A [`Reporter`] receives each sweep iteration as soon as it is measured. Two
//! renderings exist: a human-readable line per block size ([`text`]) and one
//! JSON object per line ([`json`]).

pub mod json;
pub mod text;

use crate::config::{OutputConfig, OutputFormat};
use crate::coordinator::sampler::AggregateResult;
use crate::coordinator::sweep::SweepSummary;
use std::io::{self, Write};

/// Sink for sweep results
pub trait Reporter {
    /// Emit the result of one iteration
    fn report(&mut self, result: &AggregateResult) -> io::Result<()>;

    /// Called once after the last iteration
    fn finish(&mut self, _summary: &SweepSummary) -> io::Result<()> {
        Ok(())
    }
}

/// Build the reporter selected by `config`, writing to `out`
pub fn create_reporter<'a, W: Write + 'a>(config: &OutputConfig, out: W) -> Box<dyn Reporter + 'a> {
    match config.format {
        OutputFormat::Text => Box::new(text::TextReporter::new(out, config.units)),
        OutputFormat::Json => Box::new(json::JsonReporter::new(out)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::units::UnitMode;

    fn sample() -> AggregateResult {
        AggregateResult {
            block_size_bytes: 4096,
            iops_total: 1000.0,
            bandwidth_bytes_per_sec: 4_096_000.0,
            ops_completed: 2000,
            elapsed_seconds: 2.0,
        }
    }

    #[test]
    fn test_create_reporter_by_format() {
        let mut text_out = Vec::new();
        {
            let config = OutputConfig::default();
            let mut reporter = create_reporter(&config, &mut text_out);
            reporter.report(&sample()).unwrap();
        }
        assert!(String::from_utf8(text_out).unwrap().starts_with("4 KiB blocks"));

        let mut json_out = Vec::new();
        {
            let config = OutputConfig {
                format: OutputFormat::Json,
                units: UnitMode::Iec,
            };
            let mut reporter = create_reporter(&config, &mut json_out);
            reporter.report(&sample()).unwrap();
        }
        assert!(String::from_utf8(json_out).unwrap().starts_with('{'));
    }
}
