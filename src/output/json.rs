//! JSON-lines output
//!
//! Every iteration becomes one object on its own line, followed by a summary
//! object once the sweep ends:
//!
//! ```text
//! {"type":"result","timestamp":"2026-01-05T10:00:02.001Z","block_size_bytes":512,...}
//! {"type":"summary","timestamp":"2026-01-05T10:00:24.013Z","iterations":11,...}
//! ```
//!
//! Values are raw numbers; unit settings do not apply.

use super::Reporter;
use crate::coordinator::sampler::AggregateResult;
use crate::coordinator::sweep::SweepSummary;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use std::io::{self, Write};

/// One output record
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum JsonRecord<'a> {
    Result {
        timestamp: String,
        #[serde(flatten)]
        result: &'a AggregateResult,
    },
    Summary {
        timestamp: String,
        #[serde(flatten)]
        summary: &'a SweepSummary,
    },
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Writes one JSON object per line
pub struct JsonReporter<W: Write> {
    out: W,
}

impl<W: Write> JsonReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    fn write_record(&mut self, record: &JsonRecord<'_>) -> io::Result<()> {
        serde_json::to_writer(&mut self.out, record)?;
        self.out.write_all(b"\n")?;
        self.out.flush()
    }
}

impl<W: Write> Reporter for JsonReporter<W> {
    fn report(&mut self, result: &AggregateResult) -> io::Result<()> {
        self.write_record(&JsonRecord::Result {
            timestamp: now_rfc3339(),
            result,
        })
    }

    fn finish(&mut self, summary: &SweepSummary) -> io::Result<()> {
        self.write_record(&JsonRecord::Summary {
            timestamp: now_rfc3339(),
            summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::sweep::StopReason;
    use serde_json::Value;

    fn result(block_size: u32) -> AggregateResult {
        AggregateResult {
            block_size_bytes: block_size,
            iops_total: 250.0,
            bandwidth_bytes_per_sec: f64::from(block_size) * 250.0,
            ops_completed: 500,
            elapsed_seconds: 2.0,
        }
    }

    #[test]
    fn test_result_record() {
        let mut out = Vec::new();
        JsonReporter::new(&mut out).report(&result(4096)).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.ends_with('\n'));
        let value: Value = serde_json::from_str(text.trim_end()).unwrap();
        assert_eq!(value["type"], "result");
        assert_eq!(value["block_size_bytes"], 4096);
        assert_eq!(value["iops_total"], 250.0);
        assert_eq!(value["bandwidth_bytes_per_sec"], 1_024_000.0);
        assert_eq!(value["ops_completed"], 500);
        assert!(value["timestamp"].as_str().unwrap().ends_with('Z'));
    }

    #[test]
    fn test_summary_record() {
        let summary = SweepSummary {
            iterations: 3,
            stop_reason: StopReason::MediaSizeReached,
            peak_iops: result(512),
            peak_bandwidth: result(2048),
        };

        let mut out = Vec::new();
        let mut reporter = JsonReporter::new(&mut out);
        reporter.report(&result(512)).unwrap();
        reporter.finish(&summary).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<Value> = text
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1]["type"], "summary");
        assert_eq!(lines[1]["iterations"], 3);
        assert_eq!(lines[1]["stop_reason"], "media_size_reached");
        assert_eq!(lines[1]["peak_bandwidth"]["block_size_bytes"], 2048);
    }
}
