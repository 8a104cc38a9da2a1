use crate::config::MissingResponseTime;
use crate::error::MalformedRecord;
use crate::record::{LogRecord, Sample, parse_time_local};

/// Turns raw log lines into samples.
///
/// A sample is only produced when both the timestamp and the response time
/// were extracted, so timestamps and latencies can never drift out of step.
#[derive(Debug, Clone, Copy, Default)]
pub struct Extractor {
    missing_response_time: MissingResponseTime,
}

/// Result of looking at one line that was not malformed.
#[derive(Debug, Clone, PartialEq)]
pub enum Extracted {
    Sample(Sample),
    /// Whitespace-only line.
    Blank,
    /// Valid record lacking a field required for a sample.
    Incomplete(&'static str),
}

impl Extractor {
    pub fn new(missing_response_time: MissingResponseTime) -> Self {
        Self { missing_response_time }
    }

    pub fn extract_line(&self, line: &str) -> Result<Extracted, MalformedRecord> {
        if line.trim().is_empty() {
            return Ok(Extracted::Blank);
        }

        let record = LogRecord::from_line(line)?;

        let timestamp = match record.time_local() {
            Some(value) => Some(parse_time_local(value)?),
            None => None,
        };

        let response_time = match &record.upstream_response_time {
            Some(field) => Some(field.seconds()?),
            None => match self.missing_response_time {
                MissingResponseTime::Zero => Some(0.0),
                MissingResponseTime::Skip => None,
            },
        };

        match (timestamp, response_time) {
            (Some(timestamp), Some(response_time)) => Ok(Extracted::Sample(Sample {
                timestamp,
                response_time,
            })),
            (None, _) => Ok(Extracted::Incomplete("time_local")),
            (_, None) => Ok(Extracted::Incomplete("upstream_response_time")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(ex: Extracted) -> Sample {
        match ex {
            Extracted::Sample(s) => s,
            other => panic!("expected sample, got {other:?}"),
        }
    }

    #[test]
    fn extracts_single_value() {
        let ex = Extractor::default()
            .extract_line(r#"{"time_local":"01/Nov/2025:03:35:52 +0800","upstream_response_time":"0.120"}"#)
            .unwrap();
        let s = sample(ex);
        assert_eq!(s.response_time, 0.120);
        assert_eq!(s.timestamp.to_rfc3339(), "2025-11-01T03:35:52+08:00");
    }

    #[test]
    fn extracts_last_of_retried_values() {
        let ex = Extractor::default()
            .extract_line(r#"{"time_local":"01/Nov/2025:03:35:50 +0800","upstream_response_time":"0.050, 0.200"}"#)
            .unwrap();
        assert_eq!(sample(ex).response_time, 0.200);
    }

    #[test]
    fn absent_response_time_defaults_to_zero() {
        let ex = Extractor::default()
            .extract_line(r#"{"time_local":"01/Nov/2025:03:35:50 +0800"}"#)
            .unwrap();
        assert_eq!(sample(ex).response_time, 0.0);
    }

    #[test]
    fn absent_response_time_skipped_under_skip_policy() {
        let ex = Extractor::new(MissingResponseTime::Skip)
            .extract_line(r#"{"time_local":"01/Nov/2025:03:35:50 +0800"}"#)
            .unwrap();
        assert_eq!(ex, Extracted::Incomplete("upstream_response_time"));
    }

    #[test]
    fn missing_timestamp_never_yields_a_sample() {
        let ex = Extractor::default()
            .extract_line(r#"{"upstream_response_time":"0.3"}"#)
            .unwrap();
        assert_eq!(ex, Extracted::Incomplete("time_local"));
    }

    #[test]
    fn blank_lines_are_not_errors() {
        assert_eq!(Extractor::default().extract_line("   ").unwrap(), Extracted::Blank);
        assert_eq!(Extractor::default().extract_line("").unwrap(), Extracted::Blank);
    }

    #[test]
    fn malformed_lines_are_errors() {
        let ex = Extractor::default();
        assert!(matches!(ex.extract_line("{oops"), Err(MalformedRecord::Json(_))));
        assert!(matches!(
            ex.extract_line(r#"{"time_local":"yesterday","upstream_response_time":"0.1"}"#),
            Err(MalformedRecord::Timestamp { .. })
        ));
        assert!(matches!(
            ex.extract_line(r#"{"time_local":"01/Nov/2025:03:35:50 +0800","upstream_response_time":"-"}"#),
            Err(MalformedRecord::ResponseTime { .. })
        ));
    }

    #[test]
    fn json_arrays_are_malformed_not_samples() {
        let ex = Extractor::default();
        assert!(matches!(
            ex.extract_line(r#"["01/Nov/2025:03:35:52 +0800","0.5"]"#),
            Err(MalformedRecord::NotAnObject)
        ));
        assert!(matches!(ex.extract_line("[]"), Err(MalformedRecord::NotAnObject)));
    }

    #[test]
    fn bad_response_time_is_reported_even_without_timestamp() {
        let ex = Extractor::default().extract_line(r#"{"upstream_response_time":"n/a"}"#);
        assert!(matches!(ex, Err(MalformedRecord::ResponseTime { .. })));
    }
}
