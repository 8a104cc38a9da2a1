//! Directory scan and line-by-line reading of rotated access logs.
//!
//! Failure isolation is per unit of work: a bad line is skipped, an
//! unreadable file is skipped, and only an unreadable input directory
//! aborts the run.

use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::UplatConfig;
use crate::error::UplatError;
use crate::extract::{Extracted, Extractor};
use crate::record::Sample;

/// Counters for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseStats {
    pub files_read: usize,
    pub lines_read: usize,
    pub samples: usize,
    pub malformed: usize,
    pub incomplete: usize,
}

/// A candidate log file that could not be read.
#[derive(Debug, Clone)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Everything gathered from one input directory.
#[derive(Debug, Default)]
pub struct ParseReport {
    /// Samples in encounter order (file order, then line order).
    pub samples: Vec<Sample>,
    pub stats: ParseStats,
    pub skipped_files: Vec<SkippedFile>,
}

/// Reads every `<prefix>*` file in a directory through an [`Extractor`].
#[derive(Debug, Clone)]
pub struct LogReader {
    prefix: String,
    extractor: Extractor,
}

/// List regular files in `dir` whose name starts with `prefix`, in
/// directory enumeration order.
pub fn scan(dir: &Path, prefix: &str) -> Result<Vec<PathBuf>, UplatError> {
    let entries = fs::read_dir(dir).map_err(|source| UplatError::InputDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "Skipping unreadable directory entry");
                continue;
            }
        };
        let name = entry.file_name();
        if !name.to_string_lossy().starts_with(prefix) {
            continue;
        }
        let path = entry.path();
        if !path.is_file() {
            debug!(path = %path.display(), "Ignoring non-file match");
            continue;
        }
        files.push(path);
    }
    Ok(files)
}

impl LogReader {
    pub fn new(prefix: impl Into<String>, extractor: Extractor) -> Self {
        Self {
            prefix: prefix.into(),
            extractor,
        }
    }

    pub fn from_config(config: &UplatConfig) -> Self {
        Self::new(
            config.input.prefix.clone(),
            Extractor::new(config.extract.missing_response_time),
        )
    }

    /// Read every matching file in `dir`.
    pub fn read_dir(&self, dir: &Path) -> Result<ParseReport, UplatError> {
        let files = scan(dir, &self.prefix)?;
        info!(dir = %dir.display(), files = files.len(), "Scanning access logs");

        let mut report = ParseReport::default();
        for path in files {
            match self.read_file(&path, &mut report) {
                Ok(()) => report.stats.files_read += 1,
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "Skipping unreadable file");
                    report.skipped_files.push(SkippedFile {
                        path,
                        reason: e.to_string(),
                    });
                }
            }
        }
        Ok(report)
    }

    /// Read one file into `report`. Samples taken before a mid-file read
    /// error stay in the report.
    pub fn read_file(&self, path: &Path, report: &mut ParseReport) -> Result<(), UplatError> {
        let unreadable = |source| UplatError::UnreadableFile {
            path: path.to_path_buf(),
            source,
        };
        let file = File::open(path).map_err(unreadable)?;
        let source = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.read_lines(&source, BufReader::new(file), report)
            .map_err(unreadable)
    }

    /// Feed each line of `reader` through the extractor. `source` names the
    /// input in diagnostics.
    pub fn read_lines<R: BufRead>(
        &self,
        source: &str,
        reader: R,
        report: &mut ParseReport,
    ) -> std::io::Result<()> {
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let line_no = idx + 1;
            report.stats.lines_read += 1;

            match self.extractor.extract_line(&line) {
                Ok(Extracted::Sample(sample)) => {
                    report.stats.samples += 1;
                    report.samples.push(sample);
                }
                Ok(Extracted::Blank) => {}
                Ok(Extracted::Incomplete(field)) => {
                    report.stats.incomplete += 1;
                    debug!(file = %source, line = line_no, missing = field, "Incomplete record");
                }
                Err(e) => {
                    report.stats.malformed += 1;
                    warn!(
                        file = %source,
                        line = line_no,
                        error = %e,
                        "Skipping malformed line: {}",
                        line.trim()
                    );
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MissingResponseTime;
    use std::io::Cursor;

    fn reader() -> LogReader {
        LogReader::new("access.log-", Extractor::default())
    }

    #[test]
    fn read_lines_keeps_encounter_order() {
        let input = concat!(
            r#"{"time_local":"01/Nov/2025:03:35:52 +0800","upstream_response_time":"0.120"}"#,
            "\n",
            r#"{"time_local":"01/Nov/2025:03:35:50 +0800","upstream_response_time":"0.050, 0.200"}"#,
            "\n",
        );
        let mut report = ParseReport::default();
        reader().read_lines("access.log-1", Cursor::new(input), &mut report).unwrap();

        let values: Vec<f64> = report.samples.iter().map(|s| s.response_time).collect();
        assert_eq!(values, vec![0.120, 0.200]);
        assert_eq!(report.stats.lines_read, 2);
        assert_eq!(report.stats.samples, 2);
    }

    #[test]
    fn malformed_lines_do_not_grow_samples() {
        let input = concat!(
            "{not json\n",
            r#"{"time_local":"bad","upstream_response_time":"0.1"}"#,
            "\n",
            r#"{"time_local":"01/Nov/2025:03:35:50 +0800","upstream_response_time":"x"}"#,
            "\n",
            r#"{"time_local":"01/Nov/2025:03:35:50 +0800","upstream_response_time":"0.3"}"#,
            "\n",
        );
        let mut report = ParseReport::default();
        reader().read_lines("access.log-2", Cursor::new(input), &mut report).unwrap();
        assert_eq!(report.stats.malformed, 3);
        assert_eq!(report.samples.len(), 1);
        assert_eq!(report.samples[0].response_time, 0.3);
    }

    #[test]
    fn incomplete_records_are_counted_not_sampled() {
        let input = concat!(
            r#"{"upstream_response_time":"0.3"}"#,
            "\n\n",
            r#"{"time_local":"01/Nov/2025:03:35:50 +0800"}"#,
            "\n",
        );
        let skip = LogReader::new("access.log-", Extractor::new(MissingResponseTime::Skip));
        let mut report = ParseReport::default();
        skip.read_lines("access.log-3", Cursor::new(input), &mut report).unwrap();
        assert_eq!(report.stats.incomplete, 2);
        assert_eq!(report.stats.lines_read, 3);
        assert!(report.samples.is_empty());
    }

    #[test]
    fn invalid_utf8_surfaces_as_io_error() {
        let bytes: &[u8] = b"{\"time_local\":\"\xff\"}\n";
        let mut report = ParseReport::default();
        assert!(reader().read_lines("access.log-4", Cursor::new(bytes), &mut report).is_err());
    }

    #[test]
    fn scan_missing_dir_is_input_dir_error() {
        let err = scan(Path::new("/definitely/not/here"), "access.log-").unwrap_err();
        assert!(matches!(err, UplatError::InputDir { .. }));
    }
}
