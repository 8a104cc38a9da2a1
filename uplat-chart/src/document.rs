use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use uplat_core::record::Sample;

use crate::error::ChartError;
use crate::svg::{self, PlacedPoint};

pub const X_LABEL: &str = "Time";
pub const Y_LABEL: &str = "Response Time (s)";

const TEMPLATE: &str = include_str!("template.html");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    /// Discrete markers, samples in encounter order.
    Scatter,
    /// Markers joined by a line, samples sorted by time.
    Line,
}

impl ChartKind {
    pub fn title(self) -> &'static str {
        match self {
            ChartKind::Scatter => "Upstream Response Time (Scatter Plot)",
            ChartKind::Line => "Upstream Response Time (Line Plot)",
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            ChartKind::Scatter => "scatter_plot.html",
            ChartKind::Line => "line_plot.html",
        }
    }
}

/// A rendered-once chart: title, axis labels and every sample it shows.
#[derive(Debug, Clone)]
pub struct ChartDocument {
    pub kind: ChartKind,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub samples: Vec<Sample>,
}

/// Data block embedded next to the SVG for the hover read-out.
#[derive(Serialize)]
struct EmbeddedData<'a> {
    title: &'a str,
    x_label: &'a str,
    y_label: &'a str,
    width: u32,
    height: u32,
    points: Vec<EmbeddedPoint>,
}

#[derive(Serialize)]
struct EmbeddedPoint {
    t: String,
    v: f64,
    x: i32,
    y: i32,
}

/// Stable sort by timestamp; equal timestamps keep their relative order.
pub fn sort_by_time(samples: &[Sample]) -> Vec<Sample> {
    let mut sorted = samples.to_vec();
    sorted.sort_by_key(|s| s.timestamp);
    sorted
}

impl ChartDocument {
    fn new(kind: ChartKind, samples: Vec<Sample>) -> Self {
        Self {
            kind,
            title: kind.title().to_string(),
            x_label: X_LABEL.to_string(),
            y_label: Y_LABEL.to_string(),
            samples,
        }
    }

    pub fn scatter(samples: &[Sample]) -> Self {
        Self::new(ChartKind::Scatter, samples.to_vec())
    }

    pub fn line(samples: &[Sample]) -> Self {
        Self::new(ChartKind::Line, sort_by_time(samples))
    }

    /// Full HTML page: inline SVG, embedded sample data and the hover script.
    pub fn render_html(&self, size: (u32, u32)) -> Result<String, ChartError> {
        let rendered = svg::draw(self, size)?;

        let data = EmbeddedData {
            title: &self.title,
            x_label: &self.x_label,
            y_label: &self.y_label,
            width: size.0,
            height: size.1,
            points: self
                .samples
                .iter()
                .zip(&rendered.points)
                .map(|(s, &PlacedPoint { x, y })| EmbeddedPoint {
                    t: s.timestamp.to_rfc3339(),
                    v: s.response_time,
                    x,
                    y,
                })
                .collect(),
        };
        // `</` would end the script element early
        let json = serde_json::to_string(&data)?.replace("</", "<\\/");

        Ok(TEMPLATE
            .replace("__TITLE__", &escape_html(&self.title))
            .replace("__COUNT__", &self.samples.len().to_string())
            .replace("__DATA__", &json)
            .replace("__SVG__", &rendered.svg))
    }

    /// Render and write to `dir/<file_name>`, replacing any existing file.
    /// Returns the absolute path written.
    pub fn write_to(&self, dir: &Path, size: (u32, u32)) -> Result<PathBuf, ChartError> {
        let html = self.render_html(size)?;
        let path = dir.join(self.kind.file_name());
        write_atomic(&path, html.as_bytes())?;
        absolute_path(&path).map_err(|source| ChartError::Write { path, source })
    }
}

/// Canonical path when it resolves, else the lexically absolute form.
fn absolute_path(path: &Path) -> std::io::Result<PathBuf> {
    fs::canonicalize(path).or_else(|_| std::path::absolute(path))
}

/// Write via a `.tmp` sibling and rename, so readers never see half a chart.
fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), ChartError> {
    let write_err = |source| ChartError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
    }

    let tmp = path.with_extension("html.tmp");
    fs::write(&tmp, contents).map_err(write_err)?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(write_err(e));
    }
    debug!(path = %path.display(), bytes = contents.len(), "chart written");
    Ok(())
}

/// `title` is a public field, so callers may put markup-significant text in
/// it; it lands inside `<title>`.
fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use uplat_core::record::parse_time_local;

    fn at(ts: &str, v: f64) -> Sample {
        Sample {
            timestamp: parse_time_local(ts).unwrap(),
            response_time: v,
        }
    }

    #[test]
    fn scatter_keeps_encounter_order() {
        let samples = vec![
            at("01/Nov/2025:03:35:52 +0800", 0.120),
            at("01/Nov/2025:03:35:50 +0800", 0.200),
        ];
        let doc = ChartDocument::scatter(&samples);
        assert_eq!(doc.samples, samples);
        assert_eq!(doc.title, "Upstream Response Time (Scatter Plot)");
    }

    #[test]
    fn line_sorts_by_time() {
        let samples = vec![
            at("01/Nov/2025:03:35:52 +0800", 0.120),
            at("01/Nov/2025:03:35:50 +0800", 0.200),
        ];
        let doc = ChartDocument::line(&samples);
        assert_eq!(doc.samples, vec![samples[1], samples[0]]);
        assert_eq!(doc.title, "Upstream Response Time (Line Plot)");
    }

    #[test]
    fn sort_is_stable_for_equal_timestamps() {
        let samples = vec![
            at("01/Nov/2025:03:35:52 +0800", 3.0),
            at("01/Nov/2025:03:35:50 +0800", 1.0),
            at("01/Nov/2025:03:35:52 +0800", 0.5),
            at("01/Nov/2025:03:35:50 +0800", 2.0),
        ];
        let sorted = sort_by_time(&samples);
        let values: Vec<f64> = sorted.iter().map(|s| s.response_time).collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0, 0.5]);
        // Idempotent
        assert_eq!(sort_by_time(&sorted), sorted);
    }

    #[test]
    fn sort_compares_instants_across_offsets() {
        // 03:00 +0800 is 19:00 UTC the previous day, earlier than 20:00 +0000
        let samples = vec![
            at("31/Oct/2025:20:00:00 +0000", 1.0),
            at("01/Nov/2025:03:00:00 +0800", 2.0),
        ];
        let sorted = sort_by_time(&samples);
        assert_eq!(sorted[0].response_time, 2.0);
    }

    #[test]
    fn html_is_self_contained() {
        let samples = vec![at("01/Nov/2025:03:35:52 +0800", 0.120)];
        let html = ChartDocument::scatter(&samples).render_html((640, 480)).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Upstream Response Time (Scatter Plot)</title>"));
        assert!(html.contains("<svg"));
        assert!(html.contains("2025-11-01T03:35:52+08:00"));
        assert!(!html.contains("__SVG__"));
        assert!(!html.contains("__DATA__"));
        assert!(!html.contains("<script src="));
        assert!(!html.contains("<link"));
    }

    #[test]
    fn escape_html_handles_markup() {
        assert_eq!(escape_html("a<b>&\"c'"), "a&lt;b&gt;&amp;&quot;c&#39;");
    }

    #[test]
    fn custom_title_is_escaped_in_html() {
        let mut doc = ChartDocument::scatter(&[at("01/Nov/2025:03:35:52 +0800", 0.120)]);
        doc.title = "p99 <edge> & \"origin\"".to_string();
        let html = doc.render_html((640, 480)).unwrap();
        assert!(html.contains("<title>p99 &lt;edge&gt; &amp; &quot;origin&quot;</title>"));
    }

    #[test]
    fn absolute_path_falls_back_for_unwritten_relative_path() {
        let rel = Path::new("not-written-yet/line_plot.html");
        let abs = absolute_path(rel).unwrap();
        assert!(abs.is_absolute());
        assert!(abs.ends_with("not-written-yet/line_plot.html"));
    }

    #[test]
    fn write_to_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("line_plot.html");
        fs::write(&target, "stale").unwrap();

        let samples = vec![at("01/Nov/2025:03:35:52 +0800", 0.120)];
        let written = ChartDocument::line(&samples)
            .write_to(dir.path(), (640, 480))
            .unwrap();

        assert!(written.is_absolute());
        assert_eq!(written, fs::canonicalize(&target).unwrap());
        let body = fs::read_to_string(&target).unwrap();
        assert!(body.contains("Upstream Response Time (Line Plot)"));
        assert!(!dir.path().join("line_plot.html.tmp").exists());
    }
}
