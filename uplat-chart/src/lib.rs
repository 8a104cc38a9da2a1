pub mod document;
pub mod error;
pub mod svg;

pub use document::{ChartDocument, ChartKind, sort_by_time};
pub use error::ChartError;

use std::path::{Path, PathBuf};
use tracing::debug;
use uplat_core::record::Sample;

/// What a render pass produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    /// No samples; nothing was written.
    NoData,
    Written { scatter: PathBuf, line: PathBuf },
}

/// Render the scatter plot (encounter order) and the line plot (time order)
/// into `out_dir`. Reporting the outcome to the user is left to the caller.
pub fn render_all(
    samples: &[Sample],
    out_dir: &Path,
    size: (u32, u32),
) -> Result<RenderOutcome, ChartError> {
    if samples.is_empty() {
        debug!("no samples, skipping charts");
        return Ok(RenderOutcome::NoData);
    }

    let scatter = ChartDocument::scatter(samples).write_to(out_dir, size)?;
    debug!(path = %scatter.display(), "scatter plot written");

    let line = ChartDocument::line(samples).write_to(out_dir, size)?;
    debug!(path = %line.display(), "line plot written");

    Ok(RenderOutcome::Written { scatter, line })
}
