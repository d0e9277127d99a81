//! Closing steps of an export run.

use std::path::Path;

use chrono::{DateTime, Local, TimeZone, Utc};
use spaceback_history::ArchiveHistory;
use tracing::{info, warn};

use crate::error::ExportError;
use crate::html::render_start_page;
use crate::manifest::Manifest;
use crate::model::Space;

/// Entry document at the archive root.
pub const START_PAGE_FILE: &str = "start-here.html";

/// What the finalizer needs to know about the finished run.
#[derive(Debug)]
pub struct RunSummary<'a> {
    /// Exported space.
    pub space: &'a Space,
    /// When the run started; becomes the new manifest time.
    pub started_at: DateTime<Utc>,
    /// Whether to commit the archive.
    pub history: bool,
}

/// Write the start page, advance the manifest and commit the archive.
///
/// The manifest always moves to the run start time. Failed items have no
/// document left in the archive, so the next run retries them. Returns the
/// commit id, `None` when history is disabled or nothing changed.
pub fn finalize(
    root: &Path,
    manifest: &Manifest,
    run: &RunSummary<'_>,
) -> Result<Option<String>, ExportError> {
    write_start_page(root, run.space)?;

    manifest.store(run.started_at)?;

    if !run.history {
        return Ok(None);
    }
    let history = ArchiveHistory::open_or_init(root)?;
    let commit = history.commit_all(&commit_message(run.started_at, &Local))?;
    if commit.is_none() {
        info!("Archive unchanged, nothing to commit");
    }
    Ok(commit)
}

/// History commit message, stamped with the run start in `tz`.
fn commit_message<Tz: TimeZone>(started_at: DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!(
        "space backup of {}",
        started_at.with_timezone(tz).format("%Y-%m-%d %H:%M:%S%.6f")
    )
}

fn write_start_page(root: &Path, space: &Space) -> Result<(), ExportError> {
    let Some(homepage) = space.homepage_id.as_deref() else {
        warn!("Space {} has no homepage; not writing {}", space.key, START_PAGE_FILE);
        return Ok(());
    };
    let path = root.join(START_PAGE_FILE);
    std::fs::write(&path, render_start_page(homepage)).map_err(|e| ExportError::io(path, e))
}
