//! `spaceback export` command implementation.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use clap::Args;
use spaceback_config::CliSettings;
use spaceback_export::{
    ContentKind, ExportEngine, ExportOptions, ExportReport, ItemOutcome, Progress,
};

use super::{ServerArgs, connect};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the export command.
#[derive(Args)]
pub(crate) struct ExportArgs {
    /// Key of the space to export.
    #[arg(short, long)]
    key: String,

    #[command(flatten)]
    server: ServerArgs,

    /// Directory holding the `ConfluenceBackup_<KEY>` archive (overrides config).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Do not export pages.
    #[arg(long)]
    no_pages: bool,

    /// Do not export blog posts.
    #[arg(long)]
    no_blog: bool,

    /// Do not download attachments.
    #[arg(long)]
    no_attachments: bool,

    /// Do not commit the archive to its git history.
    #[arg(long)]
    no_history: bool,

    /// Only rewrite blog posts changed since the last backup.
    #[arg(long)]
    incremental_blogs: bool,

    /// Number of items exported in parallel (overrides config).
    #[arg(short = 'j', long)]
    threads: Option<usize>,
}

impl ExportArgs {
    /// Execute the export command.
    ///
    /// # Errors
    ///
    /// Returns an error if the export cannot run or any item failed.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let config = self.server.load_config(self.cli_settings())?;
        let export = &config.export_resolved;
        let client = connect(&config, &output)?;

        let options = ExportOptions {
            space_key: self.key.clone(),
            output_root: export.output_root(&self.key),
            pages: export.pages,
            blog: export.blog,
            attachments: export.attachments,
            history: export.history,
            incremental_blogs: export.incremental_blogs,
            threads: export.threads,
        };
        output.info(&format!(
            "Exporting space {} to {}",
            self.key,
            options.output_root.display()
        ));

        let progress = CliProgress::new(output.clone());
        let report = ExportEngine::new(&client, options).run(&progress)?;
        print_report(&output, &report);

        if report.is_complete() {
            Ok(())
        } else {
            Err(CliError::IncompleteExport(report.failures.len()))
        }
    }

    fn cli_settings(&self) -> CliSettings {
        CliSettings {
            backup_dir: self.output.clone(),
            pages: self.no_pages.then_some(false),
            blog: self.no_blog.then_some(false),
            attachments: self.no_attachments.then_some(false),
            history: self.no_history.then_some(false),
            incremental_blogs: self.incremental_blogs.then_some(true),
            threads: self.threads,
            ..Default::default()
        }
    }
}

/// Prints phase headers and a running count of finished items.
struct CliProgress {
    output: Output,
    total: AtomicUsize,
    done: AtomicUsize,
}

impl CliProgress {
    fn new(output: Output) -> Self {
        Self {
            output,
            total: AtomicUsize::new(0),
            done: AtomicUsize::new(0),
        }
    }
}

impl Progress for CliProgress {
    fn phase(&self, name: &str, total: usize) {
        self.total.store(total, Ordering::Relaxed);
        self.done.store(0, Ordering::Relaxed);
        self.output.info(&format!("{name} ({total})..."));
    }

    fn item(&self, kind: ContentKind, id: &str, outcome: ItemOutcome) {
        let done = self.done.fetch_add(1, Ordering::Relaxed) + 1;
        let total = self.total.load(Ordering::Relaxed);
        match outcome {
            ItemOutcome::Written => self.output.info(&format!("  [{done}/{total}] {kind} {id}")),
            ItemOutcome::Skipped => {}
            ItemOutcome::Failed => self
                .output
                .warning(&format!("  [{done}/{total}] {kind} {id} failed")),
        }
    }
}

fn print_report(output: &Output, report: &ExportReport) {
    output.highlight(&format!(
        "\nSpace {} ({})",
        report.space.key, report.space.name
    ));
    output.info(&format!("Archive: {}", report.output_root.display()));
    output.info(&format!(
        "Pages: {} written, {} unchanged",
        report.pages_written, report.pages_skipped
    ));
    output.info(&format!(
        "Blog posts: {} written, {} unchanged",
        report.blogs_written, report.blogs_skipped
    ));
    output.info(&format!(
        "Attachments: {} downloaded, {} unchanged",
        report.attachments_downloaded, report.attachments_skipped
    ));
    if let Some(commit) = &report.commit {
        output.info(&format!("History commit: {commit}"));
    }

    if report.failures.is_empty() {
        output.success("\nBackup complete.");
    } else {
        output.warning(&format!(
            "\n{} item(s) failed and will be retried on the next run:",
            report.failures.len()
        ));
        for failure in &report.failures {
            output.info(&format!("  - {} {}: {}", failure.kind, failure.id, failure.message));
        }
    }
}
