//! `blobsync push [NAME] [--dry-run] [--force] [--objects ...]`

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use blobsync_core::config::{self, DEFAULT_REMOTE};
use blobsync_sync::{
    pipeline::{self, PushOptions},
    DryRunReport, LogProgress, PushOutcome, PushScope, RemoteManifestStatus,
};

use super::super::ObjectsArg;

/// Arguments for `blobsync push`.
#[derive(Args, Debug)]
pub struct PushArgs {
    /// Remote to push to. Defaults to "primary".
    pub remote: Option<String>,

    /// Show what would be pushed, based on the last local manifest copy.
    #[arg(long)]
    pub dry_run: bool,

    /// Push items even when the manifest already records them.
    #[arg(long)]
    pub force: bool,

    /// Object classes to push: build | source | build_and_source.
    #[arg(long, value_name = "OBJECTS", default_value = "build_and_source")]
    pub objects: ObjectsArg,
}

impl PushArgs {
    pub fn run(self) -> Result<()> {
        let store = config::load_store_config()?;
        let options = PushOptions { force: self.force };
        let scope: PushScope = self.objects.into();

        if self.dry_run {
            let reports = pipeline::run_dry(&store, scope, options).context("dry run failed")?;
            for report in &reports {
                print_report(report);
            }
            return Ok(());
        }

        let name = self.remote.unwrap_or_else(|| DEFAULT_REMOTE.to_string());
        let remote = config::load_remote(&name)?;
        tracing::debug!("pushing to remote '{name}' ({})", remote.provider.name());
        let storage = remote.provider.connect();
        let outcomes = pipeline::run(&store, scope, storage.as_ref(), &LogProgress, options)
            .with_context(|| format!("push to '{name}' failed"))?;
        for outcome in &outcomes {
            print_outcome(&name, outcome);
        }
        Ok(())
    }
}

fn print_report(report: &DryRunReport) {
    println!("[dry-run] {} manifest", report.kind);
    print!("{}", report.render());
}

fn print_outcome(remote: &str, outcome: &PushOutcome) {
    let label = outcome.kind.items_label();
    if outcome.pushed.is_empty() {
        println!(
            "✓ {} — nothing to push ({} {label} already on '{remote}')",
            outcome.kind, outcome.skipped
        );
    } else {
        println!(
            "✓ {} — pushed {} {label} to '{remote}' ({} skipped)",
            outcome.kind,
            outcome.pushed.len(),
            outcome.skipped
        );
    }
    for item in &outcome.pushed {
        match item.entry.digest() {
            Some(digest) => println!(
                "  ↑  {}  {}",
                item.remote_path,
                &digest[..digest.len().min(12)]
            ),
            None => println!("  ↑  {}", item.remote_path),
        }
    }
    if !matches!(
        outcome.remote_status,
        RemoteManifestStatus::Fetched | RemoteManifestStatus::NotFound
    ) {
        println!(
            "  {}",
            "remote manifest was unavailable; every local item was considered new".yellow()
        );
    }
}
