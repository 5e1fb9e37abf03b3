//! `blobsync remote add [NAME] --root <dir>` and `blobsync remote show`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use blobsync_core::config::{self, Provider, RemoteConfig, DEFAULT_REMOTE};

/// Manage named remotes under ~/.blobsync/remotes/.
#[derive(Subcommand, Debug)]
pub enum RemoteCommand {
    /// Register (or replace) a folder-backed remote.
    Add(AddArgs),

    /// List configured remotes.
    Show(ShowArgs),
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Remote name. Defaults to "primary".
    pub name: Option<String>,

    /// Directory used as the remote namespace root.
    #[arg(long, value_name = "DIR")]
    pub root: PathBuf,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Include provider details and creation time.
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

pub fn run(cmd: RemoteCommand) -> Result<()> {
    match cmd {
        RemoteCommand::Add(args) => add(args),
        RemoteCommand::Show(args) => show(args),
    }
}

fn add(args: AddArgs) -> Result<()> {
    let home: PathBuf = dirs::home_dir().context("could not determine home directory")?;
    let name = args.name.unwrap_or_else(|| DEFAULT_REMOTE.to_string());
    let root = args
        .root
        .canonicalize()
        .with_context(|| format!("cannot resolve path '{}'", args.root.display()))?;

    let remote = config::add_remote_at(&home, &name, Provider::Folder { root: root.clone() })
        .with_context(|| format!("failed to add remote '{name}'"))?;

    println!("✓ Remote '{}' -> {}", remote.name, root.display());
    println!(
        "  Saved to: {}",
        config::remote_path_at(&home, &remote.name).display()
    );
    Ok(())
}

#[derive(Serialize)]
struct RemoteJson {
    name: String,
    provider: &'static str,
    root: String,
    created_at: String,
    default: bool,
}

#[derive(Tabled)]
struct RemoteRow {
    #[tabled(rename = "name")]
    name: String,
    #[tabled(rename = "provider")]
    provider: String,
    #[tabled(rename = "root")]
    root: String,
    #[tabled(rename = "added")]
    added: String,
}

fn show(args: ShowArgs) -> Result<()> {
    let remotes = config::list_remotes().context("failed to read remotes")?;

    if args.json {
        let payload: Vec<RemoteJson> = remotes.iter().map(to_json).collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&payload).context("failed to serialize remotes JSON")?
        );
        return Ok(());
    }

    if remotes.is_empty() {
        println!("No remotes configured.");
        println!("Run: blobsync remote add {DEFAULT_REMOTE} --root <dir>");
        return Ok(());
    }

    if !args.verbose {
        for remote in &remotes {
            if remote.name == DEFAULT_REMOTE {
                println!("{}", remote.name.bold());
            } else {
                println!("{}", remote.name);
            }
        }
        return Ok(());
    }

    let rows: Vec<RemoteRow> = remotes
        .iter()
        .map(|remote| RemoteRow {
            name: remote.name.clone(),
            provider: remote.provider.name().to_string(),
            root: provider_root(&remote.provider),
            added: remote.created_at.format("%Y-%m-%d %H:%M").to_string(),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    Ok(())
}

fn to_json(remote: &RemoteConfig) -> RemoteJson {
    RemoteJson {
        name: remote.name.clone(),
        provider: remote.provider.name(),
        root: provider_root(&remote.provider),
        created_at: remote.created_at.to_rfc3339(),
        default: remote.name == DEFAULT_REMOTE,
    }
}

fn provider_root(provider: &Provider) -> String {
    match provider {
        Provider::Folder { root } => root.display().to_string(),
    }
}
