//! blobsync: push build artifacts and source packs to a remote blob store.
//!
//! # Usage
//!
//! ```text
//! blobsync init --artifact-root <dir> --source-cache <dir>
//! blobsync remote add [NAME] --root <dir>
//! blobsync remote show [-v] [--json]
//! blobsync push [NAME] [--dry-run] [--force] [--objects build|source|build_and_source]
//! ```

mod commands {
    pub mod init;
    pub mod push;
    pub mod remote;
}

use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use clap::{Parser, Subcommand};

use blobsync_sync::PushScope;
use commands::{init::InitArgs, push::PushArgs, remote::RemoteCommand};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "blobsync",
    version,
    about = "Push build artifacts and source packs to a remote blob store",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Record where the local artifact root and source cache live.
    Init(InitArgs),

    /// Manage named remotes.
    Remote {
        #[command(subcommand)]
        command: RemoteCommand,
    },

    /// Push new artifacts and source packs to a remote.
    Push(PushArgs),
}

// ---------------------------------------------------------------------------
// Shared object-scope argument
// ---------------------------------------------------------------------------

/// Thin wrapper so clap can parse `PushScope` from CLI args.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectsArg(pub PushScope);

impl FromStr for ObjectsArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "build" => Ok(Self(PushScope::Build)),
            "source" => Ok(Self(PushScope::Source)),
            "build_and_source" | "both" => Ok(Self(PushScope::BuildAndSource)),
            other => Err(format!(
                "unknown object class '{other}'; expected: build, source, build_and_source"
            )),
        }
    }
}

impl fmt::Display for ObjectsArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.0 {
            PushScope::Build => "build",
            PushScope::Source => "source",
            PushScope::BuildAndSource => "build_and_source",
        };
        f.write_str(label)
    }
}

impl From<ObjectsArg> for PushScope {
    fn from(arg: ObjectsArg) -> Self {
        arg.0
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Commands::Init(args) => args.run(),
        Commands::Remote { command } => commands::remote::run(command),
        Commands::Push(args) => args.run(),
    }
}

/// Logs go to stderr so stdout stays reserved for command output.
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
