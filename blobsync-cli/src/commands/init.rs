//! `blobsync init --artifact-root <dir> --source-cache <dir>`

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use blobsync_core::config::{self, StoreConfig};

/// Record the local store layout in ~/.blobsync/config.yaml.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Directory holding `<package>/<artifact>/` build outputs.
    #[arg(long, value_name = "DIR")]
    pub artifact_root: PathBuf,

    /// Directory holding `packs/{tar.bz2,tar.gz,zip}/` source packs.
    #[arg(long, value_name = "DIR")]
    pub source_cache: PathBuf,
}

impl InitArgs {
    pub fn run(self) -> Result<()> {
        let home: PathBuf = dirs::home_dir().context("could not determine home directory")?;
        let store = StoreConfig {
            artifact_root: resolve(&self.artifact_root)?,
            source_cache: resolve(&self.source_cache)?,
        };
        config::save_store_config_at(&home, &store).context("failed to save store config")?;

        println!("✓ Store configured");
        println!("  artifacts:    {}", store.artifact_root.display());
        println!("  source packs: {}", store.source_cache.display());
        println!(
            "  Saved to: {}",
            config::store_config_path_at(&home).display()
        );
        Ok(())
    }
}

fn resolve(path: &Path) -> Result<PathBuf> {
    path.canonicalize()
        .with_context(|| format!("cannot resolve path '{}'", path.display()))
}
