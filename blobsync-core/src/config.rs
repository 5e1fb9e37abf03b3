//! Home-rooted YAML configuration.
//!
//! # Storage layout
//!
//! ```text
//! ~/.blobsync/
//!   config.yaml            (store roots, mode 0600)
//!   remotes/               (mode 0700)
//!     <remote_name>.yaml   (one file per remote, mode 0600)
//! ```
//!
//! # API pattern
//!
//! Every function has two forms:
//! - `fn_at(home: &Path, …)`: explicit home; used in tests with `TempDir`
//! - `fn(…)`: derives home from `dirs::home_dir()`, delegates to `_at`
//!
//! Tests must NEVER call the no-arg wrappers; always use `_at`.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::folder::FolderStorage;
use crate::remote::RemoteStorage;

/// Name used when the user does not pick one.
pub const DEFAULT_REMOTE: &str = "primary";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Where local build artifacts and source packs live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// `<artifact_root>/<package>/<artifact>/`
    pub artifact_root: PathBuf,
    /// `<source_cache>/packs/{tar.bz2,tar.gz,zip}/<pack>`
    pub source_cache: PathBuf,
}

/// Storage provider behind a named remote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum Provider {
    /// A local or mounted directory used as the remote namespace root.
    Folder { root: PathBuf },
}

impl Provider {
    pub fn name(&self) -> &'static str {
        match self {
            Provider::Folder { .. } => "folder",
        }
    }

    /// Build a storage handle for this provider.
    pub fn connect(&self) -> Box<dyn RemoteStorage> {
        match self {
            Provider::Folder { root } => Box::new(FolderStorage::new(root.clone())),
        }
    }
}

/// A named remote as stored in `remotes/<name>.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub name: String,
    #[serde(flatten)]
    pub provider: Provider,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// 1. Path helpers
// ---------------------------------------------------------------------------

/// `<home>/.blobsync/`
pub fn config_root(home: &Path) -> PathBuf {
    home.join(".blobsync")
}

/// `<home>/.blobsync/config.yaml`
pub fn store_config_path_at(home: &Path) -> PathBuf {
    config_root(home).join("config.yaml")
}

/// `<home>/.blobsync/remotes/`
pub fn remotes_dir(home: &Path) -> PathBuf {
    config_root(home).join("remotes")
}

/// `<home>/.blobsync/remotes/<name>.yaml`: pure, no I/O.
pub fn remote_path_at(home: &Path, name: &str) -> PathBuf {
    remotes_dir(home).join(format!("{name}.yaml"))
}

// ---------------------------------------------------------------------------
// 2. Store config
// ---------------------------------------------------------------------------

/// Load `config.yaml`; `CoreError::ConfigNotFound` when absent.
pub fn load_store_config_at(home: &Path) -> Result<StoreConfig, CoreError> {
    let path = store_config_path_at(home);
    if !path.exists() {
        return Err(CoreError::ConfigNotFound { path });
    }
    let contents = std::fs::read_to_string(&path)?;
    serde_yaml::from_str(&contents).map_err(|e| CoreError::Parse { path, source: e })
}

/// `load_store_config_at` convenience wrapper.
pub fn load_store_config() -> Result<StoreConfig, CoreError> {
    load_store_config_at(&home()?)
}

/// Atomically write `config.yaml`.
pub fn save_store_config_at(home: &Path, config: &StoreConfig) -> Result<(), CoreError> {
    ensure_dir(&config_root(home))?;
    let yaml = serde_yaml::to_string(config)?;
    write_atomic(&store_config_path_at(home), &yaml)
}

// ---------------------------------------------------------------------------
// 3. Remotes
// ---------------------------------------------------------------------------

/// Register (or replace) a remote.
pub fn add_remote_at(home: &Path, name: &str, provider: Provider) -> Result<RemoteConfig, CoreError> {
    validate_remote_name(name)?;
    let remote = RemoteConfig {
        name: name.to_string(),
        provider,
        created_at: Utc::now(),
    };
    ensure_dir(&remotes_dir(home))?;
    let yaml = serde_yaml::to_string(&remote)?;
    write_atomic(&remote_path_at(home, name), &yaml)?;
    Ok(remote)
}

/// Load a remote by name; `CoreError::RemoteNotFound` when absent.
pub fn load_remote_at(home: &Path, name: &str) -> Result<RemoteConfig, CoreError> {
    validate_remote_name(name)?;
    let path = remote_path_at(home, name);
    if !path.exists() {
        return Err(CoreError::RemoteNotFound {
            name: name.to_string(),
            path,
        });
    }
    let contents = std::fs::read_to_string(&path)?;
    serde_yaml::from_str(&contents).map_err(|e| CoreError::Parse { path, source: e })
}

/// `load_remote_at` convenience wrapper.
pub fn load_remote(name: &str) -> Result<RemoteConfig, CoreError> {
    load_remote_at(&home()?, name)
}

/// All configured remotes, sorted by name.
pub fn list_remotes_at(home: &Path) -> Result<Vec<RemoteConfig>, CoreError> {
    let dir = remotes_dir(home);
    if !dir.exists() {
        return Ok(vec![]);
    }
    let mut entries: Vec<_> = std::fs::read_dir(&dir)?
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
        .collect();
    entries.sort_by_key(|e| e.file_name());

    let mut remotes = Vec::new();
    for entry in entries {
        let fname = entry.file_name();
        if !fname.to_string_lossy().ends_with(".yaml") {
            continue;
        }
        let contents = std::fs::read_to_string(entry.path())?;
        let remote: RemoteConfig = serde_yaml::from_str(&contents)
            .map_err(|e| CoreError::Parse { path: entry.path(), source: e })?;
        remotes.push(remote);
    }
    Ok(remotes)
}

/// `list_remotes_at` convenience wrapper.
pub fn list_remotes() -> Result<Vec<RemoteConfig>, CoreError> {
    list_remotes_at(&home()?)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn home() -> Result<PathBuf, CoreError> {
    dirs::home_dir().ok_or(CoreError::HomeNotFound)
}

fn validate_remote_name(name: &str) -> Result<(), CoreError> {
    let ok = !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if ok {
        Ok(())
    } else {
        Err(CoreError::InvalidRemoteName(name.to_string()))
    }
}

/// Serialize → `.tmp` sibling → `chmod 0600` → `rename`.
fn write_atomic(path: &Path, contents: &str) -> Result<(), CoreError> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    std::fs::write(&tmp, contents)?;
    set_file_permissions(&tmp)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

fn ensure_dir(dir: &Path) -> Result<(), CoreError> {
    if !dir.exists() {
        std::fs::create_dir_all(dir)?;
        set_dir_permissions(dir)?;
    }
    Ok(())
}

#[cfg(unix)]
fn set_dir_permissions(path: &Path) -> Result<(), CoreError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_dir_permissions(_path: &Path) -> Result<(), CoreError> {
    Ok(())
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), CoreError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), CoreError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
