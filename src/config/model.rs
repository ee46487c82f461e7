use std::path::PathBuf;

use serde::Deserialize;

use crate::types::Credentials;

/// Raw file shape. Every key is optional; /etc/xtravault.yaml may be
/// absent entirely and the built-in defaults still give a working setup.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default, rename = "backupRoot")]
    pub backup_root: Option<String>,
    #[serde(default, rename = "dataDir")]
    pub data_dir: Option<String>,
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default, rename = "ownerUser")]
    pub owner_user: Option<String>,
    #[serde(default, rename = "ownerGroup")]
    pub owner_group: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default, rename = "targetUser")]
    pub target_user: Option<String>,
    #[serde(default, rename = "targetHost")]
    pub target_host: Option<String>,
}

/// Fully resolved settings a subcommand runs with: file values overlaid
/// with CLI flags, defaults filled in, paths made absolute.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub backup_root: PathBuf,
    pub data_dir: PathBuf,
    pub service: String,
    pub owner_user: String,
    pub owner_group: String,
    pub credentials: Credentials,
    pub target_user: Option<String>,
    pub target_host: Option<String>,
}
