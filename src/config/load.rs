use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::model::{Config, RuntimeConfig};
use crate::error::{ConfigError, Result};
use crate::types::Credentials;
use crate::util::paths::absolutize;

const DEFAULT_BACKUP_ROOT: &str = "/mysql_bak";
const DEFAULT_DATA_DIR: &str = "/var/lib/mysql";
const DEFAULT_SERVICE: &str = "mysql";
const DEFAULT_OWNER: &str = "mysql";
const DEFAULT_DB_USER: &str = "root";

/// CLI flags that overlay the file. Flags win over file keys, file keys
/// win over the built-in defaults.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub backup_root: Option<PathBuf>,
    pub user: Option<String>,
    pub password: Option<String>,
}

pub fn load_config(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)?;
    let cfg: Config =
        serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
    Ok(cfg)
}

/// For the default config path, which simply may not exist yet.
pub fn load_config_or_default(path: &Path) -> Result<Config> {
    match fs::read_to_string(path) {
        Ok(contents) => {
            let cfg: Config =
                serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
            Ok(cfg)
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Config::default())
        }
        Err(err) => Err(err.into()),
    }
}

pub fn resolve(cfg: Config, overrides: Overrides) -> Result<RuntimeConfig> {
    let backup_root = overrides
        .backup_root
        .or_else(|| cfg.backup_root.map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_BACKUP_ROOT));
    let backup_root = absolutize(&backup_root)?;

    let data_dir = cfg
        .data_dir
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
    if !data_dir.is_absolute() {
        return Err(ConfigError::Invalid(format!(
            "dataDir {} must be an absolute path",
            data_dir.display()
        ))
        .into());
    }

    let service = cfg.service.unwrap_or_else(|| DEFAULT_SERVICE.to_string());
    if service.trim().is_empty() {
        return Err(ConfigError::Invalid("service name is empty".to_string()).into());
    }

    let owner_user = cfg.owner_user.unwrap_or_else(|| DEFAULT_OWNER.to_string());
    let owner_group = cfg.owner_group.unwrap_or_else(|| owner_user.clone());

    let user = overrides
        .user
        .or(cfg.user)
        .unwrap_or_else(|| DEFAULT_DB_USER.to_string());
    if user.trim().is_empty() {
        return Err(ConfigError::Invalid("database user is empty".to_string()).into());
    }
    let password = overrides.password.or(cfg.password);

    Ok(RuntimeConfig {
        backup_root,
        data_dir,
        service,
        owner_user,
        owner_group,
        credentials: Credentials { user, password },
        target_user: cfg.target_user,
        target_host: cfg.target_host,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn full_config_file_round_trips() {
        let mut file = NamedTempFile::new().expect("tempfile");
        let yaml = r#"
backupRoot: "/srv/mysql_bak"
dataDir: "/srv/mysql/data"
service: "mysql"
ownerUser: "mysql"
ownerGroup: "mysql"
user: "backup"
password: "secret"
targetUser: "root"
targetHost: "db-standby"
"#;
        file.write_all(yaml.as_bytes()).expect("write");
        let cfg = load_config(file.path()).expect("load");
        let rt = resolve(cfg, Overrides::default()).expect("resolve");
        assert_eq!(rt.backup_root, PathBuf::from("/srv/mysql_bak"));
        assert_eq!(rt.data_dir, PathBuf::from("/srv/mysql/data"));
        assert_eq!(rt.credentials.user, "backup");
        assert_eq!(rt.credentials.password.as_deref(), Some("secret"));
        assert_eq!(rt.target_host.as_deref(), Some("db-standby"));
    }

    #[test]
    fn empty_config_falls_back_to_defaults() {
        let rt = resolve(Config::default(), Overrides::default()).expect("resolve");
        assert_eq!(rt.backup_root, PathBuf::from("/mysql_bak"));
        assert_eq!(rt.data_dir, PathBuf::from("/var/lib/mysql"));
        assert_eq!(rt.service, "mysql");
        assert_eq!(rt.owner_user, "mysql");
        assert_eq!(rt.owner_group, "mysql");
        assert_eq!(rt.credentials.user, "root");
        assert_eq!(rt.credentials.password, None);
        assert_eq!(rt.target_user, None);
    }

    #[test]
    fn cli_overrides_beat_file_values() {
        let cfg = Config {
            backup_root: Some("/from-file".to_string()),
            user: Some("fileuser".to_string()),
            password: Some("filepass".to_string()),
            ..Config::default()
        };
        let overrides = Overrides {
            backup_root: Some(PathBuf::from("/from-cli")),
            user: Some("cliuser".to_string()),
            password: None,
        };
        let rt = resolve(cfg, overrides).expect("resolve");
        assert_eq!(rt.backup_root, PathBuf::from("/from-cli"));
        assert_eq!(rt.credentials.user, "cliuser");
        // password falls through to the file when the flag is absent
        assert_eq!(rt.credentials.password.as_deref(), Some("filepass"));
    }

    #[test]
    fn owner_group_defaults_to_owner_user() {
        let cfg = Config {
            owner_user: Some("mariadb".to_string()),
            ..Config::default()
        };
        let rt = resolve(cfg, Overrides::default()).expect("resolve");
        assert_eq!(rt.owner_group, "mariadb");
    }

    #[test]
    fn relative_data_dir_is_rejected() {
        let cfg = Config {
            data_dir: Some("relative/path".to_string()),
            ..Config::default()
        };
        let err = resolve(cfg, Overrides::default()).unwrap_err();
        assert!(err.to_string().contains("absolute"));
    }

    #[test]
    fn unparseable_yaml_is_a_config_error() {
        let mut file = NamedTempFile::new().expect("tempfile");
        file.write_all(b"backupRoot: [not, a, string\n").expect("write");
        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("parse config"));
    }

    #[test]
    fn missing_default_config_is_fine() {
        let cfg = load_config_or_default(Path::new("/nonexistent/xtravault.yaml")).expect("load");
        assert!(cfg.backup_root.is_none());
    }
}
