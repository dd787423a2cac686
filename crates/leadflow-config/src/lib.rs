use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use leadflow_core::rules::{validate_page_size, DEFAULT_CANDIDATE_PAGE_SIZE};
use serde::Deserialize;
use thiserror::Error;

const APP_DIR: &str = "leadflow";
const CONFIG_FILENAME: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub assignment: AssignmentConfig,
    pub follow_up: FollowUpConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentConfig {
    /// Upper bound on candidates read per assignment decision.
    pub page_size: usize,
    /// Route new leads created without an owner.
    pub auto_assign: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FollowUpConfig {
    pub plan_after_interaction: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            assignment: AssignmentConfig {
                page_size: DEFAULT_CANDIDATE_PAGE_SIZE,
                auto_assign: true,
            },
            follow_up: FollowUpConfig::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing home directory")]
    MissingHomeDir,
    #[error("invalid config path: {0}")]
    InvalidConfigPath(PathBuf),
    #[error("config file not found: {0}")]
    MissingConfigFile(PathBuf),
    #[error("config file permissions too permissive: {0}")]
    InsecurePermissions(PathBuf),
    #[error("invalid assignment.page_size value: {0}")]
    InvalidPageSize(i64),
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    assignment: Option<AssignmentFile>,
    follow_up: Option<FollowUpFile>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct AssignmentFile {
    page_size: Option<i64>,
    auto_assign: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FollowUpFile {
    plan_after_interaction: Option<bool>,
}

pub fn load(config_path: Option<PathBuf>) -> Result<AppConfig> {
    let required = config_path.is_some();
    let path = match resolve_config_path(config_path) {
        Ok(path) => path,
        Err(ConfigError::MissingHomeDir) if !required => return Ok(AppConfig::default()),
        Err(ConfigError::InvalidConfigPath(_)) if !required => return Ok(AppConfig::default()),
        Err(err) => return Err(err),
    };
    match load_at_path(&path, required)? {
        Some(config) => Ok(config),
        None => Ok(AppConfig::default()),
    }
}

pub fn resolve_config_path(custom: Option<PathBuf>) -> Result<PathBuf> {
    match custom {
        Some(path) => {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::InvalidConfigPath(path));
            }
            Ok(path)
        }
        None => {
            let base = if let Some(dir) = env::var_os("XDG_CONFIG_HOME") {
                let path = PathBuf::from(dir);
                if path.as_os_str().is_empty() {
                    return Err(ConfigError::InvalidConfigPath(path));
                }
                path
            } else {
                let home = dirs::home_dir().ok_or(ConfigError::MissingHomeDir)?;
                home.join(".config")
            };
            Ok(base.join(APP_DIR).join(CONFIG_FILENAME))
        }
    }
}

fn load_at_path(path: &Path, required: bool) -> Result<Option<AppConfig>> {
    if !path.exists() {
        if required {
            return Err(ConfigError::MissingConfigFile(path.to_path_buf()));
        }
        return Ok(None);
    }

    ensure_permissions(path)?;
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: ConfigFile = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(merge_config(parsed)?))
}

fn merge_config(parsed: ConfigFile) -> Result<AppConfig> {
    let mut config = AppConfig::default();

    if let Some(assignment) = parsed.assignment {
        if let Some(page_size) = assignment.page_size {
            config.assignment.page_size = validate_page_size(page_size)
                .map_err(|_| ConfigError::InvalidPageSize(page_size))?;
        }
        if let Some(auto_assign) = assignment.auto_assign {
            config.assignment.auto_assign = auto_assign;
        }
    }

    if let Some(follow_up) = parsed.follow_up {
        if let Some(enabled) = follow_up.plan_after_interaction {
            config.follow_up.plan_after_interaction = enabled;
        }
    }

    Ok(config)
}

#[cfg(unix)]
fn ensure_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = fs::metadata(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mode = metadata.permissions().mode();
    if mode & 0o077 != 0 {
        return Err(ConfigError::InsecurePermissions(path.to_path_buf()));
    }
    Ok(())
}

#[cfg(not(unix))]
fn ensure_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{
        load_at_path, merge_config, AppConfig, AssignmentFile, ConfigError, ConfigFile,
        FollowUpFile,
    };
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn restrict_permissions(path: &Path) {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(path).expect("metadata").permissions();
            perms.set_mode(0o600);
            fs::set_permissions(path, perms).expect("chmod");
        }
    }

    #[test]
    fn merge_config_applies_values() {
        let parsed = ConfigFile {
            assignment: Some(AssignmentFile {
                page_size: Some(50),
                auto_assign: Some(false),
            }),
            follow_up: Some(FollowUpFile {
                plan_after_interaction: Some(true),
            }),
        };
        let merged = merge_config(parsed).expect("merge");
        assert_eq!(merged.assignment.page_size, 50);
        assert!(!merged.assignment.auto_assign);
        assert!(merged.follow_up.plan_after_interaction);
    }

    #[test]
    fn merge_config_defaults_when_empty() {
        let parsed = ConfigFile {
            assignment: None,
            follow_up: None,
        };
        let merged = merge_config(parsed).expect("merge");
        assert_eq!(merged, AppConfig::default());
        assert_eq!(merged.assignment.page_size, 200);
        assert!(merged.assignment.auto_assign);
    }

    #[test]
    fn merge_config_rejects_page_size_out_of_range() {
        let parsed = ConfigFile {
            assignment: Some(AssignmentFile {
                page_size: Some(0),
                auto_assign: None,
            }),
            follow_up: None,
        };
        let err = merge_config(parsed).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPageSize(0)));
    }

    #[test]
    fn load_at_path_requires_file_when_requested() {
        let temp = TempDir::new().expect("tempdir");
        let missing = temp.path().join("config.toml");
        let err = load_at_path(&missing, true).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
        assert!(load_at_path(&missing, false).expect("optional").is_none());
    }

    #[test]
    fn load_at_path_parses_toml() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            "[assignment]\npage_size = 25\n[follow_up]\nplan_after_interaction = true\n",
        )
        .expect("write config");
        restrict_permissions(&path);

        let config = load_at_path(&path, true).expect("load").expect("config");
        assert_eq!(config.assignment.page_size, 25);
        assert!(config.assignment.auto_assign);
        assert!(config.follow_up.plan_after_interaction);
    }

    #[test]
    fn load_at_path_rejects_unknown_keys() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(&path, "[assignment]\nstrategy = \"round-robin\"\n").expect("write config");
        restrict_permissions(&path);

        let err = load_at_path(&path, true).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn load_at_path_rejects_world_readable_file() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(&path, "").expect("write config");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).expect("chmod");

        let err = load_at_path(&path, true).unwrap_err();
        assert!(matches!(err, ConfigError::InsecurePermissions(_)));
    }
}
