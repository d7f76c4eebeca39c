//! Layered configuration: built-in defaults, then an optional YAML file, then
//! command-line flags and environment variables.

use crate::error::ProvisionError;
use crate::provision::DEFAULT_PROVIDER_URI;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 600;

/// Which secret store to read from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum StoreKind {
    /// AWS Secrets Manager
    #[default]
    Aws,
    /// Local JSON file (see --secrets-file)
    File,
}

/// On-disk configuration file (`config.yaml`)
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub region: Option<String>,
    pub store: Option<StoreKind>,
    pub endpoint_url: Option<String>,
    pub secrets_file: Option<PathBuf>,
    pub fetch_timeout_secs: Option<u64>,
    pub command_timeout_secs: Option<u64>,
    pub tools: ToolsSection,
    pub hadoop: HadoopSection,
    pub sqoop: SqoopSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolsSection {
    pub hadoop: Option<String>,
    pub sh: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HadoopSection {
    pub field_name: Option<String>,
    pub provider_uri: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SqoopSection {
    pub secret_id: Option<String>,
    pub field_name: Option<String>,
    pub script: Option<String>,
}

impl ConfigFile {
    /// Load the configuration file.
    ///
    /// An explicit path must exist. Without one, the per-user file is used when
    /// present and defaults apply otherwise.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ProvisionError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match default_config_path() {
                Some(path) if path.exists() => path,
                _ => return Ok(Self::default()),
            },
        };

        let content = std::fs::read_to_string(&path).map_err(|e| {
            ProvisionError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        tracing::debug!(path = %path.display(), "loaded configuration file");

        Self::parse(&content)
            .map_err(|e| ProvisionError::Config(format!("invalid {}: {}", path.display(), e)))
    }

    pub fn parse(content: &str) -> Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }
}

/// `<config_dir>/credbridge/config.yaml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("credbridge").join("config.yaml"))
}

/// Values supplied on the command line or through environment variables
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub region: Option<String>,
    pub store: Option<StoreKind>,
    pub endpoint_url: Option<String>,
    pub secrets_file: Option<PathBuf>,
    pub fetch_timeout_secs: Option<u64>,
    pub command_timeout_secs: Option<u64>,
}

/// Fully resolved settings for one run
#[derive(Debug, Clone)]
pub struct Settings {
    pub region: Option<String>,
    pub store: StoreKind,
    pub endpoint_url: Option<String>,
    pub secrets_file: Option<PathBuf>,
    pub fetch_timeout: Duration,
    pub command_timeout: Duration,
    pub hadoop_bin: String,
    pub sh_bin: String,
    pub hadoop: HadoopSettings,
    pub sqoop: SqoopSettings,
}

#[derive(Debug, Clone)]
pub struct HadoopSettings {
    pub field_name: String,
    pub provider_uri: String,
}

#[derive(Debug, Clone)]
pub struct SqoopSettings {
    pub secret_id: Option<String>,
    pub field_name: String,
    pub script: String,
}

impl Settings {
    /// Merge the file with overrides; overrides win.
    pub fn resolve(file: ConfigFile, overrides: Overrides) -> Result<Self, ProvisionError> {
        let fetch_timeout_secs = overrides
            .fetch_timeout_secs
            .or(file.fetch_timeout_secs)
            .unwrap_or(DEFAULT_FETCH_TIMEOUT_SECS);
        let command_timeout_secs = overrides
            .command_timeout_secs
            .or(file.command_timeout_secs)
            .unwrap_or(DEFAULT_COMMAND_TIMEOUT_SECS);

        if fetch_timeout_secs == 0 || command_timeout_secs == 0 {
            return Err(ProvisionError::Config(
                "timeouts must be at least one second".to_string(),
            ));
        }

        let store = overrides.store.or(file.store).unwrap_or_default();
        let secrets_file = overrides.secrets_file.or(file.secrets_file);

        if store == StoreKind::File && secrets_file.is_none() {
            return Err(ProvisionError::Config(
                "the file store needs --secrets-file or CREDBRIDGE_SECRETS_FILE".to_string(),
            ));
        }

        Ok(Self {
            region: non_empty(overrides.region.or(file.region)),
            store,
            endpoint_url: non_empty(overrides.endpoint_url.or(file.endpoint_url)),
            secrets_file,
            fetch_timeout: Duration::from_secs(fetch_timeout_secs),
            command_timeout: Duration::from_secs(command_timeout_secs),
            hadoop_bin: file.tools.hadoop.unwrap_or_else(|| "hadoop".to_string()),
            sh_bin: file.tools.sh.unwrap_or_else(|| "sh".to_string()),
            hadoop: HadoopSettings {
                field_name: file
                    .hadoop
                    .field_name
                    .unwrap_or_else(|| "password".to_string()),
                provider_uri: file
                    .hadoop
                    .provider_uri
                    .unwrap_or_else(|| DEFAULT_PROVIDER_URI.to_string()),
            },
            sqoop: SqoopSettings {
                secret_id: non_empty(file.sqoop.secret_id),
                field_name: file
                    .sqoop
                    .field_name
                    .unwrap_or_else(|| "username".to_string()),
                script: file
                    .sqoop
                    .script
                    .unwrap_or_else(|| "sqoop_file.sh".to_string()),
            },
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let settings = Settings::resolve(ConfigFile::default(), Overrides::default()).unwrap();
        assert_eq!(settings.store, StoreKind::Aws);
        assert_eq!(settings.region, None);
        assert_eq!(settings.fetch_timeout, Duration::from_secs(30));
        assert_eq!(settings.command_timeout, Duration::from_secs(600));
        assert_eq!(settings.hadoop_bin, "hadoop");
        assert_eq!(settings.sh_bin, "sh");
        assert_eq!(settings.hadoop.field_name, "password");
        assert_eq!(settings.hadoop.provider_uri, "jceks://hdfs/tmp/{secret_id}.jceks");
        assert_eq!(settings.sqoop.field_name, "username");
        assert_eq!(settings.sqoop.script, "sqoop_file.sh");
        assert_eq!(settings.sqoop.secret_id, None);
    }

    #[test]
    fn test_parse_full_file() {
        let file = ConfigFile::parse(
            r#"
region: eu-west-1
store: aws
endpoint_url: http://localhost:4566
fetch_timeout_secs: 5
tools:
  hadoop: /opt/hadoop/bin/hadoop
hadoop:
  provider_uri: jceks://file/etc/{secret_id}.jceks
sqoop:
  secret_id: prod/etl
  script: /opt/jobs/import.sh
"#,
        )
        .unwrap();

        let settings = Settings::resolve(file, Overrides::default()).unwrap();
        assert_eq!(settings.region.as_deref(), Some("eu-west-1"));
        assert_eq!(settings.endpoint_url.as_deref(), Some("http://localhost:4566"));
        assert_eq!(settings.fetch_timeout, Duration::from_secs(5));
        assert_eq!(settings.hadoop_bin, "/opt/hadoop/bin/hadoop");
        assert_eq!(settings.hadoop.provider_uri, "jceks://file/etc/{secret_id}.jceks");
        assert_eq!(settings.sqoop.secret_id.as_deref(), Some("prod/etl"));
        assert_eq!(settings.sqoop.script, "/opt/jobs/import.sh");
    }

    #[test]
    fn test_overrides_win() {
        let file = ConfigFile::parse("region: eu-west-1\ncommand_timeout_secs: 100\n").unwrap();
        let overrides = Overrides {
            region: Some("us-east-1".to_string()),
            command_timeout_secs: Some(20),
            ..Default::default()
        };

        let settings = Settings::resolve(file, overrides).unwrap();
        assert_eq!(settings.region.as_deref(), Some("us-east-1"));
        assert_eq!(settings.command_timeout, Duration::from_secs(20));
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(ConfigFile::parse("regoin: us-east-1\n").is_err());
        assert!(ConfigFile::parse("sqoop:\n  scirpt: x.sh\n").is_err());
    }

    #[test]
    fn test_empty_file_is_default() {
        let file = ConfigFile::parse("\n").unwrap();
        assert!(file.region.is_none());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let overrides = Overrides {
            fetch_timeout_secs: Some(0),
            ..Default::default()
        };
        let err = Settings::resolve(ConfigFile::default(), overrides).unwrap_err();
        assert!(matches!(err, ProvisionError::Config(_)));
    }

    #[test]
    fn test_file_store_requires_path() {
        let overrides = Overrides {
            store: Some(StoreKind::File),
            ..Default::default()
        };
        assert!(Settings::resolve(ConfigFile::default(), overrides).is_err());
    }

    #[test]
    fn test_blank_region_is_unset() {
        let overrides = Overrides {
            region: Some("  ".to_string()),
            ..Default::default()
        };
        let settings = Settings::resolve(ConfigFile::default(), overrides).unwrap();
        assert_eq!(settings.region, None);
    }

    #[test]
    fn test_load_explicit_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "store: file\nsecrets_file: /tmp/secrets.json").unwrap();

        let loaded = ConfigFile::load(Some(file.path())).unwrap();
        assert_eq!(loaded.store, Some(StoreKind::File));
        assert_eq!(loaded.secrets_file, Some(PathBuf::from("/tmp/secrets.json")));
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let err = ConfigFile::load(Some(Path::new("/nonexistent/credbridge.yaml"))).unwrap_err();
        assert!(matches!(err, ProvisionError::Config(_)));
    }
}
