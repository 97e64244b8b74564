//! Storage configuration
//!
//! The adapter is configured from a per-environment YAML document, the
//! same file the host application uses for the rest of its settings:
//!
//! ```yaml
//! development:
//!   server: ftp.example.test
//!   login: dev
//!   password: secret
//!   base_upload_path: /uploads
//! production:
//!   server: ftp.example.com
//!   login: app
//!   password: secret
//!   base_upload_path: /var/uploads
//!   base_url: https://assets.example.com
//!   read_only: true
//! ```
//!
//! Required fields are validated when the config is constructed, so a
//! misconfigured process fails at startup rather than on the first upload.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How remote paths are partitioned under the base upload directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Partitioning {
    /// No partition segments; files land directly under the prefix.
    Flat,
    /// Identifier-derived fixed-width segments. Bounds the number of
    /// files per remote directory independent of identifier growth.
    #[default]
    Split,
}

/// Connection and layout settings for the remote FTP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FtpConfig {
    /// FTP server hostname
    pub server: String,
    /// FTP control port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Login user
    pub login: String,
    /// Login password
    pub password: String,
    /// Remote directory all attachments live under
    pub base_upload_path: String,
    /// Base URL public read URLs are built from
    #[serde(default)]
    pub base_url: Option<String>,
    /// Suppress every mutating remote operation
    #[serde(default)]
    pub read_only: bool,
    /// Path partitioning mode
    #[serde(default)]
    pub partitioning: Partitioning,
}

fn default_port() -> u16 {
    21
}

impl FtpConfig {
    /// Fail fast on fields the backend cannot operate without.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.login.is_empty() {
            return Err(ConfigError::MissingField("login"));
        }
        if self.password.is_empty() {
            return Err(ConfigError::MissingField("password"));
        }
        if self.base_upload_path.is_empty() {
            return Err(ConfigError::MissingField("base_upload_path"));
        }
        Ok(())
    }

    /// Load and validate the section for `environment` from an
    /// environment-keyed YAML file.
    ///
    /// Only the selected section is deserialized, so unrelated
    /// environments in the same file may be incomplete.
    pub fn from_yaml_file(
        path: impl AsRef<Path>,
        environment: &str,
    ) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::File {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_yaml_str(&raw, environment)
    }

    /// Load and validate the section for `environment` from a YAML string.
    pub fn from_yaml_str(raw: &str, environment: &str) -> Result<Self, ConfigError> {
        let doc: serde_yaml::Value = serde_yaml::from_str(raw)?;
        let section = doc
            .get(environment)
            .ok_or_else(|| ConfigError::UnknownEnvironment(environment.to_string()))?;

        let config: Self = serde_yaml::from_value(section.clone())?;
        config.validate()?;
        Ok(config)
    }

    /// Base URL for public reads, or an error when none is configured.
    pub fn base_url(&self) -> Result<&str, ConfigError> {
        self.base_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .ok_or(ConfigError::MissingBaseUrl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> FtpConfig {
        FtpConfig {
            server: "ftp.example.com".to_string(),
            port: 21,
            login: "app".to_string(),
            password: "secret".to_string(),
            base_upload_path: "/uploads".to_string(),
            base_url: None,
            read_only: false,
            partitioning: Partitioning::default(),
        }
    }

    #[test]
    fn test_validate_accepts_complete_config() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_login() {
        let mut config = valid_config();
        config.login = String::new();

        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::MissingField("login")));
    }

    #[test]
    fn test_validate_rejects_missing_password() {
        let mut config = valid_config();
        config.password = String::new();

        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::MissingField("password")));
    }

    #[test]
    fn test_validate_rejects_missing_base_upload_path() {
        let mut config = valid_config();
        config.base_upload_path = String::new();

        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::MissingField("base_upload_path")));
    }

    #[test]
    fn test_from_yaml_selects_environment() {
        let raw = r#"
development:
  server: ftp.dev.test
  login: dev
  password: devpass
  base_upload_path: /dev/uploads
production:
  server: ftp.example.com
  login: app
  password: secret
  base_upload_path: /uploads
  base_url: https://assets.example.com
  read_only: true
"#;

        let config = FtpConfig::from_yaml_str(raw, "production").unwrap();
        assert_eq!(config.server, "ftp.example.com");
        assert_eq!(config.port, 21);
        assert!(config.read_only);
        assert_eq!(config.base_url().unwrap(), "https://assets.example.com");
        assert_eq!(config.partitioning, Partitioning::Split);
    }

    #[test]
    fn test_from_yaml_ignores_incomplete_other_environments() {
        let raw = r#"
test:
  server: localhost
development:
  server: ftp.dev.test
  login: dev
  password: devpass
  base_upload_path: /dev/uploads
"#;

        let config = FtpConfig::from_yaml_str(raw, "development").unwrap();
        assert_eq!(config.login, "dev");
    }

    #[test]
    fn test_from_yaml_unknown_environment() {
        let raw = "development:\n  server: x\n";
        let err = FtpConfig::from_yaml_str(raw, "staging").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownEnvironment(_)));
    }

    #[test]
    fn test_from_yaml_missing_required_field_fails() {
        let raw = r#"
development:
  server: ftp.dev.test
  login: dev
  password: devpass
  base_upload_path: ""
"#;

        let err = FtpConfig::from_yaml_str(raw, "development").unwrap_err();
        assert!(matches!(err, ConfigError::MissingField("base_upload_path")));
    }

    #[test]
    fn test_from_yaml_file_missing_file() {
        let err = FtpConfig::from_yaml_file("/nonexistent/ftp.yml", "production").unwrap_err();
        assert!(matches!(err, ConfigError::File { .. }));
    }

    #[test]
    fn test_from_yaml_file_roundtrip() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "production:\n  server: ftp.example.com\n  login: app\n  password: s\n  base_upload_path: /uploads\n"
        )
        .unwrap();

        let config = FtpConfig::from_yaml_file(file.path(), "production").unwrap();
        assert_eq!(config.base_upload_path, "/uploads");
    }

    #[test]
    fn test_base_url_missing() {
        let config = valid_config();
        assert!(matches!(config.base_url(), Err(ConfigError::MissingBaseUrl)));
    }

    #[test]
    fn test_partitioning_parses_snake_case() {
        let raw = r#"
development:
  server: ftp.dev.test
  login: dev
  password: devpass
  base_upload_path: /dev/uploads
  partitioning: flat
"#;

        let config = FtpConfig::from_yaml_str(raw, "development").unwrap();
        assert_eq!(config.partitioning, Partitioning::Flat);
    }
}
