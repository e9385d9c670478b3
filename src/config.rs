use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::core::classify::BucketPolicy;
use crate::core::error::MonitorError;
use crate::core::transport::{Envelope, DEFAULT_MAIL_COMMAND, PASSWORD_ENV};

pub const DEFAULT_CONFIG_FILE: &str = "jobwatch.toml";
pub const DEFAULT_LOG_FILE: &str = "logs.log";
pub const DEFAULT_REPORT_FILE: &str = "log_report.txt";

pub const SENDER_ENV: &str = "JOBWATCH_SENDER";
pub const RECIPIENT_ENV: &str = "JOBWATCH_RECIPIENT";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub input: InputConfig,
    pub thresholds: BucketPolicy,
    pub report: ReportConfig,
    pub alert: AlertConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputConfig {
    pub path: PathBuf,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    pub path: PathBuf,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_REPORT_FILE),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AlertConfig {
    pub enabled: bool,
    pub sender: Option<String>,
    pub recipient: Option<String>,
    /// Prefer the environment variable over storing this in the file.
    pub password: Option<String>,
    pub command: String,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sender: None,
            recipient: None,
            password: None,
            command: DEFAULT_MAIL_COMMAND.to_string(),
        }
    }
}

impl Config {
    /// Loads `path`, or `jobwatch.toml` from the working directory when no
    /// path is given. Only an explicitly named file is required to exist.
    pub fn load(path: Option<&Path>) -> Result<Self, MonitorError> {
        let (path, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        let mut config = match std::fs::read_to_string(&path) {
            Ok(text) => {
                debug!(path = %path.display(), "loading config");
                Self::from_toml(&text).map_err(|err| MonitorError::Config {
                    message: format!("{}: {err}", path.display()),
                })?
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound && !required => {
                debug!("no config file, using defaults");
                Self::default()
            }
            Err(source) => return Err(MonitorError::Io { path, source }),
        };

        config.merge_env_vars();
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self, MonitorError> {
        let config: Config = toml::from_str(text).map_err(|err| MonitorError::Config {
            message: err.to_string(),
        })?;
        config.thresholds.validate()?;
        Ok(config)
    }

    pub fn merge_env_vars(&mut self) {
        self.merge_env_with(|key| std::env::var(key).ok());
    }

    pub fn merge_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(sender) = lookup(SENDER_ENV) {
            self.alert.sender = Some(sender);
        }
        if let Some(recipient) = lookup(RECIPIENT_ENV) {
            self.alert.recipient = Some(recipient);
        }
        if let Some(password) = lookup(PASSWORD_ENV) {
            self.alert.password = Some(password);
        }
    }

    /// `None` until both addresses are configured.
    pub fn envelope(&self) -> Option<Envelope> {
        let sender = self.alert.sender.as_deref().filter(|s| !s.is_empty())?;
        let recipient = self.alert.recipient.as_deref().filter(|s| !s.is_empty())?;
        Some(Envelope {
            sender: sender.to_string(),
            recipient: recipient.to_string(),
            credential: self.alert.password.clone(),
        })
    }
}
