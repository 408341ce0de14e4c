use serde::{Deserialize, Deserializer};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::frames::FrameModel;
use crate::source::DocumentSource;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub web: WebConfig,
    pub source: SourceConfig,
    #[serde(default)]
    pub frames: FrameModel,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:5000".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    pub url: Option<String>,
    pub file: Option<PathBuf>,
    pub cache_file: Option<PathBuf>,
    #[serde(default = "default_timeout", deserialize_with = "deserialize_duration")]
    pub timeout: Duration,
    #[serde(default, deserialize_with = "deserialize_optional_duration")]
    pub refresh_interval: Option<Duration>,
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

impl SourceConfig {
    pub fn document_source(&self) -> DocumentSource {
        match (&self.url, &self.file) {
            (Some(url), _) => DocumentSource::Url(url.clone()),
            (None, Some(file)) => DocumentSource::File(file.clone()),
            (None, None) => DocumentSource::File(PathBuf::from("iss_oem.xml")),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        match (&self.url, &self.file) {
            (Some(_), Some(_)) => Err(ConfigError::Invalid(
                "source.url and source.file are mutually exclusive",
            )),
            (None, None) => Err(ConfigError::Invalid(
                "one of source.url or source.file is required",
            )),
            _ => Ok(()),
        }?;
        if self.refresh_interval.is_some_and(|d| d.is_zero()) {
            return Err(ConfigError::Invalid("source.refresh_interval must be positive"));
        }
        Ok(())
    }
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)?;
        config.source.validate()?;
        Ok(config)
    }
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    humantime::parse_duration(s.trim()).map_err(serde::de::Error::custom)
}

fn deserialize_optional_duration<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .map(|s| humantime::parse_duration(s.trim()).map_err(serde::de::Error::custom))
        .transpose()
}
