use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::Deserialize;
use url::Url;

use crate::error::{Error, Result};

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_WARNING_SECS: u64 = 120;
pub const DEFAULT_VIEWER: &str = "xdg-open";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub base_url: Url,
    pub request_timeout_secs: u64,
    /// Remaining time at which the learner is warned; 0 disables the warning.
    pub warning_secs: u64,
    pub viewer: String,
    pub log_level: String,
}

/// On-disk shape of `config.yaml`; every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub base_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub warning_secs: Option<u64>,
    pub viewer: Option<String>,
    pub log_level: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }
}

impl Config {
    /// Loads the file layer, then applies `LMSQUIZ_*` environment variables, then CLI flags.
    pub fn load(path: Option<&Path>, cli_base_url: Option<&str>) -> Result<Self> {
        let file = match path {
            Some(p) => {
                if !p.exists() {
                    return Err(Error::Config(format!("{} does not exist", p.display())));
                }
                FileConfig::load(p)?
            }
            None => match default_config_path() {
                Some(p) => FileConfig::load(&p)?,
                None => FileConfig::default(),
            },
        };
        Self::from_layers(file, |key| std::env::var(key).ok(), cli_base_url)
    }

    pub fn from_layers(
        file: FileConfig,
        env: impl Fn(&str) -> Option<String>,
        cli_base_url: Option<&str>,
    ) -> Result<Self> {
        let base_url = cli_base_url
            .map(str::to_string)
            .or_else(|| env("LMSQUIZ_BASE_URL"))
            .or(file.base_url)
            .ok_or_else(|| {
                Error::Config(
                    "no portal address; set base_url in config.yaml, LMSQUIZ_BASE_URL or --base-url"
                        .to_string(),
                )
            })?;

        let viewer = env("LMSQUIZ_VIEWER")
            .or(file.viewer)
            .unwrap_or_else(|| DEFAULT_VIEWER.to_string());

        let request_timeout_secs = file.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
        if request_timeout_secs == 0 {
            return Err(Error::Config("request_timeout_secs must be positive".to_string()));
        }

        Ok(Config {
            base_url: parse_base_url(&base_url)?,
            request_timeout_secs,
            warning_secs: file.warning_secs.unwrap_or(DEFAULT_WARNING_SECS),
            viewer,
            log_level: file.log_level.unwrap_or_else(|| "info".to_string()),
        })
    }

    pub fn warn_at(&self) -> Option<u64> {
        (self.warning_secs > 0).then_some(self.warning_secs)
    }
}

/// Parses the portal address, forcing a trailing slash so relative joins keep the path.
pub fn parse_base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw.trim())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::Config(format!("unsupported scheme in {}", raw)));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "lmsquiz")
}

pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|d| d.config_dir().join("config.yaml"))
}

/// Directory holding the session file and the log.
pub fn data_dir() -> PathBuf {
    project_dirs()
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| std::env::temp_dir().join("lmsquiz"))
}
