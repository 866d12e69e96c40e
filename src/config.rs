use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use url::Url;

/// Environment variable that overrides `api.base_url`
pub const API_URL_ENV: &str = "HRDESK_API_URL";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub api: ApiConfig,
  /// Custom title for header (defaults to "hrdesk")
  pub title: Option<String>,
  #[serde(default)]
  pub storage: StorageConfig,
  #[serde(default)]
  pub log: LogConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiConfig {
  /// Backend root, e.g. https://hr.example.com/api
  pub base_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfig {
  /// Session database (defaults to $XDG_DATA_HOME/hrdesk/session.db)
  pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogConfig {
  /// Log directory (defaults to $XDG_DATA_HOME/hrdesk/logs)
  pub directory: Option<PathBuf>,
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./hrdesk.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/hrdesk/config.yaml
  ///
  /// Without a file the defaults apply, so the base URL must then come
  /// from the command line or the environment.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = match explicit_path {
      Some(p) if p.exists() => Some(p.to_path_buf()),
      Some(p) => return Err(eyre!("Config file not found: {}", p.display())),
      None => Self::find_config_file(),
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Ok(Self::default()),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("hrdesk.yaml");
    if local.exists() {
      return Some(local);
    }

    let xdg_path = dirs::config_dir()?.join("hrdesk").join("config.yaml");
    xdg_path.exists().then_some(xdg_path)
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents).map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn parse(contents: &str) -> Result<Self, serde_yaml::Error> {
    serde_yaml::from_str(contents)
  }

  /// The backend URL: `cli` wins, then `HRDESK_API_URL`, then the file.
  pub fn api_url(&self, cli: Option<&str>) -> Result<Url> {
    let env = std::env::var(API_URL_ENV).ok();
    Self::pick_api_url(cli, env.as_deref(), self.api.base_url.as_deref())
  }

  fn pick_api_url(cli: Option<&str>, env: Option<&str>, file: Option<&str>) -> Result<Url> {
    let raw = cli.or(env).or(file).ok_or_else(|| {
      eyre!(
        "No backend URL configured. Pass --api-url, set {}, or add api.base_url \
         to ~/.config/hrdesk/config.yaml",
        API_URL_ENV
      )
    })?;

    let url = Url::parse(raw).map_err(|e| eyre!("Invalid backend URL {:?}: {}", raw, e))?;
    match url.scheme() {
      "http" | "https" => Ok(url),
      other => Err(eyre!("Backend URL must be http or https, got {:?}", other)),
    }
  }

  pub fn title(&self) -> &str {
    self.title.as_deref().unwrap_or("hrdesk")
  }

  pub fn log_directory(&self) -> Result<PathBuf> {
    if let Some(path) = &self.log.directory {
      return Ok(path.clone());
    }
    dirs::data_dir()
      .map(|dir| dir.join("hrdesk").join("logs"))
      .ok_or_else(|| eyre!("Could not determine a data directory; set log.directory"))
  }
}
