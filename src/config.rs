use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_API: &str = "https://gitlab.com/api/v4";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub gitlab: GitLabConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitLabConfig {
  /// API root, including the version segment
  #[serde(default = "default_api")]
  pub api: String,
  /// Group id or full path; all visible projects when unset
  #[serde(default, deserialize_with = "deserialize_group")]
  pub group: Option<String>,
  /// Per-request timeout in seconds (no timeout when unset)
  pub timeout_secs: Option<u64>,
  /// Skip TLS certificate verification (self-hosted instances with private CAs)
  #[serde(default)]
  pub accept_invalid_certs: bool,
  /// Items per page requested from the server (server default when unset)
  pub per_page: Option<u32>,
}

impl Default for GitLabConfig {
  fn default() -> Self {
    Self {
      api: default_api(),
      group: None,
      timeout_secs: None,
      accept_invalid_certs: false,
      per_page: None,
    }
  }
}

fn default_api() -> String {
  DEFAULT_API.to_string()
}

/// Accept the group as either a number (`group: 1234`) or a path (`group: team/sub`).
fn deserialize_group<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
  D: serde::Deserializer<'de>,
{
  #[derive(Deserialize)]
  #[serde(untagged)]
  enum Group {
    Id(u64),
    Path(String),
  }

  Ok(match Option::<Group>::deserialize(deserializer)? {
    Some(Group::Id(id)) => Some(id.to_string()),
    Some(Group::Path(path)) if !path.trim().is_empty() => Some(path),
    _ => None,
  })
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided (must exist)
  /// 2. ./mrstat.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/mrstat/config.yaml
  ///
  /// Without any config file the defaults are used.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Ok(Self::default()),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("mrstat.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("mrstat").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents).map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn parse(contents: &str) -> Result<Self, serde_yaml::Error> {
    serde_yaml::from_str(contents)
  }

  /// Get the GitLab access token from environment variables.
  ///
  /// Checks MRSTAT_GITLAB_TOKEN first, then GITLAB_TOKEN as fallback.
  pub fn get_api_token() -> Option<String> {
    std::env::var("MRSTAT_GITLAB_TOKEN")
      .or_else(|_| std::env::var("GITLAB_TOKEN"))
      .ok()
      .filter(|token| !token.is_empty())
  }
}
