use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Connection settings for the remote work-tracking service.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  /// Organization or collection URL, e.g. `https://dev.azure.com/fabrikam`
  pub url: Option<String>,
  /// Project name
  pub project: Option<String>,
  /// Team name; the project default team is used when unset
  pub team: Option<String>,
  /// Personal access token; populated from the environment at load time,
  /// never from the file
  #[serde(skip)]
  pub token: Option<String>,
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./devops-session.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/devops-session/config.yaml
  /// 4. ~/.config/devops-session/config.yaml
  ///
  /// The access token is read from the environment, not the file.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(Error::Config(format!(
          "config file not found: {}",
          p.display()
        )));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Err(Error::Config(
        "no configuration file found; create one at ~/.config/devops-session/config.yaml\n\
         See config.example.yaml for the format."
          .to_string(),
      )),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("devops-session.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("devops-session").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| Error::Config(format!("failed to read {}: {}", path.display(), e)))?;

    let mut config: Config = serde_yaml::from_str(&contents)
      .map_err(|e| Error::Config(format!("failed to parse {}: {}", path.display(), e)))?;

    config.token = Self::access_token_from_env();
    Ok(config)
  }

  /// Get the access token from environment variables.
  ///
  /// Checks DEVOPS_SESSION_TOKEN first, then AZURE_DEVOPS_PAT as fallback.
  pub fn access_token_from_env() -> Option<String> {
    std::env::var("DEVOPS_SESSION_TOKEN")
      .or_else(|_| std::env::var("AZURE_DEVOPS_PAT"))
      .ok()
  }

  /// True only when everything remote access needs is present: endpoint
  /// URL, project and access token. Ensure operations consult this before
  /// touching the network.
  pub fn is_valid(&self) -> bool {
    self.url.is_some() && self.project.is_some() && self.token.is_some()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_default_config_is_invalid() {
    assert!(!Config::default().is_valid());
  }

  #[test]
  fn test_valid_requires_url_project_and_token() {
    let mut config = Config {
      url: Some("https://dev.azure.com/fabrikam".into()),
      project: Some("Fabrikam".into()),
      team: None,
      token: None,
    };
    assert!(!config.is_valid());

    config.token = Some("pat".into());
    assert!(config.is_valid());

    config.project = None;
    assert!(!config.is_valid());
  }

  #[test]
  fn test_parse_yaml() {
    let config: Config = serde_yaml::from_str(
      "url: https://dev.azure.com/fabrikam\nproject: Fabrikam\nteam: Fabrikam Team\n",
    )
    .unwrap();
    assert_eq!(config.url.as_deref(), Some("https://dev.azure.com/fabrikam"));
    assert_eq!(config.project.as_deref(), Some("Fabrikam"));
    assert_eq!(config.team.as_deref(), Some("Fabrikam Team"));
    assert!(config.token.is_none());
  }
}
