//! Credentials for the code host
//!
//! Kept apart from `config.toml` so the config can be shared freely. The
//! secrets file lives at `~/.config/sentinel/secrets.toml` and must be
//! readable by its owner only (0600 on Unix).
//!
//! Lookup order for the GitHub token:
//! 1. `GITHUB_TOKEN` environment variable
//! 2. `[github] token` in the secrets file

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{Error, Result};

/// Secrets structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Secrets {
    /// GitHub credentials
    pub github: GitHubSecrets,
}

/// GitHub credentials
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GitHubSecrets {
    /// Personal access token with read access to contents and pull requests
    pub token: Option<String>,
}

const TEMPLATE: &str = r#"# Sentinel secrets
# Do not commit this file. It must stay chmod 600.

[github]
# Personal access token with read access to repository contents and pull requests
token = ""
"#;

impl Secrets {
    /// Load secrets from the default location, or empty secrets if absent
    pub fn load() -> Result<Self> {
        match Self::default_secrets_path() {
            Some(path) if path.exists() => Self::load_from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load secrets from a file, refusing group/world readable files on Unix
    pub fn load_from_file(path: &Path) -> Result<Self> {
        #[cfg(unix)]
        check_owner_only(path)?;

        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        let mut secrets: Secrets = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse secrets: {}", e)))?;

        secrets.github.token = secrets
            .github
            .token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        Ok(secrets)
    }

    /// `~/.config/sentinel/secrets.toml` on Unix
    pub fn default_secrets_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("sentinel").join("secrets.toml"))
    }

    /// GitHub token, preferring the environment over the secrets file
    pub fn github_token(&self) -> Option<String> {
        if let Some(token) = std::env::var("GITHUB_TOKEN")
            .ok()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
        {
            debug!("Using GitHub token from GITHUB_TOKEN");
            return Some(token);
        }

        self.github.token.clone().inspect(|_| {
            debug!("Using GitHub token from secrets file");
        })
    }

    /// Write an empty secrets template with owner-only permissions
    pub fn create_template() -> Result<PathBuf> {
        let path = Self::default_secrets_path()
            .ok_or_else(|| Error::Config("Could not determine secrets path".to_string()))?;

        if path.exists() {
            return Err(Error::Config(format!(
                "Secrets file already exists at {}",
                path.display()
            )));
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(Error::Io)?;
        }
        std::fs::write(&path, TEMPLATE).map_err(Error::Io)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600))
                .map_err(Error::Io)?;
        }

        warn!(path = %path.display(), "Created secrets template, add a GitHub token to it");
        Ok(path)
    }
}

#[cfg(unix)]
fn check_owner_only(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mode = std::fs::metadata(path).map_err(Error::Io)?.permissions().mode();
    if mode & 0o077 != 0 {
        return Err(Error::Config(format!(
            "Secrets file {} has insecure permissions {:o}. Run: chmod 600 {}",
            path.display(),
            mode & 0o777,
            path.display()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_secrets_are_empty() {
        assert!(Secrets::default().github.token.is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_world_readable_file_rejected() {
        use std::os::unix::fs::PermissionsExt;

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[github]\ntoken = \"ghp_test\"").unwrap();
        std::fs::set_permissions(file.path(), std::fs::Permissions::from_mode(0o644)).unwrap();

        let err = Secrets::load_from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("insecure permissions"));
    }

    #[cfg(unix)]
    #[test]
    fn test_token_is_trimmed() {
        use std::os::unix::fs::PermissionsExt;

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[github]\ntoken = \"  ghp_test \"").unwrap();
        std::fs::set_permissions(file.path(), std::fs::Permissions::from_mode(0o600)).unwrap();

        let secrets = Secrets::load_from_file(file.path()).unwrap();
        assert_eq!(secrets.github.token.as_deref(), Some("ghp_test"));
    }

    #[cfg(unix)]
    #[test]
    fn test_blank_token_is_none() {
        use std::os::unix::fs::PermissionsExt;

        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", TEMPLATE).unwrap();
        std::fs::set_permissions(file.path(), std::fs::Permissions::from_mode(0o600)).unwrap();

        let secrets = Secrets::load_from_file(file.path()).unwrap();
        assert!(secrets.github.token.is_none());
    }
}
