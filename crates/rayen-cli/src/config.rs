//! Settings file and environment overrides.
//!
//! ```toml
//! output_dir = "planillas"
//!
//! [portal]
//! location = "CESFAM LOS ALERCES"
//! username = "enfermera"
//! password = "..."
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use rayen_portal::Credentials;

/// Read from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "rayen.toml";

pub const ENV_LOCATION: &str = "RAYEN_LOCATION";
pub const ENV_USERNAME: &str = "RAYEN_USERNAME";
pub const ENV_PASSWORD: &str = "RAYEN_PASSWORD";
pub const ENV_OUTPUT_DIR: &str = "RAYEN_OUTPUT_DIR";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub portal: PortalSettings,
    /// Directory for extraction workbooks
    pub output_dir: Option<PathBuf>,
}

#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalSettings {
    pub location: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
}

impl fmt::Debug for PortalSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PortalSettings")
            .field("location", &self.location)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Settings {
    /// Load settings, then apply environment overrides.
    ///
    /// An explicit `path` must exist. Without one, [`DEFAULT_CONFIG_FILE`] is
    /// read when present and defaults are used otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.is_file() {
                    Self::from_file(default)?
                } else {
                    Self::default()
                }
            }
        };
        settings.apply_env(|key| std::env::var(key).ok());
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let settings =
            Self::from_toml(&text).with_context(|| format!("parse config {}", path.display()))?;
        tracing::debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Override fields from `RAYEN_*` variables. Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(location) = var(ENV_LOCATION) {
            self.portal.location = location;
        }
        if let Some(username) = var(ENV_USERNAME) {
            self.portal.username = username;
        }
        if let Some(password) = var(ENV_PASSWORD) {
            self.portal.password = password;
        }
        if let Some(dir) = var(ENV_OUTPUT_DIR) {
            self.output_dir = Some(PathBuf::from(dir));
        }
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            location: self.portal.location.clone(),
            username: self.portal.username.clone(),
            password: self.portal.password.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert!(settings.portal.location.is_empty());
        assert!(settings.output_dir.is_none());
    }

    #[test]
    fn test_debug_hides_password() {
        let mut settings = Settings::default();
        settings.portal.password = "secreto".into();
        assert!(!format!("{:?}", settings).contains("secreto"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings = Settings::from_toml("[portal]\nusername = \"enfermera\"\n").unwrap();
        assert_eq!(settings.portal.username, "enfermera");
        assert!(settings.portal.password.is_empty());
        assert!(settings.output_dir.is_none());
    }
}
