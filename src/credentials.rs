use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::ai::provider::Provider;

pub const GITHUB_TOKEN: &str = "github_token";
pub const GITHUB_USERNAME: &str = "github_username";
pub const LAST_REPO: &str = "last_repo";

/// Plaintext key/value credentials (host token, host username, one API key
/// per provider, last loaded repository). No validation, no encryption.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credentials {
    values: BTreeMap<String, String>,
}

impl Credentials {
    /// Stored value, treating an empty string as absent
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    pub fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }

    pub fn github_token(&self) -> Option<&str> {
        self.get(GITHUB_TOKEN)
    }

    pub fn github_username(&self) -> Option<&str> {
        self.get(GITHUB_USERNAME)
    }

    pub fn api_key(&self, provider: Provider) -> Option<&str> {
        self.get(provider.credential_key())
    }

    pub fn last_repo(&self) -> Option<&str> {
        self.get(LAST_REPO)
    }

    /// Remove the host credentials, every provider key and the last repo
    pub fn clear(&mut self) {
        self.remove(GITHUB_TOKEN);
        self.remove(GITHUB_USERNAME);
        self.remove(LAST_REPO);
        for provider in Provider::ALL {
            self.remove(provider.credential_key());
        }
    }
}

/// File-backed credential storage (`~/.config/rx/credentials.toml`)
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn default_location() -> Result<Self> {
        let dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
            .join("rx");
        Ok(Self::at(dir.join("credentials.toml")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing or unreadable files yield empty credentials
    pub fn load(&self) -> Credentials {
        std::fs::read_to_string(&self.path)
            .ok()
            .and_then(|c| match toml::from_str::<Credentials>(&c) {
                Ok(creds) => Some(creds),
                Err(e) => {
                    tracing::warn!(path = %self.path.display(), "ignoring malformed credentials: {e}");
                    None
                }
            })
            .unwrap_or_default()
    }

    pub fn save(&self, creds: &Credentials) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        let content = toml::to_string_pretty(creds)?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        Ok(())
    }
}
