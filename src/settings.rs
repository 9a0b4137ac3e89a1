//! Persistent user configuration.

use dirs_next as dirs;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};

use crate::gateway::AuthContext;

pub const TOKEN_ENV: &str = "PERIOD_PLANNER_TOKEN";

fn default_base_url() -> String {
    "http://localhost:3000/api".to_string()
}

fn default_total_weeks() -> u32 {
    12
}

/// Determine the bearer token to use for backend requests.
///
/// If the `PERIOD_PLANNER_TOKEN` environment variable is set, its value takes
/// precedence over the token stored in the settings file.
pub fn resolve_token(settings_token: Option<&str>) -> Option<String> {
    std::env::var(TOKEN_ENV)
        .ok()
        .filter(|t| !t.trim().is_empty())
        .or_else(|| settings_token.map(|s| s.to_string()))
}

/// Settings serialized to a JSON file in the user's config directory.
/// Fields missing from an older file fall back to their defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub api_base_url: String,
    pub auth_token: Option<String>,
    pub default_total_weeks: u32,
    pub last_planning_id: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: default_base_url(),
            auth_token: None,
            default_total_weeks: default_total_weeks(),
            last_planning_id: None,
        }
    }
}

impl Settings {
    const FILE: &'static str = "period_planner_settings.json";

    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join(Self::FILE))
    }

    /// Load settings from the default location, or defaults if the file is
    /// missing or unreadable.
    pub fn load() -> Self {
        Self::path()
            .map(|p| Self::load_from(&p))
            .unwrap_or_default()
    }

    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(data) => serde_json::from_str(&data).unwrap_or_else(|e| {
                log::warn!("Ignoring malformed settings at {}: {e}", path.display());
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self) -> io::Result<()> {
        match Self::path() {
            Some(p) => self.save_to(&p),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                "no configuration directory",
            )),
        }
    }

    pub fn save_to(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(self).map_err(io::Error::other)?;
        std::fs::write(path, data)
    }

    pub fn auth_context(&self) -> AuthContext {
        AuthContext::new(resolve_token(self.auth_token.as_deref()))
    }
}
