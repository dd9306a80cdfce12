// Credential and endpoint configuration. Values come from the command line
// (or environment), then the config file, then built-in defaults; whatever
// is still missing for a login is asked for interactively.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::AuthScheme;

pub const DEFAULT_URI: &str = "https://mist.io";
const CONFIG_FILE: &str = ".mist";

/// `~/.mist`, or `./.mist` when there is no home directory.
pub fn default_config_path() -> PathBuf {
    let dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    dir.join(CONFIG_FILE)
}

/// Contents of the TOML config file. Every field is optional.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub mist_uri: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub api_token: Option<String>,
    pub auth_scheme: Option<AuthScheme>,
}

/// Values given on the command line or through the environment.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub uri: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub token: Option<String>,
    pub auth_scheme: Option<AuthScheme>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Auth {
    /// Use an API token as-is.
    Token(String),
    /// Log in with email and password to obtain a token.
    Login { email: String, password: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub uri: String,
    pub scheme: AuthScheme,
    pub auth: Auth,
}

/// Source of values the user has to type in.
pub trait Prompt {
    fn email(&mut self) -> Result<String>;
    fn password(&mut self) -> Result<String>;
}

impl Config {
    /// Load the config file. A missing file yields the empty config.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&raw).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        toml::from_str(raw).context("Parsing config TOML")
    }

    /// Merge with `overrides` (which win), fill defaults and prompt for any
    /// login detail that is still missing.
    pub fn resolve<P: Prompt>(self, overrides: Overrides, prompt: &mut P) -> Result<Credentials> {
        let uri = overrides
            .uri
            .or(self.mist_uri)
            .unwrap_or_else(|| DEFAULT_URI.to_string());
        let scheme = overrides
            .auth_scheme
            .or(self.auth_scheme)
            .unwrap_or_default();

        if let Some(token) = overrides.token.or(self.api_token) {
            return Ok(Credentials {
                uri,
                scheme,
                auth: Auth::Token(token),
            });
        }

        let email = match overrides.email.or(self.email) {
            Some(email) => email,
            None => prompt.email()?,
        };
        let password = match overrides.password.or(self.password) {
            Some(password) => password,
            None => prompt.password()?,
        };
        Ok(Credentials {
            uri,
            scheme,
            auth: Auth::Login { email, password },
        })
    }
}
