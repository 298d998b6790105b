//! Client configuration.
//!
//! Loadable from the environment or from any serde source (a JSON file, for
//! instance). Only the server URL and credentials are mandatory.
//!
//! | Env Var                 | Default                                 |
//! |-------------------------|-----------------------------------------|
//! | `DECK_URL`              | required                                |
//! | `DECK_USERNAME`         | required                                |
//! | `DECK_PASSWORD`         | required                                |
//! | `DECK_SSL_VERIFY`       | `true`                                  |
//! | `DECK_API_PATH`         | `/index.php/apps/deck/api/v1.0/boards`  |
//! | `DECK_RAISE_FOR_STATUS` | `true`                                  |

use std::fmt;

use serde::Deserialize;

use crate::error::DeckError;

pub const DEFAULT_API_PATH: &str = "/index.php/apps/deck/api/v1.0/boards";

#[derive(Clone, Deserialize)]
pub struct DeckConfig {
    /// Server root, e.g. `https://cloud.example.com`.
    pub url: String,
    pub username: String,
    pub password: String,
    #[serde(default = "default_true")]
    pub ssl_verify: bool,
    #[serde(default = "default_api_path")]
    pub api_path: String,
    /// Fail on non-2xx responses before any body is decoded.
    #[serde(default = "default_true")]
    pub raise_for_status: bool,
}

fn default_true() -> bool {
    true
}

fn default_api_path() -> String {
    DEFAULT_API_PATH.to_string()
}

impl DeckConfig {
    pub fn new(url: impl Into<String>, username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            username: username.into(),
            password: password.into(),
            ssl_verify: true,
            api_path: default_api_path(),
            raise_for_status: true,
        }
    }

    pub fn with_ssl_verify(mut self, ssl_verify: bool) -> Self {
        self.ssl_verify = ssl_verify;
        self
    }

    pub fn with_api_path(mut self, api_path: impl Into<String>) -> Self {
        self.api_path = api_path.into();
        self
    }

    pub fn with_raise_for_status(mut self, raise_for_status: bool) -> Self {
        self.raise_for_status = raise_for_status;
        self
    }

    /// Load configuration from `DECK_*` environment variables.
    pub fn from_env() -> Result<Self, DeckError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, DeckError> {
        let required = |key: &str| {
            lookup(key)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| DeckError::Config(format!("{key} is not set")))
        };
        let flag = |key: &str| -> Result<bool, DeckError> {
            match lookup(key).as_deref().map(str::trim) {
                None | Some("") => Ok(true),
                Some("1") | Some("true") | Some("TRUE") | Some("yes") => Ok(true),
                Some("0") | Some("false") | Some("FALSE") | Some("no") => Ok(false),
                Some(other) => Err(DeckError::Config(format!(
                    "{key} must be a boolean, got {other:?}"
                ))),
            }
        };

        let mut config = Self::new(
            required("DECK_URL")?,
            required("DECK_USERNAME")?,
            required("DECK_PASSWORD")?,
        );
        config.ssl_verify = flag("DECK_SSL_VERIFY")?;
        config.raise_for_status = flag("DECK_RAISE_FOR_STATUS")?;
        if let Some(api_path) = lookup("DECK_API_PATH").filter(|path| !path.is_empty()) {
            config.api_path = api_path;
        }
        Ok(config)
    }

    /// Server URL joined with the API path, without a trailing slash.
    pub fn base_url(&self) -> String {
        format!(
            "{}{}",
            self.url.trim_end_matches('/'),
            self.api_path.trim_end_matches('/')
        )
    }
}

impl fmt::Debug for DeckConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeckConfig")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("ssl_verify", &self.ssl_verify)
            .field("api_path", &self.api_path)
            .field("raise_for_status", &self.raise_for_status)
            .finish()
    }
}
