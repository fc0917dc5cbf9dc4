//! Configuration types and loading logic.
//!
//! `Config` is a direct mapping of `sites-backup.toml`.  Every field has a
//! `Default` impl so the file is entirely optional; the platform URL and
//! token can come from the environment instead.
//!
//! Two files are read and merged per field: the global
//! `~/.config/sites-backup/config.toml`, then the local file named by
//! `--config`.  Local values win.
//!
//! # File format
//!
//! ```toml
//! [platform]
//! url          = "https://api.example.com"
//! token        = ""     # prefer PLATFORM_TOKEN
//! timeout_secs = 30
//!
//! [defaults]
//! element        = "all"      # all | code | database | files
//! changes        = "commit"   # commit | ignore | skip
//! env            = "all"      # environment id, or all
//! commit_message = "Commit pending changes before backup"
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

// ─── Top-level ────────────────────────────────────────────────────────────────

/// Root configuration object, deserialised from `sites-backup.toml`.
#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
pub struct Config {
    /// Where the platform API lives and how to authenticate.
    #[serde(default)]
    pub platform: PlatformConfig,

    /// Fallback values for options not given on the command line.
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

impl Config {
    /// A copy safe to print: the token, if any, is masked.
    pub fn redacted(&self) -> Self {
        let mut cfg = self.clone();
        if cfg.platform.token.is_some() {
            cfg.platform.token = Some("<redacted>".into());
        }
        cfg
    }
}

// ─── [platform] ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PlatformConfig {
    /// API base URL, without a trailing slash.
    #[serde(default)]
    pub url: Option<String>,

    /// Bearer token.  **Do not commit real tokens to version control**; the
    /// `PLATFORM_TOKEN` environment variable is the better home for it.
    #[serde(default)]
    pub token: Option<String>,

    /// Per-request timeout in seconds.  Must be greater than zero.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            url: None,
            token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

// ─── [defaults] ───────────────────────────────────────────────────────────────

/// Option defaults.  Stored as raw strings and validated together with the
/// command-line values.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DefaultsConfig {
    #[serde(default = "default_element")]
    pub element: String,

    #[serde(default = "default_changes")]
    pub changes: String,

    #[serde(default = "default_env")]
    pub env: String,

    /// Message used when pending sftp changes are committed before a backup.
    #[serde(default = "default_commit_message")]
    pub commit_message: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            element: default_element(),
            changes: default_changes(),
            env: default_env(),
            commit_message: default_commit_message(),
        }
    }
}

// ─── Defaults ─────────────────────────────────────────────────────────────────

// serde needs free functions for `#[serde(default = "…")]`.

pub fn default_timeout_secs() -> u64 {
    30
}

pub fn default_element() -> String {
    "all".into()
}

pub fn default_changes() -> String {
    "commit".into()
}

pub fn default_env() -> String {
    "all".into()
}

pub fn default_commit_message() -> String {
    "Commit pending changes before backup".into()
}

// ─── Partial config (for merging) ─────────────────────────────────────────────

/// A config file as written, with every field optional so that two files
/// can be merged field by field before defaults are filled in.
#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct PartialConfig {
    #[serde(default)]
    pub platform: PartialPlatform,
    #[serde(default)]
    pub defaults: PartialDefaults,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct PartialPlatform {
    pub url: Option<String>,
    pub token: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct PartialDefaults {
    pub element: Option<String>,
    pub changes: Option<String>,
    pub env: Option<String>,
    pub commit_message: Option<String>,
}

impl PartialConfig {
    /// Overlay `other` on `self`; fields set in `other` win.
    pub fn merge(self, other: Self) -> Self {
        Self {
            platform: PartialPlatform {
                url: other.platform.url.or(self.platform.url),
                token: other.platform.token.or(self.platform.token),
                timeout_secs: other.platform.timeout_secs.or(self.platform.timeout_secs),
            },
            defaults: PartialDefaults {
                element: other.defaults.element.or(self.defaults.element),
                changes: other.defaults.changes.or(self.defaults.changes),
                env: other.defaults.env.or(self.defaults.env),
                commit_message: other.defaults.commit_message.or(self.defaults.commit_message),
            },
        }
    }

    /// Fill unset fields with built-in defaults.
    pub fn resolve(self) -> Config {
        Config {
            platform: PlatformConfig {
                url: self.platform.url,
                token: self.platform.token,
                timeout_secs: self
                    .platform
                    .timeout_secs
                    .unwrap_or_else(default_timeout_secs),
            },
            defaults: DefaultsConfig {
                element: self.defaults.element.unwrap_or_else(default_element),
                changes: self.defaults.changes.unwrap_or_else(default_changes),
                env: self.defaults.env.unwrap_or_else(default_env),
                commit_message: self
                    .defaults
                    .commit_message
                    .unwrap_or_else(default_commit_message),
            },
        }
    }
}

// ─── Loader ───────────────────────────────────────────────────────────────────

/// Read and parse a `PartialConfig` from `path`.
///
/// Returns `Ok(None)` if the file does not exist, and an error if it exists
/// but cannot be read or is not valid TOML.
pub fn parse_partial(path: &Path) -> Result<Option<PartialConfig>> {
    if !path.exists() {
        return Ok(None);
    }

    let text =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;

    toml::from_str(&text)
        .map(Some)
        .with_context(|| format!("parsing {}", path.display()))
}

// ─── Tests ────────────────────────────────────────────────────────────────────
