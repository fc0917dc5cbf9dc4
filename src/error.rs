//! Typed errors for option validation and remote calls.
//!
//! Command handlers wrap these in `anyhow` with extra context; the enums
//! exist so tests can match on the exact failure.

use thiserror::Error;

/// A command option (from the command line or the config file) was rejected.
///
/// Every variant is raised before any remote mutation happens.
#[derive(Debug, Error)]
pub enum OptionError {
    #[error("invalid element '{0}': expected one of all, code, database, files")]
    InvalidElement(String),

    #[error("invalid changes policy '{0}': expected one of commit, ignore, skip")]
    InvalidChanges(String),

    #[error("invalid --name pattern '{pattern}': {source}")]
    InvalidNamePattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("--{0} must not be empty")]
    Empty(&'static str),

    #[error("environment '{0}' does not exist on any of the selected sites")]
    UnknownEnvironment(String),
}

/// A call to the hosting platform failed.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("no platform URL configured (set [platform].url or PLATFORM_URL)")]
    MissingUrl,

    #[error("no API token configured (set [platform].token or PLATFORM_TOKEN)")]
    MissingToken,

    #[error("[platform].timeout_secs must be greater than zero")]
    ZeroTimeout,

    #[error("{method} {url} returned HTTP {status}: {body}")]
    Status {
        method: &'static str,
        url: String,
        status: u16,
        body: String,
    },

    #[error("{method} {url} failed: {message}")]
    Transport {
        method: &'static str,
        url: String,
        message: String,
    },

    #[error("could not decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: std::io::Error,
    },

    #[error("site '{0}' not found")]
    SiteNotFound(String),
}
