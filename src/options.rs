//! Typed command options.
//!
//! The command line and the config file both deliver loose strings.  They are
//! turned into a single [`BackupOptions`] here, once, before anything talks to
//! the platform.  Every closed vocabulary gets its own enum so the rest of the
//! crate never compares option strings again.

use std::{fmt, str::FromStr};

use regex::Regex;

use crate::{cli::Cli, config::Config, error::OptionError};

// ─── Element ──────────────────────────────────────────────────────────────────

/// What a backup covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Element {
    #[default]
    All,
    Code,
    Database,
    Files,
}

impl Element {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Code => "code",
            Self::Database => "database",
            Self::Files => "files",
        }
    }

    /// Whether a backup of this element includes the codebase, and therefore
    /// whatever uncommitted sftp changes sit on top of it.
    pub const fn includes_code(self) -> bool {
        matches!(self, Self::All | Self::Code)
    }
}

impl FromStr for Element {
    type Err = OptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "code" => Ok(Self::Code),
            "database" => Ok(Self::Database),
            "files" => Ok(Self::Files),
            other => Err(OptionError::InvalidElement(other.to_string())),
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Changes policy ───────────────────────────────────────────────────────────

/// What to do with uncommitted sftp changes before a code backup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChangesPolicy {
    #[default]
    Commit,
    Ignore,
    Skip,
}

impl FromStr for ChangesPolicy {
    type Err = OptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "commit" => Ok(Self::Commit),
            "ignore" => Ok(Self::Ignore),
            "skip" => Ok(Self::Skip),
            other => Err(OptionError::InvalidChanges(other.to_string())),
        }
    }
}

impl fmt::Display for ChangesPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Commit => "commit",
            Self::Ignore => "ignore",
            Self::Skip => "skip",
        })
    }
}

// ─── Selectors ────────────────────────────────────────────────────────────────

/// Which environments of each site to back up.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EnvSelector {
    #[default]
    All,
    Only(String),
}

impl EnvSelector {
    fn parse(s: &str) -> Result<Self, OptionError> {
        match s {
            "" => Err(OptionError::Empty("env")),
            "all" => Ok(Self::All),
            id => Ok(Self::Only(id.to_string())),
        }
    }
}

/// `--org` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrgFilter {
    /// Any organisation membership.
    All,
    /// A membership id, or an organisation name still to be resolved to one.
    Id(String),
}

impl OrgFilter {
    fn parse(s: &str) -> Result<Self, OptionError> {
        match s {
            "" => Err(OptionError::Empty("org")),
            "all" => Ok(Self::All),
            id => Ok(Self::Id(id.to_string())),
        }
    }
}

/// `--owner` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnerFilter {
    /// The authenticated user.
    Me,
    Id(String),
}

impl OwnerFilter {
    fn parse(s: &str) -> Result<Self, OptionError> {
        match s {
            "" => Err(OptionError::Empty("owner")),
            "me" => Ok(Self::Me),
            id => Ok(Self::Id(id.to_string())),
        }
    }

    /// The concrete owner id to compare against.
    pub fn resolve<'a>(&'a self, current_user_id: &'a str) -> &'a str {
        match self {
            Self::Me => current_user_id,
            Self::Id(id) => id,
        }
    }
}

// ─── BackupOptions ────────────────────────────────────────────────────────────

/// Everything the backup command needs to know, validated.
#[derive(Debug, Clone)]
pub struct BackupOptions {
    pub element: Element,
    pub changes: ChangesPolicy,
    pub env: EnvSelector,
    pub team: bool,
    pub owner: Option<OwnerFilter>,
    pub org: Option<OrgFilter>,
    /// Unanchored: matches anywhere in the site name.
    pub name: Option<Regex>,
    /// Reuse the platform's site list instead of refreshing it first.
    pub cached: bool,
    pub commit_message: String,
}

impl Default for BackupOptions {
    fn default() -> Self {
        Self {
            element: Element::All,
            changes: ChangesPolicy::Commit,
            env: EnvSelector::All,
            team: false,
            owner: None,
            org: None,
            name: None,
            cached: false,
            commit_message: crate::config::default_commit_message(),
        }
    }
}

impl BackupOptions {
    /// Merge command-line flags over config defaults and validate the result.
    ///
    /// Nothing here touches the network, so a bad value always stops the
    /// command before any remote call.
    pub fn from_cli(cli: &Cli, cfg: &Config) -> Result<Self, OptionError> {
        let defaults = &cfg.defaults;

        let element = cli.element.as_deref().unwrap_or(&defaults.element).parse()?;
        let changes = cli.changes.as_deref().unwrap_or(&defaults.changes).parse()?;
        let env = EnvSelector::parse(cli.env.as_deref().unwrap_or(&defaults.env))?;

        let owner = cli.owner.as_deref().map(OwnerFilter::parse).transpose()?;
        let org = cli.org.as_deref().map(OrgFilter::parse).transpose()?;
        let name = cli
            .name
            .as_deref()
            .map(|pattern| {
                Regex::new(pattern).map_err(|source| OptionError::InvalidNamePattern {
                    pattern: pattern.to_string(),
                    source,
                })
            })
            .transpose()?;

        Ok(Self {
            element,
            changes,
            env,
            team: cli.team,
            owner,
            org,
            name,
            cached: cli.cached,
            commit_message: defaults.commit_message.clone(),
        })
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    fn make_cli(extra: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("sites-backup").chain(extra.iter().copied()))
    }

    fn parse(extra: &[&str]) -> Result<BackupOptions, OptionError> {
        BackupOptions::from_cli(&make_cli(extra), &Config::default())
    }

    // ── defaults ──────────────────────────────────────────────────────────────

    #[test]
    fn defaults_are_all_commit_all() {
        let opts = parse(&[]).unwrap();
        assert_eq!(opts.element, Element::All);
        assert_eq!(opts.changes, ChangesPolicy::Commit);
        assert_eq!(opts.env, EnvSelector::All);
        assert!(!opts.team);
        assert!(!opts.cached);
        assert!(opts.owner.is_none() && opts.org.is_none() && opts.name.is_none());
    }

    #[test]
    fn config_defaults_apply_when_flag_absent() {
        let mut cfg = Config::default();
        cfg.defaults.element = "database".into();
        cfg.defaults.changes = "skip".into();
        cfg.defaults.env = "live".into();

        let opts = BackupOptions::from_cli(&make_cli(&[]), &cfg).unwrap();
        assert_eq!(opts.element, Element::Database);
        assert_eq!(opts.changes, ChangesPolicy::Skip);
        assert_eq!(opts.env, EnvSelector::Only("live".into()));
    }

    #[test]
    fn flags_win_over_config_defaults() {
        let mut cfg = Config::default();
        cfg.defaults.element = "database".into();

        let opts = BackupOptions::from_cli(&make_cli(&["--element", "files"]), &cfg).unwrap();
        assert_eq!(opts.element, Element::Files);
    }

    // ── element / changes vocabularies ────────────────────────────────────────

    #[test]
    fn every_element_parses() {
        for (s, e) in [
            ("all", Element::All),
            ("code", Element::Code),
            ("database", Element::Database),
            ("files", Element::Files),
        ] {
            assert_eq!(s.parse::<Element>().unwrap(), e);
            assert_eq!(e.to_string(), s);
        }
    }

    #[test]
    fn invalid_elements_are_rejected() {
        for bad in ["ALL", "db", "code,files", "everything"] {
            let err = parse(&["--element", bad]).unwrap_err();
            assert!(matches!(err, OptionError::InvalidElement(ref v) if v == bad));
        }
    }

    #[test]
    fn invalid_changes_are_rejected() {
        for bad in ["Commit", "discard", "keep"] {
            let err = parse(&["--changes", bad]).unwrap_err();
            assert!(matches!(err, OptionError::InvalidChanges(ref v) if v == bad));
        }
    }

    #[test]
    fn invalid_config_default_is_rejected_too() {
        let mut cfg = Config::default();
        cfg.defaults.changes = "yolo".into();
        assert!(BackupOptions::from_cli(&make_cli(&[]), &cfg).is_err());
    }

    #[test]
    fn only_all_and_code_include_code() {
        assert!(Element::All.includes_code());
        assert!(Element::Code.includes_code());
        assert!(!Element::Database.includes_code());
        assert!(!Element::Files.includes_code());
    }

    // ── selectors ─────────────────────────────────────────────────────────────

    #[test]
    fn env_selector_parses_specific_id() {
        let opts = parse(&["--env", "multidev-1"]).unwrap();
        assert_eq!(opts.env, EnvSelector::Only("multidev-1".into()));
    }

    #[test]
    fn empty_selectors_are_rejected() {
        assert!(matches!(EnvSelector::parse(""), Err(OptionError::Empty("env"))));
        assert!(matches!(OwnerFilter::parse(""), Err(OptionError::Empty("owner"))));
        assert!(matches!(OrgFilter::parse(""), Err(OptionError::Empty("org"))));
    }

    #[test]
    fn owner_me_resolves_to_current_user() {
        let opts = parse(&["--owner", "me"]).unwrap();
        let owner = opts.owner.unwrap();
        assert_eq!(owner, OwnerFilter::Me);
        assert_eq!(owner.resolve("u-7"), "u-7");
    }

    #[test]
    fn owner_id_resolves_to_itself() {
        let owner = parse(&["--owner", "u-1"]).unwrap().owner.unwrap();
        assert_eq!(owner.resolve("u-7"), "u-1");
    }

    #[test]
    fn org_all_and_id() {
        assert_eq!(parse(&["--org", "all"]).unwrap().org, Some(OrgFilter::All));
        assert_eq!(
            parse(&["--org", "org-9"]).unwrap().org,
            Some(OrgFilter::Id("org-9".into()))
        );
    }

    #[test]
    fn name_pattern_is_compiled() {
        let opts = parse(&["--name", "^blog"]).unwrap();
        assert!(opts.name.unwrap().is_match("blog-site"));
    }

    #[test]
    fn broken_name_pattern_is_rejected() {
        assert!(matches!(
            parse(&["--name", "(unclosed"]).unwrap_err(),
            OptionError::InvalidNamePattern { .. }
        ));
    }
}
