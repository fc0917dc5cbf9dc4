//! Remote platform seam.
//!
//! The hosting platform exposes sites, their environments, and long-running
//! workflows.  This module defines plain data records for the parts the
//! backup command reads, plus the [`Platform`] trait listing the handful of
//! remote capabilities it needs.  The real implementation lives in
//! [`crate::http`]; tests substitute [`fake::FakePlatform`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{error::PlatformError, options::Element};

// ─── Records ──────────────────────────────────────────────────────────────────

/// Membership type tag for organisation memberships.
pub const ORGANIZATION: &str = "organization";

/// Name carried by team memberships.
pub const TEAM: &str = "Team";

/// Connection mode that enables on-server edits with pending-change tracking.
pub const SFTP: &str = "sftp";

/// A site the current user can see.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Site {
    pub id: String,
    pub name: String,
    /// User id of the site owner.
    pub owner: String,
    #[serde(default)]
    pub memberships: Vec<Membership>,
}

/// A site's association with a team or an organisation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Membership {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
    pub name: String,
}

/// One environment of a site (`dev`, `test`, `live`, or a multidev name).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Environment {
    pub id: String,
    #[serde(default = "default_connection_mode")]
    pub connection_mode: String,
}

fn default_connection_mode() -> String {
    "git".into()
}

impl Environment {
    pub fn is_sftp(&self) -> bool {
        self.connection_mode == SFTP
    }
}

/// A single uncommitted file change reported by the diffstat endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Default)]
pub struct FileChange {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub additions: u64,
    #[serde(default)]
    pub deletions: u64,
}

/// Uncommitted filesystem changes of an sftp-mode environment, keyed by path.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(transparent)]
pub struct Diffstat(pub BTreeMap<String, FileChange>);

impl Diffstat {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// An asynchronous platform operation started on our behalf.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Workflow {
    pub id: String,
    #[serde(default)]
    pub description: String,
}

/// The authenticated user on whose behalf the command runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
}

// ─── Capabilities ─────────────────────────────────────────────────────────────

/// Remote operations the backup command depends on.
///
/// Implementations are synchronous; each call is a single blocking request
/// with no retry.
pub trait Platform {
    /// Id of the user the credentials belong to.
    fn current_user_id(&self) -> Result<String, PlatformError>;

    /// Refresh the locally held site list from the platform.
    fn rebuild_cache(&self) -> Result<(), PlatformError>;

    /// Every site visible to the current user, in platform order.
    fn sites(&self) -> Result<Vec<Site>, PlatformError>;

    /// Environments of `site`, in platform order.
    fn environments(&self, site: &Site) -> Result<Vec<Environment>, PlatformError>;

    /// Uncommitted sftp changes of `env`, keyed by path.
    fn diffstat(&self, site: &Site, env: &Environment) -> Result<Diffstat, PlatformError>;

    /// Commit pending sftp changes.
    fn commit(&self, site: &Site, env: &Environment, message: &str)
    -> Result<Workflow, PlatformError>;

    /// Start a backup of `element` for the environment.
    fn create_backup(
        &self,
        site: &Site,
        env: &Environment,
        element: Element,
    ) -> Result<Workflow, PlatformError>;
}

impl Session {
    /// Ask the platform who we are.
    pub fn fetch(platform: &impl Platform) -> Result<Self, PlatformError> {
        Ok(Self {
            user_id: platform.current_user_id()?,
        })
    }
}

// ─── Test double ──────────────────────────────────────────────────────────────


// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn site_deserialises_membership_type_field() {
        let json = r#"{
            "id": "abc",
            "name": "blog",
            "owner": "u-1",
            "memberships": [{"type": "organization", "id": "org-1", "name": "Acme"}]
        }"#;
        let site: Site = serde_json::from_str(json).unwrap();
        assert_eq!(site.memberships[0].kind, ORGANIZATION);
        assert_eq!(site.memberships[0].name, "Acme");
    }

    #[test]
    fn site_without_memberships_defaults_to_empty() {
        let site: Site =
            serde_json::from_str(r#"{"id": "abc", "name": "blog", "owner": "u-1"}"#).unwrap();
        assert!(site.memberships.is_empty());
    }

    #[test]
    fn environment_defaults_to_git_mode() {
        let env: Environment = serde_json::from_str(r#"{"id": "dev"}"#).unwrap();
        assert!(!env.is_sftp());
    }

    #[test]
    fn diffstat_parses_path_map() {
        let json = r#"{"web/index.php": {"status": "M", "additions": 2, "deletions": 0}}"#;
        let diff: Diffstat = serde_json::from_str(json).unwrap();
        assert_eq!(diff.len(), 1);
        assert!(!diff.is_empty());
    }

    #[test]
    fn empty_diffstat_is_empty() {
        let diff: Diffstat = serde_json::from_str("{}").unwrap();
        assert!(diff.is_empty());
    }

    #[test]
    fn session_fetch_uses_current_user() {
        let fake = fake::FakePlatform {
            user_id: "u-42".into(),
            ..Default::default()
        };
        assert_eq!(Session::fetch(&fake).unwrap().user_id, "u-42");
    }
}
