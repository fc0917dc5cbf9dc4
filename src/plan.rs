//! Backup plan construction.
//!
//! This module is responsible for *deciding* which site/environment pairs get
//! backed up.  It deliberately does **not** talk to the platform, so every
//! function here is pure and unit-testable without a client.

use tracing::debug;

use crate::{
    error::OptionError,
    options::EnvSelector,
    platform::{Environment, Site},
};

/// A site together with its environments, as fetched from the platform.
pub type Inventory = Vec<(Site, Vec<Environment>)>;

/// One backup to attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub site: Site,
    pub env: Environment,
}

impl Target {
    /// `site.env`, the label used in terminal output.
    pub fn label(&self) -> String {
        format!("{}.{}", self.site.name, self.env.id)
    }
}

/// Reject an environment id that no site in `inventory` has.
pub fn validate_env(inventory: &Inventory, selector: &EnvSelector) -> Result<(), OptionError> {
    match selector {
        EnvSelector::All => Ok(()),
        EnvSelector::Only(id) => {
            if inventory
                .iter()
                .any(|(_, envs)| envs.iter().any(|e| e.id == *id))
            {
                Ok(())
            } else {
                Err(OptionError::UnknownEnvironment(id.clone()))
            }
        },
    }
}

/// Flatten `inventory` into targets, keeping site order and, within a site,
/// environment order.
///
/// With a specific environment selected, sites that lack it contribute no
/// target.
pub fn build(inventory: Inventory, selector: &EnvSelector) -> Vec<Target> {
    let mut targets = Vec::new();
    for (site, envs) in inventory {
        let selected: Vec<Environment> = match selector {
            EnvSelector::All => envs,
            EnvSelector::Only(id) => envs.into_iter().filter(|e| e.id == *id).collect(),
        };
        if selected.is_empty() {
            debug!(site = %site.name, "no matching environment, skipping site");
            continue;
        }
        for env in selected {
            targets.push(Target {
                site: site.clone(),
                env,
            });
        }
    }
    targets
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::fake::{env, site};

    fn inventory() -> Inventory {
        vec![
            (site("blog", "u-1", vec![]), vec![
                env("dev", "git"),
                env("test", "git"),
                env("live", "git"),
            ]),
            (site("shop", "u-1", vec![]), vec![
                env("dev", "sftp"),
                env("feature-x", "sftp"),
                env("test", "git"),
                env("live", "git"),
            ]),
        ]
    }

    fn labels(targets: &[Target]) -> Vec<String> {
        targets.iter().map(Target::label).collect()
    }

    #[test]
    fn all_selects_every_environment_per_site() {
        let targets = build(inventory(), &EnvSelector::All);
        assert_eq!(targets.len(), 7);
        assert_eq!(targets.iter().filter(|t| t.site.name == "blog").count(), 3);
    }

    #[test]
    fn specific_env_picks_one_per_site() {
        let targets = build(inventory(), &EnvSelector::Only("live".into()));
        assert_eq!(labels(&targets), ["blog.live", "shop.live"]);
    }

    #[test]
    fn sites_without_the_env_are_skipped() {
        let targets = build(inventory(), &EnvSelector::Only("feature-x".into()));
        assert_eq!(labels(&targets), ["shop.feature-x"]);
    }

    #[test]
    fn validate_env_accepts_all_and_known_ids() {
        assert!(validate_env(&inventory(), &EnvSelector::All).is_ok());
        assert!(validate_env(&inventory(), &EnvSelector::Only("feature-x".into())).is_ok());
    }

    #[test]
    fn validate_env_rejects_unknown_id() {
        let err = validate_env(&inventory(), &EnvSelector::Only("staging".into())).unwrap_err();
        assert!(matches!(err, OptionError::UnknownEnvironment(ref id) if id == "staging"));
    }

    #[test]
    fn validate_env_rejects_anything_on_empty_inventory() {
        assert!(validate_env(&Vec::new(), &EnvSelector::Only("dev".into())).is_err());
    }

    // ── insta snapshots ───────────────────────────────────────────────────────

    #[test]
    fn snapshot_plan_all_environments() {
        insta::assert_debug_snapshot!(labels(&build(inventory(), &EnvSelector::All)), @r###"
        [
            "blog.dev",
            "blog.test",
            "blog.live",
            "shop.dev",
            "shop.feature-x",
            "shop.test",
            "shop.live",
        ]
        "###);
    }
}
