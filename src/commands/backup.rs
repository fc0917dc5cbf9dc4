//! Default command — back up every matching site.
//!
//! # Flow
//!
//! | # | Step          | Description                                              |
//! |---|---------------|----------------------------------------------------------|
//! | 1 | Refresh       | Rebuild the site list (skipped with `--cached`)          |
//! | 2 | Filter        | team → org → name → owner                                |
//! | 3 | Inventory     | Fetch environments of every surviving site               |
//! | 4 | Validate env  | `--env <id>` must exist on at least one site             |
//! | 5 | Back up       | Per target: pending-change policy, then backup request   |
//!
//! Steps 1–4 only read.  A failure there aborts the command before anything
//! is mutated.  In step 5 each target is independent: a failed request is
//! reported and the loop moves on to the next target.

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::{
    filter,
    options::{BackupOptions, ChangesPolicy, Element},
    plan::{self, Inventory, Target},
    platform::{Platform, Session, Workflow},
    ui::{BackupOutcome, print_summary, with_spinner},
};

// ─── Entry point ──────────────────────────────────────────────────────────────

/// Back up every site/environment selected by `opts`.
///
/// Returns one outcome per attempted target.  Individual backup failures are
/// part of the returned outcomes, not an `Err`.
pub fn run<P: Platform>(
    platform: &P,
    session: &Session,
    opts: &BackupOptions,
) -> Result<Vec<BackupOutcome>> {
    if !opts.cached {
        platform
            .rebuild_cache()
            .context("refreshing the site list")?;
    }
    let sites = platform.sites().context("listing sites")?;
    let sites = filter::apply(sites, opts, session);

    if sites.is_empty() {
        warn!("You have no sites matching the given filters.");
        return Ok(Vec::new());
    }

    let mut inventory: Inventory = Vec::with_capacity(sites.len());
    for site in sites {
        let envs = platform
            .environments(&site)
            .with_context(|| format!("listing environments of {}", site.name))?;
        inventory.push((site, envs));
    }

    plan::validate_env(&inventory, &opts.env)?;
    let targets = plan::build(inventory, &opts.env);

    println!();
    let mut outcomes = Vec::with_capacity(targets.len());
    for target in &targets {
        let label = target.label();
        let outcome = match backup_target(platform, target, opts) {
            Ok(Some(workflow)) => BackupOutcome::created(&label, &workflow.id),
            Ok(None) => BackupOutcome::cancelled(&label),
            Err(e) => {
                warn!(
                    site = %target.site.name,
                    env = %target.env.id,
                    error = %format!("{e:#}"),
                    "backup failed"
                );
                BackupOutcome::failure(&label, &format!("{e:#}"))
            },
        };
        outcome.print();
        outcomes.push(outcome);
    }

    print_summary(&outcomes);
    Ok(outcomes)
}

// ─── Decision ─────────────────────────────────────────────────────────────────

/// What to do with one target once its pending changes are known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Nothing to reconcile; back up as is.
    Proceed,
    /// Commit pending changes, then back up.
    CommitFirst,
    /// Back up without the pending changes.
    IgnoreChanges,
    /// Do not back up.
    Cancel,
}

/// Whether the pending-change state of an environment matters at all.
///
/// Only sftp environments track uncommitted changes, and only backups that
/// include code would capture them.
pub const fn needs_diffstat(sftp: bool, element: Element) -> bool {
    sftp && element.includes_code()
}

/// Pick a [`Decision`] from pending-change presence and the configured policy.
pub const fn decide(has_changes: bool, policy: ChangesPolicy) -> Decision {
    if !has_changes {
        return Decision::Proceed;
    }
    match policy {
        ChangesPolicy::Commit => Decision::CommitFirst,
        ChangesPolicy::Ignore => Decision::IgnoreChanges,
        ChangesPolicy::Skip => Decision::Cancel,
    }
}

// ─── Backup procedure ─────────────────────────────────────────────────────────

/// Back up a single environment.
///
/// Returns the backup workflow, or `None` when the backup was cancelled
/// because of pending changes and `--changes=skip`.
pub fn backup_target<P: Platform>(
    platform: &P,
    target: &Target,
    opts: &BackupOptions,
) -> Result<Option<Workflow>> {
    let Target { site, env } = target;

    let decision = if needs_diffstat(env.is_sftp(), opts.element) {
        let diff = platform
            .diffstat(site, env)
            .with_context(|| format!("reading pending changes of {}", target.label()))?;
        if !diff.is_empty() {
            debug!(site = %site.name, env = %env.id, files = diff.len(), "pending changes");
        }
        decide(!diff.is_empty(), opts.changes)
    } else {
        Decision::Proceed
    };

    match decision {
        Decision::Proceed => {},
        Decision::CommitFirst => {
            info!(site = %site.name, env = %env.id, "Start committing changes");
            let workflow = with_spinner(&format!("{} (commit)", target.label()), || {
                platform.commit(site, env, &opts.commit_message)
            })
            .with_context(|| format!("committing pending changes of {}", target.label()))?;
            info!(site = %site.name, env = %env.id, workflow = %workflow.id, "End committing changes");
        },
        Decision::IgnoreChanges => {
            warn!(
                site = %site.name,
                env = %env.id,
                "Uncommitted changes will not be included in the backup"
            );
        },
        Decision::Cancel => {
            info!(
                site = %site.name,
                env = %env.id,
                "Uncommitted changes found, skipping backup"
            );
            return Ok(None);
        },
    }

    info!(site = %site.name, env = %env.id, element = %opts.element, "Start backup");
    let workflow = with_spinner(&target.label(), || {
        platform.create_backup(site, env, opts.element)
    })
    .with_context(|| format!("creating {} backup of {}", opts.element, target.label()))?;
    info!(site = %site.name, env = %env.id, workflow = %workflow.id, "End backup");

    Ok(Some(workflow))
}

// ─── Tests ────────────────────────────────────────────────────────────────────
