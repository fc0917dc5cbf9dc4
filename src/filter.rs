//! Site filter pipeline.
//!
//! Each filter narrows a `Vec<Site>` and never widens it.  [`apply`] runs the
//! active ones in a fixed order: team, organisation, name, owner.

use regex::Regex;
use tracing::debug;

use crate::{
    options::{BackupOptions, OrgFilter},
    platform::{ORGANIZATION, Session, Site, TEAM},
};

/// Keep sites with a team membership.
pub fn by_team(sites: Vec<Site>) -> Vec<Site> {
    sites
        .into_iter()
        .filter(|s| s.memberships.iter().any(|m| m.name == TEAM))
        .collect()
}

/// Keep sites with any organisation membership, or with a membership whose id
/// is exactly `org_id`.
pub fn by_org(sites: Vec<Site>, org: &OrgFilter) -> Vec<Site> {
    sites
        .into_iter()
        .filter(|s| {
            s.memberships.iter().any(|m| match org {
                OrgFilter::All => m.kind == ORGANIZATION,
                OrgFilter::Id(id) => m.id == *id,
            })
        })
        .collect()
}

/// Keep sites whose name contains a match for `pattern`.
pub fn by_name(sites: Vec<Site>, pattern: &Regex) -> Vec<Site> {
    sites
        .into_iter()
        .filter(|s| pattern.is_match(&s.name))
        .collect()
}

pub fn by_owner(sites: Vec<Site>, owner: &str) -> Vec<Site> {
    sites.into_iter().filter(|s| s.owner == owner).collect()
}

/// Map an organisation *name* to its membership id.
///
/// Ids pass through untouched; a value that matches no id but equals the name
/// of an organisation membership somewhere in `sites` becomes that
/// membership's id.
pub fn resolve_org(org: &OrgFilter, sites: &[Site]) -> OrgFilter {
    let OrgFilter::Id(value) = org else {
        return OrgFilter::All;
    };

    let memberships = || sites.iter().flat_map(|s| s.memberships.iter());
    if memberships().any(|m| m.id == *value) {
        return org.clone();
    }

    match memberships().find(|m| m.kind == ORGANIZATION && m.name == *value) {
        Some(m) => {
            debug!(org = %value, id = %m.id, "resolved organisation name");
            OrgFilter::Id(m.id.clone())
        },
        None => org.clone(),
    }
}

/// Run every filter enabled in `opts` over `sites`.
pub fn apply(sites: Vec<Site>, opts: &BackupOptions, session: &Session) -> Vec<Site> {
    let mut sites = sites;

    if opts.team {
        sites = by_team(sites);
    }
    if let Some(org) = &opts.org {
        let org = resolve_org(org, &sites);
        sites = by_org(sites, &org);
    }
    if let Some(pattern) = &opts.name {
        sites = by_name(sites, pattern);
    }
    if let Some(owner) = &opts.owner {
        sites = by_owner(sites, owner.resolve(&session.user_id));
    }

    sites
}

// ─── Tests ────────────────────────────────────────────────────────────────────
