//! `sites-backup` — back up every hosted site the current user can access.
//!
//! # Overview
//!
//! Lists the sites visible to the authenticated user, narrows them with the
//! given filters, and asks the platform to start a backup for each matching
//! site/environment pair.  Pending sftp changes are committed, ignored, or
//! cause the backup to be skipped, depending on `--changes`.
//!
//! # Usage
//!
//! ```text
//! sites-backup                              # every environment of every site
//! sites-backup --env=live --element=database
//! sites-backup --owner=me --name='^shop'    # own sites whose name starts with "shop"
//! sites-backup --org=all --changes=skip
//! sites-backup init                         # scaffold sites-backup.toml
//! sites-backup --print-config               # show merged config and exit
//! ```
//!
//! # Module layout
//!
//! | Module                   | Responsibility                                |
//! |--------------------------|-----------------------------------------------|
//! | [`cli`]                  | Argument types parsed by clap                 |
//! | [`config`]               | `Config` struct + layered TOML loader         |
//! | [`options`]              | Typed, validated command options              |
//! | [`platform`]             | Remote records + the `Platform` trait         |
//! | [`http`]                 | Blocking REST implementation of `Platform`    |
//! | [`filter`]               | Site filter pipeline                          |
//! | [`plan`]                 | Site/environment target construction          |
//! | [`ui`]                   | Spinner, per-target lines, summary            |
//! | [`commands::init`]       | `sites-backup init` subcommand                |
//! | [`commands::backup`]     | Default backup run                            |

mod cli;
mod commands;
mod config;
mod error;
mod filter;
mod http;
mod options;
mod plan;
mod platform;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Subcommand};
use config::{PartialConfig, parse_partial};
use tracing_subscriber::EnvFilter;

use crate::{http::HttpPlatform, options::BackupOptions, platform::Session};

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match &cli.command {
        // ── sites-backup init ─────────────────────────────────────────────────
        Some(Subcommand::Init) => {
            commands::init::run(&cli.config)?;
        },

        // ── sites-backup (default run) ────────────────────────────────────────
        None => {
            let cfg = with_cli_overrides(load_merged_config(&cli.config)?, &cli);

            if cli.print_config {
                println!("{:#?}", cfg.redacted());
                return Ok(());
            }

            // Validate everything that can be validated offline first.
            let opts = BackupOptions::from_cli(&cli, &cfg)?;
            let platform = HttpPlatform::new(&cfg.platform)?;
            let session = Session::fetch(&platform).context("fetching the current session")?;

            commands::backup::run(&platform, &session, &opts)?;
        },
    }

    Ok(())
}

/// Route `tracing` output to stderr, filtered by `RUST_LOG`
/// (default `sites_backup=info`).
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sites_backup=info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Load configuration from two sources and merge them.
///
/// 1. `~/.config/sites-backup/config.toml` — global defaults (URL, token)
/// 2. `local_path` (default: `./sites-backup.toml`) — per-directory overrides
///
/// Local values win on a per-field basis.  Either file may be absent.
fn load_merged_config(local_path: &std::path::Path) -> Result<config::Config> {
    let global_path = dirs_next::config_dir().map(|d| d.join("sites-backup").join("config.toml"));

    let global: PartialConfig = match global_path.as_deref() {
        Some(p) => parse_partial(p)?.unwrap_or_default(),
        None => PartialConfig::default(),
    };

    let local: PartialConfig = if let Some(p) = parse_partial(local_path)? {
        p
    } else {
        tracing::warn!(
            "config file '{}' not found, using defaults. Run 'sites-backup init' to generate one.",
            local_path.display()
        );
        PartialConfig::default()
    };

    Ok(global.merge(local).resolve())
}

/// `--url` / `--token` (or their environment variables) beat both files.
fn with_cli_overrides(mut cfg: config::Config, cli: &Cli) -> config::Config {
    if let Some(url) = &cli.url {
        cfg.platform.url = Some(url.clone());
    }
    if let Some(token) = &cli.token {
        cfg.platform.token = Some(token.clone());
    }
    cfg
}
