//! Command-line interface definition.
//!
//! All argument parsing lives here so the rest of the codebase can stay
//! agnostic to `clap`.  The `Cli` struct is parsed once in `main` and then
//! passed (by reference) into the command handlers.
//!
//! Option values with a closed vocabulary (`--element`, `--changes`) are kept
//! as strings at this layer: config-file defaults go through the same
//! validation in [`crate::options`].

use std::path::PathBuf;

use clap::Parser;

/// Top-level CLI arguments.
#[derive(Parser, Debug)]
#[command(
    name    = "sites-backup",
    about   = "Back up every hosted site the current user can access",
    version,
    help_template = "\
{before-help}{name} {version}
{about}

{usage-heading} {usage}

{all-args}{after-help}"
)]
pub struct Cli {
    /// Path to the configuration file.
    ///
    /// Defaults to `sites-backup.toml` in the current working directory.
    /// Values here override the global `~/.config/sites-backup/config.toml`.
    #[arg(short, long, default_value = "sites-backup.toml")]
    pub config: PathBuf,

    /// Subcommand to run.  Omit to back up sites.
    #[command(subcommand)]
    pub command: Option<Subcommand>,

    /// Print the merged configuration and exit without contacting the platform.
    #[arg(long)]
    pub print_config: bool,

    /// Platform API base URL.
    #[arg(long, env = "PLATFORM_URL")]
    pub url: Option<String>,

    /// Platform API token.
    #[arg(long, env = "PLATFORM_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Environment to back up: an environment id, or `all`.
    #[arg(long)]
    pub env: Option<String>,

    /// Element to back up: all, code, database or files.
    #[arg(long)]
    pub element: Option<String>,

    /// What to do with uncommitted sftp changes: commit, ignore or skip.
    ///
    /// Only consulted for sftp-mode environments when the element includes
    /// code (`all` or `code`).
    #[arg(long)]
    pub changes: Option<String>,

    /// Only sites that belong to a team.
    #[arg(long)]
    pub team: bool,

    /// Only sites owned by this user id; `me` means the authenticated user.
    #[arg(long)]
    pub owner: Option<String>,

    /// Only sites of this organisation (id or name); `all` for any organisation.
    #[arg(long)]
    pub org: Option<String>,

    /// Only sites whose name matches this regular expression (unanchored).
    #[arg(long)]
    pub name: Option<String>,

    /// Use the cached site list instead of refreshing it first.
    #[arg(long)]
    pub cached: bool,
}

/// Explicit subcommands.  Running `sites-backup` with no subcommand backs up
/// every matching site.
#[derive(clap::Subcommand, Debug, PartialEq)]
pub enum Subcommand {
    /// Scaffold a `sites-backup.toml` in the current directory.
    ///
    /// Exits with an error if the file already exists to avoid accidental
    /// overwrites.
    Init,
}
