//! Subcommand handlers.
//!
//! Each file in this module corresponds to one user-facing command:
//!
//! | File          | Invocation              | Description                        |
//! |---------------|-------------------------|------------------------------------|
//! | `init.rs`     | `sites-backup init`     | Scaffold a `sites-backup.toml`     |
//! | `backup.rs`   | `sites-backup` (default)| Back up every matching site        |

pub mod backup;
pub mod init;
