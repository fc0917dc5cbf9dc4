//! `sites-backup init` — write a starter config file.

use std::path::Path;

use anyhow::{Context, Result, bail};
use console::style;

/// Commented starter config.  Every value shown is the built-in default.
pub const TEMPLATE: &str = r#"# sites-backup configuration
#
# Command-line flags override everything in this file.

[platform]
# API base URL (or set PLATFORM_URL)
url          = "https://api.example.com"
# Bearer token; prefer the PLATFORM_TOKEN environment variable
# token      = ""
timeout_secs = 30

[defaults]
# all | code | database | files
element        = "all"
# commit | ignore | skip  (pending sftp changes before a code backup)
changes        = "commit"
# an environment id (dev, test, live, ...) or all
env            = "all"
commit_message = "Commit pending changes before backup"
"#;

/// Write [`TEMPLATE`] to `path`, refusing to overwrite an existing file.
pub fn run(path: &Path) -> Result<()> {
    if path.exists() {
        bail!(
            "{} already exists, refusing to overwrite it",
            path.display()
        );
    }

    std::fs::write(path, TEMPLATE).with_context(|| format!("writing {}", path.display()))?;

    println!(
        "  {}  {}",
        style("✓").green().bold(),
        style(format!("Wrote {}", path.display())).bold()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, PartialConfig};

    #[test]
    fn template_parses_to_defaults_plus_url() {
        let partial: PartialConfig = toml::from_str(TEMPLATE).expect("template must be valid TOML");
        let cfg = partial.resolve();
        assert_eq!(cfg.platform.url.as_deref(), Some("https://api.example.com"));
        assert_eq!(cfg.defaults, Config::default().defaults);
    }

    #[test]
    fn init_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sites-backup.toml");
        run(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), TEMPLATE);
    }

    #[test]
    fn init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sites-backup.toml");
        std::fs::write(&path, "# mine").unwrap();

        let err = run(&path).unwrap_err();
        assert!(err.to_string().contains("already exists"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# mine");
    }
}
