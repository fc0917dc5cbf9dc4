//! Terminal UI — spinners, per-target result lines, and the closing summary.
//!
//! # Design goals
//!
//! - **Clean by default.** While a remote request is in flight the user sees only a spinner and
//!   the `site.env` label.  Structured notices go through `tracing` on stderr.
//! - **Informative on failure.** A failed target prints the platform's error message directly
//!   under its ✗ line, and the summary lists every failed target again.
//! - **Testable without a terminal.** [`BackupOutcome`] is plain data; indicatif hides the
//!   spinner automatically when stderr is not a TTY.

use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

// ─── Icons ───────────────────────────────────────────────────────────────────

/// Braille spinner frames — same style as indicatif's default.
static SPINNER_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

fn icon_ok() -> console::StyledObject<&'static str> {
    style("✓").green().bold()
}
fn icon_err() -> console::StyledObject<&'static str> {
    style("✗").red().bold()
}
fn icon_skip() -> console::StyledObject<&'static str> {
    style("–").yellow().bold()
}
/// Cyan ✓ next to the final success summary.
fn icon_done() -> console::StyledObject<&'static str> {
    style("✓").cyan().bold()
}

// ─── Outcome ─────────────────────────────────────────────────────────────────

/// How a single site/environment backup ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeKind {
    /// The backup workflow was started; carries the workflow id.
    Created(String),
    /// The backup was deliberately not requested (pending changes + `skip`).
    Cancelled,
    /// A remote call failed; carries the error message.
    Failed(String),
}

/// The outcome of one backup target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupOutcome {
    /// `site.env`.
    pub label: String,
    pub kind: OutcomeKind,
}

impl BackupOutcome {
    pub fn created(label: &str, workflow_id: &str) -> Self {
        Self {
            label: label.to_string(),
            kind: OutcomeKind::Created(workflow_id.to_string()),
        }
    }

    pub fn cancelled(label: &str) -> Self {
        Self {
            label: label.to_string(),
            kind: OutcomeKind::Cancelled,
        }
    }

    pub fn failure(label: &str, error: &str) -> Self {
        Self {
            label: label.to_string(),
            kind: OutcomeKind::Failed(error.to_string()),
        }
    }

    /// Print the one-line result (✓ / – / ✗ + label) to stdout.
    ///
    /// On failure the error message follows on stderr.
    pub fn print(&self) {
        match &self.kind {
            OutcomeKind::Created(workflow) => println!(
                "  {}  {}  {}",
                icon_ok(),
                style(&self.label).bold(),
                style(format!("workflow {workflow}")).dim()
            ),
            OutcomeKind::Cancelled => println!(
                "  {}  {}  {}",
                icon_skip(),
                style(&self.label).bold(),
                style("skipped: uncommitted changes").dim()
            ),
            OutcomeKind::Failed(msg) => {
                println!("  {}  {}", icon_err(), style(&self.label).bold());
                eprintln!("     {} {}", style("Error:").red().bold(), msg);
            },
        }
    }

    pub const fn failed(&self) -> bool {
        matches!(self.kind, OutcomeKind::Failed(_))
    }
}

// ─── Spinner ──────────────────────────────────────────────────────────────────

/// Create and start an indeterminate spinner for `label`.
fn make_spinner(label: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let spinner_style = ProgressStyle::with_template("  {spinner:.cyan}  {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars(SPINNER_CHARS);
    pb.set_style(spinner_style);
    pb.set_message(format!("{}", style(label).dim()));
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Run `f` behind a spinner labelled `label`.
///
/// The spinner is cleared before returning, so whatever the caller prints next
/// lands on a clean line.
pub fn with_spinner<T>(label: &str, f: impl FnOnce() -> T) -> T {
    let spinner = make_spinner(label);
    let result = f();
    spinner.finish_and_clear();
    result
}

// ─── Summary banner ───────────────────────────────────────────────────────────

/// Counts per outcome kind, in the order created / cancelled / failed.
pub fn tally(outcomes: &[BackupOutcome]) -> (usize, usize, usize) {
    outcomes
        .iter()
        .fold((0, 0, 0), |(ok, skip, err), o| match o.kind {
            OutcomeKind::Created(_) => (ok + 1, skip, err),
            OutcomeKind::Cancelled => (ok, skip + 1, err),
            OutcomeKind::Failed(_) => (ok, skip, err + 1),
        })
}

/// Print the final summary after every target has been attempted.
pub fn print_summary(outcomes: &[BackupOutcome]) {
    let (created, cancelled, failed) = tally(outcomes);
    println!();
    if failed == 0 {
        println!(
            "  {} {}",
            icon_done(),
            style(format!(
                "{created} backup(s) started, {cancelled} skipped."
            ))
            .cyan()
            .bold()
        );
    } else {
        eprintln!(
            "  {}  {}",
            icon_err(),
            style(format!(
                "{failed} backup(s) failed, {created} started, {cancelled} skipped."
            ))
            .red()
            .bold()
        );
        for o in outcomes.iter().filter(|o| o.failed()) {
            eprintln!("    {} {}", icon_err(), style(&o.label).red());
        }
    }
    println!();
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn created_outcome_is_not_failed() {
        assert!(!BackupOutcome::created("blog.dev", "wf-1").failed());
    }

    #[test]
    fn cancelled_outcome_is_not_failed() {
        assert!(!BackupOutcome::cancelled("blog.dev").failed());
    }

    #[test]
    fn failure_outcome_is_failed() {
        let o = BackupOutcome::failure("blog.dev", "HTTP 500");
        assert!(o.failed());
        assert_eq!(o.kind, OutcomeKind::Failed("HTTP 500".into()));
    }

    #[test]
    fn with_spinner_returns_closure_value() {
        assert_eq!(with_spinner("blog.dev", || 41 + 1), 42);
    }

    #[test]
    fn tally_counts_each_kind() {
        let outcomes = vec![
            BackupOutcome::created("a.dev", "wf-1"),
            BackupOutcome::created("a.test", "wf-2"),
            BackupOutcome::cancelled("a.live"),
            BackupOutcome::failure("b.dev", "boom"),
        ];
        assert_eq!(tally(&outcomes), (2, 1, 1));
    }

    #[test]
    fn tally_of_nothing_is_zero() {
        assert_eq!(tally(&[]), (0, 0, 0));
    }

    #[test]
    fn print_and_summary_do_not_panic() {
        let outcomes = vec![
            BackupOutcome::created("a.dev", "wf-1"),
            BackupOutcome::cancelled("a.live"),
            BackupOutcome::failure("b.dev", "boom"),
        ];
        for o in &outcomes {
            o.print();
        }
        print_summary(&outcomes);
        print_summary(&outcomes[..1]);
    }
}
