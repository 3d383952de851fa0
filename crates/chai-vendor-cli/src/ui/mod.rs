//! Terminal output for the chai-vendor CLI.
//!
//! Status lines go to stderr so stdout stays clean for `check --json`.

mod format;
mod messages;
mod spinner;

pub use format::{format_size, print_imports, print_tree_summary};
pub use messages::{info, success, warning};
pub use spinner::Spinner;

use std::sync::atomic::{AtomicBool, Ordering};

static COLORS: AtomicBool = AtomicBool::new(true);

/// Check if running in a CI environment.
pub fn is_ci() -> bool {
    ["CI", "GITHUB_ACTIONS", "GITLAB_CI", "CIRCLECI", "TRAVIS"]
        .iter()
        .any(|var| std::env::var_os(var).is_some())
}

/// Whether colors should be used on stderr.
///
/// `NO_COLOR` wins over `FORCE_COLOR`; otherwise colors follow the terminal.
pub fn should_use_color() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if std::env::var_os("FORCE_COLOR").is_some() {
        return true;
    }
    console::user_attended_stderr()
}

/// Sets the global color override for all `ui` output.
pub fn init_colors(no_color: bool) {
    let enabled = !no_color && should_use_color();
    COLORS.store(enabled, Ordering::Relaxed);
    console::set_colors_enabled_stderr(enabled);
}

pub(crate) fn colors_enabled() -> bool {
    COLORS.load(Ordering::Relaxed)
}

pub(crate) fn paint(text: &str, style: owo_colors::Style) -> String {
    use owo_colors::OwoColorize;

    if colors_enabled() {
        text.style(style).to_string()
    } else {
        text.to_string()
    }
}
