//! Spinner for the build step.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use owo_colors::Style;
use std::time::Duration;

use super::paint;

/// Spinner on stderr, hidden when `quiet` or outside a terminal.
///
/// ```no_run
/// use chai_vendor_cli::ui::Spinner;
///
/// let spinner = Spinner::new("Vendoring chai...", false);
/// spinner.finish("Vendored 4 files");
/// ```
pub struct Spinner {
    pb: ProgressBar,
    quiet: bool,
}

impl Spinner {
    pub fn new(message: &str, quiet: bool) -> Self {
        let pb = if quiet || super::is_ci() || !console::user_attended_stderr() {
            ProgressBar::with_draw_target(None, ProgressDrawTarget::hidden())
        } else {
            ProgressBar::new_spinner()
        };

        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style.tick_strings(&["◐", "◓", "◑", "◒", "●"]));
        }
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));

        Self { pb, quiet }
    }

    pub fn set_message(&self, message: &str) {
        self.pb.set_message(message.to_string());
    }

    /// Finish with a green checkmark.
    pub fn finish(&self, message: &str) {
        self.finish_line(format!("{} {}", paint("✓", Style::new().green()), message));
    }

    /// Finish with a red cross.
    pub fn fail(&self, message: &str) {
        self.finish_line(format!("{} {}", paint("✗", Style::new().red()), message));
    }

    // A hidden bar draws nothing, so the final line is printed directly
    // unless output is suppressed.
    fn finish_line(&self, line: String) {
        if self.quiet {
            self.pb.finish_and_clear();
        } else if self.pb.is_hidden() {
            self.pb.finish_and_clear();
            eprintln!("{}", line);
        } else {
            self.pb.finish_with_message(line);
        }
    }

    pub fn is_hidden(&self) -> bool {
        self.pb.is_hidden()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_spinner_is_hidden() {
        let spinner = Spinner::new("Vendoring...", true);
        assert!(spinner.is_hidden());
        spinner.set_message("Bundling chai-as-promised");
        spinner.finish("Done");
    }

    #[test]
    fn test_spinner_fail() {
        let spinner = Spinner::new("Vendoring...", true);
        spinner.fail("Failed");
    }
}
