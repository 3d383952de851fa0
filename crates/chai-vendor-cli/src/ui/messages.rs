//! Status lines on stderr.

use owo_colors::Style;

use super::paint;

pub fn success(message: &str) {
    eprintln!("{} {}", paint("✓", Style::new().green().bold()), message);
}

pub fn info(message: &str) {
    eprintln!("{} {}", paint("ℹ", Style::new().blue().bold()), message);
}

pub fn warning(message: &str) {
    eprintln!(
        "{} {}",
        paint("⚠", Style::new().yellow().bold()),
        paint(message, Style::new().yellow())
    );
}
