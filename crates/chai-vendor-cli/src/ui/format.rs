//! Summaries of a vendoring run.

use chai_vendor::{ComposedTree, ImportDeclaration};
use console::Term;
use owo_colors::Style;
use std::path::Path;

use super::paint;

/// Format file size in human-readable form.
///
/// ```
/// use chai_vendor_cli::ui::format_size;
///
/// assert_eq!(format_size(0), "0 B");
/// assert_eq!(format_size(1536), "1.50 KB");
/// ```
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];

    let mut size = bytes as f64;
    let mut unit_idx = 0;
    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    if unit_idx == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.2} {}", size, UNITS[unit_idx])
    }
}

fn rule() -> String {
    let width = Term::stderr().size().1 as usize;
    "─".repeat(width.clamp(20, 80))
}

/// Print each vendored file with its owner and size, followed by a total.
pub fn print_tree_summary(tree: &ComposedTree, dir: &Path) {
    eprintln!(
        "\n{} {}",
        paint("Vendor tree", Style::new().bold().underline()),
        paint(&dir.display().to_string(), Style::new().dimmed())
    );
    eprintln!("{}", rule());

    for (path, entry) in tree.iter() {
        eprintln!(
            "  {} {} {} {}",
            paint("▸", Style::new().blue()),
            paint(path, Style::new().bright_white().bold()),
            paint(&format_size(entry.contents.len() as u64), Style::new().dimmed()),
            paint(&format!("({})", entry.owner), Style::new().dimmed()),
        );
    }

    eprintln!("{}", rule());
    eprintln!(
        "  {} {} in {} files",
        paint("Total:", Style::new().bold()),
        paint(&format_size(tree.total_bytes() as u64), Style::new().green()),
        tree.len()
    );
}

/// Print the import list in load order.
pub fn print_imports(imports: &[ImportDeclaration]) {
    eprintln!("\n{}", paint("Imports", Style::new().bold().underline()));
    for (index, import) in imports.iter().enumerate() {
        eprintln!(
            "  {:>2}. {} {}",
            index + 1,
            import.path,
            paint(&format!("[{}]", import.phase), Style::new().dimmed())
        );
    }
}
