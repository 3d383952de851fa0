//! Readable messages from Rolldown's batched build diagnostics.
//!
//! Rolldown reports failures as a batch that only exposes `Debug`. The batch
//! is split into its entries, each entry is classified, and its text is
//! collapsed onto one line.

use std::fmt;

/// Broad category of a bundler diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
    UnresolvedImport,
    MissingExport,
    ParseError,
    Plugin,
    Other,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DiagnosticKind::UnresolvedImport => "Unresolved import",
            DiagnosticKind::MissingExport => "Missing export",
            DiagnosticKind::ParseError => "Parse error",
            DiagnosticKind::Plugin => "Plugin error",
            DiagnosticKind::Other => "Error",
        };
        f.write_str(name)
    }
}

/// One entry of a bundler error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleDiagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
}

/// Splits a bundler error into diagnostics.
pub fn extract(error: &dyn fmt::Debug) -> Vec<BundleDiagnostic> {
    let text = format!("{error:?}");
    let entries = split_batch(&text);

    entries
        .into_iter()
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| BundleDiagnostic {
            kind: classify(entry),
            message: collapse(entry),
        })
        .collect()
}

/// Renders diagnostics as a single line.
pub fn render(diagnostics: &[BundleDiagnostic]) -> String {
    match diagnostics {
        [] => "unknown bundler error".to_string(),
        [single] => format!("{}: {}", single.kind, single.message),
        many => format!(
            "{} errors: {}",
            many.len(),
            many.iter()
                .map(|d| format!("{}: {}", d.kind, d.message))
                .collect::<Vec<_>>()
                .join("; ")
        ),
    }
}

fn classify(entry: &str) -> DiagnosticKind {
    if entry.contains("UnresolvedImport") || entry.contains("Cannot resolve") {
        DiagnosticKind::UnresolvedImport
    } else if entry.contains("MissingExport") {
        DiagnosticKind::MissingExport
    } else if entry.contains("Parse") || entry.contains("Syntax") || entry.contains("Expected") {
        DiagnosticKind::ParseError
    } else if entry.contains("Plugin") {
        DiagnosticKind::Plugin
    } else {
        DiagnosticKind::Other
    }
}

/// Entries of the outermost `[...]` list at depth zero, or the whole text.
fn split_batch(text: &str) -> Vec<&str> {
    let (Some(open), Some(close)) = (text.find('['), text.rfind(']')) else {
        return vec![text];
    };
    if close <= open {
        return vec![text];
    }

    let inner = &text[open + 1..close];
    let mut entries = Vec::new();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    let mut start = 0;

    for (i, c) in inner.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                entries.push(&inner[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    entries.push(&inner[start..]);
    entries
}

fn collapse(entry: &str) -> String {
    entry
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace("\\\"", "\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    #[derive(Debug)]
    struct UnresolvedImport {
        specifier: &'static str,
        importer: &'static str,
    }

    #[allow(dead_code)]
    #[derive(Debug)]
    struct ParseError {
        message: &'static str,
    }

    #[allow(dead_code)]
    #[derive(Debug)]
    enum Event {
        Unresolved(UnresolvedImport),
        Parse(ParseError),
    }

    #[allow(dead_code)]
    #[derive(Debug)]
    struct Batch(Vec<Event>);

    /// Prints the alternate (multi-line) form as its plain `Debug`.
    struct Pretty<'a>(&'a Batch);

    impl fmt::Debug for Pretty<'_> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{:#?}", self.0)
        }
    }

    #[test]
    fn test_batch_is_split_per_entry() {
        let batch = Batch(vec![
            Event::Unresolved(UnresolvedImport {
                specifier: "chai-as-promised",
                importer: "/app/.chai-vendor/entry.js",
            }),
            Event::Parse(ParseError {
                message: "Expected `;`, found `,`",
            }),
        ]);

        let diagnostics = extract(&batch);
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::UnresolvedImport);
        assert!(diagnostics[0].message.contains("chai-as-promised"));
        assert_eq!(diagnostics[1].kind, DiagnosticKind::ParseError);
    }

    #[test]
    fn test_pretty_debug_is_collapsed() {
        let batch = Batch(vec![Event::Unresolved(UnresolvedImport {
            specifier: "x",
            importer: "/app/entry.js",
        })]);
        let diagnostics = extract(&Pretty(&batch));
        assert_eq!(diagnostics.len(), 1);
        assert!(!diagnostics[0].message.contains('\n'));
        assert!(!diagnostics[0].message.contains("  "));
    }

    #[test]
    fn test_plain_error_is_one_diagnostic() {
        let diagnostics = extract(&"boom");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(render(&diagnostics), "Error: \"boom\"");
    }

    #[test]
    fn test_render_many() {
        let diagnostics = vec![
            BundleDiagnostic {
                kind: DiagnosticKind::MissingExport,
                message: "default".into(),
            },
            BundleDiagnostic {
                kind: DiagnosticKind::Plugin,
                message: "load failed".into(),
            },
        ];
        assert_eq!(
            render(&diagnostics),
            "2 errors: Missing export: default; Plugin error: load failed"
        );
        assert_eq!(render(&[]), "unknown bundler error");
    }
}
