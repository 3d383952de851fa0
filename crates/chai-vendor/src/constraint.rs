//! npm-style version range matching.
//!
//! Ranges are written the way `package.json` writes them (`^6 || ^7`,
//! `>=2.0.0`, `1.2 - 1.4`, `1.x`) and translated into `semver::VersionReq`
//! alternatives. Each `||` branch becomes one requirement; a version matches
//! when any branch matches.
//!
//! Nothing in this module fails loudly. An unparseable version or range simply
//! does not match, so a broken `package.json` in one dependency cannot abort a
//! whole build.

use std::fmt;
use std::str::FromStr;

use semver::{Version, VersionReq};
use thiserror::Error;
use tracing::{debug, warn};

/// Decides whether an installed package version satisfies a range.
pub trait ConstraintEvaluator: Send + Sync {
    fn satisfies(&self, package: &str, installed: &str, range: &str) -> bool;
}

/// Default evaluator backed by [`VersionRange`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SemverEvaluator;

impl ConstraintEvaluator for SemverEvaluator {
    fn satisfies(&self, package: &str, installed: &str, range: &str) -> bool {
        match check(installed, range) {
            Ok(matched) => matched,
            Err(err @ RangeError::InvalidVersion { .. }) => {
                debug!(package, installed, error = %err, "installed version is not semver");
                false
            }
            Err(err) => {
                warn!(package, range, error = %err, "ignoring unparseable version range");
                false
            }
        }
    }
}

/// Returns true when `installed` satisfies `range`. Malformed input is `false`.
pub fn satisfies(installed: &str, range: &str) -> bool {
    check(installed, range).unwrap_or(false)
}

fn check(installed: &str, range: &str) -> Result<bool, RangeError> {
    let version = parse_version(installed)?;
    let range: VersionRange = range.parse()?;
    Ok(range.matches(&version))
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("invalid version '{version}': {reason}")]
    InvalidVersion { version: String, reason: String },

    #[error("invalid range '{range}': {reason}")]
    InvalidRange { range: String, reason: String },
}

/// Parses an installed version, tolerating a leading `v` or `=`.
pub fn parse_version(raw: &str) -> Result<Version, RangeError> {
    let trimmed = raw.trim();
    let cleaned = trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('='))
        .unwrap_or(trimmed);

    Version::parse(cleaned).map_err(|e| RangeError::InvalidVersion {
        version: raw.to_string(),
        reason: e.to_string(),
    })
}

/// A parsed npm range: an OR-list of AND-sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRange {
    raw: String,
    alternatives: Vec<VersionReq>,
}

impl VersionRange {
    pub fn matches(&self, version: &Version) -> bool {
        self.alternatives.iter().any(|req| req.matches(version))
    }

    pub fn alternatives(&self) -> &[VersionReq] {
        &self.alternatives
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for VersionRange {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: String| RangeError::InvalidRange {
            range: s.to_string(),
            reason,
        };

        let alternatives = s
            .split("||")
            .map(|set| {
                let translated = translate_set(set).map_err(invalid)?;
                VersionReq::parse(&translated).map_err(|e| invalid(e.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            raw: s.trim().to_string(),
            alternatives,
        })
    }
}

const OPERATORS: &[&str] = &["~>", ">=", "<=", ">", "<", "=", "^", "~"];

/// Rewrites one whitespace-separated AND-set into `VersionReq` syntax.
fn translate_set(set: &str) -> Result<String, String> {
    let set = set.trim();
    if set.is_empty() {
        return Ok("*".to_string());
    }

    if let Some((low, high)) = set.split_once(" - ") {
        let low = strip_wildcards(clean_version(low.trim()));
        let high = strip_wildcards(clean_version(high.trim()));
        return Ok(match (low.is_empty(), high.is_empty()) {
            (true, true) => "*".to_string(),
            (true, false) => format!("<={high}"),
            (false, true) => format!(">={low}"),
            (false, false) => format!(">={low}, <={high}"),
        });
    }

    let mut comparators = Vec::new();
    let mut tokens = set.split_whitespace();
    while let Some(token) = tokens.next() {
        // npm accepts `>= 1.2.3` with a space after the operator.
        let token = if OPERATORS.contains(&token) {
            match tokens.next() {
                Some(version) => format!("{token}{version}"),
                None => return Err(format!("operator '{token}' has no version")),
            }
        } else {
            token.to_string()
        };
        comparators.push(translate_comparator(&token)?);
    }

    let concrete: Vec<_> = comparators.into_iter().filter(|c| c != "*").collect();
    if concrete.is_empty() {
        Ok("*".to_string())
    } else {
        Ok(concrete.join(", "))
    }
}

fn translate_comparator(token: &str) -> Result<String, String> {
    let (op, version) = OPERATORS
        .iter()
        .find_map(|op| token.strip_prefix(op).map(|rest| (*op, rest)))
        .unwrap_or(("", token));

    let version = strip_wildcards(clean_version(version));
    if version.is_empty() {
        // `*`, `x`, `>=*` and friends place no constraint.
        return Ok("*".to_string());
    }
    if !version.starts_with(|c: char| c.is_ascii_digit()) {
        return Err(format!("'{token}' is not a version comparator"));
    }

    Ok(match op {
        // A bare npm version is exact; a bare partial is an x-range, which is
        // what `=` means for partial versions in `VersionReq`.
        "" | "=" => format!("={version}"),
        "~>" => format!("~{version}"),
        _ => format!("{op}{version}"),
    })
}

fn clean_version(raw: &str) -> &str {
    raw.strip_prefix('v')
        .or_else(|| raw.strip_prefix('='))
        .unwrap_or(raw)
}

/// Drops `x`/`X`/`*` components: `1.2.x` becomes `1.2`, `x` becomes empty.
fn strip_wildcards(version: &str) -> String {
    version
        .split('.')
        .take_while(|part| !matches!(*part, "x" | "X" | "*" | ""))
        .collect::<Vec<_>>()
        .join(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caret_ranges() {
        assert!(satisfies("2.1.0", "^2.0.0"));
        assert!(!satisfies("3.0.0", "^2.0.0"));
        assert!(satisfies("0.5.2", "^0.5.0"));
        assert!(!satisfies("0.6.0", "^0.5.0"));
        assert!(satisfies("6.0.0", "^6"));
    }

    #[test]
    fn test_or_lists() {
        assert!(satisfies("7.1.1", "^6 || ^7"));
        assert!(satisfies("6.2.0", "^6 || ^7"));
        assert!(!satisfies("5.3.0", "^6 || ^7"));
        assert!(!satisfies("8.0.0", "^6 || ^7"));
    }

    #[test]
    fn test_comparators() {
        assert!(satisfies("5.3.0", "<6"));
        assert!(!satisfies("6.0.0", "<6"));
        assert!(satisfies("2.0.0", ">=2.0.0"));
        assert!(satisfies("3.0.0", ">=2.0.0"));
        assert!(!satisfies("1.9.9", ">=2.0.0"));
        assert!(satisfies("1.5.0", ">1.2.0 <=1.5.0"));
        assert!(!satisfies("1.5.1", ">1.2.0 <=1.5.0"));
    }

    #[test]
    fn test_operator_followed_by_space() {
        assert!(satisfies("2.4.0", ">= 2.0.0 < 3"));
        assert!(!satisfies("3.0.0", ">= 2.0.0 < 3"));
    }

    #[test]
    fn test_tilde_ranges() {
        assert!(satisfies("1.2.9", "~1.2.3"));
        assert!(!satisfies("1.3.0", "~1.2.3"));
        assert!(satisfies("1.9.0", "~1"));
        assert!(satisfies("1.2.5", "~>1.2.3"));
    }

    #[test]
    fn test_bare_versions_are_exact() {
        assert!(satisfies("1.2.3", "1.2.3"));
        assert!(!satisfies("1.2.4", "1.2.3"));
        assert!(satisfies("1.2.3", "v1.2.3"));
        assert!(satisfies("1.2.3", "=1.2.3"));
    }

    #[test]
    fn test_x_ranges_and_partials() {
        assert!(satisfies("1.4.0", "1.x"));
        assert!(!satisfies("2.0.0", "1.x"));
        assert!(satisfies("1.2.7", "1.2.x"));
        assert!(satisfies("1.2.7", "1.2"));
        assert!(!satisfies("1.3.0", "1.2"));
        assert!(satisfies("9.9.9", "*"));
        assert!(satisfies("9.9.9", "x"));
        assert!(satisfies("9.9.9", ""));
        assert!(satisfies("2.5.0", ">=2.x"));
    }

    #[test]
    fn test_hyphen_ranges() {
        assert!(satisfies("1.2.3", "1.2.3 - 2.3.4"));
        assert!(satisfies("2.3.4", "1.2.3 - 2.3.4"));
        assert!(!satisfies("2.3.5", "1.2.3 - 2.3.4"));
        // Partial upper bound covers the whole minor line.
        assert!(satisfies("2.3.9", "1.2 - 2.3"));
        assert!(!satisfies("2.4.0", "1.2 - 2.3"));
    }

    #[test]
    fn test_prereleases_need_matching_tuple() {
        assert!(!satisfies("7.0.0-beta.1", "^6 || ^7"));
        assert!(satisfies("7.0.0-beta.2", ">=7.0.0-beta.1 <8"));
    }

    #[test]
    fn test_installed_version_prefixes() {
        assert!(satisfies("v2.1.0", "^2.0.0"));
        assert!(satisfies(" 2.1.0 ", "^2.0.0"));
    }

    #[test]
    fn test_malformed_input_never_matches() {
        assert!(!satisfies("", "^2.0.0"));
        assert!(!satisfies("not-a-version", "*"));
        assert!(!satisfies("2.1", "^2.0.0"));
        assert!(!satisfies("2.1.0", "latest"));
        assert!(!satisfies("2.1.0", ">="));
        assert!(!satisfies("2.1.0", "^^2"));
    }

    #[test]
    fn test_evaluator_matches_free_function() {
        let evaluator = SemverEvaluator;
        assert!(evaluator.satisfies("chai-dom", "1.2.0", "^1.0.0"));
        assert!(!evaluator.satisfies("chai-dom", "garbage", "^1.0.0"));
        assert!(!evaluator.satisfies("chai-dom", "1.2.0", "not a range"));
    }

    #[test]
    fn test_range_display_and_alternatives() {
        let range: VersionRange = " ^6 || ^7 ".parse().unwrap();
        assert_eq!(range.to_string(), "^6 || ^7");
        assert_eq!(range.alternatives().len(), 2);
    }

    #[test]
    fn test_parse_version_errors_carry_input() {
        let err = parse_version("1.x").unwrap_err();
        assert!(matches!(err, RangeError::InvalidVersion { ref version, .. } if version == "1.x"));
    }
}
