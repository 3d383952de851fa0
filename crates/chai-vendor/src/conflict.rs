//! Mutual exclusion between plugins that cover the same ground.

use serde::Serialize;
use tracing::info;

use crate::select::ResolvedPlugins;

/// When both `keep` and `drop` are active, `drop` is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConflictRule {
    pub keep: &'static str,
    pub drop: &'static str,
    pub reason: &'static str,
}

/// Conflict rules applied by default, in order.
pub static DEFAULT_RULES: &[ConflictRule] = &[
    ConflictRule {
        keep: "chai-jquery",
        drop: "chai-dom",
        reason: "chai-jquery and chai-dom define the same DOM assertions",
    },
    ConflictRule {
        keep: "sinon-chai",
        drop: "testdouble-chai",
        reason: "sinon-chai and testdouble-chai both define `called` assertions",
    },
];

/// Applies [`DEFAULT_RULES`].
pub fn resolve<'a>(selected: &ResolvedPlugins<'a>) -> ResolvedPlugins<'a> {
    resolve_with(selected, DEFAULT_RULES)
}

/// Applies `rules` in order against the current active set. Survivors keep
/// their relative order.
pub fn resolve_with<'a>(
    selected: &ResolvedPlugins<'a>,
    rules: &[ConflictRule],
) -> ResolvedPlugins<'a> {
    rules.iter().fold(selected.clone(), |active, rule| {
        if active.contains(rule.keep) && active.contains(rule.drop) {
            info!(
                kept = rule.keep,
                dropped = rule.drop,
                reason = rule.reason,
                "dropping conflicting plugin"
            );
            active.filter(|p| p.name != rule.drop)
        } else {
            active
        }
    })
}

/// Rules that fire for `selected`, in application order.
pub fn applied_rules<'r>(
    selected: &ResolvedPlugins<'_>,
    rules: &'r [ConflictRule],
) -> Vec<&'r ConflictRule> {
    let mut active = selected.clone();
    let mut fired = Vec::new();
    for rule in rules {
        if active.contains(rule.keep) && active.contains(rule.drop) {
            active = active.filter(|p| p.name != rule.drop);
            fired.push(rule);
        }
    }
    fired
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CATALOG, CHAI_AS_PROMISED, CHAI_DOM, CHAI_JQUERY, SINON_CHAI, TESTDOUBLE_CHAI};

    fn names(resolved: &ResolvedPlugins<'_>) -> Vec<&'static str> {
        resolved.iter().map(|p| p.name).collect()
    }

    #[test]
    fn test_jquery_supersedes_dom() {
        let selected = ResolvedPlugins::new(vec![&CHAI_JQUERY, &CHAI_DOM]);
        assert_eq!(names(&resolve(&selected)), vec!["chai-jquery"]);
    }

    #[test]
    fn test_sinon_supersedes_testdouble() {
        let selected = ResolvedPlugins::new(vec![&SINON_CHAI, &TESTDOUBLE_CHAI]);
        assert_eq!(names(&resolve(&selected)), vec!["sinon-chai"]);
    }

    #[test]
    fn test_lone_losers_survive() {
        let selected = ResolvedPlugins::new(vec![&CHAI_DOM, &TESTDOUBLE_CHAI]);
        assert_eq!(
            names(&resolve(&selected)),
            vec!["chai-dom", "testdouble-chai"]
        );
    }

    #[test]
    fn test_survivors_keep_order() {
        let selected = ResolvedPlugins::new(vec![
            &CHAI_JQUERY,
            &CHAI_DOM,
            &CHAI_AS_PROMISED,
            &SINON_CHAI,
            &TESTDOUBLE_CHAI,
        ]);
        assert_eq!(
            names(&resolve(&selected)),
            vec!["chai-jquery", "chai-as-promised", "sinon-chai"]
        );
        // Input is untouched.
        assert_eq!(selected.len(), 5);
    }

    #[test]
    fn test_rules_see_earlier_removals() {
        static CHAINED: &[ConflictRule] = &[
            ConflictRule {
                keep: "chai-jquery",
                drop: "chai-dom",
                reason: "first",
            },
            ConflictRule {
                keep: "chai-dom",
                drop: "sinon-chai",
                reason: "second",
            },
        ];

        let selected = ResolvedPlugins::new(vec![&CHAI_JQUERY, &CHAI_DOM, &SINON_CHAI]);
        let resolved = resolve_with(&selected, CHAINED);
        // chai-dom is gone by the time the second rule runs.
        assert_eq!(names(&resolved), vec!["chai-jquery", "sinon-chai"]);
        assert_eq!(applied_rules(&selected, CHAINED).len(), 1);
    }

    #[test]
    fn test_default_rules_reference_catalog_names() {
        for rule in DEFAULT_RULES {
            assert!(CATALOG.iter().any(|p| p.name == rule.keep));
            assert!(CATALOG.iter().any(|p| p.name == rule.drop));
        }
    }

    #[test]
    fn test_applied_rules_reports_fired_rules() {
        let selected = ResolvedPlugins::new(vec![&CHAI_JQUERY, &CHAI_DOM, &SINON_CHAI]);
        let fired = applied_rules(&selected, DEFAULT_RULES);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].drop, "chai-dom");
    }
}
