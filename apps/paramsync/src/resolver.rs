//! Map a file path to the sync rules of the first matching pattern.

use crate::models::sync_policy::{PatternRule, SyncConfig, SyncRule, DEFAULT_SYNC_KEY};
use glob::{MatchOptions, Pattern};
use std::path::Path;

/// Rules that apply to one file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    pub rules: Vec<SyncRule>,
    pub sync_template: bool,
}

const MATCH_OPTS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Resolve the rules for `path`. Patterns are tried in declaration order and
/// only the first match counts; no match yields an empty resolution.
pub fn resolve(path: &Path, cfg: &SyncConfig) -> Resolution {
    let Some(entry) = cfg.pattern_rules.iter().find(|e| pattern_matches(&e.pattern, path)) else {
        tracing::debug!(path = %path.display(), "No pattern matched");
        return Resolution::default();
    };
    tracing::debug!(path = %path.display(), pattern = %entry.pattern, "Pattern matched");
    Resolution {
        rules: normalize(entry),
        sync_template: entry.sync_template,
    }
}

/// `*` stays within one path segment, `**` spans separators. Patterns without
/// a `/` are also tried against the file name alone.
pub fn pattern_matches(pattern: &str, path: &Path) -> bool {
    let Ok(pat) = Pattern::new(pattern) else {
        return false;
    };
    let full = path.to_string_lossy().replace('\\', "/");
    if pat.matches_with(&full, MATCH_OPTS) {
        return true;
    }
    if pattern.contains('/') {
        return false;
    }
    path.file_name()
        .map(|n| pat.matches_with(&n.to_string_lossy(), MATCH_OPTS))
        .unwrap_or(false)
}

/// Explicit `sync_rules` are returned as-is; legacy fields become a single
/// equivalent rule.
pub fn normalize(entry: &PatternRule) -> Vec<SyncRule> {
    if let Some(rules) = &entry.sync_rules {
        return rules.clone();
    }
    vec![SyncRule {
        key: entry
            .sync_key
            .clone()
            .unwrap_or_else(|| DEFAULT_SYNC_KEY.to_string()),
        sync_params: entry.sync_params.clone().unwrap_or_default(),
        delete_params: entry.delete_params.clone().unwrap_or_default(),
        static_values: Default::default(),
    }]
}
