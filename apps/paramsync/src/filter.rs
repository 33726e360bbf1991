//! Content filters gating which source documents get synced.
//!
//! A filter spec is a comma-separated list of `field.path:value` clauses that
//! must all hold. A `!` before the value turns a clause into an exclusion.
//! Matching is a case-sensitive substring test against string fields.

use crate::utils::{get_path, Tree};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    pub field_path: String,
    pub negate: bool,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    pub clauses: Vec<Clause>,
}

impl FilterSpec {
    /// Parse a spec string. Clauses without a `:` are dropped.
    pub fn parse(spec: &str) -> Self {
        let clauses = spec
            .split(',')
            .map(str::trim)
            .filter_map(|raw| {
                let (field_path, value) = raw.split_once(':')?;
                let (negate, value) = match value.strip_prefix('!') {
                    Some(rest) => (true, rest),
                    None => (false, value),
                };
                Some(Clause {
                    field_path: field_path.to_string(),
                    negate,
                    value: value.to_string(),
                })
            })
            .collect();
        Self { clauses }
    }

    pub fn matches<T: Tree>(&self, doc: &T) -> bool {
        self.clauses.iter().all(|c| c.matches(doc))
    }
}

impl Clause {
    pub fn matches<T: Tree>(&self, doc: &T) -> bool {
        let text = get_path(doc, &self.field_path).and_then(Tree::as_text);
        let ok = if self.negate {
            match text {
                // An empty exclusion value only rejects empty strings.
                Some(s) if self.value.is_empty() => !s.is_empty(),
                Some(s) => !s.contains(self.value.as_str()),
                None => true,
            }
        } else {
            text.is_some_and(|s| s.contains(self.value.as_str()))
        };
        tracing::debug!(
            field = %self.field_path,
            value = %self.value,
            negate = self.negate,
            matched = ok,
            "Filter clause evaluated"
        );
        ok
    }
}

/// Evaluate an optional filter spec against a document. No spec matches
/// everything.
pub fn matches<T: Tree>(doc: &T, spec: Option<&str>) -> bool {
    match spec {
        Some(s) if !s.trim().is_empty() => FilterSpec::parse(s).matches(doc),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use serde_yaml::Value;

    fn doc(src: &str) -> Value {
        serde_yaml::from_str(src).unwrap()
    }

    #[test]
    fn test_exclusion_on_template_type() {
        let enhanced = doc("template:\n  type: enhanced\n");
        let standard = doc("template:\n  type: standard\n");
        assert!(!matches(&enhanced, Some("template.type:!enhanced")));
        assert!(matches(&standard, Some("template.type:!enhanced")));
    }

    #[test]
    fn test_and_semantics_any_order() {
        let d = json!({"environment": "production", "template": {"type": "enhanced", "version": "2.0"}});
        assert!(!matches(&d, Some("environment:production,template.type:!enhanced")));
        assert!(!matches(&d, Some("template.type:!enhanced,environment:production")));
        assert!(matches(&d, Some("environment:production,template.type:!standard")));
        assert!(matches(&d, Some("template.type:!standard, environment:prod")));
    }

    #[test]
    fn test_absent_and_non_string_fields() {
        let d = json!({"field": {"nested": "dict"}, "number": 123});
        assert!(!matches(&d, Some("field:value")));
        assert!(!matches(&d, Some("number:123")));
        assert!(matches(&d, Some("field:!value")));
        assert!(matches(&d, Some("number:!456")));
        assert!(matches(&d, Some("missing.field:!value")));
        assert!(!matches(&d, Some("missing.field:value")));
        assert!(matches(&d, Some("field.nested.deeper:!x")));
    }

    #[test]
    fn test_empty_exclusion_value() {
        let d = json!({"template": {"type": "enhanced"}, "blank": ""});
        assert!(matches(&d, Some("template.type:!")));
        assert!(!matches(&d, Some("blank:!")));
        assert!(matches(&d, Some("blank:")));
    }

    #[test]
    fn test_case_sensitive_substring() {
        let d = doc("template:\n  type: Enhanced\n  path: stacks/enhanced-vpc.yaml\n");
        assert!(matches(&d, Some("template.type:!enhanced")));
        assert!(!matches(&d, Some("template.type:!Enhanced")));
        assert!(matches(&d, Some("template.path:enhanced")));
    }

    #[test]
    fn test_malformed_clauses_are_ignored() {
        let d = json!({"test": "data"});
        assert!(matches(&d, Some("invalidfilter")));
        assert!(matches(&d, None));
        assert!(matches(&d, Some("")));
        let spec = FilterSpec::parse("nocolon,test:da,,x:!y");
        assert_eq!(spec.clauses.len(), 2);
        assert!(spec.clauses[1].negate);
        assert!(spec.matches(&d));
    }

    #[test]
    fn test_value_may_contain_colons() {
        let d = json!({"template": {"path": "s3://bucket/vpc.yaml"}});
        assert!(matches(&d, Some("template.path:s3://bucket")));
    }
}
