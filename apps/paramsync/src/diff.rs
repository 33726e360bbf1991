//! Diff computation between a source and a target document.
//!
//! Each rule contributes the fields it considers (`sync_params` plus the keys
//! of `static_values`) for its section. A field is only reported when it has
//! an effective source value: static values always win over the source
//! section, and source fields outside `sync_params` are never looked at.
//! Deletions are computed independently from the target section.
//!
//! Rules sharing a key are folded into one [`SectionPlan`] first, which both
//! the diff and the merge read, so the two never disagree on a field.

use crate::document::Document;
use crate::models::diff::{Diff, FieldChange, FieldValue, TemplateChange};
use crate::models::sync_policy::SyncRule;
use crate::utils::{get_path, Tree};

pub const TEMPLATE_KEY: &str = "template";

/// Mapping at `key`, or `None` when missing or not a mapping.
pub fn section<'a>(doc: &'a Document, key: &str) -> Option<&'a Document> {
    get_path(doc, key).filter(|v| v.is_mapping())
}

/// What one target section receives once every rule on its key is folded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectionPlan {
    pub key: String,
    /// Values to write, in first-mention order. A static value from any rule
    /// on the key replaces a value taken from the source; among static
    /// values the first rule wins.
    pub writes: Vec<(String, Document)>,
    /// Fields to remove. A field that is also written is never removed.
    pub deletes: Vec<String>,
}

impl SectionPlan {
    fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ..Default::default()
        }
    }
}

/// Fold `rules` into one plan per distinct key, in first-mention order.
pub fn plan_sections(source: &Document, rules: &[SyncRule]) -> Vec<SectionPlan> {
    let mut plans: Vec<SectionPlan> = Vec::new();
    // (plan index, field) pairs already fixed by a static value
    let mut pinned: Vec<(usize, String)> = Vec::new();

    for rule in rules {
        let idx = match plans.iter().position(|p| p.key == rule.key) {
            Some(i) => i,
            None => {
                plans.push(SectionPlan::new(&rule.key));
                plans.len() - 1
            }
        };
        let src = section(source, &rule.key);
        let plan = &mut plans[idx];

        for field in rule.considered_fields() {
            let fixed = rule.static_value(&field);
            let Some(value) = fixed.or_else(|| src.and_then(|s| s.child(&field))) else {
                continue;
            };
            let is_pinned = pinned.iter().any(|(i, f)| *i == idx && *f == field);
            match plan.writes.iter_mut().find(|(f, _)| *f == field) {
                Some(slot) if fixed.is_some() && !is_pinned => slot.1 = value.clone(),
                Some(_) => continue,
                None => plan.writes.push((field.clone(), value.clone())),
            }
            if fixed.is_some() {
                pinned.push((idx, field));
            }
        }

        for field in &rule.delete_params {
            if !plan.deletes.contains(field) {
                plan.deletes.push(field.clone());
            }
        }
    }

    for plan in &mut plans {
        let SectionPlan { writes, deletes, .. } = plan;
        deletes.retain(|d| !writes.iter().any(|(w, _)| w == d));
    }
    plans
}

/// Compute the diff of `rules` applied from `source` onto `target`.
pub fn diff(source: &Document, target: &Document, rules: &[SyncRule], sync_template: bool) -> Diff {
    let mut out = Diff::default();
    for plan in plan_sections(source, rules) {
        let tgt = section(target, &plan.key);
        let entry = out.entry(&plan.key);

        for (field, new) in plan.writes {
            match tgt.and_then(|t| t.child(&field)) {
                None => entry.added.push(FieldValue { field, value: new }),
                Some(old) if old.canonical() != new.canonical() => {
                    entry.modified.push(FieldChange {
                        field,
                        old: old.clone(),
                        new,
                    })
                }
                Some(_) => entry.unchanged.push(FieldValue { field, value: new }),
            }
        }

        for field in plan.deletes {
            if let Some(value) = tgt.and_then(|t| t.child(&field)) {
                entry.deleted.push(FieldValue {
                    value: value.clone(),
                    field,
                });
            }
        }
    }
    if sync_template {
        out.template = template_change(source, target);
    }
    out
}

/// Compare the `template` sections: by `path`, else by `type`, else as a
/// whole. Only runs when both documents carry a template.
fn template_change(source: &Document, target: &Document) -> Option<TemplateChange> {
    let src = source.child(TEMPLATE_KEY)?;
    let tgt = target.child(TEMPLATE_KEY)?;
    let differs = match (src.child("path"), tgt.child("path")) {
        (Some(a), Some(b)) => a.canonical() != b.canonical(),
        _ => match (src.child("type"), tgt.child("type")) {
            (Some(a), Some(b)) => a.canonical() != b.canonical(),
            _ => src.canonical() != tgt.canonical(),
        },
    };
    differs.then(|| TemplateChange {
        old: tgt.clone(),
        new: src.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_yaml::Value;

    fn doc(src: &str) -> Document {
        serde_yaml::from_str(src).unwrap()
    }

    #[test]
    fn test_modified_param() {
        let source = doc("parameters:\n  VpcCidr: 10.0.0.0/16\n");
        let target = doc("parameters:\n  VpcCidr: 10.1.0.0/16\n");
        let rules = [SyncRule::new("parameters").with_sync_params(["VpcCidr"])];
        let d = diff(&source, &target, &rules, false);
        let change = d.get("parameters").unwrap().modified("VpcCidr").unwrap();
        assert_eq!(change.old, Value::from("10.1.0.0/16"));
        assert_eq!(change.new, Value::from("10.0.0.0/16"));
        assert_eq!(d.total_changes(), 1);
    }

    #[test]
    fn test_added_unchanged_and_ignored() {
        let source = doc("parameters:\n  A: 1\n  B: two\n  Extra: x\n");
        let target = doc("parameters:\n  B: two\n  Local: y\n");
        let rules = [SyncRule::new("parameters").with_sync_params(["A", "B", "Missing"])];
        let d = diff(&source, &target, &rules, false);
        let k = d.get("parameters").unwrap();
        assert_eq!(k.added("A"), Some(&Value::from(1)));
        assert!(k.unchanged("B").is_some());
        assert!(!k.contains("Missing"));
        assert!(!k.contains("Extra"));
        assert!(k.deleted.is_empty());
    }

    #[test]
    fn test_static_values_on_empty_docs() {
        let rules = [SyncRule::new("stack_tags").with_static("Environment", Value::from("production"))];
        let d = diff(&Value::Null, &Value::Null, &rules, false);
        assert_eq!(
            d.get("stack_tags").unwrap().added("Environment"),
            Some(&Value::from("production"))
        );
    }

    #[test]
    fn test_static_wins_over_source() {
        let source = doc("parameters:\n  Env: dev\n");
        let target = doc("parameters:\n  Env: prod\n");
        let rules = [SyncRule::new("parameters")
            .with_sync_params(["Env"])
            .with_static("Env", Value::from("prod"))];
        let d = diff(&source, &target, &rules, false);
        assert!(d.get("parameters").unwrap().unchanged("Env").is_some());
        assert!(d.is_empty());
    }

    #[test]
    fn test_numeric_and_string_compare_canonically() {
        let source = doc("parameters:\n  Port: 8080\n");
        let target = doc("parameters:\n  Port: '8080'\n");
        let rules = [SyncRule::new("parameters").with_sync_params(["Port"])];
        assert!(diff(&source, &target, &rules, false).is_empty());
    }

    #[test]
    fn test_deletions_independent_of_sync_params() {
        let target = doc("parameters:\n  OldParam: legacy\n  Keep: 1\n");
        let rules = [SyncRule::new("parameters").with_delete_params(["OldParam", "Absent"])];
        let d = diff(&Value::Null, &target, &rules, false);
        let k = d.get("parameters").unwrap();
        assert_eq!(k.deleted("OldParam"), Some(&Value::from("legacy")));
        assert!(k.deleted("Absent").is_none());
    }

    #[test]
    fn test_nested_keys_and_multiple_rules() {
        let source = doc("config:\n  db:\n    name: prod_db\nstack_tags:\n  Owner: platform\n");
        let target = doc("config:\n  db:\n    name: dev_db\n");
        let rules = [
            SyncRule::new("config.db").with_sync_params(["name"]),
            SyncRule::new("stack_tags").with_sync_params(["Owner"]),
        ];
        let d = diff(&source, &target, &rules, false);
        assert_eq!(d.keys.len(), 2);
        assert!(d.get("config.db").unwrap().modified("name").is_some());
        assert!(d.get("stack_tags").unwrap().added("Owner").is_some());
    }

    #[test]
    fn test_rules_sharing_a_key_fold_together() {
        let source = doc("parameters:\n  A: 1\n");
        let rules = [
            SyncRule::new("parameters").with_sync_params(["A"]),
            SyncRule::new("parameters").with_sync_params(["A"]).with_static("B", Value::from(2)),
        ];
        let d = diff(&source, &Value::Null, &rules, false);
        assert_eq!(d.keys.len(), 1);
        assert_eq!(d.get("parameters").unwrap().added.len(), 2);
    }

    #[test]
    fn test_static_on_later_rule_beats_synced_field() {
        let source = doc("parameters:\n  Env: dev\n");
        let target = doc("parameters:\n  Env: dev\n");
        let rules = [
            SyncRule::new("parameters").with_sync_params(["Env"]),
            SyncRule::new("parameters").with_static("Env", Value::from("prod")),
        ];
        let d = diff(&source, &target, &rules, false);
        let change = d.get("parameters").unwrap().modified("Env").unwrap();
        assert_eq!(change.old, Value::from("dev"));
        assert_eq!(change.new, Value::from("prod"));
        assert_eq!(d.total_changes(), 1);
    }

    #[test]
    fn test_first_static_wins_across_rules() {
        let rules = [
            SyncRule::new("stack_tags").with_static("Env", Value::from("prod")),
            SyncRule::new("stack_tags").with_static("Env", Value::from("staging")),
        ];
        let plans = plan_sections(&Value::Null, &rules);
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].writes, vec![("Env".to_string(), Value::from("prod"))]);
    }

    #[test]
    fn test_written_field_is_not_deleted() {
        let source = doc("parameters:\n  A: 1\n");
        let target = doc("parameters:\n  A: 0\n  B: 2\n");
        let rules = [
            SyncRule::new("parameters")
                .with_sync_params(["A"])
                .with_delete_params(["A"]),
            SyncRule::new("parameters").with_delete_params(["B"]),
        ];
        let k = diff(&source, &target, &rules, false);
        let k = k.get("parameters").unwrap();
        assert!(k.modified("A").is_some());
        assert!(k.deleted("A").is_none());
        assert!(k.deleted("B").is_some());
    }

    #[test]
    fn test_synced_field_missing_from_source_can_still_be_deleted() {
        let target = doc("parameters:\n  A: 0\n");
        let rules = [SyncRule::new("parameters")
            .with_sync_params(["A"])
            .with_delete_params(["A"])];
        let d = diff(&doc("parameters: {}\n"), &target, &rules, false);
        assert!(d.get("parameters").unwrap().deleted("A").is_some());
    }

    #[test]
    fn test_scalar_section_is_treated_as_empty() {
        let source = doc("parameters:\n  A: 1\n");
        let target = doc("parameters: none\n");
        let rules = [SyncRule::new("parameters").with_sync_params(["A"])];
        let d = diff(&source, &target, &rules, false);
        assert!(d.get("parameters").unwrap().added("A").is_some());
    }

    #[test]
    fn test_template_compared_by_path_then_type_then_whole() {
        let rules: [SyncRule; 0] = [];
        let by_path = diff(
            &doc("template:\n  path: vpc-v2.yaml\n  extra: 1\n"),
            &doc("template:\n  path: vpc-v1.yaml\n"),
            &rules,
            true,
        );
        assert!(by_path.template.is_some());

        let same_path = diff(
            &doc("template:\n  path: vpc.yaml\n  extra: 1\n"),
            &doc("template:\n  path: vpc.yaml\n"),
            &rules,
            true,
        );
        assert!(same_path.template.is_none());

        let by_type = diff(
            &doc("template:\n  type: enhanced\n"),
            &doc("template:\n  type: standard\n"),
            &rules,
            true,
        );
        assert_eq!(
            by_type.template.unwrap().new,
            doc("type: enhanced\n")
        );

        let whole = diff(&doc("template: a.yaml\n"), &doc("template: b.yaml\n"), &rules, true);
        assert!(whole.template.is_some());
    }

    #[test]
    fn test_template_skipped_when_disabled_or_missing() {
        let rules: [SyncRule; 0] = [];
        let src = doc("template: a.yaml\n");
        assert!(diff(&src, &doc("template: b.yaml\n"), &rules, false).template.is_none());
        assert!(diff(&src, &doc("parameters: {}\n"), &rules, true).template.is_none());
    }
}
