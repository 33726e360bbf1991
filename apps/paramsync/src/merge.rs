//! Apply a computed diff to a target document.
//!
//! Written values come from the same per-key plan the diff was built from,
//! so what gets written is exactly what was shown.

use crate::diff::{plan_sections, TEMPLATE_KEY};
use crate::document::Document;
use crate::error::{Result, SyncError};
use crate::models::diff::Diff;
use crate::models::sync_policy::SyncRule;
use crate::utils::{ensure_mapping, get_path_mut, set_path, Tree};

/// Apply `diff` to `target` and return the number of changes made.
///
/// Either every change lands or `target` is left untouched: edits go to a
/// copy that replaces `target` only once all writes succeeded.
pub fn apply(target: &mut Document, diff: &Diff, source: &Document, rules: &[SyncRule]) -> Result<usize> {
    let mut work = target.clone();
    let mut applied = 0;

    for plan in plan_sections(source, rules) {
        let Some(entry) = diff.get(&plan.key) else {
            continue;
        };
        let writes: Vec<(String, Document)> = plan
            .writes
            .into_iter()
            .filter(|(field, _)| entry.writes().any(|w| w == field))
            .collect();
        if !writes.is_empty() {
            let section = ensure_mapping(&mut work, &plan.key).map_err(|blocked_at| {
                SyncError::MergeConflict {
                    path: plan.key.clone(),
                    blocked_at,
                }
            })?;
            for (field, value) in writes {
                section.insert_child(&field, value);
                applied += 1;
            }
        }

        for field in plan.deletes.iter().filter(|f| entry.deleted(f).is_some()) {
            let gone = get_path_mut(&mut work, &plan.key)
                .and_then(|section| section.remove_child(field))
                .is_some();
            if gone {
                applied += 1;
            }
        }
    }

    if diff.template.is_some() {
        if let Some(tpl) = source.child(TEMPLATE_KEY) {
            set_path(&mut work, TEMPLATE_KEY, tpl.clone()).map_err(|blocked_at| {
                SyncError::MergeConflict {
                    path: TEMPLATE_KEY.to_string(),
                    blocked_at,
                }
            })?;
            applied += 1;
        }
    }

    *target = work;
    Ok(applied)
}
