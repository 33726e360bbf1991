//! Output rendering for sync and bulk commands.
//!
//! Supports `human` (default) and `json` outputs. Human output streams
//! progress and diffs while pairs are processed; JSON output stays silent
//! until the end and prints one document with per-file results and a summary.

use crate::models::diff::Diff;
use crate::pairing::{self, FilePair};
use crate::sync::{BulkSummary, FileOutcome, FileStatus};
use crate::utils::{rel_to_wd, Tree};
use owo_colors::OwoColorize;
use serde_json::json;

fn use_colors(output: &str) -> bool {
    output != "json" && std::env::var_os("NO_COLOR").is_none()
}

/// Streaming printer used while pairs are processed.
#[derive(Debug, Clone, Copy)]
pub struct Printer {
    json: bool,
    color: bool,
}

impl Printer {
    pub fn new(output: &str) -> Self {
        Self {
            json: output == "json",
            color: use_colors(output),
        }
    }

    /// Printer that emits nothing while processing.
    pub fn quiet() -> Self {
        Self {
            json: true,
            color: false,
        }
    }

    pub fn processing(&self, pair: &FilePair) {
        if self.json {
            return;
        }
        let line = format!("Processing: {}", pairing::describe(pair));
        if self.color {
            println!("\n{}", line.bold());
        } else {
            println!("\n{}", line);
        }
    }

    pub fn diff(&self, diff: &Diff) {
        if !self.json {
            println!("{}", render_diff(diff, self.color));
        }
    }

    pub fn note(&self, msg: &str) {
        if self.json {
            return;
        }
        if self.color {
            println!("{} {}", "ℹ️  note:".blue().bold(), msg);
        } else {
            println!("ℹ️  note: {}", msg);
        }
    }

    pub fn warn(&self, msg: &str) {
        if self.json {
            return;
        }
        if self.color {
            eprintln!("{} {}", "⚠️  warn:".yellow().bold(), msg);
        } else {
            eprintln!("⚠️  warn: {}", msg);
        }
    }

    pub fn error(&self, msg: &str) {
        if self.json {
            return;
        }
        if self.color {
            eprintln!("{} {}", "✖ ⟦error⟧".red().bold(), msg);
        } else {
            eprintln!("✖ ⟦error⟧ {}", msg);
        }
    }
}

/// Report an error that aborts the whole run.
pub fn print_fatal(msg: &str, output: &str) {
    match output {
        "json" => {
            let out = json!({"error": msg});
            println!("{}", serde_json::to_string_pretty(&out).unwrap_or_default());
        }
        _ => {
            if use_colors(output) {
                eprintln!("{} {}", "✖ ⟦error⟧".red().bold(), msg);
            } else {
                eprintln!("✖ ⟦error⟧ {}", msg);
            }
        }
    }
}

/// Human-readable rendering of a diff.
pub fn render_diff(diff: &Diff, color: bool) -> String {
    let paint = |s: String, f: fn(&str) -> String| if color { f(&s) } else { s };
    let mut out = String::new();
    if diff.is_empty() {
        out.push_str("No changes to apply.");
    } else {
        out.push_str("Changes to apply:");
        for k in diff.keys.iter().filter(|k| k.change_count() > 0) {
            out.push_str(&format!("\n\n  [{}]", k.key));
            for f in &k.added {
                let line = format!("    + {}: {}", f.field, f.value.canonical());
                out.push_str(&format!("\n{}", paint(line, |s| s.green().to_string())));
            }
            for c in &k.modified {
                let line = format!(
                    "    ~ {}: {} -> {}",
                    c.field,
                    c.old.canonical(),
                    c.new.canonical()
                );
                out.push_str(&format!("\n{}", paint(line, |s| s.yellow().to_string())));
            }
            for f in &k.deleted {
                let line = format!("    - {}: {}", f.field, f.value.canonical());
                out.push_str(&format!("\n{}", paint(line, |s| s.red().to_string())));
            }
        }
        if let Some(t) = &diff.template {
            let line = format!("    ~ {} -> {}", t.old.canonical(), t.new.canonical());
            out.push_str("\n\n  [template]");
            out.push_str(&format!("\n{}", paint(line, |s| s.yellow().to_string())));
        }
    }
    let unchanged = diff.unchanged_count();
    if unchanged > 0 {
        out.push_str(&format!("\n\n  {} fields already in sync.", unchanged));
    }
    out
}

/// `Applied N changes (...)` line, or `None` when there is nothing to report.
pub fn summary_line(diff: &Diff, dry_run: bool) -> Option<String> {
    let c = diff.counts();
    if c.total() == 0 {
        return None;
    }
    let action = if dry_run { "Would apply" } else { "Applied" };
    Some(format!(
        "{} {} changes ({} additions, {} modifications, {} deletions, {} template changes)",
        action,
        c.total(),
        c.additions,
        c.modifications,
        c.deletions,
        c.templates
    ))
}

fn outcome_json(o: &FileOutcome) -> serde_json::Value {
    json!({
        "source": rel_to_wd(&o.source),
        "target": rel_to_wd(&o.target),
        "status": o.status,
        "changes": o.changes,
        // YAML mappings with non-string keys have no JSON form.
        "diff": serde_json::to_value(&o.diff).unwrap_or(serde_json::Value::Null),
        "error": o.error.as_ref().map(|e| e.message.clone()),
    })
}

/// Print the result of a single-file sync.
pub fn print_outcome(outcome: &FileOutcome, output: &str) {
    match output {
        "json" => {
            let out = json!({"results": [outcome_json(outcome)]});
            println!("{}", serde_json::to_string_pretty(&out).unwrap_or_default());
        }
        _ => {
            let color = use_colors(output);
            let line = match (outcome.status, &outcome.diff) {
                (FileStatus::DryRun, Some(d)) => summary_line(d, true),
                (FileStatus::Applied, Some(d)) => summary_line(d, false),
                _ => None,
            };
            if let Some(line) = line {
                if color {
                    println!("\n{}", line.green().bold());
                } else {
                    println!("\n{}", line);
                }
            }
        }
    }
}

/// Print the bulk summary.
pub fn print_bulk(summary: &BulkSummary, output: &str) {
    match output {
        "json" => {
            let items: Vec<_> = summary.outcomes.iter().map(outcome_json).collect();
            let file_changes: serde_json::Map<String, serde_json::Value> = summary
                .file_changes
                .iter()
                .map(|(p, n)| (rel_to_wd(p), json!(n)))
                .collect();
            let out = json!({
                "results": items,
                "summary": {
                    "total_files": summary.total_files,
                    "changed_files": summary.changed_files,
                    "total_changes": summary.total_changes,
                    "filtered_files": summary.filtered_files,
                    "skipped_files": summary.skipped_files,
                    "declined_files": summary.declined_files,
                    "failed_files": summary.failed_files,
                    "file_changes": file_changes,
                },
                "diagnostics": summary.diagnostics,
                "errors": summary.errors,
            });
            println!("{}", serde_json::to_string_pretty(&out).unwrap_or_default());
        }
        _ => {
            let color = use_colors(output);
            let mut lines = vec![format!("  Files processed: {}", summary.total_files)];
            if summary.filtered_files > 0 {
                lines.push(format!("  Files filtered out: {}", summary.filtered_files));
            }
            if summary.skipped_files > 0 {
                lines.push(format!("  Files without rules: {}", summary.skipped_files));
            }
            if summary.declined_files > 0 {
                lines.push(format!("  Files declined: {}", summary.declined_files));
            }
            if summary.failed_files > 0 {
                lines.push(format!("  Files failed: {}", summary.failed_files));
            }
            lines.push(format!("  Files changed: {}", summary.changed_files));
            lines.push(format!("  Total changes: {}", summary.total_changes));
            if color {
                println!("\n{}", "Summary:".bold());
            } else {
                println!("\nSummary:");
            }
            for l in lines {
                println!("{}", l);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::diff::{FieldChange, FieldValue, TemplateChange};
    use serde_yaml::Value;

    fn sample() -> Diff {
        let mut d = Diff::default();
        let k = d.entry("parameters");
        k.added.push(FieldValue {
            field: "A".into(),
            value: Value::from("1"),
        });
        k.modified.push(FieldChange {
            field: "B".into(),
            old: Value::from("x"),
            new: Value::from("y"),
        });
        k.deleted.push(FieldValue {
            field: "C".into(),
            value: Value::from(3),
        });
        k.unchanged.push(FieldValue {
            field: "D".into(),
            value: Value::from("d"),
        });
        d.template = Some(TemplateChange {
            old: Value::from("v1.yaml"),
            new: Value::from("v2.yaml"),
        });
        d
    }

    #[test]
    fn test_render_diff_plain() {
        let text = render_diff(&sample(), false);
        assert!(text.starts_with("Changes to apply:"));
        assert!(text.contains("[parameters]"));
        assert!(text.contains("    + A: 1"));
        assert!(text.contains("    ~ B: x -> y"));
        assert!(text.contains("    - C: 3"));
        assert!(text.contains("    ~ v1.yaml -> v2.yaml"));
        assert!(text.contains("1 fields already in sync."));
    }

    #[test]
    fn test_render_empty_diff() {
        assert_eq!(render_diff(&Diff::default(), false), "No changes to apply.");
    }

    #[test]
    fn test_summary_line() {
        assert_eq!(
            summary_line(&sample(), true).unwrap(),
            "Would apply 4 changes (1 additions, 1 modifications, 1 deletions, 1 template changes)"
        );
        assert!(summary_line(&Diff::default(), false).is_none());
    }
}
