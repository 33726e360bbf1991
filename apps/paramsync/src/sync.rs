//! Per-file and bulk synchronization.
//!
//! Each pair goes through resolve → load → filter → diff, then (unless dry
//! run, already in sync, or declined) apply → save. Pairs are processed one
//! at a time; a failing pair is recorded and the batch moves on.

use crate::config;
use crate::diff;
use crate::document::{Document, DocumentStore};
use crate::error::{Result, SyncError};
use crate::filter;
use crate::merge;
use crate::models::diff::Diff;
use crate::models::sync_policy::{SyncConfig, SyncRule, DEFAULT_SYNC_KEY};
use crate::models::RunError;
use crate::output::Printer;
use crate::pairing::{self, FilePair};
use crate::prompt::Confirm;
use crate::resolver;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Per-run switches shared by `sync` and `bulk`.
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    pub dry_run: bool,
    /// Force template sync on, in addition to the pattern's own flag.
    pub sync_template: bool,
    pub filter: Option<String>,
    /// Ask before writing each file.
    pub confirm: bool,
    /// Explicit fields to copy into `parameters`, replacing resolved rules.
    pub params: Option<Vec<String>>,
    /// Explicit fields to delete from `parameters`, replacing resolved rules.
    pub delete: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    NoRules,
    Filtered,
    InSync,
    DryRun,
    Declined,
    Applied,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    pub source: PathBuf,
    pub target: PathBuf,
    pub status: FileStatus,
    pub diff: Option<Diff>,
    /// Changes applied, or that would be applied for a dry run.
    pub changes: usize,
    pub error: Option<RunError>,
}

impl FileOutcome {
    fn new(pair: &FilePair, status: FileStatus) -> Self {
        Self {
            source: pair.source.clone(),
            target: pair.target.clone(),
            status,
            diff: None,
            changes: 0,
            error: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BulkSummary {
    pub total_files: usize,
    pub changed_files: usize,
    pub total_changes: usize,
    pub filtered_files: usize,
    pub skipped_files: usize,
    pub declined_files: usize,
    pub failed_files: usize,
    pub file_changes: Vec<(PathBuf, usize)>,
    pub diagnostics: Vec<String>,
    pub errors: Vec<RunError>,
    pub outcomes: Vec<FileOutcome>,
}

impl BulkSummary {
    fn record(&mut self, outcome: FileOutcome) {
        match outcome.status {
            FileStatus::NoRules => self.skipped_files += 1,
            FileStatus::Filtered => self.filtered_files += 1,
            FileStatus::Declined => self.declined_files += 1,
            FileStatus::Failed => {
                self.failed_files += 1;
                if let Some(e) = &outcome.error {
                    self.errors.push(e.clone());
                }
            }
            FileStatus::Applied => {
                self.changed_files += 1;
                self.total_changes += outcome.changes;
                self.file_changes.push((outcome.target.clone(), outcome.changes));
            }
            FileStatus::InSync | FileStatus::DryRun => {}
        }
        self.outcomes.push(outcome);
    }
}

/// A computed, not yet applied, sync of one pair.
#[derive(Debug, Clone)]
pub struct Plan {
    pub pair: FilePair,
    pub rules: Vec<SyncRule>,
    pub diff: Diff,
    source_doc: Document,
    target_doc: Document,
}

#[derive(Debug, Clone)]
pub enum Planned {
    NoRules,
    Filtered,
    Ready(Plan),
}

/// Sync driver bound to one immutable config, a document store, and a
/// confirmation prompt.
pub struct Syncer<'a, S: DocumentStore, C: Confirm> {
    config: &'a SyncConfig,
    store: S,
    confirm: C,
    printer: Printer,
}

impl<'a, S: DocumentStore, C: Confirm> Syncer<'a, S, C> {
    pub fn new(config: &'a SyncConfig, store: S, confirm: C, printer: Printer) -> Self {
        Self {
            config,
            store,
            confirm,
            printer,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn confirm(&self) -> &C {
        &self.confirm
    }

    /// Rules for `source` after CLI overrides.
    pub fn rules_for(&self, source: &Path, opts: &SyncOptions) -> (Vec<SyncRule>, bool) {
        let resolution = resolver::resolve(source, self.config);
        let sync_template = opts.sync_template || resolution.sync_template;
        if opts.params.is_none() && opts.delete.is_none() {
            return (resolution.rules, sync_template);
        }
        let base = resolution.rules.first();
        let rule = SyncRule {
            key: DEFAULT_SYNC_KEY.to_string(),
            sync_params: opts
                .params
                .clone()
                .or_else(|| base.map(|r| r.sync_params.clone()))
                .unwrap_or_default(),
            delete_params: opts
                .delete
                .clone()
                .or_else(|| base.map(|r| r.delete_params.clone()))
                .unwrap_or_default(),
            static_values: Default::default(),
        };
        (vec![rule], sync_template)
    }

    /// Resolve, load, filter, and diff one pair without touching the target.
    pub fn plan(&self, pair: &FilePair, opts: &SyncOptions) -> Result<Planned> {
        let (rules, sync_template) = self.rules_for(&pair.source, opts);
        if rules.is_empty() {
            return Ok(Planned::NoRules);
        }
        let source_doc = self.store.load(&pair.source)?;
        if !filter::matches(&source_doc, opts.filter.as_deref()) {
            return Ok(Planned::Filtered);
        }
        let target_doc = self.store.load(&pair.target)?;
        let diff = diff::diff(&source_doc, &target_doc, &rules, sync_template);
        Ok(Planned::Ready(Plan {
            pair: pair.clone(),
            rules,
            diff,
            source_doc,
            target_doc,
        }))
    }

    /// Apply a plan and persist the target. Returns the number of changes.
    pub fn commit(&self, plan: Plan) -> Result<usize> {
        let mut target = plan.target_doc;
        let applied = merge::apply(&mut target, &plan.diff, &plan.source_doc, &plan.rules)?;
        self.store.save(&plan.pair.target, &target)?;
        tracing::info!(target = %plan.pair.target.display(), applied, "Changes applied");
        Ok(applied)
    }

    /// Full flow for one pair. Errors are captured in the outcome.
    pub fn sync_pair(&mut self, pair: &FilePair, opts: &SyncOptions) -> FileOutcome {
        self.printer.processing(pair);
        let plan = match self.plan(pair, opts) {
            Ok(Planned::Ready(plan)) => plan,
            Ok(Planned::NoRules) => {
                self.printer.note(&format!(
                    "No sync rules defined for {}, skipping.",
                    pair.source.display()
                ));
                return FileOutcome::new(pair, FileStatus::NoRules);
            }
            Ok(Planned::Filtered) => {
                self.printer.note(&format!(
                    "Source file {} does not match filter {}, skipping.",
                    pair.source.display(),
                    opts.filter.as_deref().unwrap_or_default()
                ));
                return FileOutcome::new(pair, FileStatus::Filtered);
            }
            Err(e) => return self.failed(pair, None, &e),
        };

        self.printer.diff(&plan.diff);
        let total = plan.diff.total_changes();
        let mut outcome = FileOutcome::new(pair, FileStatus::InSync);
        outcome.diff = Some(plan.diff.clone());
        if total == 0 {
            return outcome;
        }
        if opts.dry_run {
            outcome.status = FileStatus::DryRun;
            outcome.changes = total;
            return outcome;
        }
        if opts.confirm && !self.confirm.ask("Apply these changes?") {
            self.printer.note("Changes not applied.");
            outcome.status = FileStatus::Declined;
            return outcome;
        }
        match self.commit(plan) {
            Ok(_) => {
                outcome.status = FileStatus::Applied;
                outcome.changes = total;
                outcome
            }
            Err(e) => self.failed(pair, outcome.diff.take(), &e),
        }
    }

    fn failed(&self, pair: &FilePair, diff: Option<Diff>, e: &SyncError) -> FileOutcome {
        tracing::debug!(source = %pair.source.display(), error = %e, "Pair failed");
        self.printer.error(&e.to_string());
        let mut outcome = FileOutcome::new(pair, FileStatus::Failed);
        outcome.diff = diff;
        outcome.error = Some(RunError::from(e));
        outcome
    }

    /// Sync a single source/target pair.
    pub fn sync_file(&mut self, source: &Path, target: &Path, opts: &SyncOptions) -> FileOutcome {
        let pair = FilePair {
            source: source.to_path_buf(),
            target: target.to_path_buf(),
        };
        self.sync_pair(&pair, opts)
    }

    /// Discover pairs from two glob patterns and sync them in order.
    pub fn sync_bulk(
        &mut self,
        source_pattern: &str,
        target_pattern: &str,
        opts: &SyncOptions,
    ) -> Result<BulkSummary> {
        let env_re = config::env_segment_regex(self.config)
            .map_err(|msg| SyncError::config("environment_segment", msg))?;
        let pairing = pairing::pair(source_pattern, target_pattern, &env_re)?;
        let mut summary = BulkSummary {
            total_files: pairing.pairs.len(),
            diagnostics: pairing.diagnostics,
            ..Default::default()
        };
        for d in &summary.diagnostics {
            self.printer.warn(d);
        }
        if pairing.pairs.is_empty() {
            self.printer.note("No matching file pairs found.");
            return Ok(summary);
        }
        self.printer
            .note(&format!("Found {} file pairs to process.", pairing.pairs.len()));
        for pair in &pairing.pairs {
            let outcome = self.sync_pair(pair, opts);
            summary.record(outcome);
        }
        Ok(summary)
    }
}
