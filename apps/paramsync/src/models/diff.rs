//! Diff model: per-key field changes plus an optional template change.

use serde::Serialize;
use serde_yaml::Value;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldValue {
    pub field: String,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldChange {
    pub field: String,
    pub old: Value,
    pub new: Value,
}

/// Changes computed for one section (rule key) of the target document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct KeyDiff {
    pub key: String,
    pub added: Vec<FieldValue>,
    pub modified: Vec<FieldChange>,
    pub unchanged: Vec<FieldValue>,
    pub deleted: Vec<FieldValue>,
}

impl KeyDiff {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Default::default()
        }
    }

    pub fn added(&self, field: &str) -> Option<&Value> {
        find(&self.added, field)
    }

    pub fn modified(&self, field: &str) -> Option<&FieldChange> {
        self.modified.iter().find(|c| c.field == field)
    }

    pub fn unchanged(&self, field: &str) -> Option<&Value> {
        find(&self.unchanged, field)
    }

    pub fn deleted(&self, field: &str) -> Option<&Value> {
        find(&self.deleted, field)
    }

    /// Whether `field` was already recorded in any category.
    pub fn contains(&self, field: &str) -> bool {
        self.added(field).is_some()
            || self.modified(field).is_some()
            || self.unchanged(field).is_some()
    }

    /// Fields that need writing into the target (added, then modified).
    pub fn writes(&self) -> impl Iterator<Item = &str> {
        self.added
            .iter()
            .map(|f| f.field.as_str())
            .chain(self.modified.iter().map(|c| c.field.as_str()))
    }

    pub fn change_count(&self) -> usize {
        self.added.len() + self.modified.len() + self.deleted.len()
    }
}

fn find<'a>(items: &'a [FieldValue], field: &str) -> Option<&'a Value> {
    items.iter().find(|f| f.field == field).map(|f| &f.value)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateChange {
    pub old: Value,
    pub new: Value,
}

/// Result of comparing a source document against a target document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Diff {
    /// One entry per distinct rule key, in rule order.
    pub keys: Vec<KeyDiff>,
    pub template: Option<TemplateChange>,
}

/// Aggregated counts used by summaries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChangeCounts {
    pub additions: usize,
    pub modifications: usize,
    pub deletions: usize,
    pub templates: usize,
}

impl ChangeCounts {
    pub fn total(&self) -> usize {
        self.additions + self.modifications + self.deletions + self.templates
    }
}

impl Diff {
    pub fn get(&self, key: &str) -> Option<&KeyDiff> {
        self.keys.iter().find(|k| k.key == key)
    }

    /// Entry for `key`, created at the end when missing.
    pub fn entry(&mut self, key: &str) -> &mut KeyDiff {
        match self.keys.iter().position(|k| k.key == key) {
            Some(i) => &mut self.keys[i],
            None => {
                self.keys.push(KeyDiff::new(key));
                let last = self.keys.len() - 1;
                &mut self.keys[last]
            }
        }
    }

    pub fn counts(&self) -> ChangeCounts {
        let mut counts = ChangeCounts {
            templates: usize::from(self.template.is_some()),
            ..Default::default()
        };
        for k in &self.keys {
            counts.additions += k.added.len();
            counts.modifications += k.modified.len();
            counts.deletions += k.deleted.len();
        }
        counts
    }

    pub fn total_changes(&self) -> usize {
        self.counts().total()
    }

    pub fn is_empty(&self) -> bool {
        self.total_changes() == 0
    }

    pub fn unchanged_count(&self) -> usize {
        self.keys.iter().map(|k| k.unchanged.len()).sum()
    }
}
