//! Sync config file schema: ordered pattern rules, each holding one or more
//! per-key sync rules (or the legacy single-key fields).

use serde::Deserialize;
use serde_yaml::{Mapping, Value};

/// Default regex locating the environment directory in bulk patterns.
pub const DEFAULT_ENV_SEGMENT: &str = "/(di-[^/]+)/";

/// Section synced by legacy entries that do not name a `sync_key`.
pub const DEFAULT_SYNC_KEY: &str = "parameters";

#[derive(Debug, Default, Deserialize, Clone)]
pub struct SyncConfig {
    #[serde(default, alias = "template_patterns")]
    pub pattern_rules: Vec<PatternRule>,
    /// Regex with one capture group matching an environment path segment.
    #[serde(default)]
    pub environment_segment: Option<String>,
}

#[derive(Debug, Default, Deserialize, Clone)]
pub struct PatternRule {
    pub pattern: String,
    #[serde(default)]
    pub sync_rules: Option<Vec<SyncRule>>,
    #[serde(default)]
    pub sync_params: Option<Vec<String>>,
    #[serde(default)]
    pub delete_params: Option<Vec<String>>,
    #[serde(default)]
    pub sync_key: Option<String>,
    #[serde(default)]
    pub sync_template: bool,
}

#[derive(Debug, Default, Deserialize, Clone, PartialEq)]
pub struct SyncRule {
    /// Dot-path of the section this rule syncs.
    pub key: String,
    #[serde(default)]
    pub sync_params: Vec<String>,
    #[serde(default)]
    pub delete_params: Vec<String>,
    /// Values written regardless of the source; they win over `sync_params`.
    #[serde(default)]
    pub static_values: Mapping,
}

impl SyncRule {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Default::default()
        }
    }

    pub fn with_sync_params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sync_params = params.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_delete_params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.delete_params = params.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_static(mut self, field: &str, value: Value) -> Self {
        self.static_values
            .insert(Value::String(field.to_string()), value);
        self
    }

    /// Static values keyed by field name. Non-string YAML keys (`1`, `true`)
    /// are named by their scalar text.
    pub fn static_fields(&self) -> impl Iterator<Item = (String, &Value)> {
        self.static_values.iter().map(|(k, v)| (key_name(k), v))
    }

    pub fn static_value(&self, field: &str) -> Option<&Value> {
        self.static_values
            .iter()
            .find(|(k, _)| key_name(k) == field)
            .map(|(_, v)| v)
    }

    /// `sync_params` followed by static keys not already listed, without
    /// duplicates.
    pub fn considered_fields(&self) -> Vec<String> {
        let mut fields: Vec<String> = Vec::new();
        let statics = self.static_fields().map(|(k, _)| k);
        for f in self.sync_params.iter().cloned().chain(statics) {
            if !fields.contains(&f) {
                fields.push(f);
            }
        }
        fields
    }
}

fn key_name(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}
