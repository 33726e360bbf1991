//! Configuration discovery, loading, and validation.
//!
//! The sync config is read from an explicit `--config` path, or discovered as
//! `paramsync.{yaml,yml,toml}` in the working directory or its closest
//! ancestor. YAML is the primary format; files ending in `.toml` are read as
//! TOML. Loaded configuration is validated once and treated as read-only for
//! the rest of the run.

use crate::error::{Result, SyncError};
use crate::models::sync_policy::{SyncConfig, DEFAULT_ENV_SEGMENT};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_NAMES: [&str; 3] = ["paramsync.yaml", "paramsync.yml", "paramsync.toml"];

/// Walk upward from `start` looking for a `paramsync.{yaml,yml,toml}` file.
///
/// Stops at the first directory containing a `.git` entry.
pub fn discover_config(start: &Path) -> Option<PathBuf> {
    let mut cur = start;
    loop {
        for name in CONFIG_NAMES {
            let candidate = cur.join(name);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
        if cur.join(".git").exists() {
            return None;
        }
        cur = cur.parent()?;
    }
}

/// Load and validate a sync config file.
pub fn load_config(path: &Path) -> Result<SyncConfig> {
    let s = fs::read_to_string(path).map_err(|e| SyncError::config(path, e.to_string()))?;
    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    let cfg: SyncConfig = if is_toml {
        toml::from_str(&s).map_err(|e| SyncError::config(path, e.to_string()))?
    } else if s.trim().is_empty() {
        SyncConfig::default()
    } else {
        serde_yaml::from_str(&s).map_err(|e| SyncError::config(path, e.to_string()))?
    };
    validate(&cfg).map_err(|msg| SyncError::config(path, msg))?;
    Ok(cfg)
}

/// Resolve the config for a run: explicit path, discovered file, or empty.
pub fn resolve_config(explicit: Option<&str>, start: &Path) -> Result<SyncConfig> {
    match explicit.map(PathBuf::from).or_else(|| discover_config(start)) {
        Some(path) => {
            tracing::debug!(path = %path.display(), "Loading sync config");
            load_config(&path)
        }
        None => {
            tracing::debug!("No sync config found; using an empty rule set");
            Ok(SyncConfig::default())
        }
    }
}

/// Minimal structural checks: each entry needs a glob pattern and something
/// to sync.
pub fn validate(cfg: &SyncConfig) -> std::result::Result<(), String> {
    for (i, entry) in cfg.pattern_rules.iter().enumerate() {
        if entry.pattern.trim().is_empty() {
            return Err(format!("pattern_rules[{}]: 'pattern' must not be empty", i));
        }
        if let Err(e) = glob::Pattern::new(&entry.pattern) {
            return Err(format!(
                "pattern_rules[{}]: invalid pattern '{}': {}",
                i, entry.pattern, e
            ));
        }
        if entry.sync_rules.is_none() && entry.sync_params.is_none() {
            return Err(format!(
                "pattern_rules[{}] ('{}'): requires 'sync_rules' or 'sync_params'",
                i, entry.pattern
            ));
        }
        for (j, rule) in entry.sync_rules.iter().flatten().enumerate() {
            if rule.key.trim().is_empty() {
                return Err(format!(
                    "pattern_rules[{}].sync_rules[{}]: 'key' must not be empty",
                    i, j
                ));
            }
        }
    }
    env_segment_regex(cfg)?;
    Ok(())
}

/// Compile the environment segment regex (configured or default).
pub fn env_segment_regex(cfg: &SyncConfig) -> std::result::Result<Regex, String> {
    let src = cfg
        .environment_segment
        .as_deref()
        .unwrap_or(DEFAULT_ENV_SEGMENT);
    let re = Regex::new(src).map_err(|e| format!("invalid environment_segment: {}", e))?;
    if re.captures_len() < 2 {
        return Err(format!(
            "environment_segment '{}' needs one capture group",
            src
        ));
    }
    Ok(re)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_load_yaml_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sync.yaml");
        let mut f = fs::File::create(&path).unwrap();
        writeln!(
            f,
            "{}",
            r#"
pattern_rules:
  - pattern: "**/app.yaml"
    sync_rules:
      - key: parameters
        sync_params: [VpcCidr]
"#
        )
        .unwrap();
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.pattern_rules.len(), 1);
        assert!(cfg.environment_segment.is_none());
    }

    #[test]
    fn test_load_toml_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("paramsync.toml");
        fs::write(
            &path,
            r#"
environment_segment = "/(env-[^/]+)/"

[[pattern_rules]]
pattern = "**/*.yaml"
sync_params = ["VpcCidr"]
sync_template = true
"#,
        )
        .unwrap();
        let cfg = load_config(&path).unwrap();
        assert!(cfg.pattern_rules[0].sync_template);
        assert_eq!(cfg.environment_segment.as_deref(), Some("/(env-[^/]+)/"));
    }

    #[test]
    fn test_entry_without_params_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        fs::write(&path, "pattern_rules:\n  - pattern: '*.yaml'\n").unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, SyncError::ConfigLoad { .. }));
        assert!(err.to_string().contains("requires 'sync_rules' or 'sync_params'"));
    }

    #[test]
    fn test_missing_and_malformed_files_fail() {
        let dir = tempdir().unwrap();
        assert!(load_config(&dir.path().join("nope.yaml")).is_err());
        let path = dir.path().join("broken.yaml");
        fs::write(&path, "pattern_rules: [unclosed").unwrap();
        assert!(matches!(
            load_config(&path),
            Err(SyncError::ConfigLoad { .. })
        ));
    }

    #[test]
    fn test_env_segment_requires_group() {
        let cfg = SyncConfig {
            environment_segment: Some("/env-[^/]+/".into()),
            ..Default::default()
        };
        assert!(env_segment_regex(&cfg).is_err());
        assert!(env_segment_regex(&SyncConfig::default()).is_ok());
    }

    #[test]
    fn test_discover_walks_up() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("paramsync.yml"), "pattern_rules: []\n").unwrap();
        let nested = root.join("a/b");
        fs::create_dir_all(&nested).unwrap();
        assert_eq!(discover_config(&nested), Some(root.join("paramsync.yml")));

        let repo = root.join("repo");
        fs::create_dir_all(repo.join(".git")).unwrap();
        assert_eq!(discover_config(&repo), None);
    }
}
