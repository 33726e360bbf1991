//! Source/target file discovery for bulk runs.
//!
//! Three strategies, tried in order:
//! 1. environment mapping: both patterns contain an environment segment
//!    (e.g. `/di-dev/` and `/di-prod/`); each source path is rewritten to the
//!    target environment and kept when that file exists,
//! 2. a single source and a single target are paired directly,
//! 3. otherwise files are paired by identical file name.

use crate::error::{Result, SyncError};
use regex::Regex;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePair {
    pub source: PathBuf,
    pub target: PathBuf,
}

/// Pairs found plus human-readable notes about what was dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pairing {
    pub pairs: Vec<FilePair>,
    pub diagnostics: Vec<String>,
}

/// Expand a glob pattern (with `**` recursion) into existing files.
pub fn expand(pattern: &str) -> Result<Vec<PathBuf>> {
    let paths = glob::glob(pattern).map_err(|e| SyncError::Pattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })?;
    let mut out = Vec::new();
    for entry in paths {
        match entry {
            Ok(p) if p.is_file() => out.push(p),
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "Skipping unreadable path"),
        }
    }
    Ok(out)
}

/// Environment name captured from `pattern`, if any.
fn env_segment<'a>(re: &Regex, pattern: &'a str) -> Option<&'a str> {
    re.captures(pattern)?.get(1).map(|m| m.as_str())
}

pub fn pair(source_pattern: &str, target_pattern: &str, env_re: &Regex) -> Result<Pairing> {
    let sources = expand(source_pattern)?;
    let mut out = Pairing::default();
    if sources.is_empty() {
        out.diagnostics.push(format!(
            "No source files found matching pattern: {}",
            source_pattern
        ));
        return Ok(out);
    }
    tracing::info!(count = sources.len(), "Found source files");

    if let (Some(src_env), Some(tgt_env)) = (
        env_segment(env_re, source_pattern),
        env_segment(env_re, target_pattern),
    ) {
        tracing::info!(source_env = src_env, target_env = tgt_env, "Mapping environments");
        let from = format!("/{}/", src_env);
        let to = format!("/{}/", tgt_env);
        for source in sources {
            let src_str = source.to_string_lossy().replace('\\', "/");
            let target = PathBuf::from(src_str.replacen(&from, &to, 1));
            if target.is_file() {
                out.pairs.push(FilePair { source, target });
            } else {
                tracing::debug!(target = %target.display(), "Target file not found");
                out.diagnostics
                    .push(format!("Target file not found: {}", target.display()));
            }
        }
        return Ok(out);
    }

    let targets = expand(target_pattern)?;
    if targets.is_empty() {
        out.diagnostics.push(format!(
            "No target files found matching pattern: {}",
            target_pattern
        ));
        return Ok(out);
    }
    tracing::info!(count = targets.len(), "Found target files");

    if sources.len() == 1 && targets.len() == 1 {
        out.pairs.push(FilePair {
            source: sources[0].clone(),
            target: targets[0].clone(),
        });
        return Ok(out);
    }

    for source in sources {
        let name = source.file_name();
        if let Some(target) = targets.iter().find(|t| name.is_some() && t.file_name() == name) {
            out.pairs.push(FilePair {
                source: source.clone(),
                target: target.clone(),
            });
        }
    }
    Ok(out)
}

/// Display helper for pairs in diagnostics.
pub fn describe(pair: &FilePair) -> String {
    format!("{} -> {}", show(&pair.source), show(&pair.target))
}

fn show(p: &Path) -> String {
    crate::utils::rel_to_wd(p)
}
