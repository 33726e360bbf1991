//! Utility helpers for paths and nested document navigation.
//!
//! Dot-path access is written once against the [`Tree`] trait, which
//! documents implement, so "fail soft on read, create on write" holds for
//! every caller.

use serde_yaml::Value as Yaml;
use std::path::Path;

/// Return a path relative to the current working directory when possible.
pub fn rel_to_wd(p: &Path) -> String {
    match std::env::current_dir() {
        Ok(wd) => match pathdiff::diff_paths(p, wd) {
            Some(r) => r.to_string_lossy().to_string(),
            None => p.to_string_lossy().to_string(),
        },
        Err(_) => p.to_string_lossy().to_string(),
    }
}

/// Ordered key-value tree as seen by the sync engine.
pub trait Tree: Clone {
    fn empty_mapping() -> Self;
    fn is_mapping(&self) -> bool;
    fn is_null(&self) -> bool;
    /// Child under `key`; `None` when missing or when `self` is not a mapping.
    fn child(&self, key: &str) -> Option<&Self>;
    fn child_mut(&mut self, key: &str) -> Option<&mut Self>;
    /// Insert or replace `key`, keeping the position of an existing entry.
    /// Returns false when `self` is not a mapping.
    fn insert_child(&mut self, key: &str, value: Self) -> bool;
    /// Remove `key` without disturbing the order of the remaining entries.
    fn remove_child(&mut self, key: &str) -> Option<Self>;
    fn as_text(&self) -> Option<&str>;
    /// Textual form used for equality checks between source and target.
    fn canonical(&self) -> String;
}

impl Tree for Yaml {
    fn empty_mapping() -> Self {
        Yaml::Mapping(serde_yaml::Mapping::new())
    }

    fn is_mapping(&self) -> bool {
        matches!(self, Yaml::Mapping(_))
    }

    fn is_null(&self) -> bool {
        matches!(self, Yaml::Null)
    }

    fn child(&self, key: &str) -> Option<&Self> {
        match self {
            Yaml::Mapping(map) => map.get(key),
            _ => None,
        }
    }

    fn child_mut(&mut self, key: &str) -> Option<&mut Self> {
        match self {
            Yaml::Mapping(map) => map.get_mut(key),
            _ => None,
        }
    }

    fn insert_child(&mut self, key: &str, value: Self) -> bool {
        match self {
            Yaml::Mapping(map) => {
                map.insert(Yaml::String(key.to_string()), value);
                true
            }
            _ => false,
        }
    }

    fn remove_child(&mut self, key: &str) -> Option<Self> {
        match self {
            Yaml::Mapping(map) => map.shift_remove(key),
            _ => None,
        }
    }

    fn as_text(&self) -> Option<&str> {
        self.as_str()
    }

    fn canonical(&self) -> String {
        match self {
            Yaml::Null => "null".to_string(),
            Yaml::Bool(b) => b.to_string(),
            Yaml::Number(n) => n.to_string(),
            Yaml::String(s) => s.clone(),
            Yaml::Tagged(t) => t.value.canonical(),
            // Flow form keeps composites on one line; YAML keys that JSON
            // cannot express fall back to block YAML.
            other => serde_json::to_string(other).unwrap_or_else(|_| {
                serde_yaml::to_string(other)
                    .map(|s| s.trim_end().to_string())
                    .unwrap_or_default()
            }),
        }
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('.').filter(|s| !s.is_empty())
}

/// Get nested value by a dot-path: `a.b.c`. An empty path addresses `root`.
///
/// Returns `None` when a segment is missing or an intermediate value is not
/// a mapping.
pub fn get_path<'a, T: Tree>(root: &'a T, path: &str) -> Option<&'a T> {
    let mut cur = root;
    for seg in segments(path) {
        cur = cur.child(seg)?;
    }
    Some(cur)
}

pub fn get_path_mut<'a, T: Tree>(root: &'a mut T, path: &str) -> Option<&'a mut T> {
    let mut cur = root;
    for seg in segments(path) {
        cur = cur.child_mut(seg)?;
    }
    Some(cur)
}

/// Walk `path`, creating missing (or null) intermediate mappings, and return
/// the mapping found at the end.
///
/// On failure the error holds the dot-path of the first non-mapping value
/// that blocked the walk (`<root>` for the document itself).
pub fn ensure_mapping<'a, T: Tree>(root: &'a mut T, path: &str) -> Result<&'a mut T, String> {
    if root.is_null() {
        *root = T::empty_mapping();
    }
    if !root.is_mapping() {
        return Err("<root>".to_string());
    }
    let mut cur = root;
    let mut walked = String::new();
    for seg in segments(path) {
        if !walked.is_empty() {
            walked.push('.');
        }
        walked.push_str(seg);
        let vacant = cur.child(seg).map_or(true, Tree::is_null);
        if vacant {
            cur.insert_child(seg, T::empty_mapping());
        }
        let next = match cur.child_mut(seg) {
            Some(n) if n.is_mapping() => n,
            _ => return Err(walked),
        };
        cur = next;
    }
    Ok(cur)
}

/// Write `value` at a dot-path, creating intermediate mappings as needed.
pub fn set_path<T: Tree>(root: &mut T, path: &str, value: T) -> Result<(), String> {
    let (parent, last) = match path.rsplit_once('.') {
        Some((p, l)) => (p, l),
        None => ("", path),
    };
    let target = ensure_mapping(root, parent)?;
    target.insert_child(last, value);
    Ok(())
}
