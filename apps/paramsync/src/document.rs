//! Document persistence seam.
//!
//! The engine only sees an ordered tree ([`Document`]); reading and writing
//! files is delegated to a [`DocumentStore`]. `YamlFileStore` is the on-disk
//! implementation and `MemoryStore` a structural fake for tests and dry
//! inspection.

use crate::error::{Result, SyncError};
use crate::utils::Tree;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Ordered nested key-value tree. Mappings keep insertion order.
pub type Document = serde_yaml::Value;

pub trait DocumentStore {
    fn load(&self, path: &Path) -> Result<Document>;
    fn save(&self, path: &Path, doc: &Document) -> Result<()>;
}

/// YAML files on disk.
///
/// Empty and comment-only files load as an empty mapping. Saving keeps the
/// leading comment block of the existing file and writes the structured
/// content beneath it.
#[derive(Debug, Default, Clone, Copy)]
pub struct YamlFileStore;

impl DocumentStore for YamlFileStore {
    fn load(&self, path: &Path) -> Result<Document> {
        let s = fs::read_to_string(path).map_err(|source| SyncError::DocumentRead {
            path: path.to_path_buf(),
            source,
        })?;
        parse_document(&s).map_err(|message| SyncError::DocumentParse {
            path: path.to_path_buf(),
            message,
        })
    }

    fn save(&self, path: &Path, doc: &Document) -> Result<()> {
        let header = fs::read_to_string(path)
            .map(|s| comment_header(&s))
            .unwrap_or_default();
        let body = render_document(doc).map_err(|e| SyncError::DocumentWrite {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        })?;
        fs::write(path, format!("{}{}", header, body)).map_err(|source| {
            SyncError::DocumentWrite {
                path: path.to_path_buf(),
                source,
            }
        })
    }
}

/// Parse YAML text; empty or comment-only input becomes an empty mapping.
pub fn parse_document(s: &str) -> std::result::Result<Document, String> {
    let doc: Document = serde_yaml::from_str(s).map_err(|e| e.to_string())?;
    Ok(if doc.is_null() {
        Document::empty_mapping()
    } else {
        doc
    })
}

pub fn render_document(doc: &Document) -> std::result::Result<String, String> {
    serde_yaml::to_string(doc).map_err(|e| e.to_string())
}

/// Leading comment and blank lines, up to the first content line.
fn comment_header(s: &str) -> String {
    let mut out = String::new();
    for line in s.lines() {
        let t = line.trim_start();
        if t.is_empty() || t.starts_with('#') {
            out.push_str(line);
            out.push('\n');
        } else {
            break;
        }
    }
    out
}

/// In-memory store. Every successful save is recorded in order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: RefCell<BTreeMap<PathBuf, Document>>,
    saves: RefCell<Vec<PathBuf>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, path: impl Into<PathBuf>, doc: Document) {
        self.docs.borrow_mut().insert(path.into(), doc);
    }

    pub fn insert_yaml(&self, path: impl Into<PathBuf>, yaml: &str) -> Result<()> {
        let path = path.into();
        let doc = parse_document(yaml).map_err(|message| SyncError::DocumentParse {
            path: path.clone(),
            message,
        })?;
        self.insert(path, doc);
        Ok(())
    }

    pub fn get(&self, path: &Path) -> Option<Document> {
        self.docs.borrow().get(path).cloned()
    }

    pub fn saves(&self) -> Vec<PathBuf> {
        self.saves.borrow().clone()
    }
}

impl DocumentStore for MemoryStore {
    fn load(&self, path: &Path) -> Result<Document> {
        self.get(path).ok_or_else(|| SyncError::DocumentRead {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such document"),
        })
    }

    fn save(&self, path: &Path, doc: &Document) -> Result<()> {
        self.docs.borrow_mut().insert(path.to_path_buf(), doc.clone());
        self.saves.borrow_mut().push(path.to_path_buf());
        Ok(())
    }
}
