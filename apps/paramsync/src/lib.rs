//! Paramsync core library.
//!
//! This crate exposes programmatic APIs for synchronizing selected fields
//! between YAML configuration files, typically the same stack configured for
//! two environments (e.g. `config/di-development/` and `config/di-production/`).
//!
//! High-level modules:
//! - `cli`: CLI argument parsing (binary uses this).
//! - `config`: Config discovery, loading and validation.
//! - `resolver`: Glob pattern matching from file paths to sync rules.
//! - `filter`: Field-based include/exclude filters on source documents.
//! - `diff`: Read-only comparison of source and target documents.
//! - `merge`: Application of a diff to a target document.
//! - `document`: YAML document loading and saving behind a store trait.
//! - `pairing`: Source/target pair discovery from glob patterns.
//! - `sync`: Per-file and bulk orchestration.
//! - `prompt`: Confirmation prompts.
//! - `models`: Config, rule and diff data models.
//! - `output`: Human/JSON printers.
//! - `error`: Crate error type.
//! - `utils`: Dot-path helpers over YAML/JSON trees.
pub mod cli;
pub mod config;
pub mod diff;
pub mod document;
pub mod error;
pub mod filter;
pub mod merge;
pub mod models;
pub mod output;
pub mod pairing;
pub mod prompt;
pub mod resolver;
pub mod sync;
pub mod utils;
