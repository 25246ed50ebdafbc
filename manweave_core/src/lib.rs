//! `manweave_core` is the core library for the manweave manual collector.
//! It extracts structured documentation fragments embedded as delimited
//! comment blocks in source files, renders each fragment into a standalone
//! manual page plus a metadata sidecar, and optionally produces per-category
//! index and concatenated documents.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Source tree
//!   → TreeWalker (finds start directories, matches files to rules)
//!   → BlockScanner (cuts raw blocks out of one file's text)
//!   → BlockParser (first line → category, header region → metadata, rest → body)
//!   → PlaceholderResolver ({{key}} against record → properties → built-ins)
//!   → ManualWriter (category-keyed output tree + metadata sidecar)
//!   → Index/Concat generators (second phase, reads sidecars only)
//! ```
//!
//! ## Modules
//!
//! - [`config`] — Configuration loading from `manweave.toml`: file type
//!   rules, start/exclude lists, output and generator settings.
//! - [`record`] — The metadata record extracted from each block and its
//!   sidecar codec.
//!
//! ## Key Types
//!
//! - [`ManweaveConfig`] — Immutable run configuration.
//! - [`FileTypeRule`] — Per-extension block grammar (delimiters, prefixes).
//! - [`RunContext`] — Run-scoped values (start timestamp, hostname, project
//!   properties) threaded explicitly through the pipeline.
//! - [`MetadataRecord`] — Ordered, case-insensitive key/value record.
//! - [`CollectReport`] — Counters and output paths from one run.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use manweave_core::{ManweaveConfig, RunContext, run_collect};
//! use std::path::Path;
//!
//! let config = ManweaveConfig::load(Path::new("."))
//! 	.unwrap()
//! 	.unwrap_or_default();
//! let ctx = RunContext::new(&config);
//! let report = run_collect(&config, &ctx).unwrap();
//! println!("{} manual(s) written", report.written.len());
//! ```

pub use config::*;
pub use context::*;
pub use engine::*;
pub use error::*;
pub use generate::*;
pub use parser::*;
pub use record::*;
pub use resolver::*;
pub use scanner::*;
pub use walker::*;
pub use writer::*;

pub mod config;
mod context;
mod engine;
mod error;
mod generate;
mod parser;
pub mod record;
mod resolver;
mod scanner;
mod walker;
mod writer;

#[cfg(test)]
mod __fixtures;
