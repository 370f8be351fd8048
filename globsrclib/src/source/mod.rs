//! Source discovery: find the files a pattern set selects.
//!
//! This module handles the first stage of the pipeline - resolving what
//! files to emit. It provides:
//!
//! - **Pattern sets**: ordered patterns, `!`-prefixed ones subtract
//! - **Resolution**: glob expansion with deterministic, list-ordered output
//!
//! ## Example
//!
//! ```rust,ignore
//! use globsrclib::source::{resolve_paths, PatternSet};
//! use globsrclib::SrcOptions;
//!
//! let set = PatternSet::from(["templates/**/*.hbs", "!templates/drafts/**"]);
//! let paths = resolve_paths(&set, &SrcOptions::new())?;
//! ```

pub mod matcher;
pub mod pattern;

pub use matcher::{resolve, resolve_paths, MatchedPath};
pub use pattern::{contains_glob, CompiledPattern, PatternSet, NEGATION_MARKER};
