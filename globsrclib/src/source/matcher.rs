//! Pattern resolution: turn a pattern set into an ordered list of paths.
//!
//! Positive patterns are expanded one at a time and concatenated in list
//! order. Literal paths pass through without touching the filesystem; globs
//! walk their glob parent and keep entries the pattern matches, sorted by
//! path. Negated patterns are applied afterwards as a single subtraction
//! pass over the accumulated list.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::pattern::{CompiledPattern, PatternSet};
use crate::error::GlobsrcError;
use crate::options::SrcOptions;
use crate::Result;

/// One resolved path and the glob parent of the pattern that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedPath {
    /// Absolute, cleaned path
    pub path: PathBuf,
    /// Glob parent of the producing pattern
    pub base: PathBuf,
}

/// Resolve a pattern set into matched paths, in emission order.
#[tracing::instrument(level = "debug", skip_all, fields(patterns = patterns.len()))]
pub fn resolve(patterns: &PatternSet, options: &SrcOptions) -> Result<Vec<MatchedPath>> {
    let cwd = options.resolved_cwd()?;
    let compiled = patterns.compile(&cwd)?;

    let (negations, positives): (Vec<_>, Vec<_>) =
        compiled.into_iter().partition(|p| p.negated);

    if positives.is_empty() {
        return Err(GlobsrcError::EmptyPattern);
    }

    let mut seen = HashSet::new();
    let mut matched = Vec::new();

    for pattern in &positives {
        let base = pattern.glob_parent();
        for path in expand(pattern, options) {
            if seen.insert(path.clone()) {
                matched.push(MatchedPath {
                    path,
                    base: base.clone(),
                });
            }
        }
    }

    if !negations.is_empty() {
        matched.retain(|m| !negations.iter().any(|n| n.matches(&m.path, options.dot)));
    }

    tracing::debug!(count = matched.len(), "resolved pattern set");

    Ok(matched)
}

/// Resolve a pattern set into bare absolute paths.
pub fn resolve_paths(patterns: &PatternSet, options: &SrcOptions) -> Result<Vec<PathBuf>> {
    Ok(resolve(patterns, options)?
        .into_iter()
        .map(|m| m.path)
        .collect())
}

/// Expand one positive pattern against the filesystem.
fn expand(pattern: &CompiledPattern, options: &SrcOptions) -> Vec<PathBuf> {
    if pattern.literal {
        // Existence is checked when contents are loaded
        return vec![pattern.base.clone()];
    }

    let mut walker = WalkDir::new(&pattern.base)
        .min_depth(1)
        .follow_links(options.follow_symlinks);
    if let Some(depth) = pattern.max_depth {
        walker = walker.max_depth(depth);
    }

    let mut files = Vec::new();

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                log_walk_error(&pattern.base, &err);
                continue;
            }
        };

        if options.nodir && entry.file_type().is_dir() {
            continue;
        }

        if pattern.matches(entry.path(), options.dot) {
            files.push(entry.into_path());
        }
    }

    // Sort for deterministic output
    files.sort();

    files
}

fn log_walk_error(base: &Path, err: &walkdir::Error) {
    if err.depth() == 0 {
        tracing::debug!(base = %base.display(), error = %err, "glob parent not readable");
    } else {
        tracing::warn!(
            path = %err.path().unwrap_or(base).display(),
            error = %err,
            "skipping entry during pattern expansion"
        );
    }
}
