//! Pattern sets and compiled patterns.
//!
//! A [`PatternSet`] is the ordered list of pattern strings a caller hands to
//! the source stream. Each string is compiled against the working directory
//! into a [`CompiledPattern`]: its glob parent (the literal directory prefix
//! before the first wildcard component) plus an absolute `glob::Pattern`.

use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};
use path_clean::PathClean;

use crate::error::GlobsrcError;
use crate::Result;

/// Leading character that turns a pattern into an exclusion.
pub const NEGATION_MARKER: char = '!';

/// Check if a string contains glob metacharacters (`*`, `?`, `[`).
pub fn contains_glob(s: &str) -> bool {
    s.contains('*') || s.contains('?') || s.contains('[')
}

/// An ordered sequence of pattern strings, some possibly negated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternSet {
    patterns: Vec<String>,
}

impl PatternSet {
    /// Create an empty pattern set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: append a pattern.
    pub fn with(mut self, pattern: impl Into<String>) -> Self {
        self.push(pattern);
        self
    }

    /// Append a pattern.
    pub fn push(&mut self, pattern: impl Into<String>) {
        self.patterns.push(pattern.into());
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(String::as_str)
    }

    /// Compile every pattern against `cwd`, keeping list order.
    pub fn compile(&self, cwd: &Path) -> Result<Vec<CompiledPattern>> {
        self.iter()
            .map(|raw| CompiledPattern::compile(raw, cwd))
            .collect()
    }
}

impl From<&str> for PatternSet {
    fn from(pattern: &str) -> Self {
        Self::new().with(pattern)
    }
}

impl From<String> for PatternSet {
    fn from(pattern: String) -> Self {
        Self::new().with(pattern)
    }
}

impl From<&String> for PatternSet {
    fn from(pattern: &String) -> Self {
        Self::new().with(pattern.as_str())
    }
}

impl From<Vec<String>> for PatternSet {
    fn from(patterns: Vec<String>) -> Self {
        Self { patterns }
    }
}

impl From<Vec<&str>> for PatternSet {
    fn from(patterns: Vec<&str>) -> Self {
        patterns.into_iter().collect()
    }
}

impl From<&[&str]> for PatternSet {
    fn from(patterns: &[&str]) -> Self {
        patterns.iter().copied().collect()
    }
}

impl<const N: usize> From<[&str; N]> for PatternSet {
    fn from(patterns: [&str; N]) -> Self {
        patterns.into_iter().collect()
    }
}

impl<S: Into<String>> FromIterator<S> for PatternSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            patterns: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// A single pattern, made absolute and ready to match.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    /// The pattern exactly as given, marker included
    pub raw: String,
    /// Exclusion pattern
    pub negated: bool,
    /// Glob parent for globs, the cleaned absolute path for literals
    pub base: PathBuf,
    /// Absolute matcher (escaped literal for literal paths)
    pub matcher: Pattern,
    /// True when the pattern contains no wildcard component
    pub literal: bool,
    /// Deepest level below `base` a match can sit at (`None` with `**`)
    pub max_depth: Option<usize>,
}

impl CompiledPattern {
    /// Compile a raw pattern string relative to `cwd`.
    pub fn compile(raw: &str, cwd: &Path) -> Result<Self> {
        let (negated, body) = match raw.strip_prefix(NEGATION_MARKER) {
            Some(rest) => (true, rest),
            None => (false, raw),
        };

        if body.is_empty() {
            return Err(GlobsrcError::EmptyPattern);
        }

        // Validate the pattern as written so errors quote what the caller typed
        Pattern::new(body).map_err(|e| invalid_glob(raw, e))?;

        let (prefix, rest) = split_glob_parent(body);
        let base = cwd.join(prefix).clean();

        match rest {
            None => {
                let matcher = Pattern::new(&Pattern::escape(&base.to_string_lossy()))
                    .map_err(|e| invalid_glob(raw, e))?;
                Ok(Self {
                    raw: raw.to_string(),
                    negated,
                    base,
                    matcher,
                    literal: true,
                    max_depth: Some(0),
                })
            }
            Some(rest) => {
                let mut full = Pattern::escape(&base.to_string_lossy());
                if !full.ends_with('/') {
                    full.push('/');
                }
                full.push_str(&rest);
                let matcher = Pattern::new(&full).map_err(|e| invalid_glob(raw, e))?;

                let max_depth = if rest.split('/').any(|c| c == "**") {
                    None
                } else {
                    Some(rest.split('/').count())
                };

                Ok(Self {
                    raw: raw.to_string(),
                    negated,
                    base,
                    matcher,
                    literal: false,
                    max_depth,
                })
            }
        }
    }

    /// Check whether an absolute path matches this pattern.
    ///
    /// `*` never crosses a path separator; a leading dot must be matched
    /// literally unless `dot` is set.
    pub fn matches(&self, path: &Path, dot: bool) -> bool {
        let options = MatchOptions {
            case_sensitive: true,
            require_literal_separator: true,
            require_literal_leading_dot: !dot,
        };
        self.matcher.matches_path_with(path, options)
    }

    /// Directory that files matched by this pattern are relative to.
    pub fn glob_parent(&self) -> PathBuf {
        if self.literal {
            self.base
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| self.base.clone())
        } else {
            self.base.clone()
        }
    }
}

fn invalid_glob(raw: &str, e: glob::PatternError) -> GlobsrcError {
    GlobsrcError::InvalidGlob {
        pattern: raw.to_string(),
        message: e.to_string(),
    }
}

/// Split a pattern into its literal directory prefix and the wildcard rest.
///
/// Returns `(pattern, None)` when no component holds a wildcard.
fn split_glob_parent(pattern: &str) -> (PathBuf, Option<String>) {
    let parts: Vec<&str> = pattern.split('/').filter(|p| !p.is_empty()).collect();

    match parts.iter().position(|p| contains_glob(p)) {
        Some(idx) => {
            let mut prefix = PathBuf::new();
            if pattern.starts_with('/') {
                prefix.push("/");
            }
            for part in &parts[..idx] {
                prefix.push(part);
            }
            (prefix, Some(parts[idx..].join("/")))
        }
        None => (PathBuf::from(pattern), None),
    }
}
