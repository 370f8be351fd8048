//! Input options for opening a source stream.
//!
//! This module contains the configuration types that control how patterns
//! are resolved and how each resolved file's contents are materialized.
//! The option records deserialize with defaults, and unknown fields are
//! ignored, so a partial JSON object is a valid options record.

use path_clean::PathClean;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How (and whether) file contents are loaded.
///
/// | read  | buffer | contents                      |
/// |-------|--------|-------------------------------|
/// | false | any    | absent                        |
/// | true  | true   | fully read into memory        |
/// | true  | false  | open handle, read by consumer |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadPolicy {
    /// Load contents at all
    pub read: bool,
    /// Buffer contents in memory instead of streaming them
    pub buffer: bool,
}

impl Default for LoadPolicy {
    fn default() -> Self {
        Self {
            read: true,
            buffer: true,
        }
    }
}

impl LoadPolicy {
    /// Buffered reads (default)
    pub fn buffered() -> Self {
        Self::default()
    }

    /// Lazily streamed reads
    pub fn streamed() -> Self {
        Self {
            read: true,
            buffer: false,
        }
    }

    /// No reads; contents are always absent
    pub fn no_read() -> Self {
        Self {
            read: false,
            buffer: true,
        }
    }

    /// True when this policy hands out open file handles.
    pub fn is_streaming(&self) -> bool {
        self.read && !self.buffer
    }
}

/// Options for [`crate::src`] and [`crate::SourceStream::open`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SrcOptions {
    /// Content loading policy (`read` / `buffer`)
    #[serde(flatten)]
    pub load: LoadPolicy,
    /// Directory relative patterns are resolved against (process cwd if unset)
    pub cwd: Option<PathBuf>,
    /// Override for the base recorded on every emitted file
    pub base: Option<PathBuf>,
    /// Let wildcards match names starting with `.`
    pub dot: bool,
    /// Drop directories from glob matches
    pub nodir: bool,
    /// Follow symbolic links while walking
    pub follow_symlinks: bool,
}

impl Default for SrcOptions {
    fn default() -> Self {
        Self {
            load: LoadPolicy::default(),
            cwd: None,
            base: None,
            dot: false,
            nodir: false,
            follow_symlinks: true,
        }
    }
}

impl SrcOptions {
    /// Create new default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set `read`
    pub fn read(mut self, read: bool) -> Self {
        self.load.read = read;
        self
    }

    /// Builder: set `buffer`
    pub fn buffer(mut self, buffer: bool) -> Self {
        self.load.buffer = buffer;
        self
    }

    /// Builder: set the working directory for relative patterns
    pub fn cwd(mut self, cwd: impl AsRef<Path>) -> Self {
        self.cwd = Some(cwd.as_ref().to_path_buf());
        self
    }

    /// Builder: set the base recorded on emitted files
    pub fn base(mut self, base: impl AsRef<Path>) -> Self {
        self.base = Some(base.as_ref().to_path_buf());
        self
    }

    /// Builder: match dotfiles
    pub fn dot(mut self, dot: bool) -> Self {
        self.dot = dot;
        self
    }

    /// Builder: skip directories
    pub fn nodir(mut self, nodir: bool) -> Self {
        self.nodir = nodir;
        self
    }

    /// Builder: follow symlinks
    pub fn follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    /// Resolve the effective working directory.
    pub fn resolved_cwd(&self) -> std::io::Result<PathBuf> {
        match &self.cwd {
            Some(cwd) if cwd.is_absolute() => Ok(cwd.clean()),
            Some(cwd) => Ok(std::env::current_dir()?.join(cwd).clean()),
            None => std::env::current_dir(),
        }
    }
}

/// Feature toggles owned by the surrounding tool.
///
/// These are passed in explicitly rather than read from global state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Features {
    /// Allow `buffer = false` (lazily streamed contents)
    pub streaming: bool,
}

impl Default for Features {
    fn default() -> Self {
        Self { streaming: true }
    }
}

impl Features {
    /// Disable lazily streamed contents
    pub fn without_streaming() -> Self {
        Self { streaming: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = SrcOptions::default();
        assert!(opts.load.read);
        assert!(opts.load.buffer);
        assert!(!opts.dot);
        assert!(!opts.nodir);
        assert!(opts.follow_symlinks);
        assert!(Features::default().streaming);
    }

    #[test]
    fn test_builder() {
        let opts = SrcOptions::new().read(false).buffer(false).dot(true);
        assert!(!opts.load.read);
        assert!(!opts.load.buffer);
        assert!(opts.dot);
    }

    #[test]
    fn test_is_streaming() {
        assert!(LoadPolicy::streamed().is_streaming());
        assert!(!LoadPolicy::buffered().is_streaming());
        assert!(!LoadPolicy::no_read().is_streaming());
        let no_read_no_buffer = LoadPolicy {
            read: false,
            buffer: false,
        };
        assert!(!no_read_no_buffer.is_streaming());
    }

    #[test]
    fn test_deserialize_partial_ignores_unknown() {
        let opts: SrcOptions =
            serde_json::from_str(r#"{"buffer": false, "since": 12, "allowEmpty": true}"#).unwrap();
        assert!(opts.load.read);
        assert!(!opts.load.buffer);
        assert!(opts.cwd.is_none());
    }

    #[test]
    fn test_deserialize_resolution_fields() {
        let opts: SrcOptions =
            serde_json::from_str(r#"{"read": false, "cwd": "/tmp", "nodir": true}"#).unwrap();
        assert!(!opts.load.read);
        assert_eq!(opts.cwd, Some(PathBuf::from("/tmp")));
        assert!(opts.nodir);
    }

    #[test]
    fn test_resolved_cwd_absolute() {
        let opts = SrcOptions::new().cwd("/var/data");
        assert_eq!(opts.resolved_cwd().unwrap(), PathBuf::from("/var/data"));
    }

    #[test]
    fn test_resolved_cwd_is_cleaned() {
        let here = SrcOptions::new().cwd(".");
        assert_eq!(here.resolved_cwd().unwrap(), std::env::current_dir().unwrap());

        let abs = SrcOptions::new().cwd("/var/data/../logs/.");
        assert_eq!(abs.resolved_cwd().unwrap(), PathBuf::from("/var/logs"));
    }

    #[test]
    fn test_resolved_cwd_relative_joins_process_cwd() {
        let opts = SrcOptions::new().cwd("sub");
        let expected = std::env::current_dir().unwrap().join("sub");
        assert_eq!(opts.resolved_cwd().unwrap(), expected);
    }
}
