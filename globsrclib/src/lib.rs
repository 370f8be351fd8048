//! # globsrclib
//!
//! A glob-driven file source: resolve one or more path patterns against the
//! filesystem and emit the matching files, in order, as virtual files
//! carrying path and contents.
//!
//! ## Overview
//!
//! A build or templating pipeline starts from a set of files. This library
//! is that starting point. It:
//!
//! - **Resolves patterns**: globs (`*`, `**`, `?`, `[...]`) and literal paths,
//!   in list order, with `!`-prefixed patterns subtracting from the result
//! - **Loads contents** per a policy: buffered in memory, lazily streamed, or
//!   not at all
//! - **Streams files** one at a time with backpressure, failing fast on the
//!   first error
//!
//! ## Example
//!
//! ```rust
//! use futures::StreamExt;
//! use globsrclib::{src, SrcOptions};
//! use std::fs;
//! use tempfile::tempdir;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let dir = tempdir().unwrap();
//! fs::create_dir(dir.path().join("generic")).unwrap();
//! fs::write(dir.path().join("generic/run.dmc"), "run").unwrap();
//! fs::write(dir.path().join("generic/test.dmc"), "test").unwrap();
//!
//! let mut stream = src(
//!     vec!["generic/*.dmc", "!generic/test.dmc"],
//!     SrcOptions::new().cwd(dir.path()),
//! );
//!
//! let file = stream.next().await.unwrap().unwrap();
//! assert!(file.path().ends_with("generic/run.dmc"));
//! assert_eq!(file.contents().as_bytes(), Some(&b"run"[..]));
//! assert!(stream.next().await.is_none());
//! # }
//! ```

pub mod error;
pub mod file;
pub mod loader;
pub mod options;
pub mod source;
pub mod stream;

pub use error::GlobsrcError;
pub use file::{Contents, FileStream, VirtualFile};
pub use loader::{load, Loaded};
pub use options::{Features, LoadPolicy, SrcOptions};
pub use source::{resolve, resolve_paths, MatchedPath, PatternSet};
pub use stream::{list, SourceStream, StreamState};

/// Result type for globsrclib operations
pub type Result<T> = std::result::Result<T, GlobsrcError>;

/// Open a source stream with the default feature set.
///
/// Must be called from within a tokio runtime.
pub fn src(patterns: impl Into<PatternSet>, options: SrcOptions) -> SourceStream {
    SourceStream::open(patterns, options, Features::default())
}
