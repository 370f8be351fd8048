//! Virtual file records emitted by the source stream.

use std::fmt;
use std::fs::Metadata;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, ReadBuf};

/// A lazily readable file handle.
///
/// The file is opened when the virtual file is built and closed when this
/// value is dropped. Reading is driven by whoever holds it.
pub struct FileStream {
    path: PathBuf,
    file: File,
}

impl FileStream {
    pub(crate) fn new(path: PathBuf, file: File) -> Self {
        Self { path, file }
    }

    /// Path the handle was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Drain the rest of the file into memory.
    pub async fn read_all(&mut self) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.file.read_to_end(&mut buf).await?;
        Ok(buf)
    }
}

impl AsyncRead for FileStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.file).poll_read(cx, buf)
    }
}

impl fmt::Debug for FileStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileStream")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Contents of a virtual file. Which variant appears depends only on the
/// load policy of the run.
#[derive(Debug, Default)]
pub enum Contents {
    /// Not loaded (`read = false`, or a directory)
    #[default]
    Null,
    /// Fully read into memory
    Buffer(Vec<u8>),
    /// Open handle, read on demand
    Stream(FileStream),
}

impl Contents {
    pub fn is_null(&self) -> bool {
        matches!(self, Contents::Null)
    }

    pub fn is_buffer(&self) -> bool {
        matches!(self, Contents::Buffer(_))
    }

    pub fn is_stream(&self) -> bool {
        matches!(self, Contents::Stream(_))
    }

    /// Buffered bytes, if any.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Contents::Buffer(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Open handle, if any.
    pub fn as_stream_mut(&mut self) -> Option<&mut FileStream> {
        match self {
            Contents::Stream(stream) => Some(stream),
            _ => None,
        }
    }
}

/// One resolved filesystem entry.
#[derive(Debug)]
pub struct VirtualFile {
    cwd: PathBuf,
    base: PathBuf,
    path: PathBuf,
    contents: Contents,
    stat: Option<Metadata>,
}

impl VirtualFile {
    /// Create a virtual file.
    ///
    /// `path` must be absolute and non-empty; the source stream only builds
    /// files from resolved paths, which always are.
    pub fn new(
        cwd: PathBuf,
        base: PathBuf,
        path: PathBuf,
        contents: Contents,
        stat: Option<Metadata>,
    ) -> Self {
        debug_assert!(!path.as_os_str().is_empty(), "virtual file path is empty");
        Self {
            cwd,
            base,
            path,
            contents,
            stat,
        }
    }

    /// Absolute path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Working directory patterns were resolved against
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Glob parent of the pattern that produced this file
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Path relative to `base`, or the full path when outside it.
    pub fn relative(&self) -> PathBuf {
        self.path
            .strip_prefix(&self.base)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| self.path.clone())
    }

    pub fn contents(&self) -> &Contents {
        &self.contents
    }

    /// Mutable access, for draining a streamed body.
    pub fn contents_mut(&mut self) -> &mut Contents {
        &mut self.contents
    }

    pub fn into_contents(self) -> Contents {
        self.contents
    }

    /// Filesystem metadata, present when contents were read.
    pub fn stat(&self) -> Option<&Metadata> {
        self.stat.as_ref()
    }

    pub fn is_directory(&self) -> bool {
        self.stat.as_ref().is_some_and(Metadata::is_dir)
    }

    /// Buffered contents as text, lossily decoded.
    pub fn contents_lossy(&self) -> Option<String> {
        self.contents
            .as_bytes()
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }
}
