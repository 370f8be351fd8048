//! The source stream: resolve patterns, then emit one virtual file per path.
//!
//! Opening a stream spawns a worker on the ambient tokio runtime. The worker
//! resolves the pattern set on the blocking pool and then walks the resolved
//! list in order, loading each file and handing it to the consumer through a
//! single-slot channel. A slot is reserved before a file is loaded, so a slow
//! consumer holds back reads as well as emission.
//!
//! The first error ends the run: it is yielded as an `Err` item, the stream
//! then yields `None`, and [`SourceStream::state`] reports
//! [`StreamState::Failed`] instead of [`StreamState::Ended`].

use std::path::PathBuf;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::{Stream, StreamExt};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;
use tracing::Instrument;

use crate::error::GlobsrcError;
use crate::file::VirtualFile;
use crate::loader;
use crate::options::{Features, SrcOptions};
use crate::source::{self, MatchedPath, PatternSet};
use crate::Result;

/// Lifecycle of a source stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// Opened, worker not started yet
    Idle,
    /// Expanding patterns
    Resolving,
    /// Loading and emitting files
    Emitting,
    /// Every file emitted
    Ended,
    /// Stopped on an error
    Failed,
}

impl StreamState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamState::Ended | StreamState::Failed)
    }
}

/// An ordered, finite stream of virtual files.
///
/// Dropping the stream stops the worker; open handles for streamed contents
/// that were not yet handed out are closed with it.
pub struct SourceStream {
    rx: ReceiverStream<Result<VirtualFile>>,
    state: watch::Receiver<StreamState>,
    task: JoinHandle<()>,
}

impl SourceStream {
    /// Open a stream over `patterns`.
    ///
    /// Returns immediately; resolution starts on the worker. Must be called
    /// from within a tokio runtime.
    pub fn open(patterns: impl Into<PatternSet>, options: SrcOptions, features: Features) -> Self {
        let patterns = patterns.into();
        let (tx, rx) = mpsc::channel(1);
        let (state_tx, state_rx) = watch::channel(StreamState::Idle);

        let span = tracing::debug_span!("source_stream", patterns = patterns.len());
        let task = tokio::spawn(
            Worker {
                options,
                features,
                tx,
                state: state_tx,
            }
            .run(patterns)
            .instrument(span),
        );

        Self {
            rx: ReceiverStream::new(rx),
            state: state_rx,
            task,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> StreamState {
        *self.state.borrow()
    }

    /// Watch lifecycle changes.
    ///
    /// The receiver reports the sender as closed once the worker is gone,
    /// whether it finished or was torn down by dropping this stream.
    pub fn subscribe(&self) -> watch::Receiver<StreamState> {
        self.state.clone()
    }

    /// Drain the stream, failing on the first error.
    pub async fn collect_files(mut self) -> Result<Vec<VirtualFile>> {
        let mut files = Vec::new();
        while let Some(item) = self.next().await {
            files.push(item?);
        }
        Ok(files)
    }
}

impl Stream for SourceStream {
    type Item = Result<VirtualFile>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.rx).poll_next(cx)
    }
}

impl Drop for SourceStream {
    fn drop(&mut self) {
        self.task.abort();
    }
}

struct Worker {
    options: SrcOptions,
    features: Features,
    tx: mpsc::Sender<Result<VirtualFile>>,
    state: watch::Sender<StreamState>,
}

impl Worker {
    async fn run(mut self, patterns: PatternSet) {
        self.state.send_replace(StreamState::Resolving);

        let cwd = match self.options.resolved_cwd() {
            Ok(cwd) => cwd,
            Err(e) => return self.fail(e.into()).await,
        };
        self.options.cwd = Some(cwd.clone());

        let matched = match self.resolve(patterns).await {
            Ok(matched) => matched,
            Err(e) => return self.fail(e).await,
        };

        self.state.send_replace(StreamState::Emitting);

        for m in matched {
            let Ok(permit) = self.tx.reserve().await else {
                tracing::debug!("consumer dropped the stream");
                return;
            };

            match loader::load(&m.path, self.options.load, self.features).await {
                Ok(loaded) => {
                    let base = self.options.base.clone().unwrap_or(m.base);
                    tracing::debug!(path = %m.path.display(), "emitting file");
                    permit.send(Ok(VirtualFile::new(
                        cwd.clone(),
                        base,
                        m.path,
                        loaded.contents,
                        loaded.stat,
                    )));
                }
                Err(e) => {
                    tracing::debug!(path = %m.path.display(), error = %e, "load failed");
                    self.state.send_replace(StreamState::Failed);
                    permit.send(Err(e));
                    return;
                }
            }
        }

        self.state.send_replace(StreamState::Ended);
    }

    async fn resolve(&self, patterns: PatternSet) -> Result<Vec<MatchedPath>> {
        let options = self.options.clone();
        tokio::task::spawn_blocking(move || source::resolve(&patterns, &options))
            .await
            .map_err(|e| GlobsrcError::Io(std::io::Error::other(e)))?
    }

    async fn fail(self, err: GlobsrcError) {
        tracing::debug!(error = %err, "resolution failed");
        self.state.send_replace(StreamState::Failed);
        // Nothing to do if the consumer is already gone
        let _ = self.tx.send(Err(err)).await;
    }
}

/// Resolve `patterns` without loading anything.
///
/// Convenience for callers that only need the ordered path list.
pub async fn list(patterns: impl Into<PatternSet>, options: SrcOptions) -> Result<Vec<PathBuf>> {
    let patterns = patterns.into();
    tokio::task::spawn_blocking(move || source::resolve_paths(&patterns, &options))
        .await
        .map_err(|e| GlobsrcError::Io(std::io::Error::other(e)))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use std::time::Duration;
    use tempfile::tempdir;

    fn create_files(dir: &Path, names: &[&str]) {
        for name in names {
            fs::write(dir.join(name), name.as_bytes()).unwrap();
        }
    }

    #[tokio::test]
    async fn test_states_on_success() {
        let temp = tempdir().unwrap();
        create_files(temp.path(), &["a.txt", "b.txt"]);

        let mut stream = SourceStream::open(
            "*.txt",
            SrcOptions::new().cwd(temp.path()),
            Features::default(),
        );

        let mut count = 0;
        while let Some(item) = stream.next().await {
            item.unwrap();
            count += 1;
        }

        assert_eq!(count, 2);
        assert_eq!(stream.state(), StreamState::Ended);
    }

    #[tokio::test]
    async fn test_states_on_pattern_error() {
        let mut stream = SourceStream::open("[oops", SrcOptions::new(), Features::default());

        let first = stream.next().await.unwrap();
        assert!(matches!(first, Err(GlobsrcError::InvalidGlob { .. })));
        assert!(stream.next().await.is_none());
        assert_eq!(stream.state(), StreamState::Failed);
    }

    #[tokio::test]
    async fn test_stops_after_first_read_error() {
        let temp = tempdir().unwrap();
        create_files(temp.path(), &["a.txt", "c.txt"]);

        let set = PatternSet::from(["a.txt", "b.txt", "c.txt"]);
        let mut stream = SourceStream::open(
            set,
            SrcOptions::new().cwd(temp.path()),
            Features::default(),
        );

        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first.path(), temp.path().join("a.txt"));

        let second = stream.next().await.unwrap();
        let err = second.unwrap_err();
        assert_eq!(err.path(), Some(&temp.path().join("b.txt")));

        assert!(stream.next().await.is_none());
        assert_eq!(stream.state(), StreamState::Failed);
    }

    #[tokio::test]
    async fn test_backpressure_holds_worker() {
        let temp = tempdir().unwrap();
        create_files(temp.path(), &["a.txt", "b.txt", "c.txt", "d.txt"]);

        let mut stream = SourceStream::open(
            "*.txt",
            SrcOptions::new().cwd(temp.path()),
            Features::default(),
        );

        stream.next().await.unwrap().unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        // One file buffered in the channel, the worker waits for a slot
        assert_eq!(stream.state(), StreamState::Emitting);

        let rest = stream.collect_files().await.unwrap();
        assert_eq!(rest.len(), 3);
    }

    #[tokio::test]
    async fn test_base_override() {
        let temp = tempdir().unwrap();
        create_files(temp.path(), &["a.txt"]);

        let files = SourceStream::open(
            "*.txt",
            SrcOptions::new().cwd(temp.path()).base("/custom/base"),
            Features::default(),
        )
        .collect_files()
        .await
        .unwrap();

        assert_eq!(files[0].base(), Path::new("/custom/base"));
        assert_eq!(files[0].cwd(), temp.path());
    }

    #[tokio::test]
    async fn test_list_paths_only() {
        let temp = tempdir().unwrap();
        create_files(temp.path(), &["b.txt", "a.txt"]);

        let paths = list("*.txt", SrcOptions::new().cwd(temp.path()))
            .await
            .unwrap();

        assert_eq!(
            paths,
            vec![temp.path().join("a.txt"), temp.path().join("b.txt")]
        );
    }
}
