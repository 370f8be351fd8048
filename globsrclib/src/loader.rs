//! Content loading: materialize a resolved path according to a load policy.

use std::fs::Metadata;
use std::path::Path;

use tokio::fs::{self, File};

use crate::error::GlobsrcError;
use crate::file::{Contents, FileStream};
use crate::options::{Features, LoadPolicy};
use crate::Result;

/// Contents plus the metadata gathered while loading them.
#[derive(Debug)]
pub struct Loaded {
    pub contents: Contents,
    pub stat: Option<Metadata>,
}

/// Load one path.
///
/// - `read = false` returns absent contents without touching the filesystem.
/// - `buffer = true` reads the whole file before returning.
/// - `buffer = false` opens the file and hands back the unread handle; a file
///   that cannot be opened fails here, not on first read.
///
/// Directories always load as absent contents.
pub async fn load(path: &Path, policy: LoadPolicy, features: Features) -> Result<Loaded> {
    if !policy.read {
        return Ok(Loaded {
            contents: Contents::Null,
            stat: None,
        });
    }

    if policy.is_streaming() && !features.streaming {
        return Err(GlobsrcError::StreamingDisabled {
            path: path.to_path_buf(),
        });
    }

    let stat = fs::metadata(path).await.map_err(|e| read_error(path, e))?;

    if stat.is_dir() {
        return Ok(Loaded {
            contents: Contents::Null,
            stat: Some(stat),
        });
    }

    let contents = if policy.buffer {
        let bytes = fs::read(path).await.map_err(|e| read_error(path, e))?;
        Contents::Buffer(bytes)
    } else {
        let file = File::open(path).await.map_err(|e| read_error(path, e))?;
        Contents::Stream(FileStream::new(path.to_path_buf(), file))
    };

    Ok(Loaded {
        contents,
        stat: Some(stat),
    })
}

fn read_error(path: &Path, source: std::io::Error) -> GlobsrcError {
    GlobsrcError::FileRead {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs as stdfs;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_no_read_skips_filesystem() {
        let loaded = load(
            Path::new("/definitely/not/here"),
            LoadPolicy::no_read(),
            Features::default(),
        )
        .await
        .unwrap();

        assert!(loaded.contents.is_null());
        assert!(loaded.stat.is_none());
    }

    #[tokio::test]
    async fn test_no_read_ignores_buffer_flag() {
        let policy = LoadPolicy {
            read: false,
            buffer: false,
        };
        let loaded = load(Path::new("/nope"), policy, Features::without_streaming())
            .await
            .unwrap();

        assert!(loaded.contents.is_null());
    }

    #[tokio::test]
    async fn test_buffered_read() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("test.coffee");
        stdfs::write(&path, "this is a test").unwrap();

        let loaded = load(&path, LoadPolicy::buffered(), Features::default())
            .await
            .unwrap();

        assert_eq!(loaded.contents.as_bytes(), Some(&b"this is a test"[..]));
        assert_eq!(loaded.stat.unwrap().len(), 14);
    }

    #[tokio::test]
    async fn test_streamed_read() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("test.coffee");
        stdfs::write(&path, "this is a test").unwrap();

        let mut loaded = load(&path, LoadPolicy::streamed(), Features::default())
            .await
            .unwrap();

        let stream = loaded.contents.as_stream_mut().unwrap();
        assert_eq!(stream.read_all().await.unwrap(), b"this is a test");
    }

    #[tokio::test]
    async fn test_missing_file_is_read_error() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("missing.txt");

        for policy in [LoadPolicy::buffered(), LoadPolicy::streamed()] {
            let err = load(&path, policy, Features::default()).await.unwrap_err();
            match err {
                GlobsrcError::FileRead { path: p, .. } => assert_eq!(p, path),
                other => panic!("Expected FileRead, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_streaming_disabled() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("a.txt");
        stdfs::write(&path, "a").unwrap();

        let err = load(&path, LoadPolicy::streamed(), Features::without_streaming())
            .await
            .unwrap_err();
        assert!(matches!(err, GlobsrcError::StreamingDisabled { .. }));

        // Buffered reads are unaffected by the toggle
        let loaded = load(&path, LoadPolicy::buffered(), Features::without_streaming())
            .await
            .unwrap();
        assert!(loaded.contents.is_buffer());
    }

    #[tokio::test]
    async fn test_directory_loads_as_null() {
        let temp = tempdir().unwrap();

        let loaded = load(temp.path(), LoadPolicy::buffered(), Features::default())
            .await
            .unwrap();

        assert!(loaded.contents.is_null());
        assert!(loaded.stat.unwrap().is_dir());
    }
}
