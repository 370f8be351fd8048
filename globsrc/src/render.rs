//! Output rendering for the CLI

use console::Style;
use globsrclib::{Contents, VirtualFile};
use serde::Serialize;

/// Output format selected with `--output`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Text,
    Json,
}

impl OutputMode {
    pub fn parse(value: &str) -> Self {
        match value {
            "json" => OutputMode::Json,
            _ => OutputMode::Text,
        }
    }
}

/// One emitted file, flattened for output
#[derive(Debug, Serialize)]
pub struct FileRecord {
    pub path: String,
    pub base: String,
    pub relative: String,
    /// Byte count (buffered length, drained length, or stat size)
    pub size: Option<u64>,
    /// `null`, `buffer` or `stream`
    pub contents: &'static str,
    pub directory: bool,
}

impl FileRecord {
    /// Build a record, draining streamed contents to measure them.
    pub async fn from_file(mut file: VirtualFile) -> std::io::Result<Self> {
        let stat_len = file.stat().map(|m| m.len());
        let (kind, size) = match file.contents_mut() {
            Contents::Null => ("null", stat_len),
            Contents::Buffer(bytes) => ("buffer", Some(bytes.len() as u64)),
            Contents::Stream(stream) => ("stream", Some(stream.read_all().await?.len() as u64)),
        };

        Ok(Self {
            path: file.path().to_string_lossy().into_owned(),
            base: file.base().to_string_lossy().into_owned(),
            relative: file.relative().to_string_lossy().into_owned(),
            size,
            contents: kind,
            directory: file.is_directory(),
        })
    }
}

/// Render records as aligned text lines.
pub fn render_text(records: &[FileRecord]) -> String {
    let dim = Style::new().dim();
    let dir_style = Style::new().blue().bold();

    let width = records
        .iter()
        .map(|r| r.relative.len())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for record in records {
        let name = format!("{:<width$}", record.relative, width = width);
        let name = if record.directory {
            dir_style.apply_to(name).to_string()
        } else {
            name
        };
        let size = match record.size {
            Some(n) => format!("{n:>10}"),
            None => format!("{:>10}", "-"),
        };
        out.push_str(&format!(
            "{}  {}  {}\n",
            name,
            size,
            dim.apply_to(record.contents)
        ));
    }
    out
}

/// Render records as a pretty JSON array.
pub fn render_json(records: &[FileRecord]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(records)
}
