//! Per-video comment logs and completion markers
//!
//! Each video gets `comments_<id>.jsonl` in the output directory, one JSON
//! record per line, appended as records are produced. A video that finishes
//! every page also gets `comments_<id>.done`.

use crate::config::ResumeMode;
use crate::output::CommentRecord;
use crate::TrawlError;
use chrono::Utc;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Location of the comment log for a video
pub fn log_path(dir: &Path, video_id: &str) -> PathBuf {
    dir.join(format!("comments_{}.jsonl", video_id))
}

/// Location of the completion marker for a video
pub fn marker_path(dir: &Path, video_id: &str) -> PathBuf {
    dir.join(format!("comments_{}.done", video_id))
}

/// Size of a file in bytes, or zero when it does not exist
fn file_len(path: &Path) -> std::io::Result<u64> {
    match fs::metadata(path) {
        Ok(meta) => Ok(meta.len()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(0),
        Err(e) => Err(e),
    }
}

/// True if an earlier run already collected this video
pub fn is_complete(dir: &Path, video_id: &str, mode: ResumeMode) -> std::io::Result<bool> {
    match mode {
        ResumeMode::LogPresence => Ok(file_len(&log_path(dir, video_id))? > 0),
        ResumeMode::Marker => Ok(marker_path(dir, video_id).is_file()),
    }
}

/// True if the log has content but no completion marker
pub fn is_partial(dir: &Path, video_id: &str) -> std::io::Result<bool> {
    Ok(file_len(&log_path(dir, video_id))? > 0 && !marker_path(dir, video_id).is_file())
}

/// Append-only writer for one video's comments
///
/// Every record is flushed as soon as it is written, so a crash loses at most
/// the line being written.
pub struct CommentLog {
    path: PathBuf,
    writer: BufWriter<File>,
    records_written: u64,
}

impl CommentLog {
    /// Opens the log for appending, creating it if needed
    ///
    /// With `truncate`, any partial content from an interrupted run is discarded first.
    pub fn open(dir: &Path, video_id: &str, truncate: bool) -> Result<Self, TrawlError> {
        let path = log_path(dir, video_id);
        let mut options = OpenOptions::new();
        if truncate {
            options.write(true).create(true).truncate(true);
        } else {
            options.append(true).create(true);
        }

        let file = options.open(&path).map_err(|source| TrawlError::Log {
            path: path.clone(),
            source,
        })?;

        Ok(Self {
            path,
            writer: BufWriter::new(file),
            records_written: 0,
        })
    }

    /// Writes one record as a JSON line and flushes it
    pub fn append(&mut self, record: &CommentRecord) -> Result<(), TrawlError> {
        let line = serde_json::to_string(record)?;
        self.write_line(&line).map_err(|source| TrawlError::Log {
            path: self.path.clone(),
            source,
        })?;
        self.records_written += 1;
        Ok(())
    }

    fn write_line(&mut self, line: &str) -> std::io::Result<()> {
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flushes and syncs the log to disk
    pub fn finish(mut self) -> Result<u64, TrawlError> {
        let result = self.writer.flush().and_then(|_| self.writer.get_ref().sync_all());
        result.map_err(|source| TrawlError::Log {
            path: self.path.clone(),
            source,
        })?;
        Ok(self.records_written)
    }
}

/// Writes the completion marker for a video
pub fn write_marker(dir: &Path, video_id: &str, records: u64) -> Result<(), TrawlError> {
    let path = marker_path(dir, video_id);
    let content = format!("{} {}\n", Utc::now().to_rfc3339(), records);
    fs::write(&path, content).map_err(|source| TrawlError::Log { path, source })
}

/// Counts the lines of a comment log, zero if it does not exist
pub fn count_records(dir: &Path, video_id: &str) -> std::io::Result<u64> {
    match fs::read_to_string(log_path(dir, video_id)) {
        Ok(content) => Ok(content.lines().filter(|l| !l.trim().is_empty()).count() as u64),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(0),
        Err(e) => Err(e),
    }
}
