//! Idempotent, atomic output-file writing.
//!
//! Buffer text, convert line endings at commit time, compare against the
//! file already on disk, and only touch the filesystem when the contents
//! actually differ.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Line-ending policy applied when a buffered file is committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eol {
    /// Leave `\n` as-is.
    Unix,
    /// Convert every `\n` to `\r\n` at commit time.
    Windows,
}

/// A file queued for writing.
///
/// Text accumulates via [`OutputFile::write`] and takes effect only once
/// [`OutputFile::commit`] is called.
#[derive(Debug, Clone)]
pub struct OutputFile {
    path: PathBuf,
    eol: Eol,
    text: String,
}

/// What happened when an [`OutputFile`] was committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The file on disk already matched; nothing was written.
    Unchanged,
    /// The file didn't exist yet and was created.
    Created,
    /// The file existed with different contents and was overwritten.
    Updated,
}

impl OutputFile {
    /// Creates a new buffered output file at `path`, with no content yet.
    pub fn new(path: impl Into<PathBuf>, eol: Eol) -> Self {
        Self {
            path: path.into(),
            eol,
            text: String::new(),
        }
    }

    /// Appends `text` to the buffer. Line-ending conversion happens only
    /// at [`OutputFile::commit`], so callers can write in any order.
    pub fn write(&mut self, text: &str) {
        self.text.push_str(text);
    }

    /// The path this file will be committed to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Commits the buffered text: converts line endings, compares against
    /// what's on disk, and writes only if the bytes differ.
    ///
    /// In `dry_run` mode the comparison and logging still happen, but the
    /// filesystem is never touched.
    pub fn commit(&self, dry_run: bool) -> Result<CommitOutcome> {
        let body = match self.eol {
            Eol::Unix => self.text.clone(),
            Eol::Windows => self.text.replace('\n', "\r\n"),
        };
        let body = body.into_bytes();

        let existing = match fs::read(&self.path) {
            Ok(bytes) => Some(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                return Err(Error::IOError {
                    path: self.path.display().to_string(),
                    reason: e.to_string(),
                })
            }
        };

        if existing.as_deref() == Some(body.as_slice()) {
            tracing::info!(path = %self.path.display(), "no changes in file");
            return Ok(CommitOutcome::Unchanged);
        }

        let outcome = if existing.is_none() {
            CommitOutcome::Created
        } else {
            CommitOutcome::Updated
        };
        let verb = match outcome {
            CommitOutcome::Created => "creating file",
            CommitOutcome::Updated => "updating file",
            CommitOutcome::Unchanged => unreachable!(),
        };
        tracing::info!(path = %self.path.display(), dry_run, "{}", verb);

        if dry_run {
            return Ok(outcome);
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.is_dir() {
                fs::create_dir_all(parent).map_err(|e| Error::IOError {
                    path: parent.display().to_string(),
                    reason: e.to_string(),
                })?;
            }
        }
        fs::write(&self.path, &body).map_err(|e| Error::IOError {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_new_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let mut f = OutputFile::new(&path, Eol::Unix);
        f.write("hello\n");
        let outcome = f.commit(false).unwrap();
        assert_eq!(outcome, CommitOutcome::Created);
        assert_eq!(fs::read_to_string(&path).unwrap(), "hello\n");
    }

    #[test]
    fn unchanged_content_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        fs::write(&path, "hello\n").unwrap();

        let mut f = OutputFile::new(&path, Eol::Unix);
        f.write("hello\n");
        let outcome = f.commit(false).unwrap();
        assert_eq!(outcome, CommitOutcome::Unchanged);
    }

    #[test]
    fn changed_content_updates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        fs::write(&path, "old\n").unwrap();

        let mut f = OutputFile::new(&path, Eol::Unix);
        f.write("new\n");
        let outcome = f.commit(false).unwrap();
        assert_eq!(outcome, CommitOutcome::Updated);
        assert_eq!(fs::read_to_string(&path).unwrap(), "new\n");
    }

    #[test]
    fn windows_eol_converts_newlines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let mut f = OutputFile::new(&path, Eol::Windows);
        f.write("a\nb\n");
        f.commit(false).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "a\r\nb\r\n");
    }

    #[test]
    fn dry_run_suppresses_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out.txt");
        let mut f = OutputFile::new(&path, Eol::Unix);
        f.write("hello\n");
        let outcome = f.commit(true).unwrap();
        assert_eq!(outcome, CommitOutcome::Created);
        assert!(!path.exists());
    }

    #[test]
    fn creates_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a/b/c/out.txt");
        let mut f = OutputFile::new(&path, Eol::Unix);
        f.write("hello\n");
        f.commit(false).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "hello\n");
    }
}
