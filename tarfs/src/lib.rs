//! Read-only queries over the entries of a tar archive.
//!
//! Every query re-opens the archive and scans it from the start; nothing is
//! cached between calls, so results always reflect the file on disk.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use log::{debug, trace};
use tar::{Archive, Entry, EntryType};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("no such entry: {0}")]
    NotFound(String),
    #[error("is a directory: {0}")]
    IsDirectory(String),
    #[error("invalid utf-8 in entry: {0}")]
    Decode(String),
    #[error("archive {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ArchiveError {
    /// Short stable code, same vocabulary as the vfs protocol errors.
    pub fn code(&self) -> &'static str {
        match self {
            ArchiveError::NotFound(_) => "E_NOENT",
            ArchiveError::IsDirectory(_) => "E_ISDIR",
            ArchiveError::Decode(_) => "E_DECODE",
            ArchiveError::Io { .. } => "E_IO",
        }
    }
}

pub type Result<T> = std::result::Result<T, ArchiveError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub is_dir: bool,
}

impl ArchiveEntry {
    fn from_entry<R: Read>(entry: &Entry<'_, R>) -> Self {
        let raw = String::from_utf8_lossy(&entry.path_bytes()).into_owned();
        let kind = entry.header().entry_type();
        // old v7 writers mark directories only by a trailing slash
        let is_dir = kind.is_dir() || (matches!(kind, EntryType::Regular | EntryType::Continuous) && raw.ends_with('/') && raw.len() > 1);
        ArchiveEntry { name: normalize_name(&raw), is_dir }
    }
}

/// Tar writers append `/` to directory names; stored names are compared without it.
fn normalize_name(raw: &str) -> String {
    let trimmed = raw.trim_end_matches('/');
    if trimmed.is_empty() && !raw.is_empty() { "/".to_string() } else { trimmed.to_string() }
}

#[derive(Debug, Clone)]
pub struct ArchiveIndex {
    path: PathBuf,
}

impl ArchiveIndex {
    /// Binds the index to `path` after checking that the archive can be scanned.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let index = ArchiveIndex { path: path.as_ref().to_path_buf() };
        let n = index.entries()?.len();
        debug!("opened archive {} ({} entries)", index.path.display(), n);
        Ok(index)
    }

    pub fn path(&self) -> &Path { &self.path }

    fn io(&self, source: std::io::Error) -> ArchiveError {
        ArchiveError::Io { path: self.path.clone(), source }
    }

    fn archive(&self) -> Result<Archive<File>> {
        let file = File::open(&self.path).map_err(|e| self.io(e))?;
        Ok(Archive::new(file))
    }

    /// All entries in the archive's own enumeration order.
    pub fn entries(&self) -> Result<Vec<ArchiveEntry>> {
        let mut archive = self.archive()?;
        let mut out = Vec::new();
        for entry in archive.entries().map_err(|e| self.io(e))? {
            let entry = entry.map_err(|e| self.io(e))?;
            out.push(ArchiveEntry::from_entry(&entry));
        }
        trace!("scanned {} entries from {}", out.len(), self.path.display());
        Ok(out)
    }

    /// Every stored name that starts with `path` as a literal string prefix.
    ///
    /// This is not a child-of relation: `/home/user` also matches `/home/user2`.
    pub fn list_by_prefix(&self, path: &str) -> Result<Vec<String>> {
        Ok(self.entries()?.into_iter().filter(|e| e.name.starts_with(path)).map(|e| e.name).collect())
    }

    /// `path` itself plus entries exactly one component below it.
    pub fn list_children(&self, path: &str) -> Result<Vec<String>> {
        let base = path.trim_end_matches('/');
        let prefix = format!("{base}/");
        Ok(self
            .entries()?
            .into_iter()
            .filter(|e| {
                e.name == base
                    || e.name.strip_prefix(&prefix).map(|rest| !rest.is_empty() && !rest.contains('/')).unwrap_or(false)
            })
            .map(|e| e.name)
            .collect())
    }

    pub fn is_directory(&self, path: &str) -> Result<bool> {
        Ok(self.entries()?.iter().any(|e| e.is_dir && e.name == path))
    }

    /// Up to `max_lines` leading lines of the file entry named exactly `path`.
    ///
    /// Lines are whitespace-trimmed; reading stops at the first blank line or
    /// at end of stream. When a name was appended more than once, the last
    /// copy is the current one.
    pub fn read_lines(&self, path: &str, max_lines: usize) -> Result<Vec<String>> {
        let entries = self.entries()?;
        let Some((idx, meta)) = entries.iter().enumerate().rev().find(|(_, e)| e.name == path) else {
            return Err(ArchiveError::NotFound(path.to_string()));
        };
        if meta.is_dir { return Err(ArchiveError::IsDirectory(path.to_string())); }
        let mut archive = self.archive()?;
        let entry = match archive.entries().map_err(|e| self.io(e))?.nth(idx) {
            Some(entry) => entry.map_err(|e| self.io(e))?,
            None => return Err(ArchiveError::NotFound(path.to_string())),
        };
        self.take_lines(path, entry, max_lines)
    }

    fn take_lines<R: Read>(&self, path: &str, entry: R, max_lines: usize) -> Result<Vec<String>> {
        let mut reader = BufReader::new(entry);
        let mut lines = Vec::new();
        let mut buf: Vec<u8> = Vec::new();
        while lines.len() < max_lines {
            buf.clear();
            let n = reader.read_until(b'\n', &mut buf).map_err(|e| self.io(e))?;
            if n == 0 { break; }
            let text = std::str::from_utf8(&buf).map_err(|_| ArchiveError::Decode(path.to_string()))?;
            let line = text.trim();
            if line.is_empty() { break; }
            lines.push(line.to_string());
        }
        trace!("read {} line(s) from {}", lines.len(), path);
        Ok(lines)
    }
}
