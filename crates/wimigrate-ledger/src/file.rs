//! File-backed implementation of [`LedgerBackend`].

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::backend::{LedgerBackend, LedgerEntries};
use crate::error::{self, LedgerError};
use crate::format;

/// Ledger stored as a pipe-delimited text file.
///
/// Every persist rewrites the whole file: the new content goes to a sibling
/// `.tmp` file which is then renamed over the ledger, so a crash mid-write
/// leaves the previous complete ledger in place.
#[derive(Debug, Clone)]
pub struct FileLedger {
    path: PathBuf,
}

impl FileLedger {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Ledger for a project pair under `dir`, named
    /// `ID_map_<source>_to_<destination>.txt`.
    #[must_use]
    pub fn for_projects(dir: &Path, source_project: &str, destination_project: &str) -> Self {
        Self::new(dir.join(file_name(source_project, destination_project)))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

/// File name of the ledger for a project pair.
#[must_use]
pub fn file_name(source_project: &str, destination_project: &str) -> String {
    format!("ID_map_{source_project}_to_{destination_project}.txt")
}

impl LedgerBackend for FileLedger {
    fn load(&self) -> error::Result<LedgerEntries> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => Ok(format::parse(&text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(LedgerEntries::new()),
            Err(e) => Err(LedgerError::io(&self.path, e)),
        }
    }

    fn persist(&self, entries: &LedgerEntries) -> error::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| LedgerError::io(parent, e))?;
        }
        let tmp = self.temp_path();
        std::fs::write(&tmp, format::render(entries)).map_err(|e| LedgerError::io(&tmp, e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| LedgerError::io(&self.path, e))
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
