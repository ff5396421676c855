//! Bouquet directory on the receiver
//!
//! One directory holds `bouquets.tv` and every bouquet file. It is the only
//! source of truth between operations; nothing here caches or locks it, so
//! another process editing the same files mid-session is not detected.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::bouquet_index::{self, BouquetFilter, INDEX_FILENAME};
use crate::bouquet_parser::{fallback_name, has_name_header, scan_name};
use crate::editor::EditSession;
use crate::error::{BouquetError, Result};
use crate::models::BouquetIndexEntry;

const DELETED_SUFFIX: &str = ".del";

/// A bare file name that stays inside the bouquet directory when joined
pub fn is_plain_filename(filename: &str) -> bool {
    !filename.is_empty()
        && !filename.contains(['/', '\\'])
        && !filename.contains("..")
        && Path::new(filename).is_relative()
}

pub struct BouquetStore {
    root: PathBuf,
    filter: BouquetFilter,
}

impl BouquetStore {
    pub fn new(root: impl Into<PathBuf>, filter: BouquetFilter) -> Self {
        Self {
            root: root.into(),
            filter,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn index_path(&self) -> PathBuf {
        self.root.join(INDEX_FILENAME)
    }

    pub fn bouquet_path(&self, filename: &str) -> PathBuf {
        self.root.join(filename)
    }

    /// File names in the directory, sorted
    fn file_names(&self) -> Result<Vec<String>> {
        let entries = fs::read_dir(&self.root).map_err(|e| BouquetError::filesystem(&self.root, e))?;
        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        Ok(names)
    }

    /// IPTV bouquet files present on disk
    pub fn candidates(&self) -> Result<Vec<String>> {
        Ok(self
            .file_names()?
            .into_iter()
            .filter(|name| self.filter.matches(name))
            .collect())
    }

    /// Filenames registered in `bouquets.tv`, in order. A missing index is empty.
    pub fn index_order(&self) -> Result<Vec<String>> {
        Ok(bouquet_index::parse_index_order(&self.read_index()?))
    }

    fn read_index(&self) -> Result<String> {
        let path = self.index_path();
        match fs::read_to_string(&path) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(BouquetError::filesystem(&path, e)),
        }
    }

    /// Title of an installed bouquet; unreadable files get the filename title
    pub fn display_name(&self, filename: &str) -> String {
        let path = self.bouquet_path(filename);
        match fs::read_to_string(&path) {
            Ok(content) => scan_name(&content).unwrap_or_else(|| fallback_name(filename)),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "bouquet unreadable, using filename");
                fallback_name(filename)
            }
        }
    }

    /// Installed IPTV bouquets in receiver order, unindexed ones last
    pub fn list_bouquets(&self) -> Result<Vec<BouquetIndexEntry>> {
        let order = self.index_order()?;
        let candidates = self.candidates()?;
        let entries = bouquet_index::merge_index(&order, &candidates, |f| self.display_name(f));
        debug!(count = entries.len(), "listed installed bouquets");
        Ok(entries)
    }

    /// Write a downloaded bouquet and register it in the index
    pub fn install(&self, filename: &str, content: &str) -> Result<()> {
        if !is_plain_filename(filename) || !has_name_header(content) {
            return Err(BouquetError::MalformedBouquet {
                filename: filename.to_string(),
            });
        }

        let path = self.bouquet_path(filename);
        fs::write(&path, content).map_err(|e| BouquetError::filesystem(&path, e))?;
        info!(path = %path.display(), "installed bouquet");

        self.register(filename)
    }

    /// Append the registration line for `filename` unless already present
    pub fn register(&self, filename: &str) -> Result<()> {
        let index = self.read_index()?;
        if let Some(updated) = bouquet_index::register(&index, filename) {
            let path = self.index_path();
            fs::write(&path, updated).map_err(|e| BouquetError::filesystem(&path, e))?;
            info!(filename, "registered bouquet in index");
        }
        Ok(())
    }

    /// Delete bouquet files and every index line mentioning them.
    /// Stops at the first failure; files already removed stay removed.
    pub fn remove_bouquets(&self, filenames: &[String]) -> Result<usize> {
        let mut removed = 0;
        for filename in filenames {
            let path = self.bouquet_path(filename);
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    warn!(path = %path.display(), "bouquet already gone");
                }
                Err(e) => return Err(BouquetError::filesystem(&path, e)),
            }

            let index = self.read_index()?;
            let updated = bouquet_index::unregister(&index, filename);
            if updated != index {
                let index_path = self.index_path();
                fs::write(&index_path, updated)
                    .map_err(|e| BouquetError::filesystem(&index_path, e))?;
            }

            info!(filename = %filename, "removed bouquet");
            removed += 1;
        }
        Ok(removed)
    }

    /// Soft-deleted `.del` files left behind by the receiver
    pub fn deleted_files(&self) -> Result<Vec<String>> {
        Ok(self
            .file_names()?
            .into_iter()
            .filter(|name| name.ends_with(DELETED_SUFFIX))
            .collect())
    }

    /// Permanently remove `.del` files. Names without the suffix are refused.
    pub fn purge_deleted(&self, filenames: &[String]) -> Result<usize> {
        let mut purged = 0;
        for filename in filenames.iter().filter(|f| f.ends_with(DELETED_SUFFIX)) {
            let path = self.bouquet_path(filename);
            fs::remove_file(&path).map_err(|e| BouquetError::filesystem(&path, e))?;
            purged += 1;
        }
        info!(purged, "purged deleted bouquet files");
        Ok(purged)
    }

    pub fn open_session(&self, filename: &str) -> Result<EditSession> {
        EditSession::open(&self.bouquet_path(filename))
    }
}
