use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::model::task::TreeSnapshot;

/// The page whose existence the store guarantees.
pub const DEFAULT_PAGE: &str = "default";

/// Error type for page storage
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("could not write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed backup: {0}")]
    MalformedImport(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Bulk backup of every page: the ordered page list plus each page's raw
/// stored blob, keyed by page name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Backup {
    pub pages: Vec<String>,
    pub data: IndexMap<String, String>,
}

impl Backup {
    /// Parse a backup payload. Anything structurally off (missing `pages` or
    /// `data`, wrong types) is a malformed import.
    pub fn from_json(text: &str) -> Result<Backup, StoreError> {
        serde_json::from_str(text).map_err(|e| StoreError::MalformedImport(e.to_string()))
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// The single pre-delete snapshot (written to .undo.json). Tagged with the
/// page it was captured from; undo never crosses pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UndoSlot {
    pub page: String,
    pub tree: TreeSnapshot,
}

/// Key-value storage for page trees: one JSON blob per page under `pages/`,
/// plus `pages.json` holding the ordered page list.
#[derive(Debug)]
pub struct PageStore {
    dir: PathBuf,
}

impl PageStore {
    /// Open (creating if needed) a store in the given directory.
    pub fn open(dir: &Path) -> Result<PageStore, StoreError> {
        fs::create_dir_all(dir.join("pages"))?;
        Ok(PageStore {
            dir: dir.to_path_buf(),
        })
    }

    /// Default data directory, respecting XDG_DATA_HOME.
    pub fn default_dir() -> PathBuf {
        let data_dir = std::env::var("XDG_DATA_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| dirs_home().join(".local").join("share"));
        data_dir.join("twig")
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn pages_path(&self) -> PathBuf {
        self.dir.join("pages.json")
    }

    fn page_path(&self, name: &str) -> PathBuf {
        self.dir.join("pages").join(format!("{}.json", name))
    }

    // -----------------------------------------------------------------------
    // Page list
    // -----------------------------------------------------------------------

    /// Read the ordered page list. A missing file yields `["default"]`; a
    /// corrupted one is backed up as `.bak` and replaced by the default.
    /// The default page is guaranteed to be present in the result.
    pub fn load_pages(&self) -> Vec<String> {
        let mut pages = match read_json_or_default::<Vec<String>>(&self.pages_path()) {
            Some(pages) => pages,
            None => vec![DEFAULT_PAGE.to_string()],
        };
        if !pages.iter().any(|p| p == DEFAULT_PAGE) {
            pages.insert(0, DEFAULT_PAGE.to_string());
        }
        pages
    }

    pub fn save_pages(&self, pages: &[String]) -> Result<(), StoreError> {
        self.write_atomic(&self.pages_path(), &to_pretty_json(pages))
    }

    // -----------------------------------------------------------------------
    // Page trees
    // -----------------------------------------------------------------------

    /// Load one page's tree. Missing blob → empty tree; corrupted blob →
    /// backed up as `.bak`, empty tree.
    pub fn load_tree(&self, page: &str) -> TreeSnapshot {
        read_json_or_default::<TreeSnapshot>(&self.page_path(page)).unwrap_or_default()
    }

    pub fn save_tree(&self, page: &str, tree: &TreeSnapshot) -> Result<(), StoreError> {
        self.write_atomic(&self.page_path(page), &to_pretty_json(tree))
    }

    /// The raw stored blob for a page, as persisted (`[]` when absent).
    pub fn raw_tree(&self, page: &str) -> String {
        fs::read_to_string(self.page_path(page)).unwrap_or_else(|_| "[]".to_string())
    }

    pub fn remove_tree(&self, page: &str) {
        let _ = fs::remove_file(self.page_path(page));
    }

    /// Transfer a page's blob to a new name, removing the old one.
    pub fn rename_tree(&self, old: &str, new: &str) -> Result<(), StoreError> {
        let blob = self.raw_tree(old);
        self.write_atomic(&self.page_path(new), &blob)?;
        self.remove_tree(old);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Undo slot
    // -----------------------------------------------------------------------

    /// Read the persisted undo slot, if one exists and parses.
    pub fn load_undo(&self) -> Option<UndoSlot> {
        let content = fs::read_to_string(self.dir.join(".undo.json")).ok()?;
        serde_json::from_str(&content).ok()
    }

    pub fn save_undo(&self, slot: &UndoSlot) -> Result<(), StoreError> {
        self.write_atomic(&self.dir.join(".undo.json"), &to_pretty_json(slot))
    }

    pub fn clear_undo(&self) {
        let _ = fs::remove_file(self.dir.join(".undo.json"));
    }

    // -----------------------------------------------------------------------
    // Bulk backup
    // -----------------------------------------------------------------------

    /// Collect every page's raw blob into a backup.
    pub fn export_all(&self) -> Backup {
        let pages = self.load_pages();
        let mut data = IndexMap::new();
        for page in &pages {
            data.insert(page.clone(), self.raw_tree(page));
        }
        Backup { pages, data }
    }

    /// Replace the whole store with a backup's contents. Every blob is parsed
    /// up front; nothing is written unless the entire payload is valid, so a
    /// failed import leaves the prior state untouched. Pages listed without a
    /// data entry come in empty.
    pub fn import_all(&self, backup: &Backup) -> Result<(), StoreError> {
        let mut blobs: Vec<(String, String)> = Vec::new();
        for page in &backup.pages {
            // Page names become file names
            if page.trim().is_empty() || page.contains('/') || page.contains('\\') {
                return Err(StoreError::MalformedImport(format!(
                    "invalid page name \"{}\"",
                    page
                )));
            }
            let raw = backup
                .data
                .get(page)
                .cloned()
                .unwrap_or_else(|| "[]".to_string());
            if let Err(e) = serde_json::from_str::<TreeSnapshot>(&raw) {
                return Err(StoreError::MalformedImport(format!(
                    "page \"{}\": {}",
                    page, e
                )));
            }
            blobs.push((page.clone(), raw));
        }

        // Drop blobs of pages that will no longer exist
        for page in self.load_pages() {
            if !backup.pages.contains(&page) {
                self.remove_tree(&page);
            }
        }

        let mut pages = backup.pages.clone();
        if !pages.iter().any(|p| p == DEFAULT_PAGE) {
            pages.insert(0, DEFAULT_PAGE.to_string());
        }
        self.save_pages(&pages)?;
        for (page, raw) in &blobs {
            self.write_atomic(&self.page_path(page), raw)?;
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    /// Write via a temp file in the same directory, then rename into place.
    fn write_atomic(&self, path: &Path, content: &str) -> Result<(), StoreError> {
        let map_err = |source: std::io::Error| StoreError::Write {
            path: path.to_path_buf(),
            source,
        };
        let tmp = NamedTempFile::new_in(&self.dir).map_err(map_err)?;
        fs::write(tmp.path(), content).map_err(map_err)?;
        tmp.persist(path).map_err(|e| map_err(e.error))?;
        Ok(())
    }
}

fn dirs_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/"))
}

fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "[]".to_string())
}

/// Read and parse a JSON file. Missing → None. Corrupted → back up as `.bak`,
/// warn, and return None so the caller falls back to its default.
fn read_json_or_default<T: serde::de::DeserializeOwned>(path: &Path) -> Option<T> {
    let content = fs::read_to_string(path).ok()?;
    match serde_json::from_str(&content) {
        Ok(value) => Some(value),
        Err(e) => {
            let bak = path.with_extension("json.bak");
            let _ = fs::copy(path, &bak);
            eprintln!(
                "warning: could not parse {} (backed up as {}): {}",
                path.display(),
                bak.display(),
                e
            );
            None
        }
    }
}
