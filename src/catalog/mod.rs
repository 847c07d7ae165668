//! PO catalog access
//!
//! Load a catalog from disk, expose its entries in file order, write one translation back, and
//! save. Saving rewrites only the `msgstr` and `#,` lines of entries that were translated; the
//! header, comments, previous strings (`#|`) and obsolete entries (`#~`) are written back as
//! they were read.

mod po_file;

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{PoError, PoResult};

pub use po_file::SyntaxError;
use po_file::{PoDocument, PoMessage};

/// A snapshot of one catalog entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Position in the catalog, header and obsolete entries excluded
    pub index: usize,
    /// `msgctxt`
    pub context: Option<String>,
    /// `msgid`
    pub source: String,
    /// Singular `msgstr`; empty for plural entries
    pub target: String,
    pub fuzzy: bool,
    pub plural: bool,
    translated: bool,
}

impl CatalogEntry {
    fn from_message(index: usize, message: &PoMessage) -> Self {
        Self {
            index,
            context: message.msgctxt.clone(),
            source: message.msgid.clone(),
            target: message.msgstr.clone(),
            fuzzy: message.is_fuzzy(),
            plural: message.is_plural(),
            translated: message.is_translated(),
        }
    }

    /// Whether the entry already carries a translation
    pub fn is_translated(&self) -> bool {
        self.translated
    }
}

/// A PO file loaded in memory, bound to the path it came from
pub struct PoCatalog {
    path: PathBuf,
    document: PoDocument,
}

impl PoCatalog {
    pub fn load(path: impl AsRef<Path>) -> PoResult<Self> {
        let path = path.as_ref().to_path_buf();

        let text = std::fs::read_to_string(&path).map_err(|e| PoError::CatalogParse {
            path: path.clone(),
            message: e.to_string(),
        })?;
        let document = PoDocument::parse(&text).map_err(|e| PoError::CatalogParse {
            path: path.clone(),
            message: e.to_string(),
        })?;

        let catalog = Self { path, document };
        debug!(path = %catalog.path.display(), entries = catalog.len(), "loaded catalog");
        Ok(catalog)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.document.messages().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entries in file order
    pub fn entries(&self) -> Vec<CatalogEntry> {
        self.document
            .messages()
            .enumerate()
            .map(|(index, message)| CatalogEntry::from_message(index, message))
            .collect()
    }

    pub fn entry(&self, index: usize) -> Option<CatalogEntry> {
        self.document
            .messages()
            .nth(index)
            .map(|message| CatalogEntry::from_message(index, message))
    }

    /// Store `translation` as the `msgstr` of entry `index` and drop its fuzzy flag
    pub fn set_translation(&mut self, index: usize, translation: String) -> PoResult<()> {
        let message = self
            .document
            .message_mut(index)
            .ok_or_else(|| PoError::Entry(format!("No entry at index {}", index)))?;

        message
            .set_msgstr(translation)
            .map_err(|e| PoError::Entry(format!("Cannot set msgstr of entry {}: {}", index, e)))?;
        message.remove_flag("fuzzy");

        Ok(())
    }

    /// Write the catalog back to the file it was loaded from
    pub fn save(&self) -> PoResult<()> {
        self.save_as(&self.path)
    }

    pub fn save_as(&self, path: impl AsRef<Path>) -> PoResult<()> {
        let path = path.as_ref();
        std::fs::write(path, self.document.render()).map_err(|e| PoError::CatalogWrite {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        debug!(path = %path.display(), "saved catalog");
        Ok(())
    }
}

impl std::fmt::Debug for PoCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoCatalog")
            .field("path", &self.path)
            .field("entries", &self.len())
            .finish()
    }
}
