//! Catalog translation driver
//!
//! Walks a [`PoCatalog`] in file order, decides per entry whether it needs a (new) translation,
//! and runs guard → translator → guard for the ones that do. The first failure stops the pass;
//! entries already written stay written in memory, and nothing reaches disk until
//! [`PoFileTranslator::save`] is called.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::catalog::PoCatalog;
use crate::error::{PoError, PoResult};
use crate::guard::{protect, restore};
use crate::mt::{Backend, Translator, TranslatorConfig, build_translator};
use crate::patterns::PatternSet;

/// Entry selection policy
///
/// Everything is translated unless `skip_translated` is set; then only untranslated entries
/// are, plus translated fuzzy ones when `retranslate_fuzzy` is set too.
pub fn should_translate(
    translated: bool,
    fuzzy: bool,
    skip_translated: bool,
    retranslate_fuzzy: bool,
) -> bool {
    !skip_translated || !translated || (retranslate_fuzzy && fuzzy)
}

/// What a translation pass did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TranslationReport {
    pub translated: usize,
    /// Left alone by the selection policy
    pub skipped: usize,
    /// Selected, but plural entries are not machine translated
    pub plural_skipped: usize,
}

/// Translates the entries of one PO catalog
pub struct PoFileTranslator {
    catalog: PoCatalog,
    patterns: PatternSet,
    translator: Arc<dyn Translator>,
}

impl PoFileTranslator {
    pub fn new(catalog: PoCatalog, patterns: PatternSet, translator: Arc<dyn Translator>) -> Self {
        Self {
            catalog,
            patterns,
            translator,
        }
    }

    /// Load `path` and pair it with a built-in backend and the default Sphinx patterns
    pub fn open(
        path: impl AsRef<Path>,
        backend: Backend,
        config: &TranslatorConfig,
    ) -> PoResult<Self> {
        let catalog = PoCatalog::load(path)?;
        let translator = Arc::from(build_translator(backend, config)?);
        Ok(Self::new(catalog, PatternSet::sphinx(), translator))
    }

    pub fn catalog(&self) -> &PoCatalog {
        &self.catalog
    }

    pub fn into_catalog(self) -> PoCatalog {
        self.catalog
    }

    pub fn patterns(&self) -> &PatternSet {
        &self.patterns
    }

    /// Translate one string with its markup protected
    pub async fn translate_text(&self, source: &str) -> PoResult<String> {
        let (placeholders, masked) = protect(source, &self.patterns);
        let translated = self.translator.translate(&masked).await?;
        Ok(restore(placeholders.as_ref(), &translated))
    }

    /// Translate entry `index` unconditionally and clear its fuzzy flag
    ///
    /// On failure the entry is left as it was.
    pub async fn translate_entry(&mut self, index: usize) -> PoResult<()> {
        let entry = self
            .catalog
            .entry(index)
            .ok_or_else(|| PoError::Entry(format!("No entry at index {}", index)))?;

        let translated = self.translate_text(&entry.source).await?;
        debug!(index, source = %entry.source, target = %translated, "translated entry");
        self.catalog.set_translation(index, translated)
    }

    /// Run one pass over the whole catalog
    pub async fn translate(
        &mut self,
        skip_translated: bool,
        retranslate_fuzzy: bool,
    ) -> PoResult<TranslationReport> {
        let mut report = TranslationReport::default();

        info!(
            path = %self.catalog.path().display(),
            provider = self.translator.provider_name(),
            entries = self.catalog.len(),
            "translating catalog"
        );

        for entry in self.catalog.entries() {
            if !should_translate(
                entry.is_translated(),
                entry.fuzzy,
                skip_translated,
                retranslate_fuzzy,
            ) {
                report.skipped += 1;
                continue;
            }

            if entry.plural {
                warn!(index = entry.index, source = %entry.source, "skipping plural entry");
                report.plural_skipped += 1;
                continue;
            }

            self.translate_entry(entry.index).await?;
            report.translated += 1;
        }

        info!(
            translated = report.translated,
            skipped = report.skipped,
            plural_skipped = report.plural_skipped,
            "catalog pass finished"
        );
        Ok(report)
    }

    /// Write the catalog back to its file
    pub fn save(&self) -> PoResult<()> {
        self.catalog.save()
    }
}
