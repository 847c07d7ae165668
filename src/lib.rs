//! Machine translation for gettext PO catalogs
//!
//! Markup (Sphinx/reStructuredText by default) is masked with placeholder tokens before a
//! string is sent to a translation backend and restored afterwards, so roles, literals and
//! links survive the round trip.
//!
//! ```ignore
//! use po_translator::{Backend, PoFileTranslator, TranslatorConfig};
//!
//! let config = TranslatorConfig::new("en", "tr");
//! let mut driver = PoFileTranslator::open("locale/tr/LC_MESSAGES/index.po", Backend::Google, &config)?;
//! let report = driver.translate(true, true).await?;
//! driver.save()?;
//! ```

pub mod catalog;
pub mod driver;
pub mod error;
pub mod guard;
pub mod mt;
pub mod patterns;

pub use catalog::{CatalogEntry, PoCatalog};
pub use driver::{PoFileTranslator, TranslationReport, should_translate};
pub use error::{PoError, PoResult};
pub use guard::{PlaceholderMap, protect, restore};
pub use mt::{Backend, Translator, TranslatorConfig, build_translator};
pub use patterns::{Pattern, PatternSet};
