//! Translation backends
//!
//! Every backend implements [`Translator`]: one string in, one string out. Backends are picked
//! by name through [`Backend`] and built with [`build_translator`]; the catalog driver never
//! knows which one it talks to.
//!
//! # Example
//!
//! ```ignore
//! use po_translator::mt::{Backend, TranslatorConfig, build_translator};
//!
//! let backend: Backend = "google".parse()?;
//! let translator = build_translator(backend, &TranslatorConfig::new("en", "tr"))?;
//! let text = translator.translate("Hello").await?;
//! ```
pub mod deepl;
pub mod google_translate;
pub mod mock;
pub mod translator;


use std::fmt;
use std::str::FromStr;

pub use deepl::DeepLTranslator;
pub use google_translate::GoogleTranslateProvider;
pub use mock::{MockMode, MockTranslator};
pub use translator::{Translator, TranslatorConfig, validate_locale};

use crate::error::{PoError, PoResult};

/// Built-in translation backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Backend {
    /// DeepL through its mobile app protocol
    #[default]
    #[value(name = "deepl")]
    DeepL,
    /// Google Translate public endpoint
    #[value(name = "google")]
    Google,
}

impl Backend {
    pub fn name(&self) -> &'static str {
        match self {
            Backend::DeepL => "deepl",
            Backend::Google => "google",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Backend {
    type Err = PoError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.to_lowercase().as_str() {
            "deepl" => Ok(Backend::DeepL),
            "google" => Ok(Backend::Google),
            _ => Err(PoError::UnknownBackend(name.to_string())),
        }
    }
}

/// Build the translator for `backend`
pub fn build_translator(
    backend: Backend,
    config: &TranslatorConfig,
) -> PoResult<Box<dyn Translator>> {
    Ok(match backend {
        Backend::DeepL => Box::new(DeepLTranslator::new(config.clone())?),
        Backend::Google => Box::new(GoogleTranslateProvider::new(config.clone())?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_from_name() {
        assert_eq!("deepl".parse::<Backend>().unwrap(), Backend::DeepL);
        assert_eq!("DeepL".parse::<Backend>().unwrap(), Backend::DeepL);
        assert_eq!("GOOGLE".parse::<Backend>().unwrap(), Backend::Google);
    }

    #[test]
    fn test_unknown_backend() {
        match "bing".parse::<Backend>() {
            Err(PoError::UnknownBackend(name)) => assert_eq!(name, "bing"),
            _ => panic!("Expected UnknownBackend"),
        }
    }

    #[test]
    fn test_backend_display_roundtrip() {
        for backend in [Backend::DeepL, Backend::Google] {
            assert_eq!(backend.to_string().parse::<Backend>().unwrap(), backend);
        }
        assert_eq!(Backend::default(), Backend::DeepL);
    }

    #[test]
    fn test_build_translator() {
        let config = TranslatorConfig::new("en", "tr");
        let deepl = build_translator(Backend::DeepL, &config).unwrap();
        assert_eq!(deepl.provider_name(), "DeepL");
        let google = build_translator(Backend::Google, &config).unwrap();
        assert_eq!(google.provider_name(), "Google Translate");
    }

    #[test]
    fn test_build_translator_validates_config() {
        let config = TranslatorConfig::new("en", "");
        assert!(build_translator(Backend::Google, &config).is_err());
    }
}
