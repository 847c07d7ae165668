//! Mock translator for testing
//!
//! A deterministic, network-free [`Translator`] for exercising the guard and the driver
//! without a backend. Placeholder tokens pass through every mode unchanged.
//!
//! # Example
//!
//! ```ignore
//! use po_translator::mt::{MockMode, MockTranslator, Translator};
//!
//! #[tokio::test]
//! async fn test_translation() {
//!     let mock = MockTranslator::new(MockMode::Suffix).with_target_lang("fr");
//!     assert_eq!(mock.translate("hello").await.unwrap(), "hello_fr");
//! }
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::error::{PoError, PoResult};
use crate::mt::translator::Translator;

/// Mock translation modes for testing different scenarios
#[derive(Debug, Clone)]
pub enum MockMode {
    /// Append the target language: "hello" → "hello_fr"
    Suffix,

    /// Upper-case everything: "hello" → "HELLO"
    Uppercase,

    /// Predefined source → translation pairs, falling back to [`MockMode::Suffix`]
    Mappings(HashMap<String, String>),

    /// Reverse the order of whitespace separated words
    Reorder,

    /// Fail every call with a backend error carrying this message
    Error(String),

    /// Fail every call as throttled
    RateLimited,

    /// Return input unchanged
    NoOp,
}

/// Mock translator that simulates various translation scenarios
#[derive(Debug)]
pub struct MockTranslator {
    mode: MockMode,
    target_lang: String,
    /// Fail with a backend error when the input contains this text
    fail_on: Option<String>,
    calls: AtomicUsize,
}

impl MockTranslator {
    /// Create a new MockTranslator with the given mode
    ///
    /// The target language used by [`MockMode::Suffix`] defaults to `en`.
    ///
    /// # Arguments
    ///
    /// * `mode` - The translation mode to use
    ///
    /// # Example
    ///
    /// ```ignore
    /// let mock = MockTranslator::new(MockMode::Uppercase);
    /// assert_eq!(mock.translate("click XASDF0100").await?, "CLICK XASDF0100");
    /// ```
    pub fn new(mode: MockMode) -> Self {
        Self {
            mode,
            target_lang: "en".to_string(),
            fail_on: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Set the language code appended by [`MockMode::Suffix`] and its fallbacks
    ///
    /// # Arguments
    ///
    /// * `target_lang` - Language code, e.g. `"tr"`
    ///
    /// # Example
    ///
    /// ```ignore
    /// let mock = MockTranslator::new(MockMode::Suffix).with_target_lang("tr");
    /// // "Hello" → "Hello_tr"
    /// ```
    pub fn with_target_lang(mut self, target_lang: impl Into<String>) -> Self {
        self.target_lang = target_lang.into();
        self
    }

    /// Make calls whose input contains `needle` fail with [`PoError::Backend`]
    ///
    /// Every other call is answered according to the mode, so a catalog pass can be made to
    /// fail on one chosen entry.
    ///
    /// # Arguments
    ///
    /// * `needle` - Substring that triggers the failure
    ///
    /// # Example
    ///
    /// ```ignore
    /// let mock = MockTranslator::new(MockMode::NoOp).failing_on("third");
    /// assert!(mock.translate("the third entry").await.is_err());
    /// ```
    pub fn failing_on(mut self, needle: impl Into<String>) -> Self {
        self.fail_on = Some(needle.into());
        self
    }

    /// Number of `translate` calls seen so far, failed ones included
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn apply_translation(&self, text: &str) -> PoResult<String> {
        if let Some(needle) = self.fail_on.as_deref().filter(|n| text.contains(*n)) {
            return Err(PoError::Backend {
                status: 500,
                message: format!("mock failure on '{}'", needle),
            });
        }

        match &self.mode {
            MockMode::Suffix => Ok(format!("{}_{}", text, self.target_lang)),
            MockMode::Uppercase => Ok(text.to_uppercase()),
            MockMode::Mappings(map) => Ok(map
                .get(text)
                .cloned()
                .unwrap_or_else(|| format!("{}_{}", text, self.target_lang))),
            MockMode::Reorder => Ok(text.split_whitespace().rev().collect::<Vec<_>>().join(" ")),
            MockMode::Error(msg) => Err(PoError::Backend {
                status: 500,
                message: msg.clone(),
            }),
            MockMode::RateLimited => Err(PoError::RateLimited),
            MockMode::NoOp => Ok(text.to_string()),
        }
    }
}

#[async_trait]
impl Translator for MockTranslator {
    async fn translate(&self, text: &str) -> PoResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.apply_translation(text)
    }

    fn provider_name(&self) -> &str {
        "Mock Translator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_suffix() {
        let mock = MockTranslator::new(MockMode::Suffix).with_target_lang("fr");
        assert_eq!(mock.translate("hello").await.unwrap(), "hello_fr");
    }

    #[tokio::test]
    async fn test_uppercase_keeps_placeholders() {
        let mock = MockTranslator::new(MockMode::Uppercase);
        let result = mock.translate("click XASDF0100 now").await.unwrap();
        assert_eq!(result, "CLICK XASDF0100 NOW");
    }

    #[tokio::test]
    async fn test_mapping_and_fallback() {
        let mut map = HashMap::new();
        map.insert("hello".to_string(), "merhaba".to_string());
        let mock = MockTranslator::new(MockMode::Mappings(map)).with_target_lang("tr");

        assert_eq!(mock.translate("hello").await.unwrap(), "merhaba");
        assert_eq!(mock.translate("unknown").await.unwrap(), "unknown_tr");
    }

    #[tokio::test]
    async fn test_reorder() {
        let mock = MockTranslator::new(MockMode::Reorder);
        let result = mock.translate("XASDF0000 sent XASDF0100").await.unwrap();
        assert_eq!(result, "XASDF0100 sent XASDF0000");
    }

    #[tokio::test]
    async fn test_error_modes() {
        let mock = MockTranslator::new(MockMode::Error("API unavailable".to_string()));
        match mock.translate("hello").await {
            Err(PoError::Backend { message, .. }) => assert_eq!(message, "API unavailable"),
            _ => panic!("Expected Backend error"),
        }

        let mock = MockTranslator::new(MockMode::RateLimited);
        assert!(matches!(
            mock.translate("hello").await,
            Err(PoError::RateLimited)
        ));
    }

    #[tokio::test]
    async fn test_failing_on() {
        let mock = MockTranslator::new(MockMode::NoOp).failing_on("boom");
        assert_eq!(mock.translate("fine").await.unwrap(), "fine");
        assert!(mock.translate("a boom b").await.is_err());
        assert_eq!(mock.calls(), 2);
    }

    #[tokio::test]
    async fn test_noop_and_call_count() {
        let mock = MockTranslator::new(MockMode::NoOp);
        assert_eq!(mock.calls(), 0);
        assert_eq!(mock.translate("Hello world").await.unwrap(), "Hello world");
        assert_eq!(mock.calls(), 1);
    }

    #[test]
    fn test_provider_name() {
        let mock = MockTranslator::new(MockMode::Suffix);
        assert_eq!(mock.provider_name(), "Mock Translator");
    }
}
