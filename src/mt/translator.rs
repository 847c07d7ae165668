//! Translator trait and the configuration shared by every backend
//!
//! A [`Translator`] turns one string into another. Language pair, proxy and timeout are fixed
//! when the backend is built from a [`TranslatorConfig`], so the driver only ever hands over
//! text.
//!
//! # Example
//!
//! ```ignore
//! use po_translator::mt::{Backend, TranslatorConfig, build_translator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = TranslatorConfig::new("en", "tr");
//!     let translator = build_translator(Backend::Google, &config)?;
//!     println!("{}", translator.translate("Hello, world!").await?);
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::error::{PoError, PoResult};

/// A text-in, text-out translation capability
///
/// Implementations must not retry on their own; rate limiting surfaces as
/// [`PoError::RateLimited`] and any other failed request as [`PoError::Backend`].
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate a single string
    async fn translate(&self, text: &str) -> PoResult<String>;

    /// Human readable name, used in logs
    fn provider_name(&self) -> &str;
}

/// Settings every backend is built from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatorConfig {
    /// Source language code, `auto` lets the backend detect it
    pub source_lang: String,
    pub target_lang: String,
    /// Proxy URL applied to all requests (`http://`, `https://` or `socks5://`)
    pub proxy: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            source_lang: "auto".to_string(),
            target_lang: "en".to_string(),
            proxy: None,
            timeout: Duration::from_secs(30),
        }
    }
}

impl TranslatorConfig {
    /// Create a config for one language pair, with no proxy and the default timeout
    ///
    /// # Arguments
    ///
    /// * `source_lang` - Source language code, or `auto`
    /// * `target_lang` - Target language code
    ///
    /// # Example
    ///
    /// ```ignore
    /// let config = TranslatorConfig::new("en", "tr");
    /// ```
    pub fn new(source_lang: impl Into<String>, target_lang: impl Into<String>) -> Self {
        Self {
            source_lang: source_lang.into(),
            target_lang: target_lang.into(),
            ..Self::default()
        }
    }

    /// Route every request through `proxy`
    ///
    /// The URL is only checked when a backend builds its HTTP client; an invalid one is
    /// reported as [`PoError::Config`] then.
    ///
    /// # Arguments
    ///
    /// * `proxy` - Proxy URL (`http://`, `https://` or `socks5://`)
    ///
    /// # Example
    ///
    /// ```ignore
    /// let config = TranslatorConfig::new("en", "tr").with_proxy("http://127.0.0.1:8080");
    /// ```
    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Per-request timeout, 30 seconds unless set
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Check both language codes with [`validate_locale`]
    pub fn validate(&self) -> PoResult<()> {
        validate_locale(&self.source_lang)?;
        validate_locale(&self.target_lang)
    }

    /// An HTTP client builder with timeout and proxy already applied
    pub(crate) fn client_builder(&self) -> PoResult<reqwest::ClientBuilder> {
        let mut builder = reqwest::Client::builder().timeout(self.timeout);

        if let Some(proxy) = &self.proxy {
            let proxy = reqwest::Proxy::all(proxy.as_str())
                .map_err(|e| PoError::Config(format!("Invalid proxy '{}': {}", proxy, e)))?;
            builder = builder.proxy(proxy);
        }

        Ok(builder)
    }
}

/// Validate that a locale code is in acceptable format
///
/// Only ASCII alphanumerics, hyphens and underscores are accepted (`en`, `pt-BR`, `zh_CN`,
/// `auto`).
pub fn validate_locale(locale: &str) -> PoResult<()> {
    if locale.is_empty() {
        return Err(PoError::InvalidLocale("Locale code is empty".to_string()));
    }

    if !locale
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(PoError::InvalidLocale(format!(
            "Invalid characters in locale code: {}",
            locale
        )));
    }

    Ok(())
}

/// Map an HTTP status onto the error kinds callers can tell apart
pub(crate) fn classify_status(status: StatusCode, body: &str) -> PoResult<()> {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(PoError::RateLimited);
    }
    if !status.is_success() {
        return Err(PoError::Backend {
            status: status.as_u16(),
            message: body.to_string(),
        });
    }
    Ok(())
}

/// Read a response body, failing on anything but success
pub(crate) async fn read_body(response: reqwest::Response) -> PoResult<String> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.text().await?);
    }

    let body = response.text().await.unwrap_or_default();
    classify_status(status, &body)?;
    Ok(body)
}
