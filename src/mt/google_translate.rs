//! Google Translate backend using the public `translate_a/single` endpoint
//!
//! This is the endpoint behind the browser widget (`client=gtx`); it needs no API key.
//! The answer is a nested JSON array whose first element lists one segment per sentence:
//!
//! ```text
//! [[["Merhaba. ","Hello. ",null,null,10],["Nasılsın?","How are you?",null,null,10]],null,"en",...]
//! ```

use async_trait::async_trait;
use reqwest::Url;
use serde_json::Value;
use tracing::debug;

use crate::error::{PoError, PoResult};
use crate::mt::translator::{Translator, TranslatorConfig, read_body};

const BASE_URL: &str = "https://translate.googleapis.com/translate_a/single";

/// Fixed query parameters of the widget client
const CLIENT_PARAMS: [(&str, &str); 4] =
    [("client", "gtx"), ("dt", "t"), ("ie", "UTF-8"), ("oe", "UTF-8")];

/// Google Translate translator
#[derive(Debug, Clone)]
pub struct GoogleTranslateProvider {
    config: TranslatorConfig,
    client: reqwest::Client,
    base_url: String,
}

impl GoogleTranslateProvider {
    pub fn new(config: TranslatorConfig) -> PoResult<Self> {
        config.validate()?;
        let client = config.client_builder()?.build()?;

        Ok(Self {
            config,
            client,
            base_url: BASE_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn request_url(&self, text: &str) -> PoResult<Url> {
        let mut params: Vec<(&str, &str)> = CLIENT_PARAMS.to_vec();
        params.extend([
            ("q", text),
            ("sl", self.config.source_lang.as_str()),
            ("tl", self.config.target_lang.as_str()),
        ]);

        Url::parse_with_params(&self.base_url, &params)
            .map_err(|e| PoError::Config(format!("Invalid base URL '{}': {}", self.base_url, e)))
    }
}

/// Join every sentence segment of the response
fn parse_response(body: &str) -> PoResult<String> {
    let json: Value = serde_json::from_str(body).map_err(|e| {
        PoError::InvalidResponse(format!("Failed to parse Google response: {}", e))
    })?;

    let segments = json[0].as_array().ok_or_else(|| {
        PoError::InvalidResponse("Invalid Google response: missing segment list".to_string())
    })?;

    Ok(segments
        .iter()
        .filter_map(|segment| segment[0].as_str())
        .collect())
}

#[async_trait]
impl Translator for GoogleTranslateProvider {
    async fn translate(&self, text: &str) -> PoResult<String> {
        if text.is_empty() {
            return Ok(String::new());
        }

        let url = self.request_url(text)?;
        debug!(chars = text.chars().count(), "sending Google Translate request");

        let response = self.client.get(url).send().await?;
        let body = read_body(response).await?;

        parse_response(&body)
    }

    fn provider_name(&self) -> &str {
        "Google Translate"
    }
}
