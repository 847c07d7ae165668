//! DeepL backend speaking the JSON-RPC protocol of the DeepL iOS app
//!
//! No API key is involved. The free endpoint throttles aggressively, so expect
//! [`PoError::RateLimited`] on large catalogs; pacing requests is up to the caller.

use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use rand::Rng;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PoError, PoResult};
use crate::mt::translator::{Translator, TranslatorConfig, read_body};

const API_URL: &str = "https://www2.deepl.com/jsonrpc";

/// Headers of the iOS client we mimic
const APP_HEADERS: [(&str, &str); 9] = [
    ("content-type", "application/json"),
    ("accept", "*/*"),
    ("x-app-os-name", "iOS"),
    ("x-app-os-version", "16.3.0"),
    ("accept-language", "en-US,en;q=0.9"),
    ("x-app-device", "iPhone13,2"),
    ("user-agent", "DeepL-iOS/2.9.1 iOS 16.3.0 (iPhone13,2)"),
    ("x-app-build", "510265"),
    ("x-app-version", "2.9.1"),
];

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    method: &'static str,
    id: u64,
    params: RpcParams<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RpcParams<'a> {
    texts: Vec<RpcText<'a>>,
    splitting: &'static str,
    lang: RpcLang<'a>,
    timestamp: u64,
    common_job_params: JobParams,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RpcText<'a> {
    text: &'a str,
    request_alternatives: u32,
}

#[derive(Serialize)]
struct RpcLang<'a> {
    source_lang_user_selected: &'a str,
    target_lang: &'a str,
}

#[derive(Serialize)]
struct JobParams {
    #[serde(rename = "wasSpoken")]
    was_spoken: bool,
    transcribe_as: &'static str,
}

#[derive(Deserialize)]
struct RpcResponse {
    result: Option<RpcResult>,
    error: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct RpcResult {
    texts: Vec<RpcTranslation>,
}

#[derive(Deserialize)]
struct RpcTranslation {
    text: String,
}

/// DeepL translator
#[derive(Debug, Clone)]
pub struct DeepLTranslator {
    config: TranslatorConfig,
    client: reqwest::Client,
    endpoint: String,
}

impl DeepLTranslator {
    pub fn new(config: TranslatorConfig) -> PoResult<Self> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        for (name, value) in APP_HEADERS {
            headers.insert(
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            );
        }

        let client = config.client_builder()?.default_headers(headers).build()?;

        Ok(Self {
            config,
            client,
            endpoint: API_URL.to_string(),
        })
    }

    /// Point the translator at another JSON-RPC endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn request_body(&self, text: &str) -> PoResult<String> {
        let now_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        build_request_body(
            text,
            &self.config.source_lang,
            &self.config.target_lang,
            random_request_id(),
            now_ms,
        )
    }
}

fn random_request_id() -> u64 {
    rand::thread_rng().gen_range(8_300_000..=8_399_998) * 1000
}

/// Timestamp the server expects: rounded to a multiple of `i_count + 1`
fn request_timestamp(i_count: u64, now_ms: u64) -> u64 {
    if i_count == 0 {
        return now_ms;
    }
    let step = i_count + 1;
    now_ms - now_ms % step + step
}

fn build_request_body(
    text: &str,
    source_lang: &str,
    target_lang: &str,
    id: u64,
    now_ms: u64,
) -> PoResult<String> {
    let i_count = text.matches('i').count() as u64;

    let request = RpcRequest {
        jsonrpc: "2.0",
        method: "LMT_handle_texts",
        id,
        params: RpcParams {
            texts: vec![RpcText {
                text,
                request_alternatives: 0,
            }],
            splitting: "newlines",
            lang: RpcLang {
                source_lang_user_selected: source_lang,
                target_lang,
            },
            timestamp: request_timestamp(i_count, now_ms),
            common_job_params: JobParams {
                was_spoken: false,
                transcribe_as: "",
            },
        },
    };

    let body = serde_json::to_string(&request)?;

    // The server fingerprints the spacing around "method"
    let spacing = if (id + 5) % 29 == 0 || (id + 3) % 13 == 0 {
        "\"method\" : \""
    } else {
        "\"method\": \""
    };
    Ok(body.replace("\"method\":\"", spacing))
}

fn parse_response(body: &str) -> PoResult<String> {
    let response: RpcResponse = serde_json::from_str(body)
        .map_err(|e| PoError::InvalidResponse(format!("Failed to parse DeepL response: {}", e)))?;

    if let Some(error) = response.error {
        return Err(PoError::InvalidResponse(format!("DeepL error: {}", error)));
    }

    response
        .result
        .and_then(|result| result.texts.into_iter().next())
        .map(|translation| translation.text)
        .ok_or_else(|| {
            PoError::InvalidResponse("Invalid DeepL response: missing 'result.texts'".to_string())
        })
}

#[async_trait]
impl Translator for DeepLTranslator {
    async fn translate(&self, text: &str) -> PoResult<String> {
        if text.is_empty() {
            return Ok(String::new());
        }

        let body = self.request_body(text)?;
        debug!(bytes = body.len(), "sending DeepL request");

        let response = self.client.post(&self.endpoint).body(body).send().await?;
        let body = read_body(response).await?;

        parse_response(&body)
    }

    fn provider_name(&self) -> &str {
        "DeepL"
    }
}
