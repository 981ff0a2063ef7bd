use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{TranslateError, Translator};

#[derive(Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslateResponse {
    translated_text: String,
}

pub struct LibreTranslate {
    client: Client,
    endpoint: String,
}

impl LibreTranslate {
    pub fn new(base_url: &str) -> Result<Self, TranslateError> {
        let client = Client::builder().timeout(Duration::from_secs(9)).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/translate", base_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl Translator for LibreTranslate {
    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String, TranslateError> {
        debug!("Translating {} chars {} -> {}", text.len(), source, target);
        let response = self
            .client
            .post(&self.endpoint)
            .json(&TranslateRequest { q: text, source, target })
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(TranslateError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TranslateError::Upstream(format!("{}: {}", status, body)));
        }

        let body: TranslateResponse = response.json().await?;
        Ok(body.translated_text)
    }
}
