//! Machine translation through an external LibreTranslate-compatible service.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

mod libre;

pub use libre::LibreTranslate;

/// Attempts made by [`translate_with_retry`], including the first.
pub const MAX_ATTEMPTS: u32 = 2;

#[derive(Error, Debug)]
pub enum TranslateError {
    #[error("translation service is rate limiting requests")]
    RateLimited,

    #[error("translation request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("translation service error: {0}")]
    Upstream(String),
}

#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String, TranslateError>;
}

/// Retries only when the service answers 429, waiting `backoff` in between.
/// Any other failure is returned straight away.
pub async fn translate_with_retry(
    translator: &dyn Translator,
    text: &str,
    source: &str,
    target: &str,
    backoff: Duration,
) -> Result<String, TranslateError> {
    let mut attempt = 1;
    loop {
        match translator.translate(text, source, target).await {
            Err(TranslateError::RateLimited) if attempt < MAX_ATTEMPTS => {
                warn!("Rate limit hit for {}. Retrying in {:?}...", target, backoff);
                tokio::time::sleep(backoff).await;
                attempt += 1;
            }
            result => return result,
        }
    }
}
