use std::time::Duration;

use api_types::translate::{MyMemoryResponse, google_translation};
use reqwest::Client;

use super::{ApiError, url};

pub(crate) const GOOGLE_BASE_URL: &str = "https://translate.googleapis.com";
pub(crate) const MYMEMORY_BASE_URL: &str = "https://api.mymemory.translated.net";

const TIMEOUT: Duration = Duration::from_secs(10);

/// Translation through the public Google endpoint, with MyMemory as the
/// second opinion when Google answers with something we can't read or
/// doesn't answer at all.
#[derive(Clone, Debug)]
pub(crate) struct Translator {
    client: Client,
    primary_url: String,
    fallback_url: String,
}

impl Translator {
    pub(crate) fn new(client: Client, primary_url: String, fallback_url: String) -> Self {
        Self {
            client,
            primary_url,
            fallback_url,
        }
    }

    pub(crate) async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, ApiError> {
        match self.google(text, source, target).await {
            Ok(translated) => Ok(translated),
            Err(err) => {
                tracing::warn!("primary translator failed, using fallback: {err}");
                self.mymemory(text, source, target).await
            }
        }
    }

    async fn google(&self, text: &str, source: &str, target: &str) -> Result<String, ApiError> {
        let payload: serde_json::Value = self
            .client
            .get(url(&self.primary_url, "/translate_a/single"))
            .query(&[
                ("client", "gtx"),
                ("sl", source),
                ("tl", target),
                ("dt", "t"),
                ("q", text),
            ])
            .timeout(TIMEOUT)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        google_translation(&payload)
            .ok_or_else(|| ApiError::Malformed("no translated chunks".to_string()))
    }

    async fn mymemory(&self, text: &str, source: &str, target: &str) -> Result<String, ApiError> {
        let langpair = format!("{source}|{target}");
        let payload: MyMemoryResponse = self
            .client
            .get(url(&self.fallback_url, "/get"))
            .query(&[("q", text), ("langpair", langpair.as_str())])
            .timeout(TIMEOUT)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        payload
            .translation()
            .ok_or_else(|| ApiError::Malformed("empty translation".to_string()))
    }
}
