use std::time::Duration;

use reqwest::Client;

use super::{ApiError, url};

pub(crate) const DEFAULT_BASE_URL: &str = "https://translate.google.com";

const TIMEOUT: Duration = Duration::from_secs(15);
/// The endpoint refuses longer inputs.
const MAX_CHARS: usize = 200;

/// Text-to-speech through the `translate_tts` endpoint. Answers are mp3.
#[derive(Clone, Debug)]
pub(crate) struct SpeechClient {
    client: Client,
    base_url: String,
}

impl SpeechClient {
    pub(crate) fn new(client: Client, base_url: String) -> Self {
        Self { client, base_url }
    }

    pub(crate) async fn synthesize(&self, text: &str, language: &str) -> Result<Vec<u8>, ApiError> {
        let text: String = text.chars().take(MAX_CHARS).collect();
        let audio = self
            .client
            .get(url(&self.base_url, "/translate_tts"))
            .query(&[
                ("ie", "UTF-8"),
                ("client", "tw-ob"),
                ("tl", language),
                ("q", text.as_str()),
            ])
            .timeout(TIMEOUT)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        if audio.is_empty() {
            return Err(ApiError::Malformed("empty audio".to_string()));
        }
        Ok(audio.to_vec())
    }
}
