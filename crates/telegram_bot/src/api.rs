//! Clients of the third-party HTTP services.
//!
//! Every client shares the bot's [`reqwest::Client`] and takes its base URL
//! at construction, so tests can point them at a local mock server.

use reqwest::{Client, StatusCode};

use self::{
    news::NewsClient, speech::SpeechClient, translate::Translator,
    weather::{Location, WeatherClient},
};

pub(crate) mod news;
pub(crate) mod speech;
pub(crate) mod translate;
pub(crate) mod weather;

/// Base URLs of the external services.
#[derive(Clone, Debug)]
pub struct Endpoints {
    pub news: String,
    pub weather: String,
    pub translate: String,
    pub translate_fallback: String,
    pub speech: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            news: news::DEFAULT_BASE_URL.to_string(),
            weather: weather::DEFAULT_BASE_URL.to_string(),
            translate: translate::GOOGLE_BASE_URL.to_string(),
            translate_fallback: translate::MYMEMORY_BASE_URL.to_string(),
            speech: speech::DEFAULT_BASE_URL.to_string(),
        }
    }
}

/// Every outbound collaborator, sharing one HTTP client.
#[derive(Clone, Debug)]
pub(crate) struct Services {
    pub news: NewsClient,
    pub weather: WeatherClient,
    pub translator: Translator,
    pub speech: SpeechClient,
}

impl Services {
    pub(crate) fn new(
        client: Client,
        endpoints: Endpoints,
        news_api_key: Option<String>,
        location: Location,
    ) -> Self {
        Self {
            news: NewsClient::new(client.clone(), endpoints.news, news_api_key),
            weather: WeatherClient::new(client.clone(), endpoints.weather, location),
            translator: Translator::new(
                client.clone(),
                endpoints.translate,
                endpoints.translate_fallback,
            ),
            speech: SpeechClient::new(client, endpoints.speech),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum ApiError {
    #[error("network error: {0}")]
    Network(reqwest::Error),
    #[error("request timed out")]
    Timeout,
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("{status}: {message}")]
    Service { status: StatusCode, message: String },
    #[error("api key is not configured")]
    MissingKey,
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_decode() {
            ApiError::Malformed(err.to_string())
        } else {
            ApiError::Network(err)
        }
    }
}

fn url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
