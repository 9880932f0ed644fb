//! Replies of the commands backed by an external service.
//!
//! Every failure ends up as one fixed message for the user; nothing here
//! returns an error other than the transport's own.

use teloxide::{prelude::*, types::InputFile};

use crate::{
    ConfigParameters,
    api::{
        ApiError, Services, news::NewsClient, weather::WeatherClient,
        weather::UNREADABLE as WEATHER_UNREADABLE,
    },
    transcode::{SpeechReply, Transcoder, speech_reply},
};

const WEATHER_NETWORK: &str = "Не удалось получить погоду: ошибка сети/сервиса.";
const WEATHER_TIMEOUT: &str = "Не удалось получить погоду: превышено время ожидания.";

const NEWS_NETWORK: &str = "Не удалось получить новости: ошибка сети/сервиса.";
const NEWS_TIMEOUT: &str = "Не удалось получить новости: превышено время ожидания.";
const NEWS_MALFORMED: &str = "Не удалось получить новости: непонятный ответ сервиса.";
const NEWS_NO_KEY: &str =
    "Не удалось получить новости: не задан NEWSAPI_KEY. Добавьте его в окружение бота.";

const TRANSLATE_USAGE: &str = "Напишите текст после команды, например:\n/translate Доброе утро";
const TRANSLATE_NETWORK: &str = "Не удалось перевести текст: ошибка сети/сервиса.";
const TRANSLATE_TIMEOUT: &str = "Не удалось перевести текст: превышено время ожидания.";
const TRANSLATE_MALFORMED: &str = "Не удалось перевести текст: сервис вернул пустой ответ.";
const SPEECH_FAILED: &str = "Озвучить перевод не получилось.";

const SOURCE_LANGUAGE: &str = "ru";
const TARGET_LANGUAGE: &str = "en";

pub(super) async fn weather_reply(weather: &WeatherClient) -> String {
    match weather.current().await {
        Ok(text) => text,
        Err(err) => {
            tracing::warn!("weather request failed: {err}");
            match err {
                ApiError::Timeout => WEATHER_TIMEOUT.to_string(),
                ApiError::Malformed(_) => WEATHER_UNREADABLE.to_string(),
                _ => WEATHER_NETWORK.to_string(),
            }
        }
    }
}

pub(super) async fn news_reply(news: &NewsClient) -> String {
    match news.forex_digest().await {
        Ok(text) => text,
        Err(err) => {
            tracing::warn!("news request failed: {err}");
            match err {
                ApiError::Network(_) => NEWS_NETWORK.to_string(),
                ApiError::Timeout => NEWS_TIMEOUT.to_string(),
                ApiError::Malformed(_) => NEWS_MALFORMED.to_string(),
                ApiError::MissingKey => NEWS_NO_KEY.to_string(),
                ApiError::Service { status, message } => {
                    let details = if message.is_empty() {
                        String::new()
                    } else {
                        format!(": {message}")
                    };
                    format!(
                        "Не удалось получить новости: ошибка NewsAPI ({}){details}",
                        status.as_u16()
                    )
                }
            }
        }
    }
}

/// What `/translate` sends back.
#[derive(Debug, PartialEq, Eq)]
pub(super) struct TranslationOutcome {
    pub text: String,
    pub speech: Option<SpeechReply>,
    pub notice: Option<&'static str>,
}

impl TranslationOutcome {
    fn text_only(text: &str) -> Self {
        Self {
            text: text.to_string(),
            speech: None,
            notice: None,
        }
    }
}

pub(super) async fn translation_outcome(
    services: &Services,
    transcoder: &Transcoder,
    text: &str,
) -> TranslationOutcome {
    let text = text.trim();
    if text.is_empty() {
        return TranslationOutcome::text_only(TRANSLATE_USAGE);
    }

    let translated = match services
        .translator
        .translate(text, SOURCE_LANGUAGE, TARGET_LANGUAGE)
        .await
    {
        Ok(translated) => translated,
        Err(err) => {
            tracing::warn!("translation failed: {err}");
            let message = match err {
                ApiError::Timeout => TRANSLATE_TIMEOUT,
                ApiError::Malformed(_) => TRANSLATE_MALFORMED,
                _ => TRANSLATE_NETWORK,
            };
            return TranslationOutcome::text_only(message);
        }
    };

    match services.speech.synthesize(&translated, TARGET_LANGUAGE).await {
        Ok(mp3) => TranslationOutcome {
            text: translated,
            speech: Some(speech_reply(mp3, transcoder).await),
            notice: None,
        },
        Err(err) => {
            tracing::warn!("speech synthesis failed: {err}");
            TranslationOutcome {
                text: translated,
                speech: None,
                notice: Some(SPEECH_FAILED),
            }
        }
    }
}

pub(super) async fn send_translation(
    bot: &Bot,
    chat_id: ChatId,
    cfg: &ConfigParameters,
    text: &str,
) -> ResponseResult<()> {
    let outcome = translation_outcome(&cfg.services, &cfg.transcoder, text).await;

    bot.send_message(chat_id, outcome.text).await?;
    match outcome.speech {
        Some(SpeechReply::Voice(opus)) => {
            bot.send_voice(chat_id, InputFile::memory(opus).file_name("translation.ogg"))
                .await?;
        }
        Some(SpeechReply::Audio(mp3)) => {
            bot.send_audio(chat_id, InputFile::memory(mp3).file_name("translation.mp3"))
                .await?;
        }
        None => {}
    }
    if let Some(notice) = outcome.notice {
        bot.send_message(chat_id, notice).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use reqwest::Client;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    use super::*;
    use crate::api::{Endpoints, weather::Location};

    const UNREACHABLE: &str = "http://127.0.0.1:9";

    fn unreachable_services(news_key: Option<&str>) -> Services {
        Services::new(
            Client::new(),
            Endpoints {
                news: UNREACHABLE.to_string(),
                weather: UNREACHABLE.to_string(),
                translate: UNREACHABLE.to_string(),
                translate_fallback: UNREACHABLE.to_string(),
                speech: UNREACHABLE.to_string(),
            },
            news_key.map(str::to_string),
            Location::default(),
        )
    }

    async fn working_services() -> (MockServer, Services) {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/translate_a/single"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!([[["Good morning", "Доброе утро"]]])),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/translate_tts"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(b"ID3mp3".to_vec(), "audio/mpeg"))
            .mount(&server)
            .await;

        let services = Services::new(
            Client::new(),
            Endpoints {
                news: server.uri(),
                weather: server.uri(),
                translate: server.uri(),
                translate_fallback: server.uri(),
                speech: server.uri(),
            },
            None,
            Location::default(),
        );
        (server, services)
    }

    #[tokio::test]
    async fn weather_network_failure_is_one_fixed_message() {
        let services = unreachable_services(None);
        assert_eq!(weather_reply(&services.weather).await, WEATHER_NETWORK);
    }

    #[tokio::test]
    async fn news_network_failure_is_one_fixed_message() {
        let services = unreachable_services(Some("key"));
        assert_eq!(news_reply(&services.news).await, NEWS_NETWORK);
    }

    #[tokio::test]
    async fn news_without_key_explains_the_setup() {
        let services = unreachable_services(None);
        assert_eq!(news_reply(&services.news).await, NEWS_NO_KEY);
    }

    #[tokio::test]
    async fn translation_network_failure_is_one_fixed_message() {
        let services = unreachable_services(None);
        let outcome = translation_outcome(&services, &Transcoder::unavailable(), "привет").await;
        assert_eq!(outcome, TranslationOutcome::text_only(TRANSLATE_NETWORK));
    }

    #[tokio::test]
    async fn empty_translation_request_shows_usage() {
        let services = unreachable_services(None);
        let outcome = translation_outcome(&services, &Transcoder::unavailable(), "   ").await;
        assert_eq!(outcome.text, TRANSLATE_USAGE);
        assert!(outcome.speech.is_none());
    }

    #[tokio::test]
    async fn without_transcoder_the_mp3_is_sent() {
        let (_server, services) = working_services().await;
        let outcome =
            translation_outcome(&services, &Transcoder::unavailable(), "Доброе утро").await;

        assert_eq!(outcome.text, "Good morning");
        assert_eq!(outcome.speech, Some(SpeechReply::Audio(b"ID3mp3".to_vec())));
        assert_eq!(outcome.notice, None);
    }

    #[tokio::test]
    async fn speech_failure_still_delivers_the_translation() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/translate_a/single"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!([[["Hi", "Привет"]]])),
            )
            .mount(&server)
            .await;
        let services = Services::new(
            Client::new(),
            Endpoints {
                translate: server.uri(),
                speech: UNREACHABLE.to_string(),
                ..Endpoints::default()
            },
            None,
            Location::default(),
        );

        let outcome = translation_outcome(&services, &Transcoder::unavailable(), "Привет").await;
        assert_eq!(outcome.text, "Hi");
        assert_eq!(outcome.speech, None);
        assert_eq!(outcome.notice, Some(SPEECH_FAILED));
    }
}
