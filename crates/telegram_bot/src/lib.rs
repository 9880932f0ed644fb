//! Telegram bot.
//!
//! One dispatcher serves the guided form, the menu buttons and the commands
//! backed by external services. Everything a handler needs lives in
//! [`ConfigParameters`], built once in [`Bot::run`] and injected by `dptree`.

use std::path::PathBuf;

use collector::{Collector, SqliteRecordStore};
use reqwest::Client;
use sea_orm::DatabaseConnection;
use teloxide::{dispatching::HandlerExt, prelude::*, utils::command::BotCommands};
use thiserror::Error;

pub use api::{Endpoints, weather::Location};
pub use transcode::{SpeechReply, Transcoder};

mod api;
mod commands;
mod handlers;
mod transcode;
mod ui;

const DEFAULT_IMAGE_DIR: &str = "img";

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("telegram token is empty")]
    MissingToken,
    #[error("database connection is required")]
    MissingDatabase,
    #[error("failed to build http client: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Clone)]
pub struct ConfigParameters {
    pub(crate) form: Collector<SqliteRecordStore, ChatId>,
    pub(crate) services: api::Services,
    pub(crate) transcoder: Transcoder,
    pub(crate) image_dir: PathBuf,
}

pub struct Bot {
    token: String,
    database: DatabaseConnection,
    client: Client,
    endpoints: Endpoints,
    news_api_key: Option<String>,
    location: Location,
    image_dir: PathBuf,
}

impl Bot {
    pub fn builder() -> BotBuilder {
        BotBuilder::default()
    }

    pub async fn run(&self) {
        tracing::info!("Starting telegram bot...");

        let bot = teloxide::Bot::new(&self.token);
        if let Err(err) = bot.set_my_commands(commands::Command::bot_commands()).await {
            tracing::warn!("failed to register bot commands: {err}");
        }

        let parameters = ConfigParameters {
            form: Collector::new(SqliteRecordStore::new(self.database.clone())),
            services: api::Services::new(
                self.client.clone(),
                self.endpoints.clone(),
                self.news_api_key.clone(),
                self.location.clone(),
            ),
            transcoder: Transcoder::detect().await,
            image_dir: self.image_dir.clone(),
        };

        let messages = Update::filter_message()
            .branch(
                dptree::entry()
                    .filter_command::<commands::Command>()
                    .endpoint(handlers::handle_command),
            )
            .branch(
                dptree::filter(|msg: Message| msg.photo().is_some())
                    .endpoint(handlers::handle_photo),
            )
            .branch(
                dptree::filter(|msg: Message| msg.voice().is_some())
                    .endpoint(handlers::handle_voice),
            )
            .branch(dptree::endpoint(handlers::handle_text));

        let handler = dptree::entry()
            .branch(messages)
            .branch(Update::filter_callback_query().endpoint(handlers::handle_callback));

        Dispatcher::builder(bot, handler)
            .dependencies(dptree::deps![parameters])
            .default_handler(|upd| async move {
                tracing::warn!("Unhandled update: {:?}", upd);
            })
            .error_handler(LoggingErrorHandler::with_custom_text(
                "An error has occurred in the dispatcher",
            ))
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;
    }
}

#[derive(Default, Debug)]
pub struct BotBuilder {
    token: String,
    database: Option<DatabaseConnection>,
    endpoints: Option<Endpoints>,
    news_api_key: Option<String>,
    location: Option<Location>,
    image_dir: Option<PathBuf>,
}

impl BotBuilder {
    pub fn token(mut self, token: &str) -> BotBuilder {
        self.token = token.to_string();
        self
    }

    pub fn database(mut self, database: DatabaseConnection) -> BotBuilder {
        self.database = Some(database);
        self
    }

    /// Without a key `/news` answers with a setup hint.
    pub fn news_api_key(mut self, api_key: Option<String>) -> BotBuilder {
        self.news_api_key = api_key.filter(|k| !k.trim().is_empty());
        self
    }

    pub fn location(mut self, location: Location) -> BotBuilder {
        self.location = Some(location);
        self
    }

    pub fn endpoints(mut self, endpoints: Endpoints) -> BotBuilder {
        self.endpoints = Some(endpoints);
        self
    }

    pub fn image_dir(mut self, path: impl Into<PathBuf>) -> BotBuilder {
        self.image_dir = Some(path.into());
        self
    }

    pub fn build(self) -> Result<Bot, BuildError> {
        tracing::info!("Initializing telegram bot...");
        if self.token.trim().is_empty() {
            return Err(BuildError::MissingToken);
        }
        let database = self.database.ok_or(BuildError::MissingDatabase)?;
        let client = Client::builder()
            .user_agent(concat!("schoolbot/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Bot {
            token: self.token,
            database,
            client,
            endpoints: self.endpoints.unwrap_or_default(),
            news_api_key: self.news_api_key,
            location: self.location.unwrap_or_default(),
            image_dir: self
                .image_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_IMAGE_DIR)),
        })
    }
}
