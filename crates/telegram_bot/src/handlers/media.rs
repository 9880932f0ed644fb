//! Photos are stored on disk, voice notes are echoed back.

use std::path::Path;

use teloxide::{
    DownloadError, RequestError,
    net::Download,
    prelude::*,
    types::{InputFile, PhotoSize},
};
use thiserror::Error;

use crate::ConfigParameters;

const DEFAULT_SUFFIX: &str = ".jpg";

const SAVE_NETWORK: &str = "Не удалось скачать фото: ошибка сети/сервиса.";
const SAVE_IO: &str = "Не удалось сохранить фото на диск.";

#[derive(Debug, Error)]
enum SaveError {
    #[error("telegram request failed: {0}")]
    Request(#[from] RequestError),
    #[error("download failed: {0}")]
    Download(#[from] DownloadError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub(crate) async fn handle_photo(bot: Bot, msg: Message, cfg: ConfigParameters) -> ResponseResult<()> {
    // Telegram lists the sizes from smallest to largest.
    let Some(photo) = msg.photo().and_then(|sizes| sizes.last()) else {
        return Ok(());
    };

    let text = save_reply(save_photo(&bot, photo, &cfg.image_dir).await);
    bot.send_message(msg.chat.id, text).await?;

    Ok(())
}

pub(crate) async fn handle_voice(bot: Bot, msg: Message) -> ResponseResult<()> {
    let Some(voice) = msg.voice() else {
        return Ok(());
    };

    bot.send_voice(msg.chat.id, InputFile::file_id(voice.file.id.clone()))
        .await?;
    Ok(())
}

async fn save_photo(bot: &Bot, photo: &PhotoSize, dir: &Path) -> Result<String, SaveError> {
    let file = bot.get_file(photo.file.id.clone()).await?;

    let mut content = Vec::new();
    bot.download_file(&file.path, &mut content).await?;

    let name = photo_file_name(&photo.file.unique_id.0, &file.path);
    tokio::fs::create_dir_all(dir).await?;
    tokio::fs::write(dir.join(&name), &content).await?;
    tracing::info!("saved photo {name} ({} bytes)", content.len());

    Ok(name)
}

fn save_reply(result: Result<String, SaveError>) -> String {
    match result {
        Ok(name) => format!("Фото сохранено: {name}"),
        Err(err) => {
            tracing::warn!("failed to save photo: {err}");
            match err {
                SaveError::Request(_) | SaveError::Download(_) => SAVE_NETWORK.to_string(),
                SaveError::Io(_) => SAVE_IO.to_string(),
            }
        }
    }
}

/// `{unique_id}{suffix}`, the suffix taken from the path on Telegram's side.
fn photo_file_name(unique_id: &str, server_path: &str) -> String {
    let suffix = Path::new(server_path)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .map(|ext| format!(".{ext}"))
        .unwrap_or_else(|| DEFAULT_SUFFIX.to_string());
    format!("{unique_id}{suffix}")
}
