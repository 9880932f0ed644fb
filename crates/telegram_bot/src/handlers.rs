use teloxide::{
    prelude::*,
    types::{CallbackQuery, User},
    utils::command::BotCommands,
};

use crate::{
    ConfigParameters,
    commands::Command,
    ui::{self, BYE, DynamicAction, HELLO},
};

pub(crate) use media::{handle_photo, handle_voice};

mod media;
mod services;

const FALLBACK_NAME: &str = "друг";

pub(crate) async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    cfg: ConfigParameters,
) -> ResponseResult<()> {
    let chat_id = msg.chat.id;

    match cmd {
        Command::Start => {
            let name = display_name(msg.from.as_ref());
            bot.send_message(chat_id, format!("Приветствую, {name}!\nМеню:"))
                .reply_markup(ui::main_menu())
                .await?;
        }
        Command::Help => {
            bot.send_message(chat_id, Command::descriptions().to_string())
                .await?;
        }
        Command::Form => {
            let reply = cfg.form.begin(chat_id).await;
            bot.send_message(chat_id, reply.to_string()).await?;
        }
        Command::Weather => {
            let text = services::weather_reply(&cfg.services.weather).await;
            bot.send_message(chat_id, text).await?;
        }
        Command::News => {
            let text = services::news_reply(&cfg.services.news).await;
            bot.send_message(chat_id, text).await?;
        }
        Command::Links => {
            bot.send_message(chat_id, "Полезные ссылки:")
                .reply_markup(ui::links_keyboard())
                .await?;
        }
        Command::Dynamic => {
            bot.send_message(chat_id, "Динамическое меню:")
                .reply_markup(ui::dynamic_start_keyboard())
                .await?;
        }
        Command::Translate(text) => {
            services::send_translation(&bot, chat_id, &cfg, &text).await?;
        }
    }

    Ok(())
}

/// Plain text: an answer of the form when one is running, otherwise the
/// menu buttons.
pub(crate) async fn handle_text(bot: Bot, msg: Message, cfg: ConfigParameters) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    let chat_id = msg.chat.id;

    if let Some(reply) = cfg.form.handle_text(&chat_id, text).await {
        bot.send_message(chat_id, reply.to_string()).await?;
        return Ok(());
    }

    match text {
        HELLO => {
            let name = display_name(msg.from.as_ref());
            bot.send_message(chat_id, format!("Привет, {name}!")).await?;
        }
        BYE => {
            let name = display_name(msg.from.as_ref());
            bot.send_message(chat_id, format!("До свидания, {name}!"))
                .await?;
        }
        _ => tracing::debug!("ignoring text in {chat_id}"),
    }

    Ok(())
}

pub(crate) async fn handle_callback(bot: Bot, q: CallbackQuery) -> ResponseResult<()> {
    let _ = bot.answer_callback_query(q.id.clone()).await;

    let Some(message) = q.message.as_ref() else {
        return Ok(());
    };
    let chat_id = message.chat().id;

    let Some(action) = q.data.as_deref().and_then(DynamicAction::parse) else {
        tracing::debug!("unknown callback data: {:?}", q.data);
        return Ok(());
    };

    match action {
        DynamicAction::More => {
            bot.edit_message_reply_markup(chat_id, message.id())
                .reply_markup(ui::dynamic_options_keyboard())
                .await?;
        }
        DynamicAction::Option(n) => {
            bot.send_message(chat_id, format!("Опция {n}")).await?;
        }
    }

    Ok(())
}

fn display_name(user: Option<&User>) -> String {
    match user {
        Some(user) => pick_name(&user.first_name, &user.full_name()),
        None => FALLBACK_NAME.to_string(),
    }
}

fn pick_name(first_name: &str, full_name: &str) -> String {
    [first_name, full_name]
        .into_iter()
        .map(str::trim)
        .find(|name| !name.is_empty())
        .unwrap_or(FALLBACK_NAME)
        .to_string()
}
