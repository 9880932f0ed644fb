//! Command structs

use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Команды:")]
pub enum Command {
    #[command(description = "приветствие и меню.")]
    Start,
    #[command(description = "показать это сообщение.")]
    Help,
    #[command(description = "заполнить анкету (имя, возраст, класс).")]
    Form,
    #[command(description = "текущая погода.")]
    Weather,
    #[command(description = "свежие новости форекс.")]
    News,
    #[command(description = "полезные ссылки.")]
    Links,
    #[command(description = "динамическое меню.")]
    Dynamic,
    #[command(description = "перевести текст на английский и озвучить.")]
    Translate(String),
}
