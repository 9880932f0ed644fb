use reqwest::Url;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup};

pub(crate) const HELLO: &str = "Привет";
pub(crate) const BYE: &str = "Пока";

const DYNAMIC_MORE: &str = "dynamic_more";
const DYNAMIC_OPTION_1: &str = "dynamic_option_1";
const DYNAMIC_OPTION_2: &str = "dynamic_option_2";

const LINKS: [(&str, &str); 3] = [
    ("Новости", "https://ria.ru/world/"),
    ("Музыка", "https://radiopotok.ru/radio/221"),
    ("Видео", "https://www.youtube.com/watch?v=ZRqHzvA6OvY"),
];

pub(crate) fn main_menu() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![vec![KeyboardButton::new(HELLO), KeyboardButton::new(BYE)]])
        .resize_keyboard()
        .input_field_placeholder("Выберите действие…")
}

pub(crate) fn links_keyboard() -> InlineKeyboardMarkup {
    let rows = LINKS
        .iter()
        .filter_map(|(text, url)| match Url::parse(url) {
            Ok(url) => Some(vec![InlineKeyboardButton::url(*text, url)]),
            Err(err) => {
                tracing::warn!("skipping link {text}: {err}");
                None
            }
        })
        .collect::<Vec<_>>();
    InlineKeyboardMarkup::new(rows)
}

pub(crate) fn dynamic_start_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        "Показать больше",
        DYNAMIC_MORE,
    )]])
}

pub(crate) fn dynamic_options_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback("Опция 1", DYNAMIC_OPTION_1),
        InlineKeyboardButton::callback("Опция 2", DYNAMIC_OPTION_2),
    ]])
}

/// Buttons of the `/dynamic` menu.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum DynamicAction {
    More,
    Option(u8),
}

impl DynamicAction {
    pub(crate) fn parse(data: &str) -> Option<Self> {
        match data {
            DYNAMIC_MORE => Some(Self::More),
            DYNAMIC_OPTION_1 => Some(Self::Option(1)),
            DYNAMIC_OPTION_2 => Some(Self::Option(2)),
            _ => None,
        }
    }
}
