//! Wire types of the third-party services the bot talks to.
//!
//! The payloads are deserialized leniently: every service here is outside our
//! control, so missing fields become `None` and the caller decides what a
//! usable answer is.

use serde::{Deserialize, Serialize};

pub mod news {
    use serde::Deserializer;
    use serde_json::Value;

    use super::*;

    /// Query parameters of `GET /v2/everything`.
    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct EverythingQuery<'a> {
        pub q: &'a str,
        pub language: &'a str,
        pub sort_by: &'a str,
        pub page_size: u32,
    }

    #[derive(Debug, Default, Deserialize)]
    pub struct EverythingResponse {
        #[serde(default, deserialize_with = "lenient_string")]
        pub status: Option<String>,
        #[serde(default, deserialize_with = "lenient_string")]
        pub message: Option<String>,
        /// One slot per entry of the payload; `None` where the entry is not
        /// an object.
        #[serde(default, deserialize_with = "lenient_articles")]
        pub articles: Vec<Option<Article>>,
    }

    #[derive(Clone, Debug, Default, Deserialize)]
    pub struct Article {
        #[serde(default, deserialize_with = "lenient_string")]
        pub title: Option<String>,
        #[serde(default, deserialize_with = "lenient_string")]
        pub url: Option<String>,
        #[serde(default, deserialize_with = "lenient_source")]
        pub source: Option<Source>,
    }

    #[derive(Clone, Debug, Default, Deserialize)]
    pub struct Source {
        #[serde(default, deserialize_with = "lenient_string")]
        pub name: Option<String>,
    }

    /// Any JSON value; only strings are kept.
    fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(value.as_str().map(str::to_string))
    }

    fn lenient_source<'de, D>(deserializer: D) -> Result<Option<Source>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(value
            .is_object()
            .then(|| serde_json::from_value(value).ok())
            .flatten())
    }

    fn lenient_articles<'de, D>(deserializer: D) -> Result<Vec<Option<Article>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let Value::Array(items) = Value::deserialize(deserializer)? else {
            return Ok(Vec::new());
        };
        Ok(items
            .into_iter()
            .map(|item| {
                item.is_object()
                    .then(|| serde_json::from_value(item).ok())
                    .flatten()
            })
            .collect())
    }
}

pub mod weather {
    use chrono::NaiveDateTime;

    use super::*;

    /// Fields requested in the `current` parameter of the forecast endpoint.
    pub const CURRENT_FIELDS: &str = "temperature_2m,relative_humidity_2m,apparent_temperature,weather_code,wind_speed_10m";

    /// WMO weather interpretation codes used by Open-Meteo.
    pub static WEATHER_CODES: &[(i64, &str)] = &[
        (0, "ясно"),
        (1, "преимущественно ясно"),
        (2, "переменная облачность"),
        (3, "пасмурно"),
        (45, "туман"),
        (48, "изморозь (туман)"),
        (51, "лёгкая морось"),
        (53, "умеренная морось"),
        (55, "сильная морось"),
        (56, "лёгкая переохлаждённая морось"),
        (57, "сильная переохлаждённая морось"),
        (61, "лёгкий дождь"),
        (63, "умеренный дождь"),
        (65, "сильный дождь"),
        (66, "лёгкий переохлаждённый дождь"),
        (67, "сильный переохлаждённый дождь"),
        (71, "лёгкий снег"),
        (73, "умеренный снег"),
        (75, "сильный снег"),
        (77, "снежные зёрна"),
        (80, "лёгкие ливни"),
        (81, "умеренные ливни"),
        (82, "сильные ливни"),
        (85, "лёгкие снегопады"),
        (86, "сильные снегопады"),
        (95, "гроза"),
        (96, "гроза с градом (лёгким)"),
        (99, "гроза с градом (сильным)"),
    ];

    /// Human readable description of a weather code. Unknown codes keep the
    /// number so the user can still report it.
    pub fn describe_code(code: i64) -> String {
        WEATHER_CODES
            .iter()
            .find_map(|(c, text)| (*c == code).then(|| (*text).to_string()))
            .unwrap_or_else(|| format!("неизвестно (код {code})"))
    }

    #[derive(Debug, Serialize)]
    pub struct ForecastQuery<'a> {
        pub latitude: f64,
        pub longitude: f64,
        pub current: &'a str,
        pub timezone: &'a str,
        pub wind_speed_unit: &'a str,
    }

    #[derive(Debug, Default, Deserialize)]
    pub struct ForecastResponse {
        #[serde(default)]
        pub current: Option<CurrentWeather>,
    }

    #[derive(Debug, Default, Deserialize)]
    pub struct CurrentWeather {
        #[serde(default)]
        pub time: Option<String>,
        #[serde(default)]
        pub temperature_2m: Option<f64>,
        #[serde(default)]
        pub apparent_temperature: Option<f64>,
        #[serde(default)]
        pub relative_humidity_2m: Option<f64>,
        #[serde(default)]
        pub wind_speed_10m: Option<f64>,
        #[serde(default)]
        pub weather_code: Option<serde_json::Value>,
    }

    impl CurrentWeather {
        /// The weather code as an integer. Open-Meteo sends an integer, but a
        /// float or a numeric string is accepted as well.
        pub fn weather_code(&self) -> Option<i64> {
            match self.weather_code.as_ref()? {
                serde_json::Value::Number(n) => n
                    .as_i64()
                    .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
                serde_json::Value::String(s) => s.trim().parse().ok(),
                _ => None,
            }
        }

        /// Observation time as sent by the service (`2024-05-01T12:00`).
        pub fn observed_at(&self) -> Option<NaiveDateTime> {
            let raw = self.time.as_deref()?;
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M").ok()
        }
    }
}

pub mod translate {
    use super::*;

    /// Extract the translation from the `translate_a/single` answer.
    ///
    /// The payload is a nested array where the first element holds the
    /// translated chunks: `[[["Hello", "Привет", ...], ...], ...]`.
    pub fn google_translation(payload: &serde_json::Value) -> Option<String> {
        let chunks = payload.get(0)?.as_array()?;
        let text: String = chunks
            .iter()
            .filter_map(|chunk| chunk.get(0).and_then(|t| t.as_str()))
            .collect();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    #[derive(Debug, Default, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct MyMemoryResponse {
        #[serde(default)]
        pub response_data: Option<MyMemoryData>,
    }

    #[derive(Debug, Default, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct MyMemoryData {
        #[serde(default)]
        pub translated_text: Option<String>,
    }

    impl MyMemoryResponse {
        pub fn translation(&self) -> Option<String> {
            self.response_data
                .as_ref()?
                .translated_text
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
        }
    }
}
