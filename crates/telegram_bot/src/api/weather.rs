use std::time::Duration;

use api_types::weather::{CURRENT_FIELDS, CurrentWeather, ForecastQuery, ForecastResponse, describe_code};
use reqwest::Client;

use super::{ApiError, url};

pub(crate) const DEFAULT_BASE_URL: &str = "https://api.open-meteo.com";

const TIMEOUT: Duration = Duration::from_secs(10);

pub(crate) const UNREADABLE: &str = "Не удалось распознать ответ сервиса погоды.";

/// Where the forecast is asked for. `place` is used in the reply header
/// ("Погода в {place}:").
#[derive(Clone, Debug, PartialEq)]
pub struct Location {
    pub place: String,
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: String,
}

impl Default for Location {
    fn default() -> Self {
        Self {
            place: "Краснодаре".to_string(),
            latitude: 45.0355,
            longitude: 38.9753,
            timezone: "Europe/Moscow".to_string(),
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct WeatherClient {
    client: Client,
    base_url: String,
    location: Location,
}

impl WeatherClient {
    pub(crate) fn new(client: Client, base_url: String, location: Location) -> Self {
        Self {
            client,
            base_url,
            location,
        }
    }

    pub(crate) async fn current(&self) -> Result<String, ApiError> {
        let payload: ForecastResponse = self
            .client
            .get(url(&self.base_url, "/v1/forecast"))
            .query(&ForecastQuery {
                latitude: self.location.latitude,
                longitude: self.location.longitude,
                current: CURRENT_FIELDS,
                timezone: &self.location.timezone,
                wind_speed_unit: "ms",
            })
            .timeout(TIMEOUT)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(format_current(
            &self.location.place,
            &payload.current.unwrap_or_default(),
        ))
    }
}

pub(crate) fn format_current(place: &str, current: &CurrentWeather) -> String {
    let Some(code) = current.weather_code() else {
        return UNREADABLE.to_string();
    };

    let mut parts = vec![format!("Погода в {place}:")];
    if let Some(at) = current.observed_at() {
        parts.push(format!("время: {}", at.format("%d.%m.%Y %H:%M")));
    } else if let Some(raw) = current.time.as_deref().filter(|t| !t.is_empty()) {
        parts.push(format!("время: {raw}"));
    }
    parts.push(format!("состояние: {}", describe_code(code)));

    if let Some(t) = current.temperature_2m {
        parts.push(format!("температура: {t}°C"));
    }
    if let Some(t) = current.apparent_temperature {
        parts.push(format!("ощущается как: {t}°C"));
    }
    if let Some(h) = current.relative_humidity_2m {
        parts.push(format!("влажность: {h}%"));
    }
    if let Some(w) = current.wind_speed_10m {
        parts.push(format!("ветер: {w} м/с"));
    }

    parts.join("\n")
}
