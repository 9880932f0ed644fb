use std::time::Duration;

use api_types::news::{Article, EverythingQuery, EverythingResponse};
use reqwest::Client;

use super::{ApiError, url};

pub(crate) const DEFAULT_BASE_URL: &str = "https://newsapi.org";

const QUERY: &str = "forex OR currency OR fx OR USD OR EUR";
const PAGE_SIZE: u32 = 5;
const LANGUAGES: [&str; 2] = ["ru", "en"];
const TIMEOUT: Duration = Duration::from_secs(15);

pub(crate) const NO_NEWS: &str = "Не нашёл свежих новостей по форексу. Попробуйте позже.";

#[derive(Clone, Debug)]
pub(crate) struct NewsClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl NewsClient {
    pub(crate) fn new(client: Client, base_url: String, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url,
            api_key,
        }
    }

    /// Latest forex headlines, Russian first and English when there is
    /// nothing in Russian.
    pub(crate) async fn forex_digest(&self) -> Result<String, ApiError> {
        let api_key = self.api_key.as_deref().ok_or(ApiError::MissingKey)?;

        for language in LANGUAGES {
            let resp = self
                .client
                .get(url(&self.base_url, "/v2/everything"))
                .query(&EverythingQuery {
                    q: QUERY,
                    language,
                    sort_by: "publishedAt",
                    page_size: PAGE_SIZE,
                })
                .header("X-Api-Key", api_key)
                .timeout(TIMEOUT)
                .send()
                .await?;

            let status = resp.status();
            let body = resp.bytes().await?;
            let payload = serde_json::from_slice::<EverythingResponse>(&body);

            if !status.is_success() {
                let message = payload.ok().and_then(|p| p.message).unwrap_or_default();
                return Err(ApiError::Service { status, message });
            }

            let payload = payload.map_err(|err| ApiError::Malformed(err.to_string()))?;
            let articles = payload.articles;
            if articles.is_empty() {
                tracing::debug!("no news in {language}");
                continue;
            }
            return Ok(format_digest(&articles));
        }

        Ok(NO_NEWS.to_string())
    }
}

/// Entries that are not articles keep their number but are left out.
pub(crate) fn format_digest(articles: &[Option<Article>]) -> String {
    let mut lines = vec!["Новости форекс (свежие):".to_string()];

    for (idx, article) in articles.iter().take(PAGE_SIZE as usize).enumerate() {
        let Some(article) = article else {
            continue;
        };
        let title = article
            .title
            .as_deref()
            .map(str::trim)
            .unwrap_or("Без заголовка");
        let url = article.url.as_deref().map(str::trim).unwrap_or("");
        let source = article
            .source
            .as_ref()
            .and_then(|s| s.name.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!(" ({s})"))
            .unwrap_or_default();

        if url.is_empty() {
            lines.push(format!("{}. {title}{source}", idx + 1));
        } else {
            lines.push(format!("{}. {title}{source}\n{url}", idx + 1));
        }
    }

    lines.join("\n\n")
}
