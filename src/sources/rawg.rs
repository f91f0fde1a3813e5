// RAWG game catalog client
use crate::description::clean_description;
use crate::model::{DetailPayload, GameSummary, SourceError};
use crate::sources::GameCatalog;
use futures::future::join_all;
use reqwest::Client;
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Deserialize)]
struct GamesPage {
    #[serde(default)]
    results: Vec<GameSummary>,
}

pub struct RawgClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl RawgClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, SourceError> {
        let client = Client::builder()
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) SharkScout/0.1")
            .timeout(timeout)
            .build()
            .map_err(|e| SourceError::Http(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key,
        })
    }

    async fn get_games_page(&self, params: &[(&str, &str)]) -> Result<Vec<GameSummary>, SourceError> {
        let url = format!("{}/games", self.base_url);
        let mut request = self.client.get(&url).query(params);
        if let Some(key) = &self.api_key {
            request = request.query(&[("key", key.as_str())]);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                SourceError::Timeout
            } else {
                SourceError::Http(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }

        let page: GamesPage = response
            .json()
            .await
            .map_err(|e| SourceError::InvalidResponse(e.to_string()))?;
        Ok(page.results)
    }
}

#[async_trait::async_trait]
impl GameCatalog for RawgClient {
    async fn game_details(&self, id_or_slug: &str) -> Result<DetailPayload, SourceError> {
        let url = format!("{}/games/{}", self.base_url, id_or_slug);
        let mut request = self.client.get(&url);
        if let Some(key) = &self.api_key {
            request = request.query(&[("key", key.as_str())]);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                SourceError::Timeout
            } else {
                SourceError::Http(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }

        let value: serde_json::Value = response
            .json()
            .await
            .map_err(|e| SourceError::InvalidResponse(e.to_string()))?;
        Ok(DetailPayload::new(value))
    }

    async fn search_games(
        &self,
        query: &str,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<GameSummary>, SourceError> {
        let page = page.to_string();
        let page_size = page_size.to_string();
        self.get_games_page(&[
            ("search", query),
            ("page", &page),
            ("page_size", &page_size),
        ])
        .await
    }

    async fn games_by_genre(
        &self,
        genre_slug: &str,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<GameSummary>, SourceError> {
        let page = page.to_string();
        let page_size = page_size.to_string();
        self.get_games_page(&[
            ("genres", genre_slug),
            ("page", &page),
            ("page_size", &page_size),
        ])
        .await
    }

    async fn top_rated_games(
        &self,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<GameSummary>, SourceError> {
        let page = page.to_string();
        let page_size = page_size.to_string();
        let summaries = self
            .get_games_page(&[
                ("ordering", "-rating"),
                ("page", &page),
                ("page_size", &page_size),
            ])
            .await?;

        Ok(enrich_with_descriptions(summaries, |id| async move {
            self.game_details(&id).await
        })
        .await)
    }
}

/// Fills each summary's description from a per-id detail lookup. Lookups
/// run concurrently; a failed lookup leaves that one description empty
/// rather than sinking the whole page.
async fn enrich_with_descriptions<F, Fut>(summaries: Vec<GameSummary>, lookup: F) -> Vec<GameSummary>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<DetailPayload, SourceError>>,
{
    let lookups = summaries.iter().map(|game| {
        let id = game.id.to_string();
        let detail = lookup(id.clone());
        async move {
            match detail.await {
                Ok(detail) => clean_description(detail.description()),
                Err(e) => {
                    warn!("Detail lookup failed for game {}: {}", id, e);
                    String::new()
                }
            }
        }
    });
    let descriptions = join_all(lookups).await;

    summaries
        .into_iter()
        .zip(descriptions)
        .map(|(mut game, description)| {
            game.description_raw = Some(description);
            game
        })
        .collect()
}
