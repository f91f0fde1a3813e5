use crate::model::{DetailPayload, GameSummary, RawDeal, SourceError};

/// Deal feed queried by the resolution ladder. All three shapes return the
/// same record type; `page_size` caps the result count.
#[async_trait::async_trait]
pub trait DealSource: Send + Sync {
    async fn deals_by_steam_app_id(
        &self,
        app_id: &str,
        page_size: u32,
    ) -> Result<Vec<RawDeal>, SourceError>;

    async fn deals_by_title_exact(
        &self,
        title: &str,
        page_size: u32,
    ) -> Result<Vec<RawDeal>, SourceError>;

    async fn deals_by_title(
        &self,
        title: &str,
        page_size: u32,
    ) -> Result<Vec<RawDeal>, SourceError>;
}

/// Game metadata API.
#[async_trait::async_trait]
pub trait GameCatalog: Send + Sync {
    async fn game_details(&self, id_or_slug: &str) -> Result<DetailPayload, SourceError>;

    async fn search_games(
        &self,
        query: &str,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<GameSummary>, SourceError>;

    async fn games_by_genre(
        &self,
        genre_slug: &str,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<GameSummary>, SourceError>;

    /// Top-rated games with descriptions filled in from per-game detail
    /// lookups. A failed detail lookup leaves that game's description
    /// empty rather than failing the batch.
    async fn top_rated_games(
        &self,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<GameSummary>, SourceError>;
}
