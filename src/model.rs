// Core structs: RawDeal, GameQuery, AggregatedOffer, ResolvedCatalog
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

/// Effective price assigned to a deal that carries no usable price at all.
/// Never preferred over any present price.
pub const WORST_CASE_PRICE: f64 = 999.0;

/// One offer as returned by the deal feed. Field names follow the wire
/// format; prices arrive as decimal strings.
#[derive(Debug, Clone, Deserialize)]
pub struct RawDeal {
    #[serde(default)]
    pub title: String,
    #[serde(rename = "dealID", default)]
    pub deal_id: String,
    #[serde(rename = "storeID", default)]
    pub store_id: Option<String>,
    #[serde(rename = "salePrice", default)]
    pub sale_price: Option<String>,
    #[serde(rename = "normalPrice", default)]
    pub normal_price: Option<String>,
    #[serde(rename = "savings", default)]
    pub savings: Option<String>,
    #[serde(rename = "steamAppID", default)]
    pub steam_app_id: Option<String>,
    #[serde(default)]
    pub thumb: Option<String>,
}

impl RawDeal {
    /// Sale price if present, else normal price, else the worst-case
    /// sentinel. Unparsable price strings count as absent.
    pub fn effective_price(&self) -> f64 {
        self.sale_price
            .as_deref()
            .and_then(|p| p.parse::<f64>().ok())
            .or_else(|| {
                self.normal_price
                    .as_deref()
                    .and_then(|p| p.parse::<f64>().ok())
            })
            .unwrap_or(WORST_CASE_PRICE)
    }
}

/// Resolved search context for one game. Built once per resolution pass
/// and immutable for its duration.
#[derive(Debug, Clone)]
pub struct GameQuery {
    pub game_id: String,
    pub display_title: String,
    pub platform_app_id: Option<String>,
}

impl GameQuery {
    pub fn new(game_id: impl Into<String>, display_title: impl Into<String>) -> Self {
        Self {
            game_id: game_id.into(),
            display_title: display_title.into(),
            platform_app_id: None,
        }
    }

    pub fn with_platform_app_id(mut self, app_id: Option<String>) -> Self {
        self.platform_app_id = app_id;
        self
    }
}

/// One title variant with its cheapest-per-store offers, ascending by
/// effective price. At most one offer per store.
#[derive(Debug, Clone)]
pub struct AggregatedOffer {
    pub title_variant: String,
    pub offers: Vec<RawDeal>,
}

/// Final pipeline output: title variants ordered by how many stores carry
/// them, most first.
#[derive(Debug, Clone)]
pub struct ResolvedCatalog {
    pub variants: Vec<AggregatedOffer>,
    pub resolved_at: DateTime<Utc>,
}

impl ResolvedCatalog {
    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}

/// Result of one resolution pass. A pass that finishes after a newer pass
/// has started is reported as superseded and must not be applied.
#[derive(Debug)]
pub enum ResolveOutcome {
    Resolved(ResolvedCatalog),
    Superseded,
}

/// Short game record from the catalog API (list endpoints).
#[derive(Debug, Clone, Deserialize)]
pub struct GameSummary {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub released: Option<String>,
    #[serde(default)]
    pub background_image: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    /// Cleaned description, filled in by detail enrichment only.
    #[serde(default)]
    pub description_raw: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Genre {
    pub name: String,
}

/// Full game-detail payload. The shape is loose and shifts across API
/// versions, so the raw document is kept alongside typed accessors.
#[derive(Debug, Clone)]
pub struct DetailPayload(Value);

impl DetailPayload {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn raw(&self) -> &Value {
        &self.0
    }

    pub fn description(&self) -> &str {
        self.0
            .get("description_raw")
            .or_else(|| self.0.get("description"))
            .and_then(Value::as_str)
            .unwrap_or("")
    }

    pub fn rating(&self) -> Option<f64> {
        self.0.get("rating").and_then(Value::as_f64)
    }

    pub fn genre_names(&self) -> Vec<String> {
        self.0
            .get("genres")
            .and_then(Value::as_array)
            .map(|genres| {
                genres
                    .iter()
                    .filter_map(|g| g.get("name").and_then(Value::as_str))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// One storefront record from the deal feed's store directory.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreInfo {
    #[serde(rename = "storeID")]
    pub store_id: String,
    #[serde(rename = "storeName")]
    pub store_name: String,
    #[serde(rename = "isActive", default)]
    pub is_active: u8,
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("http error: {0}")]
    Http(String),
    #[error("unexpected status: {0}")]
    Status(u16),
    #[error("invalid response body: {0}")]
    InvalidResponse(String),
    #[error("request timed out")]
    Timeout,
}
