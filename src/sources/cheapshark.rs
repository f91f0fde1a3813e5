// CheapShark deal feed client
use crate::model::{RawDeal, SourceError, StoreInfo};
use crate::sources::DealSource;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

pub struct CheapSharkClient {
    client: Client,
    base_url: String,
}

impl CheapSharkClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, SourceError> {
        let client = Client::builder()
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) SharkScout/0.1")
            .timeout(timeout)
            .build()
            .map_err(|e| SourceError::Http(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T, SourceError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| {
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

        response
            .json::<T>()
            .await
            .map_err(|e| SourceError::InvalidResponse(e.to_string()))
    }

    /// Single deal lookup by its feed id.
    pub async fn deal_by_id(&self, deal_id: &str) -> Result<serde_json::Value, SourceError> {
        self.get_json("/deals", &[("id", deal_id)]).await
    }

    /// Live store directory; `crate::stores` carries the static fallback.
    pub async fn stores(&self) -> Result<Vec<StoreInfo>, SourceError> {
        self.get_json("/stores", &[]).await
    }
}

#[async_trait::async_trait]
impl DealSource for CheapSharkClient {
    async fn deals_by_steam_app_id(
        &self,
        app_id: &str,
        page_size: u32,
    ) -> Result<Vec<RawDeal>, SourceError> {
        let page_size = page_size.to_string();
        self.get_json(
            "/deals",
            &[("steamAppID", app_id), ("pageSize", &page_size)],
        )
        .await
    }

    async fn deals_by_title_exact(
        &self,
        title: &str,
        page_size: u32,
    ) -> Result<Vec<RawDeal>, SourceError> {
        let page_size = page_size.to_string();
        self.get_json(
            "/deals",
            &[("title", title), ("exact", "1"), ("pageSize", &page_size)],
        )
        .await
    }

    async fn deals_by_title(
        &self,
        title: &str,
        page_size: u32,
    ) -> Result<Vec<RawDeal>, SourceError> {
        let page_size = page_size.to_string();
        self.get_json("/deals", &[("title", title), ("pageSize", &page_size)])
            .await
    }
}
