use serde::Deserialize;
use std::fs;

fn default_catalog_base_url() -> String {
    "https://api.rawg.io/api".to_string()
}

fn default_deals_base_url() -> String {
    "https://www.cheapshark.com/api/1.0".to_string()
}

fn default_page_size() -> u32 {
    60
}

fn default_step_timeout_seconds() -> u64 {
    8
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_catalog_base_url")]
    pub catalog_base_url: String,
    /// Catalog API key; requests go out unauthenticated when absent.
    #[serde(default)]
    pub catalog_api_key: Option<String>,
    #[serde(default = "default_deals_base_url")]
    pub deals_base_url: String,
    /// Result cap per ladder step.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Per-step deadline; expiry counts as zero results for that step.
    #[serde(default = "default_step_timeout_seconds")]
    pub step_timeout_seconds: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            catalog_base_url: default_catalog_base_url(),
            catalog_api_key: None,
            deals_base_url: default_deals_base_url(),
            page_size: default_page_size(),
            step_timeout_seconds: default_step_timeout_seconds(),
        }
    }
}

pub fn load_config(path: &str) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(path)?;
    let config: AppConfig = serde_json::from_str(&content)?;
    Ok(config)
}
