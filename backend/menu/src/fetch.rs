//! Sodexo feed gateway.

use chrono::NaiveDate;
use reqwest::Client;
use thiserror::Error;

use crate::{flags::DATE_FORMAT, models::RawMeal};

pub const MENU_ENDPOINT: &str = "https://api-prd.sodexomyway.net/v0.2/data/menu";

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("menu request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("menu response was not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Thin client for the upstream menu API. Holds the reqwest client so
/// connections are reused across requests.
pub struct SodexoClient {
    http: Client,
    api_key: String,
    location_id: String,
    site_id: String,
}

impl SodexoClient {
    pub fn new(api_key: &str, location_id: &str, site_id: &str) -> Self {
        Self {
            http: Client::new(),
            api_key: api_key.to_string(),
            location_id: location_id.to_string(),
            site_id: site_id.to_string(),
        }
    }

    /// Raw meal records for one date. An empty list means the feed has no
    /// menu published for that date.
    pub async fn fetch(&self, date: NaiveDate) -> Result<Vec<RawMeal>, FetchError> {
        let url = format!("{MENU_ENDPOINT}/{}/{}", self.location_id, self.site_id);

        let response = self
            .http
            .get(&url)
            .query(&[("date", date.format(DATE_FORMAT).to_string())])
            .header("API-Key", &self.api_key)
            .send()
            .await?
            .error_for_status()?;

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}
