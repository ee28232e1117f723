//! Client for the data.gov.in MGNREGA resource.
//!
//! The API returns records as loosely typed JSON: numeric columns arrive as
//! strings more often than not, and columns go missing between fiscal years.
//! Everything lands in [`RawRecord`] untouched; coercion happens in the
//! normalizer.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::{
    config::{FETCH_TIMEOUT, STATE_NAME},
    error::FetchError,
};

pub const GOV_API_URL: &str =
    "https://api.data.gov.in/resource/ee03643a-ee4c-48c2-ac30-9f2ff26ab722";

/// One record exactly as the external API serves it.
#[derive(Deserialize, Debug, Default, Clone)]
pub struct RawRecord {
    #[serde(default)]
    pub district_name: Option<String>,
    #[serde(default)]
    pub fin_year: Option<String>,
    #[serde(default)]
    pub total_households: Option<Value>,
    #[serde(default)]
    pub job_cards_issued: Option<Value>,
    #[serde(default)]
    pub employment_demanded: Option<Value>,
    #[serde(default)]
    pub employment_provided: Option<Value>,
    #[serde(default)]
    pub persondays_generated: Option<Value>,
    #[serde(default)]
    pub avg_days_per_household: Option<Value>,
    #[serde(default)]
    pub works_completed: Option<Value>,
    #[serde(default)]
    pub total_expenditure_cr: Option<Value>,
}

#[derive(Deserialize)]
pub struct FetchResponse {
    #[serde(default)]
    pub records: Vec<RawRecord>,
}

#[async_trait]
pub trait RecordFetcher: Send + Sync {
    /// Fetch up to `limit` raw records for one district. Zero matches is not
    /// an error; transport failures, timeouts and non-2xx responses are.
    async fn fetch(&self, district: &str, limit: u32) -> Result<Vec<RawRecord>, FetchError>;
}

pub struct GovDataClient {
    client: Client,
    api_key: String,
}

impl GovDataClient {
    pub fn new(api_key: String) -> Self {
        let client = Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .expect("Failed to build http client");

        Self { client, api_key }
    }
}

#[async_trait]
impl RecordFetcher for GovDataClient {
    async fn fetch(&self, district: &str, limit: u32) -> Result<Vec<RawRecord>, FetchError> {
        let limit = limit.to_string();

        let response = self
            .client
            .get(GOV_API_URL)
            .query(&[
                ("api-key", self.api_key.as_str()),
                ("format", "json"),
                ("filters[state_name]", STATE_NAME),
                ("filters[district_name]", district),
                ("limit", limit.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body: FetchResponse = response.json().await?;
        Ok(body.records)
    }
}
