//! HTTP client for the sumo-api.com JSON API

use crate::config::SourceConfig;
use crate::error::{IngestError, Result};
use crate::source::models::{BanzukeSheet, RikishiPage, RikishiRecord, TorikumiDay};
use crate::source::throttle::RequestThrottle;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use sumo_common::types::{BashoId, Division};
use tokio::time::sleep;
use tracing::{debug, warn};

/// Page size the API accepts for rikishi listings.
pub const RIKISHI_PAGE_SIZE: u32 = 1000;

const RIKISHI_DETAIL_QUERY: &str = "measurements=true&ranks=true&shikona=true&intai=true";

/// Read-only client; every request goes through one shared throttle.
#[derive(Debug, Clone)]
pub struct SumoApiClient {
    client: Client,
    base_url: String,
    throttle: RequestThrottle,
    retry: SourceConfig,
}

impl SumoApiClient {
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            throttle: RequestThrottle::new(config.request_delay()),
            retry: config.clone(),
        })
    }

    /// GET `path` and decode the body, retrying transient failures with
    /// exponential backoff up to `max_retries` attempts.
    ///
    /// 404 and 204 mean "nothing here" and yield `Ok(None)`; any other
    /// non-200 status is an error for this request only.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        let url = format!("{}{}", self.base_url, path);
        let max_retries = self.retry.max_retries;
        let mut attempt = 1;

        loop {
            match self.get_json_once(&url).await {
                Err(e) if e.is_transient() && attempt < max_retries => {
                    let backoff = self.retry.retry_backoff(attempt);
                    warn!(
                        url = %url,
                        attempt,
                        max_retries,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %e,
                        "Request failed, retrying"
                    );
                    sleep(backoff).await;
                    attempt += 1;
                },
                result => return result,
            }
        }
    }

    async fn get_json_once<T: DeserializeOwned>(&self, url: &str) -> Result<Option<T>> {
        self.throttle.wait().await;

        debug!(url = %url, "GET");
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND || status == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        if status != StatusCode::OK {
            return Err(IngestError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body)
            .map(Some)
            .map_err(|source| IngestError::Parse {
                url: url.to_string(),
                source,
            })
    }

    pub async fn fetch_rikishi_by_id(&self, id: i32) -> Result<Option<RikishiRecord>> {
        self.get_json(&format!("/api/rikishi/{id}?{RIKISHI_DETAIL_QUERY}"))
            .await
    }

    /// One page of the rikishi listing. A missing page is an empty page.
    pub async fn fetch_rikishi_page(&self, skip: u32) -> Result<RikishiPage> {
        let path = format!(
            "/api/rikishis?limit={RIKISHI_PAGE_SIZE}&skip={skip}&{RIKISHI_DETAIL_QUERY}"
        );
        Ok(self.get_json(&path).await?.unwrap_or_default())
    }

    /// Schedule and results of one division on one day. The payload also
    /// carries the tournament header.
    pub async fn fetch_bouts_for_day(
        &self,
        basho: &BashoId,
        division: Division,
        day: u8,
    ) -> Result<TorikumiDay> {
        let path = format!("/api/basho/{basho}/torikumi/{division}/{day}");
        Ok(self.get_json(&path).await?.unwrap_or_default())
    }

    /// Tournament header, read from the top division's opening day.
    pub async fn fetch_basho_header(&self, basho: &BashoId) -> Result<Option<TorikumiDay>> {
        self.get_json(&format!("/api/basho/{basho}/torikumi/{}/1", Division::Makuuchi))
            .await
    }

    pub async fn fetch_banzuke(
        &self,
        basho: &BashoId,
        division: Division,
    ) -> Result<Option<BanzukeSheet>> {
        self.get_json(&format!("/api/basho/{basho}/banzuke/{division}"))
            .await
    }
}
