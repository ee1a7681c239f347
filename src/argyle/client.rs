use crate::argyle::types::Page;
use crate::error::{IncomeSeriesError, Result};
use crate::grid::lookback_start;
use crate::schema::{Account, Activity, Employment, Payout};
use crate::SourceData;
use chrono::{Datelike, NaiveDate};
use log::debug;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::time::sleep;

const ARGYLE_BASE_URL: &str = "https://api.argyle.com/v2";
const PAGE_LIMIT: u32 = 200;
const MAX_RETRIES: u32 = 2;
const RETRY_DELAY: Duration = Duration::from_millis(500);

/// Async client for the Argyle payroll API. Every listing endpoint is
/// paginated; the fetch helpers follow `next` cursors until the listing is
/// exhausted, so callers always receive complete collections.
#[derive(Clone)]
pub struct ArgyleClient {
    client: Client,
    base_url: String,
    api_key_id: String,
    api_key_secret: String,
}

impl ArgyleClient {
    pub fn new(api_key_id: String, api_key_secret: String) -> Self {
        Self {
            client: Client::new(),
            base_url: ARGYLE_BASE_URL.to_string(),
            api_key_id,
            api_key_secret,
        }
    }

    /// Points the client at a different environment, e.g. the Argyle
    /// sandbox.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub async fn accounts(&self, user: &str) -> Result<Vec<Account>> {
        self.fetch_all("accounts", &[("user", user.to_string())])
            .await
    }

    pub async fn payouts(
        &self,
        user: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Payout>> {
        self.fetch_all(
            "payouts",
            &[
                ("user", user.to_string()),
                ("from_start_date", from.format("%Y-%m-%d").to_string()),
                ("to_start_date", to.format("%Y-%m-%d").to_string()),
            ],
        )
        .await
    }

    pub async fn activities(
        &self,
        user: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Activity>> {
        self.fetch_all(
            "activities",
            &[
                ("user", user.to_string()),
                ("from_start_date", from.format("%Y-%m-%d").to_string()),
                ("to_start_date", to.format("%Y-%m-%d").to_string()),
            ],
        )
        .await
    }

    pub async fn employments(&self, user: &str) -> Result<Vec<Employment>> {
        self.fetch_all("employments", &[("user", user.to_string())])
            .await
    }

    /// Fetches everything the aggregation pipeline needs for one user over
    /// the dashboard's 2-year window.
    pub async fn source_data(&self, user: &str, today: NaiveDate) -> Result<SourceData> {
        let window_start = lookback_start(today).with_day(1).unwrap();

        let accounts = self.accounts(user).await?;
        let payouts = self.payouts(user, window_start, today).await?;
        let activities = self.activities(user, window_start, today).await?;

        Ok(SourceData {
            accounts: Some(accounts),
            payouts: Some(payouts),
            activities: Some(activities),
        })
    }

    async fn fetch_all<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>> {
        let url = format!("{}/{}", self.base_url, path);

        let mut page: Page<T> = self
            .fetch_page(
                self.client
                    .get(&url)
                    .query(query)
                    .query(&[("limit", PAGE_LIMIT)]),
            )
            .await?;
        let mut results = page.results;

        while let Some(next) = page.next {
            debug!("following {path} pagination cursor");
            page = self.fetch_page(self.client.get(&next)).await?;
            results.append(&mut page.results);
        }

        Ok(results)
    }

    /// Sends one page request, retrying rate limits and server errors with a
    /// short backoff.
    async fn fetch_page<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<Page<T>> {
        let mut request = request;
        let mut attempts = 0;

        loop {
            attempts += 1;
            let retry = request.try_clone();

            let response = request
                .basic_auth(&self.api_key_id, Some(&self.api_key_secret))
                .send()
                .await?;

            let status = response.status();
            if status.is_success() {
                return Ok(response.json().await?);
            }

            let message = response.text().await?;
            let transient = status.as_u16() == 429 || status.is_server_error();

            match retry {
                Some(next_request) if transient && attempts <= MAX_RETRIES => {
                    debug!("status {status} from Argyle, retrying (attempt {attempts})");
                    sleep(RETRY_DELAY * attempts).await;
                    request = next_request;
                }
                _ => {
                    return Err(IncomeSeriesError::Api {
                        status: status.as_u16(),
                        message,
                    })
                }
            }
        }
    }
}
