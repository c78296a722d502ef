use crate::{
    core::ranking::{RankingEntry, Runner},
    error::{BoardError, BoardResult},
    store::LapStore,
};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::fmt;

enum Endpoint {
    RunnersWithLaps,
    RunnerLaps(u32),
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Endpoint::RunnersWithLaps => {
                write!(f, "/runners/laps")
            }
            Endpoint::RunnerLaps(number) => {
                write!(f, "/runners/{}/laps", number)
            }
        }
    }
}

/// HTTP client for the external lap store.
pub struct HttpLapStore {
    http_client: Client,
    base_url: String,
    api_token: String,
}

impl HttpLapStore {
    pub fn new(base_url: String, timeout: std::time::Duration, api_token: String) -> Self {
        let http_client = Client::builder().timeout(timeout).build().unwrap();
        Self {
            http_client,
            base_url,
            api_token,
        }
    }

    async fn get(&self, endpoint: &Endpoint) -> BoardResult<String> {
        let url = format!("{}{}", self.base_url, endpoint);

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.api_token)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => response.text().await.map_err(|_| BoardError::Parse),
            // The store rejects requests with an expired or revoked API token.
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(BoardError::Store(format!(
                "{}. The store API token might have expired.",
                response.status()
            ))),
            _ => Err(BoardError::Store(format!("{}", response.status()))),
        }
    }
}

#[async_trait]
impl LapStore for HttpLapStore {
    async fn fetch_runners_with_counts(&self) -> BoardResult<Vec<RankingEntry>> {
        // Response from the store API. Structs defined here as they are only
        // used by this function.
        use serde::Deserialize;

        #[derive(Debug, Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct StoreRunner {
            number: u32,
            student_number: u32,
            first_name: String,
            last_name: String,
            house: String,
            grade: String,
            laps: u32,
        }

        let body = self.get(&Endpoint::RunnersWithLaps).await?;
        let parsed =
            serde_json::from_str::<Vec<StoreRunner>>(&body).map_err(|_| BoardError::Parse)?;

        Ok(parsed
            .into_iter()
            .map(|r| RankingEntry {
                runner: Runner {
                    number: r.number,
                    student_number: r.student_number,
                    first_name: r.first_name,
                    last_name: r.last_name,
                    house: r.house,
                    grade: r.grade,
                },
                laps: r.laps,
            })
            .collect())
    }

    async fn record_lap(&self, runner_number: u32) -> BoardResult<u32> {
        use serde::Deserialize;

        #[derive(Debug, Deserialize)]
        struct LapResponse {
            laps: u32,
        }

        let url = format!("{}{}", self.base_url, Endpoint::RunnerLaps(runner_number));

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_token)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK | StatusCode::CREATED => response
                .json::<LapResponse>()
                .await
                .map(|r| r.laps)
                .map_err(|_| BoardError::Parse),
            StatusCode::NOT_FOUND => Err(BoardError::Store(format!(
                "{}. No runner with number {}.",
                response.status(),
                runner_number
            ))),
            _ => Err(BoardError::Store(format!("{}", response.status()))),
        }
    }
}
