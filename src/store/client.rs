use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use super::error::StoreError;
use super::types::{FileEntry, Stage, WorkItem};
use super::{ItemSink, ItemSource};

const API_URL: &str = "https://paratranz.cn/api";

/// How many items the store returns per page.
const PAGE_SIZE: u32 = 20;

/// HTTP client for the ParaTranz project API.
///
/// Implements [`ItemSource`] and [`ItemSink`] against
/// `/projects/{id}/files` and `/projects/{id}/strings`.
pub struct ParatranzClient {
    api_key: String,
    project_id: i64,
    client: Client,
    base_url: String,
}

/// Wire shape of one string row. `original` may be absent or empty, in which
/// case the row's `key` stands in as the source text.
#[derive(Debug, Deserialize)]
struct RawItem {
    id: i64,
    #[serde(default)]
    key: String,
    #[serde(default)]
    original: String,
    #[serde(default)]
    context: Option<String>,
    #[serde(default)]
    stage: i64,
}

impl RawItem {
    fn into_work_item(self) -> WorkItem {
        let source = if self.original.is_empty() {
            self.key
        } else {
            self.original
        };
        WorkItem {
            id: self.id,
            source,
            context: self.context.filter(|c| !c.is_empty()),
            stage: Stage::from(self.stage),
        }
    }
}

/// The strings endpoint has been observed wrapping the rows in `results`,
/// in `data`, or returning a bare array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PagePayload {
    Results { results: Vec<RawItem> },
    Data { data: Vec<RawItem> },
    Bare(Vec<RawItem>),
}

impl PagePayload {
    fn into_items(self) -> Vec<RawItem> {
        match self {
            PagePayload::Results { results } => results,
            PagePayload::Data { data } => data,
            PagePayload::Bare(items) => items,
        }
    }
}

impl ParatranzClient {
    pub fn new(api_key: String, project_id: i64) -> Self {
        Self::with_base_url(api_key, project_id, API_URL.to_string())
    }

    /// Create a client pointing at a custom base URL (useful for testing).
    pub fn with_base_url(api_key: String, project_id: i64, base_url: String) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(60))
            .build()
            .expect("failed to build HTTP client");
        Self {
            api_key,
            project_id,
            client,
            base_url,
        }
    }

    fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
    }

    async fn api_error(response: reqwest::Response) -> StoreError {
        let status = response.status().as_u16();
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "unknown error".to_string());
        StoreError::Api { status, message }
    }
}

impl ItemSource for ParatranzClient {
    async fn list_files(&self) -> Result<Vec<FileEntry>, StoreError> {
        let url = format!("{}/projects/{}/files", self.base_url, self.project_id);
        let response = self.auth(self.client.get(&url)).send().await?;

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }
        Ok(response.json::<Vec<FileEntry>>().await?)
    }

    async fn fetch_page(
        &self,
        file_id: i64,
        stage_filter: Option<Stage>,
        page: u32,
    ) -> Result<Vec<WorkItem>, StoreError> {
        let url = format!("{}/projects/{}/strings", self.base_url, self.project_id);
        let mut query: Vec<(&str, String)> = vec![
            ("file", file_id.to_string()),
            ("page", page.to_string()),
            ("pageSize", PAGE_SIZE.to_string()),
        ];
        if let Some(stage) = stage_filter {
            query.push(("stage", i64::from(stage).to_string()));
        }

        let response = self.auth(self.client.get(&url)).query(&query).send().await?;
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        let payload = response.json::<PagePayload>().await?;
        let mut items: Vec<WorkItem> = payload
            .into_items()
            .into_iter()
            .map(RawItem::into_work_item)
            .collect();

        // The server-side stage filter is not always honored; re-filter
        // locally so a requested stage never leaks other rows.
        if let Some(stage) = stage_filter {
            items.retain(|item| item.stage == stage);
        }

        debug!(file_id, page, count = items.len(), "fetched page");
        Ok(items)
    }
}

impl ItemSink for ParatranzClient {
    async fn write_back(
        &self,
        item_id: i64,
        text: &str,
        as_review: bool,
    ) -> Result<(), StoreError> {
        let stage = if as_review {
            Stage::Reviewed
        } else {
            Stage::Translated
        };
        let payload = json!({
            "translation": text,
            "stage": i64::from(stage),
        });

        let url = format!(
            "{}/projects/{}/strings/{}",
            self.base_url, self.project_id, item_id
        );
        let response = self.auth(self.client.put(&url)).json(&payload).send().await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        // Some deployments only expose the bare strings route; try it once
        // before reporting the failure.
        if status == reqwest::StatusCode::NOT_FOUND {
            warn!(item_id, "project strings route missing, trying bare route");
            let alt_url = format!("{}/strings/{}", self.base_url, item_id);
            let alt = self
                .auth(self.client.put(&alt_url))
                .json(&payload)
                .send()
                .await?;
            if alt.status().is_success() {
                return Ok(());
            }
            return Err(Self::api_error(alt).await);
        }

        Err(Self::api_error(response).await)
    }
}
