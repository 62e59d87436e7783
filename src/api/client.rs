use std::time::Duration;

use reqwest::multipart;
use reqwest::{Client, Response};
use serde_json::{json, Value};

use super::error::ApiError;
use super::types::*;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const HEALTH_TIMEOUT: Duration = Duration::from_secs(10);
pub const SEARCH_RESULT_LIMIT: u32 = 10;

/// Thin typed wrapper over the aggregator's HTTP/SSE surface.
///
/// Two clients: `client` carries a hard timeout for request/response
/// calls; `stream_client` has none so the event stream and the pipeline
/// monitor can stay open indefinitely.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    stream_client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
            stream_client: Client::builder().build().unwrap_or_default(),
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Non-2xx responses become `ApiError::Status` with the body text.
    async fn check(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(ApiError::Status { code: status.as_u16(), message })
    }

    // --- Session / monitoring -------------------------------------------

    pub async fn create_session(&self) -> Result<SessionResponse, ApiError> {
        let resp = self.client.post(self.url("/session")).send().await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    pub async fn get_audio_devices(&self) -> Result<Vec<DeviceDescriptor>, ApiError> {
        let resp = self.client.get(self.url("/audio-devices")).send().await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    pub async fn start_monitoring(&self, session_id: &str) -> Result<(), ApiError> {
        let resp = self
            .client
            .post(self.url("/monitoring/start"))
            .json(&json!({ "sessionId": session_id }))
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    pub async fn stop_monitoring(&self) -> Result<(), ApiError> {
        let resp = self.client.post(self.url("/monitoring/stop")).send().await?;
        Self::check(resp).await?;
        Ok(())
    }

    // --- Video analytics ------------------------------------------------

    pub async fn start_video_analytics(
        &self,
        pipelines: &[PipelineRequest],
        session_id: &str,
    ) -> Result<StartAnalyticsResponse, ApiError> {
        let resp = self
            .client
            .post(self.url("/video-analytics/start"))
            .json(&json!({ "pipelines": pipelines, "sessionId": session_id }))
            .send()
            .await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    pub async fn stop_video_analytics(
        &self,
        pipelines: &[PipelineStopRequest],
        session_id: &str,
    ) -> Result<(), ApiError> {
        let resp = self
            .client
            .post(self.url("/video-analytics/stop"))
            .json(&json!({ "pipelines": pipelines, "sessionId": session_id }))
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    /// Long-lived pipeline-health stream (newline-delimited JSON updates).
    /// The caller owns cancellation.
    pub async fn monitor_stream(&self, session_id: &str) -> Result<Response, ApiError> {
        let resp = self
            .stream_client
            .get(self.url("/video-analytics/monitor"))
            .query(&[("sessionId", session_id)])
            .send()
            .await?;
        Self::check(resp).await
    }

    // --- Audio ----------------------------------------------------------

    pub async fn stop_microphone(&self, session_id: &str) -> Result<(), ApiError> {
        let resp = self
            .client
            .post(self.url("/microphone/stop"))
            .json(&json!({ "sessionId": session_id }))
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    pub async fn upload_audio(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadResponse, ApiError> {
        let part = multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = multipart::Form::new().part("file", part);
        let resp = self
            .client
            .post(self.url("/audio/upload"))
            .multipart(form)
            .send()
            .await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    // --- Search / segmentation ------------------------------------------

    pub async fn start_content_segmentation(&self, session_id: &str) -> Result<(), ApiError> {
        let resp = self
            .client
            .post(self.url("/content-segmentation"))
            .json(&json!({ "sessionId": session_id }))
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    pub async fn search(
        &self,
        session_id: &str,
        query: &str,
        limit: u32,
    ) -> Result<SearchResponse, ApiError> {
        let resp = self
            .client
            .get(self.url("/search"))
            .query(&[
                ("sessionId", session_id),
                ("query", query),
                ("limit", &limit.to_string()),
            ])
            .send()
            .await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    // --- Event stream ---------------------------------------------------

    /// Opens the server-push event stream. Exactly one connection may be
    /// live at a time; the ingestor enforces that.
    pub async fn events_stream(&self) -> Result<Response, ApiError> {
        let resp = self
            .stream_client
            .get(self.url("/events"))
            .header("Accept", "text/event-stream")
            .send()
            .await?;
        Self::check(resp).await
    }

    // --- Health-suite control plane -------------------------------------

    pub async fn ping(&self) -> bool {
        let fut = self.client.get(self.url("/health")).send();
        let resp = match tokio::time::timeout(HEALTH_TIMEOUT, fut).await {
            Ok(Ok(resp)) => resp,
            _ => return false,
        };
        if !resp.status().is_success() {
            return false;
        }
        match resp.json::<Value>().await {
            Ok(v) => matches!(v.get("status").and_then(Value::as_str), Some("healthy") | Some("ok")),
            Err(_) => false,
        }
    }

    pub async fn platform_info(&self) -> Result<Value, ApiError> {
        let resp = self.client.get(self.url("/platform-info")).send().await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    pub async fn resource_metrics(&self) -> Result<Value, ApiError> {
        let resp = self.client.get(self.url("/metrics")).send().await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    pub async fn workload_devices(&self) -> Result<Value, ApiError> {
        let resp = self.client.get(self.url("/workload-devices")).send().await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    pub async fn streaming_status(&self) -> Result<StreamingStatus, ApiError> {
        let resp = self.client.get(self.url("/streaming-status")).send().await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    pub async fn start_workloads(
        &self,
        target: WorkloadTarget,
    ) -> Result<StartWorkloadsResponse, ApiError> {
        let resp = self
            .client
            .post(self.url("/start"))
            .query(&[("target", target.as_str())])
            .send()
            .await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    pub async fn stop_workloads(
        &self,
        target: WorkloadTarget,
    ) -> Result<StopWorkloadsResponse, ApiError> {
        let resp = self
            .client
            .post(self.url("/stop"))
            .query(&[("target", target.as_str())])
            .send()
            .await?;
        Ok(Self::check(resp).await?.json().await?)
    }
}
