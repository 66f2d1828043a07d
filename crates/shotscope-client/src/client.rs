//! reqwest implementation of the job service API.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info, info_span, Instrument};

use shotscope_models::{
    CreateJobResponse, DeleteJobResponse, HistoryItem, JobHandle, JobRequest, JobSnapshot,
};

use crate::api::JobApi;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::metrics::record_request;

const API_PREFIX: &str = "/v1/video-analysis";

/// Default number of history entries requested by callers that don't care.
pub const DEFAULT_HISTORY_LIMIT: u32 = 50;

/// HTTP job service client.
#[derive(Clone)]
pub struct HttpJobClient {
    http: Client,
    config: ClientConfig,
}

impl HttpJobClient {
    /// Create a new client.
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(4)
            .user_agent(concat!("shotscope-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ClientError::Network)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> ClientResult<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn jobs_url(&self) -> String {
        format!("{}{}/jobs", self.config.base_url, API_PREFIX)
    }

    fn job_url(&self, job_id: &str) -> String {
        format!(
            "{}{}/jobs/{}",
            self.config.base_url,
            API_PREFIX,
            urlencoding::encode(job_id)
        )
    }

    fn history_url(&self, limit: u32) -> String {
        format!(
            "{}{}/history?limit={}",
            self.config.base_url, API_PREFIX, limit
        )
    }

    /// Send a request and record status and latency.
    async fn send(
        &self,
        operation: &'static str,
        request: reqwest::RequestBuilder,
    ) -> ClientResult<Response> {
        let start = Instant::now();
        let span = info_span!("job_api_request", operation = %operation);

        let response = request.send().instrument(span).await?;
        let status = response.status();
        let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
        record_request(operation, status.as_u16(), latency_ms);

        debug!(
            operation = %operation,
            status = status.as_u16(),
            latency_ms = latency_ms,
            "Job API request finished"
        );

        Ok(response)
    }

    /// Decode a success body, keeping serde errors distinct from transport errors.
    async fn read_json<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn error_body(response: Response) -> String {
        response.text().await.unwrap_or_default()
    }
}

#[async_trait]
impl JobApi for HttpJobClient {
    async fn submit(&self, request: &JobRequest) -> ClientResult<JobHandle> {
        request.validate()?;

        let response = self
            .send("submit", self.http.post(self.jobs_url()).json(request))
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Submission {
                status: status.as_u16(),
                body: Self::error_body(response).await,
            });
        }

        let created: CreateJobResponse = Self::read_json(response).await?;
        if created.job_id.trim().is_empty() {
            return Err(ClientError::invalid_response("job creation returned an empty job_id"));
        }

        info!(
            job_id = %created.job_id,
            mode = %request.mode.as_str(),
            "Analysis job created"
        );

        Ok(JobHandle::new(created.job_id))
    }

    async fn poll(&self, job_id: &str) -> ClientResult<JobSnapshot> {
        let response = self
            .send("poll", self.http.get(self.job_url(job_id)))
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::from_http_status(
                status.as_u16(),
                Self::error_body(response).await,
            ));
        }

        Self::read_json(response).await
    }

    async fn history(&self, limit: u32) -> ClientResult<Vec<HistoryItem>> {
        let response = self
            .send("history", self.http.get(self.history_url(limit)))
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::from_http_status(
                status.as_u16(),
                Self::error_body(response).await,
            ));
        }

        Self::read_json(response).await
    }

    async fn delete(&self, job_id: &str) -> ClientResult<DeleteJobResponse> {
        let response = self
            .send("delete", self.http.delete(self.job_url(job_id)))
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(job_id.to_string()));
        }
        if !status.is_success() {
            return Err(ClientError::from_http_status(
                status.as_u16(),
                Self::error_body(response).await,
            ));
        }

        let ack: DeleteJobResponse = Self::read_json(response).await?;
        info!(job_id = %job_id, success = ack.success, "Job deleted");
        Ok(ack)
    }
}
