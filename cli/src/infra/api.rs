//! HTTP implementation of the Remote Run Service ports.
//!
//! One `reqwest::Client` is shared across all calls. Non-2xx responses go
//! through the `ApiError` mapping; the redacted plan fetch is the only
//! call with its own bounded retry.

use std::time::Duration;

use anyhow::{Context, Result};
use futures_util::TryStreamExt;
use serde::de::DeserializeOwned;
use tokio::io::BufReader;
use tokio_util::io::StreamReader;

use crate::application::ports::{
    CostEstimateClient, LogStream, OrganizationClient, PlanClient, PolicyClient, RunClient,
    WorkspaceClient,
};
use crate::domain::{
    ApiError, Capacity, CostEstimate, Operation, Page, PolicyCheck, QueuedRun, Run, StratoConfig,
    Workspace,
};

/// Attempts for the redacted plan fetch beyond the first try.
const REDACTED_RETRY_MAX: u32 = 10;
const REDACTED_RETRY_WAIT_MIN: Duration = Duration::from_millis(100);
const REDACTED_RETRY_WAIT_MAX: Duration = Duration::from_millis(400);

/// Production client for the remote run service.
pub struct HttpRunService {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl HttpRunService {
    /// Build a client from the validated configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when the underlying HTTP client cannot be
    /// constructed.
    pub fn new(config: &StratoConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("strato/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            base_url: config.base_url(),
            token: config.token.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn get(&self, path: &str) -> Result<reqwest::Response> {
        let resp = self
            .http
            .get(self.url(path))
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;
        check_response(resp).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        Ok(self.get(path).await?.json().await?)
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T> {
        let resp = self
            .http
            .post(self.url(path))
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await?;
        Ok(check_response(resp).await?.json().await?)
    }

    async fn post_action(&self, path: &str) -> Result<()> {
        let resp = self
            .http
            .post(self.url(path))
            .bearer_auth(&self.token)
            .send()
            .await?;
        check_response(resp).await?;
        Ok(())
    }
}

/// Map a non-2xx response through the structured error mapping.
async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let status_line = format!(
        "{} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("")
    );
    let body = resp.bytes().await.unwrap_or_default();
    Err(ApiError::from_response(status.as_u16(), status_line.trim(), &body).into())
}

impl RunClient for HttpRunService {
    async fn read_run(&self, id: &str) -> Result<Run> {
        self.get_json(&format!("runs/{id}")).await
    }

    async fn read_run_expanded(&self, id: &str) -> Result<Run> {
        self.get_json(&format!("runs/{id}?include=plan,workspace"))
            .await
    }

    async fn list_runs(&self, workspace_id: &str, page: u32) -> Result<Page<Run>> {
        self.get_json(&format!("workspaces/{workspace_id}/runs?page={page}"))
            .await
    }

    async fn create_run(&self, workspace_id: &str, operation: &Operation) -> Result<Run> {
        let body = serde_json::json!({
            "workspace-id": workspace_id,
            "is-destroy": operation.op_type.is_destroy(),
            "plan-only": operation.op_type.is_plan_only(),
        });
        self.post_json("runs", &body).await
    }

    async fn apply_run(&self, id: &str) -> Result<()> {
        self.post_action(&format!("runs/{id}/actions/apply")).await
    }

    async fn discard_run(&self, id: &str) -> Result<()> {
        self.post_action(&format!("runs/{id}/actions/discard"))
            .await
    }
}

impl WorkspaceClient for HttpRunService {
    async fn read_workspace(&self, organization: &str, name: &str) -> Result<Workspace> {
        self.get_json(&format!("organizations/{organization}/workspaces/{name}"))
            .await
    }
}

impl CostEstimateClient for HttpRunService {
    async fn read_cost_estimate(&self, id: &str) -> Result<CostEstimate> {
        self.get_json(&format!("cost-estimates/{id}")).await
    }
}

impl PolicyClient for HttpRunService {
    async fn read_policy_check(&self, id: &str) -> Result<PolicyCheck> {
        self.get_json(&format!("policy-checks/{id}")).await
    }

    async fn policy_check_logs(&self, id: &str) -> Result<LogStream> {
        let resp = self.get(&format!("policy-checks/{id}/logs")).await?;
        let stream = resp.bytes_stream().map_err(std::io::Error::other);
        Ok(Box::new(BufReader::new(StreamReader::new(Box::pin(
            stream,
        )))))
    }

    async fn override_policy_check(&self, id: &str) -> Result<()> {
        self.post_action(&format!("policy-checks/{id}/actions/override"))
            .await
    }
}

impl OrganizationClient for HttpRunService {
    async fn read_run_queue(&self, organization: &str, page: u32) -> Result<Page<QueuedRun>> {
        self.get_json(&format!("organizations/{organization}/run-queue?page={page}"))
            .await
    }

    async fn read_capacity(&self, organization: &str) -> Result<Capacity> {
        self.get_json(&format!("organizations/{organization}/capacity"))
            .await
    }
}

impl PlanClient for HttpRunService {
    async fn read_plan_json(&self, plan_id: &str) -> Result<Vec<u8>> {
        Ok(self
            .get(&format!("plans/{plan_id}/json-output"))
            .await?
            .bytes()
            .await?
            .to_vec())
    }

    async fn read_redacted_plan_json(&self, plan_id: &str) -> Result<Vec<u8>> {
        let path = format!("plans/{plan_id}/json-output-redacted");
        let mut attempt = 0;
        loop {
            match self.get(&path).await {
                Ok(resp) => return Ok(resp.bytes().await?.to_vec()),
                Err(err) => {
                    if attempt >= REDACTED_RETRY_MAX || !retryable(&err) {
                        return Err(err);
                    }
                    tokio::time::sleep(retry_wait(attempt)).await;
                    attempt += 1;
                }
            }
        }
    }
}

/// An unauthorized or missing plan will not appear by retrying; transport
/// failures and server errors might.
fn retryable(err: &anyhow::Error) -> bool {
    !matches!(
        err.downcast_ref::<ApiError>(),
        Some(ApiError::Unauthorized | ApiError::NotFound)
    )
}

/// Exponential wait between redacted-plan retries, bounded to
/// `[100ms, 400ms]`.
fn retry_wait(attempt: u32) -> Duration {
    let wait = REDACTED_RETRY_WAIT_MIN.saturating_mul(2u32.saturating_pow(attempt));
    wait.min(REDACTED_RETRY_WAIT_MAX)
}

// ── Unit tests ────────────────────────────────────────────────────────────────
