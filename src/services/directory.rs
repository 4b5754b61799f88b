use crate::error::PaydeskError;
use crate::models::StudentIdentity;
use crate::services::{BreakerState, CircuitBreaker};
use anyhow::{bail, Context};
use std::sync::Arc;
use std::time::Duration;

/// Result of one guarded lookup against the student directory.
///
/// `NotFound` is a well-formed answer from the directory and does not count
/// against the breaker; `Unavailable` covers breaker-open short circuits and
/// transport-level failures, carrying the cause for logging.
#[derive(Debug, Clone)]
pub enum LookupOutcome {
    Found(StudentIdentity),
    NotFound,
    Unavailable(String),
}

pub struct StudentDirectoryClient {
    base_url: String,
    client: reqwest::Client,
    breaker: Arc<CircuitBreaker>,
}

impl StudentDirectoryClient {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        breaker: Arc<CircuitBreaker>,
    ) -> Result<Self, PaydeskError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PaydeskError::ConfigError(e.to_string()))?;

        Ok(Self {
            base_url: base_url.into(),
            client,
            breaker,
        })
    }

    pub fn breaker_state(&self) -> BreakerState {
        self.breaker.state()
    }

    /// Look up a student by id. The caller observes a single blocking result;
    /// timeouts, connection errors, and non-success statuses are counted by
    /// the breaker and folded into `Unavailable`.
    pub async fn lookup(&self, student_id: i64) -> LookupOutcome {
        let url = format!("{}/{}", self.base_url, student_id);
        tracing::info!(%url, "Calling student directory");

        let result = self
            .breaker
            .call(|| async {
                let response = self
                    .client
                    .get(&url)
                    .send()
                    .await
                    .context("student directory request failed")?;

                // 404 = well-formed "no such student", not a dependency failure
                if response.status() == reqwest::StatusCode::NOT_FOUND {
                    return Ok(None);
                }

                if !response.status().is_success() {
                    bail!("student directory returned status {}", response.status());
                }

                let identity: Option<StudentIdentity> = response
                    .json()
                    .await
                    .context("undecodable student directory response")?;

                Ok(identity)
            })
            .await;

        match result {
            Ok(Some(identity)) => {
                tracing::info!(student_id = identity.student_id, "Student found");
                LookupOutcome::Found(identity)
            }
            Ok(None) => {
                tracing::info!(student_id, "Student directory reported no such student");
                LookupOutcome::NotFound
            }
            Err(e) => {
                tracing::error!(student_id, error = %e, "Student directory lookup failed");
                LookupOutcome::Unavailable(e.to_string())
            }
        }
    }
}
