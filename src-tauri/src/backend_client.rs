use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::{header::COOKIE, Client};
use serde_json::Value;
use url::Url;

use crate::{planner_task::PlannerTask, session_bridge::SessionSource};
use crate::{DUE_DATES_ENDPOINT, LOGIN_STATE_ENDPOINT};

#[derive(Debug, thiserror::Error)]
pub(crate) enum BackendError {
    #[error("invalid endpoint url: {0}")]
    Url(#[from] url::ParseError),
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("unexpected status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("malformed response: {0}")]
    Decode(String),
}

/// Read side of the planning backend used by the poll tick.
///
/// Both calls fail soft: errors are logged and mapped to a safe default.
#[async_trait]
pub(crate) trait PlannerBackend: Send + Sync {
    async fn fetch_login_state(&self) -> bool;
    async fn fetch_due_tasks(&self) -> Vec<PlannerTask>;
}

pub(crate) struct HttpPlannerBackend {
    client: Client,
    base_url: Url,
    session: Arc<dyn SessionSource>,
}

impl HttpPlannerBackend {
    pub(crate) fn new(
        base_url: Url,
        timeout: Duration,
        session: Arc<dyn SessionSource>,
    ) -> Result<Self, String> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| format!("Failed to build backend http client: {error}"))?;
        Ok(Self {
            client,
            base_url,
            session,
        })
    }

    async fn get_json(&self, endpoint: &str) -> Result<Value, BackendError> {
        let url = self.base_url.join(endpoint)?;
        // Recomputed per request so login/logout in the window is picked up.
        let session_header = self.session.current_session_header();

        let mut request = self.client.get(url);
        if !session_header.is_empty() {
            request = request.header(COOKIE, session_header);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Status { status, body });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|error| BackendError::Decode(error.to_string()))
    }

    async fn try_fetch_login_state(&self) -> Result<bool, BackendError> {
        let value = self.get_json(LOGIN_STATE_ENDPOINT).await?;
        Ok(is_truthy(&value))
    }

    async fn try_fetch_due_tasks(&self) -> Result<Vec<PlannerTask>, BackendError> {
        match self.get_json(DUE_DATES_ENDPOINT).await? {
            Value::Null => Ok(Vec::new()),
            Value::Array(items) => Ok(parse_task_items(items)),
            other => Err(BackendError::Decode(format!(
                "expected a task array, got {}",
                json_kind(&other)
            ))),
        }
    }
}

#[async_trait]
impl PlannerBackend for HttpPlannerBackend {
    async fn fetch_login_state(&self) -> bool {
        match self.try_fetch_login_state().await {
            Ok(logged_in) => logged_in,
            Err(error) => {
                tracing::warn!("login state check failed: {error}");
                false
            }
        }
    }

    async fn fetch_due_tasks(&self) -> Vec<PlannerTask> {
        match self.try_fetch_due_tasks().await {
            Ok(tasks) => tasks,
            Err(error) => {
                tracing::warn!("due-date fetch failed: {error}");
                Vec::new()
            }
        }
    }
}

fn parse_task_items(items: Vec<Value>) -> Vec<PlannerTask> {
    items
        .into_iter()
        .filter(|item| !item.is_null())
        .filter_map(
            |item| match serde_json::from_value::<PlannerTask>(item) {
                Ok(task) => Some(task),
                Err(error) => {
                    tracing::warn!("skipping malformed task entry: {error}");
                    None
                }
            },
        )
        .collect()
}

/// JavaScript-style truthiness for the login indicator.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
