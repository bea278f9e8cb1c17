//! REST client for the Pub/Sub emulator.
//!
//! The emulator serves the HTTP/JSON flavour of the v1 API on the same port
//! as gRPC, so provisioning needs nothing beyond plain HTTP requests.
//!
//! ## API Endpoints
//!
//! - `GET /v1/projects/{project}/topics/{topic}` - Get topic details
//! - `PUT /v1/projects/{project}/topics/{topic}` - Create a topic
//! - `GET /v1/projects/{project}/subscriptions/{subscription}` - Get subscription details
//! - `PUT /v1/projects/{project}/subscriptions/{subscription}` - Create a subscription
//! - `DELETE /v1/projects/{project}/subscriptions/{subscription}` - Delete a subscription

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Error;
use crate::pubsub::admin::{PubsubAdmin, SubscriptionSpec};
use crate::types::ResourceName;
use crate::Result;

/// Per-request timeout for admin calls.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Error response format for Google Cloud APIs.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    /// Error details.
    pub error: ErrorDetail,
}

/// Error detail information.
#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    /// HTTP status code.
    #[serde(default)]
    pub code: u16,
    /// Error message.
    pub message: String,
    /// Error status string, e.g. `ALREADY_EXISTS`.
    #[serde(default)]
    pub status: Option<String>,
}

/// Topic resource representation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    /// Topic name (projects/{project}/topics/{topic}).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// A Pub/Sub subscription.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    /// Subscription name (projects/{project}/subscriptions/{subscription}).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Topic name (projects/{project}/topics/{topic}).
    pub topic: String,
    /// Push configuration. Absent for pull subscriptions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub push_config: Option<PushConfig>,
    /// Acknowledgment deadline in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ack_deadline_seconds: Option<i32>,
    /// Dead letter policy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dead_letter_policy: Option<DeadLetterPolicy>,
}

/// Push configuration for a subscription.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushConfig {
    /// HTTP endpoint for push delivery. Empty for pull subscriptions.
    #[serde(default)]
    pub push_endpoint: String,
}

/// Dead letter policy for a subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeadLetterPolicy {
    /// Dead letter topic name.
    pub dead_letter_topic: String,
    /// Maximum delivery attempts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_delivery_attempts: Option<i32>,
}

/// [`PubsubAdmin`] over the emulator's REST surface.
#[derive(Debug, Clone)]
pub struct RestAdmin {
    client: reqwest::Client,
    base_url: String,
    project_id: String,
}

impl RestAdmin {
    /// Create a client for the emulator at `emulator_host` (`host:port`, or a
    /// full `http://` URL).
    pub fn new(emulator_host: &str, project_id: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self::with_client(client, emulator_host, project_id))
    }

    /// Create a client reusing an existing `reqwest::Client`.
    pub fn with_client(client: reqwest::Client, emulator_host: &str, project_id: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url(emulator_host),
            project_id: project_id.into(),
        }
    }

    /// Root URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, name: &ResourceName) -> String {
        format!("{}{}", self.base_url, name.rest_path())
    }

    async fn exists(&self, name: &ResourceName) -> Result<bool> {
        let url = self.url(name);
        debug!(url = %url, "REST: Get");

        let response = self.client.get(&url).send().await?;
        match response.status() {
            status if status.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            _ => Err(api_error(response).await),
        }
    }
}

fn base_url(emulator_host: &str) -> String {
    let host = emulator_host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("http://{}", host)
    }
}

/// Convert a non-success response into [`Error::Api`], preferring the
/// message from the Google error envelope.
async fn api_error(response: Response) -> Error {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();

    let message = match serde_json::from_str::<ErrorResponse>(&body) {
        Ok(envelope) => envelope.error.message,
        Err(_) if body.trim().is_empty() => StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("unknown error")
            .to_string(),
        Err(_) => body.trim().to_string(),
    };

    Error::Api { status, message }
}

#[async_trait]
impl PubsubAdmin for RestAdmin {
    fn project_id(&self) -> &str {
        &self.project_id
    }

    async fn topic_exists(&self, topic_id: &str) -> Result<bool> {
        self.exists(&ResourceName::topic(&self.project_id, topic_id)).await
    }

    async fn create_topic(&self, topic_id: &str) -> Result<Topic> {
        let url = self.url(&ResourceName::topic(&self.project_id, topic_id));
        debug!(url = %url, "REST: CreateTopic");

        let response = self.client.put(&url).json(&Topic::default()).send().await?;
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        Ok(response.json().await?)
    }

    async fn subscription_exists(&self, subscription_id: &str) -> Result<bool> {
        self.exists(&ResourceName::subscription(&self.project_id, subscription_id))
            .await
    }

    async fn delete_subscription(&self, subscription_id: &str) -> Result<()> {
        let url = self.url(&ResourceName::subscription(&self.project_id, subscription_id));
        debug!(url = %url, "REST: DeleteSubscription");

        let response = self.client.delete(&url).send().await?;
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        Ok(())
    }

    async fn create_subscription(&self, subscription_id: &str, spec: &SubscriptionSpec) -> Result<Subscription> {
        let url = self.url(&ResourceName::subscription(&self.project_id, subscription_id));
        debug!(url = %url, topic = %spec.topic, "REST: CreateSubscription");

        let response = self.client.put(&url).json(&spec.to_resource()).send().await?;
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        Ok(response.json().await?)
    }
}
