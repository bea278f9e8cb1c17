//! Provisioning of the local Pub/Sub topology.
//!
//! Order matters: the dead-letter topic has to exist before a subscription
//! can reference it, and the main topic before anything can subscribe to it.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tabled::Tabled;
use tracing::{info, warn};

use crate::config::SetupConfig;
use crate::pubsub::{PubsubAdmin, SubscriptionSpec};
use crate::types::{ResourceKind, ResourceName};
use crate::Result;

/// What happened to a resource during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Resource did not exist and was created.
    Created,
    /// Resource already existed and was left untouched.
    AlreadyExists,
    /// Resource existed and was deleted then created again.
    Recreated,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Outcome::Created => "created",
            Outcome::AlreadyExists => "already exists",
            Outcome::Recreated => "recreated",
        };
        f.write_str(text)
    }
}

/// One line of the provisioning report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Tabled)]
pub struct ProvisionedResource {
    /// Role of the resource.
    pub kind: ResourceKind,
    /// Fully-qualified resource name.
    pub name: String,
    /// What the run did to it.
    pub outcome: Outcome,
}

/// Result of a full provisioning run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionReport {
    /// Project the resources live in.
    pub project_id: String,
    /// Resources in the order they were handled.
    pub resources: Vec<ProvisionedResource>,
}

/// Ensures topics and the pull subscription exist on the emulator.
pub struct Provisioner {
    admin: Arc<dyn PubsubAdmin>,
}

impl Provisioner {
    /// Create a provisioner backed by `admin`.
    pub fn new(admin: Arc<dyn PubsubAdmin>) -> Self {
        Self { admin }
    }

    /// Create the topic if it is missing. An existing topic is kept as is.
    pub async fn ensure_topic(&self, kind: ResourceKind, topic_id: &str) -> Result<ProvisionedResource> {
        let label = kind.label();
        let name = ResourceName::topic(self.admin.project_id(), topic_id);

        info!(topic_id = %topic_id, "Creating {} '{}'...", label, topic_id);

        let exists = self
            .admin
            .topic_exists(topic_id)
            .await
            .map_err(|e| e.during(format!("check {} existence", label)))?;

        let outcome = if exists {
            warn!(topic_id = %topic_id, "{} '{}' already exists.", label, topic_id);
            Outcome::AlreadyExists
        } else {
            self.admin
                .create_topic(topic_id)
                .await
                .map_err(|e| e.during(format!("create {} '{}'", label, topic_id)))?;
            info!(topic_id = %topic_id, "{} '{}' created successfully.", label, topic_id);
            Outcome::Created
        };

        Ok(ProvisionedResource {
            kind,
            name: name.to_string(),
            outcome,
        })
    }

    /// Create the subscription, deleting any existing one first so its
    /// configuration always matches `spec`.
    pub async fn recreate_subscription(&self, subscription_id: &str, spec: &SubscriptionSpec) -> Result<ProvisionedResource> {
        let name = ResourceName::subscription(self.admin.project_id(), subscription_id);

        info!(
            subscription_id = %subscription_id,
            topic = %spec.topic,
            "Creating PULL subscription '{}' to topic '{}'...",
            subscription_id,
            spec.topic.resource_id()
        );

        let exists = self
            .admin
            .subscription_exists(subscription_id)
            .await
            .map_err(|e| e.during("check subscription existence"))?;

        if exists {
            warn!(
                subscription_id = %subscription_id,
                "Subscription '{}' already exists. Deleting and recreating for fresh config.",
                subscription_id
            );
            self.admin
                .delete_subscription(subscription_id)
                .await
                .map_err(|e| e.during(format!("delete existing subscription '{}'", subscription_id)))?;
            info!(subscription_id = %subscription_id, "Existing subscription '{}' deleted.", subscription_id);
        }

        self.admin
            .create_subscription(subscription_id, spec)
            .await
            .map_err(|e| e.during(format!("create pull subscription '{}'", subscription_id)))?;
        info!(
            subscription_id = %subscription_id,
            dead_letter_topic = %spec.dead_letter_topic,
            max_delivery_attempts = spec.max_delivery_attempts,
            ack_deadline_seconds = spec.ack_deadline_seconds,
            "PULL subscription '{}' created successfully.",
            subscription_id
        );

        Ok(ProvisionedResource {
            kind: ResourceKind::PullSubscription,
            name: name.to_string(),
            outcome: if exists { Outcome::Recreated } else { Outcome::Created },
        })
    }

    /// Provision the dead-letter topic, the main topic, and the subscription.
    pub async fn run(&self, config: &SetupConfig) -> Result<ProvisionReport> {
        let mut resources = Vec::with_capacity(3);

        resources.push(
            self.ensure_topic(ResourceKind::DeadLetterTopic, &config.dlt_topic_id)
                .await?,
        );
        resources.push(self.ensure_topic(ResourceKind::MainTopic, &config.topic_id).await?);

        let spec = SubscriptionSpec::new(config.topic(), config.dlt_topic(), config.subscription);
        resources.push(
            self.recreate_subscription(&config.subscription_id, &spec)
                .await?,
        );

        info!("Pub/Sub emulator setup complete.");

        Ok(ProvisionReport {
            project_id: config.project_id.clone(),
            resources,
        })
    }
}
