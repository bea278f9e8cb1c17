//! Admin operations needed to provision topics and subscriptions.

use async_trait::async_trait;

use crate::config::SubscriptionSettings;
use crate::pubsub::rest::{DeadLetterPolicy, Subscription, Topic};
use crate::types::ResourceName;
use crate::Result;

/// Desired configuration of a pull subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionSpec {
    /// Topic the subscription reads from.
    pub topic: ResourceName,
    /// Topic receiving messages after `max_delivery_attempts` failures.
    pub dead_letter_topic: ResourceName,
    /// Delivery attempts before dead-lettering.
    pub max_delivery_attempts: i32,
    /// Acknowledgement deadline in seconds.
    pub ack_deadline_seconds: i32,
}

impl SubscriptionSpec {
    /// Build a spec from subscription settings.
    pub fn new(topic: ResourceName, dead_letter_topic: ResourceName, settings: SubscriptionSettings) -> Self {
        Self {
            topic,
            dead_letter_topic,
            max_delivery_attempts: settings.max_delivery_attempts,
            ack_deadline_seconds: settings.ack_deadline_seconds,
        }
    }

    /// Request body for creating the subscription. No push config, so the
    /// subscription is pull-only.
    pub fn to_resource(&self) -> Subscription {
        Subscription {
            name: None,
            topic: self.topic.to_string(),
            push_config: None,
            ack_deadline_seconds: Some(self.ack_deadline_seconds),
            dead_letter_policy: Some(DeadLetterPolicy {
                dead_letter_topic: self.dead_letter_topic.to_string(),
                max_delivery_attempts: Some(self.max_delivery_attempts),
            }),
        }
    }
}

/// Pub/Sub admin client.
#[async_trait]
pub trait PubsubAdmin: Send + Sync {
    /// Project all resources belong to.
    fn project_id(&self) -> &str;

    /// Check whether a topic exists.
    async fn topic_exists(&self, topic_id: &str) -> Result<bool>;

    /// Create a topic.
    async fn create_topic(&self, topic_id: &str) -> Result<Topic>;

    /// Check whether a subscription exists.
    async fn subscription_exists(&self, subscription_id: &str) -> Result<bool>;

    /// Delete a subscription.
    async fn delete_subscription(&self, subscription_id: &str) -> Result<()>;

    /// Create a subscription.
    async fn create_subscription(&self, subscription_id: &str, spec: &SubscriptionSpec) -> Result<Subscription>;
}
