//! Common data types for setup-pubsub-emulator.

pub mod validation;

use serde::{Deserialize, Serialize};
use std::fmt;

/// A fully-qualified Pub/Sub resource name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ResourceName {
    /// Topic resource: projects/{project}/topics/{topic}
    Topic {
        /// The project ID
        project: String,
        /// The topic ID
        topic: String,
    },
    /// Subscription resource: projects/{project}/subscriptions/{subscription}
    Subscription {
        /// The project ID
        project: String,
        /// The subscription ID
        subscription: String,
    },
}

impl ResourceName {
    /// Build a topic resource name.
    pub fn topic(project: impl Into<String>, topic: impl Into<String>) -> Self {
        ResourceName::Topic {
            project: project.into(),
            topic: topic.into(),
        }
    }

    /// Build a subscription resource name.
    pub fn subscription(project: impl Into<String>, subscription: impl Into<String>) -> Self {
        ResourceName::Subscription {
            project: project.into(),
            subscription: subscription.into(),
        }
    }

    /// Get the resource ID (topic or subscription).
    pub fn resource_id(&self) -> &str {
        match self {
            ResourceName::Topic { topic, .. } => topic,
            ResourceName::Subscription { subscription, .. } => subscription,
        }
    }

    /// Path of this resource under the emulator's v1 REST root.
    pub fn rest_path(&self) -> String {
        format!("/v1/{}", self)
    }
}

impl fmt::Display for ResourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceName::Topic { project, topic } => {
                write!(f, "projects/{}/topics/{}", project, topic)
            }
            ResourceName::Subscription {
                project,
                subscription,
            } => {
                write!(f, "projects/{}/subscriptions/{}", project, subscription)
            }
        }
    }
}

/// Role a provisioned resource plays in the local topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Topic receiving messages that exhausted their delivery attempts.
    DeadLetterTopic,
    /// Topic the application publishes to.
    MainTopic,
    /// Pull subscription on the main topic.
    PullSubscription,
}

impl ResourceKind {
    /// Label used in log lines, e.g. "DLT topic".
    pub fn label(&self) -> &'static str {
        match self {
            ResourceKind::DeadLetterTopic => "DLT topic",
            ResourceKind::MainTopic => "Main topic",
            ResourceKind::PullSubscription => "Subscription",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_name_formatting() {
        let topic = ResourceName::topic("test-project", "test-topic");
        assert_eq!(topic.to_string(), "projects/test-project/topics/test-topic");
        assert_eq!(topic.rest_path(), "/v1/projects/test-project/topics/test-topic");

        let sub = ResourceName::subscription("test-project", "test-sub");
        assert_eq!(sub.to_string(), "projects/test-project/subscriptions/test-sub");
        assert_eq!(sub.resource_id(), "test-sub");
    }

    #[test]
    fn test_resource_kind_labels() {
        assert_eq!(ResourceKind::DeadLetterTopic.to_string(), "DLT topic");
        assert_eq!(ResourceKind::MainTopic.to_string(), "Main topic");
        assert_eq!(ResourceKind::PullSubscription.label(), "Subscription");
    }
}
