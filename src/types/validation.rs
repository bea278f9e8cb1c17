//! Validation functions for project, topic, and subscription IDs.

use crate::error::ValidationError;
use crate::Result;

/// Minimum length of a topic or subscription ID.
pub const MIN_RESOURCE_ID_LEN: usize = 3;

/// Maximum length of a topic or subscription ID.
pub const MAX_RESOURCE_ID_LEN: usize = 255;

/// Pub/Sub topic ID validation (3-255 chars, must start with letter).
pub fn validate_topic_id(topic_id: &str) -> Result<()> {
    check_resource_id(topic_id, "Topic").map_err(|reason| ValidationError::InvalidTopicId(reason).into())
}

/// Pub/Sub subscription ID validation (3-255 chars, must start with letter).
pub fn validate_subscription_id(subscription_id: &str) -> Result<()> {
    check_resource_id(subscription_id, "Subscription")
        .map_err(|reason| ValidationError::InvalidSubscriptionId(reason).into())
}

/// Project ID validation.
///
/// Emulators accept arbitrary dummy project IDs, so only the characters that
/// would break a resource path are rejected.
pub fn validate_project_id(project_id: &str) -> Result<()> {
    if project_id.is_empty() {
        return Err(ValidationError::InvalidProjectId("Project ID must not be empty".to_string()).into());
    }

    if let Some(ch) = project_id.chars().find(|ch| *ch == '/' || ch.is_whitespace()) {
        return Err(ValidationError::InvalidProjectId(format!(
            "Project ID contains invalid character: {:?}",
            ch
        ))
        .into());
    }

    Ok(())
}

fn check_resource_id(id: &str, label: &str) -> std::result::Result<(), String> {
    if id.len() < MIN_RESOURCE_ID_LEN || id.len() > MAX_RESOURCE_ID_LEN {
        return Err(format!(
            "{} ID must be {}-{} characters, got {}",
            label, MIN_RESOURCE_ID_LEN, MAX_RESOURCE_ID_LEN,
            id.len()
        ));
    }

    if !id.starts_with(|ch: char| ch.is_ascii_alphabetic()) {
        return Err(format!("{} ID must start with a letter", label));
    }

    // Reserved by Pub/Sub.
    if id.starts_with("goog") {
        return Err(format!("{} ID must not start with \"goog\"", label));
    }

    for ch in id.chars() {
        if !matches!(ch, 'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' | '.' | '~' | '+' | '%') {
            return Err(format!("{} ID contains invalid character: '{}'", label, ch));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_pubsub_topic_id_validation() {
        // Valid IDs
        assert!(validate_topic_id("abc").is_ok());
        assert!(validate_topic_id("orders-dlt").is_ok());
        assert!(validate_topic_id("my_topic.v1~a+b%20").is_ok());

        // Invalid IDs
        assert!(validate_topic_id("ab").is_err()); // too short
        assert!(validate_topic_id(&"a".repeat(256)).is_err()); // too long
        assert!(validate_topic_id("123topic").is_err()); // must start with letter
        assert!(validate_topic_id("goog-topic").is_err()); // reserved prefix
        assert!(validate_topic_id("my topic").is_err());
    }

    #[test]
    fn test_subscription_id_invalid_character() {
        let result = validate_subscription_id("sub@invalid");

        match result {
            Err(Error::Validation(ValidationError::InvalidSubscriptionId(msg))) => {
                assert!(msg.contains("invalid character"));
            }
            _ => panic!("Expected InvalidSubscriptionId error"),
        }
    }

    #[test]
    fn test_project_id_validation() {
        assert!(validate_project_id("local-project").is_ok());
        assert!(validate_project_id("test").is_ok()); // dummy IDs are fine
        assert!(validate_project_id("").is_err());
        assert!(validate_project_id("a/b").is_err());
        assert!(validate_project_id("my project").is_err());
    }
}
