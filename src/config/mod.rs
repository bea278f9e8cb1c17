//! Configuration system for setup-pubsub-emulator.
//!
//! Settings come from the process environment (optionally seeded from a
//! `.env` file in local mode) through the [`Cli`] parser, then get validated
//! into a [`SetupConfig`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cli::Cli;
use crate::error::{Error, ValidationError};
use crate::types::validation::{validate_project_id, validate_subscription_id, validate_topic_id};
use crate::types::ResourceName;
use crate::Result;

/// Runtime environment name.
pub const ENVVAR_ENV: &str = "ENV";
/// Log level.
pub const ENVVAR_LOG_LEVEL: &str = "LOG_LEVEL";
/// Emulator `host:port`.
pub const ENVVAR_EMULATOR_HOST: &str = "PUBSUB_EMULATOR_HOST";
/// Project ID.
pub const ENVVAR_PROJECT_ID: &str = "PUBSUB_PROJECT_ID";
/// Main topic ID.
pub const ENVVAR_TOPIC_ID: &str = "PUB_SUB_TOPIC_ID";
/// Subscription ID.
pub const ENVVAR_SUBSCRIPTION_ID: &str = "PUB_SUB_SUBSCRIPTION_ID";
/// Dead-letter topic ID.
pub const ENVVAR_DLT_TOPIC_ID: &str = "DLT_TOPIC_ID";

/// Environment name that turns on `.env` loading and human-readable logs.
pub const LOCAL_ENV: &str = "local";

/// `.env` location relative to the working directory.
pub const DEFAULT_ENV_FILE: &str = "../setup-pubsub-emulator/.env";

/// Returns true when `env` names the local development environment.
pub fn is_local(env: Option<&str>) -> bool {
    env == Some(LOCAL_ENV)
}

/// Load a `.env` file when running locally.
///
/// Variables already present in the process environment win over the file.
/// Returns the path that was loaded, or `None` outside local mode.
pub fn load_dotenv(env: Option<&str>, path: Option<&Path>) -> Result<Option<PathBuf>> {
    if !is_local(env) {
        return Ok(None);
    }

    let path = match path {
        Some(path) => path.to_path_buf(),
        None => std::env::current_dir()?.join(DEFAULT_ENV_FILE),
    };

    dotenvy::from_path(&path)
        .map_err(|e| Error::Config(format!("Error loading .env file {}: {}", path.display(), e)))?;

    Ok(Some(path))
}

/// Validated settings for one provisioning run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetupConfig {
    /// Emulator `host:port`.
    pub emulator_host: String,
    /// Project ID.
    pub project_id: String,
    /// Main topic ID.
    pub topic_id: String,
    /// Pull subscription ID.
    pub subscription_id: String,
    /// Dead-letter topic ID.
    pub dlt_topic_id: String,
    /// Subscription settings.
    pub subscription: SubscriptionSettings,
    /// Readiness polling settings.
    pub readiness: ReadinessSettings,
}

/// Settings applied to the pull subscription.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SubscriptionSettings {
    /// Delivery attempts before dead-lettering.
    pub max_delivery_attempts: i32,
    /// Acknowledgement deadline in seconds.
    pub ack_deadline_seconds: i32,
}

impl Default for SubscriptionSettings {
    fn default() -> Self {
        Self {
            max_delivery_attempts: 10,
            ack_deadline_seconds: 60,
        }
    }
}

/// How long and how often to poll for the emulator port.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ReadinessSettings {
    /// Total time to wait.
    pub timeout: Duration,
    /// Delay between attempts.
    pub poll_interval: Duration,
}

impl Default for ReadinessSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            poll_interval: Duration::from_secs(2),
        }
    }
}

impl SetupConfig {
    /// Build and validate the configuration from parsed CLI arguments.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let emulator_host = non_empty(cli.emulator_host.as_deref()).ok_or_else(|| {
            ValidationError::MissingVariable(format!(
                "{} environment variable not set. Please set it to e.g., 'localhost:8085'",
                ENVVAR_EMULATOR_HOST
            ))
        })?;

        let project_id = non_empty(cli.project_id.as_deref()).ok_or_else(|| {
            ValidationError::MissingVariable(format!(
                "{} environment variable not set. Please set it to your dummy project ID.",
                ENVVAR_PROJECT_ID
            ))
        })?;

        let ids = (
            non_empty(cli.topic_id.as_deref()),
            non_empty(cli.subscription_id.as_deref()),
            non_empty(cli.dlt_topic_id.as_deref()),
        );
        let (topic_id, subscription_id, dlt_topic_id) = match ids {
            (Some(topic), Some(sub), Some(dlt)) => (topic, sub, dlt),
            _ => {
                return Err(ValidationError::MissingVariable(format!(
                    "{}, {}, or {} environment variable(s) not set.",
                    ENVVAR_TOPIC_ID, ENVVAR_SUBSCRIPTION_ID, ENVVAR_DLT_TOPIC_ID
                ))
                .into())
            }
        };

        let config = Self {
            emulator_host,
            project_id,
            topic_id,
            subscription_id,
            dlt_topic_id,
            subscription: SubscriptionSettings {
                max_delivery_attempts: cli.max_delivery_attempts,
                ack_deadline_seconds: cli.ack_deadline_seconds,
            },
            readiness: ReadinessSettings {
                timeout: Duration::from_secs(cli.wait_timeout_secs),
                poll_interval: Duration::from_secs(cli.poll_interval_secs),
            },
        };
        config.validate()?;

        debug!(
            emulator_host = %config.emulator_host,
            project_id = %config.project_id,
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        validate_project_id(&self.project_id)?;
        validate_topic_id(&self.dlt_topic_id)?;
        validate_topic_id(&self.topic_id)?;
        validate_subscription_id(&self.subscription_id)?;

        if self.topic_id == self.dlt_topic_id {
            return Err(ValidationError::InvalidParameter {
                name: ENVVAR_DLT_TOPIC_ID.to_string(),
                reason: "dead-letter topic must differ from the main topic".to_string(),
            }
            .into());
        }

        Ok(())
    }

    /// Main topic resource name.
    pub fn topic(&self) -> ResourceName {
        ResourceName::topic(&self.project_id, &self.topic_id)
    }

    /// Dead-letter topic resource name.
    pub fn dlt_topic(&self) -> ResourceName {
        ResourceName::topic(&self.project_id, &self.dlt_topic_id)
    }

    /// Subscription resource name.
    pub fn subscription_name(&self) -> ResourceName {
        ResourceName::subscription(&self.project_id, &self.subscription_id)
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn cli() -> Cli {
        Cli {
            env: None,
            log_level: None,
            emulator_host: Some("localhost:8085".to_string()),
            project_id: Some("local-project".to_string()),
            topic_id: Some("orders".to_string()),
            subscription_id: Some("orders-worker".to_string()),
            dlt_topic_id: Some("orders-dlt".to_string()),
            max_delivery_attempts: 10,
            ack_deadline_seconds: 60,
            wait_timeout_secs: 30,
            poll_interval_secs: 2,
            env_file: None,
            output: "text".to_string(),
        }
    }

    fn missing_message(result: Result<SetupConfig>) -> String {
        match result {
            Err(Error::Validation(ValidationError::MissingVariable(msg))) => msg,
            other => panic!("Expected MissingVariable error, got {:?}", other),
        }
    }

    #[test]
    fn test_from_cli_valid() {
        let config = SetupConfig::from_cli(&cli()).unwrap();
        assert_eq!(config.emulator_host, "localhost:8085");
        assert_eq!(config.topic().to_string(), "projects/local-project/topics/orders");
        assert_eq!(config.dlt_topic().to_string(), "projects/local-project/topics/orders-dlt");
        assert_eq!(
            config.subscription_name().to_string(),
            "projects/local-project/subscriptions/orders-worker"
        );
        assert_eq!(config.subscription.max_delivery_attempts, 10);
        assert_eq!(config.readiness.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_missing_emulator_host() {
        let mut args = cli();
        args.emulator_host = Some("   ".to_string());
        let msg = missing_message(SetupConfig::from_cli(&args));
        assert!(msg.starts_with("PUBSUB_EMULATOR_HOST environment variable not set"));
    }

    #[test]
    fn test_missing_project_checked_after_host() {
        let mut args = cli();
        args.emulator_host = None;
        args.project_id = None;
        let msg = missing_message(SetupConfig::from_cli(&args));
        assert!(msg.contains("PUBSUB_EMULATOR_HOST"));

        args.emulator_host = Some("localhost:8085".to_string());
        let msg = missing_message(SetupConfig::from_cli(&args));
        assert!(msg.starts_with("PUBSUB_PROJECT_ID environment variable not set"));
    }

    #[test]
    fn test_missing_resource_ids_share_one_message() {
        for clear in 0..3 {
            let mut args = cli();
            match clear {
                0 => args.topic_id = None,
                1 => args.subscription_id = Some(String::new()),
                _ => args.dlt_topic_id = None,
            }
            let msg = missing_message(SetupConfig::from_cli(&args));
            assert_eq!(
                msg,
                "PUB_SUB_TOPIC_ID, PUB_SUB_SUBSCRIPTION_ID, or DLT_TOPIC_ID environment variable(s) not set."
            );
        }
    }

    #[test]
    fn test_invalid_topic_id_rejected() {
        let mut args = cli();
        args.topic_id = Some("1orders".to_string());
        let result = SetupConfig::from_cli(&args);
        assert!(matches!(
            result,
            Err(Error::Validation(ValidationError::InvalidTopicId(_)))
        ));
    }

    #[test]
    fn test_dlt_must_differ_from_topic() {
        let mut args = cli();
        args.dlt_topic_id = Some("orders".to_string());
        let result = SetupConfig::from_cli(&args);
        assert!(matches!(
            result,
            Err(Error::Validation(ValidationError::InvalidParameter { .. }))
        ));
    }

    #[test]
    fn test_load_dotenv_skipped_outside_local() {
        let loaded = load_dotenv(Some("production"), Some(Path::new("/nonexistent/.env"))).unwrap();
        assert!(loaded.is_none());
        assert!(load_dotenv(None, None).unwrap().is_none());
    }

    #[test]
    fn test_load_dotenv_missing_file_is_error() {
        let result = load_dotenv(Some("local"), Some(Path::new("/nonexistent/setup/.env")));
        match result {
            Err(Error::Config(msg)) => assert!(msg.starts_with("Error loading .env file")),
            other => panic!("Expected Config error, got {:?}", other),
        }
    }

    fn write_env_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("setup-pubsub-emulator-{}-{}.env", name, std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "{}", contents).unwrap();
        path
    }

    #[test]
    fn test_load_dotenv_reads_file() {
        let path = write_env_file("reads", "SETUP_PUBSUB_EMULATOR_DOTENV_READ=from-file");

        let loaded = load_dotenv(Some("local"), Some(&path)).unwrap();
        assert_eq!(loaded.as_deref(), Some(path.as_path()));
        assert_eq!(
            std::env::var("SETUP_PUBSUB_EMULATOR_DOTENV_READ").as_deref(),
            Ok("from-file")
        );

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_load_dotenv_keeps_existing_variables() {
        std::env::set_var("SETUP_PUBSUB_EMULATOR_DOTENV_KEEP", "from-process");
        let path = write_env_file(
            "keeps",
            "SETUP_PUBSUB_EMULATOR_DOTENV_KEEP=from-file\nSETUP_PUBSUB_EMULATOR_DOTENV_NEW=from-file",
        );

        load_dotenv(Some("local"), Some(&path)).unwrap();
        assert_eq!(
            std::env::var("SETUP_PUBSUB_EMULATOR_DOTENV_KEEP").as_deref(),
            Ok("from-process")
        );
        assert_eq!(
            std::env::var("SETUP_PUBSUB_EMULATOR_DOTENV_NEW").as_deref(),
            Ok("from-file")
        );

        std::fs::remove_file(&path).unwrap();
    }
}
