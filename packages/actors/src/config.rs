//! Worker configuration.

use thiserror::Error;

/// Default queue the vote result worker consumes.
pub const DEFAULT_QUEUE_ID: &str = "votingapi_queue";

/// Default human-readable title of the worker.
pub const DEFAULT_TITLE: &str = "Vote result queue";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid worker config: {0}")]
    Invalid(String),
}

/// Binding of the vote result worker to a queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerConfig {
    /// Queue name the worker is registered under.
    pub queue_id: String,
    /// Human-readable title.
    pub title: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            queue_id: DEFAULT_QUEUE_ID.to_string(),
            title: DEFAULT_TITLE.to_string(),
        }
    }
}

impl WorkerConfig {
    /// Set the queue name.
    pub fn with_queue_id(mut self, queue_id: impl Into<String>) -> Self {
        self.queue_id = queue_id.into();
        self
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Build a config from environment variables.
    ///
    /// - `VOTE_QUEUE_ID`: queue name (default `votingapi_queue`)
    /// - `VOTE_QUEUE_TITLE`: title (default `Vote result queue`)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut cfg = Self::default();

        if let Some(queue_id) = lookup("VOTE_QUEUE_ID") {
            cfg.queue_id = non_empty("VOTE_QUEUE_ID", queue_id)?;
        }
        if let Some(title) = lookup("VOTE_QUEUE_TITLE") {
            cfg.title = non_empty("VOTE_QUEUE_TITLE", title)?;
        }

        Ok(cfg)
    }
}

fn non_empty(key: &str, value: String) -> Result<String, ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{key} must not be empty")));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::disallowed_methods)]

    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_without_variables() -> Result<(), ConfigError> {
        let cfg = WorkerConfig::from_lookup(lookup(&[]))?;
        assert_eq!(cfg, WorkerConfig::default());
        assert_eq!(cfg.queue_id, "votingapi_queue");
        Ok(())
    }

    #[test]
    fn variables_override_defaults() -> Result<(), ConfigError> {
        let cfg = WorkerConfig::from_lookup(lookup(&[
            ("VOTE_QUEUE_ID", " ratings "),
            ("VOTE_QUEUE_TITLE", "Ratings"),
        ]))?;
        assert_eq!(cfg.queue_id, "ratings");
        assert_eq!(cfg.title, "Ratings");
        Ok(())
    }

    #[test]
    fn empty_queue_id_is_rejected() {
        let result = WorkerConfig::from_lookup(lookup(&[("VOTE_QUEUE_ID", "  ")]));
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }
}
