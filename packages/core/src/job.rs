//! Job domain types: the queue envelope and the vote recalculation descriptor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use ulid::Ulid;

use crate::CacheTag;

/// Unique identifier for a job, using ULID for chronological sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub Ulid);

impl JobId {
    /// Create a new unique job ID.
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Result of a processed job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobResult {
    /// Human-readable summary of the result.
    pub summary: String,
    /// Optional structured output data as JSON.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<serde_json::Value>,
}

impl JobResult {
    pub fn new(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            output: None,
        }
    }

    pub fn with_output(summary: impl Into<String>, output: serde_json::Value) -> Self {
        Self {
            summary: summary.into(),
            output: Some(output),
        }
    }
}

/// A job as delivered by the queue transport.
///
/// The payload is opaque to the transport; handlers decode it into their own
/// descriptor type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    /// Unique identifier for this job.
    pub id: JobId,
    /// Queue the job was enqueued on (used for routing to handlers).
    pub job_type: String,
    /// Job payload as JSON.
    pub payload: serde_json::Value,
    /// When the job was created.
    pub created_at: DateTime<Utc>,
}

impl Job {
    /// Create a new job for the given queue.
    pub fn new(job_type: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            id: JobId::new(),
            job_type: job_type.into(),
            payload,
            created_at: Utc::now(),
        }
    }

    /// Wrap a vote recalculation descriptor for the given queue.
    pub fn vote(job_type: impl Into<String>, descriptor: &VoteJob) -> Result<Self, serde_json::Error> {
        Ok(Self::new(job_type, serde_json::to_value(descriptor)?))
    }
}

/// Request to recalculate the vote results of one entity.
///
/// `entity_type_id` selects the entity schema for the result dispatcher while
/// `entity_type` is the namespace of the entity's cache tag. The two are kept
/// apart even though they usually hold the same machine name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VoteJob {
    pub entity_type_id: String,
    pub entity_type: String,
    #[serde(deserialize_with = "entity_id_from_string_or_int")]
    pub entity_id: String,
    pub vote_type: String,
}

impl VoteJob {
    pub fn new(
        entity_type_id: impl Into<String>,
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
        vote_type: impl Into<String>,
    ) -> Self {
        Self {
            entity_type_id: entity_type_id.into(),
            entity_type: entity_type.into(),
            entity_id: entity_id.into(),
            vote_type: vote_type.into(),
        }
    }

    /// Decode a descriptor from a job payload.
    ///
    /// Every field is required; unknown keys are ignored.
    pub fn from_payload(payload: &serde_json::Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(payload)
    }

    /// Cache tag of the voted-on entity (`entity_type:entity_id`).
    pub fn cache_tag(&self) -> CacheTag {
        CacheTag::for_entity(&self.entity_type, &self.entity_id)
    }
}

/// Entity ids arrive either as strings or as integer ids.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawEntityId {
    Text(String),
    Signed(i64),
    Unsigned(u64),
}

fn entity_id_from_string_or_int<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawEntityId::deserialize(deserializer)? {
        RawEntityId::Text(id) => id,
        RawEntityId::Signed(id) => id.to_string(),
        RawEntityId::Unsigned(id) => id.to_string(),
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::disallowed_methods)]

    use super::*;
    use serde_json::json;

    #[test]
    fn cache_tag_joins_entity_type_and_id() {
        let job = VoteJob::new("node", "node", "42", "percent");
        assert_eq!(job.cache_tag().as_str(), "node:42");
    }

    #[test]
    fn cache_tag_uses_entity_type_not_type_id() {
        let job = VoteJob::new("node_type", "node", "7", "vote");
        assert_eq!(job.cache_tag().as_str(), "node:7");
    }

    #[test]
    fn from_payload_ignores_extra_keys() -> Result<(), serde_json::Error> {
        let payload = json!({
            "entity_type_id": "comment",
            "entity_type": "comment",
            "entity_id": "9",
            "vote_type": "points",
            "queued_by": "vote_form",
        });
        let job = VoteJob::from_payload(&payload)?;
        assert_eq!(job, VoteJob::new("comment", "comment", "9", "points"));
        Ok(())
    }

    #[test]
    fn from_payload_accepts_integer_entity_id() -> Result<(), serde_json::Error> {
        let payload = json!({
            "entity_type_id": "node",
            "entity_type": "node",
            "entity_id": 42,
            "vote_type": "percent",
        });
        let job = VoteJob::from_payload(&payload)?;
        assert_eq!(job.entity_id, "42");
        assert_eq!(job.cache_tag().as_str(), "node:42");
        Ok(())
    }

    #[test]
    fn from_payload_rejects_non_scalar_entity_id() {
        let payload = json!({
            "entity_type_id": "node",
            "entity_type": "node",
            "entity_id": { "id": 42 },
            "vote_type": "percent",
        });
        assert!(VoteJob::from_payload(&payload).is_err());
    }

    #[test]
    fn from_payload_rejects_missing_field() {
        let payload = json!({
            "entity_type_id": "node",
            "entity_id": "42",
            "vote_type": "percent",
        });
        let err = VoteJob::from_payload(&payload).unwrap_err();
        assert!(err.to_string().contains("entity_type"));
    }

    #[test]
    fn vote_job_wraps_descriptor_in_envelope() -> Result<(), serde_json::Error> {
        let descriptor = VoteJob::new("node", "node", "42", "percent");
        let job = Job::vote("votingapi_queue", &descriptor)?;
        assert_eq!(job.job_type, "votingapi_queue");
        assert_eq!(VoteJob::from_payload(&job.payload)?, descriptor);
        Ok(())
    }
}
