#![allow(dead_code)]

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use votequeue_core::{CacheInvalidator, CacheTag, DispatchError, ResultFunctionDispatcher};

/// A collaborator call, in the order it was made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Recalculate {
        entity_type_id: String,
        entity_id: String,
        vote_type: String,
    },
    Invalidate(Vec<String>),
}

pub type CallLog = Arc<Mutex<Vec<Call>>>;

pub fn call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn recalculate(entity_type_id: &str, entity_id: &str, vote_type: &str) -> Call {
    Call::Recalculate {
        entity_type_id: entity_type_id.to_string(),
        entity_id: entity_id.to_string(),
        vote_type: vote_type.to_string(),
    }
}

pub fn invalidate(tags: &[&str]) -> Call {
    Call::Invalidate(tags.iter().map(|t| t.to_string()).collect())
}

/// Dispatcher that records calls and optionally fails.
pub struct RecordingDispatcher {
    log: CallLog,
    failure: Option<DispatchError>,
}

impl RecordingDispatcher {
    pub fn new(log: CallLog) -> Self {
        Self { log, failure: None }
    }

    pub fn failing(log: CallLog, failure: DispatchError) -> Self {
        Self {
            log,
            failure: Some(failure),
        }
    }
}

impl ResultFunctionDispatcher for RecordingDispatcher {
    fn recalculate(
        &self,
        entity_type_id: &str,
        entity_id: &str,
        vote_type: &str,
    ) -> Result<(), DispatchError> {
        self.log
            .lock()
            .unwrap()
            .push(recalculate(entity_type_id, entity_id, vote_type));
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

/// Cache invalidator that records the tags it receives.
pub struct RecordingCache {
    log: CallLog,
}

impl RecordingCache {
    pub fn new(log: CallLog) -> Self {
        Self { log }
    }
}

impl CacheInvalidator for RecordingCache {
    fn invalidate(&self, tags: &BTreeSet<CacheTag>) {
        self.log.lock().unwrap().push(Call::Invalidate(
            tags.iter().map(|t| t.as_str().to_string()).collect(),
        ));
    }
}

pub fn calls(log: &CallLog) -> Vec<Call> {
    log.lock().unwrap().clone()
}
