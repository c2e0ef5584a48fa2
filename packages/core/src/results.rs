//! Vote result functions and the recalculation dispatcher.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while recalculating vote results.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("Unknown entity type: {0}")]
    UnknownEntityType(String),
    #[error("Unknown vote type: {0}")]
    UnknownVoteType(String),
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Recalculates and persists the aggregate vote results of one entity.
pub trait ResultFunctionDispatcher: Send + Sync {
    fn recalculate(
        &self,
        entity_type_id: &str,
        entity_id: &str,
        vote_type: &str,
    ) -> Result<(), DispatchError>;
}

/// A single cast vote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vote {
    pub value: f64,
    pub user_id: String,
    pub timestamp: DateTime<Utc>,
}

impl Vote {
    pub fn new(value: f64, user_id: impl Into<String>) -> Self {
        Self {
            value,
            user_id: user_id.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Aggregate produced by one result function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoteResult {
    pub function: String,
    pub value: f64,
    pub timestamp: DateTime<Utc>,
}

/// An aggregation rule over the votes of one entity and vote type.
pub trait ResultFunction: Send + Sync + 'static {
    fn id(&self) -> &str;

    fn calculate(&self, votes: &[Vote]) -> f64;
}

/// Number of votes.
pub struct CountFunction;

impl ResultFunction for CountFunction {
    fn id(&self) -> &str {
        "vote_count"
    }

    fn calculate(&self, votes: &[Vote]) -> f64 {
        votes.len() as f64
    }
}

/// Sum of vote values.
pub struct SumFunction;

impl ResultFunction for SumFunction {
    fn id(&self) -> &str {
        "vote_sum"
    }

    fn calculate(&self, votes: &[Vote]) -> f64 {
        votes.iter().map(|v| v.value).sum()
    }
}

/// Mean vote value, 0 when there are no votes.
pub struct AverageFunction;

impl ResultFunction for AverageFunction {
    fn id(&self) -> &str {
        "vote_average"
    }

    fn calculate(&self, votes: &[Vote]) -> f64 {
        if votes.is_empty() {
            return 0.0;
        }
        votes.iter().map(|v| v.value).sum::<f64>() / votes.len() as f64
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ResultKey {
    entity_type_id: String,
    entity_id: String,
    vote_type: String,
}

impl ResultKey {
    fn new(entity_type_id: &str, entity_id: &str, vote_type: &str) -> Self {
        Self {
            entity_type_id: entity_type_id.to_string(),
            entity_id: entity_id.to_string(),
            vote_type: vote_type.to_string(),
        }
    }
}

#[derive(Debug, Default)]
struct VoteStore {
    votes: HashMap<ResultKey, Vec<Vote>>,
    results: HashMap<ResultKey, Vec<VoteResult>>,
}

/// In-memory result function registry and vote store.
///
/// Entity types, vote types and functions are registered up front; votes and
/// results can then be read and written through a shared reference.
#[derive(Default)]
pub struct ResultFunctionManager {
    functions: BTreeMap<String, Arc<dyn ResultFunction>>,
    entity_types: BTreeSet<String>,
    vote_types: BTreeSet<String>,
    store: RwLock<VoteStore>,
}

impl ResultFunctionManager {
    /// Create an empty manager with no functions registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a manager with the count, sum and average functions registered.
    pub fn with_default_functions() -> Self {
        let mut manager = Self::new();
        manager.register_function(CountFunction);
        manager.register_function(SumFunction);
        manager.register_function(AverageFunction);
        manager
    }

    pub fn register_function<F: ResultFunction>(&mut self, function: F) {
        let id = function.id().to_string();
        self.functions.insert(id, Arc::new(function));
    }

    pub fn register_entity_type(&mut self, entity_type_id: impl Into<String>) {
        self.entity_types.insert(entity_type_id.into());
    }

    pub fn register_vote_type(&mut self, vote_type: impl Into<String>) {
        self.vote_types.insert(vote_type.into());
    }

    /// List registered function ids.
    pub fn function_ids(&self) -> Vec<&str> {
        self.functions.keys().map(|s| s.as_str()).collect()
    }

    /// Record a vote. Results are not touched until the next recalculation.
    pub fn add_vote(
        &self,
        entity_type_id: &str,
        entity_id: &str,
        vote_type: &str,
        vote: Vote,
    ) -> Result<(), DispatchError> {
        self.check_types(entity_type_id, vote_type)?;
        let mut store = self
            .store
            .write()
            .map_err(|_| DispatchError::Storage("vote store lock poisoned".into()))?;
        store
            .votes
            .entry(ResultKey::new(entity_type_id, entity_id, vote_type))
            .or_default()
            .push(vote);
        Ok(())
    }

    /// Stored results for an entity, empty if never calculated.
    pub fn results(
        &self,
        entity_type_id: &str,
        entity_id: &str,
        vote_type: &str,
    ) -> Result<Vec<VoteResult>, DispatchError> {
        let store = self
            .store
            .read()
            .map_err(|_| DispatchError::Storage("vote store lock poisoned".into()))?;
        Ok(store
            .results
            .get(&ResultKey::new(entity_type_id, entity_id, vote_type))
            .cloned()
            .unwrap_or_default())
    }

    /// Stored value of one function's result.
    pub fn result_value(
        &self,
        entity_type_id: &str,
        entity_id: &str,
        vote_type: &str,
        function: &str,
    ) -> Result<Option<f64>, DispatchError> {
        Ok(self
            .results(entity_type_id, entity_id, vote_type)?
            .into_iter()
            .find(|r| r.function == function)
            .map(|r| r.value))
    }

    fn check_types(&self, entity_type_id: &str, vote_type: &str) -> Result<(), DispatchError> {
        if !self.entity_types.contains(entity_type_id) {
            return Err(DispatchError::UnknownEntityType(entity_type_id.to_string()));
        }
        if !self.vote_types.contains(vote_type) {
            return Err(DispatchError::UnknownVoteType(vote_type.to_string()));
        }
        Ok(())
    }
}

impl ResultFunctionDispatcher for ResultFunctionManager {
    fn recalculate(
        &self,
        entity_type_id: &str,
        entity_id: &str,
        vote_type: &str,
    ) -> Result<(), DispatchError> {
        self.check_types(entity_type_id, vote_type)?;

        let key = ResultKey::new(entity_type_id, entity_id, vote_type);
        let mut store = self
            .store
            .write()
            .map_err(|_| DispatchError::Storage("vote store lock poisoned".into()))?;

        let now = Utc::now();
        let votes = store.votes.get(&key).map(Vec::as_slice).unwrap_or_default();
        let results: Vec<VoteResult> = self
            .functions
            .values()
            .map(|function| VoteResult {
                function: function.id().to_string(),
                value: function.calculate(votes),
                timestamp: now,
            })
            .collect();

        tracing::debug!(
            entity_type_id,
            entity_id,
            vote_type,
            votes = votes.len(),
            "Recalculated vote results"
        );

        store.results.insert(key, results);
        Ok(())
    }
}
