//! Core domain types for the vote result queue.
//!
//! This crate contains the types shared by the worker and its hosts:
//! - Job envelope and the `VoteJob` recalculation descriptor
//! - Cache tags and the `CacheInvalidator` contract
//! - The `ResultFunctionDispatcher` contract and an in-memory implementation

mod cache;
mod job;
mod results;

pub use cache::{CacheInvalidator, CacheTag, MemoryTagCache};
pub use job::{Job, JobId, JobResult, VoteJob};
pub use results::{
    AverageFunction, CountFunction, DispatchError, ResultFunction, ResultFunctionDispatcher,
    ResultFunctionManager, SumFunction, Vote, VoteResult,
};
