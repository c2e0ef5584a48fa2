//! Message types for actor communication.

use ractor::RpcReplyPort;
use serde::{Deserialize, Serialize};
use votequeue_core::Job;

use crate::handler::HandlerResult;

/// Messages for the WorkerActor.
#[derive(Debug)]
pub enum WorkerMessage {
    /// Process a delivered job and reply with the handler's outcome.
    ProcessJob {
        job: Box<Job>,
        reply: RpcReplyPort<HandlerResult>,
    },

    /// List the queues this worker has handlers for.
    ListQueues { reply: RpcReplyPort<Vec<String>> },

    /// Get worker counters.
    GetStats { reply: RpcReplyPort<WorkerStats> },

    /// Shutdown the worker.
    Shutdown,
}

/// Counters kept by a worker actor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerStats {
    /// Jobs whose handler returned successfully.
    pub completed: u64,
    /// Jobs whose handler failed or had no handler.
    pub failed: u64,
}
