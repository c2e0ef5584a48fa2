//! Vote result queue worker and its actor host.
//!
//! # Architecture
//!
//! - `VoteResultWorker` - `JobHandler` that recalculates vote results for an
//!   entity and invalidates the entity's cache tag
//! - `JobHandlerRegistry` - maps queue names to handlers
//! - `WorkerActor` - routes delivered jobs to their handler and replies with
//!   the outcome
//!
//! # Usage
//!
//! ```ignore
//! use actors::{JobHandlerRegistry, VoteResultWorker, WorkerConfig, start_worker};
//!
//! let mut handlers = JobHandlerRegistry::new();
//! handlers.register(VoteResultWorker::with_config(WorkerConfig::from_env()?, dispatcher, cache));
//! let (worker, handle) = start_worker("worker-1", handlers).await?;
//! ```

mod config;
mod handler;
mod messages;
pub mod telemetry;
mod vote_worker;
mod worker_actor;

pub use config::{ConfigError, DEFAULT_QUEUE_ID, DEFAULT_TITLE, WorkerConfig};
pub use handler::{FnHandler, HandlerFuture, HandlerResult, JobError, JobHandler, JobHandlerRegistry};
pub use messages::{WorkerMessage, WorkerStats};
pub use vote_worker::VoteResultWorker;
pub use worker_actor::{WorkerActor, WorkerArgs, start_worker};

/// Re-export ractor types for convenience.
pub use ractor::{Actor, ActorRef, RpcReplyPort, concurrency};
