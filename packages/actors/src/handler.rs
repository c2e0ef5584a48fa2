//! Job handler trait and registry.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use thiserror::Error;
use votequeue_core::{DispatchError, Job, JobResult};

/// Errors surfaced to the queue transport when a job cannot be processed.
///
/// None of these are recovered locally; the transport decides whether to
/// retry or discard the job.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("Malformed job payload: {0}")]
    MalformedPayload(#[source] serde_json::Error),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error("No handler for queue: {0}")]
    NoHandler(String),
}

/// Result type for job handlers.
pub type HandlerResult = Result<JobResult, JobError>;

/// Future type for async job handlers.
pub type HandlerFuture = Pin<Box<dyn Future<Output = HandlerResult> + Send>>;

/// Trait for job handlers.
///
/// Implement this trait to define how jobs delivered on a queue are processed.
pub trait JobHandler: Send + Sync + 'static {
    /// The queue this handler consumes.
    fn job_type(&self) -> &str;

    /// Human-readable name of the handler.
    fn title(&self) -> &str {
        self.job_type()
    }

    /// Process a job and return the result.
    fn handle(&self, job: &Job) -> HandlerFuture;
}

/// Registry for job handlers.
///
/// Maps queue names to their handlers for dynamic dispatch.
#[derive(Default)]
pub struct JobHandlerRegistry {
    handlers: HashMap<String, Arc<dyn JobHandler>>,
}

impl JobHandlerRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a handler under its queue name, replacing any previous one.
    pub fn register<H: JobHandler>(&mut self, handler: H) {
        let job_type = handler.job_type().to_string();
        tracing::debug!(queue = %job_type, title = handler.title(), "Registered job handler");
        self.handlers.insert(job_type, Arc::new(handler));
    }

    /// Get a handler for a queue.
    pub fn get(&self, job_type: &str) -> Option<Arc<dyn JobHandler>> {
        self.handlers.get(job_type).cloned()
    }

    /// List all registered queue names.
    pub fn job_types(&self) -> Vec<&str> {
        self.handlers.keys().map(|s| s.as_str()).collect()
    }
}

/// A simple function-based job handler.
pub struct FnHandler<F>
where
    F: Fn(&Job) -> HandlerFuture + Send + Sync + 'static,
{
    job_type: String,
    handler: F,
}

impl<F> FnHandler<F>
where
    F: Fn(&Job) -> HandlerFuture + Send + Sync + 'static,
{
    /// Create a new function-based handler.
    pub fn new(job_type: impl Into<String>, handler: F) -> Self {
        Self {
            job_type: job_type.into(),
            handler,
        }
    }
}

impl<F> JobHandler for FnHandler<F>
where
    F: Fn(&Job) -> HandlerFuture + Send + Sync + 'static,
{
    fn job_type(&self) -> &str {
        &self.job_type
    }

    fn handle(&self, job: &Job) -> HandlerFuture {
        (self.handler)(job)
    }
}
