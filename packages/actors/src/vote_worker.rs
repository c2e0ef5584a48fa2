//! Worker that recalculates vote results and invalidates the entity's cache tag.

use std::collections::BTreeSet;
use std::sync::Arc;

use votequeue_core::{
    CacheInvalidator, DispatchError, Job, JobId, JobResult, ResultFunctionDispatcher, VoteJob,
};

use crate::config::WorkerConfig;
use crate::handler::{HandlerFuture, HandlerResult, JobError, JobHandler};

/// Queue worker for vote result recalculation.
///
/// Collaborators are injected at construction and shared across jobs; the
/// worker itself holds no per-job state.
#[derive(Clone)]
pub struct VoteResultWorker {
    config: WorkerConfig,
    dispatcher: Arc<dyn ResultFunctionDispatcher>,
    cache: Arc<dyn CacheInvalidator>,
}

impl VoteResultWorker {
    /// Create a worker bound to the default queue.
    pub fn new(
        dispatcher: Arc<dyn ResultFunctionDispatcher>,
        cache: Arc<dyn CacheInvalidator>,
    ) -> Self {
        Self::with_config(WorkerConfig::default(), dispatcher, cache)
    }

    pub fn with_config(
        config: WorkerConfig,
        dispatcher: Arc<dyn ResultFunctionDispatcher>,
        cache: Arc<dyn CacheInvalidator>,
    ) -> Self {
        Self {
            config,
            dispatcher,
            cache,
        }
    }

    /// Recalculate the results for one entity, then invalidate its cache tag.
    ///
    /// Invalidation only happens once recalculation succeeded. Dispatcher
    /// errors are returned as-is.
    pub fn process(&self, job: &VoteJob) -> Result<(), DispatchError> {
        self.dispatcher
            .recalculate(&job.entity_type_id, &job.entity_id, &job.vote_type)?;

        let tag = job.cache_tag();
        tracing::debug!(
            entity_type_id = %job.entity_type_id,
            vote_type = %job.vote_type,
            cache_tag = %tag,
            "Vote results recalculated, invalidating cache tag"
        );
        self.cache.invalidate(&BTreeSet::from([tag]));

        Ok(())
    }

    fn run(&self, job_id: JobId, payload: &serde_json::Value) -> HandlerResult {
        let descriptor = VoteJob::from_payload(payload).map_err(|e| {
            tracing::warn!(%job_id, error = %e, "Rejecting vote job with malformed payload");
            JobError::MalformedPayload(e)
        })?;

        if let Err(e) = self.process(&descriptor) {
            tracing::warn!(%job_id, error = %e, "Vote result recalculation failed");
            return Err(e.into());
        }

        let tag = descriptor.cache_tag();
        Ok(JobResult::with_output(
            format!("Recalculated vote results for {tag}"),
            serde_json::json!({ "cache_tag": tag.as_str() }),
        ))
    }
}

impl JobHandler for VoteResultWorker {
    fn job_type(&self) -> &str {
        &self.config.queue_id
    }

    fn title(&self) -> &str {
        &self.config.title
    }

    fn handle(&self, job: &Job) -> HandlerFuture {
        let worker = self.clone();
        let job_id = job.id;
        let payload = job.payload.clone();

        Box::pin(async move { worker.run(job_id, &payload) })
    }
}
