//! Worker actor for executing delivered jobs.

use std::sync::Arc;

use ractor::{Actor, ActorProcessingErr, ActorRef};

use crate::handler::{JobError, JobHandlerRegistry};
use crate::messages::{WorkerMessage, WorkerStats};

/// State for the worker actor.
pub struct WorkerActorState {
    /// Unique worker ID.
    pub worker_id: String,
    /// Handler registry.
    pub handlers: Arc<JobHandlerRegistry>,
    /// Outcome counters.
    pub stats: WorkerStats,
}

/// Worker actor arguments.
pub struct WorkerArgs {
    pub worker_id: String,
    pub handlers: Arc<JobHandlerRegistry>,
}

/// Worker actor that routes each delivered job to the handler registered for
/// its queue.
///
/// Jobs are handled one at a time, without timeout or retry. The outcome is
/// replied to the sender, which owns retry and dead-letter policy.
pub struct WorkerActor;

impl Actor for WorkerActor {
    type Msg = WorkerMessage;
    type State = WorkerActorState;
    type Arguments = WorkerArgs;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        args: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        tracing::info!(
            queues = ?args.handlers.job_types(),
            "Starting worker: {}",
            args.worker_id
        );

        Ok(WorkerActorState {
            worker_id: args.worker_id,
            handlers: args.handlers,
            stats: WorkerStats::default(),
        })
    }

    async fn handle(
        &self,
        myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            WorkerMessage::ProcessJob { job, reply } => {
                let result = match state.handlers.get(&job.job_type) {
                    Some(handler) => handler.handle(&job).await,
                    None => Err(JobError::NoHandler(job.job_type.clone())),
                };

                match &result {
                    Ok(_) => {
                        state.stats.completed += 1;
                        tracing::debug!(job_id = %job.id, queue = %job.job_type, "Job completed");
                    }
                    Err(error) => {
                        state.stats.failed += 1;
                        tracing::warn!(
                            job_id = %job.id,
                            queue = %job.job_type,
                            worker_id = %state.worker_id,
                            %error,
                            "Job failed"
                        );
                    }
                }

                // The sender may have given up waiting; the outcome is already counted.
                let _ = reply.send(result);
            }

            WorkerMessage::ListQueues { reply } => {
                let mut queues: Vec<String> = state
                    .handlers
                    .job_types()
                    .into_iter()
                    .map(str::to_string)
                    .collect();
                queues.sort();
                let _ = reply.send(queues);
            }

            WorkerMessage::GetStats { reply } => {
                let _ = reply.send(state.stats);
            }

            WorkerMessage::Shutdown => {
                tracing::info!("Shutting down worker: {}", state.worker_id);
                myself.stop(None);
            }
        }

        Ok(())
    }
}

/// Spawn a worker actor over the given handlers.
pub async fn start_worker(
    worker_id: impl Into<String>,
    handlers: JobHandlerRegistry,
) -> Result<(ActorRef<WorkerMessage>, tokio::task::JoinHandle<()>), ractor::SpawnErr> {
    let args = WorkerArgs {
        worker_id: worker_id.into(),
        handlers: Arc::new(handlers),
    };
    Actor::spawn(None, WorkerActor, args).await
}
