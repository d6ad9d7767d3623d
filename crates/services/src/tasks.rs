use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::{debug, info};
use uuid::Uuid;

use scribe_transcription::{JobResult, TranscriptionPipeline};

/// Lifecycle of one submitted transcription task.
#[derive(Debug, Clone)]
pub enum TaskState {
    Processing,
    Done(JobResult),
}

/// Point-in-time view of a task.
#[derive(Debug, Clone)]
pub struct TaskSnapshot {
    pub state: TaskState,
    pub created_at: DateTime<Utc>,
}

/// In-process asynchronous task-execution facility.
///
/// Stands in for an external job queue: submissions are spawned onto the
/// runtime and polled by id. Callers that want synchronous behavior invoke
/// the pipeline directly instead.
pub struct TaskRegistry {
    tasks: DashMap<String, TaskSnapshot>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self {
            tasks: DashMap::new(),
        }
    }

    /// Spawns one transcription job and returns its id immediately.
    pub fn submit(
        self: &Arc<Self>,
        pipeline: Arc<TranscriptionPipeline>,
        audio: Vec<u8>,
        filename: String,
    ) -> String {
        let task_id = Uuid::new_v4().to_string();
        self.tasks.insert(
            task_id.clone(),
            TaskSnapshot {
                state: TaskState::Processing,
                created_at: Utc::now(),
            },
        );
        info!(%task_id, %filename, bytes = audio.len(), "Transcription task queued");

        let registry = Arc::clone(self);
        let id = task_id.clone();
        tokio::spawn(async move {
            let result = pipeline.run(&audio, &filename).await;
            if let Some(mut entry) = registry.tasks.get_mut(&id) {
                entry.state = TaskState::Done(result);
            }
            debug!(task_id = %id, "Transcription task finished");
        });

        task_id
    }

    /// Current state of a task, or None for an unknown id.
    pub fn poll(&self, task_id: &str) -> Option<TaskSnapshot> {
        self.tasks.get(task_id).map(|entry| entry.value().clone())
    }
}

impl Default for TaskRegistry {
    fn default() -> Self {
        Self::new()
    }
}
