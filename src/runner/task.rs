use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use super::Executor;

/// A unit of simulated work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task<I> {
    /// Identifies the task in its [TaskResult].
    pub id: I,
    /// How long the task takes to complete.
    pub duration: Duration,
}

/// The completion record of a [Task].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskResult<I> {
    /// Copied from the [Task].
    pub id: I,
    /// When the task started executing.
    pub started_at: Instant,
    /// When the task completed.
    pub completed_at: Instant,
}

/// Executes tasks by waiting for their duration on tokio's timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct Simulated;

/// Execute a single task: wait for `task.duration`, then report when it started and completed.
///
/// No real work is done. This stands in for an arbitrary asynchronous operation.
pub async fn execute_task<I: Clone>(task: &Task<I>) -> TaskResult<I> {
    let started_at = Instant::now();
    tokio::time::sleep(task.duration).await;

    TaskResult {
        id: task.id.clone(),
        started_at,
        completed_at: Instant::now(),
    }
}

impl<I> Task<I> {
    #[allow(missing_docs)]
    pub fn new(id: I, duration: Duration) -> Self {
        Self { id, duration }
    }
}

impl<I> TaskResult<I> {
    /// Time between starting and completing.
    pub fn elapsed(&self) -> Duration {
        self.completed_at.saturating_duration_since(self.started_at)
    }
}

#[async_trait]
impl<I> Executor<I> for Simulated
where
    I: Clone + Send + Sync,
{
    async fn execute(&self, task: &Task<I>) -> TaskResult<I> {
        execute_task(task).await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::Instant;
    use uuid::Uuid;

    use crate::assert_elapsed;

    use super::{execute_task, Task};

    #[tokio::test(start_paused = true)]
    async fn waits_for_the_task_duration() {
        let id = Uuid::new_v4();
        let task = Task::new(id, Duration::from_millis(250));

        let before = Instant::now();
        let result = execute_task(&task).await;

        assert_eq!(result.id, id);
        assert_eq!(result.started_at, before);
        assert_elapsed!(before, Duration::from_millis(250), Duration::from_millis(10));
        assert!(result.elapsed() >= Duration::from_millis(250));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_duration_completes() {
        let task = Task::new("instant", Duration::ZERO);

        let result = execute_task(&task).await;

        assert_eq!(result.id, "instant");
        assert!(result.completed_at >= result.started_at);
    }
}
