//! Running simulated tasks, one at a time or with bounded concurrency.
//!
//! Both strategies return results in input order, regardless of the order tasks complete in.

use std::{fmt::Debug, future::Future};

use async_trait::async_trait;
use bon::Builder;

use crate::error::Result;
use pool::Pool;

pub use task::{execute_task, Simulated, Task, TaskResult};

mod pool;
mod task;

/// Executes a single [Task].
///
/// Implementations must complete every task they're given. Tasks can't fail.
#[async_trait]
pub trait Executor<I>: Debug + Sync {
    /// Execute `task`, returning when it completed.
    async fn execute(&self, task: &Task<I>) -> TaskResult<I>;
}

/// Parameters for running tasks concurrently.
#[derive(Debug, Clone, Copy, Builder)]
pub struct ConcurrencyOptions {
    /// Maximum tasks in flight at once. Must be at least 1.
    limit: usize,
}

/// Runs tasks using an [Executor].
#[derive(Debug, Clone, Default)]
pub struct TaskRunner<E> {
    executor: E,
}

/// Execute `tasks` one at a time, in order.
///
/// Each task starts only once the previous one has completed.
pub async fn execute_tasks_sequentially<I>(tasks: &[Task<I>]) -> Vec<TaskResult<I>>
where
    I: Clone + Send + Sync,
{
    TaskRunner::new(Simulated).sequential(tasks).await
}

/// Execute `tasks` with at most `limit` in flight at once.
///
/// Tasks start in input order, each as soon as a slot is free. Results are in input order.
///
/// Fails with [Error::ZeroConcurrency](crate::Error::ZeroConcurrency) if `limit` is zero,
/// before any task has started.
pub fn execute_tasks_with_concurrency<I>(
    tasks: &[Task<I>],
    limit: usize,
) -> Result<impl Future<Output = Vec<TaskResult<I>>> + '_>
where
    I: Clone + Send + Sync,
{
    let pool = Pool::new(tasks, ConcurrencyOptions::builder().limit(limit).build())?;

    Ok(async move { pool.run(&Simulated).await.results })
}

impl<E> TaskRunner<E> {
    #[allow(missing_docs)]
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    /// The executor used to run each task.
    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Execute `tasks` one at a time, in order.
    pub async fn sequential<I>(&self, tasks: &[Task<I>]) -> Vec<TaskResult<I>>
    where
        E: Executor<I>,
    {
        tracing::debug!(tasks = tasks.len(), "running tasks sequentially");

        let mut results = Vec::with_capacity(tasks.len());
        for (index, task) in tasks.iter().enumerate() {
            tracing::trace!(index, "starting task");
            results.push(self.executor.execute(task).await);
        }
        results
    }

    /// Execute `tasks` with at most `limit` in flight at once.
    ///
    /// The limit is checked immediately. The returned future runs the tasks.
    pub fn with_concurrency<'a, I>(
        &'a self,
        tasks: &'a [Task<I>],
        limit: usize,
    ) -> Result<impl Future<Output = Vec<TaskResult<I>>> + 'a>
    where
        E: Executor<I>,
    {
        self.with_options(tasks, ConcurrencyOptions::builder().limit(limit).build())
    }

    /// Execute `tasks` concurrently, as configured by `options`.
    pub fn with_options<'a, I>(
        &'a self,
        tasks: &'a [Task<I>],
        options: ConcurrencyOptions,
    ) -> Result<impl Future<Output = Vec<TaskResult<I>>> + 'a>
    where
        E: Executor<I>,
    {
        let pool = Pool::new(tasks, options)?;

        Ok(async move {
            let completed = pool.run(&self.executor).await;
            tracing::debug!(
                peak_in_flight = completed.peak_in_flight,
                "concurrent run completed"
            );
            completed.results
        })
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use std::sync::{
        atomic::{self, AtomicUsize},
        Mutex,
    };

    use super::{execute_task, Executor, Task, TaskResult};

    /// Records the order tasks start and complete in, and how many run at once.
    #[derive(Debug, Default)]
    pub struct RecordingExecutor {
        in_flight: AtomicUsize,
        peak_in_flight: AtomicUsize,
        started: Mutex<Vec<u64>>,
        completed: Mutex<Vec<u64>>,
    }

    impl RecordingExecutor {
        pub fn peak_in_flight(&self) -> usize {
            self.peak_in_flight.load(atomic::Ordering::Acquire)
        }

        pub fn started(&self) -> Vec<u64> {
            self.started.lock().unwrap().clone()
        }

        pub fn completed(&self) -> Vec<u64> {
            self.completed.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl Executor<u64> for RecordingExecutor {
        async fn execute(&self, task: &Task<u64>) -> TaskResult<u64> {
            let in_flight = self.in_flight.fetch_add(1, atomic::Ordering::SeqCst) + 1;
            self.peak_in_flight.fetch_max(in_flight, atomic::Ordering::SeqCst);
            self.started.lock().unwrap().push(task.id);

            let result = execute_task(task).await;

            self.in_flight.fetch_sub(1, atomic::Ordering::SeqCst);
            self.completed.lock().unwrap().push(task.id);
            result
        }
    }
}
