use std::{
    iter,
    num::NonZeroUsize,
    sync::{
        atomic::{self, AtomicUsize},
        Mutex,
    },
};

use futures::future::join_all;

use crate::error::{Error, Result};

use super::{ConcurrencyOptions, Executor, Task, TaskResult};

/// A fixed set of workers draining a task list through a shared cursor.
///
/// Each worker claims the next unstarted index, executes it, and writes the result into the
/// slot for that index. Output order therefore matches input order, whatever order tasks
/// complete in.
///
/// All accounting belongs to a single run.
#[derive(Debug)]
pub(crate) struct Pool<'a, I> {
    tasks: &'a [Task<I>],
    limit: NonZeroUsize,

    cursor: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,

    results: Mutex<Vec<Option<TaskResult<I>>>>,
}

/// The outcome of a [Pool] run.
#[derive(Debug)]
pub(crate) struct Completed<I> {
    pub(crate) results: Vec<TaskResult<I>>,
    pub(crate) peak_in_flight: usize,
}

impl<'a, I> Pool<'a, I> {
    pub(crate) fn new(tasks: &'a [Task<I>], options: ConcurrencyOptions) -> Result<Self> {
        let limit = NonZeroUsize::new(options.limit).ok_or(Error::ZeroConcurrency)?;

        Ok(Self {
            tasks,
            limit,
            cursor: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
            results: Mutex::new(iter::repeat_with(|| None).take(tasks.len()).collect()),
        })
    }

    fn num_workers(&self) -> usize {
        self.limit.get().min(self.tasks.len())
    }

    /// Claim the next unstarted task.
    fn next_index(&self) -> Option<usize> {
        let index = self.cursor.fetch_add(1, atomic::Ordering::AcqRel);
        (index < self.tasks.len()).then_some(index)
    }

    fn inc_in_flight(&self) -> usize {
        let in_flight = self.in_flight.fetch_add(1, atomic::Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(in_flight, atomic::Ordering::SeqCst);
        in_flight
    }

    fn dec_in_flight(&self) -> usize {
        self.in_flight.fetch_sub(1, atomic::Ordering::SeqCst) - 1
    }

    async fn worker<E>(&self, executor: &E)
    where
        E: Executor<I>,
    {
        while let Some(index) = self.next_index() {
            let in_flight = self.inc_in_flight();
            debug_assert!(in_flight <= self.limit.get());
            tracing::trace!(index, in_flight, "starting task");

            let result = executor.execute(&self.tasks[index]).await;

            let in_flight = self.dec_in_flight();
            tracing::trace!(index, in_flight, "task completed");

            self.results.lock().expect("lock should not be poisoned")[index] = Some(result);
        }
    }

    /// Run every task to completion.
    pub(crate) async fn run<E>(self, executor: &E) -> Completed<I>
    where
        E: Executor<I>,
    {
        tracing::debug!(
            tasks = self.tasks.len(),
            limit = self.limit.get(),
            "running tasks concurrently"
        );

        join_all((0..self.num_workers()).map(|_| self.worker(executor))).await;

        let results = self
            .results
            .into_inner()
            .expect("lock should not be poisoned")
            .into_iter()
            .map(|result| result.expect("every task should have completed"))
            .collect();

        Completed {
            results,
            peak_in_flight: self.peak_in_flight.into_inner(),
        }
    }
}
