//! Sliding-window rate limiting, private counters, and order-preserving task execution with
//! bounded concurrency.

#![deny(missing_docs)]

#[cfg(doctest)]
use doc_comment::doctest;
#[cfg(doctest)]
doctest!("../README.md");

pub mod counter;
pub mod error;
pub mod limiter;
pub mod runner;

pub use counter::create_increment;
pub use error::Error;
pub use limiter::create_rate_limiter;
pub use runner::{execute_task, execute_tasks_sequentially, execute_tasks_with_concurrency};

/// Assert that a given duration has elapsed since `start`, within the given tolerance.
#[macro_export]
#[cfg(test)]
macro_rules! assert_elapsed {
    ($start:expr, $dur:expr, $tolerance:expr) => {{
        let elapsed = $start.elapsed();
        let lower: std::time::Duration = $dur;

        // Handles ms rounding
        assert!(
            elapsed >= lower && elapsed <= lower + $tolerance,
            "actual = {:?}, expected = {:?}",
            elapsed,
            lower
        );
    }};
}
