//! Sliding-window rate limiting of a callback.

use std::{fmt, time::Duration};

use bon::Builder;
use tokio::time::Instant;

use crate::error::{Error, Result};
use window::CallHistory;

mod window;

/// Wraps a callback so that at most `max_calls` invocations pass through in any trailing
/// window.
///
/// The window slides with the current time. Each admitted call is timestamped, and
/// timestamps which have left the window are discarded before every decision. A call made
/// exactly one window after an earlier admission no longer sees that admission.
///
/// Calls over the limit are dropped: the callback isn't run, nothing is queued and no error
/// is raised. [RateLimiter::call] returns `None` for them.
pub struct RateLimiter<F> {
    callback: F,
    max_calls: usize,
    history: CallHistory,
}

/// Parameters for a [RateLimiter].
#[derive(Debug, Clone, Copy, Builder)]
pub struct RateLimitOptions {
    /// Maximum admissions within any window. Zero drops every call.
    max_calls: usize,
    /// Length of the sliding window. Must be non-zero.
    window: Duration,
}

/// A snapshot of the state of a [RateLimiter].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimiterState {
    max_calls: usize,
    recent: usize,
    available: usize,
}

/// Create a rate-limited version of `callback`.
///
/// The returned function runs `callback` and returns `Some` with its result, or returns
/// `None` if `max_calls` calls have already been admitted in the trailing `window`.
///
/// Callbacks with several arguments take them as a tuple.
///
/// Fails with [Error::ZeroWindow] if `window` is zero.
pub fn create_rate_limiter<F, A, R>(
    callback: F,
    max_calls: usize,
    window: Duration,
) -> Result<impl FnMut(A) -> Option<R>>
where
    F: FnMut(A) -> R,
{
    let options = RateLimitOptions::builder()
        .max_calls(max_calls)
        .window(window)
        .build();

    Ok(RateLimiter::new(callback, options)?.into_fn::<A, R>())
}

impl<F> RateLimiter<F> {
    /// Create a limiter around `callback`.
    pub fn new(callback: F, options: RateLimitOptions) -> Result<Self> {
        if options.window.is_zero() {
            return Err(Error::ZeroWindow);
        }

        Ok(Self {
            callback,
            max_calls: options.max_calls,
            history: CallHistory::new(options.window),
        })
    }

    /// The current state of the limiter, as of now.
    pub fn state(&mut self) -> RateLimiterState {
        self.history.prune(Instant::now());

        let recent = self.history.len();
        RateLimiterState {
            max_calls: self.max_calls,
            recent,
            available: self.max_calls.saturating_sub(recent),
        }
    }

    /// Invoke the callback if the limit allows it.
    ///
    /// Returns `None` if the call was dropped.
    pub fn call<A, R>(&mut self, args: A) -> Option<R>
    where
        F: FnMut(A) -> R,
    {
        if !self.history.try_admit(Instant::now(), self.max_calls) {
            tracing::debug!(
                max_calls = self.max_calls,
                window = ?self.history.window(),
                "dropping rate-limited call"
            );
            return None;
        }

        tracing::trace!(recent = self.history.len(), "admitting call");
        Some((self.callback)(args))
    }

    /// Turn the limiter into a plain function.
    pub fn into_fn<A, R>(mut self) -> impl FnMut(A) -> Option<R>
    where
        F: FnMut(A) -> R,
    {
        move |args| self.call(args)
    }
}

impl<F> fmt::Debug for RateLimiter<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateLimiter")
            .field("max_calls", &self.max_calls)
            .field("history", &self.history)
            .finish_non_exhaustive()
    }
}

impl RateLimiterState {
    /// The maximum number of calls admitted per window.
    pub fn max_calls(&self) -> usize {
        self.max_calls
    }
    /// The number of calls admitted within the current window.
    pub fn recent(&self) -> usize {
        self.recent
    }
    /// The number of calls which would currently be admitted.
    pub fn available(&self) -> usize {
        self.available
    }
}
