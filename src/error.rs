//! Configuration errors.

/// An invalid configuration passed to one of the factories.
///
/// Returned at construction time, before any callback or task has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A rate limiter window must be longer than zero.
    #[error("Rate limit window must be non-zero")]
    ZeroWindow,
    /// At least one task must be allowed in flight.
    #[error("Concurrency limit must be at least 1")]
    ZeroConcurrency,
}

/// Result type alias for fallible construction.
pub type Result<T> = std::result::Result<T, Error>;
