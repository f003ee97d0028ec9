//! Cooperative cancellation for document renders.
//!
//! Cancellation is checked between slot fragments and between phases,
//! never inside a single node traversal.

/// A clonable cancellation token wrapping
/// `tokio_util::sync::CancellationToken`.
#[derive(Clone, Default)]
pub struct Cancellation {
    inner: tokio_util::sync::CancellationToken,
}

impl Cancellation {
    /// Create a new cancellation token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.inner.is_cancelled()
    }

    /// Request cancellation.
    ///
    /// After this is called, `is_cancelled()` will return `true`.
    pub fn cancel(&self) {
        self.inner.cancel()
    }
}

impl From<tokio_util::sync::CancellationToken> for Cancellation {
    fn from(token: tokio_util::sync::CancellationToken) -> Self {
        Self { inner: token }
    }
}
