//! Revision-based cancellation.
//!
//! A [`Revision`] is shared between whoever owns the project and the calls
//! that read it. Bumping it (after an edit, say) cancels every token handed
//! out before the bump. Traversals check their token at file boundaries.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// Returned by a traversal whose token was cancelled.
///
/// Distinct from an empty result: a cancelled call found nothing because it
/// stopped looking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("operation cancelled")]
pub struct Cancelled;

/// Shared revision counter.
#[derive(Debug, Clone, Default)]
pub struct Revision(Arc<AtomicU64>);

impl Revision {
    /// Create a counter at revision 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bump the revision, cancelling all outstanding tokens.
    /// Returns the new revision.
    pub fn bump(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Get the current revision.
    #[must_use]
    pub fn current(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }

    /// A token valid until the next [`bump`](Self::bump).
    #[must_use]
    pub fn token(&self) -> CancellationToken {
        CancellationToken {
            revision: self.current(),
            counter: Some(Arc::clone(&self.0)),
        }
    }
}

/// Captures a revision and reports cancellation once it moves on.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    revision: u64,
    counter: Option<Arc<AtomicU64>>,
}

impl CancellationToken {
    /// A token that is never cancelled.
    #[must_use]
    pub const fn never() -> Self {
        Self {
            revision: 0,
            counter: None,
        }
    }

    /// Check if this token has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.counter
            .as_ref()
            .is_some_and(|counter| counter.load(Ordering::SeqCst) != self.revision)
    }

    /// `Err(Cancelled)` if cancelled.
    pub fn check(&self) -> Result<(), Cancelled> {
        if self.is_cancelled() {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::never()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_cancelled_by_bump() {
        let revision = Revision::new();
        let token = revision.token();
        assert!(!token.is_cancelled());
        assert_eq!(token.check(), Ok(()));

        assert_eq!(revision.bump(), 1);
        assert!(token.is_cancelled());
        assert_eq!(token.check(), Err(Cancelled));
    }

    #[test]
    fn test_new_token_after_bump_is_live() {
        let revision = Revision::new();
        revision.bump();
        let token = revision.token();
        assert!(!token.is_cancelled());
    }

    #[test]
    fn test_clones_share_the_counter() {
        let revision = Revision::new();
        let token = revision.token();
        revision.clone().bump();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_never_token() {
        let token = CancellationToken::never();
        assert!(!token.is_cancelled());
        assert_eq!(Cancelled.to_string(), "operation cancelled");
    }
}
