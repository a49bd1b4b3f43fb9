//! The ephemeral todo store.
//!
//! [`TodoStore`] is the seam a durable backend would plug into; the only
//! implementation here keeps the state in memory for the life of the
//! process.

mod in_memory;

use futures::future::BoxFuture;
use thiserror::Error;

use crate::domain::TodoState;

pub use in_memory::InMemoryTodoStore;

// =============================================================================
// Store Error
// =============================================================================

/// Errors a store may report.
///
/// The in-memory store never fails; these exist for durable backends.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The state could not be read.
    #[error("Read failed: {0}")]
    ReadFailure(String),

    /// The state could not be written.
    #[error("Write failed: {0}")]
    WriteFailure(String),
}

// =============================================================================
// Todo Store Trait
// =============================================================================

/// Storage for the single [`TodoState`].
///
/// Implementations must make `replace` atomic as seen by `read`: a reader
/// observes either the old or the new state, never a mix of the two.
/// Concurrent writers are last-write-wins.
pub trait TodoStore: Send + Sync {
    /// Returns the last written state, or the empty state if nothing was
    /// ever written.
    fn read(&self) -> BoxFuture<'_, Result<TodoState, StoreError>>;

    /// Replaces the whole state.
    fn replace(&self, state: TodoState) -> BoxFuture<'_, Result<(), StoreError>>;
}
