use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use parking_lot::RwLock;

use super::{StoreError, TodoStore};
use crate::domain::TodoState;

/// Process-lifetime [`TodoStore`].
///
/// A single lock guards the whole state. Clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTodoStore {
    state: Arc<RwLock<TodoState>>,
    latency: Duration,
}

impl InMemoryTodoStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding `state`.
    #[must_use]
    pub fn with_state(state: TodoState) -> Self {
        Self {
            state: Arc::new(RwLock::new(state)),
            latency: Duration::ZERO,
        }
    }

    /// Delays every read and write by `latency`.
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

impl TodoStore for InMemoryTodoStore {
    fn read(&self) -> BoxFuture<'_, Result<TodoState, StoreError>> {
        Box::pin(async move {
            self.simulate_latency().await;
            Ok(self.state.read().clone())
        })
    }

    fn replace(&self, state: TodoState) -> BoxFuture<'_, Result<(), StoreError>> {
        Box::pin(async move {
            self.simulate_latency().await;
            *self.state.write() = state;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Task;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn test_new_store_is_empty() {
        let store = InMemoryTodoStore::new();

        assert_eq!(store.read().await.unwrap(), TodoState::default());
    }

    #[rstest]
    #[tokio::test]
    async fn test_replace_then_read() {
        let store = InMemoryTodoStore::new();
        let state = TodoState::new("Week", vec![Task::new("Plan"), Task::new("Ship").completed()]);

        store.replace(state.clone()).await.unwrap();

        assert_eq!(store.read().await.unwrap(), state);
    }

    #[rstest]
    #[tokio::test]
    async fn test_clones_share_state() {
        let store = InMemoryTodoStore::new();
        let other = store.clone();

        other.replace(TodoState::new("Shared", Vec::new())).await.unwrap();

        assert_eq!(store.read().await.unwrap().title, "Shared");
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn test_latency_delays_operations() {
        let store = InMemoryTodoStore::with_state(TodoState::new("Slow", Vec::new()))
            .with_latency(Duration::from_millis(1000));
        let started = tokio::time::Instant::now();

        let state = store.read().await.unwrap();

        assert_eq!(state.title, "Slow");
        assert!(started.elapsed() >= Duration::from_millis(1000));
    }
}
