//! In-memory checkpointer.
//!
//! Each thread keeps its most recent checkpoints, up to a history limit
//! ([`DEFAULT_HISTORY_LIMIT`] unless configured). Older checkpoints are dropped on
//! `put`; the latest one is always kept. Threads themselves are never evicted.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use super::{
    Checkpoint, CheckpointError, CheckpointListItem, CheckpointMetadata, Checkpointer,
    RunnableConfig,
};

/// Checkpoints kept per thread by [`MemorySaver::new`].
pub const DEFAULT_HISTORY_LIMIT: usize = 64;

/// In-memory checkpointer keyed by `(thread_id, checkpoint_ns)`.
///
/// **Interaction**: Pass to `StateGraph::compile_with_checkpointer`; share the same
/// `Arc` with the runner that loads thread state.
pub struct MemorySaver<S> {
    threads: RwLock<HashMap<String, Vec<Checkpoint<S>>>>,
    history_limit: usize,
}

impl<S> Default for MemorySaver<S> {
    fn default() -> Self {
        Self {
            threads: RwLock::new(HashMap::new()),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl<S> MemorySaver<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps at most `limit` checkpoints per thread (at least one).
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit.max(1);
        self
    }

    /// Keeps every checkpoint of every thread.
    pub fn unbounded() -> Self {
        Self::default().with_history_limit(usize::MAX)
    }

    pub fn history_limit(&self) -> usize {
        self.history_limit
    }

    /// Number of threads with at least one checkpoint.
    pub fn thread_count(&self) -> usize {
        self.threads.read().map(|t| t.len()).unwrap_or(0)
    }

    fn key(config: &RunnableConfig) -> Result<String, CheckpointError> {
        let thread_id = config
            .thread_id
            .as_deref()
            .ok_or(CheckpointError::ThreadIdRequired)?;
        Ok(format!("{}\u{1f}{}", config.checkpoint_ns, thread_id))
    }
}

fn poisoned<E>(_: E) -> CheckpointError {
    CheckpointError::Storage("checkpoint map lock poisoned".into())
}

#[async_trait]
impl<S> Checkpointer<S> for MemorySaver<S>
where
    S: Clone + Send + Sync + 'static,
{
    async fn put(
        &self,
        config: &RunnableConfig,
        checkpoint: &Checkpoint<S>,
    ) -> Result<String, CheckpointError> {
        let key = Self::key(config)?;
        let mut threads = self.threads.write().map_err(poisoned)?;
        let history = threads.entry(key).or_default();
        history.push(checkpoint.clone());
        if history.len() > self.history_limit {
            let excess = history.len() - self.history_limit;
            history.drain(..excess);
        }
        Ok(checkpoint.id.clone())
    }

    async fn get_tuple(
        &self,
        config: &RunnableConfig,
    ) -> Result<Option<(Checkpoint<S>, CheckpointMetadata)>, CheckpointError> {
        let key = Self::key(config)?;
        let threads = self.threads.read().map_err(poisoned)?;
        let Some(history) = threads.get(&key) else {
            return Ok(None);
        };
        let found = match &config.checkpoint_id {
            Some(id) => history.iter().find(|c| &c.id == id),
            None => history.last(),
        };
        Ok(found.map(|c| (c.clone(), c.metadata.clone())))
    }

    async fn list(
        &self,
        config: &RunnableConfig,
        limit: Option<usize>,
    ) -> Result<Vec<CheckpointListItem>, CheckpointError> {
        let key = Self::key(config)?;
        let threads = self.threads.read().map_err(poisoned)?;
        let items = threads
            .get(&key)
            .map(|history| {
                history
                    .iter()
                    .rev()
                    .take(limit.unwrap_or(usize::MAX))
                    .map(|c| CheckpointListItem {
                        checkpoint_id: c.id.clone(),
                        metadata: c.metadata.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(items)
    }
}
