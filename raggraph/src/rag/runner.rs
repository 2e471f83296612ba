//! Retrieval graph runner: thread state loading, per-thread locking, invoke and stream.
//!
//! Used by the HTTP layer. Interacts with [`build_rag_graph`](super::build_rag_graph),
//! [`Checkpointer`] and [`ThreadLocks`].

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::error::AgentError;
use crate::graph::{CompilationError, CompiledStateGraph};
use crate::llm::LlmClient;
use crate::memory::{CheckpointError, Checkpointer, RunnableConfig, ThreadLocks};
use crate::message::Message;
use crate::state::ChatState;
use crate::stream::{StreamEvent, StreamMode};
use crate::tool_source::ToolSource;

use super::build_rag_graph;

/// Builds the input state of a run: the thread's latest checkpointed messages (if
/// any) followed by the new human message.
///
/// # Errors
///
/// Returns `CheckpointError` if loading from checkpoint fails.
pub async fn build_rag_initial_state(
    user_message: &str,
    checkpointer: &dyn Checkpointer<ChatState>,
    config: &RunnableConfig,
) -> Result<ChatState, CheckpointError> {
    let mut state = match checkpointer.get_tuple(config).await? {
        Some((checkpoint, _)) => checkpoint.channel_values,
        None => ChatState::default(),
    };
    state.messages.push(Message::human(user_message));
    Ok(state)
}

/// Error type for RagRunner invoke/stream operations.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),
    #[error("execution failed: {0}")]
    Execution(#[from] AgentError),
}

/// Retrieval graph runner: compiled graph + checkpointer + per-thread locks.
///
/// Cheap to clone; clones share the checkpoint store and locks. Runs on the same
/// thread id are serialized across "load state → run → persist"; runs on different
/// threads proceed in parallel.
///
/// # Example
///
/// ```ignore
/// let runner = RagRunner::new(llm, tools, Arc::new(MemorySaver::new()))?;
/// let state = runner.invoke("thread-1", "What's the onboarding process?").await?;
/// ```
#[derive(Clone)]
pub struct RagRunner {
    compiled: CompiledStateGraph<ChatState>,
    checkpointer: Arc<dyn Checkpointer<ChatState>>,
    locks: Arc<ThreadLocks>,
}

impl RagRunner {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        tools: Arc<dyn ToolSource>,
        checkpointer: Arc<dyn Checkpointer<ChatState>>,
    ) -> Result<Self, CompilationError> {
        let compiled = build_rag_graph(llm, tools, Some(Arc::clone(&checkpointer)))?;
        Ok(Self {
            compiled,
            checkpointer,
            locks: Arc::new(ThreadLocks::new()),
        })
    }

    /// Sets the maximum number of node visits per run.
    pub fn with_recursion_limit(mut self, limit: usize) -> Self {
        self.compiled = self.compiled.with_recursion_limit(limit);
        self
    }

    pub fn checkpointer(&self) -> &Arc<dyn Checkpointer<ChatState>> {
        &self.checkpointer
    }

    /// Runs one turn to completion and returns the thread's final state.
    pub async fn invoke(&self, thread_id: &str, user_message: &str) -> Result<ChatState, RunError> {
        let _guard = self.locks.acquire(thread_id).await;
        let config = RunnableConfig::for_thread(thread_id);
        let state = build_rag_initial_state(user_message, self.checkpointer.as_ref(), &config).await?;
        Ok(self.compiled.invoke(state, Some(config)).await?)
    }

    /// Runs one turn, emitting one `Updates` event per node visit.
    pub fn stream(&self, thread_id: &str, user_message: &str) -> ReceiverStream<StreamEvent<ChatState>> {
        self.stream_with_modes(thread_id, user_message, [StreamMode::Updates])
    }

    /// Runs one turn on a spawned task, emitting events for the given modes.
    ///
    /// The thread lock is taken inside the task and held until the run ends. A
    /// failure is reported as a final `StreamEvent::Error`. Dropping the stream
    /// stops the run after its current step.
    pub fn stream_with_modes(
        &self,
        thread_id: &str,
        user_message: &str,
        modes: impl IntoIterator<Item = StreamMode>,
    ) -> ReceiverStream<StreamEvent<ChatState>> {
        let (tx, rx) = mpsc::channel(128);
        let runner = self.clone();
        let thread_id = thread_id.to_string();
        let user_message = user_message.to_string();
        let modes: HashSet<StreamMode> = modes.into_iter().collect();

        tokio::spawn(async move {
            let _guard = runner.locks.acquire(&thread_id).await;
            let config = RunnableConfig::for_thread(thread_id.as_str());
            let state = match build_rag_initial_state(
                &user_message,
                runner.checkpointer.as_ref(),
                &config,
            )
            .await
            {
                Ok(state) => state,
                Err(e) => {
                    tracing::error!(thread_id = %thread_id, error = %e, "loading thread state failed");
                    let _ = tx.send(StreamEvent::Error(AgentError::Checkpoint(e))).await;
                    return;
                }
            };
            if let Err(e) = runner.compiled.stream_to(state, Some(config), modes, tx).await {
                tracing::debug!(thread_id = %thread_id, error = %e, "stream run ended with error");
            }
        });

        ReceiverStream::new(rx)
    }

    /// Latest persisted state of a thread, `None` for an unknown thread.
    pub async fn thread_state(&self, thread_id: &str) -> Result<Option<ChatState>, RunError> {
        let config = RunnableConfig::for_thread(thread_id);
        Ok(self
            .checkpointer
            .get_tuple(&config)
            .await?
            .map(|(checkpoint, _)| checkpoint.channel_values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{LlmResponse, MockLlm};
    use crate::memory::MemorySaver;
    use crate::message::Role;
    use crate::tool_source::MockToolSource;
    use std::time::Duration;
    use tokio_stream::StreamExt;

    fn runner(llm: MockLlm) -> (RagRunner, Arc<MockLlm>, Arc<MemorySaver<ChatState>>) {
        let llm = Arc::new(llm);
        let saver = Arc::new(MemorySaver::new());
        let runner = RagRunner::new(
            llm.clone(),
            Arc::new(MockToolSource::retriever("docs")),
            saver.clone(),
        )
        .unwrap();
        (runner, llm, saver)
    }

    /// **Scenario**: Initial state of a new thread is just the human message; of a known
    /// thread it is the stored messages plus the human message.
    #[tokio::test]
    async fn initial_state_extends_checkpoint() {
        let saver = MemorySaver::<ChatState>::new();
        let config = RunnableConfig::for_thread("t");
        let fresh = build_rag_initial_state("hi", &saver, &config).await.unwrap();
        assert_eq!(fresh.messages, vec![Message::human("hi")]);

        let cp = crate::memory::Checkpoint::from_state(
            ChatState {
                messages: vec![Message::human("a"), Message::ai("b")],
            },
            crate::memory::CheckpointSource::Loop,
            1,
        );
        saver.put(&config, &cp).await.unwrap();
        let cont = build_rag_initial_state("c", &saver, &config).await.unwrap();
        let contents: Vec<_> = cont.messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["a", "b", "c"]);
    }

    /// **Scenario**: Direct answer: agent replies without a tool call, run ends after one node.
    #[tokio::test]
    async fn invoke_direct_answer_persists_thread() {
        let (runner, _, _) = runner(MockLlm::new([LlmResponse::text("Hello!")]));
        let state = runner.invoke("t1", "hi").await.unwrap();
        assert_eq!(state.messages, vec![Message::human("hi"), Message::ai("Hello!")]);
        assert_eq!(runner.thread_state("t1").await.unwrap(), Some(state));
        assert!(runner.thread_state("unknown").await.unwrap().is_none());
    }

    /// **Scenario**: Concurrent turns on one thread are serialized: the second turn's
    /// agent sees the complete first turn.
    #[tokio::test]
    async fn concurrent_invokes_on_same_thread_are_serialized() {
        let llm = MockLlm::new([LlmResponse::text("one"), LlmResponse::text("two")])
            .with_delay(Duration::from_millis(20));
        let (runner, llm, _) = runner(llm);
        let (a, b) = tokio::join!(runner.invoke("t", "first"), runner.invoke("t", "second"));
        a.unwrap();
        b.unwrap();

        let state = runner.thread_state("t").await.unwrap().unwrap();
        assert_eq!(state.messages.len(), 4);
        let roles: Vec<_> = state.messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::Human, Role::Ai, Role::Human, Role::Ai]);
        assert_eq!(llm.calls()[1].messages.len(), 3, "second turn saw the first turn");
    }

    /// **Scenario**: stream emits one Updates event per node and persists the same state.
    #[tokio::test]
    async fn stream_emits_updates_and_persists() {
        let (runner, _, _) = runner(MockLlm::new([LlmResponse::text("Hello!")]));
        let events: Vec<_> = runner.stream("s1", "hi").collect().await;
        assert_eq!(events.len(), 1);
        match &events[0] {
            StreamEvent::Updates { node_id, update } => {
                assert_eq!(node_id, "agent");
                assert_eq!(update.messages, vec![Message::ai("Hello!")]);
            }
            other => panic!("unexpected event {:?}", other),
        }
        let state = runner.thread_state("s1").await.unwrap().unwrap();
        assert_eq!(state.messages.len(), 2);
    }

    /// **Scenario**: A model failure ends the stream with an Error event; the input
    /// checkpoint remains.
    #[tokio::test]
    async fn stream_failure_reports_error_event() {
        let (runner, _, _) = runner(MockLlm::default());
        let events: Vec<_> = runner.stream("s2", "hi").collect().await;
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], StreamEvent::Error(AgentError::ExecutionFailed(_))));
        let state = runner.thread_state("s2").await.unwrap().unwrap();
        assert_eq!(state.messages, vec![Message::human("hi")]);
    }
}
