//! Compiled state graph: immutable, supports invoke and stream.
//!
//! Built by `StateGraph::compile` or `compile_with_checkpointer`. Holds nodes, one
//! outgoing transition per node and an optional checkpointer. Both consumption
//! modes share one run loop; when a checkpointer is set and the config carries a
//! `thread_id`, state is saved on entry and after every node.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::error::AgentError;
use crate::memory::{Checkpoint, CheckpointSource, Checkpointer, RunnableConfig};
use crate::stream::{StreamEvent, StreamMode};

use super::logging::{
    log_graph_complete, log_graph_error, log_graph_start, log_node_complete, log_node_start,
    log_route,
};
use super::{GraphState, Node, RunContext, END, START};

/// Step budget applied when none is configured.
pub const DEFAULT_RECURSION_LIMIT: usize = 25;

/// Type-erased router: reads merged state, returns a path map label.
pub(super) type RouterFn<S> = Arc<dyn Fn(&S) -> Result<&'static str, AgentError> + Send + Sync>;

#[derive(Clone)]
pub(super) struct Branch<S> {
    pub(super) router: RouterFn<S>,
    pub(super) path_map: HashMap<String, String>,
}

#[derive(Clone)]
pub(super) enum Transition<S> {
    Direct(String),
    Branch(Branch<S>),
}

/// Compiled graph: immutable topology, supports invoke and stream.
///
/// Runs from START; after each node, merges its delta, checkpoints, then follows the
/// node's fixed edge or asks its router. Stops at END, on the first error, or when
/// the number of node visits would exceed the recursion limit.
#[derive(Clone)]
pub struct CompiledStateGraph<S> {
    pub(super) nodes: HashMap<String, Arc<dyn Node<S>>>,
    pub(super) transitions: HashMap<String, Transition<S>>,
    pub(super) checkpointer: Option<Arc<dyn Checkpointer<S>>>,
    pub(super) recursion_limit: usize,
}

impl<S> CompiledStateGraph<S>
where
    S: GraphState,
{
    /// Sets the maximum number of node visits per run.
    pub fn with_recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = limit;
        self
    }

    pub fn recursion_limit(&self) -> usize {
        self.recursion_limit
    }

    /// Resolves the node that follows `current` given the merged state.
    fn next_node(&self, current: &str, state: &S) -> Result<String, AgentError> {
        let next = match self.transitions.get(current) {
            Some(Transition::Direct(to)) => to.clone(),
            Some(Transition::Branch(branch)) => {
                let label = (branch.router)(state)?;
                branch
                    .path_map
                    .get(label)
                    .cloned()
                    .ok_or_else(|| AgentError::UnknownRoute {
                        from: current.to_string(),
                        label: label.to_string(),
                    })?
            }
            None => {
                return Err(AgentError::ExecutionFailed(format!(
                    "no outgoing edge from '{}'",
                    current
                )))
            }
        };
        log_route(current, &next);
        Ok(next)
    }

    async fn save_checkpoint(
        &self,
        state: &S,
        config: &Option<RunnableConfig>,
        source: CheckpointSource,
        step: u64,
    ) -> Result<(), AgentError> {
        if let (Some(cp), Some(cfg)) = (&self.checkpointer, config) {
            if cfg.thread_id.is_some() {
                let checkpoint = Checkpoint::from_state(state.clone(), source, step);
                cp.put(cfg, &checkpoint).await?;
            }
        }
        Ok(())
    }

    /// Shared run loop used by invoke() and stream(): steps through nodes until END.
    async fn run_loop_inner(
        &self,
        state: &mut S,
        config: &Option<RunnableConfig>,
        run_ctx: Option<&RunContext<S>>,
    ) -> Result<(), AgentError> {
        log_graph_start(config.as_ref().and_then(|c| c.thread_id.as_deref()));
        let mut step: u64 = 0;
        self.save_checkpoint(state, config, CheckpointSource::Input, step)
            .await?;

        let mut current_id = START.to_string();
        loop {
            let next_id = self.next_node(&current_id, state)?;
            if next_id == END {
                log_graph_complete(step);
                return Ok(());
            }
            if step as usize >= self.recursion_limit {
                return Err(AgentError::RecursionLimit(self.recursion_limit));
            }
            if let Some(ctx) = run_ctx {
                if ctx.stream_tx.is_closed() {
                    return Err(AgentError::Cancelled);
                }
            }

            let node = self
                .nodes
                .get(&next_id)
                .cloned()
                .ok_or_else(|| AgentError::ExecutionFailed(format!("node not found: {}", next_id)))?;
            log_node_start(&next_id, step + 1);
            let update = node.run(state).await?;
            step += 1;

            match run_ctx {
                Some(ctx) => {
                    state.apply(update.clone());
                    self.save_checkpoint(state, config, CheckpointSource::Loop, step)
                        .await?;
                    log_node_complete(&next_id, step);
                    if ctx.stream_mode.contains(&StreamMode::Updates) {
                        let event = StreamEvent::Updates {
                            node_id: next_id.clone(),
                            update,
                        };
                        if ctx.stream_tx.send(event).await.is_err() {
                            return Err(AgentError::Cancelled);
                        }
                    }
                    if ctx.stream_mode.contains(&StreamMode::Values)
                        && ctx
                            .stream_tx
                            .send(StreamEvent::Values(state.clone()))
                            .await
                            .is_err()
                    {
                        return Err(AgentError::Cancelled);
                    }
                }
                None => {
                    state.apply(update);
                    self.save_checkpoint(state, config, CheckpointSource::Loop, step)
                        .await?;
                    log_node_complete(&next_id, step);
                }
            }

            current_id = next_id;
        }
    }

    /// Runs the graph to completion and returns the final state (buffered mode).
    ///
    /// When `config` has `thread_id` and the graph was compiled with a checkpointer,
    /// the input state and the state after each node are saved. On error, checkpoints
    /// of completed steps remain.
    pub async fn invoke(&self, state: S, config: Option<RunnableConfig>) -> Result<S, AgentError> {
        let mut state = state;
        if let Err(e) = self.run_loop_inner(&mut state, &config, None).await {
            log_graph_error(&e);
            return Err(e);
        }
        Ok(state)
    }

    /// Runs the graph, sending per-step events into `tx`; returns the final state.
    ///
    /// On failure an `StreamEvent::Error` is sent as the last event (unless the
    /// consumer is gone). When `tx` is closed the loop stops after its current step.
    pub async fn stream_to(
        &self,
        state: S,
        config: Option<RunnableConfig>,
        stream_mode: impl Into<HashSet<StreamMode>>,
        tx: mpsc::Sender<StreamEvent<S>>,
    ) -> Result<S, AgentError> {
        let mut state = state;
        let run_ctx = RunContext {
            config: config.clone().unwrap_or_default(),
            stream_tx: tx,
            stream_mode: stream_mode.into(),
        };
        match self.run_loop_inner(&mut state, &config, Some(&run_ctx)).await {
            Ok(()) => Ok(state),
            Err(AgentError::Cancelled) => {
                tracing::info!(
                    thread_id = run_ctx.config.thread_id.as_deref().unwrap_or("-"),
                    "stream consumer gone, run stopped"
                );
                Err(AgentError::Cancelled)
            }
            Err(e) => {
                log_graph_error(&e);
                let _ = run_ctx.stream_tx.send(StreamEvent::Error(e.clone())).await;
                Err(e)
            }
        }
    }

    /// Streams graph execution, emitting events via channel-backed Stream.
    ///
    /// The run happens on a spawned task; the stream ends when the run ends.
    /// Dropping the stream cancels the run after its current step.
    pub fn stream(
        &self,
        state: S,
        config: Option<RunnableConfig>,
        stream_mode: impl Into<HashSet<StreamMode>>,
    ) -> ReceiverStream<StreamEvent<S>> {
        let (tx, rx) = mpsc::channel(128);
        let graph = self.clone();
        let mode_set: HashSet<StreamMode> = stream_mode.into();

        tokio::spawn(async move {
            let _ = graph.stream_to(state, config, mode_set, tx).await;
        });

        ReceiverStream::new(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio_stream::StreamExt;

    use crate::graph::{Route, StateGraph, END, START};
    use crate::memory::{MemorySaver, RunnableConfig};
    use crate::stream::{StreamEvent, StreamMode};

    impl GraphState for i32 {
        type Update = i32;

        fn apply(&mut self, update: i32) {
            *self += update;
        }
    }

    #[derive(Clone)]
    struct AddNode {
        id: &'static str,
        delta: i32,
    }

    #[async_trait]
    impl Node<i32> for AddNode {
        fn id(&self) -> &str {
            self.id
        }

        async fn run(&self, _state: &i32) -> Result<i32, AgentError> {
            Ok(self.delta)
        }
    }

    struct FailNode;

    #[async_trait]
    impl Node<i32> for FailNode {
        fn id(&self) -> &str {
            "fail"
        }

        async fn run(&self, _state: &i32) -> Result<i32, AgentError> {
            Err(AgentError::ExecutionFailed("boom".into()))
        }
    }

    #[derive(Clone, Copy, Debug, PartialEq)]
    enum Loop {
        Again,
        Done,
    }

    impl Route for Loop {
        fn variants() -> &'static [Self] {
            &[Loop::Again, Loop::Done]
        }

        fn label(&self) -> &'static str {
            match self {
                Loop::Again => "again",
                Loop::Done => "done",
            }
        }
    }

    fn config(thread: &str) -> Option<RunnableConfig> {
        Some(RunnableConfig {
            thread_id: Some(thread.into()),
            ..Default::default()
        })
    }

    fn build_two_step_graph() -> CompiledStateGraph<i32> {
        let mut graph = StateGraph::<i32>::new();
        graph
            .add_node("first", Arc::new(AddNode { id: "first", delta: 1 }))
            .add_node("second", Arc::new(AddNode { id: "second", delta: 2 }))
            .add_edge(START, "first")
            .add_edge("first", "second")
            .add_edge("second", END);
        graph.compile().expect("graph compiles")
    }

    /// inc → router: below `target` loops back to inc, otherwise END.
    fn build_counter_graph(target: i32, cp: Option<Arc<MemorySaver<i32>>>) -> CompiledStateGraph<i32> {
        let mut graph = StateGraph::<i32>::new();
        graph
            .add_node("inc", Arc::new(AddNode { id: "inc", delta: 1 }))
            .add_edge(START, "inc")
            .add_conditional_edges(
                "inc",
                move |s: &i32| Ok(if *s < target { Loop::Again } else { Loop::Done }),
                [(Loop::Again, "inc"), (Loop::Done, END)],
            );
        match cp {
            Some(cp) => graph.compile_with_checkpointer(cp).expect("graph compiles"),
            None => graph.compile().expect("graph compiles"),
        }
    }

    /// **Scenario**: Linear graph applies each node's delta in edge order.
    #[tokio::test]
    async fn invoke_linear_graph_accumulates_deltas() {
        let out = build_two_step_graph().invoke(0, None).await.unwrap();
        assert_eq!(out, 3);
    }

    /// **Scenario**: Conditional edge loops until the router returns Done.
    #[tokio::test]
    async fn invoke_conditional_edge_loops_until_done() {
        let out = build_counter_graph(4, None).invoke(0, None).await.unwrap();
        assert_eq!(out, 4);
    }

    /// **Scenario**: With checkpointer and thread_id, input and every step are saved; latest is final.
    #[tokio::test]
    async fn invoke_with_checkpointer_saves_every_step() {
        let cp = Arc::new(MemorySaver::<i32>::new());
        let graph = build_counter_graph(3, Some(cp.clone()));
        let out = graph.invoke(0, config("tid-cp")).await.unwrap();
        assert_eq!(out, 3);

        let cfg = config("tid-cp").unwrap();
        let history = cp.list(&cfg, None).await.unwrap();
        assert_eq!(history.len(), 4, "input + three steps");
        let (latest, meta) = cp.get_tuple(&cfg).await.unwrap().expect("saved");
        assert_eq!(latest.channel_values, 3);
        assert_eq!(meta.step, 3);
    }

    /// **Scenario**: Without thread_id nothing is saved even when a checkpointer is set.
    #[tokio::test]
    async fn invoke_without_thread_id_saves_nothing() {
        let cp = Arc::new(MemorySaver::<i32>::new());
        let graph = build_counter_graph(2, Some(cp.clone()));
        graph.invoke(0, None).await.unwrap();
        assert_eq!(cp.thread_count(), 0);
    }

    /// **Scenario**: A router that never ends hits the recursion limit as a distinct error.
    #[tokio::test]
    async fn invoke_endless_loop_hits_recursion_limit() {
        let graph = build_counter_graph(i32::MAX, None).with_recursion_limit(5);
        match graph.invoke(0, None).await {
            Err(AgentError::RecursionLimit(5)) => {}
            other => panic!("expected RecursionLimit(5), got {:?}", other),
        }
    }

    /// **Scenario**: Router label missing from the path map fails the run; checkpoints stop
    /// at the last completed node.
    #[tokio::test]
    async fn invoke_unmapped_label_fails_and_keeps_completed_steps() {
        let cp = Arc::new(MemorySaver::<i32>::new());
        let mut transitions = HashMap::new();
        transitions.insert(START.to_string(), Transition::Direct("inc".to_string()));
        transitions.insert(
            "inc".to_string(),
            Transition::Branch(Branch {
                router: Arc::new(|_: &i32| -> Result<&'static str, AgentError> { Ok("maybe") }),
                path_map: HashMap::from([("yes".to_string(), END.to_string())]),
            }),
        );
        let mut nodes: HashMap<String, Arc<dyn Node<i32>>> = HashMap::new();
        nodes.insert("inc".into(), Arc::new(AddNode { id: "inc", delta: 7 }));
        let graph = CompiledStateGraph {
            nodes,
            transitions,
            checkpointer: Some(cp.clone() as Arc<dyn Checkpointer<i32>>),
            recursion_limit: DEFAULT_RECURSION_LIMIT,
        };

        match graph.invoke(0, config("tid-e")).await {
            Err(AgentError::UnknownRoute { from, label }) => {
                assert_eq!(from, "inc");
                assert_eq!(label, "maybe");
            }
            other => panic!("expected UnknownRoute, got {:?}", other),
        }
        let (latest, _) = cp.get_tuple(&config("tid-e").unwrap()).await.unwrap().unwrap();
        assert_eq!(latest.channel_values, 7, "state after inc is persisted");
    }

    /// **Scenario**: A failing node aborts the run; previously completed steps stay persisted.
    #[tokio::test]
    async fn invoke_node_failure_keeps_prior_checkpoint() {
        let cp = Arc::new(MemorySaver::<i32>::new());
        let mut graph = StateGraph::<i32>::new();
        graph
            .add_node("first", Arc::new(AddNode { id: "first", delta: 2 }))
            .add_node("fail", Arc::new(FailNode))
            .add_edge(START, "first")
            .add_edge("first", "fail")
            .add_edge("fail", END);
        let graph = graph.compile_with_checkpointer(cp.clone()).unwrap();

        let err = graph.invoke(0, config("tid-f")).await.unwrap_err();
        assert!(matches!(err, AgentError::ExecutionFailed(ref m) if m == "boom"));
        let (latest, meta) = cp.get_tuple(&config("tid-f").unwrap()).await.unwrap().unwrap();
        assert_eq!(latest.channel_values, 2);
        assert_eq!(meta.step, 1);
    }

    /// **Scenario**: stream(updates) emits one event per node visit with its delta, in order.
    #[tokio::test]
    async fn stream_updates_emit_node_ids_and_deltas_in_order() {
        let graph = build_two_step_graph();
        let events: Vec<_> = graph
            .stream(0, None, HashSet::from_iter([StreamMode::Updates]))
            .collect()
            .await;
        let steps: Vec<_> = events
            .iter()
            .map(|e| match e {
                StreamEvent::Updates { node_id, update } => (node_id.clone(), *update),
                other => panic!("unexpected event {:?}", other),
            })
            .collect();
        assert_eq!(steps, vec![("first".to_string(), 1), ("second".to_string(), 2)]);
    }

    /// **Scenario**: stream(Values+Updates) emits Updates then Values per node; last Values is final.
    #[tokio::test]
    async fn stream_values_and_updates_both_enabled() {
        let graph = build_two_step_graph();
        let events: Vec<_> = graph
            .stream(
                0,
                None,
                HashSet::from_iter([StreamMode::Values, StreamMode::Updates]),
            )
            .collect()
            .await;
        assert_eq!(events.len(), 4, "two nodes: two Updates + two Values");
        assert!(matches!(&events[0], StreamEvent::Updates { node_id, .. } if node_id == "first"));
        assert!(matches!(&events[1], StreamEvent::Values(1)));
        assert!(matches!(&events[2], StreamEvent::Updates { node_id, .. } if node_id == "second"));
        assert!(matches!(&events[3], StreamEvent::Values(3)));
    }

    /// **Scenario**: Buffered and streaming runs reach the same final state.
    #[tokio::test]
    async fn stream_and_invoke_agree_on_final_state() {
        let graph = build_counter_graph(6, None);
        let invoked = graph.invoke(1, None).await.unwrap();
        let events: Vec<_> = graph
            .stream(1, None, HashSet::from_iter([StreamMode::Values]))
            .collect()
            .await;
        assert!(matches!(events.last(), Some(StreamEvent::Values(v)) if *v == invoked));
    }

    /// **Scenario**: A failing node ends the stream with an Error event.
    #[tokio::test]
    async fn stream_failure_ends_with_error_event() {
        let mut graph = StateGraph::<i32>::new();
        graph
            .add_node("first", Arc::new(AddNode { id: "first", delta: 1 }))
            .add_node("fail", Arc::new(FailNode))
            .add_edge(START, "first")
            .add_edge("first", "fail")
            .add_edge("fail", END);
        let graph = graph.compile().unwrap();
        let events: Vec<_> = graph
            .stream(0, None, HashSet::from_iter([StreamMode::Updates]))
            .collect()
            .await;
        assert_eq!(events.len(), 2);
        assert!(matches!(&events[0], StreamEvent::Updates { node_id, .. } if node_id == "first"));
        assert!(matches!(
            &events[1],
            StreamEvent::Error(AgentError::ExecutionFailed(m)) if m == "boom"
        ));
    }

    /// **Scenario**: Dropping the stream stops an endless run; no further steps are checkpointed.
    #[tokio::test]
    async fn dropping_stream_cancels_run() {
        let cp = Arc::new(MemorySaver::<i32>::unbounded());
        let graph = build_counter_graph(i32::MAX, Some(cp.clone())).with_recursion_limit(100_000);
        let mut stream = graph.stream(0, config("tid-c"), HashSet::from_iter([StreamMode::Updates]));
        assert!(stream.next().await.is_some());
        drop(stream);

        tokio::time::sleep(Duration::from_millis(50)).await;
        let cfg = config("tid-c").unwrap();
        let first = cp.list(&cfg, None).await.unwrap().len();
        tokio::time::sleep(Duration::from_millis(50)).await;
        let second = cp.list(&cfg, None).await.unwrap().len();
        assert_eq!(first, second, "run must have stopped");
        assert!(first < 1_000, "run stopped early, saw {} checkpoints", first);
    }
}
