//! StateGraph invoke/stream behavior through the public API.

use std::sync::Arc;

use raggraph::{
    AgentError, CheckpointSource, Checkpointer, CompiledStateGraph, MemorySaver, RunnableConfig,
    StateGraph, StreamEvent, StreamMode, END, START,
};
use tokio_stream::StreamExt;

use crate::common::{parity, AddNode, CounterState, CounterUpdate, Leaky, Parity};

/// a(+1) → parity router: odd → b(+2) → a; even → END.
fn parity_graph(cp: Option<Arc<MemorySaver<CounterState>>>) -> CompiledStateGraph<CounterState> {
    let mut graph = StateGraph::<CounterState>::new();
    graph
        .add_node("a", Arc::new(AddNode::new("a", 1)))
        .add_node("b", Arc::new(AddNode::new("b", 2)))
        .add_edge(START, "a")
        .add_conditional_edges("a", parity, [(Parity::Odd, "b"), (Parity::Even, END)])
        .add_edge("b", "a");
    match cp {
        Some(cp) => graph.compile_with_checkpointer(cp).expect("compile"),
        None => graph.compile().expect("compile"),
    }
}

#[tokio::test]
async fn invoke_follows_router_deterministically() {
    let graph = parity_graph(None);
    let one = graph.invoke(CounterState::default(), None).await.unwrap();
    let two = graph.invoke(CounterState::default(), None).await.unwrap();
    assert_eq!(one, two);
    assert_eq!(one.visited, vec!["a", "b", "a"]);
    assert_eq!(one.value, 4);

    let from_odd = CounterState {
        value: 1,
        visited: vec![],
    };
    let out = graph.invoke(from_odd, None).await.unwrap();
    assert_eq!(out.visited, vec!["a"]);
}

/// Streaming emits one update per node visit and ends in the same state invoke returns.
#[tokio::test]
async fn stream_updates_match_invoke() {
    let graph = parity_graph(None);
    let invoked = graph.invoke(CounterState::default(), None).await.unwrap();

    let events: Vec<_> = graph
        .stream(CounterState::default(), None, [StreamMode::Updates, StreamMode::Values])
        .collect()
        .await;
    let updates: Vec<&CounterUpdate> = events
        .iter()
        .filter_map(|e| match e {
            StreamEvent::Updates { update, .. } => Some(update),
            _ => None,
        })
        .collect();
    assert_eq!(updates.len(), 3);
    let last_values = events.iter().rev().find_map(|e| match e {
        StreamEvent::Values(s) => Some(s.clone()),
        _ => None,
    });
    assert_eq!(last_values, Some(invoked));
}

/// A router label outside the path map is a fatal routing error; the store holds
/// state up to the last completed node.
#[tokio::test]
async fn unmapped_label_fails_run_and_keeps_completed_steps() {
    let cp = Arc::new(MemorySaver::<CounterState>::new());
    let mut graph = StateGraph::<CounterState>::new();
    graph
        .add_node("a", Arc::new(AddNode::new("a", 5)))
        .add_edge(START, "a")
        .add_conditional_edges("a", |_: &CounterState| Ok(Leaky::Maybe), [(Leaky::Yes, END)]);
    let graph = graph.compile_with_checkpointer(cp.clone()).expect("compile");

    let config = RunnableConfig::for_thread("e");
    match graph.invoke(CounterState::default(), Some(config.clone())).await {
        Err(AgentError::UnknownRoute { from, label }) => {
            assert_eq!(from, "a");
            assert_eq!(label, "maybe");
        }
        other => panic!("expected UnknownRoute, got {:?}", other),
    }

    let (latest, meta) = cp.get_tuple(&config).await.unwrap().expect("saved");
    assert_eq!(latest.channel_values.value, 5);
    assert_eq!(latest.channel_values.visited, vec!["a"]);
    assert_eq!(meta.source, CheckpointSource::Loop);
    assert_eq!(meta.step, 1);
}

/// Checkpoint history is newest first with the input last; a checkpoint id loads that snapshot.
#[tokio::test]
async fn checkpoint_history_is_addressable() {
    let cp = Arc::new(MemorySaver::<CounterState>::new());
    let graph = parity_graph(Some(cp.clone()));
    let config = RunnableConfig::for_thread("h");
    graph.invoke(CounterState::default(), Some(config.clone())).await.unwrap();

    let history = cp.list(&config, None).await.unwrap();
    assert_eq!(history.len(), 4, "input + three node steps");
    let input = history.last().expect("input checkpoint");
    assert_eq!(input.metadata.source, CheckpointSource::Input);

    let at_input = RunnableConfig {
        checkpoint_id: Some(input.checkpoint_id.clone()),
        ..config.clone()
    };
    let (cp_input, _) = cp.get_tuple(&at_input).await.unwrap().expect("input saved");
    assert_eq!(cp_input.channel_values, CounterState::default());

    let limited = cp.list(&config, Some(2)).await.unwrap();
    assert_eq!(limited.len(), 2);
    assert_eq!(limited[0].checkpoint_id, history[0].checkpoint_id);
}
