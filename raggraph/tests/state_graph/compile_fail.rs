//! StateGraph compile failure cases: unknown node, missing start, incomplete route maps.

use std::sync::Arc;

use raggraph::{CompilationError, StateGraph, END, START};

use crate::common::{parity, AddNode, CounterState, Parity};

#[tokio::test]
async fn compile_fails_when_edge_refers_to_unknown_node() {
    let mut graph = StateGraph::<CounterState>::new();
    graph.add_node("a", Arc::new(AddNode::new("a", 1)));
    graph.add_edge(START, "a");
    graph.add_edge("a", "missing");

    match graph.compile() {
        Err(CompilationError::NodeNotFound(id)) => assert_eq!(id, "missing"),
        _ => panic!("expected NodeNotFound"),
    }
}

#[tokio::test]
async fn compile_fails_without_start_edge() {
    let mut graph = StateGraph::<CounterState>::new();
    graph.add_node("a", Arc::new(AddNode::new("a", 1)));
    graph.add_edge("a", END);
    assert!(matches!(graph.compile(), Err(CompilationError::MissingStart)));
}

#[tokio::test]
async fn compile_fails_when_node_has_no_outgoing_edge() {
    let mut graph = StateGraph::<CounterState>::new();
    graph
        .add_node("a", Arc::new(AddNode::new("a", 1)))
        .add_node("b", Arc::new(AddNode::new("b", 1)))
        .add_edge(START, "a")
        .add_edge("a", END);
    match graph.compile() {
        Err(CompilationError::MissingEdge(id)) => assert_eq!(id, "b"),
        _ => panic!("expected MissingEdge"),
    }
}

#[tokio::test]
async fn compile_fails_when_node_has_edge_and_router() {
    let mut graph = StateGraph::<CounterState>::new();
    graph
        .add_node("a", Arc::new(AddNode::new("a", 1)))
        .add_edge(START, "a")
        .add_edge("a", END)
        .add_conditional_edges("a", parity, [(Parity::Even, END), (Parity::Odd, "a")]);
    match graph.compile() {
        Err(CompilationError::DuplicateEdge(id)) => assert_eq!(id, "a"),
        _ => panic!("expected DuplicateEdge"),
    }
}

#[tokio::test]
async fn compile_fails_when_route_variant_unmapped() {
    let mut graph = StateGraph::<CounterState>::new();
    graph
        .add_node("a", Arc::new(AddNode::new("a", 1)))
        .add_edge(START, "a")
        .add_conditional_edges("a", parity, [(Parity::Even, END)]);
    match graph.compile() {
        Err(CompilationError::IncompleteRouteMap { from, label }) => {
            assert_eq!(from, "a");
            assert_eq!(label, "odd");
        }
        _ => panic!("expected IncompleteRouteMap"),
    }
}

#[tokio::test]
async fn compile_fails_when_edge_leaves_end() {
    let mut graph = StateGraph::<CounterState>::new();
    graph
        .add_node("a", Arc::new(AddNode::new("a", 1)))
        .add_edge(START, "a")
        .add_edge("a", END)
        .add_edge(END, "a");
    assert!(matches!(graph.compile(), Err(CompilationError::InvalidEdge(_))));
}

fn broken_topology() -> StateGraph<CounterState> {
    let mut graph = StateGraph::<CounterState>::new();
    graph
        .add_node("a", Arc::new(AddNode::new("a", 1)))
        .add_edge(START, "a")
        .add_conditional_edges("a", parity, [(Parity::Odd, "ghost"), (Parity::Even, END)]);
    graph
}

/// Validating the same topology twice gives the same verdict.
#[tokio::test]
async fn compile_validation_is_idempotent() {
    let first = broken_topology().compile().err();
    let second = broken_topology().compile().err();
    assert_eq!(first, second);
    assert_eq!(first, Some(CompilationError::NodeNotFound("ghost".into())));
}
