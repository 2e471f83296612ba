//! Shared types for StateGraph integration tests.

use async_trait::async_trait;
use raggraph::{AgentError, GraphState, Node, Route};

/// Counter state with a log of visited nodes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CounterState {
    pub value: i64,
    pub visited: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CounterUpdate {
    pub delta: i64,
    pub node: String,
}

impl GraphState for CounterState {
    type Update = CounterUpdate;

    fn apply(&mut self, update: CounterUpdate) {
        self.value += update.delta;
        self.visited.push(update.node);
    }
}

/// Adds `delta` to the counter.
pub struct AddNode {
    pub id: &'static str,
    pub delta: i64,
}

impl AddNode {
    pub fn new(id: &'static str, delta: i64) -> Self {
        Self { id, delta }
    }
}

#[async_trait]
impl Node<CounterState> for AddNode {
    fn id(&self) -> &str {
        self.id
    }

    async fn run(&self, _state: &CounterState) -> Result<CounterUpdate, AgentError> {
        Ok(CounterUpdate {
            delta: self.delta,
            node: self.id.to_string(),
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Parity {
    Even,
    Odd,
}

impl Route for Parity {
    fn variants() -> &'static [Self] {
        &[Parity::Even, Parity::Odd]
    }

    fn label(&self) -> &'static str {
        match self {
            Parity::Even => "even",
            Parity::Odd => "odd",
        }
    }
}

pub fn parity(state: &CounterState) -> Result<Parity, AgentError> {
    Ok(if state.value % 2 == 0 { Parity::Even } else { Parity::Odd })
}

/// A route whose `variants` under-reports the labels it can return; the path map check
/// at compile time cannot see `Maybe`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Leaky {
    Yes,
    Maybe,
}

impl Route for Leaky {
    fn variants() -> &'static [Self] {
        &[Leaky::Yes]
    }

    fn label(&self) -> &'static str {
        match self {
            Leaky::Yes => "yes",
            Leaky::Maybe => "maybe",
        }
    }
}
