//! Run context for streaming execution.
//!
//! Holds the runnable config, the stream sender and the selected stream modes.

use std::collections::HashSet;

use tokio::sync::mpsc;

use crate::memory::RunnableConfig;
use crate::stream::{StreamEvent, StreamMode};

use super::GraphState;

#[derive(Clone)]
pub struct RunContext<S>
where
    S: GraphState,
{
    /// Config for the current run (thread_id, checkpoint namespace).
    pub config: RunnableConfig,
    /// Sender for streaming events; closed when the consumer drops the stream.
    pub stream_tx: mpsc::Sender<StreamEvent<S>>,
    /// Enabled stream modes (Values, Updates).
    pub stream_mode: HashSet<StreamMode>,
}
