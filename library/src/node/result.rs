use std::collections::HashMap;
use std::time::Duration;

use crate::model::Value;
use crate::util::timing::format_elapsed;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeMessageType {
    Normal,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeMessage {
    pub content: String,
    pub kind: NodeMessageType,
}

/// Outcome of one node execution. Failures carry no outputs.
#[derive(Debug, Clone)]
pub struct NodeExecutionResult {
    pub message: NodeMessage,
    /// Produced values keyed by output pin index.
    pub outputs: Option<HashMap<usize, Value>>,
    pub elapsed: Option<Duration>,
}

impl NodeExecutionResult {
    pub fn finished(elapsed: Duration, outputs: HashMap<usize, Value>) -> Self {
        Self {
            message: NodeMessage {
                content: format!("Finished in {}", format_elapsed(elapsed)),
                kind: NodeMessageType::Normal,
            },
            outputs: Some(outputs),
            elapsed: Some(elapsed),
        }
    }

    pub fn error(detail: &str) -> Self {
        Self {
            message: NodeMessage {
                content: format!("Error: {}", detail),
                kind: NodeMessageType::Error,
            },
            outputs: None,
            elapsed: None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.message.kind == NodeMessageType::Error
    }

    pub fn output(&self, index: usize) -> Option<&Value> {
        self.outputs.as_ref().and_then(|outputs| outputs.get(&index))
    }
}
