//! A graph of automatic nodes and the connections between their pins.
//!
//! Loading is two-phase: [`Graph::load`] rebuilds structure only, and
//! [`Graph::resolve`] binds every node to the catalog afterwards.

use std::collections::{HashMap, HashSet, VecDeque};

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::LibraryError;
use crate::model::{Value, ValueType};
use crate::node::{AutomaticNode, AutomaticNodeState, Connection, NodeExecutionResult, PinRef};
use crate::plugin::ExtensionCatalog;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ConnectionState {
    pub from: PinRef,
    pub to: PinRef,
    pub data_type: ValueType,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct GraphState {
    pub nodes: Vec<AutomaticNodeState>,
    #[serde(default)]
    pub connections: Vec<ConnectionState>,
}

/// A node that could not be bound to a callable.
#[derive(Debug)]
pub struct ResolutionFailure {
    pub node: Uuid,
    pub node_type: String,
    pub error: LibraryError,
}

#[derive(Default)]
pub struct Graph {
    nodes: Vec<AutomaticNode>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, node: AutomaticNode) -> Uuid {
        let id = node.id;
        self.nodes.push(node);
        id
    }

    pub fn remove_node(&mut self, id: Uuid) -> Option<AutomaticNode> {
        let index = self.nodes.iter().position(|n| n.id == id)?;
        let removed = self.nodes.remove(index);
        for node in &mut self.nodes {
            for pin in 0..node.inputs().len() {
                if let Some(input) = node.input_mut(pin) {
                    input.disconnect_node(id);
                }
            }
        }
        Some(removed)
    }

    pub fn node(&self, id: Uuid) -> Option<&AutomaticNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: Uuid) -> Option<&mut AutomaticNode> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn nodes(&self) -> &[AutomaticNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Connects an output pin to an input pin.
    ///
    /// Self-connections and connections that would close a cycle are
    /// rejected.
    pub fn connect(&mut self, from: PinRef, to: PinRef) -> Result<(), LibraryError> {
        let source = self
            .node(from.node)
            .ok_or_else(|| LibraryError::Graph(format!("Source node {} not found", from.node)))?;
        let data_type = source
            .outputs()
            .get(from.pin)
            .map(|pin| pin.data_type.clone())
            .ok_or_else(|| {
                LibraryError::Graph(format!("Node {} has no output pin {}", from.node, from.pin))
            })?;

        if from.node == to.node {
            return Err(LibraryError::Graph("Cannot connect a node to itself".to_string()));
        }
        if self.reaches(to.node, from.node) {
            return Err(LibraryError::Graph("Connection would create a cycle".to_string()));
        }

        let target = self
            .node_mut(to.node)
            .ok_or_else(|| LibraryError::Graph(format!("Destination node {} not found", to.node)))?;
        let input = target.input_mut(to.pin).ok_or_else(|| {
            LibraryError::Graph(format!("Node {} has no input pin {}", to.node, to.pin))
        })?;
        input.connect(Connection::new(from, data_type));
        Ok(())
    }

    fn upstream_of(&self, id: Uuid) -> Vec<Uuid> {
        self.node(id)
            .map(|node| {
                node.inputs()
                    .iter()
                    .flat_map(|pin| pin.connections().iter().map(|c| c.source.node))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Whether `to` is reachable from `from` following connections downstream.
    fn reaches(&self, from: Uuid, to: Uuid) -> bool {
        let mut visited = HashSet::new();
        let mut queue = VecDeque::from([to]);
        // Walk upstream from `to`; finding `from` means `from` feeds `to`.
        while let Some(current) = queue.pop_front() {
            if current == from {
                return true;
            }
            if visited.insert(current) {
                queue.extend(self.upstream_of(current));
            }
        }
        false
    }

    /// Upstream nodes of `id` in dependency order, ending with `id`.
    fn evaluation_order(&self, id: Uuid) -> Result<Vec<Uuid>, LibraryError> {
        fn visit(
            graph: &Graph,
            id: Uuid,
            visiting: &mut HashSet<Uuid>,
            done: &mut HashSet<Uuid>,
            order: &mut Vec<Uuid>,
        ) -> Result<(), LibraryError> {
            if done.contains(&id) {
                return Ok(());
            }
            if !visiting.insert(id) {
                return Err(LibraryError::Graph(format!("Cycle detected at node {}", id)));
            }
            if graph.node(id).is_none() {
                return Err(LibraryError::Graph(format!("Node {} not found", id)));
            }
            for upstream in graph.upstream_of(id) {
                visit(graph, upstream, visiting, done, order)?;
            }
            visiting.remove(&id);
            done.insert(id);
            order.push(id);
            Ok(())
        }

        let mut order = Vec::new();
        visit(self, id, &mut HashSet::new(), &mut HashSet::new(), &mut order)?;
        Ok(order)
    }

    /// Executes `id` after everything it depends on.
    ///
    /// Structural problems are errors; a failing node yields an error result.
    /// When an upstream node fails its result is returned as is, and every
    /// node left unexecuted (the target included) loses its cached outputs.
    pub fn execute(&mut self, id: Uuid) -> Result<NodeExecutionResult, LibraryError> {
        let order = self.evaluation_order(id)?;
        let mut values: HashMap<PinRef, Value> = HashMap::new();

        for (position, node_id) in order.iter().copied().enumerate() {
            let node = self
                .node_mut(node_id)
                .ok_or_else(|| LibraryError::Graph(format!("Node {} not found", node_id)))?;
            let result = node.execute(&values);
            if node_id == id {
                return Ok(result);
            }
            if result.is_error() {
                warn!(
                    "Upstream node `{}` failed: {}",
                    node.node_type(),
                    result.message.content
                );
                for skipped in &order[position + 1..] {
                    if let Some(node) = self.node_mut(*skipped) {
                        node.clear_outputs();
                    }
                }
                return Ok(result);
            }
            if let Some(outputs) = &result.outputs {
                values.extend(
                    outputs
                        .iter()
                        .map(|(pin, value)| (PinRef::new(node_id, *pin), value.clone())),
                );
            }
        }
        Err(LibraryError::Graph(format!("Node {} not found", id)))
    }

    pub fn state(&self) -> GraphState {
        let connections = self
            .nodes
            .iter()
            .flat_map(|node| {
                node.inputs().iter().enumerate().flat_map(move |(pin, input)| {
                    input.connections().iter().map(move |c| ConnectionState {
                        from: c.source,
                        to: PinRef::new(node.id, pin),
                        data_type: c.data_type.clone(),
                    })
                })
            })
            .collect();
        GraphState {
            nodes: self.nodes.iter().map(AutomaticNode::state).collect(),
            connections,
        }
    }

    pub fn save(&self) -> Result<String, LibraryError> {
        Ok(serde_json::to_string_pretty(&self.state())?)
    }

    /// Rebuilds the graph structure. Nodes stay unresolved until
    /// [`Graph::resolve`] runs.
    pub fn load(json_str: &str) -> Result<Self, LibraryError> {
        let state: GraphState = serde_json::from_str(json_str)?;
        Self::from_state(state)
    }

    pub fn from_state(state: GraphState) -> Result<Self, LibraryError> {
        let mut graph = Graph {
            nodes: state.nodes.into_iter().map(AutomaticNode::from_state).collect(),
        };

        let mut incoming: HashMap<PinRef, Vec<Connection>> = HashMap::new();
        for connection in state.connections {
            if graph.node(connection.from.node).is_none() {
                return Err(LibraryError::Graph(format!(
                    "Connection from unknown node {}",
                    connection.from.node
                )));
            }
            incoming
                .entry(connection.to)
                .or_default()
                .push(Connection::new(connection.from, connection.data_type));
        }
        for (to, connections) in incoming {
            let input = graph
                .node_mut(to.node)
                .and_then(|node| node.input_mut(to.pin))
                .ok_or_else(|| {
                    LibraryError::Graph(format!("Node {} has no input pin {}", to.node, to.pin))
                })?;
            input.restore_connections(connections);
        }
        debug!("Loaded graph with {} node(s)", graph.len());
        Ok(graph)
    }

    /// Binds every unresolved node to the catalog.
    ///
    /// Failures are collected per node; the remaining nodes still resolve.
    pub fn resolve(&mut self, catalog: &ExtensionCatalog) -> Vec<ResolutionFailure> {
        let mut failures = Vec::new();
        for node in self.nodes.iter_mut().filter(|n| !n.is_resolved()) {
            if let Err(error) = node.resolve(catalog) {
                warn!("Could not resolve node `{}`: {}", node.node_type(), error);
                failures.push(ResolutionFailure {
                    node: node.id,
                    node_type: node.node_type().to_string(),
                    error,
                });
            }
        }
        failures
    }
}
