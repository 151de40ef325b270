// 🕸️ Graph Model & Assembler - Directed water-supply graph
// Nodes and edges are derived, never created independently: they exist only
// as the output of one pipeline run and the graph is rebuilt wholesale.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// Node identifier: an opaque string. Numeric survey numbers are never
/// compared numerically.
pub type NodeId = String;

// ============================================================================
// EDGE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    Intake,
    Sale,
}

impl EdgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::Intake => "intake",
            EdgeKind::Sale => "sale",
        }
    }
}

/// One directed supply relationship. `source == None` marks a resolution
/// failure (orphan edge): emitted and counted, but never admitted into an
/// assembled graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    pub source: Option<NodeId>,
    pub target: NodeId,

    #[serde(rename = "type")]
    pub kind: EdgeKind,

    pub yearly_volume: Option<f64>,
    pub year: Option<i64>,
    pub water_type: Option<String>,
    pub purchased_self: Option<String>,
    pub source_file: String,
}

impl Edge {
    pub fn is_orphan(&self) -> bool {
        self.source.is_none()
    }

    /// Ordered endpoint pair, for reconciliation grouping
    pub fn endpoints(&self) -> Option<(NodeId, NodeId)> {
        self.source
            .as_ref()
            .map(|s| (s.clone(), self.target.clone()))
    }
}

// ============================================================================
// NODE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeType {
    #[serde(rename = "water source")]
    WaterSource,

    #[serde(rename = "water system")]
    WaterSystem,
}

impl NodeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::WaterSource => "water source",
            NodeType::WaterSystem => "water system",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub preliminary_type: NodeType,
    pub unified_name: Option<String>,

    /// Retail/survey enrichment fields, copied verbatim from the source row
    #[serde(default)]
    pub attributes: HashMap<String, Value>,
}

// ============================================================================
// GRAPH
// ============================================================================

/// Directed graph with exclusive ownership of its node and edge mappings.
/// Ordered maps keep iteration and export deterministic across reruns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Graph {
    pub directed: bool,
    pub nodes: BTreeMap<NodeId, Node>,
    pub edges: BTreeMap<String, Edge>,
}

impl Graph {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

// ============================================================================
// ASSEMBLY ERRORS
// ============================================================================

/// Violation of the node/edge referential invariant. This indicates
/// pipeline corruption, not bad input data, and aborts the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// An edge references a node id absent from the classified node set
    MissingEndpoint { edge: String, node: NodeId },

    /// An orphan edge (null source) reached assembly
    OrphanEdge { edge: String },

    /// Two edges share an id
    DuplicateEdgeId { edge: String },
}

impl std::fmt::Display for GraphError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GraphError::MissingEndpoint { edge, node } => {
                write!(f, "edge {} references unknown node {}", edge, node)
            }
            GraphError::OrphanEdge { edge } => {
                write!(f, "orphan edge {} reached graph assembly", edge)
            }
            GraphError::DuplicateEdgeId { edge } => {
                write!(f, "duplicate edge id {}", edge)
            }
        }
    }
}

impl std::error::Error for GraphError {}

// ============================================================================
// ASSEMBLER
// ============================================================================

/// Build the graph from classified nodes and reconciled edges, enforcing
/// the referential invariant: every endpoint must exist in the node map.
pub fn assemble(nodes: BTreeMap<NodeId, Node>, edges: Vec<Edge>) -> Result<Graph, GraphError> {
    let mut edge_map = BTreeMap::new();

    for edge in edges {
        let source = match &edge.source {
            Some(source) => source.clone(),
            None => return Err(GraphError::OrphanEdge { edge: edge.id }),
        };

        if !nodes.contains_key(&source) {
            return Err(GraphError::MissingEndpoint {
                edge: edge.id,
                node: source,
            });
        }
        if !nodes.contains_key(&edge.target) {
            return Err(GraphError::MissingEndpoint {
                edge: edge.id.clone(),
                node: edge.target.clone(),
            });
        }

        if edge_map.contains_key(&edge.id) {
            return Err(GraphError::DuplicateEdgeId { edge: edge.id });
        }
        edge_map.insert(edge.id.clone(), edge);
    }

    Ok(Graph {
        directed: true,
        nodes,
        edges: edge_map,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    pub fn node(id: &str, node_type: NodeType) -> Node {
        Node {
            id: id.to_string(),
            preliminary_type: node_type,
            unified_name: Some(id.to_string()),
            attributes: HashMap::new(),
        }
    }

    pub fn edge(id: &str, source: &str, target: &str) -> Edge {
        Edge {
            id: id.to_string(),
            source: Some(source.to_string()),
            target: target.to_string(),
            kind: EdgeKind::Intake,
            yearly_volume: None,
            year: None,
            water_type: None,
            purchased_self: None,
            source_file: "intake.csv".to_string(),
        }
    }

    #[test]
    fn test_assemble_holds_referential_invariant() {
        let mut nodes = BTreeMap::new();
        nodes.insert("A".to_string(), node("A", NodeType::WaterSource));
        nodes.insert("B".to_string(), node("B", NodeType::WaterSystem));

        let graph = assemble(nodes, vec![edge("intake_0", "A", "B")]).unwrap();

        assert!(graph.directed);
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        for e in graph.edges.values() {
            assert!(graph.nodes.contains_key(e.source.as_ref().unwrap()));
            assert!(graph.nodes.contains_key(&e.target));
        }
    }

    #[test]
    fn test_assemble_rejects_missing_endpoint() {
        let mut nodes = BTreeMap::new();
        nodes.insert("A".to_string(), node("A", NodeType::WaterSource));

        let err = assemble(nodes, vec![edge("intake_0", "A", "B")]).unwrap_err();
        assert_eq!(
            err,
            GraphError::MissingEndpoint {
                edge: "intake_0".to_string(),
                node: "B".to_string(),
            }
        );
    }

    #[test]
    fn test_assemble_rejects_orphan_edge() {
        let mut nodes = BTreeMap::new();
        nodes.insert("B".to_string(), node("B", NodeType::WaterSystem));

        let mut orphan = edge("intake_0", "A", "B");
        orphan.source = None;

        let err = assemble(nodes, vec![orphan]).unwrap_err();
        assert!(matches!(err, GraphError::OrphanEdge { .. }));
    }
}
