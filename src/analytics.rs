// 📊 Analytics Engine - Structural metrics over the assembled graph
// Pure read operations: the engine borrows the graph and never mutates it.
// All traversal runs over a dense index-based adjacency view built once.

use crate::graph::{Graph, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, VecDeque};

// ============================================================================
// ADJACENCY VIEW
// ============================================================================

/// Dense, integer-indexed view of the graph topology. Node ids map to
/// indices 0..n in sorted-id order, so reruns index identically.
pub struct AdjacencyView {
    ids: Vec<NodeId>,
    outgoing: Vec<Vec<usize>>,
    incoming: Vec<Vec<usize>>,
}

impl AdjacencyView {
    pub fn from_graph(graph: &Graph) -> Self {
        let ids: Vec<NodeId> = graph.nodes.keys().cloned().collect();
        let index_of: HashMap<&str, usize> = ids
            .iter()
            .enumerate()
            .map(|(index, id)| (id.as_str(), index))
            .collect();

        let mut outgoing = vec![Vec::new(); ids.len()];
        let mut incoming = vec![Vec::new(); ids.len()];

        for edge in graph.edges.values() {
            // assembly already guaranteed both endpoints exist
            let source = edge.source.as_deref().and_then(|s| index_of.get(s));
            let target = index_of.get(edge.target.as_str());
            if let (Some(&source), Some(&target)) = (source, target) {
                outgoing[source].push(target);
                incoming[target].push(source);
            }
        }

        AdjacencyView {
            ids,
            outgoing,
            incoming,
        }
    }

    pub fn node_count(&self) -> usize {
        self.ids.len()
    }

    pub fn node_id(&self, index: usize) -> &NodeId {
        &self.ids[index]
    }

    /// Incident edge count, in + out. Parallel edges each count once.
    pub fn degree(&self, index: usize) -> usize {
        self.outgoing[index].len() + self.incoming[index].len()
    }
}

/// Single-source unweighted shortest paths (BFS). An independent,
/// side-effect-free unit of work: one call per node, no shared state, so a
/// parallel fan-out over sources needs no redesign.
pub fn single_source_distances(outgoing: &[Vec<usize>], start: usize) -> Vec<Option<u32>> {
    let mut distances = vec![None; outgoing.len()];
    let mut queue = VecDeque::new();

    distances[start] = Some(0);
    queue.push_back(start);

    while let Some(current) = queue.pop_front() {
        let next_distance = distances[current].unwrap_or(0) + 1;
        for &neighbor in &outgoing[current] {
            if distances[neighbor].is_none() {
                distances[neighbor] = Some(next_distance);
                queue.push_back(neighbor);
            }
        }
    }

    distances
}

// ============================================================================
// SUMMARY METRICS
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphSummary {
    pub nodes: usize,
    pub edges: usize,
    pub is_directed: bool,

    /// edges / (nodes × (nodes − 1)); 0.0 for degenerate graphs
    pub density: f64,

    /// (2 × edges) / nodes; 0.0 for the empty graph
    pub average_degree: f64,

    /// Connected components when direction is ignored
    pub weak_component_count: usize,
}

/// One row of the degree distribution: P(k) over observed degrees
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DegreeBucket {
    pub degree: usize,
    pub count: usize,
    pub probability: f64,
}

// ============================================================================
// ANALYTICS ENGINE
// ============================================================================

pub struct AnalyticsEngine<'g> {
    graph: &'g Graph,
    view: AdjacencyView,
}

impl<'g> AnalyticsEngine<'g> {
    pub fn new(graph: &'g Graph) -> Self {
        AnalyticsEngine {
            graph,
            view: AdjacencyView::from_graph(graph),
        }
    }

    /// Basic topographic metrics
    pub fn summary(&self) -> GraphSummary {
        let nodes = self.graph.node_count();
        let edges = self.graph.edge_count();

        let density = if nodes <= 1 {
            0.0
        } else {
            edges as f64 / (nodes as f64 * (nodes as f64 - 1.0))
        };
        let average_degree = if nodes == 0 {
            0.0
        } else {
            (2.0 * edges as f64) / nodes as f64
        };

        GraphSummary {
            nodes,
            edges,
            is_directed: self.graph.directed,
            density,
            average_degree,
            weak_component_count: self.weak_component_count(),
        }
    }

    /// (degree, count, probability) triples ordered by degree ascending.
    /// Probabilities sum to 1.0 for any non-empty graph.
    pub fn degree_distribution(&self) -> Vec<DegreeBucket> {
        let n = self.view.node_count();
        let mut counts: BTreeMap<usize, usize> = BTreeMap::new();

        for index in 0..n {
            *counts.entry(self.view.degree(index)).or_insert(0) += 1;
        }

        counts
            .into_iter()
            .map(|(degree, count)| DegreeBucket {
                degree,
                count,
                probability: count as f64 / n as f64,
            })
            .collect()
    }

    /// Fragmentation index: reciprocal shortest-path distances summed over
    /// all ordered pairs with a finite path, normalized by n·(n−1) so a
    /// complete directed graph scores exactly 1.0. Unreachable pairs
    /// contribute 0. Defined as 0.0 for n ≤ 1.
    ///
    /// One BFS per source node: O(n·(n+m)), the dominant cost of the run.
    pub fn fragmentation_index(&self) -> f64 {
        let n = self.view.node_count();
        if n <= 1 {
            return 0.0;
        }

        let mut reciprocal_sum = 0.0;
        for source in 0..n {
            let distances = single_source_distances(&self.view.outgoing, source);
            for (target, distance) in distances.into_iter().enumerate() {
                if target == source {
                    continue;
                }
                if let Some(d) = distance {
                    if d > 0 {
                        reciprocal_sum += 1.0 / d as f64;
                    }
                }
            }
        }

        reciprocal_sum / (n as f64 * (n as f64 - 1.0))
    }

    /// Weakly connected components: traversal ignoring edge direction
    fn weak_component_count(&self) -> usize {
        let n = self.view.node_count();
        let mut seen = vec![false; n];
        let mut components = 0;

        for start in 0..n {
            if seen[start] {
                continue;
            }
            components += 1;

            let mut queue = VecDeque::new();
            seen[start] = true;
            queue.push_back(start);

            while let Some(current) = queue.pop_front() {
                let neighbors = self.view.outgoing[current]
                    .iter()
                    .chain(self.view.incoming[current].iter());
                for &neighbor in neighbors {
                    if !seen[neighbor] {
                        seen[neighbor] = true;
                        queue.push_back(neighbor);
                    }
                }
            }
        }

        components
    }
}

// ============================================================================
// TESTS
// ============================================================================
