// ⚖️ Parallel-Edge Reconciler - One policy per ordered endpoint pair
// Intake reporting is authoritative over sales reporting: when both describe
// the same directed relationship, the sale edges are dropped. A parallel
// group with zero intake edges is dropped whole — a documented edge case,
// surfaced as a count, never a silent bug.

use crate::graph::{Edge, EdgeKind, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// RECONCILIATION REPORT
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationReport {
    pub input_edges: usize,

    /// Edges with a null source, split off before grouping
    pub orphan_edges: usize,

    /// Distinct ordered (source, target) pairs seen
    pub groups: usize,

    /// Groups holding more than one edge
    pub parallel_groups: usize,

    /// Sale edges discarded in favor of intake edges
    pub sale_edges_dropped: usize,

    /// Parallel groups with zero intake edges, dropped whole
    pub groups_dropped_empty: usize,

    pub output_edges: usize,
    pub reconciled_at: chrono::DateTime<chrono::Utc>,
}

impl ReconciliationReport {
    pub fn summary(&self) -> String {
        format!(
            "{} edges in {} groups → {} edges | {} parallel groups, {} sales dropped, {} groups emptied, {} orphans",
            self.input_edges,
            self.groups,
            self.output_edges,
            self.parallel_groups,
            self.sale_edges_dropped,
            self.groups_dropped_empty,
            self.orphan_edges
        )
    }
}

/// Reconciled edges, the orphans set aside, and the counts
#[derive(Debug, Clone)]
pub struct ReconcileOutcome {
    pub edges: Vec<Edge>,
    pub orphans: Vec<Edge>,
    pub report: ReconciliationReport,
}

// ============================================================================
// RECONCILER
// ============================================================================

/// Collapse parallel edges sharing an ordered (source, target) pair.
/// Singleton groups pass through unchanged. Larger groups keep only their
/// intake edges. Group ordering is deterministic (BTreeMap over the pair).
pub fn reconcile(edges: Vec<Edge>) -> ReconcileOutcome {
    let input_edges = edges.len();

    let mut orphans = Vec::new();
    let mut groups: BTreeMap<(NodeId, NodeId), Vec<Edge>> = BTreeMap::new();

    for edge in edges {
        match edge.endpoints() {
            Some(pair) => groups.entry(pair).or_default().push(edge),
            None => orphans.push(edge),
        }
    }

    let group_count = groups.len();
    let mut parallel_groups = 0;
    let mut sale_edges_dropped = 0;
    let mut groups_dropped_empty = 0;
    let mut kept = Vec::new();

    for (_, group) in groups {
        if group.len() == 1 {
            kept.extend(group);
            continue;
        }

        parallel_groups += 1;
        let (intakes, sales): (Vec<Edge>, Vec<Edge>) = group
            .into_iter()
            .partition(|edge| edge.kind == EdgeKind::Intake);

        sale_edges_dropped += sales.len();
        if intakes.is_empty() {
            groups_dropped_empty += 1;
        } else {
            kept.extend(intakes);
        }
    }

    let report = ReconciliationReport {
        input_edges,
        orphan_edges: orphans.len(),
        groups: group_count,
        parallel_groups,
        sale_edges_dropped,
        groups_dropped_empty,
        output_edges: kept.len(),
        reconciled_at: chrono::Utc::now(),
    };

    ReconcileOutcome {
        edges: kept,
        orphans,
        report,
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(id: &str, source: Option<&str>, target: &str, kind: EdgeKind) -> Edge {
        Edge {
            id: id.to_string(),
            source: source.map(str::to_string),
            target: target.to_string(),
            kind,
            yearly_volume: None,
            year: None,
            water_type: None,
            purchased_self: None,
            source_file: "test.csv".to_string(),
        }
    }

    #[test]
    fn test_singleton_groups_pass_through() {
        let outcome = reconcile(vec![
            edge("intake_0", Some("A"), "B", EdgeKind::Intake),
            edge("sale_0", Some("B"), "C", EdgeKind::Sale),
        ]);

        assert_eq!(outcome.edges.len(), 2);
        assert_eq!(outcome.report.groups, 2);
        assert_eq!(outcome.report.parallel_groups, 0);
        assert_eq!(outcome.report.sale_edges_dropped, 0);
    }

    #[test]
    fn test_parallel_group_keeps_all_intakes_drops_sales() {
        let outcome = reconcile(vec![
            edge("intake_0", Some("A"), "B", EdgeKind::Intake),
            edge("intake_1", Some("A"), "B", EdgeKind::Intake),
            edge("sale_0", Some("A"), "B", EdgeKind::Sale),
        ]);

        assert_eq!(outcome.edges.len(), 2);
        assert!(outcome.edges.iter().all(|e| e.kind == EdgeKind::Intake));
        assert_eq!(outcome.report.parallel_groups, 1);
        assert_eq!(outcome.report.sale_edges_dropped, 1);
        assert_eq!(outcome.report.groups_dropped_empty, 0);
    }

    #[test]
    fn test_all_sale_parallel_group_is_dropped_and_counted() {
        let outcome = reconcile(vec![
            edge("sale_0", Some("A"), "B", EdgeKind::Sale),
            edge("sale_1", Some("A"), "B", EdgeKind::Sale),
        ]);

        assert!(outcome.edges.is_empty());
        assert_eq!(outcome.report.groups_dropped_empty, 1);
        assert_eq!(outcome.report.sale_edges_dropped, 2);
        assert_eq!(outcome.report.output_edges, 0);
    }

    #[test]
    fn test_orphans_split_off_before_grouping() {
        let outcome = reconcile(vec![
            edge("intake_0", None, "B", EdgeKind::Intake),
            edge("intake_1", Some("A"), "B", EdgeKind::Intake),
        ]);

        assert_eq!(outcome.edges.len(), 1);
        assert_eq!(outcome.orphans.len(), 1);
        assert_eq!(outcome.orphans[0].id, "intake_0");
        assert_eq!(outcome.report.orphan_edges, 1);
    }

    #[test]
    fn test_opposite_directions_are_distinct_pairs() {
        let outcome = reconcile(vec![
            edge("intake_0", Some("A"), "B", EdgeKind::Intake),
            edge("sale_0", Some("B"), "A", EdgeKind::Sale),
        ]);

        assert_eq!(outcome.edges.len(), 2);
        assert_eq!(outcome.report.parallel_groups, 0);
    }
}
