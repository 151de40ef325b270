// ✅ Data Quality Report - Run-level counters
// Every degraded-but-tolerated condition in the pipeline lands here as a
// count: flagged, reported, never silently dropped and never fatal.

use crate::builder::BuilderReport;
use crate::nodes::NodeReport;
use crate::reconciliation::ReconciliationReport;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityReport {
    /// Edges emitted with a null source (no cascade rule matched)
    pub resolution_failures: usize,

    /// Null-sourced edges excluded from the assembled graph
    pub orphan_edges: usize,

    /// Records skipped for lack of a target survey number
    pub records_missing_target: usize,

    /// Records discarded by the survey-year filter
    pub records_filtered_by_year: usize,

    /// Parallel-edge groups reduced to zero edges by reconciliation
    pub empty_reconciliation_groups: usize,

    /// Nodes whose full name chain produced nothing
    pub unnamed_nodes: usize,

    /// Retail enrichment rows dropped by the keep-first duplicate policy
    pub duplicate_enrichment_dropped: usize,

    pub generated_at: chrono::DateTime<chrono::Utc>,
}

impl QualityReport {
    pub fn from_stages(
        builder: &BuilderReport,
        reconciliation: &ReconciliationReport,
        nodes: &NodeReport,
    ) -> Self {
        QualityReport {
            resolution_failures: builder.resolution_failures,
            orphan_edges: reconciliation.orphan_edges,
            records_missing_target: builder.records_missing_target,
            records_filtered_by_year: builder.records_filtered_by_year,
            empty_reconciliation_groups: reconciliation.groups_dropped_empty,
            unnamed_nodes: nodes.unnamed_nodes,
            duplicate_enrichment_dropped: nodes.duplicate_enrichment_dropped,
            generated_at: chrono::Utc::now(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.resolution_failures == 0
            && self.orphan_edges == 0
            && self.records_missing_target == 0
            && self.empty_reconciliation_groups == 0
            && self.unnamed_nodes == 0
            && self.duplicate_enrichment_dropped == 0
    }

    pub fn summary(&self) -> String {
        format!(
            "{} unresolved sources, {} orphan edges, {} missing targets, {} emptied groups, {} unnamed nodes, {} duplicate enrichment rows",
            self.resolution_failures,
            self.orphan_edges,
            self.records_missing_target,
            self.empty_reconciliation_groups,
            self.unnamed_nodes,
            self.duplicate_enrichment_dropped
        )
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_report() {
        let builder = BuilderReport::default();
        let reconciliation = ReconciliationReport {
            input_edges: 0,
            orphan_edges: 0,
            groups: 0,
            parallel_groups: 0,
            sale_edges_dropped: 0,
            groups_dropped_empty: 0,
            output_edges: 0,
            reconciled_at: chrono::Utc::now(),
        };
        let nodes = NodeReport::default();

        let report = QualityReport::from_stages(&builder, &reconciliation, &nodes);
        assert!(report.is_clean());
    }

    #[test]
    fn test_counts_flow_through_from_stages() {
        let builder = BuilderReport {
            intake_edges: 10,
            sale_edges: 5,
            resolution_failures: 2,
            records_missing_target: 1,
            records_filtered_by_year: 3,
        };
        let reconciliation = ReconciliationReport {
            input_edges: 15,
            orphan_edges: 2,
            groups: 12,
            parallel_groups: 1,
            sale_edges_dropped: 1,
            groups_dropped_empty: 1,
            output_edges: 12,
            reconciled_at: chrono::Utc::now(),
        };
        let nodes = NodeReport {
            nodes: 20,
            water_sources: 8,
            water_systems: 12,
            unnamed_nodes: 4,
            duplicate_enrichment_dropped: 2,
        };

        let report = QualityReport::from_stages(&builder, &reconciliation, &nodes);
        assert!(!report.is_clean());
        assert_eq!(report.resolution_failures, 2);
        assert_eq!(report.orphan_edges, 2);
        assert_eq!(report.empty_reconciliation_groups, 1);
        assert_eq!(report.unnamed_nodes, 4);
        assert_eq!(report.duplicate_enrichment_dropped, 2);
        assert!(!report.summary().is_empty());
    }
}
