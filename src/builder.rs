// 🏗️ Edge Builder - Survey records → uniform directed edge tuples
// Intake and sale records both flatten into the same Edge shape. Edge ids
// are positional within the (optionally year-filtered) record sequence, so
// reruns over the same inputs reproduce the same ids.

use crate::graph::{Edge, EdgeKind};
use crate::record::{columns, normalize_survey_number, Record};
use crate::resolver::EndpointResolver;
use serde::{Deserialize, Serialize};

// ============================================================================
// BUILDER REPORT
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuilderReport {
    pub intake_edges: usize,
    pub sale_edges: usize,

    /// Edges emitted with a null source (no cascade rule matched, or the
    /// matched rule's field was blank). Flagged, never silently dropped.
    pub resolution_failures: usize,

    /// Records skipped because the target survey number was blank
    pub records_missing_target: usize,

    /// Records discarded by the year filter
    pub records_filtered_by_year: usize,
}

impl BuilderReport {
    pub fn summary(&self) -> String {
        format!(
            "{} intake edges, {} sale edges | {} unresolved sources, {} missing targets, {} filtered by year",
            self.intake_edges,
            self.sale_edges,
            self.resolution_failures,
            self.records_missing_target,
            self.records_filtered_by_year
        )
    }
}

/// Edges plus the counts accumulated while building them
#[derive(Debug, Clone)]
pub struct EdgeBatch {
    pub edges: Vec<Edge>,
    pub report: BuilderReport,
}

// ============================================================================
// EDGE BUILDER
// ============================================================================

pub struct EdgeBuilder {
    resolver: EndpointResolver,

    /// Optional survey-year filter, applied before edge emission
    year: Option<i64>,
}

impl EdgeBuilder {
    pub fn new(year: Option<i64>) -> Self {
        EdgeBuilder {
            resolver: EndpointResolver::new(),
            year,
        }
    }

    /// Build the full edge batch from both pipeline datasets
    pub fn build(&self, intake_records: &[Record], sale_records: &[Record]) -> EdgeBatch {
        let mut report = BuilderReport::default();
        let mut edges = Vec::new();

        self.build_intake(intake_records, &mut edges, &mut report);
        self.build_sales(sale_records, &mut edges, &mut report);

        EdgeBatch { edges, report }
    }

    /// Intake records: source via the rule cascade, target = own survey
    /// number, volume from the total-intake column, metadata verbatim.
    fn build_intake(&self, records: &[Record], edges: &mut Vec<Edge>, report: &mut BuilderReport) {
        for (index, record) in self.retained(records, report).into_iter().enumerate() {
            let target = match self.resolver.resolve_target(record) {
                Some(target) => target,
                None => {
                    report.records_missing_target += 1;
                    continue;
                }
            };

            let source = self.resolver.resolve_source(record);
            if source.is_none() {
                report.resolution_failures += 1;
            }

            edges.push(Edge {
                id: format!("intake_{}", index),
                source,
                target,
                kind: EdgeKind::Intake,
                yearly_volume: record.num_field(columns::TOTAL_INTAKE),
                year: record.int_field(columns::YEAR),
                water_type: record.str_field(columns::WATER_TYPE).map(str::to_string),
                purchased_self: record.str_field(columns::SUPPLY_MODE).map(str::to_string),
                source_file: record.provenance.clone(),
            });
            report.intake_edges += 1;
        }
    }

    /// Sale records bypass the cascade: seller → buyer, both survey numbers
    /// taken as opaque strings. `purchased_self` is fixed to "Purchased".
    fn build_sales(&self, records: &[Record], edges: &mut Vec<Edge>, report: &mut BuilderReport) {
        for (index, record) in self.retained(records, report).into_iter().enumerate() {
            let target = match record.str_field(columns::BUYER_SURVEY_NUMBER) {
                Some(buyer) => normalize_survey_number(buyer),
                None => {
                    report.records_missing_target += 1;
                    continue;
                }
            };

            let source = record
                .str_field(columns::SELLER_SURVEY_NUMBER)
                .map(normalize_survey_number);
            if source.is_none() {
                report.resolution_failures += 1;
            }

            edges.push(Edge {
                id: format!("sale_{}", index),
                source,
                target,
                kind: EdgeKind::Sale,
                yearly_volume: record.num_field(columns::BUYER_VOLUME),
                year: record.int_field(columns::YEAR),
                water_type: record.str_field(columns::WATER_TYPE).map(str::to_string),
                purchased_self: Some("Purchased".to_string()),
                source_file: record.provenance.clone(),
            });
            report.sale_edges += 1;
        }
    }

    /// Apply the year filter, preserving input order
    fn retained<'a>(&self, records: &'a [Record], report: &mut BuilderReport) -> Vec<&'a Record> {
        match self.year {
            None => records.iter().collect(),
            Some(year) => {
                let mut kept = Vec::new();
                for record in records {
                    if record.int_field(columns::YEAR) == Some(year) {
                        kept.push(record);
                    } else {
                        report.records_filtered_by_year += 1;
                    }
                }
                kept
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RecordKind;

    fn intake(survey: &str, year: &str) -> Record {
        Record::new(RecordKind::Intake, "intake.csv")
            .with_str(columns::SURVEY_NUMBER, survey)
            .with_str(columns::WATER_TYPE, "Ground Water")
            .with_str(columns::SUPPLY_MODE, "Self-Supplied")
            .with_str(columns::AQUIFER_NAME, "OGALLALA AQUIFER")
            .with_str(columns::TOTAL_INTAKE, "150.5")
            .with_str(columns::YEAR, year)
    }

    fn sale(seller: &str, buyer: &str) -> Record {
        Record::new(RecordKind::Sale, "sales.csv")
            .with_str(columns::SELLER_SURVEY_NUMBER, seller)
            .with_str(columns::BUYER_SURVEY_NUMBER, buyer)
            .with_str(columns::BUYER_VOLUME, "42")
            .with_str(columns::YEAR, "2023")
    }

    #[test]
    fn test_intake_edges_get_positional_ids_and_metadata() {
        let builder = EdgeBuilder::new(None);
        let batch = builder.build(&[intake("10450", "2023"), intake("10451", "2023")], &[]);

        assert_eq!(batch.edges.len(), 2);
        assert_eq!(batch.edges[0].id, "intake_0");
        assert_eq!(batch.edges[1].id, "intake_1");
        assert_eq!(batch.edges[0].source.as_deref(), Some("Ogallala Aquifer"));
        assert_eq!(batch.edges[0].target, "10450");
        assert_eq!(batch.edges[0].yearly_volume, Some(150.5));
        assert_eq!(batch.edges[0].purchased_self.as_deref(), Some("Self-Supplied"));
        assert_eq!(batch.edges[0].source_file, "intake.csv");
    }

    #[test]
    fn test_sale_edges_fix_purchased_self() {
        let builder = EdgeBuilder::new(None);
        let batch = builder.build(&[], &[sale("100", "200")]);

        assert_eq!(batch.edges.len(), 1);
        let edge = &batch.edges[0];
        assert_eq!(edge.id, "sale_0");
        assert_eq!(edge.source.as_deref(), Some("100"));
        assert_eq!(edge.target, "200");
        assert_eq!(edge.kind, EdgeKind::Sale);
        assert_eq!(edge.yearly_volume, Some(42.0));
        assert_eq!(edge.purchased_self.as_deref(), Some("Purchased"));
    }

    #[test]
    fn test_year_filter_discards_other_years() {
        let builder = EdgeBuilder::new(Some(2023));
        let batch = builder.build(
            &[intake("10450", "2022"), intake("10451", "2023")],
            &[],
        );

        assert_eq!(batch.edges.len(), 1);
        assert_eq!(batch.edges[0].target, "10451");
        // positional id restarts within the retained sequence
        assert_eq!(batch.edges[0].id, "intake_0");
        assert_eq!(batch.report.records_filtered_by_year, 1);
    }

    #[test]
    fn test_unresolved_source_is_emitted_and_flagged() {
        let record = Record::new(RecordKind::Intake, "intake.csv")
            .with_str(columns::SURVEY_NUMBER, "10450")
            .with_str(columns::WATER_TYPE, "Brackish")
            .with_str(columns::SUPPLY_MODE, "Self-Supplied");

        let builder = EdgeBuilder::new(None);
        let batch = builder.build(&[record], &[]);

        assert_eq!(batch.edges.len(), 1);
        assert!(batch.edges[0].is_orphan());
        assert_eq!(batch.report.resolution_failures, 1);
    }

    #[test]
    fn test_missing_target_skips_the_record() {
        let record = Record::new(RecordKind::Intake, "intake.csv")
            .with_str(columns::WATER_TYPE, "Ground Water")
            .with_str(columns::SUPPLY_MODE, "Self-Supplied")
            .with_str(columns::AQUIFER_NAME, "OGALLALA AQUIFER");

        let builder = EdgeBuilder::new(None);
        let batch = builder.build(&[record], &[]);

        assert!(batch.edges.is_empty());
        assert_eq!(batch.report.records_missing_target, 1);
    }
}
