// 🚰 Network Pipeline - One batch run, leaves first
// load → resolve endpoints → build edges → reconcile → classify & name →
// assemble. The graph is rebuilt wholesale; reruns over the same inputs and
// year filter reproduce identical node/edge sets and ids.

use crate::builder::{BuilderReport, EdgeBuilder};
use crate::graph::{assemble, Graph};
use crate::loader;
use crate::nodes::{classify_nodes, standard_name_chain, NodeReport, RetailRegistry, WaterSourceIndex};
use crate::quality::QualityReport;
use crate::reconciliation::{reconcile, ReconciliationReport};
use crate::record::{Record, RecordKind};
use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;

// ============================================================================
// CONFIGURATION
// ============================================================================

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub intake_path: PathBuf,
    pub sales_path: PathBuf,
    pub retail_path: PathBuf,
    pub bridge_path: PathBuf,

    /// Survey-year filter; None keeps every record
    pub year: Option<i64>,
}

// ============================================================================
// OUTPUT
// ============================================================================

pub struct PipelineOutput {
    pub graph: Graph,
    pub survey_year: Option<i64>,
    pub builder: BuilderReport,
    pub reconciliation: ReconciliationReport,
    pub nodes: NodeReport,
    pub quality: QualityReport,
}

// ============================================================================
// PIPELINE
// ============================================================================

pub struct NetworkPipeline {
    config: PipelineConfig,
}

impl NetworkPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        NetworkPipeline { config }
    }

    /// Load the four datasets from disk and run the full pipeline
    pub fn run(&self) -> Result<PipelineOutput> {
        let intake = loader::load_records(&self.config.intake_path, RecordKind::Intake)
            .context("Failed to load intake dataset")?;
        let sales = loader::load_records(&self.config.sales_path, RecordKind::Sale)
            .context("Failed to load sales dataset")?;
        let retail =
            loader::load_table(&self.config.retail_path).context("Failed to load retail dataset")?;
        let bridge = loader::load_table(&self.config.bridge_path)
            .context("Failed to load survey-bridge dataset")?;

        build_network(&intake, &sales, &retail, &bridge, self.config.year)
    }
}

/// In-memory pipeline entry point, shared by the CLI and the tests
pub fn build_network(
    intake_records: &[Record],
    sale_records: &[Record],
    retail_rows: &[HashMap<String, Value>],
    bridge_rows: &[HashMap<String, Value>],
    year: Option<i64>,
) -> Result<PipelineOutput> {
    // edges
    let batch = EdgeBuilder::new(year).build(intake_records, sale_records);
    let builder_report = batch.report.clone();

    // parallel-edge policy
    let outcome = reconcile(batch.edges);

    // nodes: classification set and name chain are per-run read-only caches
    let source_index = WaterSourceIndex::from_intake_records(intake_records);
    let name_chain = standard_name_chain(bridge_rows, retail_rows, sale_records, intake_records);
    let retail = RetailRegistry::from_rows(retail_rows);
    let (nodes, node_report) = classify_nodes(&outcome.edges, &source_index, &name_chain, &retail);

    // any referential violation here is pipeline corruption: abort the run
    let graph = assemble(nodes, outcome.edges)
        .context("Graph assembly failed: node/edge referential invariant violated")?;

    let quality = QualityReport::from_stages(&builder_report, &outcome.report, &node_report);

    Ok(PipelineOutput {
        graph,
        survey_year: year,
        builder: builder_report,
        reconciliation: outcome.report,
        nodes: node_report,
        quality,
    })
}

// ============================================================================
// TESTS
// ============================================================================
