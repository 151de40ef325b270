// Water Network Builder - Core Library
// Assembles a directed water-supply graph from survey datasets and computes
// structural analytics over it.

pub mod record;
pub mod loader;
pub mod resolver;       // Endpoint Resolver - source rule cascade
pub mod builder;        // Edge Builder - records → edge tuples
pub mod reconciliation; // Parallel-Edge Reconciler
pub mod nodes;          // Node Classifier & Name Unifier
pub mod graph;          // Graph model + assembler
pub mod analytics;      // Analytics Engine
pub mod quality;        // Data-quality counters
pub mod export;         // Node/edge lists + network/metadata documents
pub mod pipeline;       // End-to-end batch driver

// Re-export commonly used types
pub use record::{columns, normalize_name, normalize_survey_number, title_case, Record, RecordKind};
pub use loader::{load_records, load_table};
pub use resolver::{EndpointResolver, SourceRule, OTHER_AQUIFER, UNKNOWN_SOURCE, UNKNOWN_SOURCE_SUFFIX};
pub use builder::{BuilderReport, EdgeBatch, EdgeBuilder};
pub use reconciliation::{reconcile, ReconcileOutcome, ReconciliationReport};
pub use nodes::{
    classify_nodes, standard_name_chain, NameResolver, NameSource, NodeReport, RetailRegistry,
    WaterSourceIndex,
};
pub use graph::{assemble, Edge, EdgeKind, Graph, GraphError, Node, NodeId, NodeType};
pub use analytics::{AnalyticsEngine, DegreeBucket, GraphSummary};
pub use quality::QualityReport;
pub use export::{edge_list_csv, metadata_document, network_document, node_list_csv, write_outputs};
pub use pipeline::{build_network, NetworkPipeline, PipelineConfig, PipelineOutput};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
