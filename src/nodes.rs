// 🏷️ Node Classifier & Name Unifier
// The node set is derived solely from reconciled edge endpoints. Each node
// is classified water-source vs water-system against a name set precomputed
// from the intake dataset, then given one display name from an ordered chain
// of candidate name providers.

use crate::graph::{Edge, Node, NodeId, NodeType};
use crate::record::{columns, normalize_name, normalize_survey_number, Record};
use crate::resolver::UNKNOWN_SOURCE_SUFFIX;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

// ============================================================================
// WATER-SOURCE INDEX
// ============================================================================

/// Read-only set of normalized water-source names for one pipeline run:
/// every aquifer name, surface-water source name, and basin+suffix name
/// seen in the intake dataset. A node is a water source iff its id is here.
pub struct WaterSourceIndex {
    names: HashSet<String>,
}

impl WaterSourceIndex {
    pub fn from_intake_records(records: &[Record]) -> Self {
        let mut names = HashSet::new();

        for record in records {
            if let Some(aquifer) = record.str_field(columns::AQUIFER_NAME) {
                names.insert(normalize_name(aquifer));
            }
            if let Some(source) = record.str_field(columns::SOURCE_NAME) {
                names.insert(normalize_name(source));
            }
            if let Some(basin) = record.str_field(columns::BASIN_NAME) {
                names.insert(normalize_name(&format!(
                    "{} {}",
                    basin, UNKNOWN_SOURCE_SUFFIX
                )));
            }
        }

        WaterSourceIndex { names }
    }

    pub fn contains(&self, node_id: &str) -> bool {
        self.names.contains(node_id)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

// ============================================================================
// NAME PROVIDERS
// ============================================================================

/// One candidate name provider: a labeled id → raw-name lookup map
pub struct NameSource {
    pub label: &'static str,
    names: HashMap<String, String>,
}

impl NameSource {
    pub fn new(label: &'static str, names: HashMap<String, String>) -> Self {
        NameSource { label, names }
    }

    fn get(&self, id: &str) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }
}

/// Ordered fallback chain: providers tried in sequence, first hit wins.
/// Avoids chained null-coalescing logic that obscures priority.
pub struct NameResolver {
    sources: Vec<NameSource>,
}

impl NameResolver {
    pub fn new(sources: Vec<NameSource>) -> Self {
        NameResolver { sources }
    }

    /// First non-null candidate for the id, normalized trim + title-case
    pub fn resolve(&self, id: &str) -> Option<String> {
        self.sources
            .iter()
            .find_map(|source| source.get(id))
            .map(normalize_name)
    }

    pub fn provider_count(&self) -> usize {
        self.sources.len()
    }
}

/// Build the standard chain for water-system nodes, in priority order:
/// survey-bridge → retail → sales buyer → sales seller → intake record →
/// intake seller. All maps are per-run, read-only caches.
pub fn standard_name_chain(
    bridge_rows: &[HashMap<String, Value>],
    retail_rows: &[HashMap<String, Value>],
    sale_records: &[Record],
    intake_records: &[Record],
) -> NameResolver {
    let bridge = table_name_map(bridge_rows, columns::SURVEY_NUMBER, columns::SURVEY_NAME);
    let retail = table_name_map(retail_rows, columns::SURVEY_NUMBER, columns::WATER_SYSTEM_NAME);

    let sales_buyer =
        record_name_map(sale_records, columns::BUYER_SURVEY_NUMBER, columns::BUYER_NAME);
    let sales_seller = record_name_map(
        sale_records,
        columns::SELLER_SURVEY_NUMBER,
        columns::SELLER_NAME,
    );
    let intake_record =
        record_name_map(intake_records, columns::SURVEY_NUMBER, columns::SURVEY_NAME);
    let intake_seller = record_name_map(
        intake_records,
        columns::SELLER_SURVEY_NUMBER,
        columns::SELLER_NAME,
    );

    NameResolver::new(vec![
        NameSource::new("survey_bridge", bridge),
        NameSource::new("retail", retail),
        NameSource::new("sales_buyer", sales_buyer),
        NameSource::new("sales_seller", sales_seller),
        NameSource::new("intake_record", intake_record),
        NameSource::new("intake_seller", intake_seller),
    ])
}

fn table_name_map(
    rows: &[HashMap<String, Value>],
    id_column: &str,
    name_column: &str,
) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for row in rows {
        let id = match row.get(id_column).and_then(Value::as_str) {
            Some(id) if !id.trim().is_empty() => normalize_survey_number(id),
            _ => continue,
        };
        if let Some(name) = row.get(name_column).and_then(Value::as_str) {
            if !name.trim().is_empty() {
                map.entry(id).or_insert_with(|| name.to_string());
            }
        }
    }
    map
}

fn record_name_map(
    records: &[Record],
    id_column: &str,
    name_column: &str,
) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for record in records {
        if let (Some(id), Some(name)) = (record.str_field(id_column), record.str_field(name_column))
        {
            map.entry(normalize_survey_number(id))
                .or_insert_with(|| name.to_string());
        }
    }
    map
}

// ============================================================================
// RETAIL ENRICHMENT
// ============================================================================

/// Retail attributes joined onto water-system nodes. Duplicate survey
/// numbers keep the first occurrence; the dropped count is reported.
pub struct RetailRegistry {
    attributes: HashMap<String, HashMap<String, Value>>,
    pub duplicates_dropped: usize,
}

impl RetailRegistry {
    pub fn from_rows(rows: &[HashMap<String, Value>]) -> Self {
        let mut attributes: HashMap<String, HashMap<String, Value>> = HashMap::new();
        let mut duplicates_dropped = 0;

        for row in rows {
            let id = match row.get(columns::SURVEY_NUMBER).and_then(Value::as_str) {
                Some(id) if !id.trim().is_empty() => normalize_survey_number(id),
                _ => continue,
            };

            if attributes.contains_key(&id) {
                duplicates_dropped += 1;
                continue;
            }

            // everything but the join key and the display-name column
            let attrs = row
                .iter()
                .filter(|(key, _)| {
                    key.as_str() != columns::SURVEY_NUMBER
                        && key.as_str() != columns::WATER_SYSTEM_NAME
                })
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect();

            attributes.insert(id, attrs);
        }

        RetailRegistry {
            attributes,
            duplicates_dropped,
        }
    }

    pub fn attributes_for(&self, id: &str) -> Option<&HashMap<String, Value>> {
        self.attributes.get(id)
    }
}

// ============================================================================
// NODE REPORT
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeReport {
    pub nodes: usize,
    pub water_sources: usize,
    pub water_systems: usize,

    /// Nodes whose full name chain produced nothing. A metric, not an error.
    pub unnamed_nodes: usize,

    /// Retail rows dropped by the keep-first duplicate policy
    pub duplicate_enrichment_dropped: usize,
}

impl NodeReport {
    pub fn summary(&self) -> String {
        format!(
            "{} nodes ({} sources, {} systems) | {} unnamed, {} duplicate enrichment rows dropped",
            self.nodes,
            self.water_sources,
            self.water_systems,
            self.unnamed_nodes,
            self.duplicate_enrichment_dropped
        )
    }
}

// ============================================================================
// CLASSIFIER
// ============================================================================

/// Derive, classify, name, and enrich the node set from reconciled edges.
/// A node with no incident edge never exists.
pub fn classify_nodes(
    edges: &[Edge],
    sources: &WaterSourceIndex,
    names: &NameResolver,
    retail: &RetailRegistry,
) -> (BTreeMap<NodeId, Node>, NodeReport) {
    let mut ids = BTreeSet::new();
    for edge in edges {
        if let Some(source) = &edge.source {
            ids.insert(source.clone());
        }
        ids.insert(edge.target.clone());
    }

    let mut report = NodeReport {
        duplicate_enrichment_dropped: retail.duplicates_dropped,
        ..NodeReport::default()
    };
    let mut nodes = BTreeMap::new();

    for id in ids {
        let preliminary_type = if sources.contains(&id) {
            NodeType::WaterSource
        } else {
            NodeType::WaterSystem
        };

        // water sources are their own display name; systems walk the chain
        let unified_name = match preliminary_type {
            NodeType::WaterSource => Some(id.clone()),
            NodeType::WaterSystem => names.resolve(&id),
        };

        match preliminary_type {
            NodeType::WaterSource => report.water_sources += 1,
            NodeType::WaterSystem => report.water_systems += 1,
        }
        if unified_name.is_none() {
            report.unnamed_nodes += 1;
        }

        let attributes = retail
            .attributes_for(&id)
            .cloned()
            .unwrap_or_default();

        nodes.insert(
            id.clone(),
            Node {
                id,
                preliminary_type,
                unified_name,
                attributes,
            },
        );
    }

    report.nodes = nodes.len();
    (nodes, report)
}

// ============================================================================
// TESTS
// ============================================================================
