// 📤 Exporter - Node list, edge list, network document, metadata document
// The node/edge lists are flat CSV tables; the network document is the
// nested `elements` object consumed by the visualization front end.
// Missing numerics serialize as null, never NaN.

use crate::graph::{Graph, Node, NodeType};
use crate::record::json_number;
use anyhow::{Context, Result};
use serde_json::{json, Map, Value};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

// ============================================================================
// CSV LISTS
// ============================================================================

/// Node list: `id, unified_name, preliminary_type` plus the sorted union of
/// enrichment attribute columns, one row per node.
pub fn node_list_csv(graph: &Graph) -> Result<String> {
    let attribute_columns: BTreeSet<&str> = graph
        .nodes
        .values()
        .flat_map(|node| node.attributes.keys().map(String::as_str))
        .collect();

    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header = vec!["id", "unified_name", "preliminary_type"];
    header.extend(attribute_columns.iter().copied());
    writer.write_record(&header).context("Failed to write node header")?;

    for node in graph.nodes.values() {
        let mut row = vec![
            node.id.clone(),
            node.unified_name.clone().unwrap_or_default(),
            node.preliminary_type.as_str().to_string(),
        ];
        for column in &attribute_columns {
            row.push(
                node.attributes
                    .get(*column)
                    .map(scalar_to_csv)
                    .unwrap_or_default(),
            );
        }
        writer.write_record(&row).context("Failed to write node row")?;
    }

    finish_csv(writer)
}

/// Edge list, one row per reconciled edge
pub fn edge_list_csv(graph: &Graph) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record([
            "source",
            "target",
            "id",
            "yearly_volume",
            "type",
            "year",
            "water_type",
            "purchased_self",
            "source_file",
        ])
        .context("Failed to write edge header")?;

    for edge in graph.edges.values() {
        writer
            .write_record([
                edge.source.clone().unwrap_or_default(),
                edge.target.clone(),
                edge.id.clone(),
                edge.yearly_volume.map(|v| v.to_string()).unwrap_or_default(),
                edge.kind.as_str().to_string(),
                edge.year.map(|y| y.to_string()).unwrap_or_default(),
                edge.water_type.clone().unwrap_or_default(),
                edge.purchased_self.clone().unwrap_or_default(),
                edge.source_file.clone(),
            ])
            .context("Failed to write edge row")?;
    }

    finish_csv(writer)
}

fn scalar_to_csv(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn finish_csv(writer: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer
        .into_inner()
        .map_err(|err| anyhow::anyhow!("Failed to flush csv writer: {}", err))?;
    String::from_utf8(bytes).context("CSV output was not valid UTF-8")
}

// ============================================================================
// NETWORK DOCUMENT
// ============================================================================

/// Cytoscape-style nested object:
/// `{ elements: { nodes: [{ data: {...} }], edges: [{ data: {...} }] } }`
pub fn network_document(graph: &Graph) -> Value {
    let nodes: Vec<Value> = graph
        .nodes
        .values()
        .map(|node| json!({ "data": node_data(node) }))
        .collect();

    let edges: Vec<Value> = graph
        .edges
        .values()
        .map(|edge| {
            json!({
                "data": {
                    "id": edge.id,
                    "source": edge.source,
                    "target": edge.target,
                    "type": edge.kind.as_str(),
                    "yearly_volume": edge.yearly_volume.map(json_number).unwrap_or(Value::Null),
                    "year": edge.year,
                    "water_type": edge.water_type,
                    "purchased_self": edge.purchased_self,
                    "source_file": edge.source_file,
                }
            })
        })
        .collect();

    json!({
        "elements": {
            "nodes": nodes,
            "edges": edges,
        }
    })
}

fn node_data(node: &Node) -> Value {
    let mut data = Map::new();
    data.insert("id".to_string(), Value::String(node.id.clone()));
    data.insert(
        "unified_name".to_string(),
        node.unified_name
            .clone()
            .map(Value::String)
            .unwrap_or(Value::Null),
    );
    data.insert(
        "preliminary_type".to_string(),
        Value::String(node.preliminary_type.as_str().to_string()),
    );

    // enrichment attributes flatten into the same data object, sorted
    let mut keys: Vec<&String> = node.attributes.keys().collect();
    keys.sort();
    for key in keys {
        data.insert(key.clone(), node.attributes[key].clone());
    }

    Value::Object(data)
}

// ============================================================================
// METADATA DOCUMENT
// ============================================================================

/// Run metadata plus per-category id → name lookup maps
pub fn metadata_document(graph: &Graph, survey_year: Option<i64>) -> Value {
    let mut source_names = Map::new();
    let mut system_names = Map::new();

    for node in graph.nodes.values() {
        let name = node
            .unified_name
            .clone()
            .map(Value::String)
            .unwrap_or(Value::Null);
        match node.preliminary_type {
            NodeType::WaterSource => source_names.insert(node.id.clone(), name),
            NodeType::WaterSystem => system_names.insert(node.id.clone(), name),
        };
    }

    json!({
        "nodes": graph.node_count(),
        "edges": graph.edge_count(),
        "is_directed": graph.directed,
        "survey_year": survey_year,
        "water_source_names": Value::Object(source_names),
        "water_system_names": Value::Object(system_names),
    })
}

// ============================================================================
// FILE OUTPUT
// ============================================================================

/// Write the four output documents into `dir`
pub fn write_outputs(dir: &Path, graph: &Graph, survey_year: Option<i64>) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    fs::write(dir.join("nodes.csv"), node_list_csv(graph)?)
        .context("Failed to write nodes.csv")?;
    fs::write(dir.join("edges.csv"), edge_list_csv(graph)?)
        .context("Failed to write edges.csv")?;

    let network = serde_json::to_string_pretty(&network_document(graph))
        .context("Failed to serialize network document")?;
    fs::write(dir.join("network.json"), network).context("Failed to write network.json")?;

    let metadata = serde_json::to_string_pretty(&metadata_document(graph, survey_year))
        .context("Failed to serialize metadata document")?;
    fs::write(dir.join("metadata.json"), metadata).context("Failed to write metadata.json")?;

    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
