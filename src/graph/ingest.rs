use std::collections::HashSet;

use log::debug;
use serde_json::Value;

use crate::feed::records::{EdgeRecord, EntityRef};

use super::model::{GENERIC_LABEL, GraphData, GraphLink, GraphNode, NodeId, PropertyMap, UNNAMED, node_id};

// Fold a flat list of edge records into a deduplicated node/link model.
// Nodes and links keep first-appearance order (source before target within
// one record), so feeding the same records twice yields an identical model.
pub fn build_graph(records: &[EdgeRecord]) -> GraphData {
    let mut data = GraphData::default();
    let mut known_nodes: HashSet<NodeId> = HashSet::new();
    let mut known_links: HashSet<(NodeId, NodeId)> = HashSet::new();

    for record in records {
        let source = intern_node(&mut data, &mut known_nodes, &record.source);
        let target = intern_node(&mut data, &mut known_nodes, &record.target);

        // One link per (source, target) pair; the first relation type wins
        let pair = (source.clone(), target.clone());
        if known_links.insert(pair) {
            data.links.push(GraphLink {
                source,
                target,
                relationship_type: record.relationship_type.clone(),
            });
        }
    }
    data
}

// Register a descriptor's node if its identity is new. Descriptive fields
// come from the first record mentioning the node; later duplicates never
// overwrite anything.
fn intern_node(data: &mut GraphData, known: &mut HashSet<NodeId>, descriptor: &EntityRef) -> NodeId {
    let entity_type = entity_type_of(descriptor);
    let name = match display_name(&descriptor.properties) {
        Some(name) => name,
        None => {
            debug!("descriptor without usable name (type {entity_type}); using '{UNNAMED}'");
            UNNAMED.to_string()
        }
    };
    let id = node_id(&entity_type, &name);
    if known.insert(id.clone()) {
        data.nodes.push(GraphNode {
            id: id.clone(),
            entity_type,
            name,
            summary: text_property(&descriptor.properties, "summary"),
            description: text_property(&descriptor.properties, "description"),
            properties: descriptor.properties.clone(),
            x: 0.0,
            y: 0.0,
        });
    }
    id
}

// Semantic entity type: the first label that is not the generic marker.
// Records with only the marker, or no labels at all, fall back to the marker.
fn entity_type_of(descriptor: &EntityRef) -> String {
    descriptor
        .labels
        .iter()
        .find(|label| label.as_str() != GENERIC_LABEL)
        .or_else(|| descriptor.labels.first())
        .cloned()
        .unwrap_or_else(|| GENERIC_LABEL.to_string())
}

// A usable name is a non-blank string or a number (ports arrive as numbers)
fn display_name(properties: &PropertyMap) -> Option<String> {
    match properties.get("name")? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn text_property(properties: &PropertyMap, key: &str) -> Option<String> {
    match properties.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}
