use std::collections::{BTreeMap, HashMap};

use serde_json::Value;

// Basic type aliases for clarity
pub type NodeId = String;
pub type PropertyMap = HashMap<String, Value>;

// Synthetic name for descriptors that arrive without a usable `name` property
pub const UNNAMED: &str = "unnamed";
// Marker label carried by every record; never a semantic entity type
pub const GENERIC_LABEL: &str = "Entity";

// Node identity: entity type and name, joined. Two records mentioning
// Host/10.0.0.1 are the same host no matter where they appear.
pub fn node_id(entity_type: &str, name: &str) -> NodeId {
    format!("{entity_type}:{name}")
}

#[derive(Clone, Debug, PartialEq)]
pub struct GraphNode {
    pub id: NodeId,
    pub entity_type: String,
    pub name: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub properties: PropertyMap,
    // Layout-space position, written by the layered layout
    pub x: f32,
    pub y: f32,
}

// Link endpoints stay node ids until layout resolves them to indices
#[derive(Clone, Debug, PartialEq)]
pub struct GraphLink {
    pub source: NodeId,
    pub target: NodeId,
    pub relationship_type: String,
}

// Deduplicated model produced by ingest, in first-appearance order
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphData {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<GraphLink>,
}

impl GraphData {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

// Link with endpoints resolved to indices into the node arena
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedLink {
    pub source: usize,
    pub target: usize,
    pub relationship_type: String,
}

/// Layout output: nodes with positions filled in, links resolved to node
/// indices, plus an id lookup so callers never walk the arena linearly.
#[derive(Clone, Debug, Default)]
pub struct PlacedGraph {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<PlacedLink>,
    index: HashMap<NodeId, usize>,
}

impl PlacedGraph {
    pub fn new(nodes: Vec<GraphNode>, links: Vec<PlacedLink>) -> Self {
        let index = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.clone(), i))
            .collect();
        Self { nodes, links, index }
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn node_by_id(&self, id: &str) -> Option<&GraphNode> {
        self.index_of(id).map(|i| &self.nodes[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    // Entity types present in the graph with node counts, sorted by type name
    pub fn entity_type_counts(&self) -> BTreeMap<String, usize> {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for node in &self.nodes {
            *counts.entry(node.entity_type.clone()).or_default() += 1;
        }
        counts
    }
}

// Display text for a property value; strings bare, the rest in JSON form
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
