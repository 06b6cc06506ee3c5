//! Layered left-to-right layout: entity types map to columns, rows are
//! ordered by the barycenter of already-placed neighbors.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use once_cell::sync::Lazy;

use super::model::{GraphData, PlacedGraph, PlacedLink};

// Column order of the attack chain. Types missing from the table land on
// DEFAULT_LEVEL, one past the chain, so they never crowd the host column.
static DEFAULT_LEVELS: Lazy<HashMap<&'static str, u32>> = Lazy::new(|| {
    HashMap::from([
        ("Host", 0),
        ("Port", 1),
        ("Service", 2),
        ("Vulnerability", 3),
        ("Access", 4),
        ("Credential", 5),
        ("Account", 5),
    ])
});

pub const DEFAULT_LEVEL: u32 = 6;
pub const HORIZONTAL_SPACING: f32 = 240.0;
pub const VERTICAL_SPACING: f32 = 90.0;

#[derive(Clone, Debug)]
pub struct LayoutConfig {
    pub levels: HashMap<String, u32>,
    pub default_level: u32,
    pub horizontal_spacing: f32,
    pub vertical_spacing: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            levels: DEFAULT_LEVELS
                .iter()
                .map(|(ty, level)| (ty.to_string(), *level))
                .collect(),
            default_level: DEFAULT_LEVEL,
            horizontal_spacing: HORIZONTAL_SPACING,
            vertical_spacing: VERTICAL_SPACING,
        }
    }
}

impl LayoutConfig {
    pub fn level_of(&self, entity_type: &str) -> u32 {
        self.levels
            .get(entity_type)
            .copied()
            .unwrap_or(self.default_level)
    }
}

// Pure and deterministic: equal inputs give bit-identical coordinates.
// Only occupied levels produce columns; the first column keeps ingest
// order, later columns sort by mean neighbor y with ties kept stable.
pub fn layout_graph(data: &GraphData, config: &LayoutConfig) -> PlacedGraph {
    if data.is_empty() {
        return PlacedGraph::default();
    }

    let order: HashMap<&str, usize> = data
        .nodes
        .iter()
        .enumerate()
        .map(|(i, node)| (node.id.as_str(), i))
        .collect();

    // One-time link resolution; pairs naming unknown ids are dropped
    let links: Vec<PlacedLink> = data
        .links
        .iter()
        .filter_map(|link| {
            let source = *order.get(link.source.as_str())?;
            let target = *order.get(link.target.as_str())?;
            Some(PlacedLink {
                source,
                target,
                relationship_type: link.relationship_type.clone(),
            })
        })
        .collect();

    // Undirected, deduplicated neighbor sets. Ordered sets keep the float
    // summation order fixed between runs.
    let mut neighbors: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); data.nodes.len()];
    for link in &links {
        neighbors[link.source].insert(link.target);
        neighbors[link.target].insert(link.source);
    }

    // Bucket nodes by level; BTreeMap iteration compacts occupied levels
    // into consecutive columns
    let mut buckets: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
    for (i, node) in data.nodes.iter().enumerate() {
        buckets
            .entry(config.level_of(&node.entity_type))
            .or_default()
            .push(i);
    }

    let mut nodes = data.nodes.clone();
    let mut placed = vec![false; nodes.len()];
    let mut row_y = vec![0.0f32; nodes.len()];

    for (column, bucket) in buckets.values().enumerate() {
        let ordered: Vec<usize> = if column == 0 {
            bucket.clone()
        } else {
            // Stable sort: equal barycenters keep ingest order
            let mut keyed: Vec<(f32, usize)> = bucket
                .iter()
                .map(|&i| (mean_neighbor_y(i, &neighbors, &placed, &row_y), i))
                .collect();
            keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
            keyed.into_iter().map(|(_, i)| i).collect()
        };

        // Stack the column vertically, centered on y = 0
        let x = column as f32 * config.horizontal_spacing;
        let offset = (ordered.len() as f32 - 1.0) / 2.0;
        for (row, &i) in ordered.iter().enumerate() {
            nodes[i].x = x;
            nodes[i].y = (row as f32 - offset) * config.vertical_spacing;
            placed[i] = true;
            row_y[i] = nodes[i].y;
        }
    }

    PlacedGraph::new(nodes, links)
}

// Mean y over the neighbors already placed in earlier columns; a node with
// none sorts to the neutral center
fn mean_neighbor_y(node: usize, neighbors: &[BTreeSet<usize>], placed: &[bool], row_y: &[f32]) -> f32 {
    let mut sum = 0.0f32;
    let mut count = 0u32;
    for &other in &neighbors[node] {
        if placed[other] {
            sum += row_y[other];
            count += 1;
        }
    }
    if count == 0 { 0.0 } else { sum / count as f32 }
}
