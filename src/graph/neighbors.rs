use super::model::{GraphNode, PlacedGraph};

// One row of the selection detail panel
#[derive(Clone, Copy, Debug)]
pub struct NeighborEntry<'a> {
    pub node: &'a GraphNode,
    pub relationship_type: &'a str,
}

#[derive(Clone, Debug, Default)]
pub struct NeighborLists<'a> {
    pub incoming: Vec<NeighborEntry<'a>>,
    pub outgoing: Vec<NeighborEntry<'a>>,
}

impl NeighborLists<'_> {
    pub fn is_empty(&self) -> bool {
        self.incoming.is_empty() && self.outgoing.is_empty()
    }
}

// Built per request, never cached. Entries follow link order, which is
// ingest order, so the panel stays stable across recomputes.
pub fn neighbors_of<'a>(graph: &'a PlacedGraph, id: &str) -> NeighborLists<'a> {
    let mut lists = NeighborLists::default();
    let Some(selected) = graph.index_of(id) else {
        return lists;
    };
    for link in &graph.links {
        if link.target == selected {
            lists.incoming.push(NeighborEntry {
                node: &graph.nodes[link.source],
                relationship_type: &link.relationship_type,
            });
        }
        if link.source == selected {
            lists.outgoing.push(NeighborEntry {
                node: &graph.nodes[link.target],
                relationship_type: &link.relationship_type,
            });
        }
    }
    lists
}
