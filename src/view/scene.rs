use std::collections::BTreeSet;

use log::info;
use serde::{Deserialize, Serialize};

use crate::feed::records::EdgeRecord;
use crate::graph::ingest::build_graph;
use crate::graph::layout::{LayoutConfig, layout_graph};
use crate::graph::model::{GraphNode, NodeId, PlacedGraph, PlacedLink};
use crate::graph::neighbors::{NeighborLists, neighbors_of};

use super::transform::{MIN_VIEWPORT, NODE_HEIGHT, NODE_WIDTH, ViewTransform, fit_transform};

// Pixel movement before a press turns from a click into a pan
pub const DRAG_THRESHOLD: f32 = 4.0;
// Pixel reach when picking a link by its segment
pub const LINK_HIT_DISTANCE: f32 = 6.0;
// Factor applied by the zoom toolbar buttons
pub const ZOOM_STEP: f32 = 1.25;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Highlight {
    Node(NodeId),
    Link(usize),
}

// Everything the host owns about the view, mutated only through the named
// operations on GraphScene and serialized as-is into session files.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    // None follows the computed fit transform; Some is a user override and
    // survives viewport resizes untouched
    pub transform: Option<ViewTransform>,
    pub selection: Option<NodeId>,
    pub highlight: Option<Highlight>,
    pub visible_types: BTreeSet<String>,
    // Types already offered to the user; lets new snapshot types default to
    // visible without reviving ones the user unchecked
    #[serde(default)]
    pub known_types: BTreeSet<String>,
}

// Press starts Pending; crossing DRAG_THRESHOLD makes it a pan; releasing
// while still Pending is a click
#[derive(Clone, Copy, Debug, Default, PartialEq)]
enum Gesture {
    #[default]
    Idle,
    Pending { start: (f32, f32) },
    Panning { last: (f32, f32) },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hit {
    Node(usize),
    Link(usize),
}

/// Laid-out graph plus view state behind named operations. Ingest and
/// layout run only in `set_snapshot`; the fit transform is recomputed only
/// when the layout or the viewport size actually changes. Highlight and
/// selection changes never touch either.
pub struct GraphScene {
    graph: PlacedGraph,
    config: LayoutConfig,
    viewport: (f32, f32),
    fit: ViewTransform,
    state: ViewState,
    gesture: Gesture,
}

impl Default for GraphScene {
    fn default() -> Self {
        Self::new(LayoutConfig::default())
    }
}

impl GraphScene {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            graph: PlacedGraph::default(),
            config,
            viewport: (MIN_VIEWPORT, MIN_VIEWPORT),
            fit: ViewTransform::IDENTITY,
            state: ViewState::default(),
            gesture: Gesture::Idle,
        }
    }

    // ---- snapshot / viewport -------------------------------------------

    // Ingest a new snapshot and lay it out. The transform override persists;
    // selection survives only if the node still exists; highlight clears.
    pub fn set_snapshot(&mut self, records: &[EdgeRecord]) {
        let data = build_graph(records);
        self.graph = layout_graph(&data, &self.config);

        for ty in self.graph.entity_type_counts().keys() {
            if self.state.known_types.insert(ty.clone()) {
                self.state.visible_types.insert(ty.clone());
            }
        }
        if let Some(id) = &self.state.selection {
            if !self.graph.contains(id) {
                self.state.selection = None;
            }
        }
        self.state.highlight = None;
        self.gesture = Gesture::Idle;
        self.refit();
        info!(
            "snapshot ingested: {} nodes, {} links",
            self.graph.nodes.len(),
            self.graph.links.len()
        );
    }

    // Coalesced: recompute fit only when the size really changed, and never
    // disturb a user override
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        let size = (width.max(MIN_VIEWPORT), height.max(MIN_VIEWPORT));
        if size != self.viewport {
            self.viewport = size;
            self.refit();
        }
    }

    fn refit(&mut self) {
        self.fit = fit_transform(&self.graph.nodes, self.viewport.0, self.viewport.1);
    }

    // ---- transform ------------------------------------------------------

    // The active transform: user override if present, else the fit
    pub fn transform(&self) -> ViewTransform {
        self.state.transform.unwrap_or(self.fit)
    }

    pub fn is_fitted(&self) -> bool {
        self.state.transform.is_none()
    }

    // Drop the override and follow the fit transform again
    pub fn fit_to_view(&mut self) {
        self.state.transform = None;
    }

    pub fn zoom_in(&mut self) {
        self.zoom_about_center(ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.zoom_about_center(1.0 / ZOOM_STEP);
    }

    fn zoom_about_center(&mut self, factor: f32) {
        let (w, h) = self.viewport;
        let next = self.transform().zoom_at(w / 2.0, h / 2.0, factor);
        self.state.transform = Some(next);
    }

    // Wheel zoom anchored at the pointer; scroll distance maps to a gentle,
    // clamped factor per event
    pub fn wheel(&mut self, sx: f32, sy: f32, scroll_y: f32) {
        if scroll_y == 0.0 {
            return;
        }
        let factor = (1.0 + scroll_y * 0.001).clamp(0.9, 1.1);
        self.state.transform = Some(self.transform().zoom_at(sx, sy, factor));
    }

    // ---- pointer gestures ----------------------------------------------

    pub fn pointer_down(&mut self, sx: f32, sy: f32) {
        self.gesture = Gesture::Pending { start: (sx, sy) };
    }

    pub fn pointer_move(&mut self, sx: f32, sy: f32) {
        match self.gesture {
            Gesture::Idle => {
                self.state.highlight = match self.hit_test(sx, sy) {
                    Some(Hit::Node(i)) => Some(Highlight::Node(self.graph.nodes[i].id.clone())),
                    Some(Hit::Link(i)) => Some(Highlight::Link(i)),
                    None => None,
                };
            }
            Gesture::Pending { start } => {
                let (dx, dy) = (sx - start.0, sy - start.1);
                if (dx * dx + dy * dy).sqrt() > DRAG_THRESHOLD {
                    // The accumulated delta applies in full once the pan starts
                    self.state.transform = Some(self.transform().pan_by(dx, dy));
                    self.gesture = Gesture::Panning { last: (sx, sy) };
                }
            }
            Gesture::Panning { last } => {
                let next = self.transform().pan_by(sx - last.0, sy - last.1);
                self.state.transform = Some(next);
                self.gesture = Gesture::Panning { last: (sx, sy) };
            }
        }
    }

    // Release below the threshold is a click: a node toggles selection,
    // anything else clears it. Release after a pan changes nothing.
    pub fn pointer_up(&mut self, sx: f32, sy: f32) {
        if let Gesture::Pending { .. } = self.gesture {
            match self.hit_test(sx, sy) {
                Some(Hit::Node(i)) => {
                    let id = self.graph.nodes[i].id.clone();
                    if self.state.selection.as_deref() == Some(id.as_str()) {
                        self.state.selection = None;
                    } else {
                        self.state.selection = Some(id);
                    }
                }
                _ => self.state.selection = None,
            }
        }
        self.gesture = Gesture::Idle;
    }

    // Release happened somewhere we cannot see (window left, focus lost)
    pub fn pointer_cancel(&mut self) {
        self.gesture = Gesture::Idle;
    }

    pub fn gesture_active(&self) -> bool {
        self.gesture != Gesture::Idle
    }

    // ---- selection / highlight -----------------------------------------

    pub fn select_node(&mut self, id: &str) {
        if self.graph.contains(id) {
            self.state.selection = Some(id.to_string());
        }
    }

    pub fn clear_selection(&mut self) {
        self.state.selection = None;
    }

    pub fn selection(&self) -> Option<&str> {
        self.state.selection.as_deref()
    }

    // Selected node with its neighbor lists, computed on request
    pub fn selection_neighbors(&self) -> Option<(&GraphNode, NeighborLists<'_>)> {
        let id = self.state.selection.as_deref()?;
        let node = self.graph.node_by_id(id)?;
        Some((node, neighbors_of(&self.graph, id)))
    }

    // One highlight slot, last event wins
    pub fn hover_node(&mut self, id: &str) {
        if self.graph.contains(id) {
            self.state.highlight = Some(Highlight::Node(id.to_string()));
        }
    }

    pub fn hover_link(&mut self, index: usize) {
        if index < self.graph.links.len() {
            self.state.highlight = Some(Highlight::Link(index));
        }
    }

    pub fn clear_hover(&mut self) {
        self.state.highlight = None;
    }

    // A highlighted node spills onto every link touching it
    pub fn link_highlighted(&self, index: usize) -> bool {
        match &self.state.highlight {
            Some(Highlight::Link(l)) => *l == index,
            Some(Highlight::Node(id)) => {
                let Some(node) = self.graph.index_of(id) else {
                    return false;
                };
                self.graph
                    .links
                    .get(index)
                    .map(|link| link.source == node || link.target == node)
                    .unwrap_or(false)
            }
            None => false,
        }
    }

    // ... and a highlighted link onto both of its endpoints
    pub fn node_highlighted(&self, index: usize) -> bool {
        match &self.state.highlight {
            Some(Highlight::Node(id)) => self.graph.index_of(id) == Some(index),
            Some(Highlight::Link(l)) => self
                .graph
                .links
                .get(*l)
                .map(|link| link.source == index || link.target == index)
                .unwrap_or(false),
            None => false,
        }
    }

    pub fn highlight(&self) -> Option<&Highlight> {
        self.state.highlight.as_ref()
    }

    // ---- visibility -----------------------------------------------------

    // Replace the visible set wholesale
    pub fn set_visible_types(&mut self, types: impl IntoIterator<Item = String>) {
        self.state.visible_types = types.into_iter().collect();
    }

    pub fn set_type_visible(&mut self, entity_type: &str, visible: bool) {
        if visible {
            self.state.visible_types.insert(entity_type.to_string());
        } else {
            self.state.visible_types.remove(entity_type);
        }
    }

    pub fn is_type_visible(&self, entity_type: &str) -> bool {
        self.state.visible_types.contains(entity_type)
    }

    pub fn visible_nodes(&self) -> impl DoubleEndedIterator<Item = (usize, &GraphNode)> {
        self.graph
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| self.state.visible_types.contains(&node.entity_type))
    }

    // A link shows only while both of its endpoints do
    pub fn visible_links(&self) -> impl Iterator<Item = (usize, &PlacedLink)> {
        self.graph.links.iter().enumerate().filter(|(_, link)| {
            let source = &self.graph.nodes[link.source];
            let target = &self.graph.nodes[link.target];
            self.state.visible_types.contains(&source.entity_type)
                && self.state.visible_types.contains(&target.entity_type)
        })
    }

    // ---- picking ---------------------------------------------------------

    // Node cards first (scanned back to front, matching draw order), then
    // the nearest visible link within pixel reach
    pub fn hit_test(&self, sx: f32, sy: f32) -> Option<Hit> {
        let transform = self.transform();
        let (lx, ly) = transform.to_layout(sx, sy);

        for (i, node) in self.visible_nodes().rev() {
            if (lx - node.x).abs() <= NODE_WIDTH / 2.0 && (ly - node.y).abs() <= NODE_HEIGHT / 2.0 {
                return Some(Hit::Node(i));
            }
        }

        let mut best: Option<(f32, usize)> = None;
        for (i, link) in self.visible_links() {
            let a = &self.graph.nodes[link.source];
            let b = &self.graph.nodes[link.target];
            let d = point_segment_distance(
                (sx, sy),
                transform.to_screen(a.x, a.y),
                transform.to_screen(b.x, b.y),
            );
            if d <= LINK_HIT_DISTANCE && best.map(|(bd, _)| d < bd).unwrap_or(true) {
                best = Some((d, i));
            }
        }
        best.map(|(_, i)| Hit::Link(i))
    }

    // ---- accessors -------------------------------------------------------

    pub fn graph(&self) -> &PlacedGraph {
        &self.graph
    }

    pub fn layout_config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn viewport(&self) -> (f32, f32) {
        self.viewport
    }

    // Session restore: transform is sanitized, dangling selection and
    // out-of-range highlights are dropped, and entity types the saved state
    // never saw default to visible
    pub fn restore_state(&mut self, state: ViewState) {
        self.state = state;
        self.state.transform = self.state.transform.map(|t| t.sanitized());
        for ty in self.graph.entity_type_counts().keys() {
            if self.state.known_types.insert(ty.clone()) {
                self.state.visible_types.insert(ty.clone());
            }
        }
        if let Some(id) = &self.state.selection {
            if !self.graph.contains(id) {
                self.state.selection = None;
            }
        }
        let valid = match &self.state.highlight {
            Some(Highlight::Node(id)) => self.graph.contains(id),
            Some(Highlight::Link(i)) => *i < self.graph.links.len(),
            None => true,
        };
        if !valid {
            self.state.highlight = None;
        }
    }
}

// Distance from a point to the closest point of a segment, all in screen
// space so link picking feels the same at every zoom
fn point_segment_distance(p: (f32, f32), a: (f32, f32), b: (f32, f32)) -> f32 {
    let ab = (b.0 - a.0, b.1 - a.1);
    let ap = (p.0 - a.0, p.1 - a.1);
    let len2 = ab.0 * ab.0 + ab.1 * ab.1;
    let t = if len2 > 0.0 {
        ((ap.0 * ab.0 + ap.1 * ab.1) / len2).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let proj = (a.0 + ab.0 * t, a.1 + ab.1 * t);
    let (dx, dy) = (p.0 - proj.0, p.1 - proj.1);
    (dx * dx + dy * dy).sqrt()
}
