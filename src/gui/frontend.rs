#![allow(clippy::collapsible_if)]
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use eframe::egui::{self, Color32, Pos2, Rect, Sense, Stroke, StrokeKind, Vec2};
use log::{error, info, warn};

use crate::feed::records::{self, GraphViewResult};
use crate::graph::model::{GraphNode, value_text};
use crate::graph::neighbors::NeighborEntry;
use crate::persistence::persist::{self, SessionFile};
use crate::persistence::settings::AppSettings;
use crate::view::scene::{GraphScene, Highlight};
use crate::view::transform::{NODE_HEIGHT, NODE_WIDTH};

// Export currently visible nodes with their level and placement. The level
// is the semantic one from the type table, not the compacted column index.
pub fn export_nodes_csv(scene: &GraphScene, path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(["id", "entity_type", "name", "level", "column_x", "row_y", "summary"])?;
    let config = scene.layout_config();
    let mut rows = 0usize;
    for (_, node) in scene.visible_nodes() {
        wtr.write_record(&[
            node.id.clone(),
            node.entity_type.clone(),
            node.name.clone(),
            config.level_of(&node.entity_type).to_string(),
            node.x.to_string(),
            node.y.to_string(),
            node.summary.clone().unwrap_or_default(),
        ])?;
        rows += 1;
    }
    wtr.flush()?;
    info!("exported {} visible nodes to {}", rows, path.display());
    Ok(())
}

// Export the raw snapshot exactly as it was received
pub fn export_snapshot_json(snapshot: &GraphViewResult, path: &Path) -> std::io::Result<()> {
    use std::fs::File;
    use std::io::Write;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let f = File::create(path)?;
    serde_json::to_writer_pretty(f, snapshot)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    // ensure newline at end
    let mut f2 = std::fs::OpenOptions::new().append(true).open(path)?;
    let _ = f2.write_all(b"\n");
    info!(
        "exported snapshot ({} records) to {}",
        snapshot.records.len(),
        path.display()
    );
    Ok(())
}

fn export_stamp() -> String {
    let now = time::OffsetDateTime::now_utc();
    let fmt = time::macros::format_description!("[year][month][day]_[hour][minute][second]");
    now.format(&fmt).unwrap_or_else(|_| "now".into())
}

// Owned snapshot of the selected node and its neighbor rows, taken before the
// detail panel runs so panel clicks can mutate the scene freely
struct DetailView {
    node: GraphNode,
    incoming: Vec<NeighborRow>,
    outgoing: Vec<NeighborRow>,
}

struct NeighborRow {
    id: String,
    name: String,
    entity_type: String,
    relationship_type: String,
}

pub struct FlowApp {
    scene: GraphScene,
    // Raw snapshot as received; session files and exports carry it verbatim
    snapshot: GraphViewResult,
    // persistence
    save_error: Option<String>,
    last_save_info: Option<String>,
    // Remember last canvas rect to detect the pointer leaving the canvas
    last_canvas_rect: Option<Rect>,
    // Transient zoom HUD (show current zoom briefly when scrolling)
    zoom_hud_until: Option<Instant>,
    // Open-snapshot modal state
    show_open_window: bool,
    open_path_input: String,
    open_status: Option<String>,
    // Versioned-session picker
    show_versions_window: bool,
    // Export modal state
    show_export_window: bool,
    export_is_json: bool,
    export_path: String,
    export_status: Option<String>,
    // App settings and Preferences UI state
    app_settings: AppSettings,
    show_prefs_window: bool,
    prefs_edit: AppSettings,
    // Editor buffers for the directory overrides; parsed on Save
    prefs_session_override_str: String,
    prefs_export_override_str: String,
    prefs_status: Option<String>,
}

impl FlowApp {
    pub fn new(app_settings: AppSettings, session: SessionFile) -> Self {
        let mut s = Self {
            scene: GraphScene::default(),
            snapshot: GraphViewResult::default(),
            save_error: None,
            last_save_info: None,
            last_canvas_rect: None,
            zoom_hud_until: None,
            show_open_window: false,
            open_path_input: String::new(),
            open_status: None,
            show_versions_window: false,
            show_export_window: false,
            export_is_json: true,
            export_path: String::new(),
            export_status: None,
            prefs_edit: app_settings.clone(),
            app_settings,
            show_prefs_window: false,
            prefs_session_override_str: String::new(),
            prefs_export_override_str: String::new(),
            prefs_status: None,
        };
        s.apply_session(session);
        s
    }

    fn apply_session(&mut self, session: SessionFile) {
        self.snapshot = session.snapshot;
        self.scene.set_snapshot(&self.snapshot.records);
        self.scene.restore_state(session.view);
    }

    fn apply_snapshot(&mut self, snapshot: GraphViewResult) {
        self.snapshot = snapshot;
        self.scene.set_snapshot(&self.snapshot.records);
    }

    fn session_file(&self) -> SessionFile {
        SessionFile {
            snapshot: self.snapshot.clone(),
            view: self.scene.state().clone(),
        }
    }

    fn save_now(&mut self) {
        match persist::save_active(&self.session_file()) {
            Ok(path) => {
                self.save_error = None;
                self.last_save_info = Some(format!("Saved to {}", path.display()));
            }
            Err(e) => {
                warn!("session save failed: {}", e);
                self.save_error = Some(format!("Save failed: {}", e));
            }
        }
    }

    fn save_versioned_now(&mut self) {
        match persist::save_versioned(&self.session_file()) {
            Ok(path) => {
                self.save_error = None;
                self.last_save_info = Some(format!("Saved version {}", path.display()));
            }
            Err(e) => {
                warn!("versioned session save failed: {}", e);
                self.save_error = Some(format!("Save version failed: {}", e));
            }
        }
    }

    // Public helpers callable from menus and keyboard shortcuts
    pub fn menu_save(&mut self) {
        self.save_now();
    }

    pub fn menu_save_version(&mut self) {
        self.save_versioned_now();
    }

    pub fn menu_load_latest(&mut self) {
        match persist::load_active() {
            Ok(Some(session)) => {
                self.apply_session(session);
                self.last_save_info = Some("Loaded latest session".into());
                self.save_error = None;
            }
            Ok(None) => {
                self.save_error = Some("No session file found".into());
            }
            Err(e) => {
                warn!("session load failed: {}", e);
                self.save_error = Some(format!("Load failed: {}", e));
            }
        }
    }

    pub fn menu_load_demo(&mut self) {
        self.apply_snapshot(records::demo_snapshot());
        self.last_save_info = Some("Demo snapshot loaded".into());
        self.save_error = None;
    }

    pub fn menu_open_snapshot(&mut self) {
        self.open_status = None;
        self.show_open_window = true;
    }

    pub fn menu_open_export(&mut self) {
        if self.export_path.is_empty() {
            let ext = if self.export_is_json { "json" } else { "csv" };
            let mut base = self.app_settings.export_dir();
            base.push(format!("flow_export_{}.{}", export_stamp(), ext));
            self.export_path = base.display().to_string();
        }
        self.export_status = None;
        self.show_export_window = true;
    }

    // Seed the editor working copy from the live settings
    pub fn menu_open_prefs(&mut self) {
        self.prefs_edit = self.app_settings.clone();
        self.prefs_session_override_str = match &self.prefs_edit.session_override {
            Some(p) => p.display().to_string(),
            None => String::new(),
        };
        self.prefs_export_override_str = match &self.prefs_edit.export_override {
            Some(p) => p.display().to_string(),
            None => String::new(),
        };
        self.prefs_status = None;
        self.show_prefs_window = true;
    }

    fn load_snapshot_from_input(&mut self) -> bool {
        let path = PathBuf::from(self.open_path_input.trim());
        match records::load_snapshot(&path) {
            Ok(snapshot) => {
                self.apply_snapshot(snapshot);
                self.last_save_info = Some(format!("Loaded {}", path.display()));
                self.open_status = None;
                true
            }
            Err(e) => {
                warn!("snapshot load failed: {:#}", e);
                self.open_status = Some(format!("Load failed: {:#}", e));
                false
            }
        }
    }

    // Stable color per entity type. The stage types of a typical engagement
    // graph get fixed hues so screenshots stay comparable; anything else
    // hashes into the same palette.
    fn color_for_type(entity_type: &str) -> Color32 {
        const PALETTE: [Color32; 12] = [
            Color32::from_rgb(0x7b, 0xa3, 0xff), // blue
            Color32::from_rgb(0xff, 0xa3, 0x7b), // orange
            Color32::from_rgb(0x7b, 0xff, 0xa3), // green
            Color32::from_rgb(0xff, 0x7b, 0xa3), // pink
            Color32::from_rgb(0xa3, 0x7b, 0xff), // violet
            Color32::from_rgb(0xff, 0xe0, 0x7b), // yellow
            Color32::from_rgb(0x7b, 0xff, 0xe0), // teal
            Color32::from_rgb(0xe0, 0x7b, 0xff), // purple
            Color32::from_rgb(0x7b, 0xe0, 0xff), // cyan
            Color32::from_rgb(0xff, 0x7b, 0xe0), // magenta
            Color32::from_rgb(0x9a, 0xcd, 0x32), // yellowgreen
            Color32::from_rgb(0xcd, 0x32, 0x9a), // fuchsia
        ];
        match entity_type {
            "Host" => PALETTE[0],
            "Port" => PALETTE[8],
            "Service" => PALETTE[2],
            "Vulnerability" => PALETTE[3],
            "Access" => PALETTE[1],
            "Credential" => PALETTE[5],
            "Account" => PALETTE[4],
            other => {
                use std::hash::{Hash, Hasher};
                let mut hasher = std::collections::hash_map::DefaultHasher::new();
                other.hash(&mut hasher);
                let h = hasher.finish() as usize;
                PALETTE[h % PALETTE.len()]
            }
        }
    }

    fn detail_view(&self) -> Option<DetailView> {
        let (node, lists) = self.scene.selection_neighbors()?;
        let to_row = |e: &NeighborEntry<'_>| NeighborRow {
            id: e.node.id.clone(),
            name: e.node.name.clone(),
            entity_type: e.node.entity_type.clone(),
            relationship_type: e.relationship_type.to_string(),
        };
        Some(DetailView {
            node: node.clone(),
            incoming: lists.incoming.iter().map(to_row).collect(),
            outgoing: lists.outgoing.iter().map(to_row).collect(),
        })
    }
}

impl eframe::App for FlowApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Hover highlight goes stale once the pointer leaves the canvas; the
        // side panels re-assert their own hover later in the frame
        if let (Some(rect), Some(pos)) = (self.last_canvas_rect, ctx.pointer_hover_pos()) {
            if !rect.contains(pos) && !self.scene.gesture_active() {
                self.scene.clear_hover();
            }
        }

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            // Check for keyboard shortcuts
            if ctx.input_mut(|i| i.consume_shortcut(&egui::KeyboardShortcut::new(egui::Modifiers::COMMAND, egui::Key::S))) {
                self.menu_save();
            }
            if ctx.input_mut(|i| i.consume_shortcut(&egui::KeyboardShortcut::new(egui::Modifiers::COMMAND | egui::Modifiers::SHIFT, egui::Key::S))) {
                self.menu_save_version();
            }
            if ctx.input_mut(|i| i.consume_shortcut(&egui::KeyboardShortcut::new(egui::Modifiers::COMMAND, egui::Key::O))) {
                self.menu_load_latest();
            }
            if ctx.input_mut(|i| i.consume_shortcut(&egui::KeyboardShortcut::new(egui::Modifiers::COMMAND, egui::Key::Num0))) {
                self.scene.fit_to_view();
            }

            // Use compact menus so options remain accessible regardless of width
            ui.horizontal(|ui| {
                ui.label("Chainview");

                ui.menu_button("File", |ui| {
                    if ui.button("Open Snapshot\u{2026}").clicked() {
                        self.menu_open_snapshot();
                        ui.close();
                    }
                    if ui.button("Load Demo Snapshot").clicked() {
                        self.menu_load_demo();
                        ui.close();
                    }
                    ui.separator();
                    if ui.add(egui::Button::new("Save Session").shortcut_text(ctx.format_shortcut(&egui::KeyboardShortcut::new(egui::Modifiers::COMMAND, egui::Key::S)))).clicked() {
                        self.menu_save();
                        ui.close();
                    }
                    if ui.add(egui::Button::new("Save Session As").shortcut_text(ctx.format_shortcut(&egui::KeyboardShortcut::new(egui::Modifiers::COMMAND | egui::Modifiers::SHIFT, egui::Key::S)))).clicked() {
                        self.menu_save_version();
                        ui.close();
                    }
                    if ui.add(egui::Button::new("Load Latest").shortcut_text(ctx.format_shortcut(&egui::KeyboardShortcut::new(egui::Modifiers::COMMAND, egui::Key::O)))).clicked() {
                        self.menu_load_latest();
                        ui.close();
                    }
                    if ui.button("Load Version\u{2026}").clicked() {
                        self.show_versions_window = true;
                        ui.close();
                    }
                    ui.separator();
                    if ui.button("Export\u{2026}").clicked() {
                        self.menu_open_export();
                        ui.close();
                    }
                    ui.separator();
                    if ui.add(egui::Button::new("Quit").shortcut_text(ctx.format_shortcut(&egui::KeyboardShortcut::new(egui::Modifiers::COMMAND, egui::Key::Q)))).clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                        ui.close();
                    }
                });

                ui.menu_button("View", |ui| {
                    if ui.add(egui::Button::new("Fit to View").shortcut_text(ctx.format_shortcut(&egui::KeyboardShortcut::new(egui::Modifiers::COMMAND, egui::Key::Num0)))).clicked() {
                        self.scene.fit_to_view();
                        ui.close();
                    }
                    if ui.button("Zoom In").clicked() {
                        self.scene.zoom_in();
                    }
                    if ui.button("Zoom Out").clicked() {
                        self.scene.zoom_out();
                    }
                });

                ui.menu_button("Settings", |ui| {
                    if ui.button("Preferences\u{2026}").clicked() {
                        self.menu_open_prefs();
                        ui.close();
                    }
                });

                // Keep a tiny status label; avoid long texts to prevent hiding on small widths
                let graph = self.scene.graph();
                if self.snapshot.group_id.is_empty() {
                    ui.small(format!("N:{} L:{}", graph.nodes.len(), graph.links.len()));
                } else {
                    ui.small(format!(
                        "{} N:{} L:{}",
                        self.snapshot.group_id,
                        graph.nodes.len(),
                        graph.links.len()
                    ));
                }
                if let Some(info) = &self.last_save_info {
                    ui.separator();
                    ui.small(info.clone());
                }
                if let Some(err) = &self.save_error {
                    ui.separator();
                    ui.colored_label(Color32::RED, err);
                }
            });
        });

        egui::SidePanel::left("entity_sidebar")
            .resizable(true)
            .default_width(210.0)
            .show(ctx, |ui| {
                ui.heading("Entity Types");
                ui.separator();
                for (ty, count) in self.scene.graph().entity_type_counts() {
                    let mut visible = self.scene.is_type_visible(&ty);
                    ui.horizontal(|ui| {
                        let (dot, _) = ui.allocate_exact_size(Vec2::splat(12.0), Sense::hover());
                        ui.painter()
                            .circle_filled(dot.center(), 4.0, Self::color_for_type(&ty));
                        if ui.checkbox(&mut visible, format!("{} ({})", ty, count)).changed() {
                            self.scene.set_type_visible(&ty, visible);
                        }
                    });
                }
                if self.scene.graph().nodes.is_empty() {
                    ui.small("no snapshot loaded");
                }
                ui.separator();
                ui.horizontal(|ui| {
                    if ui.button("\u{2212}").clicked() {
                        self.scene.zoom_out();
                    }
                    if ui.button("+").clicked() {
                        self.scene.zoom_in();
                    }
                    if ui.button("Fit").clicked() {
                        self.scene.fit_to_view();
                    }
                    ui.small(format!("{:.2}x", self.scene.transform().scale));
                });
                if !self.scene.is_fitted() {
                    ui.small("manual view; Fit follows the layout again");
                }
                ui.separator();
                egui::CollapsingHeader::new("Level of detail")
                    .default_open(false)
                    .show(ui, |ui| {
                        ui.checkbox(&mut self.app_settings.lod_enabled, "Enable LOD")
                            .on_hover_text("Hide labels when zoomed out or when the graph is very large; always show for hovered/selected nodes");
                        ui.horizontal(|ui| {
                            ui.label("Hide labels when nodes \u{2265}");
                            ui.add(
                                egui::DragValue::new(
                                    &mut self.app_settings.lod_hide_labels_node_threshold,
                                )
                                .range(50..=2000),
                            );
                        });
                        ui.horizontal(|ui| {
                            ui.label("Min zoom for labels");
                            ui.add(
                                egui::Slider::new(
                                    &mut self.app_settings.lod_label_min_zoom,
                                    0.3..=1.5,
                                )
                                .clamping(egui::SliderClamping::Always),
                            );
                        });
                    });
            });

        // Detail panel only while something is selected
        if let Some(detail) = self.detail_view() {
            egui::SidePanel::right("detail_sidebar")
                .resizable(true)
                .default_width(270.0)
                .show(ctx, |ui| {
                    ui.heading(&detail.node.name);
                    ui.colored_label(
                        Self::color_for_type(&detail.node.entity_type),
                        &detail.node.entity_type,
                    );
                    if let Some(summary) = &detail.node.summary {
                        ui.separator();
                        ui.label(summary);
                    }
                    if let Some(description) = &detail.node.description {
                        ui.small(description.clone());
                    }
                    ui.separator();

                    // Properties, name/summary/description already shown above
                    let mut keys: Vec<&String> = detail
                        .node
                        .properties
                        .keys()
                        .filter(|k| !matches!(k.as_str(), "name" | "summary" | "description"))
                        .collect();
                    keys.sort();
                    if !keys.is_empty() {
                        egui::Grid::new("detail_properties").num_columns(2).show(ui, |ui| {
                            for k in keys {
                                ui.small(k.as_str());
                                ui.small(value_text(&detail.node.properties[k]));
                                ui.end_row();
                            }
                        });
                        ui.separator();
                    }

                    let mut jump: Option<String> = None;
                    let mut hover: Option<String> = None;
                    neighbor_section(ui, "Incoming", &detail.incoming, &mut jump, &mut hover);
                    neighbor_section(ui, "Outgoing", &detail.outgoing, &mut jump, &mut hover);
                    if let Some(id) = hover {
                        self.scene.hover_node(&id);
                    }
                    if let Some(id) = jump {
                        self.scene.select_node(&id);
                    }

                    ui.separator();
                    if ui.button("Deselect").clicked() {
                        self.scene.clear_selection();
                    }
                });
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            let available = ui.available_rect_before_wrap();
            self.last_canvas_rect = Some(available);
            self.scene.set_viewport(available.width(), available.height());

            // Background allocation for panning/clicking; the scene does its
            // own hit-testing, so nothing else competes for the pointer here
            let bg_resp = ui.allocate_rect(available, Sense::click_and_drag());

            if ui.input(|i| i.key_pressed(egui::Key::Escape)) {
                self.scene.clear_selection();
            }

            let origin = available.min;

            if bg_resp.hovered() && ui.input(|i| i.pointer.primary_pressed()) {
                if let Some(pos) = ui.input(|i| i.pointer.press_origin()) {
                    self.scene.pointer_down(pos.x - origin.x, pos.y - origin.y);
                }
            }
            if bg_resp.hovered() || self.scene.gesture_active() {
                if let Some(pos) = ui.input(|i| i.pointer.latest_pos()) {
                    self.scene.pointer_move(pos.x - origin.x, pos.y - origin.y);
                }
            }
            if ui.input(|i| i.pointer.primary_released()) {
                match ui.input(|i| i.pointer.latest_pos()) {
                    Some(pos) => self.scene.pointer_up(pos.x - origin.x, pos.y - origin.y),
                    None => self.scene.pointer_cancel(),
                }
            }

            // Zoom with scroll only when pointer is over the canvas area
            if bg_resp.hovered() {
                let scroll = ui.input(|i| i.raw_scroll_delta.y);
                if scroll != 0.0 {
                    if let Some(pos) = ui.ctx().pointer_hover_pos() {
                        self.scene.wheel(pos.x - origin.x, pos.y - origin.y, scroll);
                        // Show transient zoom HUD
                        self.zoom_hud_until = Some(Instant::now() + Duration::from_millis(1000));
                        ui.ctx().request_repaint_after(Duration::from_millis(16));
                    }
                }
            }

            let painter = ui.painter_at(available);
            let transform = self.scene.transform();
            let place = move |x: f32, y: f32| -> Pos2 {
                let (sx, sy) = transform.to_screen(x, y);
                Pos2::new(origin.x + sx, origin.y + sy)
            };

            // Draw edges first so cards sit on top
            let graph = self.scene.graph();
            let any_highlight = self.scene.highlight().is_some();
            let base_color = Color32::from_rgba_premultiplied(200, 200, 200, 160);
            for (i, link) in self.scene.visible_links() {
                let a = place(graph.nodes[link.source].x, graph.nodes[link.source].y);
                let b = place(graph.nodes[link.target].x, graph.nodes[link.target].y);
                let lit = self.scene.link_highlighted(i);
                let mut stroke = if lit {
                    Stroke { width: 2.5, color: Color32::from_rgb(120, 220, 255) }
                } else {
                    Stroke { width: 1.5, color: base_color }
                };
                // Dim edges not touching the highlighted item
                if any_highlight && !lit {
                    let c = stroke.color;
                    stroke.color = Color32::from_rgba_premultiplied(
                        c.r(),
                        c.g(),
                        c.b(),
                        (c.a() as f32 * 0.4) as u8,
                    );
                }
                painter.line_segment([a, b], stroke);

                // Relationship label only while the edge is highlighted
                if lit && !link.relationship_type.is_empty() {
                    let mid = Pos2::new((a.x + b.x) * 0.5, (a.y + b.y) * 0.5);
                    let dir = Vec2::new(b.x - a.x, b.y - a.y);
                    let len = (dir.x * dir.x + dir.y * dir.y).sqrt();
                    if len > 1.0 {
                        let n = Vec2::new(-dir.y / len, dir.x / len);
                        let mag = (10.0 * transform.scale).clamp(6.0, 16.0);
                        painter.text(
                            mid + n * mag,
                            egui::Align2::CENTER_CENTER,
                            &link.relationship_type,
                            egui::FontId::proportional((11.0 * transform.scale).clamp(9.0, 16.0)),
                            Color32::from_rgb(200, 220, 235),
                        );
                    }
                }
            }

            // Node cards
            let card_size = Vec2::new(NODE_WIDTH * transform.scale, NODE_HEIGHT * transform.scale);
            let many = graph.nodes.len() >= self.app_settings.lod_hide_labels_node_threshold;
            for (i, node) in self.scene.visible_nodes() {
                let center = place(node.x, node.y);
                let rect = Rect::from_center_size(center, card_size);
                let is_selected = self.scene.selection() == Some(node.id.as_str());
                let is_hover = self.scene.node_highlighted(i) && !is_selected;

                let fill = if is_selected {
                    Color32::from_rgb(80, 120, 255)
                } else {
                    Color32::from_rgb(60, 60, 60)
                };
                let stroke = if is_selected {
                    Stroke::new(2.0, Color32::WHITE)
                } else if is_hover {
                    Stroke::new(2.5, Color32::from_rgb(120, 220, 255))
                } else {
                    Stroke::new(1.5, Color32::DARK_GRAY)
                };
                painter.rect_filled(rect, 4.0, fill);
                painter.rect_stroke(rect, 4.0, stroke, StrokeKind::Inside);

                // Entity type as a colored stripe on the left edge of the card
                let stripe_w = (5.0 * transform.scale).clamp(2.0, 6.0);
                let stripe =
                    Rect::from_min_max(rect.min, Pos2::new(rect.min.x + stripe_w, rect.max.y));
                painter.rect_filled(stripe, 2.0, Self::color_for_type(&node.entity_type));

                // Label with LOD rules
                let show_label = if !self.app_settings.lod_enabled {
                    true
                } else {
                    let zoom_ok = transform.scale >= self.app_settings.lod_label_min_zoom;
                    (!many && zoom_ok) || is_hover || is_selected
                };
                if show_label {
                    painter.text(
                        rect.center(),
                        egui::Align2::CENTER_CENTER,
                        truncate_label(&node.name, 20),
                        egui::FontId::proportional((13.0 * transform.scale).clamp(9.0, 22.0)),
                        Color32::from_rgb(230, 230, 230),
                    );
                }
            }

            if graph.nodes.is_empty() {
                painter.text(
                    available.center(),
                    egui::Align2::CENTER_CENTER,
                    "No snapshot loaded. File > Open Snapshot\u{2026}",
                    egui::FontId::proportional(14.0),
                    Color32::GRAY,
                );
            }

            // Draw transient zoom HUD if active
            if let Some(until) = self.zoom_hud_until {
                let now = Instant::now();
                if now < until {
                    let text = format!("{:.2}x", transform.scale);
                    let font = egui::FontId::proportional(14.0);
                    let galley = ui.painter().layout_no_wrap(text, font, Color32::WHITE);
                    let pad = Vec2::new(8.0, 4.0);
                    let size = galley.size() + pad * 2.0;
                    let pos = Pos2::new(available.center().x - size.x * 0.5, available.top() + 12.0);
                    let rect = Rect::from_min_size(pos, size);
                    let bg = Color32::from_rgba_premultiplied(20, 20, 20, 200);
                    painter.rect_filled(rect, 8.0, bg);
                    painter.galley(pos + pad, galley, Color32::WHITE);
                    ui.ctx().request_repaint_after(Duration::from_millis(16));
                } else {
                    self.zoom_hud_until = None;
                }
            }

            // Hover card: readable details without cluttering the canvas
            if let Some(Highlight::Node(id)) = self.scene.highlight() {
                if let Some(node) = graph.node_by_id(id) {
                    let name = node.name.clone();
                    let entity_type = node.entity_type.clone();
                    let summary = node.summary.clone();
                    let mut props: Vec<(String, String)> = node
                        .properties
                        .iter()
                        .filter(|(k, _)| !matches!(k.as_str(), "name" | "summary" | "description"))
                        .map(|(k, v)| (k.clone(), value_text(v)))
                        .collect();
                    props.sort();
                    let extra = props.len().saturating_sub(5);
                    props.truncate(5);
                    bg_resp.on_hover_ui(|ui| {
                        ui.label(egui::RichText::new(name).strong());
                        ui.small(entity_type);
                        if let Some(s) = summary {
                            ui.label(s);
                        }
                        for (k, v) in &props {
                            ui.small(format!("{}: {}", k, v));
                        }
                        if extra > 0 {
                            ui.small(format!("(+{} more)", extra));
                        }
                    });
                }
            }
        });

        if self.show_open_window {
            let mut open = true;
            let mut done = false;
            egui::Window::new("Open Snapshot")
                .open(&mut open)
                .collapsible(false)
                .resizable(true)
                .show(ctx, |ui| {
                    ui.label("Path to a flow snapshot (JSON):");
                    ui.text_edit_singleline(&mut self.open_path_input);
                    ui.add_space(6.0);
                    ui.horizontal(|ui| {
                        if ui.button("Load").clicked() {
                            done = self.load_snapshot_from_input();
                        }
                        if ui.button("Cancel").clicked() {
                            done = true;
                        }
                    });
                    if let Some(msg) = &self.open_status {
                        ui.separator();
                        ui.colored_label(Color32::RED, msg);
                    }
                });
            if !open || done {
                self.show_open_window = false;
            }
        }

        if self.show_versions_window {
            let mut open = true;
            let mut to_load: Option<PathBuf> = None;
            let mut loaded_label: Option<String> = None;
            egui::Window::new("Load Version")
                .collapsible(false)
                .resizable(true)
                .open(&mut open)
                .show(ctx, |ui| {
                    match persist::list_versions() {
                        Ok(list) => {
                            if list.is_empty() {
                                ui.label("No versioned sessions found");
                            }
                            for p in list.iter() {
                                let label =
                                    p.file_name().and_then(|s| s.to_str()).unwrap_or("<unknown>");
                                if ui.button(label).clicked() {
                                    to_load = Some(p.clone());
                                    loaded_label = Some(label.to_string());
                                }
                            }
                        }
                        Err(e) => {
                            ui.colored_label(Color32::RED, format!("List failed: {}", e));
                        }
                    }
                });
            if let Some(p) = to_load {
                match persist::load_from_path(&p) {
                    Ok(session) => {
                        self.apply_session(session);
                        if let Some(label) = loaded_label {
                            self.last_save_info = Some(format!("Loaded {}", label));
                        }
                        self.save_error = None;
                        open = false;
                    }
                    Err(e) => {
                        warn!("failed to load session {}: {}", p.display(), e);
                        self.save_error = Some(format!("Failed to load {}: {}", p.display(), e));
                    }
                }
            }
            self.show_versions_window = open;
        }

        if self.show_export_window {
            let mut open = true;
            egui::Window::new("Export")
                .open(&mut open)
                .collapsible(false)
                .resizable(true)
                .show(ctx, |ui| {
                    ui.label("Choose export format and destination path.");
                    ui.separator();
                    ui.horizontal(|ui| {
                        ui.label("Format:");
                        let mut changed = false;
                        if ui.selectable_label(self.export_is_json, "Snapshot JSON").clicked() {
                            if !self.export_is_json {
                                self.export_is_json = true;
                                changed = true;
                            }
                        }
                        if ui.selectable_label(!self.export_is_json, "Visible nodes CSV").clicked() {
                            if self.export_is_json {
                                self.export_is_json = false;
                                changed = true;
                            }
                        }
                        if changed {
                            // Swap extension if the path already has one
                            let desired_ext = if self.export_is_json { "json" } else { "csv" };
                            let p = PathBuf::from(&self.export_path);
                            if p.extension().is_some() {
                                self.export_path =
                                    p.with_extension(desired_ext).display().to_string();
                            }
                        }
                    });
                    ui.label("Save to:");
                    ui.text_edit_singleline(&mut self.export_path);
                    ui.add_space(6.0);
                    ui.horizontal(|ui| {
                        if ui.button("Export").clicked() {
                            let path = PathBuf::from(self.export_path.clone());
                            let res = if self.export_is_json {
                                export_snapshot_json(&self.snapshot, &path)
                            } else {
                                export_nodes_csv(&self.scene, &path)
                            };
                            self.export_status = Some(match res {
                                Ok(()) => format!("Exported to {}", path.display()),
                                Err(e) => {
                                    warn!("export to {} failed: {}", path.display(), e);
                                    format!("Export failed: {}", e)
                                }
                            });
                        }
                        if ui.button("Cancel").clicked() {
                            self.show_export_window = false;
                        }
                    });
                    if let Some(msg) = &self.export_status {
                        ui.separator();
                        ui.small(msg.clone());
                    }
                });
            if !open {
                self.show_export_window = false;
            }
        }

        if self.show_prefs_window {
            let mut open = true;
            egui::Window::new("Preferences")
                .open(&mut open)
                .resizable(true)
                .collapsible(false)
                .show(ctx, |ui| {
                    ui.heading("General");
                    ui.separator();

                    ui.label("Session directory (leave empty for OS default):");
                    let _ = ui.text_edit_singleline(&mut self.prefs_session_override_str);
                    if ui.button("Clear to default").clicked() {
                        self.prefs_session_override_str.clear();
                    }

                    ui.add_space(8.0);
                    ui.label("Export directory (leave empty for OS temp):");
                    let _ = ui.text_edit_singleline(&mut self.prefs_export_override_str);
                    if ui.button("Clear to default (OS temp)").clicked() {
                        self.prefs_export_override_str.clear();
                    }

                    ui.add_space(8.0);
                    // Show where the settings file is stored on this system (read-only info)
                    ui.label("Settings save directory:");
                    ui.monospace(AppSettings::settings_dir().display().to_string());

                    ui.add_space(4.0);
                    let eff_export = if self.prefs_export_override_str.trim().is_empty() {
                        AppSettings::export_default_dir()
                    } else {
                        PathBuf::from(self.prefs_export_override_str.trim())
                    };
                    ui.label("Effective export default directory:");
                    ui.monospace(eff_export.display().to_string());

                    ui.separator();
                    ui.heading("Rendering / LOD");
                    ui.checkbox(&mut self.prefs_edit.lod_enabled, "Enable level-of-detail (LOD)");
                    ui.add(
                        egui::Slider::new(&mut self.prefs_edit.lod_label_min_zoom, 0.3..=1.5)
                            .text("Label min zoom")
                            .clamping(egui::SliderClamping::Always),
                    );
                    ui.add(
                        egui::Slider::new(
                            &mut self.prefs_edit.lod_hide_labels_node_threshold,
                            50..=2000,
                        )
                        .text("Hide labels above N nodes")
                        .clamping(egui::SliderClamping::Always),
                    );

                    if let Some(msg) = &self.prefs_status {
                        ui.separator();
                        ui.label(msg);
                    }

                    ui.separator();
                    ui.horizontal(|ui| {
                        if ui.button("Save").clicked() {
                            self.prefs_edit.session_override =
                                if self.prefs_session_override_str.trim().is_empty() {
                                    None
                                } else {
                                    Some(PathBuf::from(self.prefs_session_override_str.trim()))
                                };
                            self.prefs_edit.export_override =
                                if self.prefs_export_override_str.trim().is_empty() {
                                    None
                                } else {
                                    Some(PathBuf::from(self.prefs_export_override_str.trim()))
                                };
                            match self.prefs_edit.save() {
                                Ok(()) => {
                                    let old_export_dir = self.app_settings.export_dir();
                                    self.app_settings = self.prefs_edit.clone();
                                    let new_export_dir = self.app_settings.export_dir();
                                    if old_export_dir != new_export_dir {
                                        // A stale default would keep landing exports in the old dir
                                        let refresh = self.export_path.is_empty()
                                            || Path::new(&self.export_path)
                                                .starts_with(&old_export_dir);
                                        if refresh {
                                            let ext =
                                                if self.export_is_json { "json" } else { "csv" };
                                            let mut base = new_export_dir;
                                            base.push(format!(
                                                "flow_export_{}.{}",
                                                export_stamp(),
                                                ext
                                            ));
                                            self.export_path = base.display().to_string();
                                        }
                                    }
                                    self.last_save_info = Some("Preferences saved".into());
                                    self.show_prefs_window = false;
                                }
                                Err(e) => {
                                    warn!("saving preferences failed: {}", e);
                                    self.prefs_status =
                                        Some(format!("Failed to save preferences: {}", e));
                                }
                            }
                        }
                        if ui.button("Cancel").clicked() {
                            self.show_prefs_window = false;
                        }
                    });
                });
            if !open {
                self.show_prefs_window = false;
            }
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if let Err(e) = persist::save_active(&self.session_file()) {
            error!("session save on exit failed: {}", e);
        }
    }
}

fn neighbor_section(
    ui: &mut egui::Ui,
    title: &str,
    rows: &[NeighborRow],
    jump: &mut Option<String>,
    hover: &mut Option<String>,
) {
    egui::CollapsingHeader::new(format!("{} ({})", title, rows.len()))
        .default_open(true)
        .show(ui, |ui| {
            if rows.is_empty() {
                ui.small("none");
            }
            for row in rows {
                let text = format!(
                    "[{}] {} ({})",
                    row.entity_type,
                    truncate_label(&row.name, 24),
                    row.relationship_type
                );
                let resp = ui.selectable_label(false, text);
                if resp.hovered() {
                    *hover = Some(row.id.clone());
                }
                if resp.clicked() {
                    *jump = Some(row.id.clone());
                }
            }
        });
}

fn truncate_label(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let prefix: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{}\u{2026}", prefix)
}
