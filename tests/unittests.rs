use chainview::feed::records::{self, EdgeRecord, EntityRef};
use chainview::graph::ingest::build_graph;
use chainview::graph::layout::{HORIZONTAL_SPACING, LayoutConfig, layout_graph};
use chainview::graph::model::{GraphLink, node_id};
use chainview::gui::frontend::{export_nodes_csv, export_snapshot_json};
use chainview::persistence::persist::{self, SessionFile};
use chainview::persistence::settings::AppSettings;
use chainview::view::scene::{GraphScene, Highlight};
use chainview::view::transform::{MAX_ZOOM, MIN_ZOOM, ViewTransform, fit_transform};
use serde_json::json;

fn edge(src_ty: &str, src: &str, rel: &str, dst_ty: &str, dst: &str) -> EdgeRecord {
    EdgeRecord::new(EntityRef::new(src_ty, src), rel, EntityRef::new(dst_ty, dst))
}

// The smallest interesting chain: one host, one port, one service
fn chain() -> Vec<EdgeRecord> {
    vec![
        edge("Host", "10.0.0.1", "HAS_PORT", "Port", "22"),
        edge("Port", "22", "RUNS", "Service", "ssh"),
    ]
}

fn scene_with(records: &[EdgeRecord]) -> GraphScene {
    let mut scene = GraphScene::default();
    scene.set_snapshot(records);
    scene.set_viewport(1200.0, 800.0);
    scene
}

fn node_screen_pos(scene: &GraphScene, id: &str) -> (f32, f32) {
    let node = scene.graph().node_by_id(id).expect("node should exist");
    scene.transform().to_screen(node.x, node.y)
}

#[test]
fn ingest_dedups_nodes_and_keeps_first_seen_fields() {
    let mut records = chain();
    // Same port mentioned again with a richer descriptor; must not override
    records.push(EdgeRecord::new(
        EntityRef::new("Host", "10.0.0.1"),
        "HAS_PORT",
        EntityRef::new("Port", "22").with_property("summary", json!("late summary")),
    ));

    let data = build_graph(&records);
    assert_eq!(data.nodes.len(), 3);
    let port = data
        .nodes
        .iter()
        .find(|n| n.id == node_id("Port", "22"))
        .unwrap();
    assert_eq!(port.summary, None, "first descriptor had no summary");
    // Insertion order follows first appearance
    let ids: Vec<&str> = data.nodes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, ["Host:10.0.0.1", "Port:22", "Service:ssh"]);
}

#[test]
fn ingest_duplicate_pair_keeps_first_relation() {
    let records = vec![
        edge("Host", "a", "HAS_PORT", "Port", "80"),
        edge("Host", "a", "EXPOSES", "Port", "80"),
        // Opposite direction is a distinct link
        edge("Port", "80", "BELONGS_TO", "Host", "a"),
    ];
    let data = build_graph(&records);
    assert_eq!(data.links.len(), 2);
    assert_eq!(data.links[0].relationship_type, "HAS_PORT");
    assert_eq!(data.links[1].relationship_type, "BELONGS_TO");
}

#[test]
fn ingest_same_records_twice_builds_identical_model() {
    let records = chain();
    let doubled: Vec<EdgeRecord> = records.iter().chain(records.iter()).cloned().collect();
    assert_eq!(build_graph(&records), build_graph(&doubled));
}

#[test]
fn ingest_missing_or_blank_name_falls_back() {
    let nameless = EntityRef {
        labels: vec!["Host".into(), "Entity".into()],
        properties: Default::default(),
    };
    let blank = EntityRef::new("Service", "   ");
    let data = build_graph(&[EdgeRecord::new(nameless, "RUNS", blank)]);
    assert_eq!(data.nodes[0].id, "Host:unnamed");
    assert_eq!(data.nodes[1].id, "Service:unnamed");
    assert_eq!(data.nodes[1].name, "unnamed");
}

#[test]
fn ingest_numeric_name_renders_as_text() {
    let mut port = EntityRef {
        labels: vec!["Port".into()],
        properties: Default::default(),
    };
    port.properties.insert("name".into(), json!(443));
    let data = build_graph(&[EdgeRecord::new(
        EntityRef::new("Host", "h"),
        "HAS_PORT",
        port,
    )]);
    assert_eq!(data.nodes[1].id, "Port:443");
    assert_eq!(data.nodes[1].name, "443");
}

#[test]
fn ingest_entity_type_skips_generic_marker() {
    let generic_first = EntityRef {
        labels: vec!["Entity".into(), "Credential".into()],
        properties: [("name".to_string(), json!("c"))].into_iter().collect(),
    };
    let only_generic = EntityRef {
        labels: vec!["Entity".into()],
        properties: [("name".to_string(), json!("x"))].into_iter().collect(),
    };
    let data = build_graph(&[EdgeRecord::new(generic_first, "X", only_generic)]);
    assert_eq!(data.nodes[0].entity_type, "Credential");
    assert_eq!(data.nodes[1].entity_type, "Entity");
}

#[test]
fn layout_chain_marches_left_to_right() {
    let data = build_graph(&chain());
    let placed = layout_graph(&data, &LayoutConfig::default());
    assert_eq!(placed.nodes.len(), 3);
    assert_eq!(placed.links.len(), 2);

    let x_of = |id: &str| placed.node_by_id(id).unwrap().x;
    assert_eq!(x_of("Host:10.0.0.1"), 0.0);
    assert_eq!(x_of("Port:22"), HORIZONTAL_SPACING);
    assert_eq!(x_of("Service:ssh"), 2.0 * HORIZONTAL_SPACING);
    // Single-node columns sit on the vertical center line
    assert!(placed.nodes.iter().all(|n| n.y == 0.0));
}

#[test]
fn layout_compacts_unoccupied_levels() {
    let records = vec![
        edge("Recon", "r", "LEADS_TO", "Foothold", "f"),
        edge("Foothold", "f", "LEADS_TO", "Loot", "l"),
    ];
    let mut config = LayoutConfig::default();
    config.levels.insert("Recon".into(), 0);
    config.levels.insert("Foothold".into(), 5);
    config.levels.insert("Loot".into(), 9);

    let placed = layout_graph(&build_graph(&records), &config);
    let x_of = |id: &str| placed.node_by_id(id).unwrap().x;
    // Levels 0, 5, 9 collapse into three adjacent columns
    assert_eq!(x_of("Recon:r"), 0.0);
    assert_eq!(x_of("Foothold:f"), HORIZONTAL_SPACING);
    assert_eq!(x_of("Loot:l"), 2.0 * HORIZONTAL_SPACING);
}

#[test]
fn layout_unknown_type_lands_past_the_chain() {
    let records = vec![
        edge("Host", "h", "HAS_PORT", "Port", "22"),
        edge("Port", "22", "TAGGED", "Widget", "w"),
    ];
    let placed = layout_graph(&build_graph(&records), &LayoutConfig::default());
    let x_of = |id: &str| placed.node_by_id(id).unwrap().x;
    // Occupied levels are 0, 1 and the default overflow level
    assert_eq!(x_of("Widget:w"), 2.0 * HORIZONTAL_SPACING);
}

#[test]
fn layout_orders_rows_by_placed_neighbors() {
    // Hosts place first: a at -45, b at +45. Ports arrive in the opposite
    // order, so barycenter sorting must flip them back under their hosts.
    let records = vec![
        edge("Host", "a", "PEERS", "Host", "b"),
        edge("Host", "b", "HAS_PORT", "Port", "b:80"),
        edge("Host", "a", "HAS_PORT", "Port", "a:80"),
    ];
    let placed = layout_graph(&build_graph(&records), &LayoutConfig::default());
    let y_of = |id: &str| placed.node_by_id(id).unwrap().y;
    assert_eq!(y_of("Port:a:80"), y_of("Host:a"));
    assert_eq!(y_of("Port:b:80"), y_of("Host:b"));
    assert!(y_of("Host:a") < y_of("Host:b"));
}

#[test]
fn layout_equal_barycenters_keep_ingest_order() {
    // Both ports hang off the same host, so their barycenters tie exactly;
    // the sort must leave the first-ingested port on the upper row
    let records = vec![
        edge("Host", "h", "HAS_PORT", "Port", "22"),
        edge("Host", "h", "HAS_PORT", "Port", "80"),
    ];
    let placed = layout_graph(&build_graph(&records), &LayoutConfig::default());
    let y_of = |id: &str| placed.node_by_id(id).unwrap().y;
    assert!(y_of("Port:22") < y_of("Port:80"));
}

#[test]
fn layout_drops_links_with_unknown_endpoints() {
    let mut data = build_graph(&chain());
    data.links.push(GraphLink {
        source: "Host:10.0.0.1".into(),
        target: "Ghost:nobody".into(),
        relationship_type: "HAUNTS".into(),
    });
    let placed = layout_graph(&data, &LayoutConfig::default());
    assert_eq!(placed.links.len(), 2);
}

#[test]
fn layout_is_bit_identical_across_runs() {
    let records = records::demo_snapshot().records;
    let data = build_graph(&records);
    let config = LayoutConfig::default();
    let a = layout_graph(&data, &config);
    let b = layout_graph(&data, &config);
    for (na, nb) in a.nodes.iter().zip(b.nodes.iter()) {
        assert_eq!(na.x, nb.x);
        assert_eq!(na.y, nb.y);
    }
}

#[test]
fn transform_zoom_clamps_to_bounds() {
    let mut t = ViewTransform::IDENTITY;
    t = t.zoom_at(0.0, 0.0, 1000.0);
    assert_eq!(t.scale, MAX_ZOOM);
    t = t.zoom_at(0.0, 0.0, 1e-6);
    assert_eq!(t.scale, MIN_ZOOM);
}

#[test]
fn transform_zoom_keeps_anchor_fixed() {
    let t = ViewTransform {
        scale: 0.8,
        x: 120.0,
        y: -40.0,
    };
    let anchor = (300.0, 200.0);
    let before = t.to_layout(anchor.0, anchor.1);
    let zoomed = t.zoom_at(anchor.0, anchor.1, 1.5);
    let after = zoomed.to_screen(before.0, before.1);
    assert!((after.0 - anchor.0).abs() < 1e-3);
    assert!((after.1 - anchor.1).abs() < 1e-3);
}

#[test]
fn transform_zoom_inverse_factor_restores() {
    let t = ViewTransform {
        scale: 0.8,
        x: 120.0,
        y: -40.0,
    };
    // 0.8 * 1.5 stays inside the clamp range, so the inverse undoes it
    let back = t.zoom_at(300.0, 200.0, 1.5).zoom_at(300.0, 200.0, 1.0 / 1.5);
    assert!((back.scale - t.scale).abs() < 1e-4);
    assert!((back.x - t.x).abs() < 1e-3);
    assert!((back.y - t.y).abs() < 1e-3);
}

#[test]
fn transform_fit_of_empty_graph_is_identity() {
    assert_eq!(fit_transform(&[], 1200.0, 800.0), ViewTransform::IDENTITY);
}

#[test]
fn transform_fit_centers_single_node_without_upscaling() {
    let data = build_graph(&[edge("Host", "only", "SELF", "Host", "only")]);
    let placed = layout_graph(&data, &LayoutConfig::default());
    let t = fit_transform(&placed.nodes, 1200.0, 800.0);
    assert_eq!(t.scale, 1.0, "fit never magnifies past 1:1");
    let (sx, sy) = t.to_screen(placed.nodes[0].x, placed.nodes[0].y);
    assert!((sx - 600.0).abs() < 1e-3);
    assert!((sy - 400.0).abs() < 1e-3);
}

#[test]
fn scene_click_toggles_selection() {
    let mut scene = scene_with(&chain());
    let (sx, sy) = node_screen_pos(&scene, "Port:22");

    scene.pointer_down(sx, sy);
    scene.pointer_up(sx, sy);
    assert_eq!(scene.selection(), Some("Port:22"));

    // Clicking the same node again deselects
    scene.pointer_down(sx, sy);
    scene.pointer_up(sx, sy);
    assert_eq!(scene.selection(), None);
}

#[test]
fn scene_click_survives_small_jitter() {
    let mut scene = scene_with(&chain());
    let (sx, sy) = node_screen_pos(&scene, "Port:22");

    scene.pointer_down(sx, sy);
    scene.pointer_move(sx + 2.0, sy + 1.0);
    scene.pointer_up(sx + 2.0, sy + 1.0);
    assert_eq!(scene.selection(), Some("Port:22"));
    assert!(scene.is_fitted(), "a click must not disturb the view");
}

#[test]
fn scene_drag_pans_with_accumulated_delta() {
    let mut scene = scene_with(&chain());
    let fit = scene.transform();
    let (sx, sy) = node_screen_pos(&scene, "Port:22");

    scene.pointer_down(sx, sy);
    scene.pointer_move(sx + 12.0, sy);
    assert!(!scene.is_fitted());
    // The whole 12 px applies at the threshold crossing, nothing is lost
    assert!((scene.transform().x - fit.x - 12.0).abs() < 1e-3);

    scene.pointer_move(sx + 20.0, sy);
    assert!((scene.transform().x - fit.x - 20.0).abs() < 1e-3);

    // Release after a pan is not a click even though it started on a node
    scene.pointer_up(sx + 20.0, sy);
    assert_eq!(scene.selection(), None);
}

#[test]
fn scene_click_on_empty_space_clears_selection() {
    let mut scene = scene_with(&chain());
    scene.select_node("Service:ssh");
    assert_eq!(scene.selection(), Some("Service:ssh"));

    scene.pointer_down(5.0, 5.0);
    scene.pointer_up(5.0, 5.0);
    assert_eq!(scene.selection(), None);
}

#[test]
fn scene_hover_midway_between_cards_picks_the_link() {
    let mut scene = scene_with(&chain());
    let (hx, hy) = node_screen_pos(&scene, "Host:10.0.0.1");
    let (px, _) = node_screen_pos(&scene, "Port:22");
    let mid = ((hx + px) / 2.0, hy);

    scene.pointer_move(mid.0, mid.1);
    assert_eq!(scene.highlight(), Some(&Highlight::Link(0)));
    assert!(scene.link_highlighted(0));
    // Endpoint cards light up with their link
    let host = scene.graph().index_of("Host:10.0.0.1").unwrap();
    let port = scene.graph().index_of("Port:22").unwrap();
    assert!(scene.node_highlighted(host));
    assert!(scene.node_highlighted(port));

    // A link click clears selection instead of toggling anything
    scene.select_node("Service:ssh");
    scene.pointer_down(mid.0, mid.1);
    scene.pointer_up(mid.0, mid.1);
    assert_eq!(scene.selection(), None);
}

#[test]
fn scene_highlight_slot_takes_last_event() {
    let mut scene = scene_with(&chain());
    scene.hover_node("Service:ssh");
    assert_eq!(
        scene.highlight(),
        Some(&Highlight::Node("Service:ssh".to_string()))
    );
    scene.hover_link(1);
    assert_eq!(scene.highlight(), Some(&Highlight::Link(1)));
    // The highlighted link spills onto both endpoints
    let port = scene.graph().index_of("Port:22").unwrap();
    let service = scene.graph().index_of("Service:ssh").unwrap();
    assert!(scene.node_highlighted(port));
    assert!(scene.node_highlighted(service));
    scene.clear_hover();
    assert_eq!(scene.highlight(), None);
}

#[test]
fn scene_neighbor_lists_follow_link_order() {
    let mut scene = scene_with(&records::demo_snapshot().records);
    scene.select_node("Service:nginx-1.18");
    let (node, lists) = scene.selection_neighbors().expect("selection set");
    assert_eq!(node.name, "nginx-1.18");
    let incoming: Vec<&str> = lists.incoming.iter().map(|e| e.node.name.as_str()).collect();
    assert_eq!(
        incoming,
        ["10.0.12.4:80", "10.0.12.7:80", "gateway.lab:443"],
        "fan-in keeps snapshot record order"
    );
    assert!(lists.outgoing.is_empty());
}

#[test]
fn scene_hiding_a_type_hides_nodes_links_and_picking() {
    let mut scene = scene_with(&chain());
    scene.set_type_visible("Port", false);

    let visible: Vec<&str> = scene
        .visible_nodes()
        .map(|(_, n)| n.entity_type.as_str())
        .collect();
    assert_eq!(visible, ["Host", "Service"]);
    // Every link in the chain touches the hidden port
    assert_eq!(scene.visible_links().count(), 0);

    let (sx, sy) = node_screen_pos(&scene, "Port:22");
    scene.pointer_down(sx, sy);
    scene.pointer_up(sx, sy);
    assert_eq!(scene.selection(), None, "hidden cards are not clickable");

    // Wholesale replacement brings everything back
    scene.set_visible_types(["Host", "Port", "Service"].map(String::from));
    assert_eq!(scene.visible_nodes().count(), 3);
    assert_eq!(scene.visible_links().count(), 2);
}

#[test]
fn scene_new_snapshot_keeps_view_and_valid_selection() {
    let mut scene = scene_with(&chain());
    scene.select_node("Port:22");
    scene.zoom_in();
    let zoomed = scene.transform();

    let mut more = chain();
    more.push(edge("Service", "ssh", "AFFECTED_BY", "Vulnerability", "CVE-0"));
    scene.set_snapshot(&more);
    assert_eq!(scene.selection(), Some("Port:22"));
    assert_eq!(scene.transform(), zoomed, "override survives new data");

    // Snapshot without the selected node drops the selection
    scene.set_snapshot(&[edge("Host", "10.0.0.1", "RUNS", "Service", "ssh")]);
    assert_eq!(scene.selection(), None);
}

#[test]
fn scene_new_types_default_visible_without_reviving_hidden_ones() {
    let mut scene = scene_with(&chain());
    scene.set_type_visible("Port", false);

    let mut more = chain();
    more.push(edge("Service", "ssh", "EXPOSES", "Credential", "root-key"));
    scene.set_snapshot(&more);
    assert!(scene.is_type_visible("Credential"));
    assert!(!scene.is_type_visible("Port"));
}

#[test]
fn scene_resize_refits_only_when_following_the_fit() {
    let mut scene = scene_with(&chain());
    let before = scene.transform();
    scene.set_viewport(900.0, 500.0);
    assert_ne!(scene.transform(), before, "fitted view tracks the viewport");

    scene.zoom_in();
    let zoomed = scene.transform();
    scene.set_viewport(1400.0, 900.0);
    assert_eq!(scene.transform(), zoomed, "manual view ignores resizes");

    scene.fit_to_view();
    assert!(scene.is_fitted());
}

#[test]
fn scene_wheel_zooms_about_the_pointer() {
    let mut scene = scene_with(&chain());
    let before = scene.transform();
    let anchor = (250.0, 330.0);
    let layout_pt = before.to_layout(anchor.0, anchor.1);

    scene.wheel(anchor.0, anchor.1, 120.0);
    let after = scene.transform();
    assert!(after.scale > before.scale);
    let back = after.to_screen(layout_pt.0, layout_pt.1);
    assert!((back.0 - anchor.0).abs() < 1e-3);
    assert!((back.1 - anchor.1).abs() < 1e-3);

    // A zero-delta wheel event must not start an override
    let mut untouched = scene_with(&chain());
    untouched.wheel(10.0, 10.0, 0.0);
    assert!(untouched.is_fitted());
}

#[test]
fn scene_zoom_buttons_saturate_at_the_bounds() {
    let mut scene = scene_with(&chain());
    for _ in 0..40 {
        scene.zoom_in();
    }
    assert_eq!(scene.transform().scale, MAX_ZOOM);
    for _ in 0..80 {
        scene.zoom_out();
    }
    assert_eq!(scene.transform().scale, MIN_ZOOM);
}

#[test]
fn scene_degenerate_viewport_stays_finite() {
    let mut scene = scene_with(&chain());
    scene.set_viewport(0.0, 0.0);
    assert_eq!(scene.viewport(), (1.0, 1.0), "dimensions clamp up");
    let t = scene.transform();
    assert!(t.scale.is_finite() && t.x.is_finite() && t.y.is_finite());

    scene.wheel(0.0, 0.0, 50.0);
    let t = scene.transform();
    assert!(t.scale.is_finite() && t.x.is_finite() && t.y.is_finite());
}

#[test]
fn scene_restore_drops_garbage_state() {
    let mut scene = scene_with(&chain());
    let mut state = scene.state().clone();
    state.transform = Some(ViewTransform {
        scale: f32::NAN,
        x: 0.0,
        y: 0.0,
    });
    state.selection = Some("Ghost:nobody".into());
    state.highlight = Some(Highlight::Link(99));
    scene.restore_state(state);

    assert_eq!(scene.transform(), ViewTransform::IDENTITY);
    assert_eq!(scene.selection(), None);
    assert_eq!(scene.highlight(), None);
}

#[test]
fn feed_parses_bare_array_and_envelope() {
    let bare = r#"[
        {"source": {"labels": ["Host", "Entity"], "properties": {"name": "h"}},
         "relationshipType": "HAS_PORT",
         "target": {"labels": ["Port", "Entity"], "properties": {"name": 22}}}
    ]"#;
    let snapshot = records::parse_snapshot(bare).expect("bare array parses");
    assert_eq!(snapshot.group_id, "");
    assert_eq!(snapshot.row_count, 1);
    assert_eq!(snapshot.records[0].relationship_type, "HAS_PORT");

    let envelope = r#"{
        "groupId": "eng-42",
        "rowCount": 1,
        "unknownField": true,
        "records": [
            {"source": {"labels": ["Host"], "properties": {"name": "h"}},
             "relationshipType": "HAS_PORT",
             "target": {"labels": ["Port"], "properties": {}}}
        ]
    }"#;
    let snapshot = records::parse_snapshot(envelope).expect("envelope parses");
    assert_eq!(snapshot.group_id, "eng-42");
    // The nameless target still ingests, under the fallback name
    let data = build_graph(&snapshot.records);
    assert_eq!(data.nodes[1].id, "Port:unnamed");
}

#[test]
fn feed_demo_snapshot_builds_the_full_chain() {
    let demo = records::demo_snapshot();
    assert_eq!(demo.row_count, demo.records.len());
    let placed = layout_graph(&build_graph(&demo.records), &LayoutConfig::default());
    assert_eq!(placed.nodes.len(), 16);
    assert_eq!(placed.links.len(), 15);
    // Credential and Account share a level, so they share a column
    let x_of = |id: &str| placed.node_by_id(id).unwrap().x;
    assert_eq!(
        x_of("Credential:svc-backup (NTLM)"),
        x_of("Account:LAB\\svc-backup")
    );
}

#[test]
fn session_file_roundtrips_through_ron() {
    let mut scene = scene_with(&records::demo_snapshot().records);
    scene.select_node("Service:smbd-4.15");
    scene.zoom_in();
    scene.set_type_visible("Port", false);

    let session = SessionFile {
        snapshot: records::demo_snapshot(),
        view: scene.state().clone(),
    };
    let text = ron::ser::to_string(&session).expect("serializes");
    let parsed: SessionFile = ron::from_str(&text).expect("parses back");
    assert_eq!(parsed.snapshot, session.snapshot);
    assert_eq!(parsed.view, session.view);
}

#[test]
fn session_files_roundtrip_on_disk() {
    let dir = std::env::temp_dir().join(format!("chainview_test_sessions_{}", std::process::id()));
    let settings = AppSettings {
        session_override: Some(dir.clone()),
        ..AppSettings::default()
    };
    persist::set_settings_override(settings);

    let scene = scene_with(&records::demo_snapshot().records);
    let session = SessionFile {
        snapshot: records::demo_snapshot(),
        view: scene.state().clone(),
    };

    let active = persist::save_active(&session).expect("save succeeds");
    assert!(active.starts_with(&dir));
    let loaded = persist::load_active()
        .expect("load succeeds")
        .expect("session present");
    assert_eq!(loaded.snapshot, session.snapshot);
    assert_eq!(loaded.view, session.view);

    let versioned = persist::save_versioned(&session).expect("versioned save succeeds");
    let listed = persist::list_versions().expect("listing succeeds");
    assert!(listed.contains(&versioned));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn export_csv_keeps_semantic_levels() {
    // An unknown type shares column 1 with nothing, but its level is the
    // overflow level, not the compacted column index
    let mut scene = GraphScene::default();
    scene.set_snapshot(&[edge("Host", "h", "TAGGED", "Widget", "w")]);

    let dir = std::env::temp_dir().join(format!("chainview_test_csv_{}", std::process::id()));
    let path = dir.join("nodes.csv");
    export_nodes_csv(&scene, &path).expect("export succeeds");
    let text = std::fs::read_to_string(&path).expect("file readable");
    let _ = std::fs::remove_dir_all(&dir);

    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines,
        [
            "id,entity_type,name,level,column_x,row_y,summary",
            "Host:h,Host,h,0,0,0,",
            "Widget:w,Widget,w,6,240,0,",
        ]
    );
}

#[test]
fn export_json_reparses_as_the_same_snapshot() {
    let snapshot = records::demo_snapshot();
    let dir = std::env::temp_dir().join(format!("chainview_test_json_{}", std::process::id()));
    let path = dir.join("snapshot.json");
    export_snapshot_json(&snapshot, &path).expect("export succeeds");
    let text = std::fs::read_to_string(&path).expect("file readable");
    let _ = std::fs::remove_dir_all(&dir);

    assert!(text.ends_with('\n'));
    let parsed = records::parse_snapshot(&text).expect("parses back");
    assert_eq!(parsed, snapshot);
}
