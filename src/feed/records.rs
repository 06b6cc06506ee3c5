use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::graph::model::{GENERIC_LABEL, PropertyMap};

// Wire shape of a flow graph snapshot as the collection backend emits it.
// Every field defaults when absent and unknown fields are ignored, so the
// viewer tolerates schema drift on either side.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GraphViewResult {
    pub group_id: String,
    pub row_count: usize,
    pub records: Vec<EdgeRecord>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EdgeRecord {
    pub source: EntityRef,
    pub relationship_type: String,
    pub target: EntityRef,
}

// One endpoint descriptor: a label set (one semantic type plus generic
// markers) and free-form properties, of which only `name` matters here
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityRef {
    pub labels: Vec<String>,
    pub properties: PropertyMap,
}

impl EntityRef {
    pub fn new(entity_type: &str, name: &str) -> Self {
        let mut properties = PropertyMap::new();
        properties.insert("name".to_string(), Value::String(name.to_string()));
        Self {
            labels: vec![entity_type.to_string(), GENERIC_LABEL.to_string()],
            properties,
        }
    }

    pub fn with_property(mut self, key: &str, value: Value) -> Self {
        self.properties.insert(key.to_string(), value);
        self
    }
}

impl EdgeRecord {
    pub fn new(source: EntityRef, relationship_type: &str, target: EntityRef) -> Self {
        Self {
            source,
            relationship_type: relationship_type.to_string(),
            target,
        }
    }
}

// Accepts the full envelope or a bare array of edge records
pub fn parse_snapshot(text: &str) -> Result<GraphViewResult> {
    if text.trim_start().starts_with('[') {
        let records: Vec<EdgeRecord> =
            serde_json::from_str(text).context("parsing edge record array")?;
        return Ok(GraphViewResult {
            group_id: String::new(),
            row_count: records.len(),
            records,
        });
    }
    serde_json::from_str(text).context("parsing graph view snapshot")
}

pub fn load_snapshot(path: &Path) -> Result<GraphViewResult> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading snapshot {}", path.display()))?;
    let snapshot = parse_snapshot(&text)
        .with_context(|| format!("snapshot {}", path.display()))?;
    info!(
        "loaded snapshot {} ({} records)",
        path.display(),
        snapshot.records.len()
    );
    Ok(snapshot)
}

// Small built-in engagement graph so a fresh start has something to show.
// Shared services fan in from several ports on purpose.
pub fn demo_snapshot() -> GraphViewResult {
    let host = |name: &str| EntityRef::new("Host", name);
    let port = |name: &str| EntityRef::new("Port", name).with_property("protocol", json!("tcp"));
    let service = |name: &str| EntityRef::new("Service", name);
    let vuln = |name: &str| EntityRef::new("Vulnerability", name);
    let access = |name: &str| EntityRef::new("Access", name);
    let credential = |name: &str| EntityRef::new("Credential", name);
    let account = |name: &str| EntityRef::new("Account", name);

    let records = vec![
        EdgeRecord::new(host("10.0.12.4"), "HAS_PORT", port("10.0.12.4:22")),
        EdgeRecord::new(host("10.0.12.4"), "HAS_PORT", port("10.0.12.4:80")),
        EdgeRecord::new(host("10.0.12.7"), "HAS_PORT", port("10.0.12.7:80")),
        EdgeRecord::new(host("10.0.12.7"), "HAS_PORT", port("10.0.12.7:445")),
        EdgeRecord::new(host("gateway.lab"), "HAS_PORT", port("gateway.lab:443")),
        EdgeRecord::new(port("10.0.12.4:22"), "RUNS", service("openssh-8.9")),
        EdgeRecord::new(port("10.0.12.4:80"), "RUNS", service("nginx-1.18")),
        EdgeRecord::new(port("10.0.12.7:80"), "RUNS", service("nginx-1.18")),
        EdgeRecord::new(port("10.0.12.7:445"), "RUNS", service("smbd-4.15")),
        EdgeRecord::new(port("gateway.lab:443"), "RUNS", service("nginx-1.18")),
        EdgeRecord::new(
            service("smbd-4.15"),
            "AFFECTED_BY",
            vuln("CVE-2021-44142").with_property(
                "summary",
                json!("Samba vfs_fruit out-of-bounds RCE"),
            ),
        ),
        EdgeRecord::new(
            service("openssh-8.9"),
            "AFFECTED_BY",
            vuln("CVE-2023-38408").with_property(
                "summary",
                json!("OpenSSH forwarded agent RCE"),
            ),
        ),
        EdgeRecord::new(vuln("CVE-2021-44142"), "YIELDS", access("shell@10.0.12.7")),
        EdgeRecord::new(
            access("shell@10.0.12.7"),
            "EXPOSES",
            credential("svc-backup (NTLM)"),
        ),
        EdgeRecord::new(
            credential("svc-backup (NTLM)"),
            "GRANTS",
            account("LAB\\svc-backup"),
        ),
    ];

    GraphViewResult {
        group_id: "demo".to_string(),
        row_count: records.len(),
        records,
    }
}
