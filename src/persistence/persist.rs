use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use log::info;
use ron::ser::PrettyConfig;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::macros::format_description;

use crate::feed::records::GraphViewResult;
use crate::view::scene::ViewState;

use super::settings::AppSettings;

// A session is the raw snapshot plus the view state; nodes, links and the
// layout are recomputed from the records on load
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionFile {
    pub snapshot: GraphViewResult,
    pub view: ViewState,
}

use std::sync::OnceLock;

static SETTINGS_OVERRIDE: OnceLock<AppSettings> = OnceLock::new();

pub fn set_settings_override(settings: AppSettings) {
    let _ = SETTINGS_OVERRIDE.set(settings);
}

fn session_dir() -> PathBuf {
    // If an override is set (e.g. from main.rs), use it.
    if let Some(settings) = SETTINGS_OVERRIDE.get() {
        return settings.session_dir();
    }
    // Load settings if present; else use defaults
    let settings = AppSettings::load().unwrap_or_default();
    settings.session_dir()
}

pub fn active_session_path() -> PathBuf {
    session_dir().join("session.ron")
}

pub fn versioned_session_path_now() -> PathBuf {
    let now = OffsetDateTime::now_utc();
    let fmt = format_description!("[year][month][day]_[hour][minute][second]");
    let stamp = now.format(fmt).unwrap_or_else(|_| "unknown".to_string());
    session_dir().join(format!("session_{}.ron", stamp))
}

fn ensure_session_dir() -> std::io::Result<()> {
    fs::create_dir_all(session_dir())
}

fn atomic_write(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let tmp_path = path.with_extension("ron.tmp");
    {
        let mut f = File::create(&tmp_path)?;
        f.write_all(data)?;
        f.flush()?;
    }
    fs::rename(tmp_path, path)?;
    Ok(())
}

fn to_ron(session: &SessionFile) -> anyhow::Result<String> {
    let pretty = PrettyConfig::new()
        .separate_tuple_members(true)
        .enumerate_arrays(true);
    Ok(ron::ser::to_string_pretty(session, pretty)?)
}

pub fn save_active(session: &SessionFile) -> anyhow::Result<PathBuf> {
    ensure_session_dir()?;
    let s = to_ron(session)?;
    let path = active_session_path();
    atomic_write(&path, s.as_bytes())?;
    info!("saved session {}", path.display());
    Ok(path)
}

pub fn save_versioned(session: &SessionFile) -> anyhow::Result<PathBuf> {
    ensure_session_dir()?;
    let s = to_ron(session)?;
    let path = versioned_session_path_now();
    atomic_write(&path, s.as_bytes())?;
    info!("saved session version {}", path.display());
    Ok(path)
}

pub fn load_active() -> anyhow::Result<Option<SessionFile>> {
    let path = active_session_path();
    if !path.exists() {
        return Ok(None);
    }
    load_from_path(&path).map(Some)
}

pub fn load_from_path(path: &Path) -> anyhow::Result<SessionFile> {
    let mut f = File::open(path)?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    let session: SessionFile = ron::from_str(&buf)?;
    info!("loaded session {}", path.display());
    Ok(session)
}

pub fn list_versions() -> anyhow::Result<Vec<PathBuf>> {
    let dir = session_dir();
    let mut entries: Vec<PathBuf> = Vec::new();
    if dir.exists() {
        for e in fs::read_dir(dir)? {
            let p = e?.path();
            if let Some(name) = p.file_name().and_then(|s| s.to_str())
                && name.starts_with("session_")
                && name.ends_with(".ron")
            {
                entries.push(p);
            }
        }
    }
    // sort descending by filename (timestamp)
    entries.sort();
    entries.reverse();
    Ok(entries)
}
