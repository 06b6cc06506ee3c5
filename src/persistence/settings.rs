use std::fs;
use std::io::{Read, Write};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    // If None, session files go to the OS state directory
    pub session_override: Option<PathBuf>,
    // If None, exports land under the OS temporary directory
    #[serde(default)]
    pub export_override: Option<PathBuf>,
    // Label level-of-detail, persisted between runs
    pub lod_enabled: bool,
    pub lod_label_min_zoom: f32,
    pub lod_hide_labels_node_threshold: usize,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            session_override: None,
            export_override: None,
            lod_enabled: true,
            lod_label_min_zoom: 0.7,
            lod_hide_labels_node_threshold: 200,
        }
    }
}

impl AppSettings {
    fn config_dir() -> PathBuf {
        // Cross-platform user config dir
        #[cfg(target_os = "macos")]
        {
            // ~/Library/Application Support/chainview
            let home = std::env::var_os("HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("~"));
            return home
                .join("Library")
                .join("Application Support")
                .join("chainview");
        }
        #[cfg(target_os = "windows")]
        {
            // %APPDATA%\chainview
            if let Ok(appdata) = std::env::var("APPDATA") {
                return PathBuf::from(appdata).join("chainview");
            }
            return PathBuf::from("chainview");
        }
        #[cfg(all(unix, not(target_os = "macos")))]
        {
            // $XDG_CONFIG_HOME/chainview or ~/.config/chainview
            if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
                return PathBuf::from(xdg).join("chainview");
            }
            let home = std::env::var_os("HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("~"));
            return home.join(".config").join("chainview");
        }
    }

    fn session_default_dir() -> PathBuf {
        // Cross-platform user-writable session dir
        #[cfg(target_os = "macos")]
        {
            let tmp = std::env::var_os("TMPDIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("/tmp"));
            return tmp.join("chainview");
        }
        #[cfg(target_os = "windows")]
        {
            // %LOCALAPPDATA%\chainview\Session else TEMP
            if let Ok(local) = std::env::var("LOCALAPPDATA") {
                return PathBuf::from(local).join("chainview").join("Session");
            }
            if let Ok(temp) = std::env::var("TEMP") {
                return PathBuf::from(temp).join("chainview");
            }
            return PathBuf::from("chainview");
        }
        #[cfg(all(unix, not(target_os = "macos")))]
        {
            // $XDG_STATE_HOME/chainview or ~/.local/state/chainview, else /tmp
            if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
                return PathBuf::from(xdg).join("chainview");
            }
            if let Ok(home) = std::env::var("HOME") {
                return PathBuf::from(home).join(".local").join("state").join("chainview");
            }
            return PathBuf::from("/tmp").join("chainview");
        }
    }

    pub fn load() -> anyhow::Result<Self> {
        let path = Self::config_dir().join("settings.json");
        if path.exists() {
            let mut f = std::fs::File::open(path)?;
            let mut s = String::new();
            f.read_to_string(&mut s)?;
            let v: Self = serde_json::from_str(&s)?;
            return Ok(v);
        }
        Ok(Self::default())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let dir = Self::config_dir();
        fs::create_dir_all(&dir)?;
        let path = dir.join("settings.json");
        let s = serde_json::to_string_pretty(self)?;
        let mut f = std::fs::File::create(path)?;
        f.write_all(s.as_bytes())?;
        Ok(())
    }

    pub fn session_dir(&self) -> PathBuf {
        if let Some(p) = &self.session_override {
            return p.clone();
        }
        Self::session_default_dir()
    }

    /// Directory where the settings file itself lives; per-user, OS-specific.
    pub fn settings_dir() -> PathBuf {
        Self::config_dir()
    }

    // Default export directory when no override is set: {temp_dir}/chainview/exports
    pub fn export_default_dir() -> PathBuf {
        let mut p = std::env::temp_dir();
        p.push("chainview");
        p.push("exports");
        p
    }

    pub fn export_dir(&self) -> PathBuf {
        if let Some(p) = &self.export_override {
            return p.clone();
        }
        Self::export_default_dir()
    }
}
