use std::path::{Path, PathBuf};
use thiserror::Error;

/// Settings carried between runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppPrefs {
    pub segments: u32,
    pub fractal_depth: u32,
    pub show_fps: bool,
    pub show_info: bool,
}

impl Default for AppPrefs {
    fn default() -> Self {
        Self {
            segments: 6,
            fractal_depth: 5,
            show_fps: true,
            show_info: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrefsError {
    #[error("I/O error: {0}")]
    Io(String),
    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },
}

impl AppPrefs {
    pub fn load(path: Option<&Path>) -> Result<Self, PrefsError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let text = match std::fs::read_to_string(path) {
            Ok(v) => v,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => return Err(PrefsError::Io(err.to_string())),
        };

        let mut prefs = Self::default();
        for (line_idx, raw) in text.lines().enumerate() {
            let line = line_idx + 1;
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let Some((key, value)) = trimmed.split_once('=') else {
                return Err(PrefsError::Parse {
                    line,
                    message: "expected <key>=<value>".to_string(),
                });
            };
            let value = value.trim();
            let bad = |what: &str| PrefsError::Parse {
                line,
                message: format!("{} must be {what}", key.trim()),
            };
            match key.trim() {
                "segments" => {
                    prefs.segments = value
                        .parse::<u32>()
                        .ok()
                        .filter(|v| (1..=9).contains(v))
                        .ok_or_else(|| bad("an integer in 1..=9"))?;
                }
                "fractal_depth" => {
                    prefs.fractal_depth = value
                        .parse::<u32>()
                        .ok()
                        .filter(|v| (1..=7).contains(v))
                        .ok_or_else(|| bad("an integer in 1..=7"))?;
                }
                "show_fps" => prefs.show_fps = parse_bool(value).ok_or_else(|| bad("true/false"))?,
                "show_info" => prefs.show_info = parse_bool(value).ok_or_else(|| bad("true/false"))?,
                // Unknown keys are left for newer versions.
                _ => {}
            }
        }
        Ok(prefs)
    }

    pub fn save(&self, path: Option<&Path>) -> Result<(), PrefsError> {
        let Some(path) = path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| PrefsError::Io(e.to_string()))?;
        }
        let body = format!(
            "# chaos_viewer prefs v1\nsegments={}\nfractal_depth={}\nshow_fps={}\nshow_info={}\n",
            self.segments, self.fractal_depth, self.show_fps, self.show_info
        );
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, &body).map_err(|e| PrefsError::Io(e.to_string()))?;
        std::fs::rename(&tmp, path).map_err(|e| PrefsError::Io(e.to_string()))
    }
}

pub fn prefs_storage_path() -> Option<PathBuf> {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        if !xdg.trim().is_empty() {
            return Some(PathBuf::from(xdg).join("chaos_viewer").join("prefs.txt"));
        }
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("chaos_viewer")
            .join("prefs.txt"),
    )
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
