use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// User preferences for the review panel, persisted between runs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Preferences {
    /// Show score deltas instead of win-rate deltas where available.
    pub use_score: bool,
    /// Maximum ghost-stone plies shown for a matched AI line. Ten or more
    /// means unlimited.
    pub variation_move_count: usize,
    /// Whether the per-player summary table is expanded.
    pub show_table: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            use_score: false,
            variation_move_count: 10,
            show_table: false,
        }
    }
}

/// Get the path to the preferences file.
pub fn preferences_path() -> PathBuf {
    preferences_path_in(default_preferences_dir())
}

fn default_preferences_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".kibitz")
}

fn preferences_path_in(dir: PathBuf) -> PathBuf {
    dir.join("preferences.json")
}

/// Save preferences to disk.
pub fn save_preferences(prefs: &Preferences) -> Result<PathBuf, String> {
    save_preferences_to(prefs, default_preferences_dir())
}

fn save_preferences_to(prefs: &Preferences, dir: PathBuf) -> Result<PathBuf, String> {
    std::fs::create_dir_all(&dir).map_err(|e| format!("Failed to create directory: {}", e))?;

    let path = preferences_path_in(dir);
    let json = serde_json::to_string_pretty(prefs)
        .map_err(|e| format!("Failed to serialize preferences: {}", e))?;

    std::fs::write(&path, json).map_err(|e| format!("Failed to write preferences file: {}", e))?;

    Ok(path)
}

/// Load preferences from disk, falling back to defaults when absent.
pub fn load_preferences() -> Result<Preferences, String> {
    load_preferences_from(default_preferences_dir())
}

fn load_preferences_from(dir: PathBuf) -> Result<Preferences, String> {
    let path = preferences_path_in(dir);
    if !path.exists() {
        return Ok(Preferences::default());
    }

    let contents = std::fs::read_to_string(&path)
        .map_err(|e| format!("Failed to read preferences file: {}", e))?;

    serde_json::from_str(&contents).map_err(|e| format!("Failed to parse preferences file: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let prefs = Preferences {
            use_score: true,
            variation_move_count: 4,
            show_table: true,
        };

        let path = save_preferences_to(&prefs, dir.path().to_path_buf()).unwrap();
        assert!(path.exists());

        let loaded = load_preferences_from(dir.path().to_path_buf()).unwrap();
        assert_eq!(loaded, prefs);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_preferences_from(dir.path().to_path_buf()).unwrap();
        assert_eq!(loaded, Preferences::default());
        assert!(!loaded.use_score);
        assert_eq!(loaded.variation_move_count, 10);
    }
}
