use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Embedded default configuration.
const DEFAULT_CONFIG: &str = include_str!("../config.default.toml");

// ── Final (merged) config types ──

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub oracle: OracleConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct StoreConfig {
    /// Location of the gadget collection; `~` is expanded.
    #[serde(default)]
    pub path: String,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct OracleConfig {
    /// Shell-quoted command line printing one known command per line.
    /// Empty disables probing.
    #[serde(default)]
    pub probe: String,
    /// Words always treated as fixed command names.
    #[serde(default)]
    pub known: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct LoggingConfig {
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub path: String,
}

// ── Overlay types (user config that merges with defaults) ──

#[derive(Debug, Deserialize, Default)]
struct ConfigOverlay {
    #[serde(default)]
    store: StoreOverlay,
    #[serde(default)]
    oracle: OracleOverlay,
    #[serde(default)]
    logging: LoggingOverlay,
}

#[derive(Debug, Deserialize, Default)]
struct StoreOverlay {
    path: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct OracleOverlay {
    #[serde(default)]
    replace: bool,
    probe: Option<String>,
    #[serde(default)]
    known: Vec<String>,
    #[serde(default)]
    remove_known: Vec<String>,
}

#[derive(Debug, Deserialize, Default)]
struct LoggingOverlay {
    level: Option<String>,
    path: Option<String>,
}

// ── Merge logic ──

/// Merge a user list into a default list.
/// In replace mode: user list replaces default entirely.
/// In merge mode: remove items first, then extend with additions (deduped).
fn merge_list(base: &mut Vec<String>, add: Vec<String>, remove: &[String], replace: bool) {
    if replace {
        *base = add;
    } else {
        base.retain(|item| !remove.contains(item));
        for item in add {
            if !base.contains(&item) {
                base.push(item);
            }
        }
    }
}

/// Expand `~` and environment variables; fall back to the raw text.
fn expand_path(raw: &str) -> PathBuf {
    match shellexpand::full(raw) {
        Ok(expanded) => PathBuf::from(expanded.into_owned()),
        Err(_) => PathBuf::from(shellexpand::tilde(raw).into_owned()),
    }
}

impl Config {
    /// Load the default embedded configuration.
    pub fn default_config() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("embedded default config must parse")
    }

    /// Load configuration with resolution order:
    /// 1. Start with embedded defaults
    /// 2. Merge user overlay from ~/.config/gadgetsmith/config.toml (if exists)
    pub fn load() -> Self {
        match std::env::var_os("HOME") {
            Some(home) => Self::load_from(Path::new(&home)),
            None => Self::default_config(),
        }
    }

    /// Embedded defaults merged with `<home>/.config/gadgetsmith/config.toml`.
    pub fn load_from(home: &Path) -> Self {
        let mut config = Self::default_config();
        if let Some(overlay) = Self::load_overlay(home) {
            config.apply_overlay(overlay);
        }
        config
    }

    /// Try to load the user overlay below `home`.
    fn load_overlay(home: &Path) -> Option<ConfigOverlay> {
        let path = home.join(".config/gadgetsmith/config.toml");
        let content = std::fs::read_to_string(path).ok()?;
        match toml::from_str(&content) {
            Ok(overlay) => Some(overlay),
            Err(e) => {
                eprintln!("gadgetsmith: config parse error: {e}");
                None
            }
        }
    }

    /// Apply an overlay on top of this config (merge semantics).
    fn apply_overlay(&mut self, overlay: ConfigOverlay) {
        if let Some(v) = overlay.store.path {
            self.store.path = v;
        }

        let o = overlay.oracle;
        merge_list(&mut self.oracle.known, o.known, &o.remove_known, o.replace);
        if let Some(v) = o.probe {
            self.oracle.probe = v;
        }

        let l = overlay.logging;
        if let Some(v) = l.level {
            self.logging.level = v;
        }
        if let Some(v) = l.path {
            self.logging.path = v;
        }
    }

    /// The gadget collection path with `~` expanded.
    pub fn store_path(&self) -> PathBuf {
        expand_path(&self.store.path)
    }

    /// The log file path with `~` expanded, or `None` when unset.
    pub fn log_path(&self) -> Option<PathBuf> {
        let raw = self.logging.path.trim();
        (!raw.is_empty()).then(|| expand_path(raw))
    }

    /// Apply an overlay from a TOML string. Used for testing.
    #[cfg(test)]
    fn apply_overlay_str(&mut self, toml_str: &str) {
        let overlay: ConfigOverlay = toml::from_str(toml_str).unwrap();
        self.apply_overlay(overlay);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_parses() {
        let config = Config::default_config();
        assert!(!config.store.path.is_empty());
        assert!(!config.oracle.probe.is_empty());
        assert!(!config.oracle.known.is_empty());
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn default_config_has_expected_commands() {
        let config = Config::default_config();
        assert!(config.oracle.known.contains(&"ls".to_string()));
        assert!(config.oracle.known.contains(&"git".to_string()));
    }

    #[test]
    fn store_path_expands_tilde() {
        let config = Config::default_config();
        let path = config.store_path();
        assert!(!path.to_string_lossy().starts_with('~'));
        assert!(path.ends_with(".config/gadgetsmith/gadgets.json"));
    }

    #[test]
    fn empty_log_path_is_none() {
        let mut config = Config::default_config();
        config.apply_overlay_str(
            r#"
            [logging]
            path = ""
        "#,
        );
        assert!(config.log_path().is_none());
    }

    // ── Merge semantics ──

    #[test]
    fn overlay_extends_known_list() {
        let mut config = Config::default_config();
        config.apply_overlay_str(
            r#"
            [oracle]
            known = ["my-tool"]
        "#,
        );
        assert!(config.oracle.known.contains(&"ls".to_string()));
        assert!(config.oracle.known.contains(&"my-tool".to_string()));
    }

    #[test]
    fn overlay_removes_from_known_list() {
        let mut config = Config::default_config();
        config.apply_overlay_str(
            r#"
            [oracle]
            remove_known = ["cat", "find"]
        "#,
        );
        assert!(!config.oracle.known.contains(&"cat".to_string()));
        assert!(!config.oracle.known.contains(&"find".to_string()));
        assert!(config.oracle.known.contains(&"ls".to_string()));
    }

    #[test]
    fn overlay_replace_known() {
        let mut config = Config::default_config();
        config.apply_overlay_str(
            r#"
            [oracle]
            replace = true
            known = ["pwsh"]
            probe = ""
        "#,
        );
        assert_eq!(config.oracle.known, vec!["pwsh"]);
        assert!(config.oracle.probe.is_empty());
    }

    #[test]
    fn overlay_no_duplicates() {
        let mut config = Config::default_config();
        config.apply_overlay_str(
            r#"
            [oracle]
            known = ["ls"]
        "#,
        );
        let count = config.oracle.known.iter().filter(|s| *s == "ls").count();
        assert_eq!(count, 1);
    }

    #[test]
    fn overlay_scalars_override() {
        let mut config = Config::default_config();
        config.apply_overlay_str(
            r#"
            [store]
            path = "/srv/gadgets.json"

            [logging]
            level = "debug"
        "#,
        );
        assert_eq!(config.store_path(), PathBuf::from("/srv/gadgets.json"));
        assert_eq!(config.logging.level, "debug");
        // Untouched scalar keeps its default
        assert!(!config.logging.path.is_empty());
    }

    #[test]
    fn load_from_reads_user_overlay() {
        let home = tempfile::tempdir().unwrap();
        let dir = home.path().join(".config/gadgetsmith");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("config.toml"), "[oracle]\nknown = [\"my-tool\"]\n").unwrap();
        let config = Config::load_from(home.path());
        assert!(config.oracle.known.contains(&"my-tool".to_string()));
        assert!(config.oracle.known.contains(&"ls".to_string()));
    }

    #[test]
    fn load_from_without_overlay_is_default() {
        let home = tempfile::tempdir().unwrap();
        let config = Config::load_from(home.path());
        assert_eq!(config.oracle.known, Config::default_config().oracle.known);
    }

    #[test]
    fn empty_overlay_changes_nothing() {
        let original = Config::default_config();
        let mut config = Config::default_config();
        config.apply_overlay_str("");
        assert_eq!(config.oracle.known, original.oracle.known);
        assert_eq!(config.store.path, original.store.path);
    }
}
