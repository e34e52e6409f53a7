use crate::WebError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Definitions shared by the server handlers, the rendered page and the
/// client script bootstrap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct AppConfig {
    /// Number of simulated readouts.
    pub nitems: usize,
    /// Initial random-walk step size.
    pub stepsize: f64,
    pub port: u16,
    pub html_dir: PathBuf,
    pub js_dir: PathBuf,
    pub script_name: String,
    pub title: String,
    pub project_url: String,
    pub poll_interval_ms: u64,
    /// The simulation advances at most once per this interval.
    pub min_update_interval_ms: u64,
    pub low_threshold: f64,
    pub high_threshold: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            nitems: 10,
            stepsize: 0.5,
            port: 8800,
            html_dir: PathBuf::from("__html__"),
            js_dir: PathBuf::from("__javascript__"),
            script_name: "treeweb.js".to_string(),
            title: "Nearly Pure Rust Web App Demo".to_string(),
            project_url: "https://github.com/Michael-F-Ellis/NearlyPurePythonWebAppDemo".to_string(),
            poll_interval_ms: 500,
            min_update_interval_ms: 500,
            low_threshold: 2.0,
            high_threshold: 8.0,
        }
    }
}

impl AppConfig {
    pub const FILE_NAME: &'static str = "treeweb.json";

    /// Defaults with output directories resolved against `root`.
    pub fn minimal(root: &Path) -> Self {
        let mut cfg = Self::default();
        cfg.resolve_paths(root);
        cfg
    }

    /// Load `treeweb.json` from `root` if present, otherwise defaults.
    pub fn load(root: &Path) -> Result<Self, WebError> {
        let path = root.join(Self::FILE_NAME);
        if !path.is_file() {
            log::debug!("no {} in {}, using defaults", Self::FILE_NAME, root.display());
            return Ok(Self::minimal(root));
        }

        let content = fs::read_to_string(&path).map_err(|source| WebError::Read {
            path: path.clone(),
            source,
        })?;
        let mut cfg = serde_json::from_str::<Self>(&content)
            .map_err(|source| WebError::Config { path, source })?;
        cfg.resolve_paths(root);
        cfg.validate()?;
        Ok(cfg)
    }

    fn resolve_paths(&mut self, root: &Path) {
        if !self.html_dir.is_absolute() {
            self.html_dir = root.join(&self.html_dir);
        }
        if !self.js_dir.is_absolute() {
            self.js_dir = root.join(&self.js_dir);
        }
    }

    pub fn validate(&self) -> Result<(), WebError> {
        if self.nitems == 0 {
            return Err(WebError::InvalidConfig("nitems must be at least 1".to_string()));
        }
        if !(0.0..=10.0).contains(&self.stepsize) {
            return Err(WebError::InvalidConfig(format!(
                "stepsize {} is outside 0..=10",
                self.stepsize
            )));
        }
        if self.low_threshold >= self.high_threshold {
            return Err(WebError::InvalidConfig(format!(
                "lowThreshold {} must be below highThreshold {}",
                self.low_threshold, self.high_threshold
            )));
        }
        if self.poll_interval_ms == 0 {
            return Err(WebError::InvalidConfig("pollIntervalMs must be positive".to_string()));
        }
        if !self.script_name.ends_with(".js") || self.script_name.contains('/') {
            return Err(WebError::InvalidConfig(format!(
                "scriptName {:?} must be a bare .js file name",
                self.script_name
            )));
        }
        Ok(())
    }

    /// `item0`, `item1`, ...
    pub fn state_keys(&self) -> Vec<String> {
        (0..self.nitems).map(|n| format!("item{n}")).collect()
    }

    pub fn index_path(&self) -> PathBuf {
        self.html_dir.join("index.html")
    }

    pub fn script_path(&self) -> PathBuf {
        self.js_dir.join(&self.script_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_temp_dir(prefix: &str) -> PathBuf {
        let ts = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("{}-{}-{}", prefix, std::process::id(), ts));
        std::fs::create_dir_all(&dir).expect("failed to create temp dir");
        dir
    }

    #[test]
    fn test_missing_file_uses_defaults_under_root() {
        let root = unique_temp_dir("treeweb-config-default");
        let cfg = AppConfig::load(&root).expect("defaults should load");
        assert_eq!(cfg.nitems, 10);
        assert_eq!(cfg.stepsize, 0.5);
        assert_eq!(cfg.index_path(), root.join("__html__").join("index.html"));
        assert_eq!(cfg.script_path(), root.join("__javascript__").join("treeweb.js"));
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let root = unique_temp_dir("treeweb-config-partial");
        std::fs::write(
            root.join(AppConfig::FILE_NAME),
            r#"{"nitems": 4, "stepsize": 1.5, "htmlDir": "out/html"}"#,
        )
        .expect("failed to write config");

        let cfg = AppConfig::load(&root).expect("config should load");
        assert_eq!(cfg.nitems, 4);
        assert_eq!(cfg.stepsize, 1.5);
        assert_eq!(cfg.port, 8800);
        assert_eq!(cfg.html_dir, root.join("out/html"));
        assert_eq!(cfg.state_keys(), vec!["item0", "item1", "item2", "item3"]);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let root = unique_temp_dir("treeweb-config-invalid");
        std::fs::write(root.join(AppConfig::FILE_NAME), r#"{"nitems": 0}"#).unwrap();
        assert!(matches!(AppConfig::load(&root), Err(WebError::InvalidConfig(_))));

        std::fs::write(root.join(AppConfig::FILE_NAME), r#"{"lowThreshold": 9, "highThreshold": 1}"#)
            .unwrap();
        assert!(matches!(AppConfig::load(&root), Err(WebError::InvalidConfig(_))));

        std::fs::write(root.join(AppConfig::FILE_NAME), r#"{"scriptName": "../x.js"}"#).unwrap();
        assert!(matches!(AppConfig::load(&root), Err(WebError::InvalidConfig(_))));
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let root = unique_temp_dir("treeweb-config-unknown");
        std::fs::write(
            root.join(AppConfig::FILE_NAME),
            r#"{"html_dir": "out", "min_update_interval_ms": 5}"#,
        )
        .unwrap();
        let err = AppConfig::load(&root).unwrap_err();
        assert!(matches!(err, WebError::Config { .. }));
        assert!(err.to_string().contains("html_dir"), "{err}");

        std::fs::write(root.join(AppConfig::FILE_NAME), r#"{"htmlDir": "out", "minUpdateIntervalMs": 5}"#).unwrap();
        let cfg = AppConfig::load(&root).expect("camelCase keys should load");
        assert_eq!(cfg.html_dir, root.join("out"));
        assert_eq!(cfg.min_update_interval_ms, 5);
    }

    #[test]
    fn test_malformed_json_reports_path() {
        let root = unique_temp_dir("treeweb-config-bad");
        std::fs::write(root.join(AppConfig::FILE_NAME), "{nitems:").unwrap();
        let err = AppConfig::load(&root).unwrap_err();
        assert!(matches!(err, WebError::Config { .. }));
        assert!(err.to_string().contains(AppConfig::FILE_NAME));
    }
}
