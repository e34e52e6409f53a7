use crate::sim::STEP_SIZE_MAX;
use crate::{AppConfig, WebError};
use serde::Serialize;

pub const TREEWEB_CLIENT_JS: &str = include_str!("treeweb-client.js");

pub const LOW_COLOR: &str = "deepskyblue";
pub const MID_COLOR: &str = "green";
pub const HIGH_COLOR: &str = "red";

/// Shared definitions handed to the browser as `window.__TREEWEB__`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientBootstrap {
    pub state_keys: Vec<String>,
    pub poll_interval_ms: u64,
    pub low_threshold: f64,
    pub high_threshold: f64,
    pub low_color: &'static str,
    pub mid_color: &'static str,
    pub high_color: &'static str,
    pub step_min: f64,
    pub step_max: f64,
}

impl ClientBootstrap {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            state_keys: config.state_keys(),
            poll_interval_ms: config.poll_interval_ms,
            low_threshold: config.low_threshold,
            high_threshold: config.high_threshold,
            low_color: LOW_COLOR,
            mid_color: MID_COLOR,
            high_color: HIGH_COLOR,
            step_min: 0.0,
            step_max: STEP_SIZE_MAX,
        }
    }
}

/// Color a readout the same way the client does.
pub fn readout_color(value: f64, config: &AppConfig) -> &'static str {
    if value <= config.low_threshold {
        LOW_COLOR
    } else if value >= config.high_threshold {
        HIGH_COLOR
    } else {
        MID_COLOR
    }
}

/// Bootstrap assignment followed by the client runtime.
pub fn client_script(config: &AppConfig) -> Result<String, WebError> {
    let bootstrap = serde_json::to_string(&ClientBootstrap::from_config(config))?;
    Ok(format!(
        "window.__TREEWEB__ = {};\n{}",
        bootstrap, TREEWEB_CLIENT_JS
    ))
}
