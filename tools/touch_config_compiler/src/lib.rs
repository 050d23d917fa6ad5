use std::{fmt, fs, path::Path};

use serde::Deserialize;

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ControllerSection {
    pub address: u8,
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DisplaySection {
    pub width: u16,
    pub height: u16,
    pub swap_xy: bool,
    pub mirror_y: bool,
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GestureSection {
    pub drag_min_distance_px: u16,
    pub release_grace_ms: u64,
    pub long_press_ms: u64,
    pub noise_floor_ms: u64,
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PollingSection {
    pub interval_ms: u64,
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TouchFile {
    pub controller: ControllerSection,
    pub display: DisplaySection,
    pub gesture: GestureSection,
    pub polling: PollingSection,
}

#[derive(Debug)]
pub enum ConfigCompilerError {
    Io(String),
    Parse(String),
    Validation(String),
}

impl fmt::Display for ConfigCompilerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "io error: {msg}"),
            Self::Parse(msg) => write!(f, "parse error: {msg}"),
            Self::Validation(msg) => write!(f, "validation error: {msg}"),
        }
    }
}

impl std::error::Error for ConfigCompilerError {}

pub fn parse_touch_file(path: &Path) -> Result<TouchFile, ConfigCompilerError> {
    let text = fs::read_to_string(path)
        .map_err(|e| ConfigCompilerError::Io(format!("{}: {e}", path.display())))?;
    parse_touch_str(&text)
}

pub fn parse_touch_str(text: &str) -> Result<TouchFile, ConfigCompilerError> {
    toml::from_str(text).map_err(|e| ConfigCompilerError::Parse(e.to_string()))
}

pub fn validate_config(config: &TouchFile) -> Result<(), ConfigCompilerError> {
    let mut errors = Vec::new();

    if config.controller.address > 0x7F {
        errors.push("controller.address must be a 7-bit I2C address (<= 0x7F)");
    }
    if config.display.width == 0 || config.display.height == 0 {
        errors.push("display.width and display.height must be > 0");
    }
    if config.gesture.release_grace_ms == 0 {
        errors.push("gesture.release_grace_ms must be > 0");
    }
    if config.gesture.long_press_ms <= config.gesture.noise_floor_ms {
        errors.push("gesture.long_press_ms must be > gesture.noise_floor_ms");
    }
    if config.polling.interval_ms == 0 {
        errors.push("polling.interval_ms must be > 0");
    }
    // Polling slower than the grace window splits one press into a release/re-press pair.
    if config.polling.interval_ms >= config.gesture.release_grace_ms {
        errors.push("polling.interval_ms must be < gesture.release_grace_ms");
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigCompilerError::Validation(errors.join("; ")))
    }
}

pub fn render_generated_config(config: &TouchFile) -> String {
    let c = config;
    format!(
        "// @generated by touch_config_compiler from config/touch.toml\n\
         pub const TOUCH_CONFIG: TouchConfig = TouchConfig {{\n    \
             address: {address:#04x},\n    \
             width: {width},\n    \
             height: {height},\n    \
             swap_xy: {swap_xy},\n    \
             mirror_y: {mirror_y},\n    \
             thresholds: GestureThresholds {{\n        \
                 drag_min_distance_px: {drag},\n        \
                 release_grace_ms: {grace},\n        \
                 long_press_ms: {long_press},\n        \
                 noise_floor_ms: {noise},\n    \
             }},\n\
         }};\n\
         pub const TOUCH_POLL_INTERVAL_MS: u64 = {poll};\n",
        address = c.controller.address,
        width = c.display.width,
        height = c.display.height,
        swap_xy = c.display.swap_xy,
        mirror_y = c.display.mirror_y,
        drag = c.gesture.drag_min_distance_px,
        grace = c.gesture.release_grace_ms,
        long_press = c.gesture.long_press_ms,
        noise = c.gesture.noise_floor_ms,
        poll = c.polling.interval_ms,
    )
}

pub fn generate_from_path(path: &Path) -> Result<String, ConfigCompilerError> {
    let config = parse_touch_file(path)?;
    validate_config(&config)?;
    Ok(render_generated_config(&config))
}
