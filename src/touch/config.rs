/// Timing and distance limits used by the gesture classifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GestureThresholds {
    /// Movement on either axis beyond this many pixels counts as a drag step.
    pub drag_min_distance_px: u16,
    /// A not-pressed reading only ends the press once it has lasted longer than this.
    pub release_grace_ms: u64,
    pub long_press_ms: u64,
    /// Presses held this long or shorter are discarded as glitches.
    pub noise_floor_ms: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TouchConfig {
    pub address: u8,
    pub width: u16,
    pub height: u16,
    pub swap_xy: bool,
    pub mirror_y: bool,
    pub thresholds: GestureThresholds,
}

include!(concat!(env!("OUT_DIR"), "/touch_config.rs"));

/// Configuration compiled from `config/touch.toml`.
pub fn active_config() -> &'static TouchConfig {
    &TOUCH_CONFIG
}

impl Default for TouchConfig {
    fn default() -> Self {
        TOUCH_CONFIG
    }
}

impl Default for GestureThresholds {
    fn default() -> Self {
        TOUCH_CONFIG.thresholds
    }
}

impl TouchConfig {
    pub const fn with_address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }

    pub const fn with_screen(mut self, width: u16, height: u16) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub const fn with_orientation(mut self, swap_xy: bool, mirror_y: bool) -> Self {
        self.swap_xy = swap_xy;
        self.mirror_y = mirror_y;
        self
    }

    pub const fn with_thresholds(mut self, thresholds: GestureThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }
}
