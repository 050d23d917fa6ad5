use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, channel::Channel};
use tdeck_touch::Gesture;

// Keyboard, trackball, touch and audio all sit behind this rail.
pub(crate) const PERIPHERAL_POWER_SETTLE_MS: u32 = 200;
pub(crate) const I2C_FREQ_KHZ: u32 = 400;
pub(crate) const LOG_LEVEL: log::LevelFilter = log::LevelFilter::Info;

pub(crate) const LAUNCHER_ROW_TOP: i32 = 40;
pub(crate) const LAUNCHER_ROW_HEIGHT: u32 = 40;
pub(crate) const LAUNCHER_ROWS: usize = 4;

pub(crate) static GESTURES: Channel<CriticalSectionRawMutex, Gesture, 16> = Channel::new();
