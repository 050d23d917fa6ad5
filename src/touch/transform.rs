use super::{config::TouchConfig, types::TouchPoint};

/// Maps sensor coordinates into display space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AxisTransform {
    width: u16,
    height: u16,
    swap_xy: bool,
    mirror_y: bool,
}

impl AxisTransform {
    pub const fn new(width: u16, height: u16, swap_xy: bool, mirror_y: bool) -> Self {
        Self {
            width,
            height,
            swap_xy,
            mirror_y,
        }
    }

    pub const fn from_config(config: &TouchConfig) -> Self {
        Self::new(config.width, config.height, config.swap_xy, config.mirror_y)
    }

    /// Swaps, bounds-checks, then mirrors. Returns `None` for a coordinate that
    /// falls outside the screen once the axes are swapped.
    pub fn apply(self, raw_x: u16, raw_y: u16) -> Option<TouchPoint> {
        let (x, y) = if self.swap_xy {
            (raw_y, raw_x)
        } else {
            (raw_x, raw_y)
        };
        if x >= self.width || y >= self.height {
            return None;
        }
        let y = if self.mirror_y {
            self.height - 1 - y
        } else {
            y
        };
        Some(TouchPoint { x, y })
    }
}
