use embedded_graphics::{
    prelude::Point,
    primitives::{ContainsPoint, Rectangle},
};
use heapless::Vec;

use crate::{gesture::GestureSource, touch::Gesture};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FocusChange {
    pub previous: Option<usize>,
    pub current: usize,
}

/// Moves focus to whichever registered region a tap lands in. The first
/// matching region wins when regions overlap.
pub struct TapFocus<const N: usize> {
    regions: Vec<Rectangle, N>,
    focused: Option<usize>,
}

impl<const N: usize> Default for TapFocus<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> TapFocus<N> {
    pub const fn new() -> Self {
        Self {
            regions: Vec::new(),
            focused: None,
        }
    }

    /// Returns the region's index, or hands it back when full.
    pub fn add_region(&mut self, region: Rectangle) -> Result<usize, Rectangle> {
        self.regions.push(region)?;
        Ok(self.regions.len() - 1)
    }

    pub fn regions(&self) -> &[Rectangle] {
        &self.regions
    }

    pub fn focused(&self) -> Option<usize> {
        self.focused
    }

    pub fn focus(&mut self, index: usize) -> Option<FocusChange> {
        if index >= self.regions.len() || self.focused == Some(index) {
            return None;
        }
        let previous = self.focused.replace(index);
        Some(FocusChange {
            previous,
            current: index,
        })
    }

    pub fn handle(&mut self, gesture: Gesture) -> Option<FocusChange> {
        let Gesture::Tap { x, y } = gesture else {
            return None;
        };
        let point = Point::new(i32::from(x), i32::from(y));
        let index = self
            .regions
            .iter()
            .position(|region| region.contains(point))?;
        self.focus(index)
    }

    pub fn poll(&mut self, source: &mut impl GestureSource) -> Option<FocusChange> {
        let gesture = source.next_gesture();
        self.handle(gesture)
    }
}
