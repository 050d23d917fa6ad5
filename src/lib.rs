#![cfg_attr(not(test), no_std)]

//! Touch input for a T-Deck class handheld: a GT911 capacitive controller on a
//! shared I2C bus, polled into tap, long-press and drag gestures.
//!
//! Hosts construct a [`touch::TouchDriver`] over any [`platform::RegisterBus`]
//! and call [`touch::TouchDriver::read`] at a fixed cadence, or hand it to
//! consumers as a [`gesture::GestureSource`].

pub mod drivers;
#[cfg(feature = "graphics")]
pub mod focus;
pub mod gesture;
pub mod platform;
pub mod replay;
pub mod touch;

pub use gesture::GestureSource;
pub use touch::{Gesture, TouchConfig, TouchDriver, TouchPoint};
