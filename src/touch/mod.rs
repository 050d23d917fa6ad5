//! GT911 touch input: register polling, axis transform and gesture
//! classification behind a single [`TouchDriver::read`] call.

pub mod config;
pub mod core;
mod diagnostics;
pub mod queue;
pub mod transform;
pub mod types;

use embedded_hal::{
    delay::DelayNs,
    digital::{self, Error as _, OutputPin},
};
use log::{debug, info, warn};

use crate::{
    drivers::gt911::{self, Gt911, MAX_TOUCH_POINTS},
    platform::{MonotonicClock, NoPin, RegisterBus},
};

pub use self::config::{active_config, GestureThresholds, TouchConfig};
pub use self::core::GestureEngine;
pub use self::diagnostics::{FaultKind, TouchDiagnostics};
pub use self::queue::{QueuedGestures, SampleConsumer, SampleProducer, SampleQueue};
pub use self::transform::AxisTransform;
pub use self::types::{Gesture, GesturePhase, GestureState, TimedSample, TouchPoint};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TouchError<E> {
    Bus(E),
    ResetLine(digital::ErrorKind),
    TooManyPoints(u8),
    /// Raw controller coordinates that land off-screen after the axis swap.
    OutOfRange { x: u16, y: u16 },
}

impl<E> From<E> for TouchError<E> {
    fn from(value: E) -> Self {
        Self::Bus(value)
    }
}

impl<E> TouchError<E> {
    pub fn fault_kind(&self) -> FaultKind {
        match self {
            Self::Bus(_) | Self::ResetLine(_) => FaultKind::Bus,
            Self::TooManyPoints(_) => FaultKind::TooManyPoints,
            Self::OutOfRange { .. } => FaultKind::OutOfRange,
        }
    }
}

/// Optional control lines. The T-Deck wires the interrupt line only.
pub struct TouchLines<IRQ, RST> {
    pub interrupt: Option<IRQ>,
    pub reset: Option<RST>,
}

impl Default for TouchLines<NoPin, NoPin> {
    fn default() -> Self {
        Self {
            interrupt: None,
            reset: None,
        }
    }
}

pub struct TouchDriver<BUS, CLK, IRQ = NoPin> {
    controller: Gt911<BUS>,
    clock: CLK,
    transform: AxisTransform,
    engine: GestureEngine,
    diagnostics: TouchDiagnostics,
    interrupt: Option<IRQ>,
}

impl<BUS, CLK> TouchDriver<BUS, CLK, NoPin>
where
    BUS: RegisterBus,
    CLK: MonotonicClock,
{
    pub fn new(bus: BUS, clock: CLK, config: TouchConfig) -> Self {
        Self::assemble(bus, clock, config, None)
    }
}

impl<BUS, CLK, IRQ> TouchDriver<BUS, CLK, IRQ>
where
    BUS: RegisterBus,
    CLK: MonotonicClock,
{
    /// Builds a driver with control lines attached. A reset line is pulsed
    /// before first use and then dropped; the bus is not touched here.
    pub fn with_lines<RST, D>(
        bus: BUS,
        clock: CLK,
        config: TouchConfig,
        lines: TouchLines<IRQ, RST>,
        delay: &mut D,
    ) -> Result<Self, TouchError<BUS::Error>>
    where
        RST: OutputPin,
        D: DelayNs,
    {
        if let Some(mut reset) = lines.reset {
            gt911::pulse_reset(&mut reset, delay)
                .map_err(|err| TouchError::ResetLine(err.kind()))?;
            info!("touch: controller reset pulsed addr=0x{:02x}", config.address);
        }
        Ok(Self::assemble(bus, clock, config, lines.interrupt))
    }

    fn assemble(bus: BUS, clock: CLK, config: TouchConfig, interrupt: Option<IRQ>) -> Self {
        Self {
            controller: Gt911::new(bus, config.address),
            clock,
            transform: AxisTransform::from_config(&config),
            engine: GestureEngine::new(config.thresholds),
            diagnostics: TouchDiagnostics::default(),
            interrupt,
        }
    }

    /// One poll: a status read, a status clear, at most one coordinate read,
    /// then one classifier step. Faulted polls report [`Gesture::None`] and
    /// leave the press in progress untouched.
    pub fn read(&mut self) -> Gesture {
        let contact = match self.sample() {
            Ok(contact) => contact,
            Err(_) => return Gesture::None,
        };
        let now_ms = self.clock.now_ms();
        let gesture = self.engine.tick(now_ms, contact);
        if !gesture.is_none() {
            debug!(
                "touch: {} at ms={} point={:?}",
                gesture.kind_label(),
                now_ms,
                gesture.point()
            );
        }
        gesture
    }

    /// Reads the current contact without classifying it. Faults are counted
    /// in [`Self::diagnostics`] as they would be for [`Self::read`].
    pub fn sample(&mut self) -> Result<Option<TouchPoint>, TouchError<BUS::Error>> {
        self.diagnostics.record_poll();
        match self.acquire() {
            Ok(contact) => {
                if let Some(streak) = self.diagnostics.record_clean() {
                    info!("touch: recovered after {} faulted polls", streak);
                }
                Ok(contact)
            }
            Err(err) => {
                let kind = err.fault_kind();
                let streak = self.diagnostics.record_fault(kind);
                if streak == 1 {
                    warn!("touch: poll discarded fault={}", kind.label());
                } else {
                    debug!("touch: poll discarded fault={} streak={}", kind.label(), streak);
                }
                Err(err)
            }
        }
    }

    fn acquire(&mut self) -> Result<Option<TouchPoint>, TouchError<BUS::Error>> {
        let status = self.controller.read_status()?;
        self.controller.clear_status()?;

        if !status.has_contact() {
            return Ok(None);
        }
        if status.point_count > MAX_TOUCH_POINTS {
            return Err(TouchError::TooManyPoints(status.point_count));
        }

        let raw = self.controller.read_primary_point()?;
        self.transform
            .apply(raw.x, raw.y)
            .map(Some)
            .ok_or(TouchError::OutOfRange { x: raw.x, y: raw.y })
    }

    pub fn product_id(&mut self) -> Result<[u8; 4], TouchError<BUS::Error>> {
        Ok(self.controller.read_product_id()?)
    }

    pub fn diagnostics(&self) -> TouchDiagnostics {
        self.diagnostics
    }

    pub fn gesture_state(&self) -> GestureState {
        self.engine.state()
    }

    pub fn address(&self) -> u8 {
        self.controller.address()
    }

    pub fn interrupt_line_mut(&mut self) -> Option<&mut IRQ> {
        self.interrupt.as_mut()
    }

    pub fn bus_mut(&mut self) -> &mut BUS {
        self.controller.bus_mut()
    }

    pub fn release(self) -> (BUS, CLK, Option<IRQ>) {
        (self.controller.release(), self.clock, self.interrupt)
    }
}

#[cfg(test)]
mod tests;
