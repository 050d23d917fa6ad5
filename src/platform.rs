use core::{cell::Cell, convert::Infallible};

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

/// Register-addressed serial bus with 16-bit register addresses.
pub trait RegisterBus {
    type Error;

    fn read_register(
        &mut self,
        device: u8,
        register: u16,
        buffer: &mut [u8],
    ) -> Result<(), Self::Error>;
    fn write_register(&mut self, device: u8, register: u16, value: u8) -> Result<(), Self::Error>;
}

impl<T: RegisterBus + ?Sized> RegisterBus for &mut T {
    type Error = T::Error;

    fn read_register(
        &mut self,
        device: u8,
        register: u16,
        buffer: &mut [u8],
    ) -> Result<(), Self::Error> {
        (**self).read_register(device, register, buffer)
    }

    fn write_register(&mut self, device: u8, register: u16, value: u8) -> Result<(), Self::Error> {
        (**self).write_register(device, register, value)
    }
}

/// [`RegisterBus`] over any `embedded-hal` I2C bus. Register addresses go out
/// MSB first, as the GT911 expects.
pub struct HalRegisterBus<I2C> {
    bus: I2C,
}

impl<I2C> HalRegisterBus<I2C> {
    pub fn new(bus: I2C) -> Self {
        Self { bus }
    }

    pub fn release(self) -> I2C {
        self.bus
    }
}

impl<I2C> RegisterBus for HalRegisterBus<I2C>
where
    I2C: embedded_hal::i2c::I2c,
{
    type Error = I2C::Error;

    fn read_register(
        &mut self,
        device: u8,
        register: u16,
        buffer: &mut [u8],
    ) -> Result<(), Self::Error> {
        self.bus
            .write_read(device, &register.to_be_bytes(), buffer)
    }

    fn write_register(&mut self, device: u8, register: u16, value: u8) -> Result<(), Self::Error> {
        let [hi, lo] = register.to_be_bytes();
        self.bus.write(device, &[hi, lo, value])
    }
}

/// Millisecond monotonic time source.
pub trait MonotonicClock {
    fn now_ms(&self) -> u64;
}

impl<T: MonotonicClock + ?Sized> MonotonicClock for &T {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}

/// Clock advanced by hand. Used by the trace replay tool and host tests.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: Cell<u64>,
}

impl ManualClock {
    pub const fn new(now_ms: u64) -> Self {
        Self {
            now_ms: Cell::new(now_ms),
        }
    }

    pub fn set(&self, now_ms: u64) {
        self.now_ms.set(now_ms);
    }

    pub fn advance(&self, millis: u64) {
        self.now_ms.set(self.now_ms.get().saturating_add(millis));
    }
}

impl MonotonicClock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.get()
    }
}

#[cfg(feature = "embassy")]
#[derive(Clone, Copy, Debug, Default)]
pub struct EmbassyClock;

#[cfg(feature = "embassy")]
impl MonotonicClock for EmbassyClock {
    fn now_ms(&self) -> u64 {
        embassy_time::Instant::now().as_millis()
    }
}

/// Stand-in for an unconnected interrupt or reset line.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoPin;

impl ErrorType for NoPin {
    type Error = Infallible;
}

impl InputPin for NoPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(false)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(true)
    }
}

impl OutputPin for NoPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}
