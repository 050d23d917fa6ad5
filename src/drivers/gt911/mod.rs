use embedded_hal::{delay::DelayNs, digital::OutputPin};

use crate::platform::RegisterBus;

/// Default 7-bit address (INT held low during reset).
pub const GT911_ADDRESS: u8 = 0x5D;
/// Alternate 7-bit address (INT held high during reset).
pub const GT911_ADDRESS_ALT: u8 = 0x14;
/// The controller tracks at most five simultaneous contacts.
pub const MAX_TOUCH_POINTS: u8 = 5;
/// Length of one point record in the coordinate buffer.
pub const POINT_BLOCK_LEN: usize = 8;

pub(crate) const REG_PRODUCT_ID: u16 = 0x8140;
pub(crate) const REG_STATUS: u16 = 0x814E;
pub(crate) const REG_POINT1: u16 = 0x814F;

const STATUS_BUFFER_READY: u8 = 0x80;
const STATUS_POINT_COUNT_MASK: u8 = 0x0F;

const RESET_ASSERT_MS: u32 = 10;
const RESET_SETTLE_MS: u32 = 50;

/// Decoded coordinate status register (`0x814E`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Status {
    pub buffer_ready: bool,
    pub point_count: u8,
}

impl Status {
    pub const fn from_byte(byte: u8) -> Self {
        Self {
            buffer_ready: byte & STATUS_BUFFER_READY != 0,
            point_count: byte & STATUS_POINT_COUNT_MASK,
        }
    }

    pub const fn has_contact(self) -> bool {
        self.buffer_ready && self.point_count > 0
    }
}

/// One point record as the controller reports it, before any axis transform.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RawPoint {
    pub track_id: u8,
    pub x: u16,
    pub y: u16,
    pub size: u16,
}

impl RawPoint {
    pub fn decode(block: &[u8; POINT_BLOCK_LEN]) -> Self {
        Self {
            track_id: block[0],
            x: u16::from_le_bytes([block[1], block[2]]),
            y: u16::from_le_bytes([block[3], block[4]]),
            size: u16::from_le_bytes([block[5], block[6]]),
        }
    }
}

/// Register-level access to a GT911 touch controller.
pub struct Gt911<BUS> {
    bus: BUS,
    address: u8,
}

impl<BUS> Gt911<BUS> {
    pub fn new(bus: BUS, address: u8) -> Self {
        Self { bus, address }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn bus_mut(&mut self) -> &mut BUS {
        &mut self.bus
    }

    pub fn release(self) -> BUS {
        self.bus
    }
}

impl<BUS> Gt911<BUS>
where
    BUS: RegisterBus,
{
    pub fn read_status(&mut self) -> Result<Status, BUS::Error> {
        let mut buf = [0u8; 1];
        self.bus
            .read_register(self.address, REG_STATUS, &mut buf)?;
        Ok(Status::from_byte(buf[0]))
    }

    /// Acknowledges the current coordinate buffer. The controller stops
    /// refreshing it until this write happens.
    pub fn clear_status(&mut self) -> Result<(), BUS::Error> {
        self.bus.write_register(self.address, REG_STATUS, 0)
    }

    pub fn read_primary_point(&mut self) -> Result<RawPoint, BUS::Error> {
        let mut block = [0u8; POINT_BLOCK_LEN];
        self.bus
            .read_register(self.address, REG_POINT1, &mut block)?;
        Ok(RawPoint::decode(&block))
    }

    /// ASCII product id, `b"911\0"` on a GT911.
    pub fn read_product_id(&mut self) -> Result<[u8; 4], BUS::Error> {
        let mut id = [0u8; 4];
        self.bus
            .read_register(self.address, REG_PRODUCT_ID, &mut id)?;
        Ok(id)
    }
}

/// Drives the reset line low for 10 ms, releases it, then waits 50 ms for the
/// controller firmware to come up.
pub fn pulse_reset<RST, D>(reset: &mut RST, delay: &mut D) -> Result<(), RST::Error>
where
    RST: OutputPin,
    D: DelayNs,
{
    reset.set_low()?;
    delay.delay_ms(RESET_ASSERT_MS);
    reset.set_high()?;
    delay.delay_ms(RESET_SETTLE_MS);
    Ok(())
}
