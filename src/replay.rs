//! Scripted register bus for replaying captured controller traces.
//!
//! Each [`BusFrame`] answers one poll: it is taken off the queue by the status
//! read, and the clear write and coordinate read that follow in the same poll
//! are answered from it.

use heapless::Deque;

use crate::{
    drivers::gt911::{POINT_BLOCK_LEN, REG_POINT1, REG_PRODUCT_ID, REG_STATUS},
    platform::RegisterBus,
};

const STATUS_RELEASED: u8 = 0x80;
const STATUS_ONE_POINT: u8 = 0x81;
const REPLAY_POINT_SIZE: u16 = 0x20;
const PRODUCT_ID: [u8; 4] = *b"911\0";

/// Which transaction of a poll an injected fault hits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FaultStage {
    Status,
    Clear,
    Point,
}

impl FaultStage {
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "status" => Some(Self::Status),
            "clear" => Some(Self::Clear),
            "point" => Some(Self::Point),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BusFrame {
    pub status: u8,
    pub x: u16,
    pub y: u16,
    pub fault: Option<FaultStage>,
}

impl BusFrame {
    pub const fn raw(status: u8, x: u16, y: u16) -> Self {
        Self {
            status,
            x,
            y,
            fault: None,
        }
    }

    /// One contact at raw controller coordinates.
    pub const fn pressed(x: u16, y: u16) -> Self {
        Self::raw(STATUS_ONE_POINT, x, y)
    }

    pub const fn released() -> Self {
        Self::raw(STATUS_RELEASED, 0, 0)
    }

    /// A poll that reports one contact but fails at `stage`.
    pub const fn faulted(stage: FaultStage) -> Self {
        Self {
            status: STATUS_ONE_POINT,
            x: 0,
            y: 0,
            fault: Some(stage),
        }
    }

    fn fails_at(&self, stage: FaultStage) -> bool {
        self.fault == Some(stage)
    }

    fn point_block(&self) -> [u8; POINT_BLOCK_LEN] {
        let [x_lo, x_hi] = self.x.to_le_bytes();
        let [y_lo, y_hi] = self.y.to_le_bytes();
        let [s_lo, s_hi] = REPLAY_POINT_SIZE.to_le_bytes();
        [0, x_lo, x_hi, y_lo, y_hi, s_lo, s_hi, 0]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplayFault {
    Injected(FaultStage),
    WrongDevice(u8),
    UnknownRegister(u16),
    /// A clear or coordinate access with no status read before it.
    NoActiveFrame,
}

/// Register bus that answers from a queue of frames. An empty queue reads as
/// an idle, untouched panel.
pub struct ReplayBus<const N: usize> {
    address: u8,
    frames: Deque<BusFrame, N>,
    current: Option<BusFrame>,
    status_reads: u32,
    clear_writes: u32,
    point_reads: u32,
}

impl<const N: usize> ReplayBus<N> {
    pub const fn new(address: u8) -> Self {
        Self {
            address,
            frames: Deque::new(),
            current: None,
            status_reads: 0,
            clear_writes: 0,
            point_reads: 0,
        }
    }

    pub fn push(&mut self, frame: BusFrame) -> Result<(), BusFrame> {
        self.frames.push_back(frame)
    }

    /// Queues frames until the deque is full; returns how many were taken.
    pub fn extend_from_slice(&mut self, frames: &[BusFrame]) -> usize {
        frames
            .iter()
            .take_while(|frame| self.frames.push_back(**frame).is_ok())
            .count()
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }

    pub fn status_reads(&self) -> u32 {
        self.status_reads
    }

    pub fn clear_writes(&self) -> u32 {
        self.clear_writes
    }

    pub fn point_reads(&self) -> u32 {
        self.point_reads
    }

    fn active_frame(&self) -> Result<BusFrame, ReplayFault> {
        self.current.ok_or(ReplayFault::NoActiveFrame)
    }
}

fn fill(buffer: &mut [u8], source: &[u8]) {
    let n = buffer.len().min(source.len());
    buffer[..n].copy_from_slice(&source[..n]);
    buffer[n..].fill(0);
}

impl<const N: usize> RegisterBus for ReplayBus<N> {
    type Error = ReplayFault;

    fn read_register(
        &mut self,
        device: u8,
        register: u16,
        buffer: &mut [u8],
    ) -> Result<(), Self::Error> {
        if device != self.address {
            return Err(ReplayFault::WrongDevice(device));
        }
        match register {
            REG_STATUS => {
                self.status_reads += 1;
                let frame = self.frames.pop_front().unwrap_or(BusFrame::released());
                self.current = Some(frame);
                if frame.fails_at(FaultStage::Status) {
                    return Err(ReplayFault::Injected(FaultStage::Status));
                }
                fill(buffer, &[frame.status]);
                Ok(())
            }
            REG_POINT1 => {
                self.point_reads += 1;
                let frame = self.active_frame()?;
                if frame.fails_at(FaultStage::Point) {
                    return Err(ReplayFault::Injected(FaultStage::Point));
                }
                fill(buffer, &frame.point_block());
                Ok(())
            }
            REG_PRODUCT_ID => {
                fill(buffer, &PRODUCT_ID);
                Ok(())
            }
            other => Err(ReplayFault::UnknownRegister(other)),
        }
    }

    fn write_register(&mut self, device: u8, register: u16, value: u8) -> Result<(), Self::Error> {
        if device != self.address {
            return Err(ReplayFault::WrongDevice(device));
        }
        if register != REG_STATUS || value != 0 {
            return Err(ReplayFault::UnknownRegister(register));
        }
        self.clear_writes += 1;
        if self.active_frame()?.fails_at(FaultStage::Clear) {
            return Err(ReplayFault::Injected(FaultStage::Clear));
        }
        Ok(())
    }
}
