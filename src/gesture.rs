use crate::{
    platform::{MonotonicClock, RegisterBus},
    touch::{Gesture, QueuedGestures, TouchDriver},
};

/// Something that yields one classified gesture per call. Consumers take this
/// instead of reaching for a driver instance directly.
pub trait GestureSource {
    fn next_gesture(&mut self) -> Gesture;
}

impl<T: GestureSource + ?Sized> GestureSource for &mut T {
    fn next_gesture(&mut self) -> Gesture {
        (**self).next_gesture()
    }
}

impl<BUS, CLK, IRQ> GestureSource for TouchDriver<BUS, CLK, IRQ>
where
    BUS: RegisterBus,
    CLK: MonotonicClock,
{
    fn next_gesture(&mut self) -> Gesture {
        self.read()
    }
}

impl<CLK, const N: usize> GestureSource for QueuedGestures<'_, CLK, N>
where
    CLK: MonotonicClock,
{
    fn next_gesture(&mut self) -> Gesture {
        self.step()
    }
}
