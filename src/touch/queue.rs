//! Interrupt-fed sample path. The interrupt side only enqueues timestamped
//! contacts; classification stays with whoever drains the queue.

use heapless::spsc::{Consumer, Producer, Queue};

use super::{
    core::GestureEngine,
    types::{Gesture, TimedSample, TouchPoint},
};
use crate::platform::MonotonicClock;

/// Holds `N - 1` samples.
pub struct SampleQueue<const N: usize> {
    queue: Queue<TimedSample, N>,
}

impl<const N: usize> Default for SampleQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> SampleQueue<N> {
    pub const fn new() -> Self {
        Self {
            queue: Queue::new(),
        }
    }

    pub fn split(&mut self) -> (SampleProducer<'_, N>, SampleConsumer<'_, N>) {
        let (producer, consumer) = self.queue.split();
        (
            SampleProducer {
                inner: producer,
                dropped: 0,
            },
            SampleConsumer { inner: consumer },
        )
    }
}

pub struct SampleProducer<'q, const N: usize> {
    inner: Producer<'q, TimedSample, N>,
    dropped: u32,
}

impl<const N: usize> SampleProducer<'_, N> {
    /// Returns `false` and counts the sample as dropped when the queue is full.
    pub fn push(&mut self, now_ms: u64, contact: Option<TouchPoint>) -> bool {
        match self.inner.enqueue(TimedSample { now_ms, contact }) {
            Ok(()) => true,
            Err(_) => {
                self.dropped = self.dropped.saturating_add(1);
                false
            }
        }
    }

    pub fn dropped(&self) -> u32 {
        self.dropped
    }
}

pub struct SampleConsumer<'q, const N: usize> {
    inner: Consumer<'q, TimedSample, N>,
}

impl<const N: usize> SampleConsumer<'_, N> {
    pub fn pop(&mut self) -> Option<TimedSample> {
        self.inner.dequeue()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Classifies queued samples one per call. An empty queue reads as "not
/// pressed" at the current time so a pending release still gets confirmed.
pub struct QueuedGestures<'q, CLK, const N: usize> {
    consumer: SampleConsumer<'q, N>,
    engine: GestureEngine,
    clock: CLK,
}

impl<'q, CLK, const N: usize> QueuedGestures<'q, CLK, N>
where
    CLK: MonotonicClock,
{
    pub fn new(consumer: SampleConsumer<'q, N>, engine: GestureEngine, clock: CLK) -> Self {
        Self {
            consumer,
            engine,
            clock,
        }
    }

    pub fn step(&mut self) -> Gesture {
        match self.consumer.pop() {
            Some(sample) => self.engine.tick(sample.now_ms, sample.contact),
            None => self.engine.tick(self.clock.now_ms(), None),
        }
    }

    pub fn engine(&self) -> &GestureEngine {
        &self.engine
    }

    pub fn pending(&self) -> usize {
        self.consumer.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{platform::ManualClock, touch::config::GestureThresholds};

    fn engine() -> GestureEngine {
        GestureEngine::new(GestureThresholds {
            drag_min_distance_px: 2,
            release_grace_ms: 100,
            long_press_ms: 2000,
            noise_floor_ms: 30,
        })
    }

    #[test]
    fn full_queue_drops_and_counts() {
        let mut queue: SampleQueue<4> = SampleQueue::new();
        let (mut producer, consumer) = queue.split();
        for t in 0..3 {
            assert!(producer.push(t, None));
        }
        assert!(!producer.push(3, None));
        assert_eq!(producer.dropped(), 1);
        assert_eq!(consumer.len(), 3);
    }

    #[test]
    fn queued_press_is_classified_and_empty_queue_confirms_release() {
        let mut queue: SampleQueue<8> = SampleQueue::new();
        let (mut producer, consumer) = queue.split();
        let clock = ManualClock::new(0);
        let mut gestures = QueuedGestures::new(consumer, engine(), &clock);

        producer.push(0, Some(TouchPoint::new(40, 40)));
        producer.push(20, Some(TouchPoint::new(40, 40)));
        producer.push(80, Some(TouchPoint::new(41, 40)));
        assert_eq!(gestures.pending(), 3);

        for _ in 0..3 {
            assert_eq!(gestures.step(), Gesture::None);
        }
        assert!(gestures.engine().state().pressed);

        // Interrupt line quiet: nothing queued, release advances on the clock.
        clock.set(150);
        assert_eq!(gestures.step(), Gesture::None);
        clock.set(181);
        assert_eq!(gestures.step(), Gesture::Tap { x: 41, y: 40 });
        assert!(!gestures.engine().state().pressed);
    }

    #[test]
    fn queued_drag_steps_come_out_in_order() {
        let mut queue: SampleQueue<8> = SampleQueue::new();
        let (mut producer, consumer) = queue.split();
        let clock = ManualClock::new(0);
        let mut gestures = QueuedGestures::new(consumer, engine(), &clock);

        producer.push(0, Some(TouchPoint::new(0, 0)));
        producer.push(10, Some(TouchPoint::new(10, 0)));
        producer.push(20, Some(TouchPoint::new(20, 0)));

        assert_eq!(gestures.step(), Gesture::None);
        assert_eq!(gestures.step(), Gesture::Drag { x: 10, y: 0 });
        assert_eq!(gestures.step(), Gesture::Drag { x: 20, y: 0 });
    }
}
