use statig::{blocking::IntoStateMachineExt as _, prelude::*};

use super::{
    config::GestureThresholds,
    types::{Gesture, GesturePhase, GestureState, TouchPoint},
};

#[derive(Clone, Copy, Debug)]
enum GestureHsmEvent {
    Sample {
        now_ms: u64,
        contact: Option<TouchPoint>,
    },
}

#[derive(Clone, Copy, Debug, Default)]
struct DispatchContext {
    gesture: Gesture,
}

impl DispatchContext {
    fn emit(&mut self, gesture: Gesture) {
        self.gesture = gesture;
    }
}

/// Press/drag/release classifier. Feed it one contact reading per poll.
pub struct GestureEngine {
    machine: statig::blocking::StateMachine<GestureHsm>,
}

impl Default for GestureEngine {
    fn default() -> Self {
        Self::new(GestureThresholds::default())
    }
}

impl GestureEngine {
    pub fn new(thresholds: GestureThresholds) -> Self {
        Self {
            machine: GestureHsm::new(thresholds).state_machine(),
        }
    }

    pub fn tick(&mut self, now_ms: u64, contact: Option<TouchPoint>) -> Gesture {
        let mut context = DispatchContext::default();
        self.machine
            .handle_with_context(&GestureHsmEvent::Sample { now_ms, contact }, &mut context);
        context.gesture
    }

    pub fn state(&self) -> GestureState {
        self.machine.inner().state
    }

    pub fn thresholds(&self) -> GestureThresholds {
        self.machine.inner().thresholds
    }

    /// Drops any press in progress without reporting it.
    pub fn reset(&mut self) {
        *self = Self::new(self.thresholds());
    }
}

struct GestureHsm {
    thresholds: GestureThresholds,
    state: GestureState,
}

impl GestureHsm {
    fn new(thresholds: GestureThresholds) -> Self {
        Self {
            thresholds,
            state: GestureState::default(),
        }
    }

    fn begin_press(&mut self, now_ms: u64, point: TouchPoint) {
        self.state = GestureState {
            phase: GesturePhase::Pressing,
            pressed: true,
            press_started_at: now_ms,
            last_active_at: now_ms,
            anchor: Some(point),
            last: point,
            was_dragging: false,
            dropouts_absorbed: 0,
        };
    }

    /// Records a continuing contact and returns a drag step when it moved past
    /// the threshold on either axis. The anchor only follows reported steps.
    fn track_contact(&mut self, now_ms: u64, point: TouchPoint) -> Option<Gesture> {
        self.state.last = point;
        self.state.last_active_at = now_ms;

        let anchor = self.state.anchor.unwrap_or(point);
        let limit = self.thresholds.drag_min_distance_px;
        if point.x.abs_diff(anchor.x) > limit || point.y.abs_diff(anchor.y) > limit {
            self.state.anchor = Some(point);
            self.state.was_dragging = true;
            Some(Gesture::Drag {
                x: point.x,
                y: point.y,
            })
        } else {
            None
        }
    }

    fn release_confirmed(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.state.last_active_at) > self.thresholds.release_grace_ms
    }

    fn finish_press(&mut self) -> Gesture {
        // Held time ends at the last pressed sample; the grace window is not part of it.
        let held_ms = self
            .state
            .last_active_at
            .saturating_sub(self.state.press_started_at);
        let last = self.state.last;

        let gesture = if self.state.was_dragging {
            Gesture::None
        } else if held_ms >= self.thresholds.long_press_ms {
            Gesture::LongPress {
                x: last.x,
                y: last.y,
            }
        } else if held_ms > self.thresholds.noise_floor_ms {
            Gesture::Tap {
                x: last.x,
                y: last.y,
            }
        } else {
            Gesture::None
        };

        self.state = GestureState {
            last,
            ..GestureState::default()
        };
        gesture
    }
}

#[state_machine(initial = "State::idle()")]
impl GestureHsm {
    #[state]
    fn idle(&mut self, context: &mut DispatchContext, event: &GestureHsmEvent) -> Outcome<State> {
        let _ = context;
        match event {
            GestureHsmEvent::Sample {
                now_ms,
                contact: Some(point),
            } => {
                self.begin_press(*now_ms, *point);
                Transition(State::pressing())
            }
            GestureHsmEvent::Sample { contact: None, .. } => Handled,
        }
    }

    #[state(superstate = "contact")]
    fn pressing(
        &mut self,
        context: &mut DispatchContext,
        event: &GestureHsmEvent,
    ) -> Outcome<State> {
        match event {
            GestureHsmEvent::Sample {
                now_ms,
                contact: Some(point),
            } => match self.track_contact(*now_ms, *point) {
                Some(step) => {
                    context.emit(step);
                    self.state.phase = GesturePhase::Dragging;
                    Transition(State::dragging())
                }
                None => Handled,
            },
            GestureHsmEvent::Sample { contact: None, .. } => Super,
        }
    }

    #[state(superstate = "contact")]
    fn dragging(
        &mut self,
        context: &mut DispatchContext,
        event: &GestureHsmEvent,
    ) -> Outcome<State> {
        match event {
            GestureHsmEvent::Sample {
                now_ms,
                contact: Some(point),
            } => {
                if let Some(step) = self.track_contact(*now_ms, *point) {
                    context.emit(step);
                }
                Handled
            }
            GestureHsmEvent::Sample { contact: None, .. } => Super,
        }
    }

    /// Contact dropped out but the grace window has not run out yet. The press
    /// keeps its start time and anchor if contact comes back.
    #[state(superstate = "contact")]
    fn release_pending(
        &mut self,
        context: &mut DispatchContext,
        event: &GestureHsmEvent,
    ) -> Outcome<State> {
        match event {
            GestureHsmEvent::Sample {
                now_ms,
                contact: Some(point),
            } => {
                if let Some(step) = self.track_contact(*now_ms, *point) {
                    context.emit(step);
                }
                if self.state.was_dragging {
                    self.state.phase = GesturePhase::Dragging;
                    Transition(State::dragging())
                } else {
                    self.state.phase = GesturePhase::Pressing;
                    Transition(State::pressing())
                }
            }
            GestureHsmEvent::Sample { contact: None, .. } => Super,
        }
    }

    #[superstate]
    fn contact(&mut self, context: &mut DispatchContext, event: &GestureHsmEvent) -> Outcome<State> {
        match event {
            GestureHsmEvent::Sample {
                now_ms,
                contact: None,
            } => {
                if self.release_confirmed(*now_ms) {
                    context.emit(self.finish_press());
                    return Transition(State::idle());
                }
                self.state.dropouts_absorbed = self.state.dropouts_absorbed.saturating_add(1);
                if self.state.phase == GesturePhase::ReleasePending {
                    Handled
                } else {
                    self.state.phase = GesturePhase::ReleasePending;
                    Transition(State::release_pending())
                }
            }
            GestureHsmEvent::Sample { contact: Some(_), .. } => Handled,
        }
    }
}
