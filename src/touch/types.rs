/// Contact position in display space (after the axis transform).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TouchPoint {
    pub x: u16,
    pub y: u16,
}

impl TouchPoint {
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }
}

/// The single event a poll of the driver produces.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Gesture {
    #[default]
    None,
    Tap {
        x: u16,
        y: u16,
    },
    LongPress {
        x: u16,
        y: u16,
    },
    Drag {
        x: u16,
        y: u16,
    },
}

impl Gesture {
    pub const fn is_none(self) -> bool {
        matches!(self, Self::None)
    }

    pub const fn point(self) -> Option<TouchPoint> {
        match self {
            Self::None => None,
            Self::Tap { x, y } | Self::LongPress { x, y } | Self::Drag { x, y } => {
                Some(TouchPoint { x, y })
            }
        }
    }

    pub const fn kind_label(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Tap { .. } => "tap",
            Self::LongPress { .. } => "long_press",
            Self::Drag { .. } => "drag",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GesturePhase {
    #[default]
    Idle,
    Pressing,
    Dragging,
    ReleasePending,
}

/// Snapshot of the classifier's press-cycle bookkeeping.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GestureState {
    pub phase: GesturePhase,
    pub pressed: bool,
    pub press_started_at: u64,
    pub last_active_at: u64,
    pub anchor: Option<TouchPoint>,
    pub last: TouchPoint,
    pub was_dragging: bool,
    pub dropouts_absorbed: u16,
}

/// A polled contact reading with the time it was taken.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TimedSample {
    pub now_ms: u64,
    pub contact: Option<TouchPoint>,
}
