/// Why a poll was discarded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FaultKind {
    /// The status read, clear write or coordinate read failed on the bus.
    Bus,
    /// The controller reported more points than it can track.
    TooManyPoints,
    /// The coordinate fell outside the screen after the axis swap.
    OutOfRange,
}

impl FaultKind {
    pub const fn is_malformed(self) -> bool {
        matches!(self, Self::TooManyPoints | Self::OutOfRange)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Bus => "bus",
            Self::TooManyPoints => "too_many_points",
            Self::OutOfRange => "out_of_range",
        }
    }
}

/// Running counters for a driver instance. Polls that faulted never reach the
/// gesture classifier, so these are the only trace they leave.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TouchDiagnostics {
    pub polls: u32,
    pub bus_faults: u32,
    pub malformed_samples: u32,
    /// Consecutive faulted polls, reset by the next clean one.
    pub fault_streak: u16,
    pub last_fault: Option<FaultKind>,
}

impl TouchDiagnostics {
    pub(crate) fn record_poll(&mut self) {
        self.polls = self.polls.wrapping_add(1);
    }

    /// Returns the streak length including this fault.
    pub(crate) fn record_fault(&mut self, kind: FaultKind) -> u16 {
        if kind.is_malformed() {
            self.malformed_samples = self.malformed_samples.saturating_add(1);
        } else {
            self.bus_faults = self.bus_faults.saturating_add(1);
        }
        self.fault_streak = self.fault_streak.saturating_add(1);
        self.last_fault = Some(kind);
        self.fault_streak
    }

    /// Ends the current streak. Returns its length if there was one.
    pub(crate) fn record_clean(&mut self) -> Option<u16> {
        let streak = core::mem::take(&mut self.fault_streak);
        (streak > 0).then_some(streak)
    }

    pub fn total_faults(&self) -> u32 {
        self.bus_faults.saturating_add(self.malformed_samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn faults_are_split_by_kind_and_streak_resets_on_clean_poll() {
        let mut diag = TouchDiagnostics::default();
        assert_eq!(diag.record_fault(FaultKind::Bus), 1);
        assert_eq!(diag.record_fault(FaultKind::OutOfRange), 2);
        assert_eq!(diag.record_fault(FaultKind::TooManyPoints), 3);
        assert_eq!(diag.bus_faults, 1);
        assert_eq!(diag.malformed_samples, 2);
        assert_eq!(diag.total_faults(), 3);
        assert_eq!(diag.last_fault, Some(FaultKind::TooManyPoints));

        assert_eq!(diag.record_clean(), Some(3));
        assert_eq!(diag.fault_streak, 0);
        assert_eq!(diag.record_clean(), None);
        assert_eq!(diag.last_fault, Some(FaultKind::TooManyPoints));
    }
}
