/// Lifecycle of a training session.
///
/// ```text
/// Idle -> StepInFlight -> StepComplete -> Idle ...
///   |                          |
///   +-> Cancelled / Finished <-+
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionState {
    Idle,
    StepInFlight { step: u64, batch: usize },
    StepComplete { step: u64, batch: usize, loss: f32 },
    Finished,
    Cancelled,
}

impl SessionState {
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Finished | SessionState::Cancelled)
    }

    /// Whether `next` is a legal successor of this state.
    pub fn can_become(&self, next: &SessionState) -> bool {
        use SessionState::*;

        match (self, next) {
            (Idle, StepInFlight { .. } | Finished | Cancelled) => true,
            (StepInFlight { step, batch }, StepComplete { step: s, batch: b, .. }) => {
                step == s && batch == b
            }
            (StepComplete { .. }, Idle | Finished | Cancelled) => true,
            _ => false,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::StepInFlight { .. } => "step_in_flight",
            SessionState::StepComplete { .. } => "step_complete",
            SessionState::Finished => "finished",
            SessionState::Cancelled => "cancelled",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_cycle_is_legal() {
        let idle = SessionState::Idle;
        let flight = SessionState::StepInFlight { step: 0, batch: 3 };
        let done = SessionState::StepComplete {
            step: 0,
            batch: 3,
            loss: 1.0,
        };

        assert!(idle.can_become(&flight));
        assert!(flight.can_become(&done));
        assert!(done.can_become(&idle));
        assert!(done.can_become(&SessionState::Cancelled));
    }

    #[test]
    fn in_flight_step_cannot_be_skipped() {
        let flight = SessionState::StepInFlight { step: 2, batch: 0 };

        assert!(!flight.can_become(&SessionState::Idle));
        assert!(!flight.can_become(&SessionState::Cancelled));
        assert!(!flight.can_become(&SessionState::StepComplete {
            step: 3,
            batch: 0,
            loss: 0.0
        }));
    }

    #[test]
    fn terminal_states_stay_terminal() {
        for end in [SessionState::Finished, SessionState::Cancelled] {
            assert!(end.is_terminal());
            assert!(!end.can_become(&SessionState::Idle));
        }
        assert!(!SessionState::Idle.is_terminal());
    }
}
