//! State machine trait for status enums.
//!
//! Gives lifecycle enums a single place to declare their legal transitions
//! and a validated `transition_to` built on top.

use super::ValidationError;

/// Trait for status enums that represent state machines.
///
/// ```ignore
/// let next = SessionStatus::Open.transition_to(SessionStatus::Closed)?;
/// ```
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Returns true if transition from self to target is valid.
    fn can_transition_to(&self, target: &Self) -> bool;

    /// Returns all valid target states from current state.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Performs transition with validation, returning error if invalid.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(ValidationError::invalid_format(
                "state_transition",
                format!("Cannot transition from {:?} to {:?}", self, target),
            ))
        }
    }

    /// Checks if current state is terminal (no valid outgoing transitions).
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::SessionStatus;

    #[test]
    fn can_transition_to_is_consistent_with_valid_transitions() {
        for status in [SessionStatus::Open, SessionStatus::Closed] {
            for target in status.valid_transitions() {
                assert!(
                    status.can_transition_to(&target),
                    "can_transition_to should accept {:?} -> {:?}",
                    status,
                    target
                );
            }
        }
    }

    #[test]
    fn invalid_transition_names_both_states() {
        let err = SessionStatus::Open
            .transition_to(SessionStatus::Open)
            .unwrap_err();
        assert!(err.to_string().contains("Open to Open"));
    }
}
