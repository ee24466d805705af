//! State machine trait for lifecycle enums.
//!
//! Gives every lifecycle enum the same validated transition API so the
//! orchestrator never writes a state without checking the edge first.

use super::ValidationError;

/// Trait for enums that represent a finite state machine.
///
/// Implementors list their edges once; `transition_to` and `is_terminal`
/// are derived from that list.
///
/// # Example
///
/// ```ignore
/// let next = ConversationState::Active.transition_to(ConversationState::EndSuggested)?;
/// assert!(ConversationState::Ended.is_terminal());
/// ```
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Returns true if transition from self to target is valid.
    fn can_transition_to(&self, target: &Self) -> bool;

    /// Returns all valid target states from current state.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Performs the transition if the edge exists.
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

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Gate {
        Open,
        Closing,
        Shut,
    }

    impl StateMachine for Gate {
        fn can_transition_to(&self, target: &Self) -> bool {
            self.valid_transitions().contains(target)
        }

        fn valid_transitions(&self) -> Vec<Self> {
            match self {
                Gate::Open => vec![Gate::Closing],
                Gate::Closing => vec![Gate::Open, Gate::Shut],
                Gate::Shut => vec![],
            }
        }
    }

    #[test]
    fn listed_edge_is_accepted() {
        assert_eq!(Gate::Open.transition_to(Gate::Closing), Ok(Gate::Closing));
    }

    #[test]
    fn unlisted_edge_reports_both_states() {
        let err = Gate::Open.transition_to(Gate::Shut).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Open"));
        assert!(message.contains("Shut"));
    }

    #[test]
    fn state_without_edges_is_terminal() {
        assert!(Gate::Shut.is_terminal());
        assert!(!Gate::Closing.is_terminal());
    }
}
