//! Termination policy handlers.

mod evaluate_turn;

pub use evaluate_turn::{
    EvaluateTurnCommand, EvaluateTurnHandler, EvaluateTurnResult, Pathway,
};
