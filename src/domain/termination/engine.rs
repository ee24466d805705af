//! Termination policy engine.
//!
//! Decides, turn by turn, whether a practice conversation may end. Three
//! pathways share one set of sub-rules (turn floor, coverage, confirmation):
//!
//! - two-phase: `Active` suggests ending once floor and coverage are met,
//!   `EndSuggested` ends on an explicit student confirmation
//! - mutual intent: ends at once when both closure flags are raised
//! - legacy: stateless single-shot check that also requires the end token

use tracing::{debug, info};

use super::closure::ClosureSignals;
use super::coverage::{CoverageAggregator, CoverageMap};
use super::decision::{Decision, DecisionReason};
use super::detectors::{SignalDetectors, DEFAULT_END_TOKEN};
use super::errors::TerminationError;
use super::patterns::PatternCatalog;
use super::trace::{Thresholds, TraceRecord};
use crate::domain::conversation::{
    ConversationContext, ConversationState, Speaker, TerminationTrigger,
};
use crate::domain::foundation::StateMachine;

/// Student turns required before ending may be proposed.
pub const DEFAULT_TURN_FLOOR: u32 = 10;

/// Engine configuration. Built once at startup and passed to the engine.
#[derive(Debug, Clone)]
pub struct PolicyConfig {
    /// Minimum student turns. Zero disables the floor.
    pub turn_floor: u32,
    /// Marker the assistant emits to close the session (legacy pathway).
    pub end_token: String,
    /// Whose turns are scanned for technique coverage.
    pub coverage_speaker: Speaker,
    pub catalog: PatternCatalog,
}

impl PolicyConfig {
    pub fn new(turn_floor: u32, end_token: impl Into<String>) -> Self {
        Self {
            turn_floor,
            end_token: end_token.into(),
            ..Self::default()
        }
    }

    pub fn with_catalog(mut self, catalog: PatternCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_coverage_speaker(mut self, speaker: Speaker) -> Self {
        self.coverage_speaker = speaker;
        self
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            turn_floor: DEFAULT_TURN_FLOOR,
            end_token: DEFAULT_END_TOKEN.to_string(),
            coverage_speaker: Speaker::Assistant,
            catalog: PatternCatalog::default(),
        }
    }
}

/// Outcome of classifying the student's answer to an ending proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Confirmation {
    Confirmed,
    Ambiguous,
    Missing,
}

/// The termination decision engine.
#[derive(Debug, Clone)]
pub struct TerminationEngine {
    detectors: SignalDetectors,
    turn_floor: u32,
    coverage_speaker: Speaker,
}

impl TerminationEngine {
    pub fn new(config: PolicyConfig) -> Self {
        Self {
            detectors: SignalDetectors::new(config.catalog, config.end_token),
            turn_floor: config.turn_floor,
            coverage_speaker: config.coverage_speaker,
        }
    }

    pub fn detectors(&self) -> &SignalDetectors {
        &self.detectors
    }

    pub fn turn_floor(&self) -> u32 {
        self.turn_floor
    }

    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            turn_floor: self.turn_floor,
            end_token: self.detectors.end_token().to_string(),
        }
    }

    pub fn aggregator(&self) -> CoverageAggregator<'_> {
        CoverageAggregator::new(&self.detectors, self.coverage_speaker)
    }

    /// Coverage over the context's full history.
    pub fn coverage(&self, context: &ConversationContext) -> CoverageMap {
        self.aggregator().coverage(context.history())
    }

    /// State-aware entry point.
    ///
    /// Updates the context's state, closure flags and termination trigger.
    pub fn evaluate(
        &self,
        context: &mut ConversationContext,
        latest_assistant_text: &str,
        latest_student_text: Option<&str>,
    ) -> Result<Decision, TerminationError> {
        let student_text = latest_student_text.filter(|t| !t.trim().is_empty());
        let current = context.state();

        if current.is_terminal() {
            return Ok(self.log(context, Decision::end(DecisionReason::AlreadyEnded)));
        }

        if self.observe_mutual_intent(context, latest_assistant_text, student_text) {
            current.transition_to(ConversationState::Ended)?;
            context.finish(TerminationTrigger::MutualIntent);
            info!(
                from = %current,
                turn_count = context.turn_count(),
                "Conversation ended by mutual intent"
            );
            return Ok(self.log(context, Decision::mutual_intent()));
        }

        let decision = match current {
            ConversationState::Active => self.evaluate_active(context)?,
            ConversationState::EndSuggested => self.evaluate_suggested(context, student_text)?,
            ConversationState::Ended => Decision::end(DecisionReason::AlreadyEnded),
        };
        Ok(self.log(context, decision))
    }

    /// Stateless single-shot entry point for callers not using the
    /// two-phase protocol. Never mutates the snapshot.
    ///
    /// Checks, in order: turn floor, coverage, student confirmation, end
    /// token. Returns at the first failing check.
    pub fn evaluate_legacy(
        &self,
        snapshot: &ConversationContext,
        latest_assistant_text: &str,
        latest_student_text: Option<&str>,
    ) -> Result<Decision, TerminationError> {
        let state = snapshot.state();
        if state.is_terminal() {
            return Ok(self.log(snapshot, Decision::end(DecisionReason::AlreadyEnded)));
        }

        let decision = if let Err(reason) = self.readiness(snapshot) {
            Decision::proceed(state, reason)
        } else {
            match self.confirmation(latest_student_text) {
                Confirmation::Missing => {
                    Decision::proceed(state, DecisionReason::ConfirmationMissing)
                }
                Confirmation::Ambiguous => {
                    Decision::proceed(state, DecisionReason::ConfirmationAmbiguous)
                }
                Confirmation::Confirmed
                    if !self.detectors.contains_end_token(latest_assistant_text) =>
                {
                    Decision::proceed(state, DecisionReason::EndTokenMissing)
                }
                Confirmation::Confirmed => Decision::end(DecisionReason::AllConditionsMet),
            }
        };
        Ok(self.log(snapshot, decision))
    }

    /// Builds an audit record for a decision. Never fails.
    pub fn trace(
        &self,
        context: &ConversationContext,
        decision: &Decision,
        extra: Option<serde_json::Value>,
    ) -> TraceRecord {
        TraceRecord::new(
            context,
            self.coverage(context),
            self.thresholds(),
            decision.clone(),
            extra,
        )
    }

    fn evaluate_active(
        &self,
        context: &mut ConversationContext,
    ) -> Result<Decision, TerminationError> {
        if let Err(reason) = self.readiness(context) {
            return Ok(Decision::proceed(ConversationState::Active, reason));
        }

        let next = context.state().transition_to(ConversationState::EndSuggested)?;
        context.set_state(next);
        info!(turn_count = context.turn_count(), "Suggesting conversation end");
        Ok(Decision::suggest())
    }

    fn evaluate_suggested(
        &self,
        context: &mut ConversationContext,
        student_text: Option<&str>,
    ) -> Result<Decision, TerminationError> {
        let Some(reply) = student_text else {
            return Ok(Decision::proceed(
                ConversationState::EndSuggested,
                DecisionReason::AwaitingConfirmation,
            ));
        };

        if self.confirmation(Some(reply)) == Confirmation::Confirmed {
            context.state().transition_to(ConversationState::Ended)?;
            context.finish(TerminationTrigger::MiComplete);
            info!(turn_count = context.turn_count(), "Conversation ended on confirmation");
            return Ok(Decision::end(DecisionReason::ConfirmationReceived));
        }

        let next = context.state().transition_to(ConversationState::Active)?;
        context.set_state(next);
        info!(turn_count = context.turn_count(), "Ending suggestion declined, resuming");
        Ok(Decision::proceed(
            ConversationState::Active,
            DecisionReason::SuggestionDeclined,
        ))
    }

    /// Turn floor first, then coverage. Reports only the first unmet rule.
    fn readiness(&self, context: &ConversationContext) -> Result<(), DecisionReason> {
        let summary = self.aggregator().summarize(context);
        if summary.turn_count < self.turn_floor {
            return Err(DecisionReason::TurnFloorNotMet {
                turn_count: summary.turn_count,
                floor: self.turn_floor,
            });
        }

        if !summary.coverage.is_complete() {
            return Err(DecisionReason::CoverageIncomplete {
                missing: summary.coverage.missing(),
            });
        }
        debug!(
            assistant_turns = summary.assistant_turns,
            student_turns = summary.student_turns,
            "Conversation ready to suggest ending"
        );
        Ok(())
    }

    fn confirmation(&self, student_text: Option<&str>) -> Confirmation {
        match student_text {
            None => Confirmation::Missing,
            Some(text) if self.detectors.is_ambiguous(text) => Confirmation::Ambiguous,
            Some(text) if self.detectors.is_explicit_confirmation(text) => Confirmation::Confirmed,
            Some(_) => Confirmation::Missing,
        }
    }

    /// Raises the persisted closure flags from this exchange and reports
    /// whether both are now set.
    fn observe_mutual_intent(
        &self,
        context: &mut ConversationContext,
        assistant_text: &str,
        student_text: Option<&str>,
    ) -> bool {
        let signals = [
            self.detectors.initiator_acknowledger(),
            self.detectors.closure_satisfaction(),
        ]
        .iter()
        .map(|pair| pair.detect(student_text, Some(assistant_text)))
        .fold(ClosureSignals::default(), ClosureSignals::or);

        if signals.closer {
            context.raise_initiator_end_intent();
        }
        if signals.acknowledger {
            context.raise_counterpart_end_ack();
        }
        context.flags().mutual_intent()
    }

    fn log(&self, context: &ConversationContext, decision: Decision) -> Decision {
        debug!(
            turn_count = context.turn_count(),
            state = %decision.state,
            should_continue = decision.should_continue,
            suggest_ending = decision.suggest_ending,
            mutual_intent = decision.mutual_intent,
            reason = %decision.reason,
            "Termination decision"
        );
        decision
    }
}

impl Default for TerminationEngine {
    fn default() -> Self {
        Self::new(PolicyConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::conversation::Turn;
    use crate::domain::termination::CoverageCategory;

    const END: &str = DEFAULT_END_TOKEN;

    fn engine(floor: u32) -> TerminationEngine {
        TerminationEngine::new(PolicyConfig::new(floor, END))
    }

    /// Assistant turns covering every technique, padded with student turns.
    fn covered_context(student_turns: u32) -> ConversationContext {
        let mut ctx = ConversationContext::new();
        ctx.record_turn(Speaker::Assistant, "What brings you here today?");
        ctx.record_turn(Speaker::Assistant, "It sounds like you're stressed.");
        ctx.record_turn(Speaker::Assistant, "It's your decision in the end.");
        ctx.record_turn(Speaker::Assistant, "To summarize, you want to sleep better.");
        for i in 0..student_turns {
            ctx.record_turn(Speaker::Student, format!("student turn {i}"));
        }
        ctx
    }

    mod two_phase {
        use super::*;

        #[test]
        fn below_floor_stays_active() {
            let engine = engine(10);
            let mut ctx = covered_context(9);
            let decision = engine.evaluate(&mut ctx, "Mm.", Some("I see")).unwrap();

            assert!(decision.should_continue);
            assert_eq!(decision.state, ConversationState::Active);
            assert_eq!(
                decision.reason,
                DecisionReason::TurnFloorNotMet {
                    turn_count: 9,
                    floor: 10
                }
            );
            assert_eq!(ctx.state(), ConversationState::Active);
        }

        #[test]
        fn at_floor_with_coverage_suggests_ending() {
            let engine = engine(10);
            let mut ctx = covered_context(10);
            let decision = engine.evaluate(&mut ctx, "Mm.", Some("I see")).unwrap();

            assert!(decision.should_continue);
            assert!(decision.suggest_ending);
            assert_eq!(decision.state, ConversationState::EndSuggested);
            assert_eq!(ctx.state(), ConversationState::EndSuggested);
            assert!(ctx.confirmation_flag());
        }

        #[test]
        fn floor_is_reported_before_coverage() {
            let engine = engine(5);
            let mut ctx = ConversationContext::new();
            ctx.record_turn(Speaker::Student, "hello");
            let decision = engine.evaluate(&mut ctx, "Hi.", None).unwrap();
            assert!(matches!(decision.reason, DecisionReason::TurnFloorNotMet { .. }));
        }

        #[test]
        fn missing_coverage_is_named() {
            let engine = engine(1);
            let mut ctx = ConversationContext::new();
            ctx.record_turn(Speaker::Assistant, "It sounds like you're stressed.");
            ctx.record_turn(Speaker::Student, "I am.");
            let decision = engine.evaluate(&mut ctx, "Okay.", Some("I am.")).unwrap();

            assert_eq!(
                decision.reason,
                DecisionReason::CoverageIncomplete {
                    missing: vec![
                        CoverageCategory::OpenEndedQuestion,
                        CoverageCategory::AutonomySupport,
                        CoverageCategory::Summary,
                    ]
                }
            );
        }

        #[test]
        fn awaiting_reply_keeps_suggestion() {
            let engine = engine(0);
            let mut ctx = covered_context(0);
            engine.evaluate(&mut ctx, "Shall we stop here?", None).unwrap();

            let decision = engine.evaluate(&mut ctx, "Shall we stop here?", None).unwrap();
            assert_eq!(decision.reason, DecisionReason::AwaitingConfirmation);
            assert_eq!(ctx.state(), ConversationState::EndSuggested);

            let decision = engine.evaluate(&mut ctx, "Shall we stop here?", Some("  ")).unwrap();
            assert_eq!(decision.reason, DecisionReason::AwaitingConfirmation);
        }

        #[test]
        fn explicit_confirmation_ends_conversation() {
            let engine = engine(0);
            let mut ctx = covered_context(0);
            engine.evaluate(&mut ctx, "Shall we stop here?", None).unwrap();

            let decision = engine
                .evaluate(&mut ctx, "Shall we stop here?", Some("Yes, let's end the session"))
                .unwrap();
            assert!(!decision.should_continue);
            assert_eq!(decision.state, ConversationState::Ended);
            assert_eq!(decision.reason, DecisionReason::ConfirmationReceived);
            assert_eq!(ctx.termination_trigger(), Some(TerminationTrigger::MiComplete));
            assert!(!ctx.confirmation_flag());
        }

        #[test]
        fn non_confirmation_reverts_to_active() {
            let engine = engine(0);
            let mut ctx = covered_context(0);
            engine.evaluate(&mut ctx, "Shall we stop here?", None).unwrap();

            let decision = engine
                .evaluate(&mut ctx, "Shall we stop here?", Some("Can you tell me more?"))
                .unwrap();
            assert!(decision.should_continue);
            assert_eq!(decision.state, ConversationState::Active);
            assert_eq!(decision.reason, DecisionReason::SuggestionDeclined);
            assert_eq!(ctx.state(), ConversationState::Active);
            assert!(!ctx.confirmation_flag());
        }

        #[test]
        fn negated_or_conversational_replies_decline() {
            let engine = engine(0);
            for reply in [
                "I don't want to end the session yet",
                "Let's not end the session yet",
                "That's all right",
            ] {
                let mut ctx = covered_context(0);
                engine.evaluate(&mut ctx, "Shall we stop here?", None).unwrap();

                let decision = engine
                    .evaluate(&mut ctx, "Shall we stop here?", Some(reply))
                    .unwrap();
                assert!(decision.should_continue, "{reply:?} ended the conversation");
                assert_eq!(decision.state, ConversationState::Active);
                assert_eq!(decision.reason, DecisionReason::SuggestionDeclined);
                assert_eq!(ctx.termination_trigger(), None);
            }
        }

        #[test]
        fn ambiguous_reply_does_not_confirm() {
            let engine = engine(0);
            let mut ctx = covered_context(0);
            engine.evaluate(&mut ctx, "Shall we stop here?", None).unwrap();

            let decision = engine.evaluate(&mut ctx, "Shall we stop here?", Some("okay")).unwrap();
            assert!(decision.should_continue);
            assert_eq!(ctx.state(), ConversationState::Active);
        }

        #[test]
        fn ended_is_absorbing() {
            let engine = engine(0);
            let mut ctx = covered_context(0);
            engine.evaluate(&mut ctx, "Shall we stop?", None).unwrap();
            engine.evaluate(&mut ctx, "Shall we stop?", Some("I'm done")).unwrap();
            assert_eq!(ctx.state(), ConversationState::Ended);

            for reply in [Some("wait, one more thing"), None, Some("Can you tell me more?")] {
                let decision = engine.evaluate(&mut ctx, "Hello again", reply).unwrap();
                assert!(!decision.should_continue);
                assert_eq!(decision.state, ConversationState::Ended);
                assert_eq!(decision.reason, DecisionReason::AlreadyEnded);
            }
            assert_eq!(ctx.termination_trigger(), Some(TerminationTrigger::MiComplete));
        }
    }

    mod mutual_intent {
        use super::*;

        #[test]
        fn short_farewell_exchange_ends_immediately() {
            let engine = engine(10);
            let mut ctx = ConversationContext::new();
            ctx.record_turn(Speaker::Student, "Just wanted to say thanks, bye!");
            ctx.record_turn(Speaker::Assistant, "You're welcome! Goodbye!");

            let decision = engine
                .evaluate(
                    &mut ctx,
                    "You're welcome! Goodbye!",
                    Some("Just wanted to say thanks, bye!"),
                )
                .unwrap();

            assert!(!decision.should_continue);
            assert!(decision.mutual_intent);
            assert_eq!(decision.state, ConversationState::Ended);
            assert_eq!(ctx.termination_trigger(), Some(TerminationTrigger::MutualIntent));
        }

        #[test]
        fn everyday_phrasing_raises_no_flags() {
            let engine = engine(10);
            let mut ctx = ConversationContext::new();
            let assistant = "I have to take care of my mother every evening.";
            let student = "That's all right, tell me more about that.";
            ctx.record_turn(Speaker::Assistant, assistant);
            ctx.record_turn(Speaker::Student, student);

            let decision = engine.evaluate(&mut ctx, assistant, Some(student)).unwrap();
            assert!(decision.should_continue);
            assert!(!decision.mutual_intent);
            assert_eq!(decision.state, ConversationState::Active);
            assert!(!ctx.initiator_end_intent());
            assert!(!ctx.counterpart_end_ack());
        }

        #[test]
        fn flags_may_be_raised_on_different_turns() {
            let engine = engine(10);
            let mut ctx = ConversationContext::new();

            let first = engine
                .evaluate(
                    &mut ctx,
                    "I have to think about it.",
                    Some("I think I'm all set for today"),
                )
                .unwrap();
            assert!(first.should_continue);
            assert!(ctx.initiator_end_intent());
            assert!(!ctx.counterpart_end_ack());

            let second = engine
                .evaluate(&mut ctx, "Glad I could help, take care.", Some("Let me check my notes"))
                .unwrap();
            assert!(!second.should_continue);
            assert!(second.mutual_intent);
        }

        #[test]
        fn flags_never_reset_within_conversation() {
            let engine = engine(10);
            let mut ctx = ConversationContext::new();
            engine.evaluate(&mut ctx, "Goodbye!", Some("What do you mean?")).unwrap();
            engine.evaluate(&mut ctx, "Hmm.", Some("Tell me about work")).unwrap();
            assert!(ctx.counterpart_end_ack());
            assert!(!ctx.initiator_end_intent());
        }

        #[test]
        fn ambiguous_student_filler_does_not_raise_intent() {
            let engine = engine(10);
            let mut ctx = ConversationContext::new();
            let decision = engine.evaluate(&mut ctx, "You're welcome!", Some("thanks")).unwrap();
            assert!(decision.should_continue);
            assert!(!ctx.initiator_end_intent());
            assert!(ctx.counterpart_end_ack());
        }

        #[test]
        fn closure_satisfaction_pair_also_ends() {
            let engine = engine(10);
            let mut ctx = ConversationContext::new();
            let decision = engine
                .evaluate(
                    &mut ctx,
                    "That answers my questions, I feel better.",
                    Some("Do you have any other questions?"),
                )
                .unwrap();
            assert!(!decision.should_continue);
            assert!(decision.mutual_intent);
        }

        #[test]
        fn fast_path_applies_while_end_suggested() {
            let engine = engine(0);
            let mut ctx = covered_context(0);
            engine.evaluate(&mut ctx, "Shall we stop?", None).unwrap();

            let decision = engine
                .evaluate(&mut ctx, "You're welcome, goodbye!", Some("Thanks so much, bye"))
                .unwrap();
            assert!(decision.mutual_intent);
            assert_eq!(ctx.termination_trigger(), Some(TerminationTrigger::MutualIntent));
        }
    }

    mod legacy {
        use super::*;

        #[test]
        fn all_conditions_met_may_end() {
            let engine = engine(3);
            let ctx = covered_context(3);
            let decision = engine
                .evaluate_legacy(&ctx, &format!("Take care. {END}"), Some("I'm done"))
                .unwrap();
            assert!(!decision.should_continue);
            assert_eq!(decision.reason, DecisionReason::AllConditionsMet);
        }

        #[test]
        fn checks_run_in_order() {
            let engine = engine(3);

            let decision = engine
                .evaluate_legacy(&covered_context(2), END, Some("I'm done"))
                .unwrap();
            assert!(matches!(decision.reason, DecisionReason::TurnFloorNotMet { .. }));

            let bare = ConversationContext::from_history(vec![
                Turn::student("a"),
                Turn::student("b"),
                Turn::student("c"),
            ]);
            let decision = engine.evaluate_legacy(&bare, END, Some("I'm done")).unwrap();
            assert!(matches!(decision.reason, DecisionReason::CoverageIncomplete { .. }));

            let decision = engine
                .evaluate_legacy(&covered_context(3), END, Some("Tell me more"))
                .unwrap();
            assert_eq!(decision.reason, DecisionReason::ConfirmationMissing);

            let decision = engine
                .evaluate_legacy(&covered_context(3), "Bye.", Some("I'm done"))
                .unwrap();
            assert_eq!(decision.reason, DecisionReason::EndTokenMissing);
        }

        #[test]
        fn ambiguous_confirmation_is_reported() {
            let engine = engine(0);
            let decision = engine
                .evaluate_legacy(&covered_context(0), END, Some("ok"))
                .unwrap();
            assert_eq!(decision.reason, DecisionReason::ConfirmationAmbiguous);
            assert!(decision.should_continue);
        }

        #[test]
        fn does_not_mutate_and_is_idempotent() {
            let engine = engine(0);
            let ctx = covered_context(0);
            let before = ctx.clone();

            let first = engine.evaluate_legacy(&ctx, END, Some("let's stop")).unwrap();
            let second = engine.evaluate_legacy(&ctx, END, Some("let's stop")).unwrap();

            assert_eq!(first, second);
            assert_eq!(ctx, before);
        }

        #[test]
        fn ignores_mutual_intent() {
            let engine = engine(10);
            let ctx = ConversationContext::new();
            let decision = engine
                .evaluate_legacy(&ctx, "You're welcome! Goodbye!", Some("thanks, bye!"))
                .unwrap();
            assert!(decision.should_continue);
            assert!(!decision.mutual_intent);
        }
    }

    mod trace {
        use super::*;

        #[test]
        fn trace_records_thresholds_and_coverage() {
            let engine = engine(4);
            let mut ctx = covered_context(1);
            let decision = engine.evaluate(&mut ctx, "Mm.", Some("yes")).unwrap();

            let record = engine.trace(&ctx, &decision, None);
            assert_eq!(record.turn_count, 1);
            assert_eq!(record.thresholds.turn_floor, 4);
            assert_eq!(record.thresholds.end_token, END);
            assert!(record.coverage.is_complete());
            assert_eq!(record.decision, decision);
        }
    }
}
