//! Counters collected while a session coordinates a scope.
//!
//! Exposed so the checker can surface batching behaviour in its performance
//! reports; nothing in the protocol reads these values back.

use crate::resolution::OutcomeTag;
use serde::Serialize;

/// Telemetry collected by a batched inference session.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct SessionTelemetry {
    pub partial_outcomes: usize,
    pub completed_outcomes: usize,
    pub error_outcomes: usize,
    /// Completions answered with "defer" while the scope was still active.
    pub deferred_completions: usize,
    /// Outcomes dropped because they arrived after the scope began closing.
    pub rejected_outcomes: usize,
    /// Outcomes dropped because their call site was already logged.
    pub duplicate_outcomes: usize,
    /// Times the session asked for stub substitution instead of blocking.
    pub stub_queries: usize,
    pub postponed_queries: usize,
    /// Postponed queries re-issued after an earlier absent answer.
    pub postponed_retries: usize,
    /// Postponed queries for lambdas that were never registered.
    pub uninitialized_lambda_queries: usize,
    /// Repeated registrations of an already-registered lambda.
    pub duplicate_initializations: usize,
}

impl SessionTelemetry {
    pub fn record_outcome(&mut self, tag: OutcomeTag) {
        match tag {
            OutcomeTag::Partial => self.partial_outcomes += 1,
            OutcomeTag::Completed => self.completed_outcomes += 1,
            OutcomeTag::Error => self.error_outcomes += 1,
        }
    }

    /// Number of outcomes folded into the log across all tags.
    pub fn logged_outcomes(&self) -> usize {
        self.partial_outcomes + self.completed_outcomes + self.error_outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_outcome_distributes_by_tag() {
        let mut telemetry = SessionTelemetry::default();
        telemetry.record_outcome(OutcomeTag::Partial);
        telemetry.record_outcome(OutcomeTag::Partial);
        telemetry.record_outcome(OutcomeTag::Error);
        assert_eq!(telemetry.partial_outcomes, 2);
        assert_eq!(telemetry.error_outcomes, 1);
        assert_eq!(telemetry.logged_outcomes(), 3);
    }
}
