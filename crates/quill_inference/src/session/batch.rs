//! Batched session for scopes whose calls must share constraint state.

use super::InferenceSession;
use crate::config::BatchSessionConfig;
use crate::constraint::ConstraintStore;
use crate::diagnostics::DiagnosticsSink;
use crate::resolution::{
    AtomId, CallId, CallOutcome, CompletedCallInfo, ErrorCallInfo, LambdaAtom, LambdaId,
    PartialCallInfo, ResolutionCandidate, ResolvedAtom,
};
use crate::solver::{CompletionMode, PostponedVariableSolver, Substitution};
use crate::telemetry::SessionTelemetry;
use rustc_hash::{FxHashMap, FxHashSet};
use std::cell::RefCell;
use std::collections::hash_map::Entry;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use tracing::debug;

/// Lifecycle of a batched scope, driven exclusively by the scope owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Accepting outcomes and answering policy queries.
    Active,
    /// Scope closing: completion runs, no new outcomes are accepted.
    Finalizing,
    /// Results handed to the scope owner; the session is spent.
    Closed,
}

impl Default for SessionPhase {
    fn default() -> Self {
        SessionPhase::Active
    }
}

/// Error surfaced when the scope owner misdrives the lifecycle.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("inference scope is still active; finalize it before closing")]
    ScopeStillActive,
}

/// Everything a closed scope hands back to its owner.
#[derive(Debug)]
pub struct BatchSessionReport {
    /// Outcome log in exactly the order the driver recorded outcomes.
    pub log: Vec<CallOutcome>,
    /// Merged constraints of every logged outcome.
    pub constraints: ConstraintStore,
    /// Substitutions of the lambdas whose postponed variables were resolved.
    pub substitutions: BTreeMap<LambdaId, Substitution>,
    pub telemetry: SessionTelemetry,
    pub phase: SessionPhase,
}

#[derive(Debug)]
struct LambdaRegistration {
    atom: LambdaAtom,
    resolved: Option<Substitution>,
    attempts: u32,
}

#[derive(Debug, Default)]
struct BatchState {
    phase: SessionPhase,
    log: Vec<CallOutcome>,
    seen_calls: FxHashSet<CallId>,
    merged: ConstraintStore,
    lambdas: FxHashMap<LambdaId, LambdaRegistration>,
    claimed_atoms: FxHashSet<AtomId>,
    telemetry: SessionTelemetry,
}

/// Session holding the ordered outcome log and merged constraints for one
/// scope of interdependent calls, such as a builder-style chained-call block.
///
/// While the scope is [`Active`](SessionPhase::Active) the session defers
/// completion so constraints from later calls can still narrow earlier ones;
/// once the owner calls [`begin_finalize`](Self::begin_finalize) completion
/// runs normally and pending lambda inferences are resolved against the full
/// merged store. The owner ends the scope with [`close`](Self::close).
pub struct BatchInferenceSession<'p> {
    parent: Option<&'p dyn InferenceSession>,
    config: BatchSessionConfig,
    state: RefCell<BatchState>,
}

impl<'p> BatchInferenceSession<'p> {
    /// Root session for a scope with no enclosing batched scope.
    pub fn new(config: BatchSessionConfig) -> Self {
        Self {
            parent: None,
            config,
            state: RefCell::new(BatchState::default()),
        }
    }

    /// Session nested inside `parent`. The borrow guarantees the parent was
    /// created earlier and outlives this child, which keeps every chain
    /// finite and acyclic.
    pub fn nested(config: BatchSessionConfig, parent: &'p dyn InferenceSession) -> Self {
        Self {
            parent: Some(parent),
            ..Self::new(config)
        }
    }

    pub fn config(&self) -> BatchSessionConfig {
        self.config
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.borrow().phase
    }

    /// Snapshot of the counters collected so far.
    pub fn telemetry(&self) -> SessionTelemetry {
        self.state.borrow().telemetry.clone()
    }

    /// Atoms the session claimed via `call_completed`, in deterministic
    /// order; the owner completes these during the scope-close pass.
    pub fn claimed_atoms(&self) -> Vec<AtomId> {
        let state = self.state.borrow();
        let mut atoms: Vec<AtomId> = state.claimed_atoms.iter().copied().collect();
        atoms.sort_by_key(|atom| atom.to_raw());
        atoms
    }

    /// Stops accepting outcomes; completion queries answer "run" from here
    /// on. Idempotent.
    pub fn begin_finalize(&self) {
        let mut state = self.state.borrow_mut();
        if state.phase == SessionPhase::Active {
            state.phase = SessionPhase::Finalizing;
            debug!(
                outcomes = state.log.len(),
                lambdas = state.lambdas.len(),
                "finalizing inference scope"
            );
        }
    }

    /// Ends the scope and hands its results to the owner.
    ///
    /// The scope must have been finalized first; closing an active scope is
    /// the one lifecycle misuse reported as an error instead of being
    /// absorbed, because it would silently discard the deferred completions.
    pub fn close(self) -> Result<BatchSessionReport, SessionError> {
        let state = self.state.into_inner();
        if state.phase == SessionPhase::Active {
            return Err(SessionError::ScopeStillActive);
        }
        debug!(outcomes = state.log.len(), "closing inference scope");
        let substitutions = state
            .lambdas
            .into_iter()
            .filter_map(|(id, registration)| {
                registration.resolved.map(|substitution| (id, substitution))
            })
            .collect();
        Ok(BatchSessionReport {
            log: state.log,
            constraints: state.merged,
            substitutions,
            telemetry: state.telemetry,
            phase: SessionPhase::Closed,
        })
    }

    fn push_outcome(&self, outcome: CallOutcome) {
        let mut state = self.state.borrow_mut();
        if state.phase != SessionPhase::Active {
            state.telemetry.rejected_outcomes += 1;
            debug!(
                call = outcome.call().to_raw(),
                tag = %outcome.tag(),
                "dropping outcome recorded after the scope began closing"
            );
            return;
        }
        if !state.seen_calls.insert(outcome.call()) {
            state.telemetry.duplicate_outcomes += 1;
            debug!(
                call = outcome.call().to_raw(),
                "dropping second outcome for an already-logged call site"
            );
            return;
        }
        state.merged = state.merged.merge(outcome.constraints());
        state.telemetry.record_outcome(outcome.tag());
        state.log.push(outcome);
    }
}

impl InferenceSession for BatchInferenceSession<'_> {
    fn parent(&self) -> Option<&dyn InferenceSession> {
        self.parent
    }

    fn should_run_completion(&self, candidate: &ResolutionCandidate) -> bool {
        let mut state = self.state.borrow_mut();
        if state.phase == SessionPhase::Active {
            state.telemetry.deferred_completions += 1;
            debug!(
                call = candidate.call().to_raw(),
                callee = %candidate.callee(),
                "deferring completion until scope close"
            );
            false
        } else {
            true
        }
    }

    fn add_partial_call_info(&self, info: PartialCallInfo) {
        self.push_outcome(CallOutcome::Partial(info));
    }

    fn add_completed_call_info(&self, info: CompletedCallInfo) {
        self.push_outcome(CallOutcome::Completed(info));
    }

    fn add_error_call_info(&self, info: ErrorCallInfo) {
        self.push_outcome(CallOutcome::Error(info));
    }

    fn current_constraint_system(&self) -> ConstraintStore {
        self.state.borrow().merged.clone()
    }

    fn infer_postponed_variables(
        &self,
        lambda: &LambdaAtom,
        initial_store: &ConstraintStore,
        mode: CompletionMode,
        sink: &mut dyn DiagnosticsSink,
    ) -> Option<Substitution> {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        state.telemetry.postponed_queries += 1;
        let merged = initial_store.merge(&state.merged);
        let Some(registration) = state.lambdas.get_mut(&lambda.id()) else {
            state.telemetry.uninitialized_lambda_queries += 1;
            return None;
        };
        if registration.attempts > 0 {
            state.telemetry.postponed_retries += 1;
        }
        registration.attempts += 1;
        if let Some(resolved) = &registration.resolved {
            return Some(resolved.clone());
        }
        // The registered atom is authoritative; the query only identifies it.
        let answer = PostponedVariableSolver::solve(&registration.atom, &merged, mode, sink);
        if let Some(substitution) = &answer {
            registration.resolved = Some(substitution.clone());
        }
        answer
    }

    fn initialize_lambda(&self, lambda: &LambdaAtom) {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        match state.lambdas.entry(lambda.id()) {
            Entry::Occupied(_) => {
                state.telemetry.duplicate_initializations += 1;
            }
            Entry::Vacant(entry) => {
                entry.insert(LambdaRegistration {
                    atom: lambda.clone(),
                    resolved: None,
                    attempts: 0,
                });
            }
        }
    }

    fn write_only_stubs(&self, _outcome: &CallOutcome) -> bool {
        let mut state = self.state.borrow_mut();
        let speculating =
            self.config.write_stubs && state.phase == SessionPhase::Active;
        if speculating {
            state.telemetry.stub_queries += 1;
        }
        speculating
    }

    fn call_completed(&self, atom: &ResolvedAtom) -> bool {
        let mut state = self.state.borrow_mut();
        if state.phase == SessionPhase::Active {
            state.claimed_atoms.insert(atom.id());
            true
        } else {
            false
        }
    }

    fn should_complete_resolved_sub_atoms_of(&self, _atom: &ResolvedAtom) -> bool {
        !(self.config.defer_sub_atom_completion && self.phase() == SessionPhase::Active)
    }

    fn compute_completion_mode(&self, _candidate: &ResolutionCandidate) -> Option<CompletionMode> {
        if let Some(mode) = self.config.completion_mode_override {
            return Some(mode);
        }
        Some(match self.phase() {
            SessionPhase::Active => CompletionMode::Partial,
            SessionPhase::Finalizing | SessionPhase::Closed => CompletionMode::Full,
        })
    }

    fn resolve_receiver_independently(&self) -> bool {
        self.config.resolve_receiver_independently
    }
}

impl fmt::Debug for BatchInferenceSession<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchInferenceSession")
            .field("config", &self.config)
            .field("nested", &self.parent.is_some())
            .field("state", &self.state.borrow())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::TypeBound;
    use crate::resolution::CallResolutionResult;
    use crate::types::{TypeId, TypeKind};
    use quill_ast::Span;
    use std::sync::Arc;

    fn partial(call: u32, var: u32, bound: TypeKind) -> PartialCallInfo {
        let constraints =
            ConstraintStore::from_bounds([TypeBound::new(TypeId::new(var), bound)]);
        PartialCallInfo::new(Arc::new(CallResolutionResult::new(
            CallId::new(call),
            constraints,
            None,
        )))
    }

    #[test]
    fn closing_an_active_scope_is_refused() {
        let session = BatchInferenceSession::new(BatchSessionConfig::default());
        let err = session.close().unwrap_err();
        assert_eq!(err, SessionError::ScopeStillActive);
    }

    #[test]
    fn finalize_then_close_reports_the_log() {
        let session = BatchInferenceSession::new(BatchSessionConfig::default());
        session.add_partial_call_info(partial(0, 0, TypeKind::Primitive("Int")));
        session.add_completed_call_info(CompletedCallInfo::new(Arc::new(
            CallResolutionResult::new(CallId::new(1), ConstraintStore::empty(), None),
        )));
        session.begin_finalize();
        let report = session.close().expect("finalized");
        assert_eq!(report.log.len(), 2);
        assert_eq!(report.phase, SessionPhase::Closed);
        assert_eq!(report.telemetry.partial_outcomes, 1);
        assert_eq!(report.telemetry.completed_outcomes, 1);
    }

    #[test]
    fn outcomes_after_finalize_are_dropped() {
        let session = BatchInferenceSession::new(BatchSessionConfig::default());
        session.begin_finalize();
        session.add_partial_call_info(partial(0, 0, TypeKind::Primitive("Int")));
        assert_eq!(session.telemetry().rejected_outcomes, 1);
        let report = session.close().expect("finalized");
        assert!(report.log.is_empty());
        assert!(report.constraints.is_empty());
    }

    #[test]
    fn second_outcome_for_a_call_site_is_dropped() {
        let session = BatchInferenceSession::new(BatchSessionConfig::default());
        session.add_partial_call_info(partial(0, 0, TypeKind::Primitive("Int")));
        session.add_partial_call_info(partial(0, 1, TypeKind::Primitive("String")));
        assert_eq!(session.telemetry().duplicate_outcomes, 1);
        assert!(session
            .current_constraint_system()
            .bounds_for(TypeId::new(1))
            .is_empty());
    }

    #[test]
    fn stub_writing_stops_once_the_scope_closes() {
        let session = BatchInferenceSession::new(BatchSessionConfig::default());
        let outcome = CallOutcome::Partial(partial(0, 0, TypeKind::Primitive("Int")));
        assert!(session.write_only_stubs(&outcome));
        session.begin_finalize();
        assert!(!session.write_only_stubs(&outcome));
        assert_eq!(session.telemetry().stub_queries, 1);
    }

    #[test]
    fn claimed_atoms_are_released_after_finalize() {
        let session = BatchInferenceSession::new(BatchSessionConfig::default());
        let atom = ResolvedAtom::call(crate::resolution::AtomId::new(3), CallId::new(0));
        assert!(session.call_completed(&atom));
        session.begin_finalize();
        assert!(!session.call_completed(&atom));
        assert_eq!(session.claimed_atoms(), vec![crate::resolution::AtomId::new(3)]);
    }

    #[test]
    fn completion_mode_follows_the_lifecycle() {
        let session = BatchInferenceSession::new(BatchSessionConfig::default());
        let candidate = ResolutionCandidate::new(CallId::new(0), "pkg::build");
        assert_eq!(
            session.compute_completion_mode(&candidate),
            Some(CompletionMode::Partial)
        );
        session.begin_finalize();
        assert_eq!(
            session.compute_completion_mode(&candidate),
            Some(CompletionMode::Full)
        );
    }

    #[test]
    fn configured_override_wins_over_the_lifecycle() {
        let config =
            BatchSessionConfig::default().with_completion_override(CompletionMode::Partial);
        let session = BatchInferenceSession::new(config);
        session.begin_finalize();
        let candidate = ResolutionCandidate::new(CallId::new(0), "pkg::build");
        assert_eq!(
            session.compute_completion_mode(&candidate),
            Some(CompletionMode::Partial)
        );
    }

    #[test]
    fn querying_an_unregistered_lambda_answers_absent() {
        let session = BatchInferenceSession::new(BatchSessionConfig::default());
        let lambda = LambdaAtom::new(LambdaId::new(0), [TypeId::new(0)], Span::dummy());
        let mut sink = crate::diagnostics::DiagnosticsCollector::new();
        let answer = session.infer_postponed_variables(
            &lambda,
            &ConstraintStore::empty(),
            CompletionMode::Full,
            &mut sink,
        );
        assert!(answer.is_none());
        assert_eq!(session.telemetry().uninitialized_lambda_queries, 1);
    }

    #[test]
    fn repeated_initialization_keeps_the_first_registration() {
        let session = BatchInferenceSession::new(BatchSessionConfig::default());
        let first = LambdaAtom::new(LambdaId::new(0), [TypeId::new(0)], Span::dummy());
        let second = LambdaAtom::new(LambdaId::new(0), [TypeId::new(9)], Span::dummy());
        session.initialize_lambda(&first);
        session.initialize_lambda(&second);
        assert_eq!(session.telemetry().duplicate_initializations, 1);

        session.add_partial_call_info(partial(0, 0, TypeKind::Primitive("Int")));
        let mut sink = crate::diagnostics::DiagnosticsCollector::new();
        let substitution = session
            .infer_postponed_variables(
                &second,
                &ConstraintStore::empty(),
                CompletionMode::Full,
                &mut sink,
            )
            .expect("first registration solves");
        // Variables of the ignored second registration are not consulted.
        assert_eq!(
            substitution.get(&TypeId::new(0)),
            Some(&TypeKind::Primitive("Int"))
        );
    }
}
