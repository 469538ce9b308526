//! Invariants of the default session and of session nesting.

use crate::config::BatchSessionConfig;
use crate::constraint::{ConstraintStore, TypeBound};
use crate::diagnostics::DiagnosticsCollector;
use crate::resolution::{
    AtomId, CallId, CallResolutionResult, CompletedCallInfo, ErrorCallInfo, LambdaAtom, LambdaId,
    PartialCallInfo, ResolutionCandidate, ResolvedAtom,
};
use crate::session::{
    session_chain, BatchInferenceSession, DefaultInferenceSession, InferenceSession,
};
use crate::solver::{CompletionMode, Substitution};
use crate::types::{TypeId, TypeKind};
use quill_ast::Span;
use std::sync::Arc;

fn candidate(call: u32) -> ResolutionCandidate {
    ResolutionCandidate::new(CallId::new(call), "pkg::combine")
}

fn partial(call: u32) -> PartialCallInfo {
    let constraints = ConstraintStore::from_bounds([TypeBound::new(
        TypeId::new(0),
        TypeKind::Primitive("Int"),
    )]);
    PartialCallInfo::new(Arc::new(CallResolutionResult::new(
        CallId::new(call),
        constraints,
        None,
    )))
}

fn lambda(vars: Vec<u32>) -> LambdaAtom {
    LambdaAtom::new(
        LambdaId::new(0),
        vars.into_iter().map(TypeId::new),
        Span::dummy(),
    )
}

#[test]
fn default_session_answers_every_hook_with_its_constant() {
    let session = DefaultInferenceSession::shared();
    let atom = ResolvedAtom::call(AtomId::new(0), CallId::new(0));
    let outcome = crate::resolution::CallOutcome::Partial(partial(0));
    let mut sink = DiagnosticsCollector::new();

    assert!(session.parent().is_none());
    assert!(session.should_run_completion(&candidate(0)));
    assert!(session.current_constraint_system().is_empty());
    assert_eq!(
        session.infer_postponed_variables(
            &lambda(vec![0]),
            &ConstraintStore::empty(),
            CompletionMode::Full,
            &mut sink,
        ),
        Some(Substitution::new())
    );
    assert!(!session.write_only_stubs(&outcome));
    assert!(!session.call_completed(&atom));
    assert!(session.should_complete_resolved_sub_atoms_of(&atom));
    assert_eq!(session.compute_completion_mode(&candidate(0)), None);
    assert!(!session.resolve_receiver_independently());
    assert!(sink.is_empty());
}

#[test]
fn default_session_stays_stateless_under_arbitrary_prior_calls() {
    let session = DefaultInferenceSession::shared();
    session.initialize_lambda(&lambda(vec![0]));
    for call in 0..3 {
        session.add_partial_call_info(partial(call));
        session.add_error_call_info(ErrorCallInfo::new(Arc::new(CallResolutionResult::new(
            CallId::new(call + 10),
            ConstraintStore::empty(),
            None,
        ))));
        session.add_completed_call_info(CompletedCallInfo::new(Arc::new(
            CallResolutionResult::new(CallId::new(call + 20), ConstraintStore::empty(), None),
        )));
    }
    assert!(session.should_run_completion(&candidate(99)));
    assert!(session.current_constraint_system().is_empty());
}

#[test]
fn parent_chain_terminates_within_nesting_depth() {
    let root = BatchInferenceSession::new(BatchSessionConfig::conservative());
    let middle = BatchInferenceSession::nested(BatchSessionConfig::conservative(), &root);
    let leaf = BatchInferenceSession::nested(BatchSessionConfig::builder_defaults(), &middle);

    assert_eq!(session_chain(&leaf).count(), 3);
    assert_eq!(session_chain(&middle).count(), 2);
    assert_eq!(session_chain(&root).count(), 1);
}

#[test]
fn chain_queries_bubble_to_enclosing_scopes() {
    let root = BatchInferenceSession::new(BatchSessionConfig::builder_defaults());
    let leaf = BatchInferenceSession::nested(BatchSessionConfig::conservative(), &root);
    leaf.begin_finalize();

    // The leaf itself would run completion, but the enclosing scope is still
    // accumulating calls and defers it.
    assert!(leaf.should_run_completion(&candidate(0)));
    let defers = session_chain(&leaf).any(|scope| !scope.should_run_completion(&candidate(0)));
    assert!(defers);
}

#[test]
fn default_session_is_a_valid_chain_root_for_batches() {
    let root: &dyn InferenceSession = DefaultInferenceSession::shared();
    let scope = BatchInferenceSession::nested(BatchSessionConfig::builder_defaults(), root);
    let chain: Vec<bool> = session_chain(&scope)
        .map(|session| session.resolve_receiver_independently())
        .collect();
    assert_eq!(chain, vec![true, false]);
}
