//! Session protocol coordinating related call resolutions within one scope.
//!
//! A session sits between the call-resolution driver and the constraint
//! solver: the driver asks it before and after resolving each call whether
//! completion should run now or wait for the rest of the scope, feeds it the
//! outcome of every resolution, and picks up the merged constraints when it
//! moves on to the next call. The completion walker consults the same session
//! whenever a lambda literal still carries unresolved type variables.
//!
//! Two variants cover every scope the checker produces: the stateless
//! [`DefaultInferenceSession`] for ordinary single-call inference and the
//! stateful [`BatchInferenceSession`] for scopes whose calls must share
//! constraints, such as builder-style chained-call blocks.

mod batch;
mod default;

pub use batch::{BatchInferenceSession, BatchSessionReport, SessionError, SessionPhase};
pub use default::DefaultInferenceSession;

use crate::constraint::ConstraintStore;
use crate::diagnostics::DiagnosticsSink;
use crate::resolution::{
    CallOutcome, CompletedCallInfo, ErrorCallInfo, LambdaAtom, PartialCallInfo,
    ResolutionCandidate, ResolvedAtom,
};
use crate::solver::{CompletionMode, Substitution};

/// Policy queried by the call-resolution driver and the completion walker.
///
/// Every operation is synchronous and single-threaded; a session is never
/// shared across threads. Operations documented as *mutating* change the
/// session's log or registry and are exposed through `&self` because sessions
/// are handed around as trait objects; stateful implementations use
/// single-threaded interior mutability.
///
/// The default method bodies implement the degenerate behaviour of the
/// default session: completion always runs immediately, nothing is recorded,
/// and no cross-call state exists.
pub trait InferenceSession {
    /// Enclosing session, if this scope is nested inside another one.
    ///
    /// The reference is non-owning; a parent always predates its children and
    /// must outlive them, which the borrow in [`BatchInferenceSession`]
    /// enforces structurally. Walk the chain with [`session_chain`].
    fn parent(&self) -> Option<&dyn InferenceSession> {
        None
    }

    /// Whether constraint completion for `candidate` should run immediately,
    /// or be deferred so constraints from later calls in the scope can still
    /// influence it.
    fn should_run_completion(&self, _candidate: &ResolutionCandidate) -> bool {
        true
    }

    /// Records a resolution that finished with open type variables.
    /// Mutating; at most once per call site.
    fn add_partial_call_info(&self, _info: PartialCallInfo) {}

    /// Records a fully resolved call. Mutating; at most once per call site.
    fn add_completed_call_info(&self, _info: CompletedCallInfo) {}

    /// Records a failed resolution. Mutating; at most once per call site.
    fn add_error_call_info(&self, _info: ErrorCallInfo) {}

    /// Constraints accumulated by every outcome recorded so far, i.e. the
    /// carry-over state for the next call resolved in the same scope.
    fn current_constraint_system(&self) -> ConstraintStore {
        ConstraintStore::empty()
    }

    /// Resolves the postponed variables of a lambda whose body must now be
    /// analyzed, seeding the solver with `initial_store` merged into the
    /// session's accumulated constraints.
    ///
    /// `None` means the resolution cannot be completed *yet* and is never a
    /// fault: callers retry later in the walk or escalate to an unresolved
    /// type diagnostic once no retry is left. The query may be re-issued for
    /// the same lambda after an absent answer and never mutates the log.
    ///
    /// [`initialize_lambda`](Self::initialize_lambda) must have registered
    /// the lambda beforehand; stateful sessions answer `None` for
    /// unregistered lambdas and record the violation in their telemetry.
    fn infer_postponed_variables(
        &self,
        _lambda: &LambdaAtom,
        _initial_store: &ConstraintStore,
        _mode: CompletionMode,
        _sink: &mut dyn DiagnosticsSink,
    ) -> Option<Substitution> {
        Some(Substitution::new())
    }

    /// One-time registration of a lambda atom, required before the first
    /// postponed-variable query for it. Mutating; registering the same lambda
    /// twice leaves the first registration untouched.
    fn initialize_lambda(&self, _lambda: &LambdaAtom) {}

    /// Whether unresolved variables of a not-yet-completed call should be
    /// replaced with stub placeholders so dependent analysis can proceed
    /// speculatively instead of blocking.
    fn write_only_stubs(&self, _outcome: &CallOutcome) -> bool {
        false
    }

    /// Notes that the walker finished processing `atom`. Returns whether the
    /// session claims the atom's handling as complete; `false` leaves
    /// completion tracking entirely to the caller's walker.
    fn call_completed(&self, _atom: &ResolvedAtom) -> bool {
        false
    }

    /// Whether nested sub-expressions of a resolved call should be completed
    /// recursively right away, or deferred to the scope-level pass.
    fn should_complete_resolved_sub_atoms_of(&self, _atom: &ResolvedAtom) -> bool {
        true
    }

    /// Completion strategy override for `candidate`; `None` defers to the
    /// driver's default policy and is not an error.
    fn compute_completion_mode(&self, _candidate: &ResolutionCandidate) -> Option<CompletionMode> {
        None
    }

    /// Whether a call's receiver must be fully resolved before overload
    /// resolution, instead of being refined jointly with the arguments.
    fn resolve_receiver_independently(&self) -> bool {
        false
    }
}

/// Iterator over a session and its ancestors, innermost first.
///
/// Used for scope-aware queries that span enclosing sessions, e.g. "does any
/// enclosing scope defer completion":
///
/// ```
/// # use quill_inference::resolution::{CallId, ResolutionCandidate};
/// # use quill_inference::session::{session_chain, DefaultInferenceSession, InferenceSession};
/// # let session = DefaultInferenceSession::shared();
/// # let candidate = ResolutionCandidate::new(CallId::new(0), "demo");
/// let defers = session_chain(session).any(|scope| !scope.should_run_completion(&candidate));
/// # assert!(!defers);
/// ```
pub struct SessionChain<'a> {
    next: Option<&'a dyn InferenceSession>,
}

impl<'a> Iterator for SessionChain<'a> {
    type Item = &'a dyn InferenceSession;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        self.next = current.parent();
        Some(current)
    }
}

/// Walks `session` and its parents up to the root.
pub fn session_chain(session: &dyn InferenceSession) -> SessionChain<'_> {
    SessionChain {
        next: Some(session),
    }
}
