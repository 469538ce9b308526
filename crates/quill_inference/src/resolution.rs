//! Call-resolution facing data model.
//!
//! These records travel from the call resolver into the session. The session
//! stores them by shared reference and never mutates their payload; the
//! resolver remains the owner of every resolution result it produces.

use crate::constraint::ConstraintStore;
use crate::types::{SymbolId, TypeId, TypeKind};
use quill_ast::Span;
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

/// Identifier of a call site within the scope being resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CallId(u32);

impl CallId {
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn to_raw(self) -> u32 {
        self.0
    }
}

/// Identifier of a lambda literal within the scope being resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LambdaId(u32);

impl LambdaId {
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn to_raw(self) -> u32 {
        self.0
    }
}

/// Identifier of a resolved expression node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AtomId(u32);

impl AtomId {
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn to_raw(self) -> u32 {
        self.0
    }
}

/// Outcome tag distinguishing the three call-resolution results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeTag {
    Partial,
    Completed,
    Error,
}

impl fmt::Display for OutcomeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutcomeTag::Partial => f.write_str("partial"),
            OutcomeTag::Completed => f.write_str("completed"),
            OutcomeTag::Error => f.write_str("error"),
        }
    }
}

/// Payload produced by resolving one call site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallResolutionResult {
    call: CallId,
    constraints: ConstraintStore,
    return_type: Option<TypeKind>,
}

impl CallResolutionResult {
    pub fn new(call: CallId, constraints: ConstraintStore, return_type: Option<TypeKind>) -> Self {
        Self {
            call,
            constraints,
            return_type,
        }
    }

    pub fn call(&self) -> CallId {
        self.call
    }

    pub fn constraints(&self) -> &ConstraintStore {
        &self.constraints
    }

    pub fn return_type(&self) -> Option<&TypeKind> {
        self.return_type.as_ref()
    }
}

/// Resolution finished with type variables still open.
#[derive(Debug, Clone)]
pub struct PartialCallInfo {
    result: Arc<CallResolutionResult>,
}

impl PartialCallInfo {
    pub fn new(result: Arc<CallResolutionResult>) -> Self {
        Self { result }
    }

    pub fn result(&self) -> &CallResolutionResult {
        &self.result
    }
}

/// Resolution finished with every type variable pinned.
#[derive(Debug, Clone)]
pub struct CompletedCallInfo {
    result: Arc<CallResolutionResult>,
}

impl CompletedCallInfo {
    pub fn new(result: Arc<CallResolutionResult>) -> Self {
        Self { result }
    }

    pub fn result(&self) -> &CallResolutionResult {
        &self.result
    }
}

/// Resolution failed; constraints gathered so far are still usable.
#[derive(Debug, Clone)]
pub struct ErrorCallInfo {
    result: Arc<CallResolutionResult>,
}

impl ErrorCallInfo {
    pub fn new(result: Arc<CallResolutionResult>) -> Self {
        Self { result }
    }

    pub fn result(&self) -> &CallResolutionResult {
        &self.result
    }
}

/// One entry of the session log.
#[derive(Debug, Clone)]
pub enum CallOutcome {
    Partial(PartialCallInfo),
    Completed(CompletedCallInfo),
    Error(ErrorCallInfo),
}

impl CallOutcome {
    pub fn tag(&self) -> OutcomeTag {
        match self {
            CallOutcome::Partial(_) => OutcomeTag::Partial,
            CallOutcome::Completed(_) => OutcomeTag::Completed,
            CallOutcome::Error(_) => OutcomeTag::Error,
        }
    }

    pub fn result(&self) -> &CallResolutionResult {
        match self {
            CallOutcome::Partial(info) => info.result(),
            CallOutcome::Completed(info) => info.result(),
            CallOutcome::Error(info) => info.result(),
        }
    }

    pub fn call(&self) -> CallId {
        self.result().call()
    }

    pub fn constraints(&self) -> &ConstraintStore {
        self.result().constraints()
    }
}

/// Buffer sized for the common case of a handful of postponed variables.
pub type PostponedVariables = SmallVec<[TypeId; 4]>;

/// Lambda literal whose signature still contains unresolved type variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LambdaAtom {
    id: LambdaId,
    postponed_variables: PostponedVariables,
    span: Span,
}

impl LambdaAtom {
    pub fn new(
        id: LambdaId,
        postponed_variables: impl IntoIterator<Item = TypeId>,
        span: Span,
    ) -> Self {
        Self {
            id,
            postponed_variables: postponed_variables.into_iter().collect(),
            span,
        }
    }

    pub fn id(&self) -> LambdaId {
        self.id
    }

    pub fn postponed_variables(&self) -> &[TypeId] {
        &self.postponed_variables
    }

    pub fn span(&self) -> &Span {
        &self.span
    }
}

/// Resolved expression node visited by the completion walker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedAtom {
    id: AtomId,
    kind: ResolvedAtomKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedAtomKind {
    Call(CallId),
    Lambda(LambdaId),
}

impl ResolvedAtom {
    pub fn call(id: AtomId, call: CallId) -> Self {
        Self {
            id,
            kind: ResolvedAtomKind::Call(call),
        }
    }

    pub fn lambda(id: AtomId, lambda: LambdaId) -> Self {
        Self {
            id,
            kind: ResolvedAtomKind::Lambda(lambda),
        }
    }

    pub fn id(&self) -> AtomId {
        self.id
    }

    pub fn kind(&self) -> ResolvedAtomKind {
        self.kind
    }
}

/// Description of a call site mid-resolution, as handed over by overload
/// resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionCandidate {
    call: CallId,
    callee: SymbolId,
}

impl ResolutionCandidate {
    pub fn new(call: CallId, callee: impl Into<SymbolId>) -> Self {
        Self {
            call,
            callee: callee.into(),
        }
    }

    pub fn call(&self) -> CallId {
        self.call
    }

    pub fn callee(&self) -> &SymbolId {
        &self.callee
    }
}
