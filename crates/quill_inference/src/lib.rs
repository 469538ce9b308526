//! quill_inference - inference-session coordination for the quill type checker.
//!
//! This crate hosts the protocol that decides, for a sequence of related
//! call-resolution sites inside one lexical scope, whether and when
//! constraint completion runs, how constraints accumulated by earlier calls
//! carry over to later calls, and how lambda parameter types are resolved
//! once enough surrounding context exists. It is a coordination layer between
//! the call-resolution driver and the constraint solver, not a solver itself.

pub mod config;
pub mod constraint;
pub mod diagnostics;
pub mod resolution;
pub mod session;
pub mod solver;
pub mod telemetry;
pub mod types;

#[cfg(test)]
mod tests;

pub use config::BatchSessionConfig;
pub use constraint::{is_subtype_of, ConstraintStore, TypeBound};
pub use diagnostics::{DiagnosticsCollector, DiagnosticsSink, InferenceDiagnostic};
pub use resolution::{
    AtomId, CallId, CallOutcome, CallResolutionResult, CompletedCallInfo, ErrorCallInfo,
    LambdaAtom, LambdaId, OutcomeTag, PartialCallInfo, ResolutionCandidate, ResolvedAtom,
    ResolvedAtomKind,
};
pub use session::{
    session_chain, BatchInferenceSession, BatchSessionReport, DefaultInferenceSession,
    InferenceSession, SessionChain, SessionError, SessionPhase,
};
pub use solver::{
    apply_substitution, stub_substitution, CompletionMode, PostponedVariableSolver, Substitution,
};
pub use telemetry::SessionTelemetry;
pub use types::{SymbolId, TypeId, TypeKind};
