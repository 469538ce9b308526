//! Postponed-variable completion on top of merged constraint snapshots.
//!
//! The session layer decides *when* completion runs; this module is the piece
//! that actually pins postponed variables once a merged snapshot is handed
//! over. It deliberately stays small: most-specific-bound selection over the
//! store, nothing more.

use crate::constraint::{is_subtype_of, ConstraintStore, TypeBound};
use crate::diagnostics::{DiagnosticsSink, InferenceDiagnostic};
use crate::resolution::LambdaAtom;
use crate::types::{TypeId, TypeKind};
use std::collections::BTreeMap;

/// Strategy applied when a constraint system is completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompletionMode {
    /// Pin every postponed variable and report what cannot be pinned.
    Full,
    /// Resolve what the current snapshot supports and stay silent about the
    /// rest so the walker can retry once more context exists.
    Partial,
}

/// Deterministic mapping from type variables to the types they were pinned to.
pub type Substitution = BTreeMap<TypeId, TypeKind>;

/// Replaces every pinned variable occurring in `ty` by its substitution.
pub fn apply_substitution(ty: &TypeKind, substitution: &Substitution) -> TypeKind {
    match ty {
        TypeKind::Variable(id) => substitution
            .get(id)
            .cloned()
            .unwrap_or_else(|| ty.clone()),
        TypeKind::Optional(inner) => TypeKind::optional(apply_substitution(inner, substitution)),
        TypeKind::Function(params, ret) => TypeKind::function(
            params
                .iter()
                .map(|param| apply_substitution(param, substitution))
                .collect(),
            apply_substitution(ret, substitution),
        ),
        TypeKind::Primitive(_) | TypeKind::Stub(_) | TypeKind::Unknown => ty.clone(),
    }
}

/// Substitution that maps each variable to its stub placeholder.
///
/// Written while a batched scope is still speculating so dependent analysis
/// can proceed before the real completion runs at scope close.
pub fn stub_substitution(variables: impl IntoIterator<Item = TypeId>) -> Substitution {
    variables
        .into_iter()
        .map(|variable| (variable, TypeKind::stub(variable)))
        .collect()
}

enum VariableResolution<'a> {
    Pinned(TypeKind),
    Unconstrained,
    NotConcrete(&'a TypeBound),
    Ambiguous(&'a [TypeBound]),
}

/// Resolves the postponed variables of one lambda from a merged snapshot.
pub struct PostponedVariableSolver;

impl PostponedVariableSolver {
    /// Attempts to pin every postponed variable of `lambda` using the bounds
    /// retained in `store`.
    ///
    /// Absent means "cannot yet be completed" and is never a fault: under
    /// [`CompletionMode::Partial`] the caller is expected to retry later in
    /// the walk, under [`CompletionMode::Full`] the failure is also reported
    /// through `sink` because no later retry will follow.
    pub fn solve(
        lambda: &LambdaAtom,
        store: &ConstraintStore,
        mode: CompletionMode,
        sink: &mut dyn DiagnosticsSink,
    ) -> Option<Substitution> {
        let mut substitution = Substitution::new();
        let mut complete = true;

        for &variable in lambda.postponed_variables() {
            match Self::resolve_variable(store, variable) {
                VariableResolution::Pinned(ty) => {
                    substitution.insert(variable, ty);
                }
                VariableResolution::Unconstrained => {
                    complete = false;
                    if mode == CompletionMode::Full {
                        sink.report(unresolved_variable(lambda, variable, None));
                    }
                }
                VariableResolution::NotConcrete(bound) => {
                    complete = false;
                    if mode == CompletionMode::Full {
                        sink.report(unresolved_variable(lambda, variable, Some(bound)));
                    }
                }
                VariableResolution::Ambiguous(bounds) => {
                    complete = false;
                    if mode == CompletionMode::Full {
                        sink.report(ambiguous_bounds(lambda, variable, bounds));
                    }
                }
            }
        }

        complete.then_some(substitution)
    }

    fn resolve_variable(store: &ConstraintStore, variable: TypeId) -> VariableResolution<'_> {
        let bounds = store.bounds_for(variable);
        match bounds {
            [] => VariableResolution::Unconstrained,
            [bound] => {
                if bound.bound.is_concrete() {
                    VariableResolution::Pinned(bound.bound.clone())
                } else {
                    VariableResolution::NotConcrete(bound)
                }
            }
            // The store retains multiple bounds only when they cannot be
            // ordered, but keep the narrowing check in case that changes.
            many => match many
                .iter()
                .find(|candidate| {
                    many.iter()
                        .all(|other| is_subtype_of(&candidate.bound, &other.bound))
                })
                .filter(|candidate| candidate.bound.is_concrete())
            {
                Some(candidate) => VariableResolution::Pinned(candidate.bound.clone()),
                None => VariableResolution::Ambiguous(many),
            },
        }
    }
}

fn unresolved_variable(
    lambda: &LambdaAtom,
    variable: TypeId,
    bound: Option<&TypeBound>,
) -> InferenceDiagnostic {
    let mut diagnostic = InferenceDiagnostic::new(
        "QL2101",
        format!("cannot infer a type for {variable} used by this lambda"),
    )
    .with_span(lambda.span().clone())
    .with_note("add a type annotation to the lambda parameter or the surrounding call");
    if let Some(bound) = bound {
        diagnostic = diagnostic.with_note(format!(
            "the only available bound {} still mentions unresolved types",
            bound.bound
        ));
    }
    diagnostic
}

fn ambiguous_bounds(
    lambda: &LambdaAtom,
    variable: TypeId,
    bounds: &[TypeBound],
) -> InferenceDiagnostic {
    let rendered: Vec<String> = bounds.iter().map(|bound| bound.bound.to_string()).collect();
    let span = bounds
        .iter()
        .filter_map(|bound| bound.origin.as_ref())
        .fold(lambda.span().clone(), |acc, origin| acc.covering(origin));
    InferenceDiagnostic::new(
        "QL2102",
        format!(
            "conflicting requirements for {variable}: {}",
            rendered.join(" vs ")
        ),
    )
    .with_span(span)
    .with_note("the surrounding calls constrain this variable in incompatible ways")
}
