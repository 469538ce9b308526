//! Structural subtype check used when merging bounds.
//!
//! This is deliberately a small relation: enough to rank the bounds the
//! session accumulates, not a general subtyping engine. The widening table
//! lists the primitive pairs accepted by the checker, transitive entries
//! included.

use crate::types::TypeKind;

const PRIMITIVE_WIDENING: &[(&str, &str)] = &[
    ("Int", "Long"),
    ("Int", "Number"),
    ("Long", "Number"),
    ("Float", "Double"),
    ("Float", "Number"),
    ("Double", "Number"),
];

/// Returns true when `sub` may be used where `sup` is expected.
pub fn is_subtype_of(sub: &TypeKind, sup: &TypeKind) -> bool {
    if sub == sup {
        return true;
    }
    match (sub, sup) {
        (_, TypeKind::Unknown) => true,
        (TypeKind::Primitive(a), TypeKind::Primitive(b)) => PRIMITIVE_WIDENING
            .iter()
            .any(|(narrow, wide)| narrow == a && wide == b),
        (TypeKind::Optional(a), TypeKind::Optional(b)) => is_subtype_of(a, b),
        // A non-null value widens into the optional of any of its supertypes.
        (_, TypeKind::Optional(b)) => is_subtype_of(sub, b),
        (TypeKind::Function(params_a, ret_a), TypeKind::Function(params_b, ret_b)) => {
            params_a.len() == params_b.len()
                && params_a
                    .iter()
                    .zip(params_b.iter())
                    .all(|(a, b)| is_subtype_of(b, a))
                && is_subtype_of(ret_a, ret_b)
        }
        _ => false,
    }
}
