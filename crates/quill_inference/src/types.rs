//! Type representation consumed by the session-coordination layer.
//!
//! The checker keeps its full type model elsewhere; this module carries the
//! subset the coordination protocol needs to thread constraints between call
//! sites: type variables, the shapes bounds range over, and the stub
//! placeholders written while a batched scope is still speculating.

use std::collections::BTreeSet;
use std::fmt;

/// Identifier assigned to type variables during inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeId(u32);

impl TypeId {
    /// Creates a new type identifier from its raw numeric representation.
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw numeric identifier.
    pub fn to_raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

/// Identifier assigned to resolved callees (functions, constructors, etc.).
///
/// A dedicated type is used instead of a bare string so that callee tracking
/// cannot be confused with other identifier spaces.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SymbolId(String);

impl SymbolId {
    /// Creates a symbol identifier from a fully-qualified name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the underlying symbol representation as `&str`.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SymbolId {
    fn from(value: &str) -> Self {
        SymbolId::new(value)
    }
}

impl From<String> for SymbolId {
    fn from(value: String) -> Self {
        SymbolId::new(value)
    }
}

/// Type shape used by constraint bounds and substitutions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeKind {
    Primitive(&'static str),
    Optional(Box<TypeKind>),
    Function(Vec<TypeKind>, Box<TypeKind>),
    Variable(TypeId),
    /// Placeholder written for a still-unresolved variable so dependent
    /// analysis can proceed speculatively. Carries the originating variable.
    Stub(TypeId),
    Unknown,
}

impl Default for TypeKind {
    fn default() -> Self {
        TypeKind::Unknown
    }
}

impl TypeKind {
    /// Convenience constructor for optional types.
    pub fn optional(inner: TypeKind) -> Self {
        TypeKind::Optional(Box::new(inner))
    }

    /// Convenience constructor for function types.
    pub fn function(params: Vec<TypeKind>, return_type: TypeKind) -> Self {
        TypeKind::Function(params, Box::new(return_type))
    }

    /// Convenience constructor for stub placeholders.
    pub fn stub(origin: TypeId) -> Self {
        TypeKind::Stub(origin)
    }

    /// Returns true if the type or any nested type contains `Unknown`.
    pub fn contains_unknown(&self) -> bool {
        match self {
            TypeKind::Unknown => true,
            TypeKind::Primitive(_) | TypeKind::Variable(_) | TypeKind::Stub(_) => false,
            TypeKind::Optional(inner) => inner.contains_unknown(),
            TypeKind::Function(params, ret) => {
                params.iter().any(TypeKind::contains_unknown) || ret.contains_unknown()
            }
        }
    }

    /// Returns true if the type or any nested type is a stub placeholder.
    pub fn contains_stub(&self) -> bool {
        match self {
            TypeKind::Stub(_) => true,
            TypeKind::Primitive(_) | TypeKind::Variable(_) | TypeKind::Unknown => false,
            TypeKind::Optional(inner) => inner.contains_stub(),
            TypeKind::Function(params, ret) => {
                params.iter().any(TypeKind::contains_stub) || ret.contains_stub()
            }
        }
    }

    /// Returns true when the type pins a variable to something concrete, i.e.
    /// it mentions no variables, stubs, or unknowns.
    pub fn is_concrete(&self) -> bool {
        !self.contains_unknown() && !self.contains_stub() && self.free_type_vars().is_empty()
    }

    /// Collects free type variables into a sorted Vec for deterministic output.
    pub fn free_type_vars(&self) -> Vec<TypeId> {
        let mut vars = BTreeSet::new();
        self.collect_free_type_vars_into(&mut vars);
        vars.into_iter().collect()
    }

    fn collect_free_type_vars_into(&self, acc: &mut BTreeSet<TypeId>) {
        match self {
            TypeKind::Primitive(_) | TypeKind::Stub(_) | TypeKind::Unknown => {}
            TypeKind::Variable(id) => {
                acc.insert(*id);
            }
            TypeKind::Optional(inner) => inner.collect_free_type_vars_into(acc),
            TypeKind::Function(params, ret) => {
                for param in params {
                    param.collect_free_type_vars_into(acc);
                }
                ret.collect_free_type_vars_into(acc);
            }
        }
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeKind::Primitive(name) => f.write_str(name),
            TypeKind::Optional(inner) => write!(f, "{inner}?"),
            TypeKind::Function(params, ret) => {
                f.write_str("(")?;
                for (index, param) in params.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{param}")?;
                }
                write!(f, ") -> {ret}")
            }
            TypeKind::Variable(id) => write!(f, "{id}"),
            TypeKind::Stub(origin) => write!(f, "stub({origin})"),
            TypeKind::Unknown => f.write_str("<unknown>"),
        }
    }
}
