//! Policy configuration for batched inference sessions.
//!
//! The checker decides per scope which flavour of batching it needs; the
//! session only carries the knobs. Builder-style chained-call blocks use the
//! speculative preset, conservative callers can opt out of stub writing and
//! receiver independence individually.

use crate::solver::CompletionMode;

/// Knobs controlling how a batched session answers its policy hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSessionConfig {
    /// Replace unresolved variables with stub placeholders while the scope is
    /// still accumulating calls.
    pub write_stubs: bool,
    /// Require receivers to be fully resolved before overload resolution
    /// instead of refining them jointly with the arguments.
    pub resolve_receiver_independently: bool,
    /// Defer completion of nested sub-expressions to the scope-close pass.
    pub defer_sub_atom_completion: bool,
    /// Fixed completion mode answered for every candidate; `None` lets the
    /// session derive the mode from its lifecycle phase.
    pub completion_mode_override: Option<CompletionMode>,
}

impl BatchSessionConfig {
    /// Preset for builder-style chained-call blocks: speculate with stubs,
    /// resolve receivers on their own, defer all nested completion.
    pub fn builder_defaults() -> Self {
        Self {
            write_stubs: true,
            resolve_receiver_independently: true,
            defer_sub_atom_completion: true,
            completion_mode_override: None,
        }
    }

    /// Preset that only shares constraints across calls and otherwise keeps
    /// the driver's standard behaviour.
    pub fn conservative() -> Self {
        Self {
            write_stubs: false,
            resolve_receiver_independently: false,
            defer_sub_atom_completion: false,
            completion_mode_override: None,
        }
    }

    /// Returns the configuration with a fixed completion mode.
    pub fn with_completion_override(mut self, mode: CompletionMode) -> Self {
        self.completion_mode_override = Some(mode);
        self
    }
}

impl Default for BatchSessionConfig {
    fn default() -> Self {
        Self::builder_defaults()
    }
}
