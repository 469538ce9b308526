//! Degenerate session used for ordinary single-call inference.

use super::InferenceSession;
use once_cell::sync::OnceCell;

static SHARED: OnceCell<DefaultInferenceSession> = OnceCell::new();

/// Stateless session answering every policy query with the standard
/// behaviour: completion runs immediately, outcomes are not recorded, and no
/// constraint state crosses call sites.
///
/// The checker falls back to this session whenever no batched-inference scope
/// is active, so a single shared instance serves the whole process.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultInferenceSession;

impl DefaultInferenceSession {
    /// Process-wide shared instance, constructed on first use.
    pub fn shared() -> &'static Self {
        SHARED.get_or_init(|| DefaultInferenceSession)
    }
}

impl InferenceSession for DefaultInferenceSession {}
