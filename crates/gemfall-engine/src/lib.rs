pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("swap rejected: cells must be adjacent, occupied, and requested while playing")]
pub struct InvalidSwapError;

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("pair colliding when moving falling pair")]
pub struct PairCollisionError;

/// Failure reported by a hosting-shell hook.
///
/// Hooks are best-effort collaborators; a `HookError` is logged by the
/// session and never interrupts play.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("session hook failed: {reason}")]
pub struct HookError {
    reason: String,
}

impl HookError {
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}
