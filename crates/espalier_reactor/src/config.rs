//! Resolution limits.

/// Kill-switch limits for a build session.
///
/// A well-formed build finishes each phase in a handful of rounds; the
/// round limit only exists so a reactor bug can never spin forever.
/// Exceeding a limit is a collected `Limit` error, never an abort.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReactorLimits {
    /// Maximum resolution rounds per phase.
    pub max_rounds: u32,
}

impl Default for ReactorLimits {
    fn default() -> Self {
        Self { max_rounds: 10_000 }
    }
}

impl ReactorLimits {
    /// Sets the per-phase round limit.
    #[must_use]
    pub const fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds;
        self
    }
}
