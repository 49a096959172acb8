//! Engine configuration.

use std::time::Duration;

/// Search settings fixed when an [`Engine`](crate::Engine) is constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Deepest iterative-deepening iteration, in plies.
    pub max_depth: u8,
    /// Wall-clock budget for one `choose_move` call; `None` searches to `max_depth`.
    pub time_budget: Option<Duration>,
    /// Transposition table size in megabytes.
    pub tt_size_mb: usize,
    /// Probe and store the transposition table.
    pub use_tt: bool,
    /// Null-move pruning. Unsound in zugzwang positions; turn it off for
    /// pawn endgames and similar.
    pub null_move: bool,
    /// Extend the horizon with a capture-only search.
    pub quiescence: bool,
    /// Recursion cap for the capture-only search, in plies past the horizon.
    pub qsearch_max_ply: u8,
    /// Stop deepening once a forced mate has been found.
    pub stop_on_mate: bool,
    /// Seed for tie-breaking and fallback move selection.
    pub seed: u64,
    /// Break move-ordering ties randomly (from `seed`) instead of by generation order.
    pub randomize_ties: bool,
}

impl EngineConfig {
    /// Default settings with the given depth.
    pub fn with_depth(max_depth: u8) -> Self {
        Self {
            max_depth,
            ..Self::default()
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_depth: 3,
            time_budget: Some(Duration::from_secs(5)),
            tt_size_mb: 16,
            use_tt: true,
            null_move: true,
            quiescence: true,
            qsearch_max_ply: 32,
            stop_on_mate: true,
            seed: 0x6b65_7374_7265_6c00,
            randomize_ties: false,
        }
    }
}
