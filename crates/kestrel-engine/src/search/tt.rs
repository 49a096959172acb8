//! Transposition table keyed by the full 64-bit position hash.
//!
//! One entry per slot, indexed by `hash & mask`. Stores always overwrite the
//! slot; probes return nothing unless the stored key equals the probed hash.

use kestrel_core::Move;

use crate::search::negamax::MATE_THRESHOLD;

/// How the stored score relates to the true value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// The stored score is exact.
    Exact,
    /// The search failed high; the true value is at least the score.
    Lower,
    /// The search failed low; the true value is at most the score.
    Upper,
}

/// A stored search result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtEntry {
    pub key: u64,
    pub depth: u8,
    pub bound: Bound,
    /// Score relative to this node; see [`score_to_tt`].
    pub score: i32,
    pub best_move: Option<Move>,
}

/// Convert a search score to TT-storable form.
///
/// Mate scores count plies from the root. Stored entries count them from
/// the node instead, so a hit at a different ply still reports the right
/// distance to mate.
pub fn score_to_tt(score: i32, ply: usize) -> i32 {
    if score > MATE_THRESHOLD {
        score + ply as i32
    } else if score < -MATE_THRESHOLD {
        score - ply as i32
    } else {
        score
    }
}

/// Reverse of [`score_to_tt`].
pub fn score_from_tt(score: i32, ply: usize) -> i32 {
    if score > MATE_THRESHOLD {
        score - ply as i32
    } else if score < -MATE_THRESHOLD {
        score + ply as i32
    } else {
        score
    }
}

/// Largest table size accepted, in megabytes. Larger requests are clamped.
pub const MAX_TT_MB: usize = 65_536;

/// Slots in a table of roughly `mb` megabytes: a power of two, minimum one.
fn slot_count(mb: usize) -> usize {
    let bytes = mb.min(MAX_TT_MB).saturating_mul(1024 * 1024);
    let slot_size = std::mem::size_of::<Option<TtEntry>>();
    ((bytes / slot_size).next_power_of_two() >> 1).max(1)
}

pub struct TranspositionTable {
    slots: Vec<Option<TtEntry>>,
    /// `slots.len() - 1`; the length is a power of two.
    mask: u64,
    filled: usize,
}

impl TranspositionTable {
    /// Create a table of roughly `mb` megabytes.
    ///
    /// The number of slots is rounded down to a power of two, minimum one.
    /// Sizes above [`MAX_TT_MB`] are clamped.
    pub fn new(mb: usize) -> Self {
        let slots = slot_count(mb);
        Self {
            slots: vec![None; slots],
            mask: (slots - 1) as u64,
            filled: 0,
        }
    }

    pub fn clear(&mut self) {
        self.slots.fill(None);
        self.filled = 0;
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Occupied slots per thousand.
    pub fn hashfull(&self) -> usize {
        self.filled * 1000 / self.capacity()
    }

    /// Look up `hash`, converting a stored mate score to be relative to `ply`.
    pub fn probe(&self, hash: u64, ply: usize) -> Option<TtEntry> {
        let entry = self.slots[(hash & self.mask) as usize]?;
        if entry.key != hash {
            return None;
        }
        Some(TtEntry {
            score: score_from_tt(entry.score, ply),
            ..entry
        })
    }

    /// Store a result, replacing whatever occupied the slot.
    pub fn store(
        &mut self,
        hash: u64,
        depth: u8,
        bound: Bound,
        score: i32,
        best_move: Option<Move>,
        ply: usize,
    ) {
        let slot = &mut self.slots[(hash & self.mask) as usize];
        if slot.is_none() {
            self.filled += 1;
        }
        *slot = Some(TtEntry {
            key: hash,
            depth,
            bound,
            score: score_to_tt(score, ply),
            best_move,
        });
    }
}

impl std::fmt::Debug for TranspositionTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranspositionTable")
            .field("slots", &self.capacity())
            .field("filled", &self.filled)
            .finish()
    }
}
