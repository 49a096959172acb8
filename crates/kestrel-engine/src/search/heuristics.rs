//! Killer moves and history scores for ordering quiet moves.

use kestrel_core::Move;

/// Killer slots kept per remaining depth.
pub const KILLERS_PER_DEPTH: usize = 2;

/// Quiet moves that caused a beta cutoff, keyed by remaining depth.
pub struct KillerTable {
    slots: [[Option<Move>; KILLERS_PER_DEPTH]; 256],
}

impl KillerTable {
    pub fn new() -> Self {
        Self {
            slots: [[None; KILLERS_PER_DEPTH]; 256],
        }
    }

    /// Record a cutoff move at `depth`.
    ///
    /// A move already present stays where it is; otherwise it goes to the
    /// front and the oldest killer drops out.
    pub fn store(&mut self, depth: u8, mv: Move) {
        let slots = &mut self.slots[depth as usize];
        if slots.contains(&Some(mv)) {
            return;
        }
        slots.rotate_right(1);
        slots[0] = Some(mv);
    }

    /// Killers at `depth`, most recent first.
    pub fn at(&self, depth: u8) -> &[Option<Move>] {
        &self.slots[depth as usize]
    }

    pub fn clear(&mut self) {
        self.slots = [[None; KILLERS_PER_DEPTH]; 256];
    }
}

impl Default for KillerTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Cutoff counts indexed `[from][to]`, bumped by `depth * depth`.
///
/// Scores only grow within a game and saturate instead of wrapping.
pub struct HistoryTable {
    table: Box<[[u32; 64]; 64]>,
}

impl HistoryTable {
    pub fn new() -> Self {
        Self {
            table: Box::new([[0; 64]; 64]),
        }
    }

    /// Reward a quiet move that caused a beta cutoff at `depth`.
    pub fn record(&mut self, mv: Move, depth: u8) {
        let bonus = u32::from(depth) * u32::from(depth);
        let entry = &mut self.table[mv.get_source().to_index()][mv.get_dest().to_index()];
        *entry = entry.saturating_add(bonus);
    }

    pub fn score(&self, mv: Move) -> u32 {
        self.table[mv.get_source().to_index()][mv.get_dest().to_index()]
    }

    pub fn clear(&mut self) {
        self.table.iter_mut().for_each(|row| row.fill(0));
    }
}

impl Default for HistoryTable {
    fn default() -> Self {
        Self::new()
    }
}
