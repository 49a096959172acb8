//! Move ordering: TT move, MVV-LVA captures, promotions, killers, history.

use std::cmp::Reverse;

use kestrel_core::{Move, Position};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::search::heuristics::HistoryTable;

/// Bonus for the move stored in the transposition table.
pub const TT_MOVE_BONUS: i32 = 2_000_000;

/// Base bonus for any capture, on top of MVV-LVA.
pub const CAPTURE_BONUS: i32 = 100_000;

/// Bonus for a quiet killer move.
pub const KILLER_BONUS: i32 = 9_000;

/// History contribution is capped so it never outranks a killer.
pub const HISTORY_CAP: i32 = 8_000;

/// Sorts moves by heuristic promise, highest first.
///
/// Score bands, additive:
/// - TT move: +2,000,000
/// - Capture: +100,000 + victim * 10 - aggressor (en passant victim is a pawn)
/// - Promotion: + promoted piece * 10
/// - Quiet killer: +9,000
/// - Quiet history: + min(history, 8,000)
///
/// Ties keep generation order unless tie-breaking is seeded, in which case
/// the list is shuffled before the stable sort.
pub struct MoveOrderer {
    values: [i32; 6],
    tie_break: Option<StdRng>,
}

impl MoveOrderer {
    /// Orderer using `values` (indexed by piece kind) for captures and promotions.
    pub fn new(values: [i32; 6]) -> Self {
        Self {
            values,
            tie_break: None,
        }
    }

    /// Orderer that breaks ties randomly but reproducibly from `seed`.
    pub fn with_tie_break(values: [i32; 6], seed: u64) -> Self {
        Self {
            values,
            tie_break: Some(StdRng::seed_from_u64(seed)),
        }
    }

    /// Ordering score of a single move.
    pub fn score(
        &self,
        pos: &Position,
        mv: Move,
        tt_move: Option<Move>,
        killers: &[Option<Move>],
        history: &HistoryTable,
    ) -> i32 {
        let mut score = 0;
        if tt_move == Some(mv) {
            score += TT_MOVE_BONUS;
        }
        if let Some(victim) = pos.captured_piece(mv) {
            let aggressor = pos.moved_piece(mv).map_or(0, |kind| self.values[kind.to_index()]);
            score += CAPTURE_BONUS + self.values[victim.to_index()] * 10 - aggressor;
        } else {
            if killers.contains(&Some(mv)) {
                score += KILLER_BONUS;
            }
            score += history.score(mv).min(HISTORY_CAP as u32) as i32;
        }
        if let Some(promo) = mv.get_promotion() {
            score += self.values[promo.to_index()] * 10;
        }
        score
    }

    /// Return `moves` sorted best first.
    pub fn order(
        &mut self,
        pos: &Position,
        moves: Vec<Move>,
        tt_move: Option<Move>,
        killers: &[Option<Move>],
        history: &HistoryTable,
    ) -> Vec<Move> {
        let mut scored: Vec<(i32, Move)> = moves
            .into_iter()
            .map(|mv| (self.score(pos, mv, tt_move, killers, history), mv))
            .collect();
        if let Some(rng) = &mut self.tie_break {
            scored.shuffle(rng);
        }
        scored.sort_by_key(|&(score, _)| Reverse(score));
        scored.into_iter().map(|(_, mv)| mv).collect()
    }
}

#[cfg(test)]
mod tests {
    use kestrel_core::{Move, PieceKind, Position, Square};

    use super::*;
    use crate::eval::params::MG_VALUES;
    use crate::search::heuristics::{HistoryTable, KillerTable};

    fn ordered(fen: &str, tt_move: Option<Move>, killers: &KillerTable, history: &HistoryTable) -> Vec<Move> {
        let pos: Position = fen.parse().unwrap();
        let moves = pos.legal_moves();
        MoveOrderer::new(MG_VALUES).order(&pos, moves, tt_move, killers.at(1), history)
    }

    #[test]
    fn free_queen_capture_comes_first() {
        let fen = "4k3/8/8/3q4/4P3/8/8/4K3 w - - 0 1";
        let moves = ordered(fen, None, &KillerTable::new(), &HistoryTable::new());
        assert_eq!(moves[0], Move::new(Square::E4, Square::D5, None));
    }

    #[test]
    fn tt_move_outranks_captures() {
        let fen = "4k3/8/8/3q4/4P3/8/8/4K3 w - - 0 1";
        let hint = Move::new(Square::E1, Square::F2, None);
        let moves = ordered(fen, Some(hint), &KillerTable::new(), &HistoryTable::new());
        assert_eq!(moves[0], hint);
        assert_eq!(moves[1], Move::new(Square::E4, Square::D5, None));
    }

    #[test]
    fn mvv_lva_prefers_cheaper_attacker() {
        // Both the pawn and the queen can take the rook on d5.
        let pos: Position = "4k3/8/8/3r4/4P3/8/8/3QK3 w - - 0 1".parse().unwrap();
        let orderer = MoveOrderer::new(MG_VALUES);
        let history = HistoryTable::new();
        let pawn = Move::new(Square::E4, Square::D5, None);
        let queen = Move::new(Square::D1, Square::D5, None);
        assert_eq!(orderer.score(&pos, pawn, None, &[], &history), 100_000 + 5000 - 100);
        assert_eq!(orderer.score(&pos, queen, None, &[], &history), 100_000 + 5000 - 900);
    }

    #[test]
    fn en_passant_victim_is_a_pawn() {
        let pos: Position = "4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2".parse().unwrap();
        let ep = Move::new(Square::E5, Square::D6, None);
        let orderer = MoveOrderer::new(MG_VALUES);
        assert_eq!(
            orderer.score(&pos, ep, None, &[], &HistoryTable::new()),
            100_000 + 1000 - 100
        );
    }

    #[test]
    fn promotion_adds_piece_value() {
        let pos: Position = "8/4P3/8/8/8/8/k7/4K3 w - - 0 1".parse().unwrap();
        let orderer = MoveOrderer::new(MG_VALUES);
        let history = HistoryTable::new();
        let queen = Move::new(Square::E7, Square::E8, Some(PieceKind::Queen));
        let knight = Move::new(Square::E7, Square::E8, Some(PieceKind::Knight));
        assert_eq!(orderer.score(&pos, queen, None, &[], &history), 9000);
        assert_eq!(orderer.score(&pos, knight, None, &[], &history), 3200);
    }

    #[test]
    fn killers_and_capped_history_order_quiets() {
        let fen = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
        let killer = Move::new(Square::B1, Square::C3, None);
        let hot = Move::new(Square::G1, Square::F3, None);
        let mut killers = KillerTable::new();
        killers.store(1, killer);
        let mut history = HistoryTable::new();
        for _ in 0..1000 {
            history.record(hot, 10);
        }
        let moves = ordered(fen, None, &killers, &history);
        // Killer 9,000 beats history capped at 8,000.
        assert_eq!(moves[0], killer);
        assert_eq!(moves[1], hot);
    }

    #[test]
    fn ties_keep_generation_order() {
        let pos = Position::starting_position();
        let moves = pos.legal_moves();
        let sorted = MoveOrderer::new(MG_VALUES).order(&pos, moves.clone(), None, &[], &HistoryTable::new());
        assert_eq!(sorted, moves);
    }

    #[test]
    fn seeded_tie_break_is_reproducible() {
        let pos = Position::starting_position();
        let history = HistoryTable::new();
        let a = MoveOrderer::with_tie_break(MG_VALUES, 7).order(&pos, pos.legal_moves(), None, &[], &history);
        let b = MoveOrderer::with_tie_break(MG_VALUES, 7).order(&pos, pos.legal_moves(), None, &[], &history);
        assert_eq!(a, b);
        assert_eq!(a.len(), 20);
    }
}
