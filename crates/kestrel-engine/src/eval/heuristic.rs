//! Hand-crafted evaluation: tapered material and piece-square tables,
//! bishop pair, mobility and a check penalty.

use kestrel_core::{ALL_PIECES, Color, PieceKind, Position};

use crate::error::EvalError;
use crate::eval::Evaluator;
use crate::eval::params::EvalParams;
use crate::eval::phase::{game_phase, taper};
use crate::eval::pst::pst_value;

/// Default evaluator. Never fails.
#[derive(Debug, Clone, Default)]
pub struct HeuristicEvaluator {
    params: EvalParams,
}

impl HeuristicEvaluator {
    /// A `phase_cap` below 1 is raised to 1.
    pub fn new(mut params: EvalParams) -> Self {
        params.phase_cap = params.phase_cap.max(1);
        Self { params }
    }

    /// Tapered material plus piece-square score, White minus Black.
    ///
    /// Antisymmetric under colour mirroring: `f(mirror(p)) == -f(p)`.
    pub fn material_and_pst(&self, pos: &Position) -> i32 {
        let p = &self.params;
        let mut mg = 0;
        let mut eg = 0;
        for color in [Color::White, Color::Black] {
            let sign = color_sign(color);
            for kind in ALL_PIECES {
                let k = kind.to_index();
                for sq in pos.pieces(color, kind) {
                    mg += sign * (p.mg_values[k] + pst_value(&p.mg_pst, kind, color, sq));
                    eg += sign * (p.eg_values[k] + pst_value(&p.eg_pst, kind, color, sq));
                }
            }
        }
        taper(mg, eg, game_phase(pos, p), p.phase_cap)
    }

    /// Full static score from White's point of view.
    pub fn score(&self, pos: &Position) -> i32 {
        let p = &self.params;
        let mut score = self.material_and_pst(pos);

        for color in [Color::White, Color::Black] {
            if pos.pieces(color, PieceKind::Bishop).popcnt() >= 2 {
                score += color_sign(color) * p.bishop_pair;
            }
        }

        let stm = color_sign(pos.side_to_move());
        score += stm * p.mobility_weight * pos.legal_move_count() as i32;
        if pos.is_check() {
            score -= stm * p.check_penalty;
        }
        score
    }
}

impl Evaluator for HeuristicEvaluator {
    fn name(&self) -> &str {
        "heuristic"
    }

    fn evaluate(&mut self, pos: &Position) -> Result<i32, EvalError> {
        Ok(self.score(pos))
    }
}

#[inline]
fn color_sign(color: Color) -> i32 {
    match color {
        Color::White => 1,
        Color::Black => -1,
    }
}

#[cfg(test)]
mod tests {
    use kestrel_core::Position;

    use super::HeuristicEvaluator;
    use crate::eval::params::EvalParams;

    const POSITIONS: &[&str] = &[
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        "r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4",
        "r3k2r/pppq1ppp/2n5/3pP3/8/8/PPP2PPP/R3K2R w KQk - 0 9",
        "8/5pk1/6p1/8/3B4/6P1/5PK1/8 b - - 0 40",
        "4k3/8/8/3q4/4P3/8/8/4K3 w - - 0 1",
    ];

    #[test]
    fn start_position_material_is_balanced() {
        let eval = HeuristicEvaluator::default();
        assert_eq!(eval.material_and_pst(&Position::starting_position()), 0);
    }

    #[test]
    fn start_position_scores_mobility_only() {
        let eval = HeuristicEvaluator::default();
        // 20 legal moves, White to move, both sides hold the bishop pair.
        assert_eq!(eval.score(&Position::starting_position()), 200);
    }

    #[test]
    fn material_and_pst_is_antisymmetric() {
        let eval = HeuristicEvaluator::default();
        for fen in POSITIONS {
            let pos: Position = fen.parse().unwrap();
            let mirrored = pos.mirrored().unwrap();
            assert_eq!(
                eval.material_and_pst(&pos),
                -eval.material_and_pst(&mirrored),
                "{fen}"
            );
        }
    }

    #[test]
    fn full_score_is_antisymmetric() {
        let eval = HeuristicEvaluator::default();
        for fen in POSITIONS {
            let pos: Position = fen.parse().unwrap();
            let mirrored = pos.mirrored().unwrap();
            assert_eq!(eval.score(&pos), -eval.score(&mirrored), "{fen}");
        }
    }

    #[test]
    fn extra_queen_dominates() {
        let eval = HeuristicEvaluator::default();
        let pos: Position = "4k3/8/8/3q4/4P3/8/8/4K3 w - - 0 1".parse().unwrap();
        assert!(eval.material_and_pst(&pos) < -700);
    }

    #[test]
    fn zero_phase_cap_is_clamped() {
        let eval = HeuristicEvaluator::new(EvalParams {
            phase_cap: 0,
            ..EvalParams::default()
        });
        for fen in POSITIONS {
            let pos: Position = fen.parse().unwrap();
            let mirrored = pos.mirrored().unwrap();
            assert_eq!(eval.score(&pos), -eval.score(&mirrored), "{fen}");
        }
        // Bare kings taper to the endgame score either way.
        let bare: Position = "8/8/4k3/8/8/4K3/8/8 w - - 0 1".parse().unwrap();
        assert_eq!(eval.material_and_pst(&bare), HeuristicEvaluator::default().material_and_pst(&bare));
    }

    #[test]
    fn check_costs_the_side_to_move() {
        let eval = HeuristicEvaluator::default();
        let pos: Position = "4k3/8/8/8/8/8/4q3/4K3 w - - 0 1".parse().unwrap();
        let base = eval.material_and_pst(&pos);
        let moves = pos.legal_move_count() as i32;
        assert_eq!(eval.score(&pos), base + 10 * moves - 50);
    }
}
