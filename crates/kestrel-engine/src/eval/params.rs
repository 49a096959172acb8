//! Tunable evaluation parameters.

use kestrel_core::PieceKind;

use crate::eval::pst::{EG_PST, MG_PST};

/// Middlegame piece values, indexed by [`PieceKind::to_index`].
pub const MG_VALUES: [i32; 6] = [100, 320, 330, 500, 900, 20_000];

/// Endgame piece values.
pub const EG_VALUES: [i32; 6] = [120, 280, 300, 550, 950, 20_000];

/// Weights and tables consumed by [`HeuristicEvaluator`](crate::HeuristicEvaluator)
/// and by move ordering.
///
/// Immutable once handed to an evaluator. Values are from White's
/// perspective; tables are in LERF order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalParams {
    /// Piece values used in the middlegame and for capture ordering.
    pub mg_values: [i32; 6],
    /// Piece values used in the endgame.
    pub eg_values: [i32; 6],
    /// Middlegame piece-square tables.
    pub mg_pst: [[i32; 64]; 6],
    /// Endgame piece-square tables.
    pub eg_pst: [[i32; 64]; 6],
    /// Bonus for holding both bishops.
    pub bishop_pair: i32,
    /// Bonus per legal move for the side to move.
    pub mobility_weight: i32,
    /// Penalty for the side to move being in check.
    pub check_penalty: i32,
    /// Non-king material (middlegame values, both sides) at which the
    /// position counts as a pure middlegame.
    pub phase_cap: i32,
}

impl EvalParams {
    /// Middlegame value of `kind`.
    #[inline]
    pub fn value(&self, kind: PieceKind) -> i32 {
        self.mg_values[kind.to_index()]
    }
}

impl Default for EvalParams {
    fn default() -> Self {
        Self {
            mg_values: MG_VALUES,
            eg_values: EG_VALUES,
            mg_pst: MG_PST,
            eg_pst: EG_PST,
            bishop_pair: 30,
            mobility_weight: 10,
            check_penalty: 50,
            phase_cap: 6000,
        }
    }
}
