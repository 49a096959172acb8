//! Game phase from remaining material.

use kestrel_core::{ALL_PIECES, Color, PieceKind, Position};

use crate::eval::params::EvalParams;

/// Total non-king material of both sides at middlegame values, capped at
/// `params.phase_cap`.
///
/// Returns a value in `0..=phase_cap`: the cap means a full middlegame,
/// 0 a bare-kings ending. The cap keeps promotions from pushing past a
/// pure middlegame.
pub fn game_phase(pos: &Position, params: &EvalParams) -> i32 {
    let mut total = 0;
    for kind in ALL_PIECES {
        if kind == PieceKind::King {
            continue;
        }
        let count = pos.pieces(Color::White, kind).popcnt() + pos.pieces(Color::Black, kind).popcnt();
        total += params.value(kind) * count as i32;
    }
    total.min(params.phase_cap)
}

/// Blend a middlegame and an endgame score by `phase`.
#[inline]
pub fn taper(mg: i32, eg: i32, phase: i32, cap: i32) -> i32 {
    (mg * phase + eg * (cap - phase)) / cap
}

#[cfg(test)]
mod tests {
    use kestrel_core::Position;

    use super::{game_phase, taper};
    use crate::eval::params::EvalParams;

    #[test]
    fn starting_position_is_capped() {
        let params = EvalParams::default();
        // 2 * (800 + 640 + 660 + 1000 + 900) = 8000 before the cap.
        assert_eq!(game_phase(&Position::starting_position(), &params), 6000);
    }

    #[test]
    fn bare_kings_is_zero() {
        let pos: Position = "8/8/4k3/8/8/4K3/8/8 w - - 0 1".parse().unwrap();
        assert_eq!(game_phase(&pos, &EvalParams::default()), 0);
    }

    #[test]
    fn rook_ending_counts_rooks_and_pawns() {
        let pos: Position = "4k3/4p3/8/8/8/8/4P3/R3K2R w - - 0 1".parse().unwrap();
        assert_eq!(game_phase(&pos, &EvalParams::default()), 1200);
    }

    #[test]
    fn taper_endpoints() {
        assert_eq!(taper(100, 40, 6000, 6000), 100);
        assert_eq!(taper(100, 40, 0, 6000), 40);
        assert_eq!(taper(100, 40, 3000, 6000), 70);
    }
}
