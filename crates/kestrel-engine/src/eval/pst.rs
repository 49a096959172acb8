//! Default piece-square tables.
//!
//! All tables are from White's perspective in LERF order:
//! index 0 = A1, index 7 = H1, index 8 = A2, ..., index 63 = H8.
//! Black pieces look up the vertically mirrored square (`sq ^ 56`).
//!
//! The rows below are deliberately listed rank 1 first. Tables copied from
//! rank-8-first listings must be flipped, or a pawn on its home rank picks
//! up the seventh-rank bonus.

use kestrel_core::{Color, PieceKind, Square};

/// Pawn table. Ranks 1 and 8 are unreachable and stay zero.
#[rustfmt::skip]
const PAWN_PST: [i32; 64] = [
    // Rank 1
      0,   0,   0,   0,   0,   0,   0,   0,
    // Rank 2
      5,  10,  10, -20, -20,  10,  10,   5,
    // Rank 3
      5,  -5, -10,   0,   0, -10,  -5,   5,
    // Rank 4
      0,   0,   0,  20,  20,   0,   0,   0,
    // Rank 5
      5,   5,  10,  25,  25,  10,   5,   5,
    // Rank 6
     10,  10,  20,  30,  30,  20,  10,  10,
    // Rank 7
     50,  50,  50,  50,  50,  50,  50,  50,
    // Rank 8
      0,   0,   0,   0,   0,   0,   0,   0,
];

#[rustfmt::skip]
const KNIGHT_PST: [i32; 64] = [
    // Rank 1
    -50, -40, -30, -30, -30, -30, -40, -50,
    // Rank 2
    -40, -20,   0,   5,   5,   0, -20, -40,
    // Rank 3
    -30,   5,  10,  15,  15,  10,   5, -30,
    // Rank 4
    -30,   0,  15,  20,  20,  15,   0, -30,
    // Rank 5
    -30,   5,  15,  20,  20,  15,   5, -30,
    // Rank 6
    -30,   0,  10,  15,  15,  10,   0, -30,
    // Rank 7
    -40, -20,   0,   0,   0,   0, -20, -40,
    // Rank 8
    -50, -40, -30, -30, -30, -30, -40, -50,
];

#[rustfmt::skip]
const BISHOP_PST: [i32; 64] = [
    // Rank 1
    -20, -10, -10, -10, -10, -10, -10, -20,
    // Rank 2
    -10,   5,   0,   0,   0,   0,   5, -10,
    // Rank 3
    -10,  10,  10,  10,  10,  10,  10, -10,
    // Rank 4
    -10,   0,  10,  10,  10,  10,   0, -10,
    // Rank 5
    -10,   5,   5,  10,  10,   5,   5, -10,
    // Rank 6
    -10,   0,   5,  10,  10,   5,   0, -10,
    // Rank 7
    -10,   0,   0,   0,   0,   0,   0, -10,
    // Rank 8
    -20, -10, -10, -10, -10, -10, -10, -20,
];

/// Rook table. Rewards the seventh rank and central files on the back rank.
#[rustfmt::skip]
const ROOK_PST: [i32; 64] = [
    // Rank 1
      0,   0,   0,   5,   5,   0,   0,   0,
    // Rank 2
     -5,   0,   0,   0,   0,   0,   0,  -5,
    // Rank 3
     -5,   0,   0,   0,   0,   0,   0,  -5,
    // Rank 4
     -5,   0,   0,   0,   0,   0,   0,  -5,
    // Rank 5
     -5,   0,   0,   0,   0,   0,   0,  -5,
    // Rank 6
     -5,   0,   0,   0,   0,   0,   0,  -5,
    // Rank 7
      5,  10,  10,  10,  10,  10,  10,   5,
    // Rank 8
      0,   0,   0,   0,   0,   0,   0,   0,
];

#[rustfmt::skip]
const QUEEN_PST: [i32; 64] = [
    // Rank 1
    -20, -10, -10,  -5,  -5, -10, -10, -20,
    // Rank 2
    -10,   0,   5,   0,   0,   0,   0, -10,
    // Rank 3
    -10,   5,   5,   5,   5,   5,   0, -10,
    // Rank 4
      0,   0,   5,   5,   5,   5,   0,  -5,
    // Rank 5
     -5,   0,   5,   5,   5,   5,   0,  -5,
    // Rank 6
    -10,   0,   5,   5,   5,   5,   0, -10,
    // Rank 7
    -10,   0,   0,   0,   0,   0,   0, -10,
    // Rank 8
    -20, -10, -10,  -5,  -5, -10, -10, -20,
];

/// King table while material is on the board: stay behind the pawns.
#[rustfmt::skip]
const KING_MG_PST: [i32; 64] = [
    // Rank 1
     20,  30,  10,   0,   0,  10,  30,  20,
    // Rank 2
     20,  20,   0,   0,   0,   0,  20,  20,
    // Rank 3
    -10, -20, -20, -20, -20, -20, -20, -10,
    // Rank 4
    -20, -30, -30, -40, -40, -30, -30, -20,
    // Rank 5
    -30, -40, -40, -50, -50, -40, -40, -30,
    // Rank 6
    -30, -40, -40, -50, -50, -40, -40, -30,
    // Rank 7
    -30, -40, -40, -50, -50, -40, -40, -30,
    // Rank 8
    -30, -40, -40, -50, -50, -40, -40, -30,
];

/// King table for the endgame: centralize.
#[rustfmt::skip]
const KING_EG_PST: [i32; 64] = [
    // Rank 1
    -50, -30, -30, -30, -30, -30, -30, -50,
    // Rank 2
    -30, -30,   0,   0,   0,   0, -30, -30,
    // Rank 3
    -30, -10,  20,  30,  30,  20, -10, -30,
    // Rank 4
    -30, -10,  30,  40,  40,  30, -10, -30,
    // Rank 5
    -30, -10,  30,  40,  40,  30, -10, -30,
    // Rank 6
    -30, -10,  20,  30,  30,  20, -10, -30,
    // Rank 7
    -30, -20, -10,   0,   0, -10, -20, -30,
    // Rank 8
    -50, -40, -30, -20, -20, -30, -40, -50,
];

/// Middlegame tables indexed `[piece_kind][square]`.
pub const MG_PST: [[i32; 64]; 6] = [
    PAWN_PST,
    KNIGHT_PST,
    BISHOP_PST,
    ROOK_PST,
    QUEEN_PST,
    KING_MG_PST,
];

/// Endgame tables. Only the king differs from [`MG_PST`].
pub const EG_PST: [[i32; 64]; 6] = [
    PAWN_PST,
    KNIGHT_PST,
    BISHOP_PST,
    ROOK_PST,
    QUEEN_PST,
    KING_EG_PST,
];

/// Index into a White-perspective table for a piece of `color` on `sq`.
#[inline]
pub fn table_index(color: Color, sq: Square) -> usize {
    let idx = sq.to_index();
    match color {
        Color::White => idx,
        Color::Black => idx ^ 56,
    }
}

/// Look up `kind` on `sq` for `color` in `table`.
#[inline]
pub fn pst_value(table: &[[i32; 64]; 6], kind: PieceKind, color: Color, sq: Square) -> i32 {
    table[kind.to_index()][table_index(color, sq)]
}

#[cfg(test)]
mod tests {
    use kestrel_core::{Color, PieceKind, Rank, Square};

    use super::{pst_value, EG_PST, MG_PST};

    #[test]
    fn black_mirrors_white() {
        for &kind in &kestrel_core::ALL_PIECES {
            for sq in kestrel_core::ALL_SQUARES {
                let rank = Rank::from_index(7 - sq.get_rank().to_index());
                let mirrored = Square::make_square(rank, sq.get_file());
                assert_eq!(
                    pst_value(&MG_PST, kind, Color::White, sq),
                    pst_value(&MG_PST, kind, Color::Black, mirrored),
                );
            }
        }
    }

    #[test]
    fn advanced_pawns_score_higher() {
        assert_eq!(pst_value(&MG_PST, PieceKind::Pawn, Color::White, Square::E7), 50);
        assert_eq!(pst_value(&MG_PST, PieceKind::Pawn, Color::Black, Square::E2), 50);
        assert_eq!(pst_value(&MG_PST, PieceKind::Pawn, Color::White, Square::E2), -20);
    }

    #[test]
    fn castled_king_beats_centre_in_middlegame_only() {
        let g1 = pst_value(&MG_PST, PieceKind::King, Color::White, Square::G1);
        let e4 = pst_value(&MG_PST, PieceKind::King, Color::White, Square::E4);
        assert!(g1 > e4);
        let g1 = pst_value(&EG_PST, PieceKind::King, Color::White, Square::G1);
        let e4 = pst_value(&EG_PST, PieceKind::King, Color::White, Square::E4);
        assert!(e4 > g1);
    }
}
