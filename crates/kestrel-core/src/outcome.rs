//! Terminal states of a position.

use std::fmt;

/// Why a position is terminal for search purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// The side to move is in check and has no legal moves.
    Checkmate,
    /// The side to move is not in check and has no legal moves.
    Stalemate,
    /// Neither side has enough material to deliver mate.
    InsufficientMaterial,
    /// The current position occurred at least three times.
    Repetition,
    /// One hundred half-moves without a capture or pawn move.
    FiftyMoveRule,
}

impl Outcome {
    /// Every outcome other than checkmate scores as a draw.
    pub fn is_draw(self) -> bool {
        !matches!(self, Outcome::Checkmate)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Outcome::Checkmate => "checkmate",
            Outcome::Stalemate => "stalemate",
            Outcome::InsufficientMaterial => "insufficient material",
            Outcome::Repetition => "threefold repetition",
            Outcome::FiftyMoveRule => "fifty-move rule",
        };
        f.write_str(text)
    }
}
