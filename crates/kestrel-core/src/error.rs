//! Error types for FEN parsing and move handling.

/// Errors that occur when parsing a FEN string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FenError {
    /// The FEN string has fewer than the four mandatory fields.
    #[error("expected at least 4 FEN fields, found {found}")]
    WrongFieldCount {
        /// Number of fields found.
        found: usize,
    },
    /// A move counter (halfmove clock or fullmove number) is not a valid number.
    #[error("invalid {field}: \"{found}\"")]
    InvalidMoveCounter {
        /// The field name ("halfmove clock" or "fullmove number").
        field: &'static str,
        /// The invalid string.
        found: String,
    },
    /// The rules engine rejected the placement, side, castling or en passant fields.
    #[error("invalid FEN \"{fen}\": {reason}")]
    Invalid {
        /// The FEN string that failed to parse.
        fen: String,
        /// Reason reported by the rules engine.
        reason: String,
    },
}

/// Errors from move parsing and the undo stack.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    /// The UCI string is malformed or names a move that is not legal here.
    #[error("illegal or malformed move: {uci}")]
    Illegal {
        /// The offending UCI move string.
        uci: String,
    },
    /// `unmake_move` was called with an empty undo stack.
    #[error("no move to undo")]
    NothingToUndo,
}
