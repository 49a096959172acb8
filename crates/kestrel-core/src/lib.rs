//! Rules-engine boundary for kestrel: a mutable position with make/unmake,
//! terminal predicates, and hashing, backed by the `chess` crate.

mod error;
mod guard;
mod outcome;
mod position;

pub use chess::{BitBoard, ChessMove as Move, Color, File, Piece as PieceKind, Rank, Square};
pub use chess::{ALL_PIECES, ALL_SQUARES};

pub use error::{FenError, MoveError};
pub use guard::MoveGuard;
pub use outcome::Outcome;
pub use position::{Position, STARTING_FEN};
