//! Mutable game position with an undo stack over the `chess` crate's board.

use std::fmt;
use std::str::FromStr;

use chess::{BitBoard, Board, BoardStatus, ChessMove, Color, MoveGen, Piece, Square, EMPTY};
use tracing::trace;

use crate::error::{FenError, MoveError};
use crate::guard::MoveGuard;
use crate::outcome::Outcome;

/// FEN for the standard starting position.
pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Undo entries reserved up front so search does not allocate per node.
const UNDO_RESERVE: usize = 256;

/// Dark squares: a1, c1, e1 and so on.
const DARK_SQUARES: BitBoard = BitBoard(0xAA55_AA55_AA55_AA55);

/// Snapshot restored by [`Position::unmake_move`].
#[derive(Clone, Copy)]
struct Undo {
    board: Board,
    mv: Option<ChessMove>,
    halfmove_clock: u32,
    fullmove_number: u32,
}

/// A single game position mutated in place by make/unmake.
///
/// The board itself comes from the `chess` crate; this type adds the pieces
/// the search needs on top of it: move counters, a hash history for
/// repetition detection, null moves, and a push/pop undo stack.
#[derive(Clone)]
pub struct Position {
    board: Board,
    halfmove_clock: u32,
    fullmove_number: u32,
    undo: Vec<Undo>,
    /// Hash of every position reached, oldest first; the last entry is the current one.
    hashes: Vec<u64>,
}

impl Position {
    /// The standard starting position.
    pub fn starting_position() -> Self {
        Self::from_board(Board::default(), 0, 1)
    }

    /// Parse a FEN string. The move counters are optional and default to `0 1`.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() < 4 {
            return Err(FenError::WrongFieldCount {
                found: fields.len(),
            });
        }

        let board = Board::from_str(&fields[..4].join(" ")).map_err(|e| FenError::Invalid {
            fen: fen.to_string(),
            reason: e.to_string(),
        })?;

        let halfmove_clock = parse_counter(fields.get(4), "halfmove clock", 0)?;
        let fullmove_number = parse_counter(fields.get(5), "fullmove number", 1)?;

        trace!(fen, "parsed position");
        Ok(Self::from_board(board, halfmove_clock, fullmove_number.max(1)))
    }

    fn from_board(board: Board, halfmove_clock: u32, fullmove_number: u32) -> Self {
        let mut hashes = Vec::with_capacity(UNDO_RESERVE);
        hashes.push(board.get_hash());
        Self {
            board,
            halfmove_clock,
            fullmove_number,
            undo: Vec::with_capacity(UNDO_RESERVE),
            hashes,
        }
    }

    /// Serialize to FEN, including the move counters.
    pub fn to_fen(&self) -> String {
        let board_fen = self.board.to_string();
        let fields: Vec<&str> = board_fen.split_whitespace().take(4).collect();
        format!(
            "{} {} {}",
            fields.join(" "),
            self.halfmove_clock,
            self.fullmove_number
        )
    }

    /// Side to move.
    pub fn side_to_move(&self) -> Color {
        self.board.side_to_move()
    }

    /// Zobrist hash of the current position (includes side to move, castling and en passant).
    pub fn hash(&self) -> u64 {
        self.board.get_hash()
    }

    /// Half-moves since the last capture or pawn move.
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    /// Number of moves (including null moves) currently on the undo stack.
    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    /// Whether the side to move is in check.
    pub fn is_check(&self) -> bool {
        *self.board.checkers() != EMPTY
    }

    /// All legal moves in generation order.
    pub fn legal_moves(&self) -> Vec<ChessMove> {
        MoveGen::new_legal(&self.board).collect()
    }

    /// Number of legal moves, without collecting them.
    pub fn legal_move_count(&self) -> usize {
        MoveGen::new_legal(&self.board).len()
    }

    /// Piece and color on `sq`, if any.
    pub fn piece_at(&self, sq: Square) -> Option<(Color, Piece)> {
        let piece = self.board.piece_on(sq)?;
        let color = self.board.color_on(sq)?;
        Some((color, piece))
    }

    /// Squares holding pieces of the given color and kind.
    pub fn pieces(&self, color: Color, kind: Piece) -> BitBoard {
        *self.board.pieces(kind) & *self.board.color_combined(color)
    }

    /// Kind of the piece making `mv`.
    pub fn moved_piece(&self, mv: ChessMove) -> Option<Piece> {
        self.board.piece_on(mv.get_source())
    }

    /// Whether `mv` captures, including en passant.
    pub fn is_capture(&self, mv: ChessMove) -> bool {
        self.board.color_on(mv.get_dest()) == Some(!self.side_to_move()) || self.is_en_passant(mv)
    }

    /// Kind of the piece removed by `mv`, if it is a capture.
    pub fn captured_piece(&self, mv: ChessMove) -> Option<Piece> {
        if self.is_en_passant(mv) {
            return Some(Piece::Pawn);
        }
        match self.piece_at(mv.get_dest()) {
            Some((color, piece)) if color != self.side_to_move() => Some(piece),
            _ => None,
        }
    }

    /// Whether `mv` is a pawn capturing en passant.
    pub fn is_en_passant(&self, mv: ChessMove) -> bool {
        self.moved_piece(mv) == Some(Piece::Pawn)
            && mv.get_source().get_file() != mv.get_dest().get_file()
            && self.board.piece_on(mv.get_dest()).is_none()
    }

    /// Whether `mv` leaves the opponent in check.
    pub fn gives_check(&self, mv: ChessMove) -> bool {
        *self.board.make_move_new(mv).checkers() != EMPTY
    }

    /// Parse a UCI move string (`e2e4`, `e7e8q`) and check it is legal here.
    pub fn parse_uci(&self, text: &str) -> Result<ChessMove, MoveError> {
        let wanted = text.trim().to_ascii_lowercase();
        MoveGen::new_legal(&self.board)
            .find(|mv| mv.to_string() == wanted)
            .ok_or_else(|| MoveError::Illegal {
                uci: text.to_string(),
            })
    }

    /// Apply a legal move in place. The caller guarantees legality.
    pub fn make_move(&mut self, mv: ChessMove) {
        let irreversible = self.is_capture(mv) || self.moved_piece(mv) == Some(Piece::Pawn);
        self.push_undo(Some(mv));
        self.halfmove_clock = if irreversible {
            0
        } else {
            self.halfmove_clock + 1
        };
        self.board = self.board.make_move_new(mv);
        self.hashes.push(self.board.get_hash());
    }

    /// Pass the turn without moving. Returns `false` (and changes nothing) when in check.
    pub fn make_null_move(&mut self) -> bool {
        let Some(next) = self.board.null_move() else {
            return false;
        };
        self.push_undo(None);
        self.halfmove_clock += 1;
        self.board = next;
        self.hashes.push(self.board.get_hash());
        true
    }

    /// Undo the most recent move or null move.
    ///
    /// Returns the move that was undone (`None` for a null move).
    pub fn unmake_move(&mut self) -> Result<Option<ChessMove>, MoveError> {
        let undo = self.undo.pop().ok_or(MoveError::NothingToUndo)?;
        self.board = undo.board;
        self.halfmove_clock = undo.halfmove_clock;
        self.fullmove_number = undo.fullmove_number;
        self.hashes.pop();
        Ok(undo.mv)
    }

    /// Apply `mv` for the lifetime of the returned guard.
    pub fn play(&mut self, mv: ChessMove) -> MoveGuard<'_> {
        self.make_move(mv);
        MoveGuard::new(self)
    }

    /// Pass the turn for the lifetime of the returned guard; `None` when in check.
    pub fn play_null(&mut self) -> Option<MoveGuard<'_>> {
        if self.make_null_move() {
            Some(MoveGuard::new(self))
        } else {
            None
        }
    }

    fn push_undo(&mut self, mv: Option<ChessMove>) {
        self.undo.push(Undo {
            board: self.board,
            mv,
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
        });
        if self.board.side_to_move() == Color::Black {
            self.fullmove_number += 1;
        }
    }

    /// How many times the current position has occurred since the last
    /// irreversible move, counting the current occurrence.
    pub fn repetition_count(&self) -> usize {
        let current = self.hash();
        let window = (self.halfmove_clock as usize).min(self.hashes.len() - 1);
        self.hashes
            .iter()
            .rev()
            .take(window + 1)
            .step_by(2)
            .filter(|&&h| h == current)
            .count()
    }

    /// Neither side can possibly deliver mate: bare kings, a single minor
    /// piece, or only bishops that all stand on one square color.
    pub fn is_insufficient_material(&self) -> bool {
        let board = &self.board;
        let heavy = *board.pieces(Piece::Pawn) | *board.pieces(Piece::Rook) | *board.pieces(Piece::Queen);
        if heavy != EMPTY {
            return false;
        }

        let knights = board.pieces(Piece::Knight).popcnt();
        let bishops = *board.pieces(Piece::Bishop);
        if knights + bishops.popcnt() <= 1 {
            return true;
        }
        if knights > 0 {
            return false;
        }

        let dark = bishops & DARK_SQUARES;
        dark == EMPTY || dark == bishops
    }

    /// Terminal state of the position, checked in priority order.
    pub fn outcome(&self) -> Option<Outcome> {
        match self.board.status() {
            BoardStatus::Checkmate => return Some(Outcome::Checkmate),
            BoardStatus::Stalemate => return Some(Outcome::Stalemate),
            BoardStatus::Ongoing => {}
        }

        if self.is_insufficient_material() {
            Some(Outcome::InsufficientMaterial)
        } else if self.halfmove_clock >= 100 {
            Some(Outcome::FiftyMoveRule)
        } else if self.repetition_count() >= 3 {
            Some(Outcome::Repetition)
        } else {
            None
        }
    }

    /// The color-mirrored position: ranks flipped, colors and side to move
    /// swapped. Move history is not carried over.
    pub fn mirrored(&self) -> Result<Position, FenError> {
        let fen = self.to_fen();
        let fields: Vec<&str> = fen.split_whitespace().collect();

        let placement: Vec<String> = fields[0].split('/').rev().map(swap_case).collect();
        let side = if fields[1] == "w" { "b" } else { "w" };

        let castling = if fields[2] == "-" {
            "-".to_string()
        } else {
            let mut rights: Vec<char> = swap_case(fields[2]).chars().collect();
            rights.sort_by_key(|c| "KQkq".find(*c));
            rights.into_iter().collect()
        };

        let en_passant: String = fields[3]
            .chars()
            .map(|c| match c {
                '3' => '6',
                '6' => '3',
                other => other,
            })
            .collect();

        Position::from_fen(&format!(
            "{} {} {} {} {} {}",
            placement.join("/"),
            side,
            castling,
            en_passant,
            self.halfmove_clock,
            self.fullmove_number
        ))
    }
}

fn parse_counter(field: Option<&&str>, name: &'static str, default: u32) -> Result<u32, FenError> {
    match field {
        None => Ok(default),
        Some(text) => text.parse().map_err(|_| FenError::InvalidMoveCounter {
            field: name,
            found: text.to_string(),
        }),
    }
}

fn swap_case(text: &str) -> String {
    text.chars()
        .map(|c| {
            if c.is_ascii_uppercase() {
                c.to_ascii_lowercase()
            } else {
                c.to_ascii_uppercase()
            }
        })
        .collect()
}

impl Default for Position {
    fn default() -> Self {
        Self::starting_position()
    }
}

impl FromStr for Position {
    type Err = FenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_fen(s)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_fen())
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Position")
            .field("fen", &self.to_fen())
            .field("undo_depth", &self.undo.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(fen: &str) -> Position {
        fen.parse().unwrap()
    }

    #[test]
    fn starting_position_roundtrips_fen() {
        let p = Position::starting_position();
        assert_eq!(p.to_fen(), STARTING_FEN);
        assert_eq!(p.legal_move_count(), 20);
    }

    #[test]
    fn fen_counters_are_optional() {
        let p = pos("4k3/8/8/8/8/8/8/4K3 w - -");
        assert_eq!(p.halfmove_clock(), 0);
        assert!(p.to_fen().ends_with(" 0 1"));
    }

    #[test]
    fn bad_counter_rejected() {
        let err = Position::from_fen("4k3/8/8/8/8/8/8/4K3 w - - x 1").unwrap_err();
        assert!(matches!(err, FenError::InvalidMoveCounter { .. }));
    }

    #[test]
    fn too_few_fields_rejected() {
        let err = Position::from_fen("4k3/8/8/8/8/8/8/4K3 w").unwrap_err();
        assert_eq!(err, FenError::WrongFieldCount { found: 2 });
    }

    #[test]
    fn make_unmake_restores_counters() {
        let mut p = Position::starting_position();
        let start = p.to_fen();
        for uci in ["g1f3", "g8f6", "e2e4"] {
            let mv = p.parse_uci(uci).unwrap();
            p.make_move(mv);
        }
        assert_eq!(p.halfmove_clock(), 0);
        assert!(p.to_fen().ends_with(" 0 2"), "{}", p.to_fen());
        while p.undo_depth() > 0 {
            p.unmake_move().unwrap();
        }
        assert_eq!(p.to_fen(), start);
        assert_eq!(p.unmake_move(), Err(MoveError::NothingToUndo));
    }

    #[test]
    fn capture_flags() {
        // White pawn e5 can take d6 en passant; knight c3 can take d5.
        let p = pos("4k3/8/8/3pP3/8/2N5/8/4K3 w - d6 0 2");
        let ep = p.parse_uci("e5d6").unwrap();
        assert!(p.is_en_passant(ep));
        assert!(p.is_capture(ep));
        assert_eq!(p.captured_piece(ep), Some(Piece::Pawn));

        let nxd5 = p.parse_uci("c3d5").unwrap();
        assert!(p.is_capture(nxd5));
        assert!(!p.is_en_passant(nxd5));

        let quiet = p.parse_uci("c3b5").unwrap();
        assert!(!p.is_capture(quiet));
        assert_eq!(p.captured_piece(quiet), None);
    }

    #[test]
    fn parse_uci_rejects_illegal() {
        let p = Position::starting_position();
        assert!(p.parse_uci("e2e5").is_err());
        assert!(p.parse_uci("zz").is_err());
        assert_eq!(p.parse_uci("E2E4").unwrap().to_string(), "e2e4");
    }

    #[test]
    fn checkmate_and_stalemate_outcomes() {
        assert_eq!(pos("7k/6Q1/5K2/8/8/8/8/8 b - - 0 1").outcome(), Some(Outcome::Checkmate));
        assert_eq!(pos("k7/2K5/1Q6/8/8/8/8/8 b - - 0 1").outcome(), Some(Outcome::Stalemate));
        assert_eq!(Position::starting_position().outcome(), None);
    }

    #[test]
    fn insufficient_material_cases() {
        assert!(pos("8/8/4k3/8/8/4K3/8/8 w - - 0 1").is_insufficient_material());
        assert!(pos("8/8/4k3/8/8/4KN2/8/8 w - - 0 1").is_insufficient_material());
        // Bishops on c1 and f8 both stand on dark squares.
        assert!(pos("5b2/8/4k3/8/8/4K3/8/2B5 w - - 0 1").is_insufficient_material());
        // Bishops on opposite colors can still mate in principle.
        assert!(!pos("2b5/8/4k3/8/8/4K3/8/2B5 w - - 0 1").is_insufficient_material());
        assert!(!pos("8/8/4k3/8/8/4K3/4P3/8 w - - 0 1").is_insufficient_material());
    }

    #[test]
    fn fifty_move_rule() {
        let p = pos("8/8/4k3/8/8/4K3/4R3/8 w - - 100 80");
        assert_eq!(p.outcome(), Some(Outcome::FiftyMoveRule));
    }

    #[test]
    fn threefold_repetition() {
        let mut p = Position::starting_position();
        for _ in 0..2 {
            for uci in ["g1f3", "g8f6", "f3g1", "f6g8"] {
                let mv = p.parse_uci(uci).unwrap();
                p.make_move(mv);
            }
        }
        assert_eq!(p.repetition_count(), 3);
        assert_eq!(p.outcome(), Some(Outcome::Repetition));
        p.unmake_move().unwrap();
        assert_eq!(p.outcome(), None);
    }

    #[test]
    fn mirrored_swaps_everything() {
        let p = pos("r3k2r/pppq1ppp/2n5/3pP3/8/8/PPP2PPP/R3K2R w KQk - 0 9");
        let m = p.mirrored().unwrap();
        assert_eq!(m.side_to_move(), Color::Black);
        assert_eq!(m.to_fen(), "r3k2r/ppp2ppp/8/8/3Pp3/2N5/PPPQ1PPP/R3K2R b Kkq - 0 9");
        assert_eq!(m.mirrored().unwrap().to_fen(), p.to_fen());
    }
}
