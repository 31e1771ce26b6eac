use serde::{Deserialize, Serialize};

use crate::error::RulesError;
use crate::moves::Move;
use crate::piece::{Color, Piece, PieceKind};
use crate::square::Square;

#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub struct CastlingRights {
    pub white_kingside: bool,
    pub white_queenside: bool,
    pub black_kingside: bool,
    pub black_queenside: bool,
}

impl CastlingRights {
    pub fn all() -> CastlingRights {
        CastlingRights {
            white_kingside: true,
            white_queenside: true,
            black_kingside: true,
            black_queenside: true,
        }
    }

    pub fn none() -> CastlingRights {
        CastlingRights {
            white_kingside: false,
            white_queenside: false,
            black_kingside: false,
            black_queenside: false,
        }
    }

    pub fn kingside(&self, color: Color) -> bool {
        match color {
            Color::White => self.white_kingside,
            Color::Black => self.black_kingside,
        }
    }

    pub fn queenside(&self, color: Color) -> bool {
        match color {
            Color::White => self.white_queenside,
            Color::Black => self.black_queenside,
        }
    }
}

/// One ply of reversible history: the move plus whatever apply is about to
/// overwrite. Rights and the en-passant target are snapshotted here so undo
/// restores them exactly instead of trying to recompute them.
#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
struct HistoryEntry {
    mv: Move,
    rights: CastlingRights,
    en_passant: Option<Square>,
}

/// The full game state: grid, side to move, tracked king squares, en-passant
/// target, castling rights, and the undo stack. A plain owned value — any
/// number of independent games can coexist.
#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
pub struct Board {
    pub(crate) squares: [[Option<Piece>; 8]; 8],
    pub(crate) side_to_move: Color,
    white_king: Option<Square>,
    black_king: Option<Square>,
    pub(crate) en_passant: Option<Square>,
    pub(crate) rights: CastlingRights,
    history: Vec<HistoryEntry>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

const BACK_RANK: [PieceKind; 8] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

impl Board {
    /// An empty board with no pieces and no castling rights. Useful for
    /// setting up test positions with [`Board::place`].
    pub fn empty() -> Board {
        Board {
            squares: [[None; 8]; 8],
            side_to_move: Color::White,
            white_king: None,
            black_king: None,
            en_passant: None,
            rights: CastlingRights::none(),
            history: Vec::new(),
        }
    }

    /// The standard initial position, White to move, all rights intact.
    pub fn new() -> Board {
        let mut board = Board::empty();
        for (col, &kind) in BACK_RANK.iter().enumerate() {
            board.place(Square { row: 0, col }, Piece::new(kind, Color::White));
            board.place(Square { row: 7, col }, Piece::new(kind, Color::Black));
        }
        for col in 0..8 {
            board.place(
                Square { row: 1, col },
                Piece::new(PieceKind::Pawn, Color::White),
            );
            board.place(
                Square { row: 6, col },
                Piece::new(PieceKind::Pawn, Color::Black),
            );
        }
        board.rights = CastlingRights::all();
        board
    }

    /// Put `piece` on `square`, replacing any occupant. Tracked king
    /// coordinates follow king placements.
    pub fn place(&mut self, square: Square, piece: Piece) {
        self.squares[square.row][square.col] = Some(piece);
        if piece.kind == PieceKind::King {
            match piece.color {
                Color::White => self.white_king = Some(square),
                Color::Black => self.black_king = Some(square),
            }
        }
    }

    pub fn remove(&mut self, square: Square) {
        if let Some(piece) = self.squares[square.row][square.col].take() {
            if piece.kind == PieceKind::King {
                match piece.color {
                    Color::White => self.white_king = None,
                    Color::Black => self.black_king = None,
                }
            }
        }
    }

    pub fn set_side_to_move(&mut self, color: Color) {
        self.side_to_move = color;
    }

    pub fn set_castling_rights(&mut self, rights: CastlingRights) {
        self.rights = rights;
    }

    pub fn set_en_passant_target(&mut self, target: Option<Square>) {
        self.en_passant = target;
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.squares[square.row][square.col]
    }

    /// Read-only grid for rendering.
    pub fn snapshot(&self) -> &[[Option<Piece>; 8]; 8] {
        &self.squares
    }

    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub fn castling_rights(&self) -> CastlingRights {
        self.rights
    }

    pub fn en_passant_target(&self) -> Option<Square> {
        self.en_passant
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Tracked square of `color`'s king. A board without both kings is
    /// structurally invalid for rules queries, so this asserts.
    pub(crate) fn king_square(&self, color: Color) -> Square {
        let tracked = match color {
            Color::White => self.white_king,
            Color::Black => self.black_king,
        };
        tracked.expect("board has no king of the required color")
    }

    /// Whether the side to move is currently in check. Combine with an
    /// empty [`Board::legal_moves`] to tell checkmate from stalemate.
    pub fn in_check(&self) -> bool {
        let color = self.side_to_move;
        self.analyze(color, self.king_square(color), None).in_check()
    }

    pub fn is_checkmate(&self) -> bool {
        self.in_check() && self.legal_moves().is_empty()
    }

    pub fn is_stalemate(&self) -> bool {
        !self.in_check() && self.legal_moves().is_empty()
    }

    /// Build a provisional move from two caller-picked coordinates, for
    /// matching by identity against [`Board::legal_moves`]. The flags on
    /// the result are unreliable; apply always uses the matched member of
    /// the legal set, never the provisional record.
    pub fn provisional_move(
        &self,
        from: (usize, usize),
        to: (usize, usize),
    ) -> Result<Move, RulesError> {
        let from = Square::new(from.0, from.1).ok_or(RulesError::OutOfBounds {
            row: from.0,
            col: from.1,
        })?;
        let to = Square::new(to.0, to.1).ok_or(RulesError::OutOfBounds {
            row: to.0,
            col: to.1,
        })?;
        let piece = self.piece_at(from).ok_or(RulesError::EmptySquare(from))?;
        Ok(Move::new(piece, from, to, self.piece_at(to)))
    }

    /// Apply `mv` if it matches a member of the current legal-move set.
    /// The matched member (with authoritative flags) is the one applied;
    /// on rejection the board is untouched.
    pub fn apply(&mut self, mv: &Move) -> Result<(), RulesError> {
        let chosen = self
            .legal_moves()
            .into_iter()
            .find(|candidate| candidate == mv)
            .ok_or_else(|| RulesError::IllegalMove(mv.clone()))?;
        self.make_move(&chosen);
        Ok(())
    }

    /// A castle move may carry any of the transit-square destinations the
    /// generator offered; the king always lands two files toward the rook.
    fn canonical_destination(mv: &Move) -> Square {
        if mv.castle {
            let col = if mv.to.col > 4 { 6 } else { 2 };
            Square {
                row: mv.from.row,
                col,
            }
        } else {
            mv.to
        }
    }

    /// Unvalidated state transition. Callers guarantee `mv` came out of the
    /// legal-move generator for this exact position.
    pub(crate) fn make_move(&mut self, mv: &Move) {
        self.history.push(HistoryEntry {
            mv: mv.clone(),
            rights: self.rights,
            en_passant: self.en_passant,
        });

        let color = mv.piece.color;
        let to = Self::canonical_destination(mv);

        self.squares[mv.from.row][mv.from.col] = None;
        self.squares[to.row][to.col] = Some(mv.piece);

        if mv.castle {
            // Relocate the rook past the king: h-file to f, or a-file to d.
            let (rook_from, rook_to) = if to.col == 6 { (7, 5) } else { (0, 3) };
            self.squares[to.row][rook_from] = None;
            self.squares[to.row][rook_to] = Some(Piece::new(PieceKind::Rook, color));
        }

        if mv.promotion {
            self.squares[to.row][to.col] = Some(Piece::new(PieceKind::Queen, color));
        }

        if mv.en_passant {
            // The captured pawn sits beside the moving pawn, not on the
            // destination.
            self.squares[mv.from.row][mv.to.col] = None;
        }

        if mv.piece.kind == PieceKind::King {
            match color {
                Color::White => self.white_king = Some(to),
                Color::Black => self.black_king = Some(to),
            }
        }

        // A double pawn push opens the intervening square to en passant;
        // every other move closes the window.
        if mv.piece.kind == PieceKind::Pawn && mv.from.row.abs_diff(to.row) == 2 {
            self.en_passant = Some(Square {
                row: (mv.from.row + to.row) / 2,
                col: mv.from.col,
            });
        } else {
            self.en_passant = None;
        }

        self.revoke_rights(mv, to);
        self.side_to_move = self.side_to_move.opposite();
    }

    fn revoke_rights(&mut self, mv: &Move, to: Square) {
        if mv.piece.kind == PieceKind::King {
            match mv.piece.color {
                Color::White => {
                    self.rights.white_kingside = false;
                    self.rights.white_queenside = false;
                }
                Color::Black => {
                    self.rights.black_kingside = false;
                    self.rights.black_queenside = false;
                }
            }
        }
        if mv.piece.kind == PieceKind::Rook {
            match (mv.piece.color, mv.from.row, mv.from.col) {
                (Color::White, 0, 0) => self.rights.white_queenside = false,
                (Color::White, 0, 7) => self.rights.white_kingside = false,
                (Color::Black, 7, 0) => self.rights.black_queenside = false,
                (Color::Black, 7, 7) => self.rights.black_kingside = false,
                _ => {}
            }
        }
        // A capture landing on a rook's home corner kills that right too.
        match (to.row, to.col) {
            (0, 0) => self.rights.white_queenside = false,
            (0, 7) => self.rights.white_kingside = false,
            (7, 0) => self.rights.black_queenside = false,
            (7, 7) => self.rights.black_kingside = false,
            _ => {}
        }
    }

    /// Revert the most recent apply. A no-op when there is no history.
    pub fn undo(&mut self) {
        let entry = match self.history.pop() {
            Some(entry) => entry,
            None => return,
        };
        let mv = &entry.mv;
        let color = mv.piece.color;
        let to = Self::canonical_destination(mv);

        self.squares[mv.from.row][mv.from.col] = Some(mv.piece);
        if mv.en_passant {
            self.squares[to.row][to.col] = None;
            self.squares[mv.from.row][mv.to.col] = mv.captured;
        } else {
            // Covers quiet moves, captures, and promotion: `mv.piece` is
            // still the pawn, so the promoted queen simply disappears.
            self.squares[to.row][to.col] = mv.captured;
        }

        if mv.castle {
            let (rook_from, rook_to) = if to.col == 6 { (7, 5) } else { (0, 3) };
            self.squares[to.row][rook_to] = None;
            self.squares[to.row][rook_from] = Some(Piece::new(PieceKind::Rook, color));
        }

        if mv.piece.kind == PieceKind::King {
            match color {
                Color::White => self.white_king = Some(mv.from),
                Color::Black => self.black_king = Some(mv.from),
            }
        }

        self.rights = entry.rights;
        self.en_passant = entry.en_passant;
        self.side_to_move = self.side_to_move.opposite();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::Color::*;
    use crate::piece::PieceKind::*;

    fn sq(row: usize, col: usize) -> Square {
        Square::new(row, col).unwrap()
    }

    fn find(board: &Board, from: Square, to: Square) -> Move {
        board
            .legal_moves()
            .into_iter()
            .find(|m| m.from == from && m.to == to)
            .unwrap_or_else(|| panic!("{from}->{to} should be legal"))
    }

    fn play(board: &mut Board, from: (usize, usize), to: (usize, usize)) {
        let mv = find(board, sq(from.0, from.1), sq(to.0, to.1));
        board.apply(&mv).unwrap();
    }

    #[test]
    fn initial_position_sanity() {
        let board = Board::new();
        assert_eq!(board.side_to_move(), White);
        assert_eq!(board.piece_at(sq(0, 4)), Some(Piece::new(King, White)));
        assert_eq!(board.piece_at(sq(7, 3)), Some(Piece::new(Queen, Black)));
        assert_eq!(board.castling_rights(), CastlingRights::all());
        assert_eq!(board.en_passant_target(), None);
        assert!(!board.in_check());
    }

    #[test]
    fn quiet_move_and_capture_round_trip() {
        let mut board = Board::new();
        let before = board.clone();

        play(&mut board, (1, 4), (3, 4)); // e4
        assert_eq!(board.side_to_move(), Black);
        assert_eq!(board.en_passant_target(), Some(sq(2, 4)));
        board.undo();
        assert_eq!(board, before);

        // Scandinavian trade so a real capture round-trips too.
        play(&mut board, (1, 4), (3, 4)); // e4
        play(&mut board, (6, 3), (4, 3)); // d5
        let before = board.clone();
        play(&mut board, (3, 4), (4, 3)); // exd5
        assert_eq!(board.piece_at(sq(4, 3)), Some(Piece::new(Pawn, White)));
        board.undo();
        assert_eq!(board, before);
    }

    #[test]
    fn apply_rejects_moves_outside_the_legal_set_without_mutation() {
        let mut board = Board::new();
        let before = board.clone();
        let bogus = board.provisional_move((1, 4), (4, 4)).unwrap(); // e2-e5
        assert_eq!(board.apply(&bogus), Err(RulesError::IllegalMove(bogus)));
        assert_eq!(board, before);
    }

    #[test]
    fn provisional_move_validates_input() {
        let board = Board::new();
        assert_eq!(
            board.provisional_move((8, 0), (0, 0)),
            Err(RulesError::OutOfBounds { row: 8, col: 0 })
        );
        assert_eq!(
            board.provisional_move((4, 4), (5, 4)),
            Err(RulesError::EmptySquare(sq(4, 4)))
        );
        assert!(board.provisional_move((1, 4), (3, 4)).is_ok());
    }

    #[test]
    fn undo_on_empty_history_is_a_noop() {
        let mut board = Board::new();
        let before = board.clone();
        board.undo();
        assert_eq!(board, before);
    }

    #[test]
    fn en_passant_capture_and_round_trip() {
        let mut board = Board::new();
        play(&mut board, (1, 4), (3, 4)); // e4
        play(&mut board, (6, 0), (5, 0)); // a6
        play(&mut board, (3, 4), (4, 4)); // e5
        play(&mut board, (6, 3), (4, 3)); // d5, double push past e5
        assert_eq!(board.en_passant_target(), Some(sq(5, 3)));

        let before = board.clone();
        let ep = find(&board, sq(4, 4), sq(5, 3));
        assert!(ep.en_passant);
        board.apply(&ep).unwrap();

        // The bypassed pawn is removed from d5; the destination d6 was empty.
        assert_eq!(board.piece_at(sq(5, 3)), Some(Piece::new(Pawn, White)));
        assert_eq!(board.piece_at(sq(4, 3)), None);
        assert_eq!(board.piece_at(sq(4, 4)), None);

        board.undo();
        assert_eq!(board, before);
    }

    #[test]
    fn promotion_applies_a_queen_and_undoes_to_a_pawn() {
        let mut board = Board::empty();
        board.place(sq(0, 4), Piece::new(King, White));
        board.place(sq(7, 7), Piece::new(King, Black));
        board.place(sq(6, 0), Piece::new(Pawn, White));
        board.place(sq(7, 1), Piece::new(Rook, Black));

        let before = board.clone();
        let push = find(&board, sq(6, 0), sq(7, 0));
        assert!(push.promotion);
        board.apply(&push).unwrap();
        assert_eq!(board.piece_at(sq(7, 0)), Some(Piece::new(Queen, White)));
        board.undo();
        assert_eq!(board, before);

        // Capturing promotion onto the rook.
        let capture = find(&board, sq(6, 0), sq(7, 1));
        assert!(capture.promotion);
        board.apply(&capture).unwrap();
        assert_eq!(board.piece_at(sq(7, 1)), Some(Piece::new(Queen, White)));
        board.undo();
        assert_eq!(board, before);
    }

    #[test]
    fn kingside_castle_normalizes_and_round_trips() {
        let mut board = Board::new();
        play(&mut board, (0, 6), (2, 5)); // Nf3
        play(&mut board, (7, 6), (5, 5)); // Nf6
        play(&mut board, (1, 6), (2, 6)); // g3
        play(&mut board, (6, 6), (5, 6)); // g6
        play(&mut board, (0, 5), (1, 6)); // Bg2
        play(&mut board, (7, 5), (6, 6)); // Bg7

        let castles: Vec<Move> = board
            .legal_moves()
            .into_iter()
            .filter(|m| m.castle)
            .collect();
        // One per accepted destination: g1 and the rook square h1.
        assert_eq!(castles.len(), 2);
        assert!(castles.iter().all(|m| m.from == sq(0, 4)));

        let before = board.clone();
        // Applying the imprecise h1 variant still lands the king on g1.
        let sloppy = castles.iter().find(|m| m.to == sq(0, 7)).unwrap();
        board.apply(sloppy).unwrap();
        assert_eq!(board.piece_at(sq(0, 6)), Some(Piece::new(King, White)));
        assert_eq!(board.piece_at(sq(0, 5)), Some(Piece::new(Rook, White)));
        assert_eq!(board.piece_at(sq(0, 7)), None);
        assert_eq!(board.piece_at(sq(0, 4)), None);
        assert!(!board.castling_rights().white_kingside);
        assert!(!board.castling_rights().white_queenside);

        board.undo();
        assert_eq!(board, before);
    }

    #[test]
    fn rook_move_revokes_one_right_until_that_move_is_undone() {
        let mut board = Board::new();
        play(&mut board, (1, 7), (3, 7)); // h4
        play(&mut board, (6, 7), (4, 7)); // h5
        play(&mut board, (0, 7), (2, 7)); // Rh3: white loses kingside right
        assert!(!board.castling_rights().white_kingside);
        assert!(board.castling_rights().white_queenside);

        // Unrelated moves later, the right stays gone across their undo.
        play(&mut board, (6, 0), (5, 0)); // a6
        assert!(!board.castling_rights().white_kingside);
        board.undo();
        assert!(!board.castling_rights().white_kingside);

        // Only undoing the rook move itself restores it.
        board.undo();
        assert!(board.castling_rights().white_kingside);
    }

    #[test]
    fn capturing_a_home_corner_rook_revokes_the_right() {
        let mut board = Board::empty();
        board.place(sq(0, 4), Piece::new(King, White));
        board.place(sq(0, 7), Piece::new(Rook, White));
        board.place(sq(7, 4), Piece::new(King, Black));
        board.place(sq(7, 7), Piece::new(Rook, Black));
        board.set_castling_rights(CastlingRights {
            white_kingside: true,
            white_queenside: false,
            black_kingside: true,
            black_queenside: false,
        });

        play(&mut board, (0, 7), (7, 7)); // Rxh8
        assert!(!board.castling_rights().black_kingside);
    }
}
