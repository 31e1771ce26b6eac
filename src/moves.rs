use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::piece::{Color, Piece, PieceKind};
use crate::square::Square;

/// One board transition, recorded against the position it was generated in.
///
/// `captured` holds whatever stood on the destination when the move was
/// constructed. For en passant the captured pawn is NOT on the destination
/// (which is empty by definition); the bypassed pawn is recorded instead.
///
/// Two moves are equal when their source and destination match — flags and
/// captured pieces never enter into identity. This is what lets a
/// presentation layer build a bare provisional move from two clicked squares
/// and match it against the generated set.
#[derive(Clone, Eq, Serialize, Deserialize, Debug)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub piece: Piece,
    pub captured: Option<Piece>,
    pub en_passant: bool,
    pub castle: bool,
    pub promotion: bool,
}

impl Move {
    pub fn new(piece: Piece, from: Square, to: Square, captured: Option<Piece>) -> Move {
        let far_rank = match piece.color {
            Color::White => 7,
            Color::Black => 0,
        };
        Move {
            from,
            to,
            piece,
            captured,
            en_passant: false,
            castle: false,
            // The pawn stays a pawn in the record; the queen substitution
            // happens when the move is applied.
            promotion: piece.kind == PieceKind::Pawn && to.row == far_rank,
        }
    }

    /// An en-passant capture: `captured` is the bypassed pawn sitting on
    /// (from.row, to.col), not the (empty) destination.
    pub fn en_passant_capture(piece: Piece, from: Square, to: Square, captured: Piece) -> Move {
        Move {
            from,
            to,
            piece,
            captured: Some(captured),
            en_passant: true,
            castle: false,
            promotion: false,
        }
    }

    pub fn castling(piece: Piece, from: Square, to: Square) -> Move {
        Move {
            from,
            to,
            piece,
            captured: None,
            en_passant: false,
            castle: true,
            promotion: false,
        }
    }

    /// Short notation: piece letter (omitted for pawns) plus destination,
    /// or "e4xd5" style when something was captured.
    pub fn notation(&self) -> String {
        if self.captured.is_some() {
            format!("{}x{}", self.from, self.to)
        } else {
            match self.piece.kind.letter() {
                Some(letter) => format!("{}{}", letter, self.to),
                None => self.to.to_string(),
            }
        }
    }
}

impl PartialEq for Move {
    fn eq(&self, other: &Move) -> bool {
        self.from == other.from && self.to == other.to
    }
}

impl Hash for Move {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.from.hash(state);
        self.to.hash(state);
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.notation())
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

    #[test]
    fn identity_ignores_flags_and_captures() {
        let knight = Piece::new(Knight, White);
        let a = Move::new(knight, sq(0, 1), sq(2, 2), None);
        let b = Move::new(knight, sq(0, 1), sq(2, 2), Some(Piece::new(Pawn, Black)));
        assert_eq!(a, b);

        let c = Move::new(knight, sq(0, 1), sq(2, 0), None);
        assert_ne!(a, c);
    }

    #[test]
    fn pawn_to_far_rank_is_flagged_as_promotion() {
        let white_pawn = Piece::new(Pawn, White);
        assert!(Move::new(white_pawn, sq(6, 0), sq(7, 0), None).promotion);
        assert!(!Move::new(white_pawn, sq(5, 0), sq(6, 0), None).promotion);

        let black_pawn = Piece::new(Pawn, Black);
        assert!(Move::new(black_pawn, sq(1, 3), sq(0, 3), None).promotion);
    }

    #[test]
    fn notation_quiet_capture_and_pawn() {
        let quiet = Move::new(Piece::new(Knight, White), sq(0, 6), sq(2, 5), None);
        assert_eq!(quiet.notation(), "Nf3");

        let push = Move::new(Piece::new(Pawn, White), sq(1, 4), sq(3, 4), None);
        assert_eq!(push.notation(), "e4");

        let capture = Move::new(
            Piece::new(Pawn, White),
            sq(3, 4),
            sq(4, 3),
            Some(Piece::new(Pawn, Black)),
        );
        assert_eq!(capture.notation(), "e4xd5");
    }
}
