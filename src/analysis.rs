//! Check and pin detection by ray casting from the king.
//!
//! Instead of applying every candidate move and asking "is my king attacked
//! now?", the generator asks this module once per position: scan the eight
//! rank/file/diagonal rays out of the king and the eight knight offsets
//! around it, and report every check and every absolute pin in one pass.
//! Generators then restrict pinned pieces to their pin line and the legal
//! filter restricts replies to a check without any move simulation.

use std::collections::HashMap;

use crate::board::Board;
use crate::piece::{Color, PieceKind};
use crate::square::Square;

/// Direction vector as (row delta, col delta), each in {-1, 0, 1}.
pub type Direction = (i32, i32);

pub const ORTHOGONAL: [Direction; 4] = [(0, -1), (0, 1), (-1, 0), (1, 0)];
pub const DIAGONAL: [Direction; 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];
pub const ALL_DIRECTIONS: [Direction; 8] = [
    (0, -1),
    (0, 1),
    (-1, 0),
    (1, 0),
    (-1, -1),
    (-1, 1),
    (1, -1),
    (1, 1),
];
pub const KNIGHT_OFFSETS: [(i32, i32); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

/// How a checking piece reaches the king.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Attack {
    /// Slider, adjacent king, or pawn: the direction from the king toward
    /// the checker.
    Ray(Direction),
    /// Knight: no intermediate squares exist, only the knight's own square
    /// can block-capture the check.
    Knight,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Check {
    pub from: Square,
    pub attack: Attack,
}

/// Result of one analyzer pass. Transient: recomputed for every
/// legal-move request and never cached across an apply/undo boundary.
#[derive(Clone, Debug)]
pub struct Analysis {
    pub checks: Vec<Check>,
    pins: HashMap<Square, Direction>,
}

impl Analysis {
    pub fn in_check(&self) -> bool {
        !self.checks.is_empty()
    }

    /// Direction of the pin holding the piece on `square`, if any. The map
    /// is read-only; looking a pin up does not consume it.
    pub fn pin_direction(&self, square: Square) -> Option<Direction> {
        self.pins.get(&square).copied()
    }

    #[cfg(test)]
    pub(crate) fn pin_count(&self) -> usize {
        self.pins.len()
    }
}

impl Board {
    /// Scan for checks against `color`'s king and for pieces pinned to it.
    ///
    /// `king` is the square to scan from — the king's actual square in the
    /// normal case, or a candidate destination when probing a king move.
    /// `vacated` is treated as empty during the scan; passing the king's
    /// current square while probing a destination means an attacker sliding
    /// through the old square is still seen (the stale occupied cell cannot
    /// shield the new square).
    pub(crate) fn analyze(
        &self,
        color: Color,
        king: Square,
        vacated: Option<Square>,
    ) -> Analysis {
        let mut checks = Vec::new();
        let mut pins = HashMap::new();

        for direction in ALL_DIRECTIONS {
            self.scan_ray(color, king, vacated, direction, &mut checks, &mut pins);
        }

        for (dr, dc) in KNIGHT_OFFSETS {
            if let Some(square) = king.offset(dr, dc) {
                if let Some(piece) = self.piece_at(square) {
                    if piece.color != color && piece.kind == PieceKind::Knight {
                        checks.push(Check {
                            from: square,
                            attack: Attack::Knight,
                        });
                    }
                }
            }
        }

        Analysis { checks, pins }
    }

    fn scan_ray(
        &self,
        color: Color,
        king: Square,
        vacated: Option<Square>,
        direction: Direction,
        checks: &mut Vec<Check>,
        pins: &mut HashMap<Square, Direction>,
    ) {
        let (dr, dc) = direction;
        let mut candidate: Option<Square> = None;

        for step in 1..8 {
            let square = match king.offset(dr * step, dc * step) {
                Some(square) => square,
                None => return,
            };
            if Some(square) == vacated {
                continue;
            }
            let piece = match self.piece_at(square) {
                Some(piece) => piece,
                None => continue,
            };

            if piece.color == color {
                if candidate.is_none() {
                    candidate = Some(square);
                    continue;
                }
                // Two friendly pieces block everything behind them.
                return;
            }

            if threatens_along(piece.kind, piece.color, direction, step) {
                match candidate {
                    None => checks.push(Check {
                        from: square,
                        attack: Attack::Ray(direction),
                    }),
                    Some(pinned) => {
                        pins.insert(pinned, direction);
                    }
                }
            }
            // Any enemy piece ends the ray, threatening or not.
            return;
        }
    }
}

/// Whether an enemy piece `step` squares away along `direction` (as seen
/// from the king) attacks the king.
fn threatens_along(kind: PieceKind, color: Color, direction: Direction, step: i32) -> bool {
    let diagonal = direction.0 != 0 && direction.1 != 0;
    match kind {
        PieceKind::Queen => true,
        PieceKind::Rook => !diagonal,
        PieceKind::Bishop => diagonal,
        PieceKind::King => step == 1,
        // A pawn attacks one square diagonally against its own direction of
        // travel: the ray from the king toward it runs opposite to that.
        PieceKind::Pawn => step == 1 && diagonal && direction.0 == -color.pawn_direction(),
        PieceKind::Knight => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::Color::*;
    use crate::piece::Piece;
    use crate::piece::PieceKind::*;

    fn sq(row: usize, col: usize) -> Square {
        Square::new(row, col).unwrap()
    }

    fn kings_at(white: Square, black: Square) -> Board {
        let mut board = Board::empty();
        board.place(white, Piece::new(King, White));
        board.place(black, Piece::new(King, Black));
        board
    }

    #[test]
    fn rook_checks_along_an_open_file() {
        let mut board = kings_at(sq(0, 4), sq(7, 7));
        board.place(sq(6, 4), Piece::new(Rook, Black));

        let analysis = board.analyze(White, sq(0, 4), None);
        assert!(analysis.in_check());
        assert_eq!(
            analysis.checks,
            vec![Check {
                from: sq(6, 4),
                attack: Attack::Ray((1, 0)),
            }]
        );
        assert_eq!(analysis.pin_count(), 0);
    }

    #[test]
    fn friendly_piece_on_the_ray_becomes_a_pin_not_a_check() {
        let mut board = kings_at(sq(0, 4), sq(7, 7));
        board.place(sq(3, 4), Piece::new(Bishop, White));
        board.place(sq(6, 4), Piece::new(Rook, Black));

        let analysis = board.analyze(White, sq(0, 4), None);
        assert!(!analysis.in_check());
        assert_eq!(analysis.pin_direction(sq(3, 4)), Some((1, 0)));
    }

    #[test]
    fn two_friendly_pieces_kill_the_ray() {
        let mut board = kings_at(sq(0, 4), sq(7, 7));
        board.place(sq(2, 4), Piece::new(Bishop, White));
        board.place(sq(4, 4), Piece::new(Knight, White));
        board.place(sq(6, 4), Piece::new(Rook, Black));

        let analysis = board.analyze(White, sq(0, 4), None);
        assert!(!analysis.in_check());
        assert_eq!(analysis.pin_count(), 0);
    }

    #[test]
    fn geometry_must_match_the_piece() {
        // A rook on a diagonal is no threat; a bishop on a file is none.
        let mut board = kings_at(sq(0, 4), sq(7, 7));
        board.place(sq(3, 7), Piece::new(Rook, Black));
        board.place(sq(5, 4), Piece::new(Bishop, Black));

        let analysis = board.analyze(White, sq(0, 4), None);
        assert!(!analysis.in_check());
    }

    #[test]
    fn pawns_only_check_from_their_capture_diagonals() {
        // Black pawn diagonally above the white king: check.
        let mut board = kings_at(sq(3, 3), sq(7, 7));
        board.place(sq(4, 4), Piece::new(Pawn, Black));
        assert!(board.analyze(White, sq(3, 3), None).in_check());

        // Same pawn directly above: no check.
        let mut board = kings_at(sq(3, 3), sq(7, 7));
        board.place(sq(4, 3), Piece::new(Pawn, Black));
        assert!(!board.analyze(White, sq(3, 3), None).in_check());

        // A black pawn diagonally below the king never attacks it.
        let mut board = kings_at(sq(3, 3), sq(7, 7));
        board.place(sq(2, 2), Piece::new(Pawn, Black));
        assert!(!board.analyze(White, sq(3, 3), None).in_check());
    }

    #[test]
    fn knight_and_rook_report_a_double_check() {
        let mut board = kings_at(sq(0, 4), sq(7, 7));
        board.place(sq(6, 4), Piece::new(Rook, Black));
        board.place(sq(2, 5), Piece::new(Knight, Black));

        let analysis = board.analyze(White, sq(0, 4), None);
        assert_eq!(analysis.checks.len(), 2);
        assert!(analysis
            .checks
            .iter()
            .any(|c| c.attack == Attack::Knight && c.from == sq(2, 5)));
    }

    #[test]
    fn vacated_square_does_not_shield_the_scan_origin() {
        // King on e2, black rook on e7. Probe e1 as a king destination:
        // without vacating e2 the stale king cell blocks the file and e1
        // looks safe, which is exactly the bug the parameter exists for.
        let mut board = kings_at(sq(1, 4), sq(7, 7));
        board.place(sq(6, 4), Piece::new(Rook, Black));

        // Without vacating, the king's own stale cell at e2 would shield e1.
        let shielded = board.analyze(White, sq(0, 4), None);
        assert!(!shielded.in_check());

        let probed = board.analyze(White, sq(0, 4), Some(sq(1, 4)));
        assert!(probed.in_check());
    }
}
