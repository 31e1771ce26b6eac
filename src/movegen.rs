//! Legal move generation.
//!
//! The per-piece generators produce pseudo-legal moves restricted by the
//! pin map from one analyzer pass; the top-level filter then narrows the
//! set under check. King moves validate themselves square by square, so
//! they are never touched by the check filter.

use crate::analysis::{
    Analysis, Attack, Check, Direction, ALL_DIRECTIONS, DIAGONAL, KNIGHT_OFFSETS, ORTHOGONAL,
};
use crate::board::Board;
use crate::moves::Move;
use crate::piece::{Color, Piece, PieceKind};
use crate::square::Square;

/// A pinned piece may only move along the pin ray, in either sense.
fn pin_allows(pin: Option<Direction>, direction: Direction) -> bool {
    match pin {
        None => true,
        Some(pin) => direction == pin || direction == (-pin.0, -pin.1),
    }
}

impl Board {
    /// The exact legal-move set for the side to move, in row-major source
    /// order (castle variants last). Empty means checkmate or stalemate;
    /// ask [`Board::in_check`] which.
    pub fn legal_moves(&self) -> Vec<Move> {
        let color = self.side_to_move;
        let king = self.king_square(color);
        let analysis = self.analyze(color, king, None);

        match analysis.checks.len() {
            0 => self.pseudo_legal(&analysis),
            1 => {
                // Non-king moves must capture the checker or interpose.
                let targets = self.check_resolution_squares(king, &analysis.checks[0]);
                let mut moves = self.pseudo_legal(&analysis);
                moves.retain(|m| m.piece.kind == PieceKind::King || targets.contains(&m.to));
                moves
            }
            // Double check: nothing but the king can help.
            _ => {
                let mut moves = Vec::new();
                self.king_moves(king, color, &mut moves);
                moves
            }
        }
    }

    /// Count of leaf positions reachable in `depth` plies, driven through
    /// the same apply/undo machinery the public API uses. Castle
    /// destination variants count as the distinct moves they are.
    pub fn perft(&mut self, depth: u32) -> u64 {
        if depth == 0 {
            return 1;
        }
        let moves = self.legal_moves();
        if depth == 1 {
            return moves.len() as u64;
        }
        let mut nodes = 0;
        for mv in &moves {
            self.make_move(mv);
            nodes += self.perft(depth - 1);
            self.undo();
        }
        nodes
    }

    /// Squares a non-king move may land on to resolve a single check: the
    /// checker itself plus, for a ray checker, everything strictly between
    /// king and checker.
    fn check_resolution_squares(&self, king: Square, check: &Check) -> Vec<Square> {
        let mut squares = vec![check.from];
        if let Attack::Ray((dr, dc)) = check.attack {
            for step in 1..8 {
                match king.offset(dr * step, dc * step) {
                    Some(square) if square != check.from => squares.push(square),
                    _ => break,
                }
            }
        }
        squares
    }

    fn pseudo_legal(&self, analysis: &Analysis) -> Vec<Move> {
        let color = self.side_to_move;
        let mut moves = Vec::new();

        for row in 0..8 {
            for col in 0..8 {
                let from = Square { row, col };
                let piece = match self.squares[row][col] {
                    Some(piece) if piece.color == color => piece,
                    _ => continue,
                };
                match piece.kind {
                    PieceKind::Pawn => self.pawn_moves(from, piece, analysis, &mut moves),
                    PieceKind::Knight => self.knight_moves(from, piece, analysis, &mut moves),
                    PieceKind::Bishop => {
                        self.sliding_moves(from, piece, &DIAGONAL, analysis, &mut moves)
                    }
                    PieceKind::Rook => {
                        self.sliding_moves(from, piece, &ORTHOGONAL, analysis, &mut moves)
                    }
                    PieceKind::Queen => {
                        self.sliding_moves(from, piece, &ALL_DIRECTIONS, analysis, &mut moves)
                    }
                    PieceKind::King => self.king_moves(from, color, &mut moves),
                }
            }
        }

        // Castling is only reachable outside of check.
        if !analysis.in_check() {
            self.castling_moves(self.king_square(color), color, &mut moves);
        }
        moves
    }

    fn pawn_moves(&self, from: Square, piece: Piece, analysis: &Analysis, moves: &mut Vec<Move>) {
        let pin = analysis.pin_direction(from);
        let dir = piece.color.pawn_direction();
        let start_row = match piece.color {
            Color::White => 1,
            Color::Black => 6,
        };

        if let Some(one) = from.offset(dir, 0) {
            if self.piece_at(one).is_none() && pin_allows(pin, (dir, 0)) {
                moves.push(Move::new(piece, from, one, None));
                if from.row == start_row {
                    if let Some(two) = from.offset(2 * dir, 0) {
                        if self.piece_at(two).is_none() {
                            moves.push(Move::new(piece, from, two, None));
                        }
                    }
                }
            }
        }

        for dc in [-1, 1] {
            let target = match from.offset(dir, dc) {
                Some(target) => target,
                None => continue,
            };
            match self.piece_at(target) {
                Some(occupant) if occupant.color != piece.color => {
                    if pin_allows(pin, (dir, dc)) {
                        moves.push(Move::new(piece, from, target, Some(occupant)));
                    }
                }
                None if Some(target) == self.en_passant && pin.is_none() => {
                    // The bypassed pawn stands beside us on the target file.
                    if let Some(captured) = self.squares[from.row][target.col] {
                        moves.push(Move::en_passant_capture(piece, from, target, captured));
                    }
                }
                _ => {}
            }
        }
    }

    fn knight_moves(&self, from: Square, piece: Piece, analysis: &Analysis, moves: &mut Vec<Move>) {
        // A pinned knight can never stay on its pin line.
        if analysis.pin_direction(from).is_some() {
            return;
        }
        for (dr, dc) in KNIGHT_OFFSETS {
            let target = match from.offset(dr, dc) {
                Some(target) => target,
                None => continue,
            };
            match self.piece_at(target) {
                Some(occupant) if occupant.color == piece.color => {}
                occupant => moves.push(Move::new(piece, from, target, occupant)),
            }
        }
    }

    fn sliding_moves(
        &self,
        from: Square,
        piece: Piece,
        directions: &[Direction],
        analysis: &Analysis,
        moves: &mut Vec<Move>,
    ) {
        let pin = analysis.pin_direction(from);
        for &(dr, dc) in directions {
            if !pin_allows(pin, (dr, dc)) {
                continue;
            }
            for step in 1..8 {
                let target = match from.offset(dr * step, dc * step) {
                    Some(target) => target,
                    None => break,
                };
                match self.piece_at(target) {
                    None => moves.push(Move::new(piece, from, target, None)),
                    Some(occupant) => {
                        if occupant.color != piece.color {
                            moves.push(Move::new(piece, from, target, Some(occupant)));
                        }
                        break;
                    }
                }
            }
        }
    }

    fn king_moves(&self, from: Square, color: Color, moves: &mut Vec<Move>) {
        let piece = Piece::new(PieceKind::King, color);
        for (dr, dc) in ALL_DIRECTIONS {
            let target = match from.offset(dr, dc) {
                Some(target) => target,
                None => continue,
            };
            if let Some(occupant) = self.piece_at(target) {
                if occupant.color == color {
                    continue;
                }
            }
            // Probe the destination with our current square vacated, so an
            // attacker sliding through it is not hidden.
            if !self.analyze(color, target, Some(from)).in_check() {
                moves.push(Move::new(piece, from, target, self.piece_at(target)));
            }
        }
    }

    /// Emit castle moves, one per accepted destination: g/h king-side,
    /// c/b/a queen-side. All land the king on the canonical square when
    /// applied. Callers guarantee the side is not in check.
    fn castling_moves(&self, king: Square, color: Color, moves: &mut Vec<Move>) {
        let home_row = match color {
            Color::White => 0,
            Color::Black => 7,
        };
        if king.row != home_row || king.col != 4 {
            return;
        }
        let row = home_row;
        let piece = Piece::new(PieceKind::King, color);
        let rook = Piece::new(PieceKind::Rook, color);
        let transit_safe = |col: usize| {
            !self
                .analyze(color, Square { row, col }, Some(king))
                .in_check()
        };

        if self.rights.kingside(color)
            && self.squares[row][5].is_none()
            && self.squares[row][6].is_none()
            && self.squares[row][7] == Some(rook)
            && transit_safe(5)
            && transit_safe(6)
        {
            moves.push(Move::castling(piece, king, Square { row, col: 6 }));
            moves.push(Move::castling(piece, king, Square { row, col: 7 }));
        }

        // Queen-side: b1/b8 must be vacant for the rook to pass, but the
        // king never crosses it, so only d and c are transit-checked.
        if self.rights.queenside(color)
            && self.squares[row][1].is_none()
            && self.squares[row][2].is_none()
            && self.squares[row][3].is_none()
            && self.squares[row][0] == Some(rook)
            && transit_safe(3)
            && transit_safe(2)
        {
            moves.push(Move::castling(piece, king, Square { row, col: 2 }));
            moves.push(Move::castling(piece, king, Square { row, col: 1 }));
            moves.push(Move::castling(piece, king, Square { row, col: 0 }));
        }
    }
}
