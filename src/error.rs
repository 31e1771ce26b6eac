use crate::moves::Move;
use crate::square::Square;

/// Failures surfaced to callers. None of these leave the board in a
/// modified state; structural problems (a missing king) are bugs and
/// panic instead.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RulesError {
    #[error("{0} is not legal in the current position")]
    IllegalMove(Move),

    #[error("square ({row}, {col}) is off the board")]
    OutOfBounds { row: usize, col: usize },

    #[error("no piece on {0}")]
    EmptySquare(Square),
}
