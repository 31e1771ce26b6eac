pub mod analysis;
pub mod board;
pub mod error;
pub mod movegen;
pub mod moves;
pub mod piece;
pub mod square;

pub use board::{Board, CastlingRights};
pub use error::RulesError;
pub use moves::Move;
pub use piece::{Color, Piece, PieceKind};
pub use square::Square;
