use std::fmt;

use serde::{Deserialize, Serialize};

/// A board coordinate. Row 0 = rank 1 (White's back rank), col 0 = file a.
///
/// Both coordinates must stay in `[0, 7]`; [`Square::new`] and
/// [`Square::offset`] enforce that, so prefer them over struct literals
/// when the input is not a known-good constant.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Debug)]
pub struct Square {
    pub row: usize,
    pub col: usize,
}

impl Square {
    pub fn new(row: usize, col: usize) -> Option<Square> {
        if row < 8 && col < 8 {
            Some(Square { row, col })
        } else {
            None
        }
    }

    /// The square reached by moving `dr` rows and `dc` columns, if any.
    pub fn offset(self, dr: i32, dc: i32) -> Option<Square> {
        let row = self.row as i32 + dr;
        let col = self.col as i32 + dc;
        if (0..8).contains(&row) && (0..8).contains(&col) {
            Some(Square {
                row: row as usize,
                col: col as usize,
            })
        } else {
            None
        }
    }

    pub fn file_char(self) -> char {
        (b'a' + self.col as u8) as char
    }

    pub fn rank_char(self) -> char {
        (b'1' + self.row as u8) as char
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file_char(), self.rank_char())
    }
}
