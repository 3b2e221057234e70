use std::fmt;

use crate::{
    piece::{Color, PieceType},
    Board, Square,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveType {
    Normal,
    Capture,
    EnPassant,
    Castle,
}

/// A single move in verbose form: origin, destination, and promotion piece
/// where applicable. Immutable once produced; the coordinate notation is the
/// `Display` rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub move_type: MoveType,
    pub promotion: Option<PieceType>,
}

impl Move {
    pub fn new(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            move_type: MoveType::Normal,
            promotion: None,
        }
    }

    pub fn with_promotion(from: Square, to: Square, promotion: PieceType) -> Self {
        Self {
            from,
            to,
            move_type: MoveType::Normal,
            promotion: Some(promotion),
        }
    }

    pub fn castle(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            move_type: MoveType::Castle,
            promotion: None,
        }
    }

    /// Whether this move follows the moving piece's movement rules on the
    /// given board. Checks everything except king safety; castling is
    /// validated separately by the board.
    pub fn is_pseudo_legal(&self, board: &Board) -> bool {
        let piece = match board.get_piece(self.from) {
            Some(p) => p,
            None => return false,
        };

        if self.from == self.to {
            return false;
        }

        if let Some(dest_piece) = board.get_piece(self.to) {
            if dest_piece.color == piece.color {
                return false;
            }
        }

        match piece.piece_type {
            PieceType::Pawn => self.is_valid_pawn_move(piece.color, board),
            PieceType::Knight => self.is_valid_knight_move(),
            PieceType::Bishop => self.is_valid_diagonal_move(board),
            PieceType::Rook => self.is_valid_straight_move(board),
            PieceType::Queen => {
                self.is_valid_diagonal_move(board) || self.is_valid_straight_move(board)
            }
            PieceType::King => self.is_valid_king_move(),
        }
    }

    fn is_valid_pawn_move(&self, color: Color, board: &Board) -> bool {
        let direction: i8 = match color {
            Color::White => 1,
            Color::Black => -1,
        };

        let rank_diff = self.to.rank as i8 - self.from.rank as i8;
        let file_diff = self.to.file as i8 - self.from.file as i8;

        // Forward movement
        if file_diff == 0 {
            if rank_diff == direction {
                return board.get_piece(self.to).is_none();
            }
            // Initial two-square move
            let start_rank = if color == Color::White { 2 } else { 7 };
            if self.from.rank == start_rank && rank_diff == 2 * direction {
                let intermediate = Square {
                    file: self.from.file,
                    rank: (self.from.rank as i8 + direction) as u8,
                };
                return board.get_piece(intermediate).is_none()
                    && board.get_piece(self.to).is_none();
            }
            return false;
        }

        // Diagonal capture, including en passant onto the vacated square
        if file_diff.abs() == 1 && rank_diff == direction {
            if let Some(captured) = board.get_piece(self.to) {
                return captured.color != color;
            }
            return board.en_passant_square() == Some(self.to);
        }

        false
    }

    fn is_valid_knight_move(&self) -> bool {
        let rank_diff = (self.to.rank as i8 - self.from.rank as i8).abs();
        let file_diff = (self.to.file as i8 - self.from.file as i8).abs();

        (rank_diff == 2 && file_diff == 1) || (rank_diff == 1 && file_diff == 2)
    }

    fn is_valid_diagonal_move(&self, board: &Board) -> bool {
        let rank_diff = (self.to.rank as i8 - self.from.rank as i8).abs();
        let file_diff = (self.to.file as i8 - self.from.file as i8).abs();

        if rank_diff != file_diff {
            return false;
        }

        self.is_path_clear(board)
    }

    fn is_valid_straight_move(&self, board: &Board) -> bool {
        let rank_diff = self.to.rank as i8 - self.from.rank as i8;
        let file_diff = self.to.file as i8 - self.from.file as i8;

        if rank_diff != 0 && file_diff != 0 {
            return false;
        }

        self.is_path_clear(board)
    }

    fn is_valid_king_move(&self) -> bool {
        let rank_diff = (self.to.rank as i8 - self.from.rank as i8).abs();
        let file_diff = (self.to.file as i8 - self.from.file as i8).abs();

        rank_diff <= 1 && file_diff <= 1
    }

    fn is_path_clear(&self, board: &Board) -> bool {
        let file_step = (self.to.file as i8 - self.from.file as i8).signum();
        let rank_step = (self.to.rank as i8 - self.from.rank as i8).signum();

        let mut current = self.from;
        loop {
            current = match current.offset(file_step, rank_step) {
                Some(square) => square,
                None => return false,
            };
            if current == self.to {
                return true;
            }
            if board.get_piece(current).is_some() {
                return false;
            }
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.move_type == MoveType::Castle {
            return if self.to.file == 7 {
                write!(f, "O-O")
            } else {
                write!(f, "O-O-O")
            };
        }
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(promotion) = self.promotion {
            let c = match promotion {
                PieceType::Knight => 'n',
                PieceType::Bishop => 'b',
                PieceType::Rook => 'r',
                _ => 'q',
            };
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(notation: &str) -> Square {
        Square::from_algebraic(notation).unwrap()
    }

    #[test]
    fn notation_for_plain_and_promotion_moves() {
        let push = Move::new(square("e2"), square("e4"));
        assert_eq!(push.to_string(), "e2e4");

        let promote = Move::with_promotion(square("e7"), square("e8"), PieceType::Queen);
        assert_eq!(promote.to_string(), "e7e8q");
    }

    #[test]
    fn notation_for_castling() {
        let kingside = Move::castle(square("e1"), square("g1"));
        assert_eq!(kingside.to_string(), "O-O");

        let queenside = Move::castle(square("e8"), square("c8"));
        assert_eq!(queenside.to_string(), "O-O-O");
    }

    #[test]
    fn opening_pawn_and_knight_moves_are_pseudo_legal() {
        let board = Board::new();
        assert!(Move::new(square("e2"), square("e4")).is_pseudo_legal(&board));
        assert!(Move::new(square("e2"), square("e3")).is_pseudo_legal(&board));
        assert!(Move::new(square("g1"), square("f3")).is_pseudo_legal(&board));
        // Blocked sliders and illegal hops
        assert!(!Move::new(square("f1"), square("b5")).is_pseudo_legal(&board));
        assert!(!Move::new(square("a1"), square("a3")).is_pseudo_legal(&board));
        assert!(!Move::new(square("e2"), square("e5")).is_pseudo_legal(&board));
        assert!(!Move::new(square("e2"), square("d3")).is_pseudo_legal(&board));
    }
}
