//! Forsyth-Edwards Notation parsing and generation for `Board`.

use log::debug;
use thiserror::Error;

use crate::{
    piece::{Color, PieceType},
    Board, CastlingRights, Piece, Square,
};

pub const START_POSITION_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FenError {
    #[error("expected 6 space-separated fields, found {0}")]
    FieldCount(usize),
    #[error("invalid piece placement: {0}")]
    InvalidPlacement(String),
    #[error("invalid side to move: {0}")]
    InvalidSideToMove(String),
    #[error("invalid castling availability: {0}")]
    InvalidCastling(String),
    #[error("invalid en passant square: {0}")]
    InvalidEnPassant(String),
    #[error("invalid clock value: {0}")]
    InvalidClock(String),
    #[error("each side needs exactly one king")]
    BadKingCount,
}

impl Board {
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() != 6 {
            return Err(FenError::FieldCount(fields.len()));
        }

        let mut board = Board::empty();
        parse_placement(fields[0], &mut board)?;

        board.side_to_move = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(FenError::InvalidSideToMove(other.to_owned())),
        };

        board.castling_rights = parse_castling(fields[2])?;
        board.en_passant = parse_en_passant(fields[3])?;

        board.halfmove_clock = fields[4]
            .parse::<u32>()
            .map_err(|_| FenError::InvalidClock(fields[4].to_owned()))?;
        board.fullmove_number = fields[5]
            .parse::<u32>()
            .map_err(|_| FenError::InvalidClock(fields[5].to_owned()))?;

        for color in [Color::White, Color::Black] {
            let kings = board
                .pieces
                .values()
                .filter(|piece| piece.piece_type == PieceType::King && piece.color == color)
                .count();
            if kings != 1 {
                return Err(FenError::BadKingCount);
            }
        }

        debug!("loaded position {fen}");
        Ok(board)
    }

    pub fn to_fen(&self) -> String {
        let mut placement = String::new();
        for rank in (1..=8).rev() {
            let mut empty_run = 0u8;
            for file in 1..=8 {
                match self.get_piece(Square { file, rank }) {
                    Some(piece) => {
                        if empty_run > 0 {
                            placement.push(char::from(b'0' + empty_run));
                            empty_run = 0;
                        }
                        placement.push(piece.to_fen_char());
                    }
                    None => empty_run += 1,
                }
            }
            if empty_run > 0 {
                placement.push(char::from(b'0' + empty_run));
            }
            if rank > 1 {
                placement.push('/');
            }
        }

        let side = match self.side_to_move {
            Color::White => "w",
            Color::Black => "b",
        };
        let castling = castling_field(self.castling_rights);
        let en_passant = match self.en_passant {
            Some(square) => square.to_string(),
            None => "-".to_owned(),
        };

        format!(
            "{} {} {} {} {} {}",
            placement, side, castling, en_passant, self.halfmove_clock, self.fullmove_number
        )
    }
}

fn parse_placement(placement: &str, board: &mut Board) -> Result<(), FenError> {
    let ranks: Vec<&str> = placement.split('/').collect();
    if ranks.len() != 8 {
        return Err(FenError::InvalidPlacement(placement.to_owned()));
    }

    for (row, rank_text) in ranks.iter().enumerate() {
        let rank = 8 - row as u8;
        let mut file = 1u8;
        for c in rank_text.chars() {
            if let Some(skip) = c.to_digit(10) {
                if skip == 0 || skip > 8 {
                    return Err(FenError::InvalidPlacement(placement.to_owned()));
                }
                file += skip as u8;
            } else {
                let piece = Piece::from_fen_char(c)
                    .ok_or_else(|| FenError::InvalidPlacement(placement.to_owned()))?;
                if file > 8 {
                    return Err(FenError::InvalidPlacement(placement.to_owned()));
                }
                board.pieces.insert(Square { file, rank }, piece);
                file += 1;
            }
        }
        if file != 9 {
            return Err(FenError::InvalidPlacement(placement.to_owned()));
        }
    }
    Ok(())
}

fn parse_castling(field: &str) -> Result<CastlingRights, FenError> {
    let mut rights = CastlingRights {
        white_kingside: false,
        white_queenside: false,
        black_kingside: false,
        black_queenside: false,
    };
    if field == "-" {
        return Ok(rights);
    }
    for c in field.chars() {
        match c {
            'K' => rights.white_kingside = true,
            'Q' => rights.white_queenside = true,
            'k' => rights.black_kingside = true,
            'q' => rights.black_queenside = true,
            _ => return Err(FenError::InvalidCastling(field.to_owned())),
        }
    }
    Ok(rights)
}

fn parse_en_passant(field: &str) -> Result<Option<Square>, FenError> {
    if field == "-" {
        return Ok(None);
    }
    let square = Square::from_algebraic(field)
        .ok_or_else(|| FenError::InvalidEnPassant(field.to_owned()))?;
    if square.rank != 3 && square.rank != 6 {
        return Err(FenError::InvalidEnPassant(field.to_owned()));
    }
    Ok(Some(square))
}

fn castling_field(rights: CastlingRights) -> String {
    let mut field = String::new();
    if rights.white_kingside {
        field.push('K');
    }
    if rights.white_queenside {
        field.push('Q');
    }
    if rights.black_kingside {
        field.push('k');
    }
    if rights.black_queenside {
        field.push('q');
    }
    if field.is_empty() {
        field.push('-');
    }
    field
}
