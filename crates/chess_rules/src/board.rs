use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

use crate::{
    piece::{Color, PieceType},
    Move, MoveType, Piece, Square,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("no piece on the origin square")]
    NoPieceAtOrigin,
    #[error("piece belongs to the side not on move")]
    WrongSide,
    #[error("move does not follow the piece's movement rules")]
    IllegalMove,
    #[error("promotion is missing or names an invalid piece")]
    InvalidPromotion,
    #[error("castling is not available")]
    IllegalCastle,
    #[error("move would leave the king in check")]
    KingLeftInCheck,
    #[error("no move to undo")]
    NothingToUndo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CastlingRights {
    pub white_kingside: bool,
    pub white_queenside: bool,
    pub black_kingside: bool,
    pub black_queenside: bool,
}

impl Default for CastlingRights {
    fn default() -> Self {
        Self {
            white_kingside: true,
            white_queenside: true,
            black_kingside: true,
            black_queenside: true,
        }
    }
}

/// Everything needed to reverse one applied move.
#[derive(Debug, Clone, Copy)]
struct Undo {
    mv: Move,
    moved: Piece,
    captured: Option<(Square, Piece)>,
    castling_rights: CastlingRights,
    en_passant: Option<Square>,
    halfmove_clock: u32,
}

/// Full game state. Moves are applied in place and reversed through the undo
/// stack; `make_move` and `undo_move` must stay paired LIFO.
#[derive(Debug, Clone)]
pub struct Board {
    pub(crate) pieces: HashMap<Square, Piece>,
    pub(crate) side_to_move: Color,
    pub(crate) castling_rights: CastlingRights,
    pub(crate) en_passant: Option<Square>,
    pub(crate) halfmove_clock: u32,
    pub(crate) fullmove_number: u32,
    history: Vec<Undo>,
}

impl Board {
    pub fn new() -> Self {
        let mut board = Self::empty();
        board.setup_initial_position();
        board
    }

    pub(crate) fn empty() -> Self {
        Self {
            pieces: HashMap::new(),
            side_to_move: Color::White,
            castling_rights: CastlingRights::default(),
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            history: Vec::new(),
        }
    }

    fn setup_initial_position(&mut self) {
        for file in 1..=8 {
            self.pieces.insert(
                Square { file, rank: 2 },
                Piece::new(PieceType::Pawn, Color::White),
            );
            self.pieces.insert(
                Square { file, rank: 7 },
                Piece::new(PieceType::Pawn, Color::Black),
            );
        }

        let piece_order = [
            PieceType::Rook,
            PieceType::Knight,
            PieceType::Bishop,
            PieceType::Queen,
            PieceType::King,
            PieceType::Bishop,
            PieceType::Knight,
            PieceType::Rook,
        ];

        for (file, &piece_type) in (1..=8).zip(piece_order.iter()) {
            self.pieces
                .insert(Square { file, rank: 1 }, Piece::new(piece_type, Color::White));
            self.pieces
                .insert(Square { file, rank: 8 }, Piece::new(piece_type, Color::Black));
        }
    }

    pub fn get_piece(&self, square: Square) -> Option<&Piece> {
        self.pieces.get(&square)
    }

    /// All occupied squares with their pieces, in no particular order.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.pieces.iter().map(|(square, piece)| (*square, *piece))
    }

    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub fn castling_rights(&self) -> CastlingRights {
        self.castling_rights
    }

    pub fn en_passant_square(&self) -> Option<Square> {
        self.en_passant
    }

    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    /// Validates and applies a move in place, recording an undo frame.
    /// The board is left untouched when an error is returned.
    pub fn make_move(&mut self, mv: Move) -> Result<(), MoveError> {
        let piece = *self.pieces.get(&mv.from).ok_or(MoveError::NoPieceAtOrigin)?;
        if piece.color != self.side_to_move {
            return Err(MoveError::WrongSide);
        }

        let is_castle = piece.piece_type == PieceType::King
            && (mv.to.file as i8 - mv.from.file as i8).abs() == 2;
        if is_castle {
            self.validate_castle(piece.color, mv)?;
            if mv.promotion.is_some() {
                return Err(MoveError::InvalidPromotion);
            }
        } else {
            if !mv.is_pseudo_legal(self) {
                return Err(MoveError::IllegalMove);
            }
            let last_rank = match piece.color {
                Color::White => 8,
                Color::Black => 1,
            };
            if piece.piece_type == PieceType::Pawn && mv.to.rank == last_rank {
                match mv.promotion {
                    Some(PieceType::Knight)
                    | Some(PieceType::Bishop)
                    | Some(PieceType::Rook)
                    | Some(PieceType::Queen) => {}
                    _ => return Err(MoveError::InvalidPromotion),
                }
            } else if mv.promotion.is_some() {
                return Err(MoveError::InvalidPromotion);
            }
        }

        self.apply_unchecked(mv)?;
        if self.in_check(piece.color) {
            self.undo_move().expect("a just-applied move must undo");
            return Err(MoveError::KingLeftInCheck);
        }
        Ok(())
    }

    /// Reverses the most recent `make_move`. Calls must pair 1:1, LIFO.
    pub fn undo_move(&mut self) -> Result<(), MoveError> {
        let undo = self.history.pop().ok_or(MoveError::NothingToUndo)?;
        let mover = undo.moved.color;

        self.pieces.remove(&undo.mv.to);
        self.pieces.insert(undo.mv.from, undo.moved);
        if let Some((square, piece)) = undo.captured {
            self.pieces.insert(square, piece);
        }

        // Castling also moved the rook
        if undo.moved.piece_type == PieceType::King
            && (undo.mv.to.file as i8 - undo.mv.from.file as i8).abs() == 2
        {
            let rank = undo.mv.from.rank;
            let (rook_home, rook_castled) = if undo.mv.to.file == 7 { (8, 6) } else { (1, 4) };
            if let Some(rook) = self.pieces.remove(&Square {
                file: rook_castled,
                rank,
            }) {
                self.pieces.insert(
                    Square {
                        file: rook_home,
                        rank,
                    },
                    rook,
                );
            }
        }

        self.castling_rights = undo.castling_rights;
        self.en_passant = undo.en_passant;
        self.halfmove_clock = undo.halfmove_clock;
        if mover == Color::Black {
            self.fullmove_number -= 1;
        }
        self.side_to_move = mover;
        Ok(())
    }

    /// All strictly legal moves for the side to move, in a fixed square-scan
    /// order so repeated calls on equal positions agree move for move.
    pub fn legal_moves(&mut self) -> Vec<Move> {
        let candidates = self.pseudo_legal_moves();
        let mut legal = Vec::with_capacity(candidates.len());
        for mv in candidates {
            if self.apply_unchecked(mv).is_err() {
                continue;
            }
            let mover = self.side_to_move.opposite();
            if !self.in_check(mover) {
                legal.push(mv);
            }
            self.undo_move().expect("a probe move must undo");
        }
        legal
    }

    fn pseudo_legal_moves(&self) -> Vec<Move> {
        let mut moves = Vec::new();
        let color = self.side_to_move;
        let last_rank = match color {
            Color::White => 8,
            Color::Black => 1,
        };

        for from_rank in 1..=8 {
            for from_file in 1..=8 {
                let from = Square {
                    file: from_file,
                    rank: from_rank,
                };
                let piece = match self.get_piece(from) {
                    Some(piece) if piece.color == color => *piece,
                    _ => continue,
                };

                for to_rank in 1..=8 {
                    for to_file in 1..=8 {
                        let to = Square {
                            file: to_file,
                            rank: to_rank,
                        };
                        if !Move::new(from, to).is_pseudo_legal(self) {
                            continue;
                        }
                        let move_type = if self.pieces.contains_key(&to) {
                            MoveType::Capture
                        } else if piece.piece_type == PieceType::Pawn && from.file != to.file {
                            MoveType::EnPassant
                        } else {
                            MoveType::Normal
                        };
                        if piece.piece_type == PieceType::Pawn && to.rank == last_rank {
                            for kind in [
                                PieceType::Queen,
                                PieceType::Rook,
                                PieceType::Bishop,
                                PieceType::Knight,
                            ] {
                                moves.push(Move {
                                    from,
                                    to,
                                    move_type,
                                    promotion: Some(kind),
                                });
                            }
                        } else {
                            moves.push(Move {
                                from,
                                to,
                                move_type,
                                promotion: None,
                            });
                        }
                    }
                }
            }
        }

        self.castle_moves(&mut moves);
        moves
    }

    fn castle_moves(&self, moves: &mut Vec<Move>) {
        let color = self.side_to_move;
        let rank = match color {
            Color::White => 1,
            Color::Black => 8,
        };
        for to_file in [7u8, 3] {
            let mv = Move::castle(Square { file: 5, rank }, Square { file: to_file, rank });
            if self.validate_castle(color, mv).is_ok() {
                moves.push(mv);
            }
        }
    }

    fn validate_castle(&self, color: Color, mv: Move) -> Result<(), MoveError> {
        let home_rank = match color {
            Color::White => 1,
            Color::Black => 8,
        };
        let king_home = Square {
            file: 5,
            rank: home_rank,
        };
        if mv.from != king_home || mv.to.rank != home_rank {
            return Err(MoveError::IllegalCastle);
        }
        let kingside = match mv.to.file {
            7 => true,
            3 => false,
            _ => return Err(MoveError::IllegalCastle),
        };

        let allowed = match (color, kingside) {
            (Color::White, true) => self.castling_rights.white_kingside,
            (Color::White, false) => self.castling_rights.white_queenside,
            (Color::Black, true) => self.castling_rights.black_kingside,
            (Color::Black, false) => self.castling_rights.black_queenside,
        };
        if !allowed {
            return Err(MoveError::IllegalCastle);
        }

        let rook_square = Square {
            file: if kingside { 8 } else { 1 },
            rank: home_rank,
        };
        if self.get_piece(rook_square).copied() != Some(Piece::new(PieceType::Rook, color)) {
            return Err(MoveError::IllegalCastle);
        }

        let empty_files: &[u8] = if kingside { &[6, 7] } else { &[2, 3, 4] };
        for &file in empty_files {
            if self.pieces.contains_key(&Square {
                file,
                rank: home_rank,
            }) {
                return Err(MoveError::IllegalCastle);
            }
        }

        // The king may not castle out of, through, or into check
        if self.in_check(color) {
            return Err(MoveError::IllegalCastle);
        }
        let crossed_files: &[u8] = if kingside { &[6, 7] } else { &[4, 3] };
        for &file in crossed_files {
            if self.is_attacked(
                Square {
                    file,
                    rank: home_rank,
                },
                color.opposite(),
            ) {
                return Err(MoveError::IllegalCastle);
            }
        }
        Ok(())
    }

    /// Applies a movement-rule-valid move without checking king safety.
    fn apply_unchecked(&mut self, mv: Move) -> Result<(), MoveError> {
        let piece = *self.pieces.get(&mv.from).ok_or(MoveError::NoPieceAtOrigin)?;

        let mut captured = self.pieces.get(&mv.to).map(|victim| (mv.to, *victim));
        if captured.is_none() && piece.piece_type == PieceType::Pawn && mv.from.file != mv.to.file {
            // Diagonal onto an empty square: en passant, victim sits beside us
            let victim_square = Square {
                file: mv.to.file,
                rank: mv.from.rank,
            };
            captured = self
                .pieces
                .remove(&victim_square)
                .map(|victim| (victim_square, victim));
        }

        self.history.push(Undo {
            mv,
            moved: piece,
            captured,
            castling_rights: self.castling_rights,
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
        });

        self.pieces.remove(&mv.from);
        let placed = match mv.promotion {
            Some(kind) => Piece::new(kind, piece.color),
            None => piece,
        };
        self.pieces.insert(mv.to, placed);

        if piece.piece_type == PieceType::King
            && (mv.to.file as i8 - mv.from.file as i8).abs() == 2
        {
            let rank = mv.from.rank;
            let (rook_home, rook_castled) = if mv.to.file == 7 { (8, 6) } else { (1, 4) };
            if let Some(rook) = self.pieces.remove(&Square {
                file: rook_home,
                rank,
            }) {
                self.pieces.insert(
                    Square {
                        file: rook_castled,
                        rank,
                    },
                    rook,
                );
            }
        }

        self.en_passant = if piece.piece_type == PieceType::Pawn
            && (mv.to.rank as i8 - mv.from.rank as i8).abs() == 2
        {
            Some(Square {
                file: mv.from.file,
                rank: (mv.from.rank + mv.to.rank) / 2,
            })
        } else {
            None
        };
        self.update_castling_rights(piece, mv, captured);
        self.halfmove_clock = if piece.piece_type == PieceType::Pawn || captured.is_some() {
            0
        } else {
            self.halfmove_clock + 1
        };
        if piece.color == Color::Black {
            self.fullmove_number += 1;
        }
        self.side_to_move = piece.color.opposite();
        Ok(())
    }

    fn update_castling_rights(&mut self, piece: Piece, mv: Move, captured: Option<(Square, Piece)>) {
        match piece.piece_type {
            PieceType::King => match piece.color {
                Color::White => {
                    self.castling_rights.white_kingside = false;
                    self.castling_rights.white_queenside = false;
                }
                Color::Black => {
                    self.castling_rights.black_kingside = false;
                    self.castling_rights.black_queenside = false;
                }
            },
            PieceType::Rook => clear_rook_rights(&mut self.castling_rights, piece.color, mv.from),
            _ => {}
        }
        // Capturing a rook on its home square also removes that wing
        if let Some((square, victim)) = captured {
            if victim.piece_type == PieceType::Rook {
                clear_rook_rights(&mut self.castling_rights, victim.color, square);
            }
        }
    }

    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.pieces
            .iter()
            .find(|(_, piece)| piece.piece_type == PieceType::King && piece.color == color)
            .map(|(square, _)| *square)
    }

    pub fn in_check(&self, color: Color) -> bool {
        self.king_square(color)
            .map_or(false, |square| self.is_attacked(square, color.opposite()))
    }

    /// Whether any piece of `by` attacks `square`.
    pub fn is_attacked(&self, square: Square, by: Color) -> bool {
        // Pawns attack from one rank behind the target, relative to their
        // push direction
        let pawn_rank_step: i8 = match by {
            Color::White => -1,
            Color::Black => 1,
        };
        for file_step in [-1i8, 1] {
            if let Some(origin) = square.offset(file_step, pawn_rank_step) {
                if self.has_piece(origin, PieceType::Pawn, by) {
                    return true;
                }
            }
        }

        const KNIGHT_JUMPS: [(i8, i8); 8] = [
            (1, 2),
            (2, 1),
            (2, -1),
            (1, -2),
            (-1, -2),
            (-2, -1),
            (-2, 1),
            (-1, 2),
        ];
        for (file_step, rank_step) in KNIGHT_JUMPS {
            if let Some(origin) = square.offset(file_step, rank_step) {
                if self.has_piece(origin, PieceType::Knight, by) {
                    return true;
                }
            }
        }

        const KING_STEPS: [(i8, i8); 8] = [
            (1, 0),
            (1, 1),
            (0, 1),
            (-1, 1),
            (-1, 0),
            (-1, -1),
            (0, -1),
            (1, -1),
        ];
        for (file_step, rank_step) in KING_STEPS {
            if let Some(origin) = square.offset(file_step, rank_step) {
                if self.has_piece(origin, PieceType::King, by) {
                    return true;
                }
            }
        }

        const DIAGONAL_RAYS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
        for (file_step, rank_step) in DIAGONAL_RAYS {
            if let Some(piece) = self.first_piece_along(square, file_step, rank_step) {
                if piece.color == by
                    && matches!(piece.piece_type, PieceType::Bishop | PieceType::Queen)
                {
                    return true;
                }
            }
        }

        const STRAIGHT_RAYS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
        for (file_step, rank_step) in STRAIGHT_RAYS {
            if let Some(piece) = self.first_piece_along(square, file_step, rank_step) {
                if piece.color == by
                    && matches!(piece.piece_type, PieceType::Rook | PieceType::Queen)
                {
                    return true;
                }
            }
        }

        false
    }

    fn has_piece(&self, square: Square, piece_type: PieceType, color: Color) -> bool {
        self.pieces.get(&square)
            == Some(&Piece {
                piece_type,
                color,
            })
    }

    fn first_piece_along(&self, from: Square, file_step: i8, rank_step: i8) -> Option<Piece> {
        let mut current = from;
        while let Some(next) = current.offset(file_step, rank_step) {
            if let Some(piece) = self.get_piece(next) {
                return Some(*piece);
            }
            current = next;
        }
        None
    }

    pub fn is_checkmate(&mut self) -> bool {
        self.in_check(self.side_to_move) && self.legal_moves().is_empty()
    }

    pub fn is_stalemate(&mut self) -> bool {
        !self.in_check(self.side_to_move) && self.legal_moves().is_empty()
    }

    /// Draws detectable without generating moves: fifty-move rule and
    /// insufficient material.
    pub fn is_draw_by_rule(&self) -> bool {
        self.halfmove_clock >= 100 || self.has_insufficient_material()
    }

    pub fn is_draw(&mut self) -> bool {
        self.is_draw_by_rule() || self.is_stalemate()
    }

    pub fn has_insufficient_material(&self) -> bool {
        let mut white = Vec::new();
        let mut black = Vec::new();
        for (square, piece) in &self.pieces {
            match piece.color {
                Color::White => white.push((*square, *piece)),
                Color::Black => black.push((*square, *piece)),
            }
        }

        // King vs king
        if white.len() == 1 && black.len() == 1 {
            return true;
        }

        // King and a single minor piece vs king
        if white.len() + black.len() == 3 {
            let lone = white
                .iter()
                .chain(black.iter())
                .find(|(_, piece)| piece.piece_type != PieceType::King);
            return matches!(
                lone,
                Some((_, piece))
                    if matches!(piece.piece_type, PieceType::Bishop | PieceType::Knight)
            );
        }

        // King and bishop each, bishops on same-colored squares
        if white.len() == 2 && black.len() == 2 {
            let white_bishop = white.iter().find(|(_, p)| p.piece_type == PieceType::Bishop);
            let black_bishop = black.iter().find(|(_, p)| p.piece_type == PieceType::Bishop);
            if let (Some((white_square, _)), Some((black_square, _))) = (white_bishop, black_bishop)
            {
                return (white_square.file + white_square.rank) % 2
                    == (black_square.file + black_square.rank) % 2;
            }
        }

        false
    }
}

fn clear_rook_rights(rights: &mut CastlingRights, color: Color, square: Square) {
    let home_rank = match color {
        Color::White => 1,
        Color::Black => 8,
    };
    if square.rank != home_rank {
        return;
    }
    match (color, square.file) {
        (Color::White, 1) => rights.white_queenside = false,
        (Color::White, 8) => rights.white_kingside = false,
        (Color::Black, 1) => rights.black_queenside = false,
        (Color::Black, 8) => rights.black_kingside = false,
        _ => {}
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (1..=8).rev() {
            write!(f, "{rank} ")?;
            for file in 1..=8 {
                match self.get_piece(Square { file, rank }) {
                    Some(piece) => write!(f, " {}", piece.to_fen_char())?,
                    None => write!(f, " .")?,
                }
            }
            writeln!(f)?;
        }
        write!(f, "   a b c d e f g h")
    }
}
