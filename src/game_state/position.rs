//! Board value expanded by the state-space search.
//!
//! `Position` is a plain `Copy` value: a 64-square mailbox, the side to move
//! and a reserved score. Every candidate move works on its own copy, so no two
//! live positions ever share storage. Occupancy bitboards are derived on demand
//! for the ray-scanning move rules.

use crate::errors::FenError;
use crate::game_state::chess_rules::STARTING_POSITION_FEN;
use crate::game_state::chess_types::*;
use crate::utils::fen_parser::parse_fen;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    board: [Option<Piece>; 64],
    pub side_to_move: Color,
    /// Accumulated score. Reserved: the explorer never evaluates it and it is
    /// not part of the canonical encoding.
    pub score: i16,
}

impl Default for Position {
    fn default() -> Self {
        Self {
            board: [None; 64],
            side_to_move: Color::White,
            score: 0,
        }
    }
}

impl Position {
    #[inline]
    pub fn new_empty() -> Self {
        Self::default()
    }

    /// Standard initial position, White to move.
    pub fn starting() -> Self {
        parse_fen(STARTING_POSITION_FEN).expect("starting FEN should always parse")
    }

    #[inline]
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        parse_fen(fen)
    }

    #[inline]
    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.board[square as usize]
    }

    #[inline]
    pub fn set_piece(&mut self, square: Square, piece: Option<Piece>) {
        self.board[square as usize] = piece;
    }

    /// Moves whatever stands on `from` to `to`, dropping any piece on `to`.
    #[inline]
    pub fn relocate(&mut self, from: Square, to: Square) {
        self.board[to as usize] = self.board[from as usize].take();
    }

    #[inline]
    pub fn flip_side_to_move(&mut self) {
        self.side_to_move = self.side_to_move.opposite();
    }

    /// Squares occupied by `color` as a bitboard.
    pub fn occupancy(&self, color: Color) -> u64 {
        self.pieces_of(color)
            .fold(0u64, |acc, (square, _)| acc | (1u64 << square))
    }

    /// Iterates `(square, kind)` for every piece of `color`, in ascending square order.
    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = (Square, PieceKind)> + '_ {
        self.board
            .iter()
            .enumerate()
            .filter_map(move |(square, slot)| match slot {
                Some(piece) if piece.color == color => Some((square as Square, piece.kind)),
                _ => None,
            })
    }

    pub fn piece_count(&self) -> usize {
        self.board.iter().filter(|slot| slot.is_some()).count()
    }

    /// Square of the first king of `color`, if any.
    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.pieces_of(color)
            .find(|(_, kind)| *kind == PieceKind::King)
            .map(|(square, _)| square)
    }
}
