//! Canonical chess-rule constants.
//!
//! This module stores static rule-related literals such as the standard
//! starting position FEN and the pawn home ranks used by the double advance.

use crate::game_state::chess_types::Color;

/// Standard chess starting position in Forsyth-Edwards Notation (FEN).
pub const STARTING_POSITION_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Rank (0-based) a pawn of `color` starts on; only from here may it advance two squares.
#[inline]
pub const fn pawn_start_rank(color: Color) -> u8 {
    match color {
        Color::White => 1,
        Color::Black => 6,
    }
}
