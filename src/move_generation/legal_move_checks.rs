//! Attack coverage and the self-check test.
//!
//! Coverage is recomputed from scratch over the whole board for every
//! candidate. That is quadratic-ish in the piece count and fine at the shallow
//! depths the explorer targets.

use tracing::trace;

use crate::game_state::{chess_types::*, position::Position};
use crate::move_generation::legal_move_shared::piece_destinations;

/// Union of the squares every piece of `color` could move to, king moves unfiltered.
pub fn attack_coverage(position: &Position, color: Color) -> u64 {
    position
        .pieces_of(color)
        .fold(0u64, |acc, (square, kind)| {
            acc | piece_destinations(position, square, Piece::new(kind, color))
        })
}

/// True when the king of `color` stands on a square covered by the opponent.
///
/// A side without a king is never in check: nothing gets filtered for it.
pub fn is_king_in_check(position: &Position, color: Color) -> bool {
    let Some(king_sq) = position.king_square(color) else {
        trace!(color = color.name(), "no king on board; skipping check filter");
        return false;
    };
    attack_coverage(position, color.opposite()) & (1u64 << king_sq) != 0
}
