//! Applies a single piece relocation to a copy of a position.

use crate::game_state::{chess_types::Square, position::Position};

/// Returns a copy of `position` with the piece on `from` moved to `to`.
///
/// Any piece on `to` is captured. The side to move is left untouched: callers
/// flip it once generation for the whole position is done.
#[inline]
pub fn apply_move(position: &Position, from: Square, to: Square) -> Position {
    let mut next = *position;
    next.relocate(from, to);
    next
}

#[cfg(test)]
mod tests {
    use super::apply_move;
    use crate::game_state::{chess_types::*, position::Position};

    #[test]
    fn apply_move_leaves_source_untouched() {
        let position = Position::starting();
        let next = apply_move(&position, 6, 21);

        assert_eq!(position.piece_at(21), None);
        assert_eq!(next.piece_at(6), None);
        assert_eq!(next.piece_at(21), Some(Piece::new(PieceKind::Knight, Color::White)));
        assert_eq!(next.side_to_move, Color::White);
    }
}
