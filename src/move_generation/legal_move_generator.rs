//! Successor generation with the self-check filter.
//!
//! `expand` turns one piece's destination set into relocated copies of the
//! position and, when asked, drops every copy that leaves the mover's king on
//! a square covered by the opponent. `LegalMoveGenerator` runs it for every
//! piece of the side to move and flips the side afterwards.

use crate::game_state::{chess_types::*, position::Position};
use crate::move_generation::legal_move_apply::apply_move;
use crate::move_generation::legal_move_checks::is_king_in_check;
use crate::move_generation::legal_move_shared::piece_destinations;
use crate::move_generation::move_generator::MoveGenerator;

/// Every position reachable by one move of the piece on `square`.
///
/// The caller guarantees the square holds a piece of the side to move; an
/// empty square yields nothing. The side to move is not flipped.
pub fn expand(position: &Position, square: Square, avoid_self_check: bool) -> Vec<Position> {
    let Some(piece) = position.piece_at(square) else {
        return Vec::new();
    };

    let mut targets = piece_destinations(position, square, piece);
    let mut out = Vec::with_capacity(targets.count_ones() as usize);

    while targets != 0 {
        let to = targets.trailing_zeros() as Square;
        targets &= targets - 1;

        let next = apply_move(position, square, to);
        if avoid_self_check && is_king_in_check(&next, piece.color) {
            continue;
        }
        out.push(next);
    }

    out
}

pub struct LegalMoveGenerator;

impl MoveGenerator for LegalMoveGenerator {
    fn successors(&self, position: &Position) -> Vec<Position> {
        let side = position.side_to_move;
        let mut out = Vec::with_capacity(48);

        for (square, _) in position.pieces_of(side) {
            out.extend(expand(position, square, true));
        }
        for next in &mut out {
            next.flip_side_to_move();
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::{expand, LegalMoveGenerator};
    use crate::game_state::encoding::encode;
    use crate::game_state::{chess_types::*, position::Position};
    use crate::move_generation::move_generator::MoveGenerator;

    fn encoded_set(positions: &[Position]) -> BTreeSet<Vec<u8>> {
        positions.iter().map(encode).collect()
    }

    fn king_destinations(positions: &[Position], color: Color) -> BTreeSet<String> {
        positions
            .iter()
            .filter_map(|p| p.king_square(color))
            .map(square_name)
            .collect()
    }

    #[test]
    fn starting_position_has_twenty_distinct_successors() {
        let successors = LegalMoveGenerator.successors(&Position::starting());
        assert_eq!(successors.len(), 20);
        assert_eq!(encoded_set(&successors).len(), 20);
        assert!(successors.iter().all(|p| p.side_to_move == Color::Black));
    }

    #[test]
    fn starting_successors_split_into_pawn_and_knight_moves() {
        let position = Position::starting();
        let pawn_moves: usize = (8u8..16).map(|sq| expand(&position, sq, true).len()).sum();
        let knight_moves = expand(&position, 1, true).len() + expand(&position, 6, true).len();
        assert_eq!(pawn_moves, 16);
        assert_eq!(knight_moves, 4);
    }

    #[test]
    fn expansion_is_deterministic() {
        let position = Position::from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w")
            .expect("fen");
        let first = encoded_set(&LegalMoveGenerator.successors(&position));
        let second = encoded_set(&LegalMoveGenerator.successors(&position));
        assert_eq!(first, second);
    }

    #[test]
    fn king_may_not_stay_on_a_file_held_by_a_rook() {
        let position = Position::from_fen("3r4/8/8/8/8/8/8/3K4 w").expect("fen");
        let d1 = square_from_name("d1").expect("d1");
        let moves = expand(&position, d1, true);

        let expected: BTreeSet<String> =
            ["c1", "c2", "e1", "e2"].iter().map(|s| s.to_string()).collect();
        assert_eq!(king_destinations(&moves, Color::White), expected);
        assert!(moves.iter().all(|p| p.side_to_move == Color::White));
    }

    #[test]
    fn unfiltered_king_moves_include_attacked_squares() {
        let position = Position::from_fen("3r4/8/8/8/8/8/8/3K4 w").expect("fen");
        let moves = expand(&position, 3, false);
        assert_eq!(king_destinations(&moves, Color::White).len(), 5);
    }

    #[test]
    fn pinned_piece_cannot_leave_the_line() {
        // The knight on d2 shields the king on d1 from the rook on d8.
        let position = Position::from_fen("3r4/8/8/8/8/8/3N4/3K4 w").expect("fen");
        assert!(expand(&position, 11, true).is_empty());
        assert_eq!(expand(&position, 11, false).len(), 6);
    }

    #[test]
    fn capture_removes_the_enemy_piece() {
        let position = Position::from_fen("k7/8/8/3p4/4P3/8/8/K7 w").expect("fen");
        let e4 = square_from_name("e4").expect("e4");
        let moves = expand(&position, e4, true);
        assert_eq!(moves.len(), 2);
        assert!(moves.iter().any(|p| p.piece_count() == 3));
    }

    #[test]
    fn missing_king_filters_nothing() {
        // White has no king; the rook on d8 would otherwise matter.
        let position = Position::from_fen("3r4/8/8/8/8/8/8/3N4 w").expect("fen");
        let moves = expand(&position, 3, true);
        assert_eq!(moves.len(), expand(&position, 3, false).len());
        assert_eq!(moves.len(), 4);
    }

    #[test]
    fn last_rank_pawn_stays_a_pawn_without_moves() {
        let position = Position::from_fen("4P3/8/8/8/8/8/8/k6K w").expect("fen");
        let e8 = square_from_name("e8").expect("e8");
        assert!(expand(&position, e8, true).is_empty());
    }
}
