//! Per-kind destination rules shared by successor generation and attack coverage.

use crate::game_state::{chess_types::*, position::Position};
use crate::moves::leaper_moves::{king_reach, knight_reach};
use crate::moves::pawn_moves::pawn_reach;
use crate::moves::slider_moves::{bishop_reach, queen_reach, rook_reach};

/// Destination bitboard for `piece` standing on `square`.
///
/// Destinations are empty or enemy-occupied squares; own pieces always block.
/// The match is the rule table: one arm per piece kind.
pub fn piece_destinations(position: &Position, square: Square, piece: Piece) -> u64 {
    let own = position.occupancy(piece.color);
    let enemy = position.occupancy(piece.color.opposite());
    let occupancy = own | enemy;

    let reach = match piece.kind {
        PieceKind::Pawn => pawn_reach(piece.color, square, occupancy, enemy),
        PieceKind::Knight => knight_reach(square),
        PieceKind::Bishop => bishop_reach(square, occupancy),
        PieceKind::Rook => rook_reach(square, occupancy),
        PieceKind::Queen => queen_reach(square, occupancy),
        PieceKind::King => king_reach(square),
    };

    reach & !own
}
