//! Pawn destinations: forward pushes and diagonal captures.
//!
//! There is no en passant and no promotion. A pawn on the last rank has no
//! forward square and simply stays a pawn.

use crate::game_state::chess_rules::pawn_start_rank;
use crate::game_state::chess_types::*;

pub const WHITE_PAWN_CAPTURES: [u64; 64] = generate_capture_table(1);
pub const BLACK_PAWN_CAPTURES: [u64; 64] = generate_capture_table(-1);

/// Diagonal forward-left/right squares of a pawn, regardless of occupancy.
#[inline]
pub const fn pawn_capture_squares(color: Color, square: Square) -> u64 {
    match color {
        Color::White => WHITE_PAWN_CAPTURES[square as usize],
        Color::Black => BLACK_PAWN_CAPTURES[square as usize],
    }
}

/// Every square a pawn of `color` on `square` may move to.
///
/// - one square forward if empty;
/// - two squares forward from the start rank if both squares are empty;
/// - one square diagonally forward only onto an `enemy` occupied square.
pub fn pawn_reach(color: Color, square: Square, occupancy: u64, enemy: u64) -> u64 {
    let mut reach = pawn_capture_squares(color, square) & enemy;

    let Some(single) = offset_square(square, 0, color.forward()) else {
        return reach;
    };
    let single_bit = 1u64 << single;
    if occupancy & single_bit != 0 {
        return reach;
    }
    reach |= single_bit;

    if rank_of(square) == pawn_start_rank(color) {
        if let Some(double) = offset_square(single, 0, color.forward()) {
            let double_bit = 1u64 << double;
            if occupancy & double_bit == 0 {
                reach |= double_bit;
            }
        }
    }

    reach
}

const fn generate_capture_table(rank_step: i32) -> [u64; 64] {
    let mut table = [0u64; 64];
    let mut sq = 0usize;

    while sq < 64 {
        let file = (sq % 8) as i32;
        let rank = (sq / 8) as i32 + rank_step;
        let mut captures = 0u64;

        if rank >= 0 && rank < 8 {
            if file > 0 {
                captures |= 1u64 << (rank * 8 + file - 1);
            }
            if file < 7 {
                captures |= 1u64 << (rank * 8 + file + 1);
            }
        }

        table[sq] = captures;
        sq += 1;
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn white_pawn_capture_squares_from_e2() {
        let e2 = 12u8;
        assert_eq!(pawn_capture_squares(Color::White, e2), (1u64 << 19) | (1u64 << 21));
    }

    #[test]
    fn black_pawn_capture_squares_from_e7() {
        let e7 = 52u8;
        assert_eq!(pawn_capture_squares(Color::Black, e7), (1u64 << 43) | (1u64 << 45));
    }

    #[test]
    fn start_rank_pawn_may_advance_one_or_two() {
        let e2 = 12u8;
        assert_eq!(pawn_reach(Color::White, e2, 0, 0), (1u64 << 20) | (1u64 << 28));
        let e7 = 52u8;
        assert_eq!(pawn_reach(Color::Black, e7, 0, 0), (1u64 << 44) | (1u64 << 36));
    }

    #[test]
    fn blocked_pawn_cannot_jump() {
        let e2 = 12u8;
        let blocker_on_e3 = 1u64 << 20;
        assert_eq!(pawn_reach(Color::White, e2, blocker_on_e3, 0), 0);

        let blocker_on_e4 = 1u64 << 28;
        assert_eq!(pawn_reach(Color::White, e2, blocker_on_e4, 0), 1u64 << 20);
    }

    #[test]
    fn diagonal_only_onto_enemy() {
        let e4 = 28u8;
        let enemy_on_d5 = 1u64 << 35;
        let own_on_f5 = 1u64 << 37;
        let reach = pawn_reach(Color::White, e4, enemy_on_d5 | own_on_f5, enemy_on_d5);
        assert_eq!(reach, (1u64 << 36) | enemy_on_d5);
    }

    #[test]
    fn last_rank_pawn_has_no_forward_move() {
        let e8 = 60u8;
        assert_eq!(pawn_reach(Color::White, e8, 0, 0), 0);
    }
}
