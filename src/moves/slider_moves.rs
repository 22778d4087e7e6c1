//! Occupancy-aware ray scans for bishops, rooks and queens.
//!
//! A ray includes every empty square up to the first occupied square, and
//! that occupied square itself. Whether the blocker may be captured is decided
//! by the move generator from its color.

pub const DIAGONAL_STEPS: [(i32, i32); 4] = [(1, 1), (1, -1), (-1, -1), (-1, 1)];
pub const ORTHOGONAL_STEPS: [(i32, i32); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

#[inline]
pub fn bishop_reach(square: u8, occupancy: u64) -> u64 {
    scan_rays(square, &DIAGONAL_STEPS, occupancy)
}

#[inline]
pub fn rook_reach(square: u8, occupancy: u64) -> u64 {
    scan_rays(square, &ORTHOGONAL_STEPS, occupancy)
}

/// Queen reach is the union of the diagonal and orthogonal ray sets.
#[inline]
pub fn queen_reach(square: u8, occupancy: u64) -> u64 {
    bishop_reach(square, occupancy) | rook_reach(square, occupancy)
}

fn scan_rays(square: u8, steps: &[(i32, i32); 4], occupancy: u64) -> u64 {
    steps.iter().fold(0u64, |acc, (file_step, rank_step)| {
        acc | trace_ray(square as i32, *file_step, *rank_step, occupancy)
    })
}

fn trace_ray(square: i32, file_step: i32, rank_step: i32, occupancy: u64) -> u64 {
    let mut file = (square % 8) + file_step;
    let mut rank = (square / 8) + rank_step;
    let mut reach = 0u64;

    while (0..8).contains(&file) && (0..8).contains(&rank) {
        let bit = 1u64 << (rank * 8 + file);
        reach |= bit;

        if (occupancy & bit) != 0 {
            break;
        }

        file += file_step;
        rank += rank_step;
    }

    reach
}

#[cfg(test)]
mod tests {
    use super::{bishop_reach, queen_reach, rook_reach};

    #[test]
    fn empty_board_ray_counts_from_d4() {
        let d4 = 27u8;
        assert_eq!(bishop_reach(d4, 0).count_ones(), 13);
        assert_eq!(rook_reach(d4, 0).count_ones(), 14);
        assert_eq!(queen_reach(d4, 0).count_ones(), 27);
    }

    #[test]
    fn rook_blocker_stops_ray() {
        let a1 = 0u8;
        let blocker_on_a4 = 1u64 << 24;
        let reach = rook_reach(a1, blocker_on_a4);

        assert_ne!(reach & (1u64 << 24), 0);
        assert_eq!(reach & (1u64 << 32), 0);
    }

    #[test]
    fn queen_reach_is_union_of_bishop_and_rook() {
        let d4 = 27u8;
        let blockers = (1u64 << 43) | (1u64 << 30);
        let reach = queen_reach(d4, blockers);

        assert_eq!(reach, bishop_reach(d4, blockers) | rook_reach(d4, blockers));
        assert_ne!(reach & (1u64 << 43), 0);
        assert_ne!(reach & (1u64 << 30), 0);
        assert_eq!(reach & (1u64 << 51), 0);
        assert_eq!(reach & (1u64 << 31), 0);
    }
}
