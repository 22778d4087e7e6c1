//! Fixed-offset reach tables for knights and kings.
//!
//! Both pieces jump to a fixed set of relative squares, so their reach is a
//! precomputed bitboard per origin square. Occupancy filtering happens in the
//! move generator.

pub const KNIGHT_OFFSETS: [(i32, i32); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

pub const KING_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

pub const KNIGHT_REACH: [u64; 64] = generate_reach(&KNIGHT_OFFSETS);
pub const KING_REACH: [u64; 64] = generate_reach(&KING_OFFSETS);

#[inline]
pub const fn knight_reach(square: u8) -> u64 {
    KNIGHT_REACH[square as usize]
}

#[inline]
pub const fn king_reach(square: u8) -> u64 {
    KING_REACH[square as usize]
}

const fn generate_reach(offsets: &[(i32, i32); 8]) -> [u64; 64] {
    let mut table = [0u64; 64];
    let mut sq = 0usize;

    while sq < 64 {
        let file = (sq % 8) as i32;
        let rank = (sq / 8) as i32;
        let mut reach = 0u64;
        let mut i = 0usize;

        while i < offsets.len() {
            reach |= set_if_valid(file + offsets[i].0, rank + offsets[i].1);
            i += 1;
        }

        table[sq] = reach;
        sq += 1;
    }

    table
}

const fn set_if_valid(file: i32, rank: i32) -> u64 {
    if file < 0 || file > 7 || rank < 0 || rank > 7 {
        return 0;
    }

    1u64 << ((rank as usize) * 8 + (file as usize))
}
