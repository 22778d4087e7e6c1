//! Primitive chess vocabulary shared by the position model, the move rules and
//! the canonical encoding.

/// Side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Black,
}

impl Color {
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Color::White => 0,
            Color::Black => 1,
        }
    }

    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Rank step a pawn of this color advances by.
    #[inline]
    pub const fn forward(self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Color::White => "White",
            Color::Black => "Black",
        }
    }
}

/// Piece kind (color is carried separately in [`Piece`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            PieceKind::Pawn => 0,
            PieceKind::Knight => 1,
            PieceKind::Bishop => 2,
            PieceKind::Rook => 3,
            PieceKind::Queen => 4,
            PieceKind::King => 5,
        }
    }

    #[inline]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(PieceKind::Pawn),
            1 => Some(PieceKind::Knight),
            2 => Some(PieceKind::Bishop),
            3 => Some(PieceKind::Rook),
            4 => Some(PieceKind::Queen),
            5 => Some(PieceKind::King),
            _ => None,
        }
    }
}

pub const ALL_PIECE_KINDS: [PieceKind; 6] = [
    PieceKind::Pawn,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Rook,
    PieceKind::Queen,
    PieceKind::King,
];

/// A colored piece occupying a square.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub kind: PieceKind,
    pub color: Color,
}

impl Piece {
    #[inline]
    pub const fn new(kind: PieceKind, color: Color) -> Self {
        Self { kind, color }
    }
}

/// Board square index (`0..=63`, `a1 == 0`, `h8 == 63`).
pub type Square = u8;

#[inline]
pub const fn square_at(file: u8, rank: u8) -> Square {
    rank * 8 + file
}

#[inline]
pub const fn file_of(square: Square) -> u8 {
    square % 8
}

#[inline]
pub const fn rank_of(square: Square) -> u8 {
    square / 8
}

/// Shifts a square by a file/rank delta, returning `None` when it leaves the board.
#[inline]
pub const fn offset_square(square: Square, file_step: i8, rank_step: i8) -> Option<Square> {
    let file = file_of(square) as i8 + file_step;
    let rank = rank_of(square) as i8 + rank_step;
    if file < 0 || file > 7 || rank < 0 || rank > 7 {
        return None;
    }
    Some(square_at(file as u8, rank as u8))
}

/// Parses a coordinate such as `e4`.
pub fn square_from_name(name: &str) -> Option<Square> {
    match *name.as_bytes() {
        [file @ b'a'..=b'h', rank @ b'1'..=b'8'] => Some(square_at(file - b'a', rank - b'1')),
        _ => None,
    }
}

/// Coordinate name of an on-board square, `a1` through `h8`.
pub fn square_name(square: Square) -> String {
    debug_assert!(square < 64);
    let file = char::from(b'a' + file_of(square));
    let rank = char::from(b'1' + rank_of(square));
    format!("{file}{rank}")
}

/// Names of the squares set in a bitboard, lowest square first.
pub fn square_names(bitboard: u64) -> Vec<String> {
    let mut names = Vec::with_capacity(bitboard.count_ones() as usize);
    let mut bits = bitboard;
    while bits != 0 {
        names.push(square_name(bits.trailing_zeros() as Square));
        bits &= bits - 1;
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_coordinates_round_trip() {
        for square in 0u8..64 {
            assert_eq!(square_at(file_of(square), rank_of(square)), square);
        }
        assert_eq!(square_at(3, 0), 3);
        assert_eq!(square_at(3, 7), 59);
    }

    #[test]
    fn offset_square_stays_on_board() {
        assert_eq!(offset_square(0, -1, 0), None);
        assert_eq!(offset_square(0, 1, 2), Some(17));
        assert_eq!(offset_square(63, 0, 1), None);
    }

    #[test]
    fn square_names_follow_file_then_rank() {
        assert_eq!(square_from_name("a1"), Some(0));
        assert_eq!(square_from_name("d1"), Some(3));
        assert_eq!(square_from_name("h8"), Some(63));
        assert_eq!(square_name(28), "e4");
        for square in 0u8..64 {
            assert_eq!(square_from_name(&square_name(square)), Some(square));
        }
    }

    #[test]
    fn malformed_square_names_are_rejected() {
        for name in ["", "e", "i1", "a9", "a0", "E4", "e44"] {
            assert_eq!(square_from_name(name), None, "{name}");
        }
    }

    #[test]
    fn bitboard_names_are_ordered() {
        assert_eq!(square_names(0), Vec::<String>::new());
        assert_eq!(square_names((1u64 << 28) | 1 | (1u64 << 63)), vec!["a1", "e4", "h8"]);
    }

    #[test]
    fn piece_kind_index_round_trips() {
        for kind in ALL_PIECE_KINDS {
            assert_eq!(PieceKind::from_index(kind.index()), Some(kind));
        }
        assert_eq!(PieceKind::from_index(6), None);
    }
}
