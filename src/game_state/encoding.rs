//! Canonical position encoding.
//!
//! The encoding is the dedup key of the persisted state graph, so it must be
//! total, deterministic and lossless for (board, side to move).
//!
//! Layout, 33 bytes:
//! - bytes `0..32`: one nibble per square, square `2i` in the low nibble of
//!   byte `i` and square `2i + 1` in the high nibble.
//! - byte `32`: side to move (`0` White, `1` Black).
//!
//! Nibble tags: `0` empty, `1..=6` White pawn/knight/bishop/rook/queen/king,
//! `7..=12` Black in the same order. Tags `13..=15` are invalid.
//!
//! The reserved score is not encoded; decoded positions carry a zero score.

use crate::errors::EncodingError;
use crate::game_state::chess_types::*;
use crate::game_state::position::Position;

pub const ENCODED_LEN: usize = 33;

const EMPTY_TAG: u8 = 0;
const BLACK_TAG_OFFSET: u8 = 6;
const SIDE_BYTE: usize = 32;

#[inline]
fn piece_tag(slot: Option<Piece>) -> u8 {
    match slot {
        None => EMPTY_TAG,
        Some(piece) => {
            let base = piece.kind.index() as u8 + 1;
            match piece.color {
                Color::White => base,
                Color::Black => base + BLACK_TAG_OFFSET,
            }
        }
    }
}

#[inline]
fn piece_from_tag(tag: u8, square: Square) -> Result<Option<Piece>, EncodingError> {
    match tag {
        EMPTY_TAG => Ok(None),
        1..=6 => Ok(PieceKind::from_index((tag - 1) as usize).map(|k| Piece::new(k, Color::White))),
        7..=12 => Ok(PieceKind::from_index((tag - 7) as usize).map(|k| Piece::new(k, Color::Black))),
        _ => Err(EncodingError::InvalidPieceTag { square, tag }),
    }
}

/// Serialises the board and side to move into the canonical 33-byte key.
pub fn encode(position: &Position) -> Vec<u8> {
    let mut out = vec![0u8; ENCODED_LEN];
    for square in 0u8..64 {
        let tag = piece_tag(position.piece_at(square));
        let byte = &mut out[(square / 2) as usize];
        if square % 2 == 0 {
            *byte |= tag;
        } else {
            *byte |= tag << 4;
        }
    }
    out[SIDE_BYTE] = match position.side_to_move {
        Color::White => 0,
        Color::Black => 1,
    };
    out
}

/// Rebuilds a position from its canonical key.
pub fn decode(bytes: &[u8]) -> Result<Position, EncodingError> {
    if bytes.len() != ENCODED_LEN {
        return Err(EncodingError::InvalidLength {
            expected: ENCODED_LEN,
            actual: bytes.len(),
        });
    }

    let mut position = Position::new_empty();
    for (index, byte) in bytes[..SIDE_BYTE].iter().enumerate() {
        let low = (index * 2) as Square;
        let high = low + 1;
        position.set_piece(low, piece_from_tag(byte & 0x0F, low)?);
        position.set_piece(high, piece_from_tag(byte >> 4, high)?);
    }

    position.side_to_move = match bytes[SIDE_BYTE] {
        0 => Color::White,
        1 => Color::Black,
        other => return Err(EncodingError::InvalidSideToMove(other)),
    };

    Ok(position)
}
