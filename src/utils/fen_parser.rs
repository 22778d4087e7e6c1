//! FEN-to-Position parser.
//!
//! Only the board layout and side-to-move fields matter to the explorer.
//! Castling, en-passant and clock fields are optional and ignored, since those
//! rules are not modelled.

use crate::errors::FenError;
use crate::game_state::{chess_types::*, position::Position};

pub fn parse_fen(fen: &str) -> Result<Position, FenError> {
    let mut parts = fen.split_whitespace();

    let board_part = parts.next().ok_or(FenError::MissingField("board layout"))?;
    let side_part = parts.next().ok_or(FenError::MissingField("side-to-move"))?;

    let mut position = Position::new_empty();
    parse_board(board_part, &mut position)?;
    position.side_to_move = parse_side_to_move(side_part)?;

    Ok(position)
}

fn parse_board(board_part: &str, position: &mut Position) -> Result<(), FenError> {
    let ranks: Vec<&str> = board_part.split('/').collect();
    if ranks.len() != 8 {
        return Err(FenError::RankCount(ranks.len()));
    }

    for (fen_rank_idx, rank_str) in ranks.iter().enumerate() {
        let board_rank = 7 - fen_rank_idx as u8;
        let mut file = 0u8;

        for ch in rank_str.chars() {
            if let Some(empty_count) = ch.to_digit(10) {
                if !(1..=8).contains(&empty_count) {
                    return Err(FenError::InvalidPiece(ch));
                }
                file += empty_count as u8;
                if file > 8 {
                    return Err(FenError::RankWidth { rank: fen_rank_idx });
                }
                continue;
            }

            let piece = piece_from_fen_char(ch).ok_or(FenError::InvalidPiece(ch))?;
            if file >= 8 {
                return Err(FenError::RankWidth { rank: fen_rank_idx });
            }

            position.set_piece(square_at(file, board_rank), Some(piece));
            file += 1;
        }

        if file != 8 {
            return Err(FenError::RankWidth { rank: fen_rank_idx });
        }
    }

    Ok(())
}

fn parse_side_to_move(side_part: &str) -> Result<Color, FenError> {
    match side_part {
        "w" => Ok(Color::White),
        "b" => Ok(Color::Black),
        _ => Err(FenError::InvalidSideToMove(side_part.to_owned())),
    }
}

fn piece_from_fen_char(ch: char) -> Option<Piece> {
    let color = if ch.is_ascii_uppercase() {
        Color::White
    } else if ch.is_ascii_lowercase() {
        Color::Black
    } else {
        return None;
    };

    let kind = match ch.to_ascii_lowercase() {
        'p' => PieceKind::Pawn,
        'n' => PieceKind::Knight,
        'b' => PieceKind::Bishop,
        'r' => PieceKind::Rook,
        'q' => PieceKind::Queen,
        'k' => PieceKind::King,
        _ => return None,
    };

    Some(Piece::new(kind, color))
}

#[cfg(test)]
mod tests {
    use super::parse_fen;
    use crate::errors::FenError;
    use crate::game_state::chess_rules::STARTING_POSITION_FEN;
    use crate::game_state::chess_types::*;
    use crate::utils::render_game_state::render_position;

    #[test]
    fn parse_starting_fen_and_render_board() {
        let position = parse_fen(STARTING_POSITION_FEN).expect("starting FEN should parse");

        println!("\n{}", render_position(&position));

        assert_eq!(position.side_to_move, Color::White);
        assert_eq!(position.piece_at(3), Some(Piece::new(PieceKind::Queen, Color::White)));
        assert_eq!(position.piece_at(60), Some(Piece::new(PieceKind::King, Color::Black)));
    }

    #[test]
    fn board_and_side_fields_are_enough() {
        let position = parse_fen("3r4/8/8/8/8/8/8/3K4 w").expect("short FEN should parse");
        assert_eq!(position.piece_count(), 2);
        assert_eq!(position.piece_at(59), Some(Piece::new(PieceKind::Rook, Color::Black)));
    }

    #[test]
    fn malformed_fen_is_rejected() {
        assert_eq!(parse_fen(""), Err(FenError::MissingField("board layout")));
        assert_eq!(parse_fen("8/8/8/8 w"), Err(FenError::RankCount(4)));
        assert_eq!(parse_fen("9/8/8/8/8/8/8/8 w"), Err(FenError::InvalidPiece('9')));
        assert_eq!(parse_fen("7/8/8/8/8/8/8/8 w"), Err(FenError::RankWidth { rank: 0 }));
        assert_eq!(parse_fen("x7/8/8/8/8/8/8/8 w"), Err(FenError::InvalidPiece('x')));
        assert_eq!(
            parse_fen("8/8/8/8/8/8/8/8 x"),
            Err(FenError::InvalidSideToMove("x".to_owned()))
        );
    }
}
