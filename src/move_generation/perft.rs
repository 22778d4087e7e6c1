//! In-memory reference counters.
//!
//! `perft` counts leaf move paths; `distinct_positions_by_depth` counts unique
//! canonical keys per ply. Tests and benches cross-check the persisted graph
//! against them.

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use crate::game_state::encoding::encode;
use crate::game_state::position::Position;
use crate::move_generation::move_generator::MoveGenerator;

pub fn perft<G: MoveGenerator + ?Sized>(generator: &G, position: &Position, depth: u8) -> u64 {
    if depth == 0 {
        return 1;
    }

    let children = generator.successors(position);
    if depth == 1 {
        return children.len() as u64;
    }

    children
        .iter()
        .map(|child| perft(generator, child, depth - 1))
        .sum()
}

/// Splits the root moves across threads, one per root successor.
pub fn perft_multi_threaded(
    generator: Arc<dyn MoveGenerator>,
    position: &Position,
    depth: u8,
) -> Result<u64, String> {
    if depth == 0 {
        return Ok(1);
    }

    let root_moves = generator.successors(position);
    let mut handles = Vec::with_capacity(root_moves.len());

    for child in root_moves {
        let generator_ref = Arc::clone(&generator);
        handles.push(thread::spawn(move || {
            perft(generator_ref.as_ref(), &child, depth - 1)
        }));
    }

    let mut total = 0u64;
    for handle in handles {
        total += handle
            .join()
            .map_err(|_| "perft worker thread panicked".to_owned())?;
    }

    Ok(total)
}

/// Number of distinct positions first reached at each ply `1..=depth`.
///
/// A position already seen at a shallower ply is not counted again, which is
/// exactly how the persisted graph assigns frontier depths.
pub fn distinct_positions_by_depth<G: MoveGenerator + ?Sized>(
    generator: &G,
    root: &Position,
    depth: u8,
) -> Vec<usize> {
    let mut seen: HashSet<Vec<u8>> = HashSet::new();
    seen.insert(encode(root));

    let mut layer = vec![*root];
    let mut counts = Vec::with_capacity(depth as usize);

    for _ in 0..depth {
        let mut next = Vec::new();
        for position in &layer {
            for child in generator.successors(position) {
                if seen.insert(encode(&child)) {
                    next.push(child);
                }
            }
        }
        counts.push(next.len());
        layer = next;
    }

    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::move_generation::legal_move_generator::LegalMoveGenerator;
    use crate::move_generation::move_generator::NullMoveGenerator;

    #[test]
    fn perft_depth_zero_counts_single_node() {
        assert_eq!(perft(&NullMoveGenerator, &Position::starting(), 0), 1);
        assert_eq!(perft(&NullMoveGenerator, &Position::starting(), 3), 0);
    }

    #[test]
    fn startpos_perft_matches_reference_counts() {
        let position = Position::starting();
        assert_eq!(perft(&LegalMoveGenerator, &position, 1), 20);
        assert_eq!(perft(&LegalMoveGenerator, &position, 2), 400);
        assert_eq!(perft(&LegalMoveGenerator, &position, 3), 8902);
    }

    #[test]
    fn multi_threaded_perft_agrees() {
        let generator: Arc<dyn MoveGenerator> = Arc::new(LegalMoveGenerator);
        let position = Position::starting();
        assert_eq!(perft_multi_threaded(generator, &position, 3), Ok(8902));
    }

    #[test]
    fn startpos_distinct_positions_merge_transpositions() {
        let counts = distinct_positions_by_depth(&LegalMoveGenerator, &Position::starting(), 3);
        assert_eq!(counts, vec![20, 400, 5362]);
    }
}
