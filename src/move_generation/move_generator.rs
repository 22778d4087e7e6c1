use crate::game_state::position::Position;

/// Produces every successor of a position, side to move already flipped.
///
/// The orchestrator only depends on this seam, so scripted generators can
/// drive it in tests.
pub trait MoveGenerator: Send + Sync {
    fn successors(&self, position: &Position) -> Vec<Position>;
}

/// Generator with no moves at all; every position is terminal.
pub struct NullMoveGenerator;

impl MoveGenerator for NullMoveGenerator {
    fn successors(&self, _position: &Position) -> Vec<Position> {
        Vec::new()
    }
}
