//! Bounded breadth-first frontier with spill-over to the store.
//!
//! Only `capacity` entries of the next depth are held in memory. The rest go to
//! the overflow table and come back in id order once the live entries of their
//! depth have been expanded. Overflow records are deleted only after their
//! batch has been processed, so an interrupted drain leaves them in place.

use std::mem;

use crate::errors::StoreResult;
use crate::storage::state_store::{StateId, StoreHandle};

/// A state waiting to be expanded, tagged with its distance from the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrontierEntry {
    pub state_id: StateId,
    pub depth: u32,
}

/// A persisted frontier entry together with its overflow row id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverflowRecord {
    pub id: i64,
    pub entry: FrontierEntry,
}

#[derive(Debug)]
pub struct FrontierManager {
    capacity: usize,
    drain_batch: usize,
    depth: u32,
    live: Vec<FrontierEntry>,
    next: Vec<FrontierEntry>,
}

impl FrontierManager {
    pub fn new(capacity: usize, drain_batch: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            drain_batch: drain_batch.max(1),
            depth: 0,
            live: Vec::new(),
            next: Vec::new(),
        }
    }

    /// Resets the frontier to a single entry.
    pub fn seed(&mut self, entry: FrontierEntry) {
        self.depth = entry.depth;
        self.live = vec![entry];
        self.next.clear();
    }

    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    #[inline]
    pub fn live_len(&self) -> usize {
        self.live.len()
    }

    #[inline]
    pub fn next_len(&self) -> usize {
        self.next.len()
    }

    /// Hands the in-memory entries of the current depth to the caller.
    pub fn take_live(&mut self) -> Vec<FrontierEntry> {
        mem::take(&mut self.live)
    }

    /// Queues entries for the next depth, spilling whatever exceeds the ceiling.
    ///
    /// Returns how many entries were written to the overflow table.
    pub fn accept_next(
        &mut self,
        handle: &mut StoreHandle,
        produced: Vec<FrontierEntry>,
    ) -> StoreResult<usize> {
        let room = self.capacity.saturating_sub(self.next.len());
        if produced.len() <= room {
            self.next.extend(produced);
            return Ok(0);
        }

        let mut produced = produced;
        let spill = produced.split_off(room);
        self.next.extend(produced);
        handle.spill_overflow(&spill)
    }

    /// Peeks the oldest overflow records of the current depth.
    pub fn drain_batch(&self, handle: &mut StoreHandle) -> StoreResult<Vec<OverflowRecord>> {
        handle.overflow_batch(self.depth, self.drain_batch)
    }

    /// Deletes overflow records whose entries have been expanded.
    pub fn acknowledge(
        &self,
        handle: &mut StoreHandle,
        records: &[OverflowRecord],
    ) -> StoreResult<usize> {
        let ids: Vec<i64> = records.iter().map(|r| r.id).collect();
        handle.delete_overflow(&ids)
    }

    /// Promotes the queued next-depth entries to the live set.
    pub fn advance(&mut self) {
        self.live = mem::take(&mut self.next);
        self.depth += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_state::chess_types::{Color, Piece, PieceKind};
    use crate::game_state::position::Position;
    use crate::storage::state_store::StateStore;

    fn entries(depth: u32, ids: std::ops::Range<i64>) -> Vec<FrontierEntry> {
        ids.map(|state_id| FrontierEntry { state_id, depth }).collect()
    }

    /// A store holding `n` single-pawn positions with ids `1..=n`.
    fn handle_with_states(n: usize) -> (tempfile::TempDir, StoreHandle) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = StateStore::open(dir.path().join("frontier.db"), 5_000).expect("open");
        let mut handle = store.connect().expect("connect");

        for square in 0..n as u8 {
            let mut position = Position::new_empty();
            position.set_piece(square, Some(Piece::new(PieceKind::Pawn, Color::White)));
            handle.intern_if_absent(&position).expect("intern");
        }
        (dir, handle)
    }

    #[test]
    fn accept_within_capacity_stays_in_memory() {
        let (_dir, mut handle) = handle_with_states(4);
        let mut frontier = FrontierManager::new(10, 10);
        frontier.seed(FrontierEntry { state_id: 1, depth: 0 });

        let spilled = frontier.accept_next(&mut handle, entries(1, 1..5)).expect("accept");
        assert_eq!(spilled, 0);
        assert_eq!(frontier.next_len(), 4);
        assert_eq!(handle.overflow_count(1).expect("count"), 0);
    }

    #[test]
    fn excess_entries_spill_to_overflow() {
        let (_dir, mut handle) = handle_with_states(8);
        let mut frontier = FrontierManager::new(3, 2);
        frontier.seed(FrontierEntry { state_id: 1, depth: 0 });

        assert_eq!(frontier.accept_next(&mut handle, entries(1, 1..3)).expect("accept"), 0);
        assert_eq!(frontier.accept_next(&mut handle, entries(1, 3..9)).expect("accept"), 5);
        assert_eq!(frontier.next_len(), 3);
        assert_eq!(handle.overflow_count(1).expect("count"), 5);
    }

    #[test]
    fn drain_peeks_until_acknowledged() {
        let (_dir, mut handle) = handle_with_states(8);
        let mut frontier = FrontierManager::new(2, 2);
        frontier.seed(FrontierEntry { state_id: 1, depth: 0 });
        frontier.accept_next(&mut handle, entries(1, 1..8)).expect("accept");
        frontier.advance();

        assert_eq!(frontier.depth(), 1);
        let live = frontier.take_live();
        assert_eq!(live, entries(1, 1..3));

        let mut drained = Vec::new();
        loop {
            let batch = frontier.drain_batch(&mut handle).expect("drain");
            if batch.is_empty() {
                break;
            }
            assert!(batch.len() <= 2);
            assert_eq!(frontier.drain_batch(&mut handle).expect("peek"), batch);
            drained.extend(batch.iter().map(|r| r.entry));
            frontier.acknowledge(&mut handle, &batch).expect("ack");
        }

        assert_eq!(drained, entries(1, 3..8));
        assert_eq!(handle.overflow_count(1).expect("count"), 0);
    }

    #[test]
    fn advance_moves_next_into_live() {
        let (_dir, mut handle) = handle_with_states(2);
        let mut frontier = FrontierManager::new(4, 4);
        frontier.seed(FrontierEntry { state_id: 1, depth: 0 });
        assert_eq!(frontier.take_live().len(), 1);
        assert_eq!(frontier.live_len(), 0);

        frontier.accept_next(&mut handle, entries(1, 1..3)).expect("accept");
        frontier.advance();
        assert_eq!(frontier.live_len(), 2);
        assert_eq!(frontier.next_len(), 0);
    }
}
