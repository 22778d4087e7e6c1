//! SQLite-backed state, edge and overflow tables.
//!
//! `StateStore` describes the database; every worker calls [`StateStore::connect`]
//! for its own `StoreHandle` so that unrelated reads never queue behind one
//! connection. Interning stays atomic across handles: the unique `encoding`
//! column decides which insert wins and every caller re-reads the id.
//!
//! Writes from the explorer go through [`StoreHandle::flush_expansions`], one
//! IMMEDIATE transaction per batch, so a batch is either visible as a whole or
//! not at all.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::sql_types::BigInt;
use diesel::sqlite::SqliteConnection;
use tracing::{debug, warn};

use crate::errors::{StoreError, StoreResult};
use crate::game_state::encoding::{decode, encode};
use crate::game_state::position::Position;
use crate::search::frontier::{FrontierEntry, OverflowRecord};
use crate::storage::schema::{edges, overflow, states, CREATE_SCHEMA_SQL};

/// Identity assigned to a canonical encoding the first time it is stored.
pub type StateId = i64;

const DELETE_CHUNK: usize = 500;

/// The children generated for one expanded parent, waiting to be flushed.
#[derive(Debug, Clone)]
pub struct Expansion {
    pub parent: StateId,
    pub child_depth: u32,
    pub children: Vec<Position>,
}

/// What a committed flush changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlushOutcome {
    /// States stored for the first time, as frontier entries at their child depth.
    pub discovered: Vec<FrontierEntry>,
    pub children_seen: usize,
    pub edges_added: usize,
    pub rows_skipped: usize,
}

#[derive(QueryableByName)]
struct CountRow {
    #[diesel(sql_type = BigInt)]
    n: i64,
}

/// Location and connection options of the state database.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
    busy_timeout_ms: u64,
}

impl StateStore {
    /// Opens (creating if needed) the database and its schema.
    ///
    /// Any failure here is a setup failure: nothing has been expanded yet.
    pub fn open(path: impl AsRef<Path>, busy_timeout_ms: u64) -> StoreResult<Self> {
        let store = Self {
            path: path.as_ref().to_path_buf(),
            busy_timeout_ms,
        };

        let mut handle = store.connect()?;
        handle.conn.batch_execute("PRAGMA journal_mode = WAL;")?;
        handle.conn.batch_execute(CREATE_SCHEMA_SQL)?;
        debug!(path = %store.path.display(), "state store schema ready");

        Ok(store)
    }

    /// A fresh, independent connection.
    pub fn connect(&self) -> StoreResult<StoreHandle> {
        let url = self.path.to_string_lossy();
        let mut conn = SqliteConnection::establish(&url)?;
        conn.batch_execute(&format!(
            "PRAGMA busy_timeout = {}; PRAGMA foreign_keys = ON; PRAGMA synchronous = NORMAL;",
            self.busy_timeout_ms
        ))?;
        Ok(StoreHandle { conn })
    }

    /// Removes a database file together with its WAL and shared-memory files.
    pub fn remove_files(path: impl AsRef<Path>) -> io::Result<()> {
        let path = path.as_ref();
        for suffix in ["", "-wal", "-shm"] {
            let mut name = path.as_os_str().to_owned();
            name.push(suffix);
            match fs::remove_file(PathBuf::from(name)) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

/// One connection to the state database.
pub struct StoreHandle {
    conn: SqliteConnection,
}

impl StoreHandle {
    /// Returns the id for `position`, storing it first if its encoding is new.
    ///
    /// The flag is true for exactly one caller per encoding.
    pub fn intern_if_absent(&mut self, position: &Position) -> StoreResult<(StateId, bool)> {
        let key = encode(position);
        self.conn.immediate_transaction(|conn| intern_key(conn, &key))
    }

    pub fn fetch(&mut self, id: StateId) -> StoreResult<Position> {
        let bytes: Vec<u8> = states::table
            .find(id)
            .select(states::encoding)
            .first(&mut self.conn)
            .optional()?
            .ok_or(StoreError::NotFound(id))?;
        Ok(decode(&bytes)?)
    }

    /// Records `parent -> child`; repeating a pair changes nothing.
    pub fn add_edge(&mut self, parent: StateId, child: StateId) -> StoreResult<bool> {
        Ok(insert_edge(&mut self.conn, parent, child)? == 1)
    }

    /// Child ids of `parent`, ascending.
    pub fn children_of(&mut self, parent: StateId) -> StoreResult<Vec<StateId>> {
        Ok(edges::table
            .filter(edges::parent_id.eq(parent))
            .order(edges::child_id.asc())
            .select(edges::child_id)
            .load(&mut self.conn)?)
    }

    /// Bytes used by the whole database: states, edges, overflow and indexes.
    pub fn storage_size(&mut self) -> StoreResult<u64> {
        let row: CountRow = diesel::sql_query(
            "SELECT page_count * page_size AS n FROM pragma_page_count(), pragma_page_size()",
        )
        .get_result(&mut self.conn)?;
        Ok(row.n.max(0) as u64)
    }

    /// Interns every child and links it to its parent in one transaction.
    ///
    /// A row that fails is logged and skipped; the rest of the batch commits.
    pub fn flush_expansions(&mut self, batch: &[Expansion]) -> StoreResult<FlushOutcome> {
        self.conn.immediate_transaction(|conn| -> StoreResult<FlushOutcome> {
            let mut outcome = FlushOutcome::default();

            for expansion in batch {
                for child in &expansion.children {
                    outcome.children_seen += 1;
                    let key = encode(child);

                    let (child_id, inserted) = match intern_key(conn, &key) {
                        Ok(found) => found,
                        Err(e) => {
                            warn!(parent = expansion.parent, error = %e, "skipping child that failed to intern");
                            outcome.rows_skipped += 1;
                            continue;
                        }
                    };

                    if inserted {
                        outcome.discovered.push(FrontierEntry {
                            state_id: child_id,
                            depth: expansion.child_depth,
                        });
                    }

                    match insert_edge(conn, expansion.parent, child_id) {
                        Ok(added) => outcome.edges_added += added,
                        Err(e) => {
                            warn!(parent = expansion.parent, child = child_id, error = %e, "skipping edge that failed to insert");
                            outcome.rows_skipped += 1;
                        }
                    }
                }
            }

            Ok(outcome)
        })
    }

    /// Persists frontier entries that did not fit in memory.
    pub fn spill_overflow(&mut self, entries: &[FrontierEntry]) -> StoreResult<usize> {
        if entries.is_empty() {
            return Ok(0);
        }
        self.conn.immediate_transaction(|conn| -> StoreResult<usize> {
            let mut written = 0usize;
            for entry in entries {
                written += diesel::insert_into(overflow::table)
                    .values((
                        overflow::state_id.eq(entry.state_id),
                        overflow::depth.eq(entry.depth as i32),
                    ))
                    .execute(conn)?;
            }
            Ok(written)
        })
    }

    /// Oldest `limit` overflow records stored for `depth`. Records stay in
    /// place until [`StoreHandle::delete_overflow`] acknowledges them.
    pub fn overflow_batch(&mut self, depth: u32, limit: usize) -> StoreResult<Vec<OverflowRecord>> {
        let rows: Vec<(i64, i64)> = overflow::table
            .filter(overflow::depth.eq(depth as i32))
            .order(overflow::id.asc())
            .select((overflow::id, overflow::state_id))
            .limit(limit as i64)
            .load(&mut self.conn)?;

        Ok(rows
            .into_iter()
            .map(|(id, state_id)| OverflowRecord {
                id,
                entry: FrontierEntry { state_id, depth },
            })
            .collect())
    }

    pub fn delete_overflow(&mut self, ids: &[i64]) -> StoreResult<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        self.conn.immediate_transaction(|conn| -> StoreResult<usize> {
            let mut deleted = 0usize;
            for chunk in ids.chunks(DELETE_CHUNK) {
                deleted += diesel::delete(overflow::table.filter(overflow::id.eq_any(chunk.to_vec())))
                    .execute(conn)?;
            }
            Ok(deleted)
        })
    }

    pub fn overflow_count(&mut self, depth: u32) -> StoreResult<u64> {
        let n: i64 = overflow::table
            .filter(overflow::depth.eq(depth as i32))
            .count()
            .get_result(&mut self.conn)?;
        Ok(n as u64)
    }

    pub fn state_count(&mut self) -> StoreResult<u64> {
        let n: i64 = states::table.count().get_result(&mut self.conn)?;
        Ok(n as u64)
    }

    pub fn edge_count(&mut self) -> StoreResult<u64> {
        let n: i64 = edges::table.count().get_result(&mut self.conn)?;
        Ok(n as u64)
    }

    /// Edges whose parent or child is missing from `states`. Always 0 for a
    /// consistent store.
    pub fn dangling_edge_count(&mut self) -> StoreResult<u64> {
        let row: CountRow = diesel::sql_query(
            "SELECT COUNT(*) AS n FROM edges \
             WHERE parent_id NOT IN (SELECT id FROM states) \
                OR child_id NOT IN (SELECT id FROM states)",
        )
        .get_result(&mut self.conn)?;
        Ok(row.n.max(0) as u64)
    }

    /// Id of the first state ever stored, the root of an exploration.
    pub fn root_id(&mut self) -> StoreResult<Option<StateId>> {
        Ok(states::table
            .select(diesel::dsl::min(states::id))
            .first(&mut self.conn)?)
    }
}

fn intern_key(conn: &mut SqliteConnection, key: &[u8]) -> StoreResult<(StateId, bool)> {
    let inserted = diesel::insert_or_ignore_into(states::table)
        .values(states::encoding.eq(key))
        .execute(conn)?
        == 1;

    let id: StateId = states::table
        .filter(states::encoding.eq(key))
        .select(states::id)
        .first(conn)?;

    Ok((id, inserted))
}

fn insert_edge(conn: &mut SqliteConnection, parent: StateId, child: StateId) -> StoreResult<usize> {
    Ok(diesel::insert_or_ignore_into(edges::table)
        .values((edges::parent_id.eq(parent), edges::child_id.eq(child)))
        .execute(conn)?)
}
