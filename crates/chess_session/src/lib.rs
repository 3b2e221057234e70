//! Per-game bot session: runs the move selector on a background task pool
//! so the caller's interactive loop never blocks on a search.

use bevy_tasks::{AsyncComputeTaskPool, Task, TaskPool};
use log::{debug, info};
use thiserror::Error;

use chess_rules::Board;
use chess_search::{select_best_move, ScoredMove};

const MIN_SEARCH_DEPTH: u8 = 1;
const MAX_SEARCH_DEPTH: u8 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("a search is already in flight for this session")]
    SearchPending,
}

/// One logical game session's scheduling boundary.
///
/// The search itself stays synchronous and CPU-bound; the session clones the
/// board and hands the selector to the compute pool, then the caller polls
/// for the result between frames. At most one search is in flight at a time,
/// and a cancelled search never delivers its result.
pub struct BotSession {
    depth: u8,
    task: Option<Task<Option<ScoredMove>>>,
}

impl BotSession {
    pub fn new(depth: u8) -> Self {
        Self {
            depth: depth.clamp(MIN_SEARCH_DEPTH, MAX_SEARCH_DEPTH),
            task: None,
        }
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    pub fn is_thinking(&self) -> bool {
        self.task.is_some()
    }

    /// Snapshots the board and schedules a search for its side to move.
    /// Rejected while a previous search is still pending.
    pub fn request_move(&mut self, board: &Board) -> Result<(), SessionError> {
        if self.task.is_some() {
            return Err(SessionError::SearchPending);
        }

        // The snapshot is owned by the task; the caller's board is free to
        // change while we think
        let mut snapshot = board.clone();
        let depth = self.depth;
        debug!(
            "scheduling a depth-{depth} search for {:?}",
            snapshot.side_to_move()
        );

        let pool = AsyncComputeTaskPool::get_or_init(TaskPool::new);
        self.task = Some(pool.spawn(async move { select_best_move(&mut snapshot, depth) }));
        Ok(())
    }

    /// Non-blocking check for the pending search. `None` while the search is
    /// still running (or none was requested); `Some(result)` exactly once
    /// when it completes, where a `None` result means the position was
    /// terminal and there is no move to play.
    pub fn poll(&mut self) -> Option<Option<ScoredMove>> {
        let mut task = self.task.take()?;
        match futures_lite::future::block_on(futures_lite::future::poll_once(&mut task)) {
            Some(result) => {
                match &result {
                    Some(chosen) => info!("search finished: {} scoring {}", chosen.mv, chosen.score),
                    None => info!("search finished: terminal position, no move"),
                }
                Some(result)
            }
            None => {
                self.task = Some(task);
                None
            }
        }
    }

    /// Discards the pending search, if any. The session resets or tears down
    /// with it; a stale result must never reach a board that has moved on.
    pub fn cancel(&mut self) {
        if self.task.take().is_some() {
            debug!("cancelled the in-flight search");
        }
    }
}
