//! The single live game owned by a running server.
//!
//! `GameSession` keeps the current snapshot behind a `tokio::sync::RwLock`.
//! Commands take the write lock for the whole read-compute-write so two
//! concurrent requests can never both act on the same stale snapshot.
//! Readers clone the `Arc` and release the lock immediately.

use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::game::{CommandResult, GameCommand, GameError, GameState};
use crate::logutil::escape_log;
use crate::metrics;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    pub at: DateTime<Utc>,
    pub kind: String,
    pub success: bool,
    pub message: String,
}

struct SessionInner {
    state: Arc<GameState>,
    journal: VecDeque<JournalEntry>,
}

pub struct GameSession {
    inner: RwLock<SessionInner>,
    journal_limit: usize,
}

impl GameSession {
    pub fn new(state: GameState, journal_limit: usize) -> Self {
        Self {
            inner: RwLock::new(SessionInner {
                state: Arc::new(state),
                journal: VecDeque::new(),
            }),
            journal_limit,
        }
    }

    /// Last committed snapshot.
    pub async fn snapshot(&self) -> Arc<GameState> {
        self.inner.read().await.state.clone()
    }

    /// Run `command` against the current snapshot and commit the new one if
    /// the command was accepted. Rejected commands leave the state as is.
    pub async fn apply(&self, command: &GameCommand) -> Result<CommandResult, GameError> {
        let mut inner = self.inner.write().await;
        let transition = command.execute(&inner.state)?;
        let result = transition.result;
        let success = result.success();

        metrics::record_command(command.verb(), success);
        if let CommandResult::Attack(outcome) = &result {
            if outcome.enemy_defeated {
                metrics::inc_enemies_defeated();
            }
        }

        if success {
            inner.state = Arc::new(transition.state);
            info!(
                "{} ({}): {}",
                command.verb(),
                escape_log(&inner.state.player.name),
                escape_log(result.message())
            );
        } else {
            debug!("{} rejected: {}", command.verb(), escape_log(result.message()));
        }
        self.push_entry(&mut inner, command.verb(), success, result.message());
        Ok(result)
    }

    /// Swap in a snapshot produced outside the command path (a loaded save).
    pub async fn replace(&self, state: GameState, note: &str) -> Arc<GameState> {
        let mut inner = self.inner.write().await;
        inner.state = Arc::new(state);
        self.push_entry(&mut inner, "load", true, note);
        inner.state.clone()
    }

    /// Journal an event that does not change the state (e.g. a save).
    pub async fn record(&self, kind: &str, message: &str) {
        let mut inner = self.inner.write().await;
        self.push_entry(&mut inner, kind, true, message);
    }

    /// Journal entries, oldest first.
    pub async fn journal(&self) -> Vec<JournalEntry> {
        self.inner.read().await.journal.iter().cloned().collect()
    }

    fn push_entry(&self, inner: &mut SessionInner, kind: &str, success: bool, message: &str) {
        if self.journal_limit == 0 {
            return;
        }
        while inner.journal.len() >= self.journal_limit {
            inner.journal.pop_front();
        }
        inner.journal.push_back(JournalEntry {
            at: Utc::now(),
            kind: kind.to_string(),
            success,
            message: message.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::new_game;

    #[tokio::test]
    async fn accepted_commands_commit_and_rejected_do_not() {
        let session = GameSession::new(new_game("Hero"), 10);
        let before = session.snapshot().await;

        let rejected = session
            .apply(&GameCommand::Move { to: "deep_forest".into() })
            .await
            .unwrap();
        assert!(!rejected.success());
        assert_eq!(*session.snapshot().await, *before);

        let moved = session
            .apply(&GameCommand::Move { to: "cellar".into() })
            .await
            .unwrap();
        assert!(moved.success());
        assert_eq!(session.snapshot().await.player.current_location, "cellar");
        // The earlier snapshot is untouched.
        assert_eq!(before.player.current_location, "tavern");
    }

    #[tokio::test]
    async fn journal_is_bounded() {
        let session = GameSession::new(new_game("Hero"), 3);
        for _ in 0..5 {
            session
                .apply(&GameCommand::Move { to: "nowhere".into() })
                .await
                .unwrap();
        }
        session.record("save", "Saved game").await;
        let journal = session.journal().await;
        assert_eq!(journal.len(), 3);
        assert_eq!(journal.last().unwrap().kind, "save");
        assert!(!journal[0].success);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_moves_are_serialized() {
        let session = Arc::new(GameSession::new(new_game("Hero"), 100));
        let mut handles = Vec::new();
        for _ in 0..8 {
            let s = session.clone();
            handles.push(tokio::spawn(async move {
                s.apply(&GameCommand::Move { to: "cellar".into() }).await.unwrap()
            }));
        }
        let mut accepted = 0;
        for h in handles {
            if h.await.unwrap().success() {
                accepted += 1;
            }
        }
        // Once in the cellar, "cellar" is no longer an exit.
        assert_eq!(accepted, 1);
        assert_eq!(session.snapshot().await.player.current_location, "cellar");
    }

    #[tokio::test]
    async fn replace_swaps_the_snapshot() {
        let session = GameSession::new(new_game("Hero"), 10);
        let mut other = new_game("Rival");
        other.player.current_location = "blacksmith".into();
        session.replace(other.clone(), "Loaded save").await;
        assert_eq!(*session.snapshot().await, other);
        assert_eq!(session.journal().await[0].kind, "load");
    }
}
