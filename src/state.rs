use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use crate::config::Config;
use axum::extract::FromRef;
use sqlx::SqlitePool;
use tokio::sync::OwnedMutexGuard;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Config,
    pub quiz_locks: QuizLocks,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: Config) -> Self {
        Self {
            pool,
            config,
            quiz_locks: QuizLocks::default(),
        }
    }
}

impl FromRef<AppState> for SqlitePool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for QuizLocks {
    fn from_ref(state: &AppState) -> Self {
        state.quiz_locks.clone()
    }
}

/// One async mutex per quiz id.
///
/// Every write touching a quiz (attempt submission, replace, delete, translations)
/// holds the guard for that quiz for the duration of its transaction. Writes to
/// different quizzes never contend.
#[derive(Clone, Default)]
pub struct QuizLocks {
    inner: Arc<Mutex<HashMap<i64, Arc<tokio::sync::Mutex<()>>>>>,
}

impl QuizLocks {
    pub async fn lock(&self, quiz_id: i64) -> OwnedMutexGuard<()> {
        let slot = {
            // Entries are inserted whole, so a poisoned map is still consistent.
            let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
            map.entry(quiz_id).or_default().clone()
        };
        slot.lock_owned().await
    }

    /// Drops the slot of a deleted quiz.
    pub fn forget(&self, quiz_id: i64) {
        let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        map.remove(&quiz_id);
    }
}
