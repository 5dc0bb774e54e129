//! Unit of work over a single database transaction.

use sqlx::{Sqlite, SqliteConnection, Transaction};

use crate::DbPool;

/// Stages repository operations until [`save_changes`](Self::save_changes).
///
/// Staged work is invisible to other sessions until saved. Dropping a session
/// without saving discards everything it staged.
pub struct Session {
    tx: Transaction<'static, Sqlite>,
}

impl Session {
    /// Open a session on a pooled connection.
    pub async fn begin(pool: &DbPool) -> Result<Self, sqlx::Error> {
        let tx = pool.begin().await?;
        Ok(Self { tx })
    }

    /// Open a session that takes the database write lock up front.
    ///
    /// A deferred transaction that reads before it writes cannot upgrade its
    /// lock while another writer holds it, and SQLite fails that upgrade
    /// immediately instead of waiting. `BEGIN IMMEDIATE` queues on the busy
    /// timeout instead, so concurrent writers serialize.
    pub async fn begin_write(pool: &DbPool) -> Result<Self, sqlx::Error> {
        let tx = pool.begin_with("BEGIN IMMEDIATE").await?;
        Ok(Self { tx })
    }

    /// Connection that repository calls should stage their work on.
    pub fn conn(&mut self) -> &mut SqliteConnection {
        &mut self.tx
    }

    /// Commit all staged operations as one unit.
    pub async fn save_changes(self) -> Result<(), sqlx::Error> {
        self.tx.commit().await
    }

    /// Explicitly discard all staged operations.
    pub async fn discard(self) -> Result<(), sqlx::Error> {
        self.tx.rollback().await
    }
}
