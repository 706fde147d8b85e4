use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::error::{RecordError, Result};

/// Open a file-backed connection with the pragmas every store expects.
///
/// WAL lets readers on other connections proceed while one connection writes.
pub fn open_db(path: impl AsRef<Path>) -> Result<Connection> {
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA busy_timeout=3000;")?;
    Ok(conn)
}

/// One writer connection plus a ring of read-only connections to the same file.
///
/// Reads never wait on the writer's mutex. Writes share one connection, since
/// SQLite admits a single writer per database file. All statements run on the
/// blocking thread pool, so lock waits and `busy_timeout` never stall an async
/// worker.
pub struct ConnectionPool {
    writer: Arc<Mutex<Connection>>,
    readers: Vec<Arc<Mutex<Connection>>>,
    next_reader: AtomicUsize,
}

impl ConnectionPool {
    /// Pool over a file database with `read_connections` extra readers.
    pub fn open(path: impl AsRef<Path>, read_connections: usize) -> Result<Self> {
        let path = path.as_ref();
        let writer = open_db(path)?;
        init_db(&writer)?;

        let mut readers = Vec::with_capacity(read_connections);
        for _ in 0..read_connections {
            let conn = open_db(path)?;
            conn.execute_batch("PRAGMA query_only=ON;")?;
            readers.push(Arc::new(Mutex::new(conn)));
        }
        Ok(Self {
            writer: Arc::new(Mutex::new(writer)),
            readers,
            next_reader: AtomicUsize::new(0),
        })
    }

    /// Pool over one connection that serves reads and writes alike.
    ///
    /// The only option for `:memory:` databases, which are private to their
    /// connection.
    pub fn single(conn: Connection) -> Result<Self> {
        init_db(&conn)?;
        Ok(Self {
            writer: Arc::new(Mutex::new(conn)),
            readers: Vec::new(),
            next_reader: AtomicUsize::new(0),
        })
    }

    pub fn in_memory() -> Result<Self> {
        Self::single(Connection::open_in_memory()?)
    }

    pub fn read_connections(&self) -> usize {
        self.readers.len()
    }

    /// Run `f` on a reader connection (round-robin).
    pub async fn read<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let conn = if self.readers.is_empty() {
            Arc::clone(&self.writer)
        } else {
            let i = self.next_reader.fetch_add(1, Ordering::Relaxed) % self.readers.len();
            Arc::clone(&self.readers[i])
        };
        run_blocking(conn, f).await
    }

    /// Run `f` on the writer connection.
    pub async fn write<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        run_blocking(Arc::clone(&self.writer), f).await
    }
}

async fn run_blocking<T, F>(conn: Arc<Mutex<Connection>>, f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&Connection) -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let guard = conn.lock().map_err(|_| {
            RecordError::StorageUnavailable("database connection lock poisoned".into())
        })?;
        f(&guard)
    })
    .await
    .map_err(|e| RecordError::StorageUnavailable(format!("storage task failed: {e}")))?
}

/// Initialise the employees and questions tables.
///
/// Safe to call on every startup; uses `IF NOT EXISTS` throughout.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        -- AUTOINCREMENT: ids of deleted rows are never handed out again.
        CREATE TABLE IF NOT EXISTS employees (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            name        TEXT    NOT NULL,
            position    TEXT    NOT NULL,
            department  TEXT    NOT NULL,
            created_at  TEXT    NOT NULL,
            updated_at  TEXT    NOT NULL
        ) STRICT;

        CREATE TABLE IF NOT EXISTS questions (
            id                     TEXT    NOT NULL PRIMARY KEY,  -- UUIDv7
            question_text          TEXT    NOT NULL,
            solution               TEXT    NOT NULL,
            next_revision_date     INTEGER NOT NULL,  -- epoch microseconds, UTC
            current_interval_days  INTEGER NOT NULL DEFAULT 0,
            created_at             TEXT    NOT NULL,
            updated_at             TEXT    NOT NULL
        ) STRICT;

        -- Due list: SELECT … WHERE next_revision_date <= ?
        CREATE INDEX IF NOT EXISTS idx_questions_next_revision
            ON questions (next_revision_date);
        ",
    )?;
    Ok(())
}
