//! Opening the database, creating its schema, and running blocking work off
//! the async runtime.

use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};
use rusqlite::Connection;

use crate::SqliteStoreError;

/// How long a connection waits on a locked database before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS notes (
    id TEXT PRIMARY KEY,
    owner_id TEXT NOT NULL,
    category TEXT NOT NULL CHECK (category IN ('RESTAURANT', 'WINE', 'SPIRIT')),
    rating INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 10),
    experienced_at TEXT NOT NULL,
    extension TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS notes_owner_category ON notes (owner_id, category);
CREATE TABLE IF NOT EXISTS gourmet_friend_pins (
    pinner_id TEXT NOT NULL,
    pinned_id TEXT NOT NULL,
    categories TEXT NOT NULL,
    created_at TEXT NOT NULL,
    PRIMARY KEY (pinner_id, pinned_id),
    CHECK (pinner_id <> pinned_id)
);
";

/// Create the parent directory of `path` and the database schema.
///
/// Safe to call on an existing database.
pub(crate) fn initialise(path: &Utf8Path) -> Result<(), SqliteStoreError> {
    ensure_parent_dir(path)?;
    let connection = open(path)?;
    connection
        .execute_batch(SCHEMA)
        .map_err(|source| SqliteStoreError::Schema { source })
}

pub(crate) fn open(path: &Utf8Path) -> Result<Connection, SqliteStoreError> {
    let open_error = |source| SqliteStoreError::Open {
        path: path.to_path_buf(),
        source,
    };
    let connection = Connection::open(path.as_std_path()).map_err(open_error)?;
    connection.busy_timeout(BUSY_TIMEOUT).map_err(open_error)?;
    Ok(connection)
}

/// Run `work` against a fresh connection on Tokio's blocking pool.
pub(crate) async fn run_blocking<T, F>(
    path: &Utf8Path,
    operation: &'static str,
    work: F,
) -> Result<T, SqliteStoreError>
where
    T: Send + 'static,
    F: FnOnce(&mut Connection) -> Result<T, SqliteStoreError> + Send + 'static,
{
    let owned: Utf8PathBuf = path.to_path_buf();
    tokio::task::spawn_blocking(move || {
        let mut connection = open(&owned)?;
        work(&mut connection)
    })
    .await
    .map_err(|source| SqliteStoreError::Task { operation, source })?
}

fn ensure_parent_dir(path: &Utf8Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_os_str().is_empty() || parent == Utf8Path::new("/") {
        return Ok(());
    }

    let (base, relative) = if parent.is_absolute() {
        ("/", parent.strip_prefix("/").unwrap_or(parent))
    } else {
        (".", parent)
    };
    let create_error = |source| SqliteStoreError::CreateDirectory {
        path: parent.to_path_buf(),
        source,
    };
    let dir = fs_utf8::Dir::open_ambient_dir(base, ambient_authority()).map_err(create_error)?;
    dir.create_dir_all(relative).map_err(create_error)
}

/// Open a file for reading with ambient authority.
pub(crate) fn open_file(path: &Utf8Path) -> std::io::Result<fs_utf8::File> {
    fs_utf8::File::open_ambient(path, ambient_authority())
}
