//! SQLite-backed note storage.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Utc};
use palate_core::{
    Category, CategoryParseError, Note, NoteExtension, NoteId, NoteStore, NoteWriteObserver,
    Rating, StoreError, UserId,
};
use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::SqliteStoreError;
use crate::connection::{initialise, open_file, run_blocking};

const SELECT_NOTE: &str =
    "SELECT id, owner_id, category, rating, experienced_at, extension FROM notes";

/// Note store persisted to a SQLite database file.
///
/// Every write notifies the registered [`NoteWriteObserver`]s once per
/// affected `(owner, category)` pair after the transaction commits, so a
/// similarity cache never sees a stale result survive an edit.
///
/// # Examples
/// ```no_run
/// use palate_data::SqliteNoteStore;
///
/// # async fn demo() -> Result<(), palate_data::SqliteStoreError> {
/// let store = SqliteNoteStore::open("var/palate.db")?;
/// let imported = store.import_notes_file("notes.json".into()).await?;
/// println!("imported {imported} notes");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SqliteNoteStore {
    path: Utf8PathBuf,
    observers: Vec<Arc<dyn NoteWriteObserver>>,
}

impl std::fmt::Debug for SqliteNoteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteNoteStore")
            .field("path", &self.path)
            .field("observers", &self.observers.len())
            .finish()
    }
}

struct RawNote {
    id: String,
    owner_id: String,
    category: String,
    rating: i64,
    experienced_at: DateTime<Utc>,
    extension: String,
}

impl RawNote {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            category: row.get(2)?,
            rating: row.get(3)?,
            experienced_at: row.get(4)?,
            extension: row.get(5)?,
        })
    }

    fn decode(self) -> Result<Note, SqliteStoreError> {
        let invalid = |reason: String| SqliteStoreError::Decode {
            record: self.id.clone(),
            reason,
        };
        let category: Category = self
            .category
            .parse()
            .map_err(|err: CategoryParseError| invalid(err.to_string()))?;
        let rating = u8::try_from(self.rating)
            .ok()
            .and_then(|value| Rating::new(value).ok())
            .ok_or_else(|| invalid(format!("rating {} is out of range", self.rating)))?;
        let extension: NoteExtension = serde_json::from_str(&self.extension)
            .map_err(|err| invalid(format!("malformed extension: {err}")))?;
        if extension.category() != category {
            return Err(invalid(format!(
                "extension is {} but the note is filed under {category}",
                extension.category()
            )));
        }
        Ok(Note {
            id: NoteId::new(self.id),
            owner_id: UserId::new(self.owner_id),
            rating,
            experienced_at: self.experienced_at,
            extension,
        })
    }
}

fn query_notes(
    connection: &Connection,
    sql: &str,
    bind: impl rusqlite::Params,
    operation: &'static str,
) -> Result<Vec<Note>, SqliteStoreError> {
    let mut statement = connection
        .prepare_cached(sql)
        .map_err(SqliteStoreError::query(operation))?;
    let rows = statement
        .query_map(bind, RawNote::from_row)
        .map_err(SqliteStoreError::query(operation))?;
    rows.map(|row| row.map_err(SqliteStoreError::query(operation))?.decode())
        .collect()
}

fn stored_owner(
    connection: &Connection,
    id: &str,
) -> Result<Option<(UserId, Category)>, SqliteStoreError> {
    let found: Option<(String, String)> = connection
        .query_row(
            "SELECT owner_id, category FROM notes WHERE id = ?1",
            [id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()
        .map_err(SqliteStoreError::query("look up existing note"))?;
    found
        .map(|(owner, category)| {
            category
                .parse()
                .map(|parsed| (UserId::new(owner), parsed))
                .map_err(|err: CategoryParseError| SqliteStoreError::Decode {
                    record: id.to_owned(),
                    reason: err.to_string(),
                })
        })
        .transpose()
}

fn write_notes(
    connection: &mut Connection,
    notes: &[Note],
) -> Result<BTreeSet<(UserId, Category)>, SqliteStoreError> {
    let transaction = connection
        .transaction()
        .map_err(SqliteStoreError::query("begin note import"))?;
    let mut touched = BTreeSet::new();
    {
        let mut insert = transaction
            .prepare_cached(
                "INSERT OR REPLACE INTO notes (
                    id, owner_id, category, rating, experienced_at, extension
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )
            .map_err(SqliteStoreError::query("prepare note insert"))?;
        for note in notes {
            if let Some(previous) = stored_owner(&transaction, note.id.as_str())? {
                touched.insert(previous);
            }
            let extension =
                serde_json::to_string(&note.extension).map_err(|source| {
                    SqliteStoreError::Encode {
                        record: note.id.to_string(),
                        source,
                    }
                })?;
            insert
                .execute(params![
                    note.id.as_str(),
                    note.owner_id.as_str(),
                    note.category().as_str(),
                    note.rating.get(),
                    note.experienced_at,
                    extension,
                ])
                .map_err(SqliteStoreError::query("insert note"))?;
            touched.insert((note.owner_id.clone(), note.category()));
        }
    }
    transaction
        .commit()
        .map_err(SqliteStoreError::query("commit note import"))?;
    Ok(touched)
}

fn read_import(path: &Utf8Path) -> Result<Vec<Note>, SqliteStoreError> {
    let file = open_file(path).map_err(|source| SqliteStoreError::ReadImport {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(std::io::BufReader::new(file)).map_err(|source| {
        SqliteStoreError::ParseImport {
            path: path.to_path_buf(),
            source,
        }
    })
}

impl SqliteNoteStore {
    /// Open the database at `path`, creating it and its schema if needed.
    ///
    /// # Errors
    /// Returns [`SqliteStoreError`] when the parent directory cannot be
    /// created or the database cannot be opened or initialised.
    pub fn open(path: impl Into<Utf8PathBuf>) -> Result<Self, SqliteStoreError> {
        let path = path.into();
        initialise(&path)?;
        Ok(Self {
            path,
            observers: Vec::new(),
        })
    }

    /// Notify `observer` after every committed write.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn NoteWriteObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Path of the backing database.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    fn notify(&self, touched: &BTreeSet<(UserId, Category)>) {
        for (owner, category) in touched {
            for observer in &self.observers {
                observer.note_written(owner, *category);
            }
        }
    }

    /// Insert or replace `notes` in one transaction.
    ///
    /// Replacing a note that moved to another owner or category notifies
    /// observers about both the old and the new pair.
    ///
    /// # Errors
    /// Returns [`SqliteStoreError`] when the transaction fails; no note is
    /// written in that case.
    pub async fn insert_notes(&self, notes: Vec<Note>) -> Result<usize, SqliteStoreError> {
        let written = notes.len();
        let touched = run_blocking(&self.path, "insert notes", move |connection| {
            write_notes(connection, &notes)
        })
        .await?;
        self.notify(&touched);
        log::debug!("stored {written} notes in {}", self.path);
        Ok(written)
    }

    /// Delete a note, reporting whether it existed.
    ///
    /// # Errors
    /// Returns [`SqliteStoreError`] when the delete fails.
    pub async fn delete_note(&self, id: &NoteId) -> Result<bool, SqliteStoreError> {
        let owned = id.clone();
        let removed = run_blocking(&self.path, "delete note", move |connection| {
            let previous = stored_owner(connection, owned.as_str())?;
            connection
                .execute("DELETE FROM notes WHERE id = ?1", [owned.as_str()])
                .map_err(SqliteStoreError::query("delete note"))?;
            Ok(previous)
        })
        .await?;
        let Some(pair) = removed else {
            return Ok(false);
        };
        self.notify(&BTreeSet::from([pair]));
        Ok(true)
    }

    /// Import a JSON array of notes from `path`.
    ///
    /// # Errors
    /// Returns [`SqliteStoreError::ReadImport`] or
    /// [`SqliteStoreError::ParseImport`] when the file cannot be read, and the
    /// errors of [`SqliteNoteStore::insert_notes`] otherwise.
    pub async fn import_notes_file(&self, path: Utf8PathBuf) -> Result<usize, SqliteStoreError> {
        let notes = tokio::task::spawn_blocking(move || read_import(&path))
            .await
            .map_err(|source| SqliteStoreError::Task {
                operation: "read import file",
                source,
            })??;
        self.insert_notes(notes).await
    }

    /// Every note not written by `viewer`, newest first.
    ///
    /// # Errors
    /// Returns [`SqliteStoreError`] when the query fails or a row is invalid.
    pub async fn feed_notes(&self, viewer: &UserId) -> Result<Vec<Note>, SqliteStoreError> {
        let owned = viewer.clone();
        run_blocking(&self.path, "list feed notes", move |connection| {
            query_notes(
                connection,
                &format!("{SELECT_NOTE} WHERE owner_id <> ?1 ORDER BY experienced_at DESC, id DESC"),
                [owned.as_str()],
                "list feed notes",
            )
        })
        .await
    }
}

#[async_trait]
impl NoteStore for SqliteNoteStore {
    async fn notes_for(&self, owner: &UserId, category: Category) -> Result<Vec<Note>, StoreError> {
        let owned = owner.clone();
        let notes = run_blocking(&self.path, "load notes", move |connection| {
            query_notes(
                connection,
                &format!("{SELECT_NOTE} WHERE owner_id = ?1 AND category = ?2 ORDER BY id"),
                [owned.as_str(), category.as_str()],
                "load notes",
            )
        })
        .await?;
        Ok(notes)
    }

    async fn authors(&self) -> Result<Vec<UserId>, StoreError> {
        let authors = run_blocking(&self.path, "list authors", |connection| {
            let mut statement = connection
                .prepare_cached("SELECT DISTINCT owner_id FROM notes ORDER BY owner_id")
                .map_err(SqliteStoreError::query("list authors"))?;
            let rows = statement
                .query_map([], |row| row.get::<_, String>(0))
                .map_err(SqliteStoreError::query("list authors"))?;
            rows.map(|row| row.map(UserId::new).map_err(SqliteStoreError::query("list authors")))
                .collect::<Result<Vec<_>, _>>()
        })
        .await?;
        Ok(authors)
    }
}
