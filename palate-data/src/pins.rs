//! SQLite-backed Gourmet Friend pin storage.

use std::collections::BTreeSet;

use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Utc};
use palate_core::{Category, GourmetFriendPin, PinStore, StoreError, UserId};
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};

use crate::SqliteStoreError;
use crate::connection::{initialise, run_blocking};

/// Pin store persisted to a SQLite database file.
///
/// Writes take an immediate transaction, so two concurrent pins of the same
/// pair serialise and the second sees the first's categories.
#[derive(Debug, Clone)]
pub struct SqlitePinStore {
    path: Utf8PathBuf,
}

fn record_key(pinner: &str, pinned: &str) -> String {
    format!("{pinner}->{pinned}")
}

fn decode_pin(
    pinner: String,
    pinned: String,
    categories: &str,
    created_at: DateTime<Utc>,
) -> Result<GourmetFriendPin, SqliteStoreError> {
    let record = record_key(&pinner, &pinned);
    let parsed: BTreeSet<Category> =
        serde_json::from_str(categories).map_err(|err| SqliteStoreError::Decode {
            record: record.clone(),
            reason: format!("malformed categories: {err}"),
        })?;
    GourmetFriendPin::new(pinner.into(), pinned.into(), parsed, created_at).map_err(|err| {
        SqliteStoreError::Decode {
            record,
            reason: err.to_string(),
        }
    })
}

fn load_pin(
    connection: &Connection,
    pinner: &str,
    pinned: &str,
) -> Result<Option<GourmetFriendPin>, SqliteStoreError> {
    let row: Option<(String, DateTime<Utc>)> = connection
        .query_row(
            "SELECT categories, created_at FROM gourmet_friend_pins
             WHERE pinner_id = ?1 AND pinned_id = ?2",
            [pinner, pinned],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()
        .map_err(SqliteStoreError::query("load pin"))?;
    row.map(|(categories, created_at)| {
        decode_pin(pinner.to_owned(), pinned.to_owned(), &categories, created_at)
    })
    .transpose()
}

fn save_pin(connection: &Connection, pin: &GourmetFriendPin) -> Result<(), SqliteStoreError> {
    let categories =
        serde_json::to_string(&pin.categories).map_err(|source| SqliteStoreError::Encode {
            record: record_key(pin.pinner_id.as_str(), pin.pinned_id.as_str()),
            source,
        })?;
    connection
        .execute(
            "INSERT OR REPLACE INTO gourmet_friend_pins (
                pinner_id, pinned_id, categories, created_at
            ) VALUES (?1, ?2, ?3, ?4)",
            params![
                pin.pinner_id.as_str(),
                pin.pinned_id.as_str(),
                categories,
                pin.created_at,
            ],
        )
        .map_err(SqliteStoreError::query("save pin"))?;
    Ok(())
}

fn delete_pin(connection: &Connection, pinner: &str, pinned: &str) -> Result<bool, SqliteStoreError> {
    let removed = connection
        .execute(
            "DELETE FROM gourmet_friend_pins WHERE pinner_id = ?1 AND pinned_id = ?2",
            [pinner, pinned],
        )
        .map_err(SqliteStoreError::query("delete pin"))?;
    Ok(removed > 0)
}

impl SqlitePinStore {
    /// Open the database at `path`, creating it and its schema if needed.
    ///
    /// # Errors
    /// Returns [`SqliteStoreError`] when the database cannot be opened or
    /// initialised.
    pub fn open(path: impl Into<Utf8PathBuf>) -> Result<Self, SqliteStoreError> {
        let path = path.into();
        initialise(&path)?;
        Ok(Self { path })
    }

    /// Path of the backing database.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}

#[async_trait]
impl PinStore for SqlitePinStore {
    async fn find_pin(
        &self,
        pinner: &UserId,
        pinned: &UserId,
    ) -> Result<Option<GourmetFriendPin>, StoreError> {
        let (pinner_id, pinned_id) = (pinner.clone(), pinned.clone());
        let pin = run_blocking(&self.path, "load pin", move |connection| {
            load_pin(connection, pinner_id.as_str(), pinned_id.as_str())
        })
        .await?;
        Ok(pin)
    }

    async fn pins_by(&self, pinner: &UserId) -> Result<Vec<GourmetFriendPin>, StoreError> {
        let owned = pinner.clone();
        let pins = run_blocking(&self.path, "list pins", move |connection| {
            let mut statement = connection
                .prepare_cached(
                    "SELECT pinned_id, categories, created_at FROM gourmet_friend_pins
                     WHERE pinner_id = ?1 ORDER BY pinned_id",
                )
                .map_err(SqliteStoreError::query("list pins"))?;
            let rows = statement
                .query_map([owned.as_str()], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, DateTime<Utc>>(2)?,
                    ))
                })
                .map_err(SqliteStoreError::query("list pins"))?;
            rows.map(|row| {
                let (pinned, categories, created_at) =
                    row.map_err(SqliteStoreError::query("list pins"))?;
                decode_pin(owned.as_str().to_owned(), pinned, &categories, created_at)
            })
            .collect::<Result<Vec<_>, _>>()
        })
        .await?;
        Ok(pins)
    }

    async fn upsert_pin(&self, pin: GourmetFriendPin) -> Result<GourmetFriendPin, StoreError> {
        let stored = run_blocking(&self.path, "upsert pin", move |connection| {
            let transaction = connection
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .map_err(SqliteStoreError::query("begin pin upsert"))?;
            let merged = match load_pin(
                &transaction,
                pin.pinner_id.as_str(),
                pin.pinned_id.as_str(),
            )? {
                Some(mut existing) => {
                    existing.merge_categories(pin.categories);
                    existing
                }
                None => pin,
            };
            save_pin(&transaction, &merged)?;
            transaction
                .commit()
                .map_err(SqliteStoreError::query("commit pin upsert"))?;
            Ok(merged)
        })
        .await?;
        Ok(stored)
    }

    async fn remove_pin(&self, pinner: &UserId, pinned: &UserId) -> Result<bool, StoreError> {
        let (pinner_id, pinned_id) = (pinner.clone(), pinned.clone());
        let removed = run_blocking(&self.path, "delete pin", move |connection| {
            delete_pin(connection, pinner_id.as_str(), pinned_id.as_str())
        })
        .await?;
        Ok(removed)
    }

    async fn remove_category(
        &self,
        pinner: &UserId,
        pinned: &UserId,
        category: Category,
    ) -> Result<Option<GourmetFriendPin>, StoreError> {
        let (pinner_id, pinned_id) = (pinner.clone(), pinned.clone());
        let remaining = run_blocking(&self.path, "remove pin category", move |connection| {
            let transaction = connection
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .map_err(SqliteStoreError::query("begin pin category removal"))?;
            let Some(mut pin) = load_pin(&transaction, pinner_id.as_str(), pinned_id.as_str())?
            else {
                return Ok(None);
            };
            pin.categories.remove(&category);
            let outcome = if pin.categories.is_empty() {
                delete_pin(&transaction, pinner_id.as_str(), pinned_id.as_str())?;
                None
            } else {
                save_pin(&transaction, &pin)?;
                Some(pin)
            };
            transaction
                .commit()
                .map_err(SqliteStoreError::query("commit pin category removal"))?;
            Ok(outcome)
        })
        .await?;
        Ok(remaining)
    }
}
