//! Contracts for the collaborators the engine reads from and writes to.
//!
//! The note backend and the pin registry's storage live outside the engine.
//! Both contracts are asynchronous so callers can fan requests out (the
//! scorer fetches both users of a pair concurrently) and abandon them by
//! dropping the future; every read is side-effect free.

use async_trait::async_trait;
use thiserror::Error;

use crate::{Category, GourmetFriendPin, Note, UserId};

/// Failure reported by a backing store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The backend could not serve the request.
    #[error("store backend failed to {operation}: {message}")]
    Backend {
        /// Description of the failed operation.
        operation: &'static str,
        /// Backend-specific detail.
        message: String,
    },
    /// A stored record could not be decoded into a domain value.
    #[error("invalid record {record}: {reason}")]
    InvalidRecord {
        /// Identifier of the record.
        record: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// Read access to users' tasting notes.
///
/// # Examples
///
/// ```rust
/// use async_trait::async_trait;
/// use palate_core::{Category, Note, NoteStore, StoreError, UserId};
///
/// struct EmptyStore;
///
/// #[async_trait]
/// impl NoteStore for EmptyStore {
///     async fn notes_for(&self, _owner: &UserId, _category: Category) -> Result<Vec<Note>, StoreError> {
///         Ok(Vec::new())
///     }
///
///     async fn authors(&self) -> Result<Vec<UserId>, StoreError> {
///         Ok(Vec::new())
///     }
/// }
/// ```
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Return every note `owner` wrote in `category`.
    ///
    /// Unknown users yield an empty list rather than an error.
    async fn notes_for(&self, owner: &UserId, category: Category) -> Result<Vec<Note>, StoreError>;

    /// Return every user that has written at least one note.
    async fn authors(&self) -> Result<Vec<UserId>, StoreError>;
}

/// Persistence for Gourmet Friend pins.
///
/// Implementations must keep at most one pin per `(pinner, pinned)` pair and
/// make [`PinStore::upsert_pin`] atomic with respect to concurrent callers.
#[async_trait]
pub trait PinStore: Send + Sync {
    /// Return the pin from `pinner` to `pinned`, if any.
    async fn find_pin(
        &self,
        pinner: &UserId,
        pinned: &UserId,
    ) -> Result<Option<GourmetFriendPin>, StoreError>;

    /// Return every pin created by `pinner`.
    async fn pins_by(&self, pinner: &UserId) -> Result<Vec<GourmetFriendPin>, StoreError>;

    /// Create the pin or union its categories into the existing one.
    ///
    /// The stored creation time of an existing pin is preserved. Returns the
    /// pin as stored.
    async fn upsert_pin(&self, pin: GourmetFriendPin) -> Result<GourmetFriendPin, StoreError>;

    /// Remove the whole relationship, reporting whether it existed.
    async fn remove_pin(&self, pinner: &UserId, pinned: &UserId) -> Result<bool, StoreError>;

    /// Remove one category. Removing the last category removes the pin.
    ///
    /// Returns the remaining pin, or `None` when no pin is left.
    async fn remove_category(
        &self,
        pinner: &UserId,
        pinned: &UserId,
        category: Category,
    ) -> Result<Option<GourmetFriendPin>, StoreError>;
}

/// Hook invoked after a note is created, edited or deleted.
///
/// Similarity caches implement this to drop results that involve the owner in
/// the affected category.
pub trait NoteWriteObserver: Send + Sync {
    /// Called once per written note.
    fn note_written(&self, owner: &UserId, category: Category);
}
