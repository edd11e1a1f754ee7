//! Typed document collections.
//!
//! A [`Collection`] is a `HashMap` of documents behind a tokio `RwLock`.
//! Reads clone the matching documents out of the guard; mutations hold
//! the write guard for the whole call, which is the store's per-call
//! atomicity guarantee.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};

/// A document that can live in a [`Collection`].
pub trait Document: Clone + Send + Sync + 'static {
    /// Collection name used in errors and logs.
    const COLLECTION: &'static str;

    /// The document's unique id.
    fn id(&self) -> Uuid;
}

/// One table of the document store.
#[derive(Debug)]
pub struct Collection<T: Document> {
    rows: Arc<RwLock<HashMap<Uuid, T>>>,
}

impl<T: Document> Default for Collection<T> {
    fn default() -> Self {
        Self {
            rows: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl<T: Document> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            rows: Arc::clone(&self.rows),
        }
    }
}

impl<T: Document> Collection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a document, rejecting duplicate ids.
    pub async fn insert(&self, doc: T) -> StoreResult<Uuid> {
        let id = doc.id();
        let mut rows = self.rows.write().await;
        if rows.contains_key(&id) {
            return Err(StoreError::DuplicateId {
                collection: T::COLLECTION,
                id,
            });
        }
        rows.insert(id, doc);
        debug!(collection = T::COLLECTION, %id, "document inserted");
        Ok(id)
    }

    /// Returns a copy of the document with the given id.
    pub async fn get(&self, id: Uuid) -> Option<T> {
        self.rows.read().await.get(&id).cloned()
    }

    /// Applies `patch` to the document with the given id and returns the
    /// patched copy.
    pub async fn patch<F>(&self, id: Uuid, patch: F) -> StoreResult<T>
    where
        F: FnOnce(&mut T),
    {
        let mut rows = self.rows.write().await;
        let doc = rows.get_mut(&id).ok_or(StoreError::NotFound {
            collection: T::COLLECTION,
            id,
        })?;
        patch(doc);
        debug!(collection = T::COLLECTION, %id, "document patched");
        Ok(doc.clone())
    }

    /// Deletes the document with the given id.
    pub async fn delete(&self, id: Uuid) -> StoreResult<T> {
        let mut rows = self.rows.write().await;
        let removed = rows.remove(&id).ok_or(StoreError::NotFound {
            collection: T::COLLECTION,
            id,
        })?;
        debug!(collection = T::COLLECTION, %id, "document deleted");
        Ok(removed)
    }

    /// Returns copies of every document matching the predicate. The
    /// demo-scale stand-in for an index scan.
    pub async fn scan<F>(&self, predicate: F) -> Vec<T>
    where
        F: Fn(&T) -> bool,
    {
        self.rows
            .read()
            .await
            .values()
            .filter(|doc| predicate(doc))
            .cloned()
            .collect()
    }

    /// Returns copies of every document.
    pub async fn all(&self) -> Vec<T> {
        self.rows.read().await.values().cloned().collect()
    }

    /// Counts documents matching the predicate.
    pub async fn count<F>(&self, predicate: F) -> usize
    where
        F: Fn(&T) -> bool,
    {
        self.rows
            .read()
            .await
            .values()
            .filter(|doc| predicate(doc))
            .count()
    }

    /// Runs `f` while holding the write guard, giving the caller an
    /// atomic read-modify-write over the whole collection. Used by trade
    /// settlement so concurrent trades on the same symbol serialize.
    pub async fn with_write<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut HashMap<Uuid, T>) -> R,
    {
        let mut rows = self.rows.write().await;
        f(&mut rows)
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}
