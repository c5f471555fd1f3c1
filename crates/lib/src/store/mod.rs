//! Snapshot-capable key-value stores.
//!
//! [`TxnMap`] is the state layer underneath a coding context: variables, the
//! field map, and per-block scratch data each live in one. Beginning a
//! transaction snapshots the whole live mapping onto a stack; rolling back
//! atomically replaces the live mapping with the snapshot, committing
//! discards it. Snapshots nest, and they are shallow: values are cloned by
//! their own `Clone`, which for reference-counted payloads shares rather
//! than copies.

mod errors;
pub use errors::StoreError;

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;
use std::rc::Rc;

use crate::{Result, Transaction};

/// A transactional map from keys to values.
///
/// Handles are cheap clones sharing one underlying mapping, which is what
/// lets a [`Transaction`]'s callbacks reach the store after the handle that
/// created them has moved on.
pub struct TxnMap<K, V> {
    inner: Rc<RefCell<TxnMapInner<K, V>>>,
}

struct TxnMapInner<K, V> {
    live: HashMap<K, V>,
    snapshots: Vec<HashMap<K, V>>,
}

impl<K, V> TxnMap<K, V>
where
    K: Eq + Hash + Clone + Display + 'static,
    V: Clone + 'static,
{
    /// Creates an empty map.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(TxnMapInner {
                live: HashMap::new(),
                snapshots: Vec::new(),
            })),
        }
    }

    /// Inserts a new key. Fails with [`StoreError::DuplicateKey`] if the key
    /// is already present; the map is left untouched in that case.
    pub fn insert(&self, key: K, value: V) -> Result<()> {
        let mut inner = self.inner.borrow_mut();
        if inner.live.contains_key(&key) {
            return Err(StoreError::DuplicateKey {
                key: key.to_string(),
            }
            .into());
        }
        inner.live.insert(key, value);
        Ok(())
    }

    /// Sets a key, overwriting any existing value.
    pub fn set(&self, key: K, value: V) {
        self.inner.borrow_mut().live.insert(key, value);
    }

    /// Looks a key up, cloning the value out.
    pub fn get(&self, key: &K) -> Result<V> {
        self.inner
            .borrow()
            .live
            .get(key)
            .cloned()
            .ok_or_else(|| {
                StoreError::KeyNotFound {
                    key: key.to_string(),
                }
                .into()
            })
    }

    /// Removes a key, returning its value if it was present.
    pub fn remove(&self, key: &K) -> Option<V> {
        self.inner.borrow_mut().live.remove(key)
    }

    /// Returns `true` if the key is present.
    pub fn contains_key(&self, key: &K) -> bool {
        self.inner.borrow().live.contains_key(key)
    }

    /// Returns the number of live entries.
    pub fn len(&self) -> usize {
        self.inner.borrow().live.len()
    }

    /// Returns `true` if the map holds no entries.
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().live.is_empty()
    }

    /// Clones the live entries out, in arbitrary order.
    pub fn entries(&self) -> Vec<(K, V)> {
        self.inner
            .borrow()
            .live
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Snapshots the live mapping and returns the transaction handle that
    /// resolves it.
    ///
    /// Rollback replaces the live mapping with the snapshot; commit discards
    /// the snapshot. Handles resolve innermost-first; a stray out-of-order
    /// resolution also discards any deeper snapshots still stacked above its
    /// own.
    pub fn begin_transaction(&self) -> Transaction {
        let depth = {
            let mut inner = self.inner.borrow_mut();
            let snapshot = inner.live.clone();
            inner.snapshots.push(snapshot);
            inner.snapshots.len()
        };

        let on_rollback = Rc::clone(&self.inner);
        let on_commit = Rc::clone(&self.inner);
        Transaction::new()
            .on_rollback(move || {
                let mut inner = on_rollback.borrow_mut();
                inner.snapshots.truncate(depth);
                if let Some(snapshot) = inner.snapshots.pop() {
                    inner.live = snapshot;
                }
                Ok(())
            })
            .on_commit(move || {
                let mut inner = on_commit.borrow_mut();
                inner.snapshots.truncate(depth);
                inner.snapshots.pop();
                Ok(())
            })
    }
}

impl<K, V> Default for TxnMap<K, V>
where
    K: Eq + Hash + Clone + Display + 'static,
    V: Clone + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Clone for TxnMap<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<K, V> std::fmt::Debug for TxnMap<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("TxnMap")
            .field("len", &inner.live.len())
            .field("open_snapshots", &inner.snapshots.len())
            .finish()
    }
}
