//! Path-addressed JSON document tree with change notifications.
//!
//! This models the remote real-time store at its interface boundary: whole
//! subtree reads, path writes, push-id creation, and subscriptions that yield
//! a fresh snapshot of the watched path after every overlapping write. An
//! optional backing file persists the tree across restarts.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

use crate::StoreError;

const CHANGE_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
pub struct ChangeEvent {
    pub path: String,
}

#[derive(Clone)]
pub struct Store {
    tree: Arc<RwLock<Value>>,
    changes: broadcast::Sender<ChangeEvent>,
    backing: Option<Arc<PathBuf>>,
}

impl Store {
    /// Empty store with no backing file; mutations live only in memory.
    #[must_use]
    pub fn in_memory() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            tree: Arc::new(RwLock::new(Value::Object(Map::new()))),
            changes,
            backing: None,
        }
    }

    /// Open a store backed by a JSON file, loading the existing tree when the
    /// file is present. Every mutation rewrites the file.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` when the file exists but cannot be read or parsed.
    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        let tree = match tokio::fs::read(path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Value::Object(Map::new()),
            Err(e) => return Err(StoreError::Io(e)),
        };
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Ok(Self {
            tree: Arc::new(RwLock::new(tree)),
            changes,
            backing: Some(Arc::new(path.to_owned())),
        })
    }

    /// Snapshot of the subtree at `path`; `None` when nothing is stored there.
    pub async fn get(&self, path: &str) -> Option<Value> {
        let tree = self.tree.read().await;
        read_at(&tree, path).cloned()
    }

    /// Overwrite the subtree at `path`, creating intermediate objects.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` when persisting the backing file fails.
    pub async fn set(&self, path: &str, value: Value) -> Result<(), StoreError> {
        {
            let mut tree = self.tree.write().await;
            *node_mut(&mut tree, path) = value;
            self.persist(&tree).await?;
        }
        self.notify(path);
        Ok(())
    }

    /// Merge `fields` into the existing object at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when no object exists at `path`, or a
    /// persistence error.
    pub async fn merge(&self, path: &str, fields: Map<String, Value>) -> Result<(), StoreError> {
        {
            let mut tree = self.tree.write().await;
            let Some(Value::Object(existing)) = read_at_mut(&mut tree, path) else {
                return Err(StoreError::NotFound(path.to_owned()));
            };
            for (key, value) in fields {
                existing.insert(key, value);
            }
            self.persist(&tree).await?;
        }
        self.notify(path);
        Ok(())
    }

    /// Append `value` under `path` with a freshly generated key, returning
    /// the key. Mirrors the remote store's push-id creation.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` when persisting the backing file fails.
    pub async fn push(&self, path: &str, value: Value) -> Result<String, StoreError> {
        let key = Uuid::new_v4().simple().to_string();
        let child = format!("{path}/{key}");
        {
            let mut tree = self.tree.write().await;
            *node_mut(&mut tree, &child) = value;
            self.persist(&tree).await?;
        }
        self.notify(&child);
        Ok(key)
    }

    /// Delete the subtree at `path`. Nested children (for hotels, their
    /// reviews) go with it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when nothing exists at `path`, or a
    /// persistence error.
    pub async fn remove(&self, path: &str) -> Result<(), StoreError> {
        {
            let mut tree = self.tree.write().await;
            let (parent, key) = split_parent(path);
            let removed = match read_at_mut(&mut tree, parent) {
                Some(Value::Object(map)) => map.remove(key).is_some(),
                _ => false,
            };
            if !removed {
                return Err(StoreError::NotFound(path.to_owned()));
            }
            self.persist(&tree).await?;
        }
        self.notify(path);
        Ok(())
    }

    /// Subscribe to writes overlapping `path`. Each overlapping write yields a
    /// full snapshot of the watched subtree (never a diff); a burst of writes
    /// may collapse into fewer snapshots, always ending at the latest state.
    #[must_use]
    pub fn subscribe(&self, path: &str) -> Subscription {
        Subscription {
            store: self.clone(),
            path: path.to_owned(),
            rx: self.changes.subscribe(),
        }
    }

    fn notify(&self, path: &str) {
        // No receivers is fine; send only fails when nobody is listening.
        let _ = self.changes.send(ChangeEvent {
            path: path.to_owned(),
        });
    }

    async fn persist(&self, tree: &Value) -> Result<(), StoreError> {
        if let Some(backing) = &self.backing {
            let bytes = serde_json::to_vec_pretty(tree)?;
            tokio::fs::write(backing.as_ref(), bytes).await?;
        }
        Ok(())
    }
}

pub struct Subscription {
    store: Store,
    path: String,
    rx: broadcast::Receiver<ChangeEvent>,
}

impl Subscription {
    /// Wait for the next write overlapping the watched path and return the
    /// current snapshot beneath it (`Value::Null` when the subtree is gone).
    /// Returns `None` once the store side of the channel is dropped. Lagged
    /// receivers skip straight to the latest state.
    pub async fn next_snapshot(&mut self) -> Option<Value> {
        loop {
            match self.rx.recv().await {
                Ok(event) if paths_overlap(&event.path, &self.path) => {
                    return Some(self.store.get(&self.path).await.unwrap_or(Value::Null));
                }
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(_)) => {
                    return Some(self.store.get(&self.path).await.unwrap_or(Value::Null));
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// A write at `a` is visible to a watcher of `b` when either path is a
/// segment-wise prefix of the other.
fn paths_overlap(a: &str, b: &str) -> bool {
    let a: Vec<&str> = segments(a).collect();
    let b: Vec<&str> = segments(b).collect();
    let shared = a.len().min(b.len());
    a[..shared] == b[..shared]
}

fn read_at<'a>(tree: &'a Value, path: &str) -> Option<&'a Value> {
    let mut node = tree;
    for segment in segments(path) {
        node = node.as_object()?.get(segment)?;
    }
    Some(node)
}

fn read_at_mut<'a>(tree: &'a mut Value, path: &str) -> Option<&'a mut Value> {
    let mut node = tree;
    for segment in segments(path) {
        node = node.as_object_mut()?.get_mut(segment)?;
    }
    Some(node)
}

/// Navigate to `path`, replacing non-object intermediates with fresh objects.
fn node_mut<'a>(tree: &'a mut Value, path: &str) -> &'a mut Value {
    let mut node = tree;
    for segment in segments(path) {
        if !node.is_object() {
            *node = Value::Object(Map::new());
        }
        node = node
            .as_object_mut()
            .unwrap_or_else(|| unreachable!("just coerced to an object"))
            .entry(segment.to_owned())
            .or_insert(Value::Null);
    }
    node
}

fn split_parent(path: &str) -> (&str, &str) {
    match path.rfind('/') {
        Some(idx) => (&path[..idx], &path[idx + 1..]),
        None => ("", path),
    }
}
