use std::collections::HashMap;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use crate::error::{Error, Result};
use crate::hash::{blob_id, tree_id, Hash};
use crate::store::ObjectStore;
use crate::types::{EntryKind, TreeEntry};

#[derive(Clone, Debug)]
enum Object {
    Blob(Vec<u8>),
    Tree(Vec<TreeEntry>),
}

/// in-process object store
///
/// objects are keyed by their git object id, so hashes agree with what
/// `git hash-object` and `git mktree` would produce for the same data.
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: RwLock<HashMap<Hash, Object>>,
    list_calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// store a blob, returning its id
    pub fn insert_blob(&self, content: impl Into<Vec<u8>>) -> Hash {
        let content = content.into();
        let hash = blob_id(&content);
        self.write().insert(hash, Object::Blob(content));
        hash
    }

    /// store a tree, returning its id
    ///
    /// referenced objects need not exist yet.
    pub fn insert_tree(&self, entries: Vec<TreeEntry>) -> Hash {
        let hash = tree_id(&entries);
        self.write().insert(hash, Object::Tree(entries));
        hash
    }

    /// check if an object exists
    pub fn contains(&self, hash: &Hash) -> bool {
        self.read().contains_key(hash)
    }

    /// number of `list_children` calls served so far, failed ones included
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::Relaxed)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<Hash, Object>> {
        self.objects.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<Hash, Object>> {
        self.objects.write().unwrap_or_else(|e| e.into_inner())
    }

    fn get(&self, hash: &Hash) -> Result<Object> {
        self.read()
            .get(hash)
            .cloned()
            .ok_or(Error::ObjectNotFound(*hash))
    }
}

impl ObjectStore for MemoryStore {
    type Content = Cursor<Vec<u8>>;

    fn size_of(&self, hash: &Hash) -> Result<u64> {
        let objects = self.read();
        match objects.get(hash) {
            Some(Object::Blob(content)) => Ok(content.len() as u64),
            Some(Object::Tree(entries)) => Ok(tree_payload_len(entries)),
            None => Err(Error::ObjectNotFound(*hash)),
        }
    }

    fn list_children(&self, hash: &Hash) -> Result<Vec<TreeEntry>> {
        self.list_calls.fetch_add(1, Ordering::Relaxed);
        match self.get(hash)? {
            Object::Tree(entries) => Ok(entries),
            Object::Blob(_) => Err(Error::ObjectNotFound(*hash)),
        }
    }

    fn open_content(&self, hash: &Hash) -> Result<Self::Content> {
        match self.get(hash)? {
            Object::Blob(content) => Ok(Cursor::new(content)),
            Object::Tree(_) => Err(Error::UnsupportedKind {
                kind: EntryKind::Directory.token().to_string(),
                name: hash.to_hex(),
            }),
        }
    }
}

/// size of a tree's raw payload, matching `git cat-file -s`
fn tree_payload_len(entries: &[TreeEntry]) -> u64 {
    entries
        .iter()
        .map(|e| format!("{:o} ", e.mode).len() + e.name.len() + 1 + Hash::ZERO.as_bytes().len())
        .sum::<usize>() as u64
}
