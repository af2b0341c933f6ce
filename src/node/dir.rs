use std::sync::{Arc, OnceLock};

use tracing::debug;

use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::node::{stat_entry, EntrySink, Node};
use crate::store::ObjectStore;
use crate::types::{sort_entries, DirEntry, EntryKind, StatInfo, TreeEntry, MODE_DIRECTORY};

/// a directory-like object viewed as a read-only directory
///
/// the child list is fetched from the store on first use, sorted by name,
/// and kept for the lifetime of this node. two callers racing on the first
/// load may both query the store; whichever finishes first wins and the
/// other's identical result is dropped. a failed load stores nothing, so
/// the next call retries.
#[derive(Debug)]
pub struct Dir<S> {
    entry: TreeEntry,
    store: Arc<S>,
    children: OnceLock<Vec<TreeEntry>>,
}

impl<S: ObjectStore> Dir<S> {
    pub fn new(entry: TreeEntry, store: Arc<S>) -> Self {
        Self {
            entry,
            store,
            children: OnceLock::new(),
        }
    }

    /// root of a snapshot, bound to an already resolved tree hash
    ///
    /// the root has no name of its own.
    pub fn root(store: Arc<S>, hash: Hash) -> Self {
        Self::new(
            TreeEntry::new(MODE_DIRECTORY, EntryKind::Directory, hash, ""),
            store,
        )
    }

    pub fn entry(&self) -> &TreeEntry {
        &self.entry
    }

    pub fn hash(&self) -> &Hash {
        &self.entry.hash
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// has the child list been fetched yet
    pub fn is_loaded(&self) -> bool {
        self.children.get().is_some()
    }

    pub fn stat(&self) -> Result<StatInfo> {
        Ok(StatInfo::directory())
    }

    /// sorted child entries, loading them on first use
    pub fn children(&self) -> Result<&[TreeEntry]> {
        if let Some(children) = self.children.get() {
            return Ok(children);
        }

        let mut entries = self.store.list_children(&self.entry.hash)?;
        sort_entries(&mut entries);
        debug!(tree = %self.entry.hash, count = entries.len(), "loaded directory");

        Ok(self.children.get_or_init(|| entries))
    }

    /// deliver every child with its stat info as one batch, then signal done
    pub fn list<E: EntrySink + ?Sized>(&self, sink: &mut E) -> Result<()> {
        let children = self.children()?;

        let batch = children
            .iter()
            .map(|entry| {
                Ok(DirEntry {
                    name: entry.name.clone(),
                    info: stat_entry(self.store.as_ref(), entry)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        sink.push(batch)?;
        sink.done()
    }

    /// fresh node for the child called `name`
    pub fn lookup(&self, name: &str) -> Result<Node<S>> {
        let children = self.children()?;
        let idx = children
            .binary_search_by(|e| e.name.as_bytes().cmp(name.as_bytes()))
            .map_err(|_| Error::NoSuchEntry(name.to_string()))?;

        Ok(Node::from_entry(
            children[idx].clone(),
            Arc::clone(&self.store),
        ))
    }

    /// resolve a '/'-separated path one lookup at a time
    ///
    /// empty segments are ignored; an empty path gives a fresh node for this
    /// directory.
    pub fn walk(&self, path: &str) -> Result<Node<S>> {
        let mut segments = path.split('/').filter(|s| !s.is_empty());

        let Some(first) = segments.next() else {
            return Ok(Node::Dir(Dir::new(
                self.entry.clone(),
                Arc::clone(&self.store),
            )));
        };

        let mut node = self.lookup(first)?;
        let mut walked = first.to_string();

        for segment in segments {
            node = match node {
                Node::Dir(dir) => dir.lookup(segment)?,
                Node::File(_) => return Err(Error::NotADirectory(walked)),
            };
            walked.push('/');
            walked.push_str(segment);
        }

        Ok(node)
    }
}
