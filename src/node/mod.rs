//! filesystem view over store objects
//!
//! a [`Dir`] wraps a directory-like object and a [`File`] a file-like one.
//! nodes are cheap to create and are handed out fresh on every lookup;
//! the only state a node keeps is a directory's lazily loaded child list.

mod dir;
mod file;

use std::io::{self, Write};
use std::sync::Arc;

use crate::error::Result;
use crate::store::ObjectStore;
use crate::types::{DirEntry, EntryKind, StatInfo, TreeEntry};

pub use dir::Dir;
pub use file::File;

/// a node resolved from a directory lookup
#[derive(Debug)]
pub enum Node<S> {
    Dir(Dir<S>),
    File(File<S>),
}

impl<S: ObjectStore> Node<S> {
    /// wrap a tree entry in the node type matching its kind
    pub fn from_entry(entry: TreeEntry, store: Arc<S>) -> Self {
        match entry.kind {
            EntryKind::Directory => Node::Dir(Dir::new(entry, store)),
            EntryKind::File => Node::File(File::new(entry, store)),
        }
    }

    pub fn stat(&self) -> Result<StatInfo> {
        match self {
            Node::Dir(dir) => dir.stat(),
            Node::File(file) => file.stat(),
        }
    }

    /// the entry this node was created from
    pub fn entry(&self) -> &TreeEntry {
        match self {
            Node::Dir(dir) => dir.entry(),
            Node::File(file) => file.entry(),
        }
    }

    pub fn kind(&self) -> EntryKind {
        self.entry().kind
    }

    pub fn into_dir(self) -> Option<Dir<S>> {
        match self {
            Node::Dir(dir) => Some(dir),
            Node::File(_) => None,
        }
    }

    pub fn into_file(self) -> Option<File<S>> {
        match self {
            Node::File(file) => Some(file),
            Node::Dir(_) => None,
        }
    }
}

/// stat info for a child entry without constructing a node for it
pub(crate) fn stat_entry<S: ObjectStore>(store: &S, entry: &TreeEntry) -> Result<StatInfo> {
    match entry.kind {
        EntryKind::Directory => Ok(StatInfo::directory()),
        EntryKind::File => Ok(StatInfo::file(
            store.size_of(&entry.hash)?,
            entry.is_executable(),
        )),
    }
}

/// receiver for [`Dir::list`]: one batch of entries, then `done`
pub trait EntrySink {
    fn push(&mut self, entries: Vec<DirEntry>) -> Result<()>;

    fn done(&mut self) -> Result<()>;
}

impl EntrySink for Vec<DirEntry> {
    fn push(&mut self, entries: Vec<DirEntry>) -> Result<()> {
        self.extend(entries);
        Ok(())
    }

    fn done(&mut self) -> Result<()> {
        Ok(())
    }
}

/// receiver for [`File::read`]
///
/// `done` is only called once every byte has been written.
pub trait ByteSink: Write {
    fn done(&mut self) -> io::Result<()> {
        self.flush()
    }
}

impl ByteSink for Vec<u8> {}

impl ByteSink for std::fs::File {}

impl ByteSink for io::Stdout {}

impl ByteSink for io::StdoutLock<'_> {}

impl<T: ByteSink + ?Sized> ByteSink for &mut T {
    fn done(&mut self) -> io::Result<()> {
        (**self).done()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::Hash;

    #[test]
    fn test_node_from_entry() {
        let store = Arc::new(MemoryStore::new());
        let blob = store.insert_blob(b"#!/bin/sh\n".to_vec());

        let node = Node::from_entry(TreeEntry::file(blob, "run.sh", true), Arc::clone(&store));
        assert_eq!(node.kind(), EntryKind::File);
        assert_eq!(node.entry().name, "run.sh");
        let info = node.stat().unwrap();
        assert!(info.executable);
        assert_eq!(info.size(), Some(10));
        assert!(node.into_file().is_some());

        let node = Node::from_entry(TreeEntry::directory(Hash::ZERO, "sub"), store);
        assert!(node.stat().unwrap().is_dir());
        assert!(node.into_dir().is_some());
    }

    #[test]
    fn test_stat_entry_ignores_directory_mode() {
        let store = MemoryStore::new();
        let entry = TreeEntry::new(0o040644, EntryKind::Directory, Hash::ZERO, "odd");
        assert_eq!(stat_entry(&store, &entry).unwrap(), StatInfo::directory());
    }

    #[test]
    fn test_stat_entry_propagates_size_failure() {
        let store = MemoryStore::new();
        let entry = TreeEntry::file(Hash::ZERO, "gone", false);
        assert!(stat_entry(&store, &entry).is_err());
    }

    #[test]
    fn test_vec_byte_sink_done() {
        let mut sink: Vec<u8> = Vec::new();
        sink.write_all(b"abc").unwrap();
        ByteSink::done(&mut sink).unwrap();
        assert_eq!(sink, b"abc");
    }
}
