//! object store clients
//!
//! the nodes in [`crate::node`] only ever talk to the store through
//! [`ObjectStore`], so the backing implementation can be swapped freely.

mod git;
mod memory;

use std::io::Read;

use crate::error::Result;
use crate::hash::Hash;
use crate::types::TreeEntry;

pub use git::{BlobReader, GitStore};
pub use memory::MemoryStore;

/// read-only access to a content-addressed object store
pub trait ObjectStore {
    /// sequential stream over a file-like object's content
    ///
    /// dropping the stream before it is drained must release whatever
    /// backs it (handles, child processes).
    type Content: Read;

    /// byte length of the object's raw content
    fn size_of(&self, hash: &Hash) -> Result<u64>;

    /// immediate children of a directory-like object, in the store's native order
    fn list_children(&self, hash: &Hash) -> Result<Vec<TreeEntry>>;

    /// open a stream over a file-like object's content
    fn open_content(&self, hash: &Hash) -> Result<Self::Content>;
}
