//! gitfs - read-only filesystem view over a git commit tree
//!
//! exposes one immutable snapshot of a content-addressed object store as
//! directories and files that can be stat-ed, listed, looked up by name and
//! streamed, without ever writing to the store.
//!
//! # Core concepts
//!
//! - **Hash**: a 20-byte object id, written as 40 lowercase hex characters
//! - **TreeEntry**: one child of a tree: mode, kind, hash, name
//! - **ObjectStore**: the three reads the view needs from a store
//!   (size, tree listing, blob content)
//! - **Dir** / **File**: nodes wrapping a tree or a blob
//!
//! # Example usage
//!
//! ```no_run
//! use gitfs::{DirEntry, GitStore, Node};
//! use std::sync::Arc;
//!
//! let store = Arc::new(GitStore::new("/path/to/repo.git"));
//! let root = store.root("master").unwrap();
//!
//! // list the top-level directory
//! let mut listing: Vec<DirEntry> = Vec::new();
//! root.list(&mut listing).unwrap();
//!
//! // stream a file to stdout
//! if let Node::File(file) = root.walk("src/main.rs").unwrap() {
//!     file.read(0, -1, &mut std::io::stdout().lock()).unwrap();
//! }
//! ```

mod config;
mod error;
mod hash;

pub mod node;
pub mod store;
pub mod types;

pub use config::{BrowseConfig, Config, GitConfig};
pub use error::{Error, IoResultExt, Result};
pub use hash::{blob_id, tree_id, Hash, HASH_HEX_LEN, HASH_LEN};
pub use node::{ByteSink, Dir, EntrySink, File, Node};
pub use store::{BlobReader, GitStore, MemoryStore, ObjectStore};
pub use types::{DirEntry, EntryKind, StatInfo, StatKind, TreeEntry};
