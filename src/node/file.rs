use std::io::{self, ErrorKind, Read, Write};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::node::ByteSink;
use crate::store::ObjectStore;
use crate::types::{StatInfo, TreeEntry};

const COPY_BUF_SIZE: usize = 64 * 1024;

/// a file-like object viewed as a read-only file
///
/// holds no state beyond its entry: every call goes back to the store.
#[derive(Debug)]
pub struct File<S> {
    entry: TreeEntry,
    store: Arc<S>,
}

impl<S: ObjectStore> File<S> {
    pub fn new(entry: TreeEntry, store: Arc<S>) -> Self {
        Self { entry, store }
    }

    pub fn entry(&self) -> &TreeEntry {
        &self.entry
    }

    pub fn hash(&self) -> &Hash {
        &self.entry.hash
    }

    pub fn stat(&self) -> Result<StatInfo> {
        let size = self.store.size_of(&self.entry.hash)?;
        Ok(StatInfo::file(size, self.entry.is_executable()))
    }

    /// stream content into `sink`, starting `start` bytes in
    ///
    /// copies `length` bytes when `length > 0`, otherwise everything up to
    /// the end. the store stream is released on every path before `done`
    /// is signalled. on error the sink may already hold a prefix of the
    /// requested range. returns the number of bytes delivered.
    pub fn read<W: ByteSink + ?Sized>(&self, start: u64, length: i64, sink: &mut W) -> Result<u64> {
        let hash = self.entry.hash;
        let mut content = self.store.open_content(&hash)?;

        if start > 0 {
            // no seeking: skip by reading
            io::copy(&mut (&mut content).take(start), &mut io::sink())
                .map_err(|source| Error::Read { hash, source })?;
        }

        let copied = if length > 0 {
            copy_to_sink(&hash, &mut (&mut content).take(length as u64), sink)?
        } else {
            copy_to_sink(&hash, &mut content, sink)?
        };

        drop(content);
        sink.done().map_err(Error::Sink)?;
        Ok(copied)
    }
}

/// copy everything from `src` into `sink`, keeping read and write failures apart
fn copy_to_sink<R, W>(hash: &Hash, src: &mut R, sink: &mut W) -> Result<u64>
where
    R: Read + ?Sized,
    W: ByteSink + ?Sized,
{
    let mut buf = vec![0u8; COPY_BUF_SIZE];
    let mut total = 0u64;
    loop {
        let n = match src.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(source) => return Err(Error::Read { hash: *hash, source }),
        };
        sink.write_all(&buf[..n]).map_err(Error::Sink)?;
        total += n as u64;
    }
    Ok(total)
}
