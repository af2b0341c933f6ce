use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::types::TreeEntry;
use crate::Error;

/// length of an object id in bytes
pub const HASH_LEN: usize = 20;

/// length of an object id in hex characters
pub const HASH_HEX_LEN: usize = HASH_LEN * 2;

/// SHA-1 object id used for content addressing
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hash([u8; HASH_LEN]);

impl Hash {
    /// zero hash (useful as sentinel)
    pub const ZERO: Hash = Hash([0u8; HASH_LEN]);

    /// create from raw bytes
    pub fn from_bytes(bytes: [u8; HASH_LEN]) -> Self {
        Self(bytes)
    }

    /// parse from hex string, which must be exactly 40 hex characters
    pub fn from_hex(s: &str) -> crate::Result<Self> {
        if s.len() != HASH_HEX_LEN {
            return Err(Error::InvalidHash(s.to_string()));
        }
        let mut arr = [0u8; HASH_LEN];
        hex::decode_to_slice(s, &mut arr).map_err(|_| Error::InvalidHash(s.to_string()))?;
        Ok(Self(arr))
    }

    /// get raw bytes
    pub fn as_bytes(&self) -> &[u8; HASH_LEN] {
        &self.0
    }

    /// convert to lowercase hex string
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", &self.to_hex()[..12])
    }
}

impl FromStr for Hash {
    type Err = Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        Self::from_hex(s)
    }
}

impl Serialize for Hash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Hash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// compute the git object id of a blob
///
/// format: "blob " | decimal length | NUL | content
pub fn blob_id(content: &[u8]) -> Hash {
    object_id("blob", content)
}

/// compute the git object id of a tree with the given entries
///
/// entries are written in git tree order, where a directory name compares
/// as if it ended in '/'. each entry is:
///   mode: octal ascii, no leading zeros
///   space
///   name: bytes
///   NUL
///   hash: 20 raw bytes
pub fn tree_id(entries: &[TreeEntry]) -> Hash {
    let mut sorted: Vec<_> = entries.iter().collect();
    sorted.sort_by(|a, b| git_tree_order(a, b));

    let mut payload = Vec::new();
    for entry in sorted {
        payload.extend_from_slice(format!("{:o} ", entry.mode).as_bytes());
        payload.extend_from_slice(entry.name.as_bytes());
        payload.push(0);
        payload.extend_from_slice(entry.hash.as_bytes());
    }

    object_id("tree", &payload)
}

fn object_id(kind: &str, payload: &[u8]) -> Hash {
    let mut hasher = Sha1::new();
    hasher.update(format!("{} {}\0", kind, payload.len()).as_bytes());
    hasher.update(payload);
    Hash(hasher.finalize().into())
}

fn git_tree_order(a: &TreeEntry, b: &TreeEntry) -> Ordering {
    let key = |e: &TreeEntry| {
        let mut k = e.name.as_bytes().to_vec();
        if e.kind.is_directory() {
            k.push(b'/');
        }
        k
    };
    key(a).cmp(&key(b))
}
