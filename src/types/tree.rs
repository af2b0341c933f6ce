use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::hash::Hash;

/// owner-execute bit of a unix mode
pub const MODE_EXECUTABLE: u32 = 0o100;

/// git mode for a subdirectory entry
pub const MODE_DIRECTORY: u32 = 0o040000;

/// git mode for a regular file entry
pub const MODE_REGULAR: u32 = 0o100644;

/// git mode for an executable file entry
pub const MODE_EXECUTABLE_FILE: u32 = 0o100755;

/// one child of a directory-like object
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntry {
    pub mode: u32,
    pub kind: EntryKind,
    pub hash: Hash,
    pub name: String,
}

impl TreeEntry {
    pub fn new(mode: u32, kind: EntryKind, hash: Hash, name: impl Into<String>) -> Self {
        Self {
            mode,
            kind,
            hash,
            name: name.into(),
        }
    }

    /// a subdirectory entry
    pub fn directory(hash: Hash, name: impl Into<String>) -> Self {
        Self::new(MODE_DIRECTORY, EntryKind::Directory, hash, name)
    }

    /// a file entry, executable or not
    pub fn file(hash: Hash, name: impl Into<String>, executable: bool) -> Self {
        let mode = if executable {
            MODE_EXECUTABLE_FILE
        } else {
            MODE_REGULAR
        };
        Self::new(mode, EntryKind::File, hash, name)
    }

    /// the owner-execute bit is set
    pub fn is_executable(&self) -> bool {
        self.mode & MODE_EXECUTABLE != 0
    }
}

/// the two object kinds a tree entry can point at
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Directory,
    File,
}

impl EntryKind {
    /// parse the store's kind token
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "tree" => Some(EntryKind::Directory),
            "blob" => Some(EntryKind::File),
            _ => None,
        }
    }

    /// the store's kind token
    pub fn token(&self) -> &'static str {
        match self {
            EntryKind::Directory => "tree",
            EntryKind::File => "blob",
        }
    }

    /// get the type name for display
    pub fn type_name(&self) -> &'static str {
        match self {
            EntryKind::Directory => "directory",
            EntryKind::File => "file",
        }
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, EntryKind::Directory)
    }
}

/// parse one listing record: `<octal mode> SP <kind> SP <40-hex hash> TAB <name>`
pub fn parse_entry_record(record: &str) -> Result<TreeEntry> {
    let bad = || Error::Parse {
        what: "tree entry",
        input: record.to_string(),
    };

    let (meta, name) = record.split_once('\t').ok_or_else(bad)?;
    let mut fields = meta.split(' ');
    let (mode, kind, hash) = match (fields.next(), fields.next(), fields.next(), fields.next()) {
        (Some(mode), Some(kind), Some(hash), None) => (mode, kind, hash),
        _ => return Err(bad()),
    };

    let mode = u32::from_str_radix(mode, 8).map_err(|_| bad())?;
    let hash = Hash::from_hex(hash).map_err(|_| bad())?;
    validate_entry_name(name).map_err(|_| bad())?;

    let kind = EntryKind::from_token(kind).ok_or_else(|| Error::UnsupportedKind {
        kind: kind.to_string(),
        name: name.to_string(),
    })?;

    Ok(TreeEntry::new(mode, kind, hash, name))
}

/// parse a full listing of `separator`-terminated records
///
/// a trailing empty record (from the final terminator) is dropped.
pub fn parse_listing(listing: &str, separator: char) -> Result<Vec<TreeEntry>> {
    let mut records: Vec<&str> = listing.split(separator).collect();
    if records.last() == Some(&"") {
        records.pop();
    }
    records.into_iter().map(parse_entry_record).collect()
}

/// parse a raw listing of `separator`-terminated records
///
/// every record must be valid utf-8 on its own. a name that is not is
/// rejected, never rewritten, so distinct names cannot collapse into one.
pub fn parse_listing_bytes(listing: &[u8], separator: u8) -> Result<Vec<TreeEntry>> {
    let mut records: Vec<&[u8]> = listing.split(|b| *b == separator).collect();
    if records.last().is_some_and(|r| r.is_empty()) {
        records.pop();
    }
    records
        .into_iter()
        .map(|record| {
            let record = std::str::from_utf8(record).map_err(|_| Error::Parse {
                what: "tree entry name",
                input: String::from_utf8_lossy(record).into_owned(),
            })?;
            parse_entry_record(record)
        })
        .collect()
}

/// sort entries ascending by name (byte-wise)
pub fn sort_entries(entries: &mut [TreeEntry]) {
    entries.sort_by(|a, b| a.name.as_bytes().cmp(b.name.as_bytes()));
}

/// validate an entry name
pub fn validate_entry_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::Parse {
            what: "entry name",
            input: String::new(),
        });
    }
    if name.contains('/') || name.contains('\0') {
        return Err(Error::Parse {
            what: "entry name",
            input: name.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const H1: &str = "3b18e512dba79e4c8300dd08aeb37f8e728b8dad";
    const H2: &str = "247d84d82e4ed81e73661febe5be5952bfd23d10";

    #[test]
    fn test_parse_blob_record() {
        let e = parse_entry_record(&format!("100644 blob {}\ttypes.go", H1)).unwrap();
        assert_eq!(e.mode, 0o100644);
        assert_eq!(e.kind, EntryKind::File);
        assert_eq!(e.hash.to_hex(), H1);
        assert_eq!(e.name, "types.go");
        assert!(!e.is_executable());
    }

    #[test]
    fn test_parse_tree_record() {
        let e = parse_entry_record(&format!("040000 tree {}\tgit", H2)).unwrap();
        assert_eq!(e.mode, MODE_DIRECTORY);
        assert_eq!(e.kind, EntryKind::Directory);
        assert_eq!(e.name, "git");
    }

    #[test]
    fn test_parse_executable_record() {
        let e = parse_entry_record(&format!("100755 blob {}\trun.sh", H1)).unwrap();
        assert!(e.is_executable());
    }

    #[test]
    fn test_parse_name_with_spaces() {
        let e = parse_entry_record(&format!("100644 blob {}\tmy notes.txt", H1)).unwrap();
        assert_eq!(e.name, "my notes.txt");
    }

    #[test]
    fn test_parse_rejects_malformed_records() {
        let cases = [
            String::new(),
            "garbage".to_string(),
            format!("100644 blob {}", H1),             // no tab
            format!("100648 blob {}\tx", H1),          // not octal
            format!("100644 blob {}\tx", &H1[..39]),   // short hash
            format!("100644 blob {} extra\tx", H1),    // extra field
            format!("100644 blob {}\t", H1),           // empty name
            format!("100644 blob {}\ta/b", H1),        // separator in name
        ];
        for case in &cases {
            assert!(
                matches!(parse_entry_record(case), Err(Error::Parse { .. })),
                "expected parse error for {:?}",
                case
            );
        }
    }

    #[test]
    fn test_parse_rejects_submodule_kind() {
        let err = parse_entry_record(&format!("160000 commit {}\tvendor", H1)).unwrap_err();
        assert!(matches!(
            err,
            Error::UnsupportedKind { ref kind, ref name } if kind == "commit" && name == "vendor"
        ));
    }

    #[test]
    fn test_parse_listing_strips_trailing_record() {
        let listing = format!("100644 blob {}\tb\n040000 tree {}\ta\n", H1, H2);
        let entries = parse_listing(&listing, '\n').unwrap();
        assert_eq!(entries.len(), 2);
        // native order is preserved
        assert_eq!(entries[0].name, "b");
        assert_eq!(entries[1].name, "a");

        let nul = format!("100644 blob {}\tb\0", H1);
        assert_eq!(parse_listing(&nul, '\0').unwrap().len(), 1);

        assert!(parse_listing("", '\0').unwrap().is_empty());
    }

    #[test]
    fn test_parse_listing_fails_on_any_bad_record() {
        let listing = format!("100644 blob {}\tok\nbroken\n", H1);
        assert!(matches!(
            parse_listing(&listing, '\n'),
            Err(Error::Parse { .. })
        ));
    }

    #[test]
    fn test_parse_listing_bytes() {
        let mut listing = format!("100644 blob {}\tcaf\u{e9}.md\0", H1).into_bytes();
        listing.extend_from_slice(format!("040000 tree {}\tgit\0", H2).as_bytes());
        let entries = parse_listing_bytes(&listing, 0).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "caf\u{e9}.md");
        assert_eq!(entries[1].kind, EntryKind::Directory);

        assert!(parse_listing_bytes(b"", 0).unwrap().is_empty());
    }

    #[test]
    fn test_parse_listing_bytes_rejects_non_utf8_names() {
        let mut listing = Vec::new();
        for name in [b"\xfe", b"\xff"] {
            listing.extend_from_slice(format!("100644 blob {}\t", H1).as_bytes());
            listing.extend_from_slice(name);
            listing.push(0);
        }
        match parse_listing_bytes(&listing, 0) {
            Err(Error::Parse { what, .. }) => assert_eq!(what, "tree entry name"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_sort_entries_bytewise() {
        let mut entries = vec![
            TreeEntry::file(Hash::ZERO, "types.go", false),
            TreeEntry::file(Hash::ZERO, "Zeta", false),
            TreeEntry::directory(Hash::ZERO, "git"),
            TreeEntry::file(Hash::ZERO, "a.b", false),
        ];
        sort_entries(&mut entries);
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Zeta", "a.b", "git", "types.go"]);
    }

    #[test]
    fn test_kind_tokens() {
        assert_eq!(EntryKind::from_token("tree"), Some(EntryKind::Directory));
        assert_eq!(EntryKind::from_token("blob"), Some(EntryKind::File));
        assert_eq!(EntryKind::from_token("commit"), None);
        assert_eq!(EntryKind::Directory.token(), "tree");
        assert_eq!(EntryKind::File.type_name(), "file");
    }
}
