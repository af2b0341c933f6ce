mod stat;
mod tree;

pub use stat::{DirEntry, StatInfo, StatKind};
pub use tree::{
    parse_entry_record, parse_listing, parse_listing_bytes, sort_entries, validate_entry_name, EntryKind, TreeEntry,
    MODE_DIRECTORY, MODE_EXECUTABLE, MODE_EXECUTABLE_FILE, MODE_REGULAR,
};
