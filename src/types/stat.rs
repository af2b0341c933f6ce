use serde::{Deserialize, Serialize};

/// what a node reports about itself
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatInfo {
    pub kind: StatKind,
    pub executable: bool,
    pub writable: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StatKind {
    Directory,
    File { size: u64 },
}

impl StatInfo {
    /// directories are always traversable and never writable
    pub fn directory() -> Self {
        Self {
            kind: StatKind::Directory,
            executable: true,
            writable: false,
        }
    }

    pub fn file(size: u64, executable: bool) -> Self {
        Self {
            kind: StatKind::File { size },
            executable,
            writable: false,
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self.kind, StatKind::Directory)
    }

    pub fn is_file(&self) -> bool {
        matches!(self.kind, StatKind::File { .. })
    }

    /// byte size for files, None for directories
    pub fn size(&self) -> Option<u64> {
        match self.kind {
            StatKind::File { size } => Some(size),
            StatKind::Directory => None,
        }
    }
}

/// one row of a directory listing
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirEntry {
    pub name: String,
    pub info: StatInfo,
}

impl std::fmt::Display for DirEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mode = match (self.info.is_dir(), self.info.executable) {
            (true, _) => "dr-x",
            (false, true) => "-r-x",
            (false, false) => "-r--",
        };
        match self.info.size() {
            Some(size) => write!(f, "{} {:>10} {}", mode, size, self.name),
            None => write!(f, "{} {:>10} {}/", mode, "-", self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_stat() {
        let info = StatInfo::directory();
        assert!(info.is_dir());
        assert!(info.executable);
        assert!(!info.writable);
        assert_eq!(info.size(), None);
    }

    #[test]
    fn test_file_stat() {
        let info = StatInfo::file(3327, false);
        assert!(info.is_file());
        assert!(!info.executable);
        assert!(!info.writable);
        assert_eq!(info.size(), Some(3327));
    }

    #[test]
    fn test_dir_entry_display() {
        let dir = DirEntry {
            name: "git".into(),
            info: StatInfo::directory(),
        };
        assert_eq!(dir.to_string(), "dr-x          - git/");

        let file = DirEntry {
            name: "run.sh".into(),
            info: StatInfo::file(42, true),
        };
        assert_eq!(file.to_string(), "-r-x         42 run.sh");
    }

    #[test]
    fn test_stat_serde_json() {
        let json = serde_json::to_value(StatInfo::file(7, true)).unwrap();
        assert_eq!(json["kind"]["type"], "file");
        assert_eq!(json["kind"]["size"], 7);
        assert_eq!(json["executable"], true);
        assert_eq!(json["writable"], false);
    }
}
