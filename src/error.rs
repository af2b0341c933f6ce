use std::path::PathBuf;

use crate::Hash;

/// error type for gitfs operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid hash hex: {0}")]
    InvalidHash(String),

    #[error("no such file: {0}")]
    NoSuchEntry(String),

    #[error("object not found: {0}")]
    ObjectNotFound(Hash),

    #[error("revision not found: {0}")]
    RevNotFound(String),

    #[error("invalid revision: {0}")]
    InvalidRev(String),

    #[error("not a directory: {0}")]
    NotADirectory(String),

    #[error("is a directory: {0}")]
    IsADirectory(String),

    #[error("unsupported object kind {kind:?} for entry {name}")]
    UnsupportedKind { kind: String, name: String },

    #[error("cannot parse {what}: {input:?}")]
    Parse { what: &'static str, input: String },

    #[error("store command `{command}` failed ({status}): {stderr}")]
    Store {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("reading object {hash}: {source}")]
    Read {
        hash: Hash,
        #[source]
        source: std::io::Error,
    },

    #[error("writing to sink: {0}")]
    Sink(#[source] std::io::Error),

    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("config serialization error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),
}

impl Error {
    /// true for every "does not exist" outcome: a missing name, object or revision
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::NoSuchEntry(_) | Error::ObjectNotFound(_) | Error::RevNotFound(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// helper to wrap io errors with path context
pub trait IoResultExt<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|source| Error::Io {
            path: path.into(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_classification() {
        assert!(Error::NoSuchEntry("absent".into()).is_not_found());
        assert!(Error::ObjectNotFound(Hash::ZERO).is_not_found());
        assert!(Error::RevNotFound("nope".into()).is_not_found());

        let store = Error::Store {
            command: "git ls-tree".into(),
            status: "exit status: 1".into(),
            stderr: "boom".into(),
        };
        assert!(!store.is_not_found());
        assert!(!Error::Parse {
            what: "tree entry",
            input: "garbage".into()
        }
        .is_not_found());
    }

    #[test]
    fn test_with_path() {
        let res: std::io::Result<()> = Err(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        let err = res.with_path("/some/where").unwrap_err();
        match err {
            Error::Io { path, .. } => assert_eq!(path, PathBuf::from("/some/where")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
