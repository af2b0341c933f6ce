//! object store backed by the `git` executable
//!
//! every operation is one short-lived `git` process, similar to how
//! plumbing scripts drive a repository.

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};
use std::sync::Arc;

use tracing::debug;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::node::Dir;
use crate::store::ObjectStore;
use crate::types::{parse_listing_bytes, EntryKind, TreeEntry};

/// a git repository accessed through the `git` command
#[derive(Clone, Debug)]
pub struct GitStore {
    program: PathBuf,
    git_dir: PathBuf,
}

impl GitStore {
    /// store over the repository at `git_dir` (a bare repo or a `.git` directory)
    pub fn new(git_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: PathBuf::from("git"),
            git_dir: git_dir.into(),
        }
    }

    /// store using the configured program; `git_dir` overrides the configured one
    pub fn from_config(config: &Config, git_dir: Option<&Path>) -> Self {
        let git_dir = git_dir
            .map(Path::to_path_buf)
            .or_else(|| config.git.git_dir.clone())
            .unwrap_or_else(|| PathBuf::from(".git"));
        Self::new(git_dir).with_program(config.git.program.clone())
    }

    /// use a different `git` executable
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// repository path
    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    /// resolve a branch, tag, commit or tree name to the hash of its root tree
    pub fn resolve_tree(&self, rev: &str) -> Result<Hash> {
        if rev.is_empty() || rev.starts_with('-') || rev.contains(char::is_whitespace) {
            return Err(Error::InvalidRev(rev.to_string()));
        }

        let target = format!("{}^{{tree}}", rev);
        let out = self
            .run(&["rev-parse", "--verify", "--quiet", &target], None)
            .map_err(|e| match e {
                // --quiet exits 1 with no output for unknown names
                Error::Store { ref stderr, .. } if stderr.is_empty() => {
                    Error::RevNotFound(rev.to_string())
                }
                other => other,
            })?;

        let text = String::from_utf8_lossy(&out);
        let line = text.trim();
        Hash::from_hex(line).map_err(|_| Error::Parse {
            what: "rev-parse output",
            input: line.to_string(),
        })
    }

    /// root directory node for a revision
    pub fn root(self: &Arc<Self>, rev: &str) -> Result<Dir<GitStore>> {
        let hash = self.resolve_tree(rev)?;
        Ok(Dir::root(Arc::clone(self), hash))
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg(format!("--git-dir={}", self.git_dir.display()));
        cmd.args(args);
        cmd
    }

    fn describe(&self, args: &[&str]) -> String {
        format!("{} {}", self.program.display(), args.join(" "))
    }

    /// run git to completion, returning stdout
    fn run(&self, args: &[&str], input: Option<&[u8]>) -> Result<Vec<u8>> {
        let command = self.describe(args);
        debug!(git_dir = %self.git_dir.display(), %command, "spawning git");

        let mut cmd = self.command(args);
        cmd.stdin(if input.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        });
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|e| spawn_error(&command, e))?;

        if let Some(input) = input {
            if let Some(mut stdin) = child.stdin.take() {
                if let Err(e) = stdin.write_all(input) {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(spawn_error(&command, e));
                }
            }
        }

        let output = child
            .wait_with_output()
            .map_err(|e| spawn_error(&command, e))?;

        if !output.status.success() {
            return Err(Error::Store {
                command,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(output.stdout)
    }

    /// kind token and size of an object, via `cat-file --batch-check`
    fn object_info(&self, hash: &Hash) -> Result<(String, u64)> {
        let input = format!("{}\n", hash);
        let out = self.run(&["cat-file", "--batch-check"], Some(input.as_bytes()))?;
        let text = String::from_utf8_lossy(&out);
        let line = text.trim_end_matches('\n');

        let bad = || Error::Parse {
            what: "cat-file --batch-check output",
            input: line.to_string(),
        };

        let fields: Vec<&str> = line.split(' ').collect();
        match fields.as_slice() {
            [_, "missing"] => Err(Error::ObjectNotFound(*hash)),
            [_, kind, size] => {
                let size = size.parse::<u64>().map_err(|_| bad())?;
                Ok((kind.to_string(), size))
            }
            _ => Err(bad()),
        }
    }
}

impl ObjectStore for GitStore {
    type Content = BlobReader;

    fn size_of(&self, hash: &Hash) -> Result<u64> {
        let (_, size) = self.object_info(hash)?;
        Ok(size)
    }

    fn list_children(&self, hash: &Hash) -> Result<Vec<TreeEntry>> {
        let hex = hash.to_hex();
        let out = self
            .run(&["ls-tree", "-z", &hex], None)
            .map_err(|e| match e {
                Error::Store { ref stderr, .. } if is_missing_object(stderr) => {
                    Error::ObjectNotFound(*hash)
                }
                other => other,
            })?;

        // -z keeps names unquoted
        parse_listing_bytes(&out, b'\0')
    }

    fn open_content(&self, hash: &Hash) -> Result<BlobReader> {
        let (kind, _) = self.object_info(hash)?;
        if EntryKind::from_token(&kind) != Some(EntryKind::File) {
            return Err(Error::UnsupportedKind {
                kind,
                name: hash.to_hex(),
            });
        }

        let hex = hash.to_hex();
        let args = ["cat-file", "blob", hex.as_str()];
        let command = self.describe(&args);
        debug!(git_dir = %self.git_dir.display(), %command, "spawning git");

        let mut child = self
            .command(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| spawn_error(&command, e))?;

        let stdout = match child.stdout.take() {
            Some(stdout) => stdout,
            None => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(spawn_error(
                    &command,
                    io::Error::new(io::ErrorKind::BrokenPipe, "stdout not available"),
                ));
            }
        };

        Ok(BlobReader {
            hash: *hash,
            child: Some(child),
            stdout: Some(stdout),
        })
    }
}

/// content stream backed by a `git cat-file` child process
///
/// reading to EOF reaps the child and turns a failed exit into a read
/// error. dropping the reader early kills and reaps the child.
#[derive(Debug)]
pub struct BlobReader {
    hash: Hash,
    child: Option<Child>,
    stdout: Option<ChildStdout>,
}

impl BlobReader {
    /// the blob being streamed
    pub fn hash(&self) -> &Hash {
        &self.hash
    }

    /// pid of the `cat-file` child, until it has been reaped
    pub fn process_id(&self) -> Option<u32> {
        self.child.as_ref().map(Child::id)
    }

    /// stop streaming and reap the child, whether or not it finished
    pub fn release(mut self) -> Result<()> {
        self.stdout = None;
        if let Some(mut child) = self.child.take() {
            debug!(hash = %self.hash, "killing unfinished cat-file");
            let _ = child.kill();
            child.wait().map_err(|source| Error::Read {
                hash: self.hash,
                source,
            })?;
        }
        Ok(())
    }

    /// wait for the finished child and check how it exited
    fn reap(&mut self) -> io::Result<()> {
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };

        let mut stderr = String::new();
        if let Some(mut pipe) = child.stderr.take() {
            let _ = pipe.read_to_string(&mut stderr);
        }

        let status = child.wait()?;
        if !status.success() {
            return Err(io::Error::other(format!(
                "git cat-file {} exited with {}: {}",
                self.hash,
                status,
                stderr.trim()
            )));
        }
        Ok(())
    }
}

impl Read for BlobReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let Some(stdout) = self.stdout.as_mut() else {
            return Ok(0);
        };

        let n = stdout.read(buf)?;
        if n == 0 && !buf.is_empty() {
            self.stdout = None;
            self.reap()?;
        }
        Ok(n)
    }
}

impl Drop for BlobReader {
    fn drop(&mut self) {
        self.stdout = None;
        if let Some(mut child) = self.child.take() {
            debug!(hash = %self.hash, "killing unfinished cat-file");
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

fn spawn_error(command: &str, e: io::Error) -> Error {
    Error::Store {
        command: command.to_string(),
        status: "not run".to_string(),
        stderr: e.to_string(),
    }
}

fn is_missing_object(stderr: &str) -> bool {
    let stderr = stderr.to_ascii_lowercase();
    stderr.contains("not a tree object")
        || stderr.contains("not a valid object name")
        || stderr.contains("bad object")
}
