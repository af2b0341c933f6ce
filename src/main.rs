//! gitfs CLI - browse a git revision as a read-only filesystem

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use gitfs::{Config, DirEntry, Error, GitStore, Node, StatKind};

#[derive(Parser)]
#[command(name = "gitfs")]
#[command(about = "read-only filesystem view over a git commit tree")]
#[command(version)]
struct Cli {
    /// repository path (bare repo or .git directory)
    #[arg(short = 'C', long, env = "GIT_DIR")]
    git_dir: Option<PathBuf>,

    /// config file
    #[arg(short, long, env = "GITFS_CONFIG")]
    config: Option<PathBuf>,

    /// branch, tag or commit to browse (default from config)
    #[arg(short, long, global = true)]
    rev: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// print the root tree hash of the revision
    RevParse,

    /// list a directory, or show a single file
    Ls {
        /// path within the tree
        #[arg(default_value = "")]
        path: String,
    },

    /// show stat info for a path
    Stat {
        /// path within the tree
        path: String,
    },

    /// write file content to stdout
    Cat {
        /// path within the tree
        path: String,

        /// bytes to skip first
        #[arg(long, default_value_t = 0)]
        offset: u64,

        /// bytes to write, at least 1 (default: to the end)
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        length: Option<u64>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("error: {}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn run(cli: Cli) -> gitfs::Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let store = Arc::new(GitStore::from_config(&config, cli.git_dir.as_deref()));
    let rev = cli
        .rev
        .unwrap_or_else(|| config.browse.default_ref.clone());

    match cli.command {
        Commands::RevParse => {
            let hash = store.resolve_tree(&rev)?;
            println!("{}", hash);
        }

        Commands::Ls { path } => {
            let root = store.root(&rev)?;
            match root.walk(&path)? {
                Node::Dir(dir) => {
                    let mut listing: Vec<DirEntry> = Vec::new();
                    dir.list(&mut listing)?;
                    for entry in listing {
                        println!("{}", entry);
                    }
                }
                Node::File(file) => {
                    let entry = DirEntry {
                        name: file.entry().name.clone(),
                        info: file.stat()?,
                    };
                    println!("{}", entry);
                }
            }
        }

        Commands::Stat { path } => {
            let root = store.root(&rev)?;
            let node = root.walk(&path)?;
            let info = node.stat()?;

            println!("hash {}", node.entry().hash);
            match info.kind {
                StatKind::Directory => println!("type directory"),
                StatKind::File { size } => {
                    println!("type file");
                    println!("size {}", size);
                }
            }
            println!("executable {}", info.executable);
            println!("writable {}", info.writable);
        }

        Commands::Cat {
            path,
            offset,
            length,
        } => {
            let root = store.root(&rev)?;
            let file = root
                .walk(&path)?
                .into_file()
                .ok_or_else(|| Error::IsADirectory(path.clone()))?;

            let length = match length {
                Some(n) => i64::try_from(n).unwrap_or(i64::MAX),
                None => -1,
            };
            let mut stdout = io::stdout().lock();
            file.read(offset, length, &mut stdout)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cat_length_must_be_positive() {
        let err = Cli::try_parse_from(["gitfs", "cat", "run.sh", "--length", "0"]);
        assert!(err.is_err());

        let cli = Cli::try_parse_from(["gitfs", "cat", "run.sh", "--length", "5"]).unwrap();
        match cli.command {
            Commands::Cat { length, offset, .. } => {
                assert_eq!(length, Some(5));
                assert_eq!(offset, 0);
            }
            _ => panic!("expected cat"),
        }

        let cli = Cli::try_parse_from(["gitfs", "cat", "run.sh"]).unwrap();
        assert!(matches!(cli.command, Commands::Cat { length: None, .. }));
    }
}
