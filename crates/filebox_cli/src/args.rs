//! Command-line argument definitions.

use clap::{Parser, Subcommand, ValueHint};
use filebox_core::{ConfigOverrides, ROOT_ID};
use std::path::PathBuf;

/// Virtual file manager persisted in a local key-value store
#[derive(Parser, Debug)]
#[command(name = "filebox")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Store file (env: FILEBOX_STORE_PATH)
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub store: Option<PathBuf>,

    /// Storage quota in bytes (env: FILEBOX_QUOTA_BYTES)
    #[arg(long, global = true)]
    pub quota: Option<u64>,

    /// Log level: trace|debug|info|warn|error (env: FILEBOX_LOG_LEVEL)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Absolute log directory (env: FILEBOX_LOG_DIR)
    #[arg(long, global = true, value_hint = ValueHint::DirPath)]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            store_path: self.store.clone(),
            quota_bytes: self.quota,
            log_level: self.log_level.clone(),
            log_dir: self.log_dir.clone(),
        }
    }
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// List a folder: folders first, then files
    Ls {
        #[arg(default_value = ROOT_ID)]
        folder: String,
    },

    /// Print a folder and everything below it
    Tree {
        #[arg(default_value = ROOT_ID)]
        folder: String,
    },

    /// Print the breadcrumb path of a folder
    Path { folder: String },

    /// Create a folder
    Mkdir {
        name: String,
        /// Parent folder id
        #[arg(short, long, default_value = ROOT_ID)]
        parent: String,
    },

    /// Upload local files into a folder
    Upload {
        #[arg(required = true, value_hint = ValueHint::FilePath)]
        files: Vec<PathBuf>,
        /// Target folder id
        #[arg(short, long, default_value = ROOT_ID)]
        parent: String,
        /// Mime type for every file (guessed from the name otherwise)
        #[arg(long)]
        mime: Option<String>,
    },

    /// Write a stored file to disk
    Download {
        id: String,
        /// Output path (default: the file's name in the current directory)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        out: Option<PathBuf>,
    },

    /// Rename a file or folder
    Rename { id: String, name: String },

    /// Move a file or folder into another folder
    Mv { id: String, parent: String },

    /// Delete a file or folder with everything below it
    Rm { id: String },

    /// Show storage usage
    Usage,

    /// Reset the store to an empty root folder
    Clear {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },

    /// Show version and resolved settings
    Info,
}

#[cfg(test)]
mod tests {
    use super::{Cli, Commands};
    use clap::{CommandFactory, Parser};
    use std::path::PathBuf;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn ls_defaults_to_root() {
        let cli = Cli::try_parse_from(["filebox", "ls"]).unwrap();
        assert_eq!(
            cli.command,
            Commands::Ls {
                folder: "root".to_string()
            }
        );
    }

    #[test]
    fn global_flags_map_to_overrides() {
        let cli = Cli::try_parse_from([
            "filebox",
            "mkdir",
            "Docs",
            "--store",
            "/tmp/box.sqlite3",
            "--quota",
            "4096",
        ])
        .unwrap();
        let overrides = cli.overrides();
        assert_eq!(overrides.store_path, Some(PathBuf::from("/tmp/box.sqlite3")));
        assert_eq!(overrides.quota_bytes, Some(4096));
        assert_eq!(overrides.log_level, None);
    }

    #[test]
    fn upload_requires_files() {
        assert!(Cli::try_parse_from(["filebox", "upload"]).is_err());
        let cli = Cli::try_parse_from(["filebox", "upload", "a.txt", "b.png", "-p", "folder-1"])
            .unwrap();
        match cli.command {
            Commands::Upload { files, parent, mime } => {
                assert_eq!(files.len(), 2);
                assert_eq!(parent, "folder-1");
                assert_eq!(mime, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
