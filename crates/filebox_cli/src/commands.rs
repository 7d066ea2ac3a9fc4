//! Command dispatch over one loaded file system.

use crate::args::Commands;
use crate::error::CliError;
use crate::output::{format_path, format_row, write_tree};
use filebox_core::{
    core_version, format_bytes, mime_from_name, FileSystem, FileboxConfig, FsError, KvStore,
    UploadFile,
};
use log::info;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Runs one command and writes its human-readable result to `out`.
pub fn execute(
    command: &Commands,
    fs: &mut FileSystem<impl KvStore>,
    config: &FileboxConfig,
    out: &mut impl Write,
) -> Result<(), CliError> {
    match command {
        Commands::Ls { folder } => {
            for node in fs.children(folder)? {
                writeln!(out, "{}", format_row(fs, node))?;
            }
        }
        Commands::Tree { folder } => write_tree(fs, folder, out)?,
        Commands::Path { folder } => {
            let path = fs.path(folder);
            if path.is_empty() {
                return Err(FsError::NodeNotFound(folder.clone()).into());
            }
            writeln!(out, "{}", format_path(&path))?;
        }
        Commands::Mkdir { name, parent } => {
            let id = fs.create_folder(name, parent)?;
            writeln!(out, "{id}")?;
        }
        Commands::Upload {
            files,
            parent,
            mime,
        } => {
            let uploads = files
                .iter()
                .map(|path| read_upload(path, mime.as_deref()))
                .collect::<Result<Vec<_>, _>>()?;
            for id in fs.upload_files(uploads, parent)? {
                writeln!(out, "{id}")?;
            }
        }
        Commands::Download { id, out: target } => {
            let file = fs.download(id)?;
            let path = match target {
                Some(path) => path.clone(),
                None => local_file_name(&file.name)?,
            };
            std::fs::write(&path, &file.bytes).map_err(|source| CliError::File {
                path: path.clone(),
                source,
            })?;
            info!(
                "event=download module=cli status=ok node_id={} bytes={}",
                id,
                file.bytes.len()
            );
            writeln!(out, "{}", path.display())?;
        }
        Commands::Rename { id, name } => {
            let final_name = fs.rename_node(id, name)?;
            writeln!(out, "{final_name}")?;
        }
        Commands::Mv { id, parent } => {
            let final_name = fs.move_node(id, parent)?;
            writeln!(out, "{final_name}")?;
        }
        Commands::Rm { id } => {
            let removed = fs.delete_node(id)?;
            writeln!(out, "removed {removed} node(s)")?;
        }
        Commands::Usage => {
            let usage = fs.storage_usage()?;
            writeln!(out, "files:  {}", format_bytes(usage.file_bytes, 1))?;
            writeln!(
                out,
                "stored: {} of {}",
                format_bytes(usage.stored_bytes, 1),
                format_bytes(usage.quota_bytes, 1)
            )?;
        }
        Commands::Clear { yes } => {
            if !yes {
                return Err(CliError::ConfirmationRequired("clear"));
            }
            fs.clear_all()?;
            writeln!(out, "store cleared")?;
        }
        Commands::Info => print_info(config, out)?,
    }
    Ok(())
}

/// Prints version and resolved settings without touching the store.
pub fn print_info(config: &FileboxConfig, out: &mut impl Write) -> Result<(), CliError> {
    writeln!(out, "version:   {}", core_version())?;
    writeln!(out, "store:     {}", config.store_path.display())?;
    writeln!(out, "quota:     {}", format_bytes(config.quota_bytes, 1))?;
    writeln!(out, "log level: {}", config.log_level)?;
    writeln!(out, "log dir:   {}", config.log_dir.display())?;
    Ok(())
}

/// Final component of a node name, so a default download never leaves the
/// working directory.
fn local_file_name(name: &str) -> Result<PathBuf, CliError> {
    Path::new(name)
        .file_name()
        .map(PathBuf::from)
        .ok_or_else(|| CliError::NoLocalFileName(name.to_string()))
}

fn read_upload(path: &Path, mime: Option<&str>) -> Result<UploadFile, CliError> {
    let bytes = std::fs::read(path).map_err(|source| CliError::File {
        path: path.to_path_buf(),
        source,
    })?;
    let name = path
        .file_name()
        .map(|value| value.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mime_type = mime
        .map(str::to_string)
        .or_else(|| mime_from_name(&name).map(str::to_string));
    Ok(UploadFile {
        name,
        mime_type,
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::{execute, local_file_name};
    use crate::args::Commands;
    use crate::error::{CliError, EXIT_USAGE};
    use filebox_core::{
        ConfigOverrides, FileSystem, FileboxConfig, FsError, FsNode, KvStore, MemoryKvStore,
        UploadFile, ROOT_ID, STORAGE_KEY,
    };
    use std::path::PathBuf;

    fn setup() -> (FileSystem<MemoryKvStore>, FileboxConfig) {
        let config = FileboxConfig::resolve_with(ConfigOverrides::default(), |_| None).unwrap();
        (FileSystem::load(MemoryKvStore::new(1024 * 1024)), config)
    }

    fn run(
        fs: &mut FileSystem<MemoryKvStore>,
        config: &FileboxConfig,
        command: Commands,
    ) -> Result<String, CliError> {
        let mut out = Vec::new();
        execute(&command, fs, config, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn mkdir_prints_id_and_ls_lists_it() {
        let (mut fs, config) = setup();
        let printed = run(
            &mut fs,
            &config,
            Commands::Mkdir {
                name: "Docs".to_string(),
                parent: ROOT_ID.to_string(),
            },
        )
        .unwrap();
        let id = printed.trim().to_string();
        assert!(id.starts_with("folder-"));

        let listing = run(
            &mut fs,
            &config,
            Commands::Ls {
                folder: ROOT_ID.to_string(),
            },
        )
        .unwrap();
        assert!(listing.contains(&id));
        assert!(listing.contains("Folder"));
        assert!(listing.trim_end().ends_with("Docs"));
    }

    #[test]
    fn upload_reads_files_and_download_writes_them_back() {
        let (mut fs, config) = setup();
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("notes.txt");
        std::fs::write(&source, b"hello").unwrap();

        let printed = run(
            &mut fs,
            &config,
            Commands::Upload {
                files: vec![source],
                parent: ROOT_ID.to_string(),
                mime: None,
            },
        )
        .unwrap();
        let id = printed.trim().to_string();
        assert_eq!(fs.node(&id).unwrap().mime_type(), Some("text/plain"));

        let target = dir.path().join("copy.txt");
        run(
            &mut fs,
            &config,
            Commands::Download {
                id,
                out: Some(target.clone()),
            },
        )
        .unwrap();
        assert_eq!(std::fs::read(target).unwrap(), b"hello");
    }

    #[test]
    fn missing_upload_source_is_a_file_error() {
        let (mut fs, config) = setup();
        let err = run(
            &mut fs,
            &config,
            Commands::Upload {
                files: vec!["/definitely/not/here.txt".into()],
                parent: ROOT_ID.to_string(),
                mime: None,
            },
        )
        .unwrap_err();
        assert!(matches!(err, CliError::File { .. }));
        assert_eq!(fs.nodes().len(), 1);
    }

    #[test]
    fn tree_and_path_render_nested_folders() {
        let (mut fs, config) = setup();
        let docs = fs.create_folder("Docs", ROOT_ID).unwrap();
        let inner = fs.create_folder("Inner", &docs).unwrap();

        let tree = run(
            &mut fs,
            &config,
            Commands::Tree {
                folder: ROOT_ID.to_string(),
            },
        )
        .unwrap();
        assert_eq!(tree, "Root/\n  Docs/\n    Inner/\n");

        let path = run(&mut fs, &config, Commands::Path { folder: inner }).unwrap();
        assert_eq!(path, "Root / Docs / Inner\n");
    }

    #[test]
    fn clear_requires_confirmation() {
        let (mut fs, config) = setup();
        fs.create_folder("Docs", ROOT_ID).unwrap();

        let err = run(&mut fs, &config, Commands::Clear { yes: false }).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_USAGE);
        assert_eq!(fs.nodes().len(), 2);

        run(&mut fs, &config, Commands::Clear { yes: true }).unwrap();
        assert_eq!(fs.nodes().len(), 1);
    }

    #[test]
    fn rm_on_root_surfaces_service_error() {
        let (mut fs, config) = setup();
        let err = run(
            &mut fs,
            &config,
            Commands::Rm {
                id: ROOT_ID.to_string(),
            },
        )
        .unwrap_err();
        assert!(matches!(err, CliError::Fs(FsError::RootIsProtected)));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn download_default_target_keeps_only_the_final_component() {
        assert_eq!(
            local_file_name("/tmp/elsewhere/escaped.txt").unwrap(),
            PathBuf::from("escaped.txt")
        );
        assert_eq!(
            local_file_name("../../notes.txt").unwrap(),
            PathBuf::from("notes.txt")
        );
        assert!(matches!(
            local_file_name("..").unwrap_err(),
            CliError::NoLocalFileName(_)
        ));
    }

    #[test]
    fn download_without_out_rejects_names_without_a_file_component() {
        let (mut fs, config) = setup();
        let id = fs
            .upload_files(
                vec![UploadFile {
                    name: "a.txt".to_string(),
                    mime_type: None,
                    bytes: b"a".to_vec(),
                }],
                ROOT_ID,
            )
            .unwrap()
            .remove(0);
        fs.rename_node(&id, "..").unwrap();

        let err = run(&mut fs, &config, Commands::Download { id, out: None }).unwrap_err();
        assert!(matches!(err, CliError::NoLocalFileName(_)));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn tree_on_cyclic_stored_data_reports_missing_folder() {
        let (_, config) = setup();
        let mut nodes = filebox_core::initial_state();
        let mut a = FsNode::new_folder("A", ROOT_ID);
        let b = FsNode::new_folder("B", a.id.as_str());
        a.parent_id = Some(b.id.clone());
        let a_id = a.id.clone();
        nodes.insert(a_id.clone(), a);
        nodes.insert(b.id.clone(), b);

        let mut store = MemoryKvStore::new(1024 * 1024);
        store
            .set(STORAGE_KEY, &serde_json::to_string(&nodes).unwrap())
            .unwrap();
        let mut fs = FileSystem::load(store);

        let err = run(&mut fs, &config, Commands::Tree { folder: a_id }).unwrap_err();
        assert!(matches!(err, CliError::Fs(FsError::NodeNotFound(_))));

        let tree = run(
            &mut fs,
            &config,
            Commands::Tree {
                folder: ROOT_ID.to_string(),
            },
        )
        .unwrap();
        assert_eq!(tree, "Root/\n");
    }
}
