//! File-system state manager.
//!
//! # Responsibility
//! - Own the in-memory node map and mirror it into one key of a [`KvStore`].
//! - Provide folder create, upload, download, rename, move, delete and reset.
//! - Resolve sibling name collisions on every write path.
//!
//! # Invariants
//! - Every mutation is computed on a copy; the copy replaces the live map only
//!   after it was persisted. A failed write (quota or otherwise) leaves the
//!   live map untouched.
//! - The root folder is never deleted or moved.
//! - Every live node is reachable from the root and stored under its own id.
//! - Parents of created/moved nodes exist and are folders.
//! - Log events carry ids and counts only, never names or payloads.

use crate::model::node::{
    initial_state, FsMap, FsNode, NodeBody, NodeId, DEFAULT_MIME_TYPE, ROOT_ID,
};
use crate::service::content::{decode_data_url, encode_data_url, DataUrlError};
use crate::store::{KvStore, StoreError, StoreResult};
use crate::tree;
use log::{info, warn};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store key holding the serialized node map.
pub const STORAGE_KEY: &str = "file-manager-v1";

/// Errors from file-system operations.
#[derive(Debug)]
pub enum FsError {
    /// Name is blank after trim.
    InvalidName,
    /// Target node does not exist.
    NodeNotFound(NodeId),
    /// Parent node does not exist.
    ParentNotFound(NodeId),
    /// Parent exists but is not a folder.
    ParentMustBeFolder(NodeId),
    /// Target exists but is not a file.
    NotAFile(NodeId),
    /// Operation would delete or move the root folder.
    RootIsProtected,
    /// Move would put a folder inside its own subtree.
    CycleDetected { node_id: NodeId, parent_id: NodeId },
    /// File has no stored payload.
    EmptyContent(NodeId),
    /// Stored payload cannot be decoded.
    InvalidContent { node_id: NodeId, source: DataUrlError },
    /// Store quota exhausted; the change was rolled back.
    StorageFull(StoreError),
    /// Any other store failure; the change was rolled back.
    Persist(StoreError),
    /// Node map could not be serialized.
    Serialize(serde_json::Error),
}

impl Display for FsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName => write!(f, "name must not be blank"),
            Self::NodeNotFound(id) => write!(f, "node not found: {id}"),
            Self::ParentNotFound(id) => write!(f, "parent folder not found: {id}"),
            Self::ParentMustBeFolder(id) => write!(f, "parent must be a folder: {id}"),
            Self::NotAFile(id) => write!(f, "node is not a file: {id}"),
            Self::RootIsProtected => write!(f, "the root folder cannot be deleted or moved"),
            Self::CycleDetected { node_id, parent_id } => write!(
                f,
                "cannot move {node_id} into its own subtree ({parent_id})"
            ),
            Self::EmptyContent(id) => write!(f, "file has no content: {id}"),
            Self::InvalidContent { node_id, source } => {
                write!(f, "file content is unreadable for {node_id}: {source}")
            }
            Self::StorageFull(_) => write!(
                f,
                "not enough space in local storage; delete one or more files and try again"
            ),
            Self::Persist(err) => write!(f, "failed to save changes to local storage: {err}"),
            Self::Serialize(err) => write!(f, "failed to serialize file tree: {err}"),
        }
    }
}

impl Error for FsError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidContent { source, .. } => Some(source),
            Self::StorageFull(err) => Some(err),
            Self::Persist(err) => Some(err),
            Self::Serialize(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for FsError {
    fn from(value: StoreError) -> Self {
        if value.is_quota_exceeded() {
            Self::StorageFull(value)
        } else {
            Self::Persist(value)
        }
    }
}

impl From<serde_json::Error> for FsError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value)
    }
}

/// One file handed to [`FileSystem::upload_files`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    /// Falls back to `application/octet-stream` when absent or blank.
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Payload returned by [`FileSystem::download`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Storage usage summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageUsage {
    /// Sum of file sizes in the tree.
    pub file_bytes: u64,
    /// Bytes the store accounts against its quota (serialized form).
    pub stored_bytes: u64,
    pub quota_bytes: u64,
}

/// Virtual file system backed by a key-value store.
pub struct FileSystem<S: KvStore> {
    store: S,
    nodes: FsMap,
}

impl<S: KvStore> FileSystem<S> {
    /// Loads the persisted tree, falling back to a fresh root.
    ///
    /// Nodes that cannot be reached from the root are left out of the live
    /// map. Never writes: a corrupt or missing entry is only replaced by the
    /// next successful mutation.
    pub fn load(store: S) -> Self {
        let nodes = match store.get(STORAGE_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<FsMap>(&raw) {
                Ok(nodes) if has_valid_root(&nodes) => retain_reachable(nodes),
                Ok(_) => {
                    warn!("event=fs_load module=service status=fallback reason=missing_root");
                    initial_state()
                }
                Err(err) => {
                    warn!(
                        "event=fs_load module=service status=fallback reason=invalid_json error={}",
                        err
                    );
                    initial_state()
                }
            },
            Ok(None) => initial_state(),
            Err(err) => {
                warn!(
                    "event=fs_load module=service status=fallback reason=store_error error={}",
                    err
                );
                initial_state()
            }
        };

        info!(
            "event=fs_load module=service status=ok nodes={}",
            nodes.len()
        );
        Self { store, nodes }
    }

    /// Live node map.
    pub fn nodes(&self) -> &FsMap {
        &self.nodes
    }

    pub fn node(&self, id: &str) -> Option<&FsNode> {
        self.nodes.get(id)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Consumes the manager and returns its store.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Lists direct children of a folder: folders first, then by name.
    pub fn children(&self, parent_id: &str) -> Result<Vec<&FsNode>, FsError> {
        self.ensure_parent_is_folder(parent_id)?;
        Ok(tree::children(&self.nodes, parent_id))
    }

    /// Breadcrumb path from root to `folder_id`; empty for non-folders.
    pub fn path(&self, folder_id: &str) -> Vec<&FsNode> {
        tree::path(&self.nodes, folder_id)
    }

    /// File size or folder subtree total.
    pub fn node_size(&self, id: &str) -> Result<u64, FsError> {
        let node = self.require_node(id)?;
        Ok(tree::node_size(&self.nodes, node))
    }

    /// Sum of all file sizes.
    pub fn used_bytes(&self) -> u64 {
        tree::used_bytes(&self.nodes)
    }

    pub fn storage_usage(&self) -> StoreResult<StorageUsage> {
        Ok(StorageUsage {
            file_bytes: self.used_bytes(),
            stored_bytes: self.store.usage_bytes()?,
            quota_bytes: self.store.quota_bytes(),
        })
    }

    /// Creates a folder and returns its id.
    pub fn create_folder(&mut self, name: &str, parent_id: &str) -> Result<NodeId, FsError> {
        let trimmed = normalize_name(name)?;
        self.ensure_parent_is_folder(parent_id)?;

        self.apply_update("create_folder", |next| {
            let unique = tree::unique_name(next, parent_id, trimmed, None);
            let folder = FsNode::new_folder(unique, parent_id);
            let id = folder.id.clone();
            next.insert(id.clone(), folder);
            Ok(id)
        })
    }

    /// Renames a node and returns the final (collision-free) name.
    pub fn rename_node(&mut self, id: &str, new_name: &str) -> Result<String, FsError> {
        let trimmed = normalize_name(new_name)?;
        let node = self.require_node(id)?;
        // The root has no parent; its name is checked against its own children.
        let siblings_of = node.parent_id.as_deref().unwrap_or(ROOT_ID);
        let unique = tree::unique_name(&self.nodes, siblings_of, trimmed, Some(id));
        if unique == node.name {
            return Ok(unique);
        }

        self.apply_update("rename_node", |next| {
            if let Some(target) = next.get_mut(id) {
                target.name = unique.clone();
            }
            Ok(unique)
        })
    }

    /// Deletes a node with its whole subtree. Returns the removed node count.
    pub fn delete_node(&mut self, id: &str) -> Result<usize, FsError> {
        if self.require_node(id)?.is_root() {
            return Err(FsError::RootIsProtected);
        }

        self.apply_update("delete_node", |next| Ok(tree::remove_subtree(next, id)))
    }

    /// Adds files under a folder in one update and returns their ids in
    /// input order.
    ///
    /// Names are resolved one after another, so duplicates inside the batch
    /// get suffixes too. Either every file lands or none does.
    pub fn upload_files(
        &mut self,
        files: Vec<UploadFile>,
        parent_id: &str,
    ) -> Result<Vec<NodeId>, FsError> {
        if files.is_empty() {
            return Ok(Vec::new());
        }
        self.ensure_parent_is_folder(parent_id)?;
        for file in &files {
            normalize_name(&file.name)?;
        }

        self.apply_update("upload_files", |next| {
            let mut ids = Vec::with_capacity(files.len());
            for file in files {
                let mime_type = file
                    .mime_type
                    .as_deref()
                    .map(str::trim)
                    .filter(|value| !value.is_empty())
                    .unwrap_or(DEFAULT_MIME_TYPE)
                    .to_string();
                let content = encode_data_url(&mime_type, &file.bytes);
                let unique = tree::unique_name(next, parent_id, &file.name, None);
                let node = FsNode::new_file(
                    unique,
                    parent_id,
                    file.bytes.len() as u64,
                    mime_type,
                    content,
                );
                ids.push(node.id.clone());
                next.insert(node.id.clone(), node);
            }
            Ok(ids)
        })
    }

    /// Decodes a file's payload.
    pub fn download(&self, id: &str) -> Result<DownloadedFile, FsError> {
        let node = self.require_node(id)?;
        let (mime_type, content) = match &node.body {
            NodeBody::File {
                mime_type, content, ..
            } => (mime_type, content),
            NodeBody::Folder => return Err(FsError::NotAFile(id.to_string())),
        };
        if content.is_empty() {
            return Err(FsError::EmptyContent(id.to_string()));
        }

        let decoded = decode_data_url(content).map_err(|source| FsError::InvalidContent {
            node_id: id.to_string(),
            source,
        })?;
        Ok(DownloadedFile {
            name: node.name.clone(),
            mime_type: mime_type.clone(),
            bytes: decoded.bytes,
        })
    }

    /// Moves a node under another folder and returns its final name.
    pub fn move_node(&mut self, id: &str, new_parent_id: &str) -> Result<String, FsError> {
        let node = self.require_node(id)?;
        if node.is_root() {
            return Err(FsError::RootIsProtected);
        }
        self.ensure_parent_is_folder(new_parent_id)?;
        if tree::is_descendant(&self.nodes, new_parent_id, id) {
            return Err(FsError::CycleDetected {
                node_id: id.to_string(),
                parent_id: new_parent_id.to_string(),
            });
        }
        if node.parent_id.as_deref() == Some(new_parent_id) {
            return Ok(node.name.clone());
        }

        let unique = tree::unique_name(&self.nodes, new_parent_id, &node.name, Some(id));
        self.apply_update("move_node", |next| {
            if let Some(target) = next.get_mut(id) {
                target.parent_id = Some(new_parent_id.to_string());
                target.name = unique.clone();
            }
            Ok(unique)
        })
    }

    /// Resets the store to a lone root folder.
    pub fn clear_all(&mut self) -> Result<(), FsError> {
        self.persist("clear_all", initial_state())
    }

    /// Applies `update` to a copy of the live map and persists it.
    ///
    /// The live map is replaced only when the store accepted the write.
    fn apply_update<T>(
        &mut self,
        op: &'static str,
        update: impl FnOnce(&mut FsMap) -> Result<T, FsError>,
    ) -> Result<T, FsError> {
        let mut next = self.nodes.clone();
        let output = update(&mut next)?;
        self.persist(op, next)?;
        Ok(output)
    }

    fn persist(&mut self, op: &'static str, next: FsMap) -> Result<(), FsError> {
        let raw = serde_json::to_string(&next)?;
        match self.store.set(STORAGE_KEY, &raw) {
            Ok(()) => {
                info!(
                    "event=fs_update module=service op={} status=ok nodes={} bytes={}",
                    op,
                    next.len(),
                    raw.len()
                );
                self.nodes = next;
                Ok(())
            }
            Err(err) => {
                let error_code = if err.is_quota_exceeded() {
                    "quota_exceeded"
                } else {
                    "persist_failed"
                };
                warn!(
                    "event=fs_update module=service op={} status=rollback error_code={} error={}",
                    op, error_code, err
                );
                Err(err.into())
            }
        }
    }

    fn require_node(&self, id: &str) -> Result<&FsNode, FsError> {
        self.nodes
            .get(id)
            .ok_or_else(|| FsError::NodeNotFound(id.to_string()))
    }

    fn ensure_parent_is_folder(&self, parent_id: &str) -> Result<(), FsError> {
        let parent = self
            .nodes
            .get(parent_id)
            .ok_or_else(|| FsError::ParentNotFound(parent_id.to_string()))?;
        if !parent.is_folder() {
            return Err(FsError::ParentMustBeFolder(parent_id.to_string()));
        }
        Ok(())
    }
}

fn normalize_name(value: &str) -> Result<&str, FsError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FsError::InvalidName);
    }
    Ok(trimmed)
}

fn has_valid_root(nodes: &FsMap) -> bool {
    nodes
        .get(ROOT_ID)
        .is_some_and(|root| root.is_folder() && root.is_root() && root.parent_id.is_none())
}

/// Drops entries whose key disagrees with their id, plus every node that
/// cannot be reached from the root through parent links (orphans, cycles,
/// extra parentless nodes).
fn retain_reachable(mut nodes: FsMap) -> FsMap {
    let total = nodes.len();
    nodes.retain(|key, node| *key == node.id);
    let reachable = tree::subtree_ids(&nodes, ROOT_ID)
        .into_iter()
        .collect::<HashSet<_>>();
    nodes.retain(|id, _| reachable.contains(id));

    let dropped = total - nodes.len();
    if dropped > 0 {
        warn!(
            "event=fs_load module=service status=repaired reason=unreachable_nodes dropped={}",
            dropped
        );
    }
    nodes
}
