//! File-tree node model.
//!
//! # Responsibility
//! - Define folder/file nodes and the flat id-keyed map that holds them.
//! - Provide constructors that assign ids and creation timestamps.
//!
//! # Invariants
//! - The root folder has id [`ROOT_ID`] and is the only node without parent.
//! - Generated ids are never reused (`folder-<uuid>` / `file-<uuid>`).
//! - `File.size` is the byte length of the decoded payload.
//!
//! # See also
//! - `tree` module for helpers over [`FsMap`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use time::OffsetDateTime;
use uuid::Uuid;

/// Id of the fixed root folder.
pub const ROOT_ID: &str = "root";
/// Display name given to the root folder on a fresh store.
pub const ROOT_NAME: &str = "Root";
/// Mime type used when an upload carries none.
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Stable node identifier.
///
/// Kept as `String` because the root id is a fixed word, not a uuid.
pub type NodeId = String;

/// Flat node map keyed by id. Ordered so serialized state is deterministic.
pub type FsMap = BTreeMap<NodeId, FsNode>;

/// Node discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Container node.
    Folder,
    /// Leaf node carrying a payload.
    File,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Folder => "folder",
            Self::File => "file",
        }
    }
}

/// Kind-specific node data.
///
/// Serialized with a `type` tag so it flattens into the node object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodeBody {
    Folder,
    File {
        /// Payload size in bytes.
        size: u64,
        #[serde(rename = "mimeType")]
        mime_type: String,
        /// `data:<mime>;base64,<payload>` string.
        content: String,
    },
}

/// One folder or file in the virtual tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FsNode {
    pub id: NodeId,
    /// User-facing name, unique among siblings.
    pub name: String,
    /// `None` only for the root folder.
    pub parent_id: Option<NodeId>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(flatten)]
    pub body: NodeBody,
}

impl FsNode {
    /// Creates the root folder.
    pub fn root() -> Self {
        Self {
            id: ROOT_ID.to_string(),
            name: ROOT_NAME.to_string(),
            parent_id: None,
            created_at: OffsetDateTime::now_utc(),
            body: NodeBody::Folder,
        }
    }

    /// Creates a folder with a generated id.
    pub fn new_folder(name: impl Into<String>, parent_id: impl Into<NodeId>) -> Self {
        Self {
            id: generate_id(NodeKind::Folder),
            name: name.into(),
            parent_id: Some(parent_id.into()),
            created_at: OffsetDateTime::now_utc(),
            body: NodeBody::Folder,
        }
    }

    /// Creates a file with a generated id.
    pub fn new_file(
        name: impl Into<String>,
        parent_id: impl Into<NodeId>,
        size: u64,
        mime_type: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: generate_id(NodeKind::File),
            name: name.into(),
            parent_id: Some(parent_id.into()),
            created_at: OffsetDateTime::now_utc(),
            body: NodeBody::File {
                size,
                mime_type: mime_type.into(),
                content: content.into(),
            },
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self.body {
            NodeBody::Folder => NodeKind::Folder,
            NodeBody::File { .. } => NodeKind::File,
        }
    }

    pub fn is_folder(&self) -> bool {
        self.kind() == NodeKind::Folder
    }

    pub fn is_file(&self) -> bool {
        self.kind() == NodeKind::File
    }

    /// True only for the folder stored under [`ROOT_ID`].
    pub fn is_root(&self) -> bool {
        self.id == ROOT_ID
    }

    /// Returns payload size for files, `None` for folders.
    pub fn file_size(&self) -> Option<u64> {
        match &self.body {
            NodeBody::File { size, .. } => Some(*size),
            NodeBody::Folder => None,
        }
    }

    /// Returns mime type for files, `None` for folders.
    pub fn mime_type(&self) -> Option<&str> {
        match &self.body {
            NodeBody::File { mime_type, .. } => Some(mime_type.as_str()),
            NodeBody::Folder => None,
        }
    }
}

/// Returns a fresh map holding only the root folder.
pub fn initial_state() -> FsMap {
    let root = FsNode::root();
    let mut nodes = FsMap::new();
    nodes.insert(root.id.clone(), root);
    nodes
}

fn generate_id(kind: NodeKind) -> NodeId {
    format!("{}-{}", kind.as_str(), Uuid::new_v4())
}

#[cfg(test)]
mod tests {
    use super::{initial_state, FsNode, NodeBody, NodeKind, ROOT_ID};

    #[test]
    fn initial_state_contains_only_root() {
        let nodes = initial_state();
        assert_eq!(nodes.len(), 1);
        let root = &nodes[ROOT_ID];
        assert!(root.is_root());
        assert!(root.is_folder());
        assert_eq!(root.name, "Root");
    }

    #[test]
    fn generated_ids_carry_kind_prefix() {
        let folder = FsNode::new_folder("Docs", ROOT_ID);
        let file = FsNode::new_file("a.txt", ROOT_ID, 3, "text/plain", "data:text/plain;base64,YWJj");
        assert!(folder.id.starts_with("folder-"));
        assert!(file.id.starts_with("file-"));
        assert_ne!(folder.id, FsNode::new_folder("Docs", ROOT_ID).id);
        assert_eq!(file.kind(), NodeKind::File);
        assert_eq!(file.file_size(), Some(3));
        assert_eq!(folder.file_size(), None);
    }

    #[test]
    fn serializes_flat_camel_case_shape() {
        let file = FsNode::new_file("a.txt", ROOT_ID, 3, "text/plain", "data:text/plain;base64,YWJj");
        let value = serde_json::to_value(&file).unwrap();
        assert_eq!(value["type"], "file");
        assert_eq!(value["parentId"], "root");
        assert_eq!(value["mimeType"], "text/plain");
        assert_eq!(value["size"], 3);
        assert!(value["createdAt"].is_string());

        let root = serde_json::to_value(FsNode::root()).unwrap();
        assert_eq!(root["type"], "folder");
        assert!(root["parentId"].is_null());
    }

    #[test]
    fn deserializes_browser_style_timestamps() {
        let raw = r#"{
            "id": "file-1",
            "name": "photo.png",
            "type": "file",
            "parentId": "root",
            "createdAt": "2024-05-01T10:20:30.123Z",
            "size": 10,
            "mimeType": "image/png",
            "content": "data:image/png;base64,AAAA"
        }"#;
        let node: FsNode = serde_json::from_str(raw).unwrap();
        assert_eq!(node.created_at.year(), 2024);
        assert!(matches!(node.body, NodeBody::File { size: 10, .. }));
    }
}
