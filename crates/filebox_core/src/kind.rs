//! File classification and human-readable sizes.
//!
//! # Responsibility
//! - Classify nodes into coarse kinds from mime type and file name.
//! - Guess a mime type from a file name for uploads without one.
//! - Format byte counts for storage usage display.

use crate::model::node::FsNode;
use once_cell::sync::Lazy;
use regex::Regex;

static IMAGE_EXT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.(png|jpe?g|gif|webp|svg)$").expect("valid image regex"));
static VIDEO_EXT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.(mp4|webm|mov|avi)$").expect("valid video regex"));
static AUDIO_EXT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.(mp3|wav|ogg|flac)$").expect("valid audio regex"));
static TEXT_EXT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\.(txt|md|csv|log|json|yaml|yml|xml|html|css|js|ts|tsx)$")
        .expect("valid text regex")
});
static ARCHIVE_EXT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.(zip|rar|7z|tar|gz|bz2)$").expect("valid archive regex"));

const BYTE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Coarse node category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    Folder,
    Image,
    Video,
    Audio,
    Pdf,
    Text,
    Archive,
    Other,
}

impl FileKind {
    /// Human label for listings.
    pub fn label(self) -> &'static str {
        match self {
            Self::Folder => "Folder",
            Self::Image => "Image",
            Self::Video => "Video",
            Self::Audio => "Audio",
            Self::Pdf => "PDF document",
            Self::Text => "Text file",
            Self::Archive => "Archive",
            Self::Other => "File",
        }
    }
}

/// Classifies a node. Mime type wins over extension within each category;
/// categories are checked in a fixed order.
pub fn detect_file_kind(node: &FsNode) -> FileKind {
    let Some(mime) = node.mime_type() else {
        return FileKind::Folder;
    };
    let name = node.name.to_lowercase();

    if mime.starts_with("image/") || IMAGE_EXT_RE.is_match(&name) {
        return FileKind::Image;
    }
    if mime.starts_with("video/") || VIDEO_EXT_RE.is_match(&name) {
        return FileKind::Video;
    }
    if mime.starts_with("audio/") || AUDIO_EXT_RE.is_match(&name) {
        return FileKind::Audio;
    }
    if mime == "application/pdf" || name.ends_with(".pdf") {
        return FileKind::Pdf;
    }
    if mime.starts_with("text/") || TEXT_EXT_RE.is_match(&name) {
        return FileKind::Text;
    }
    if ARCHIVE_EXT_RE.is_match(&name)
        || mime == "application/zip"
        || mime == "application/x-7z-compressed"
    {
        return FileKind::Archive;
    }
    FileKind::Other
}

/// Guesses a mime type from the file extension.
pub fn mime_from_name(name: &str) -> Option<&'static str> {
    let (_, ext) = name.rsplit_once('.')?;
    let mime = match ext.to_ascii_lowercase().as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" => "audio/ogg",
        "flac" => "audio/flac",
        "pdf" => "application/pdf",
        "txt" | "log" => "text/plain",
        "md" => "text/markdown",
        "csv" => "text/csv",
        "html" => "text/html",
        "css" => "text/css",
        "js" => "text/javascript",
        "json" => "application/json",
        "xml" => "application/xml",
        "yaml" | "yml" => "application/yaml",
        "zip" => "application/zip",
        "7z" => "application/x-7z-compressed",
        "tar" => "application/x-tar",
        "gz" => "application/gzip",
        _ => return None,
    };
    Some(mime)
}

/// Formats a byte count with binary units, e.g. `1536 -> "1.5 KB"`.
pub fn format_bytes(bytes: u64, fraction_digits: usize) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut value = bytes as f64;
    let mut unit_index = 0;
    while value >= 1024.0 && unit_index < BYTE_UNITS.len() - 1 {
        value /= 1024.0;
        unit_index += 1;
    }

    format!("{value:.fraction_digits$} {}", BYTE_UNITS[unit_index])
}

#[cfg(test)]
mod tests {
    use super::{detect_file_kind, format_bytes, mime_from_name, FileKind};
    use crate::model::node::{FsNode, ROOT_ID};

    fn file(name: &str, mime: &str) -> FsNode {
        FsNode::new_file(name, ROOT_ID, 0, mime, "")
    }

    #[test]
    fn folders_are_folders() {
        assert_eq!(
            detect_file_kind(&FsNode::new_folder("photos.png", ROOT_ID)),
            FileKind::Folder
        );
    }

    #[test]
    fn mime_or_extension_selects_kind() {
        assert_eq!(detect_file_kind(&file("x", "image/png")), FileKind::Image);
        assert_eq!(
            detect_file_kind(&file("Photo.JPEG", "application/octet-stream")),
            FileKind::Image
        );
        assert_eq!(detect_file_kind(&file("clip.mov", "")), FileKind::Video);
        assert_eq!(detect_file_kind(&file("song", "audio/mpeg")), FileKind::Audio);
        assert_eq!(detect_file_kind(&file("paper.pdf", "")), FileKind::Pdf);
        assert_eq!(detect_file_kind(&file("notes.md", "")), FileKind::Text);
        assert_eq!(detect_file_kind(&file("backup.tar.gz", "")), FileKind::Archive);
        assert_eq!(
            detect_file_kind(&file("x", "application/x-7z-compressed")),
            FileKind::Archive
        );
        assert_eq!(detect_file_kind(&file("binary.exe", "")), FileKind::Other);
    }

    #[test]
    fn earlier_category_wins() {
        // `text/*` mime but image extension: image is checked first.
        assert_eq!(detect_file_kind(&file("logo.svg", "text/xml")), FileKind::Image);
    }

    #[test]
    fn mime_guess_uses_last_extension() {
        assert_eq!(mime_from_name("a.PNG"), Some("image/png"));
        assert_eq!(mime_from_name("archive.tar.gz"), Some("application/gzip"));
        assert_eq!(mime_from_name("README"), None);
        assert_eq!(mime_from_name("weird.zzz"), None);
    }

    #[test]
    fn format_bytes_scales_units() {
        assert_eq!(format_bytes(0, 1), "0 B");
        assert_eq!(format_bytes(512, 1), "512.0 B");
        assert_eq!(format_bytes(1536, 1), "1.5 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024, 0), "5 MB");
        assert_eq!(format_bytes(3 * 1024u64.pow(5), 1), "3072.0 TB");
    }
}
