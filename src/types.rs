use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const FORMAT_VERSION: &str = "beacon-snapshot/1";

/// A single file in the inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Path relative to the project root, `/`-separated.
    pub path: String,
    /// Size of the file in bytes.
    pub bytes: u64,
    /// Whether `content` carries the full text of the file.
    pub inline: bool,
    /// Full text, present only for inline entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub name: String,
    pub root: String,
}

/// Git facts captured at generation time. Every field is best-effort.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceControl {
    pub branch: Option<String>,
    pub remote_url: Option<String>,
    pub last_commit_hash: Option<String>,
    pub last_commit_message: Option<String>,
    pub last_commit_author: Option<String>,
    pub last_commit_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub file_count: usize,
    /// Rendered tree, one line per file.
    pub tree: String,
}

/// The complete snapshot document.
///
/// Field order here is the order used by the structured-text artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub format_version: String,
    pub generated_at: String,
    pub project: ProjectInfo,
    pub source_control: SourceControl,
    pub summary: Summary,
    pub commands: BTreeMap<String, String>,
    pub next_actions: Vec<String>,
    pub files: Vec<FileEntry>,
}
