//! Version-control capability.
//!
//! Every git fact the generator and server use goes through
//! [`VersionControl`]. All methods are best-effort: an unavailable tool or a
//! directory outside a repository yields `None` (or empty fields), never an
//! error.

use crate::types::SourceControl;
use serde::Serialize;
use std::path::PathBuf;
use std::process::Command;

/// Current commit as both full and abbreviated hashes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitRef {
    pub full: String,
    pub short: String,
}

/// One changed path between a checkpoint and `HEAD`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeEntry {
    /// Status letter(s) as reported by git, e.g. `M`, `A`, `D`, `R100`.
    pub status: String,
    pub path: String,
    /// Source path for renames and copies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChangeSet {
    pub raw: String,
    pub entries: Vec<ChangeEntry>,
}

pub trait VersionControl: Send + Sync {
    /// Branch, remote and last-commit facts for the snapshot.
    fn repo_info(&self) -> SourceControl;

    fn current_commit(&self) -> Option<CommitRef>;

    /// Newest tag matching the checkpoint naming pattern.
    fn latest_checkpoint_tag(&self) -> Option<String>;

    /// Paths changed between `tag` and `HEAD`.
    fn changes_since(&self, tag: &str) -> Option<ChangeSet>;
}

/// Null capability used when git is unavailable or unwanted.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoVcs;

impl VersionControl for NoVcs {
    fn repo_info(&self) -> SourceControl {
        SourceControl::default()
    }
    fn current_commit(&self) -> Option<CommitRef> {
        None
    }
    fn latest_checkpoint_tag(&self) -> Option<String> {
        None
    }
    fn changes_since(&self, _tag: &str) -> Option<ChangeSet> {
        None
    }
}

/// Shells out to the `git` CLI inside `root`.
#[derive(Debug, Clone)]
pub struct GitCli {
    root: PathBuf,
    checkpoint_pattern: String,
}

impl GitCli {
    pub fn new(root: impl Into<PathBuf>, checkpoint_pattern: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            checkpoint_pattern: checkpoint_pattern.into(),
        }
    }

    /// Runs git and returns trimmed stdout, or `None` on any failure or
    /// empty output.
    fn git(&self, args: &[&str]) -> Option<String> {
        let output = match Command::new("git")
            .args(args)
            .current_dir(&self.root)
            .output()
        {
            Ok(output) => output,
            Err(e) => {
                tracing::debug!("git {} could not run: {}", args.join(" "), e);
                return None;
            }
        };
        if !output.status.success() {
            tracing::debug!(
                "git {} failed: {}",
                args.join(" "),
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return None;
        }
        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        (!stdout.is_empty()).then_some(stdout)
    }
}

impl VersionControl for GitCli {
    fn repo_info(&self) -> SourceControl {
        SourceControl {
            branch: self.git(&["rev-parse", "--abbrev-ref", "HEAD"]),
            remote_url: self.git(&["config", "--get", "remote.origin.url"]),
            last_commit_hash: self.git(&["rev-parse", "HEAD"]),
            last_commit_message: self.git(&["log", "-1", "--pretty=%s"]),
            last_commit_author: self.git(&["log", "-1", "--pretty=%an"]),
            last_commit_date: self.git(&["log", "-1", "--pretty=%cI"]),
        }
    }

    fn current_commit(&self) -> Option<CommitRef> {
        let full = self.git(&["rev-parse", "HEAD"])?;
        let short = self
            .git(&["rev-parse", "--short", "HEAD"])
            .unwrap_or_else(|| full.chars().take(7).collect());
        Some(CommitRef { full, short })
    }

    fn latest_checkpoint_tag(&self) -> Option<String> {
        let tags = self.git(&[
            "tag",
            "--list",
            self.checkpoint_pattern.as_str(),
            "--sort=-creatordate",
        ])?;
        tags.lines().next().map(|t| t.trim().to_string())
    }

    fn changes_since(&self, tag: &str) -> Option<ChangeSet> {
        let range = format!("{tag}..HEAD");
        // NUL-separated output keeps non-ASCII and whitespace paths unquoted.
        let output = Command::new("git")
            .args(["diff", "-z", "-M", "--name-status", range.as_str()])
            .current_dir(&self.root)
            .output()
            .map_err(|e| tracing::debug!("git diff could not run: {}", e))
            .ok()?;
        if !output.status.success() {
            tracing::debug!(
                "git diff {} failed: {}",
                range,
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return None;
        }
        // An empty diff is a valid answer here, unlike in `git()`.
        let entries = parse_name_status(&String::from_utf8_lossy(&output.stdout));
        Some(ChangeSet {
            raw: render_name_status(&entries),
            entries,
        })
    }
}

/// Parses `git diff -z --name-status` output.
///
/// Fields are NUL-terminated: a status, then one path, or two (source and
/// destination) for renames and copies. A truncated trailing record is
/// dropped.
pub fn parse_name_status(raw: &str) -> Vec<ChangeEntry> {
    let mut fields = raw.split('\0').filter(|f| !f.is_empty());
    let mut entries = Vec::new();
    while let Some(status) = fields.next() {
        let Some(first) = fields.next() else {
            break;
        };
        let entry = if status.starts_with(['R', 'C']) {
            let Some(second) = fields.next() else {
                break;
            };
            ChangeEntry {
                status: status.to_string(),
                path: second.to_string(),
                previous_path: Some(first.to_string()),
            }
        } else {
            ChangeEntry {
                status: status.to_string(),
                path: first.to_string(),
                previous_path: None,
            }
        };
        entries.push(entry);
    }
    entries
}

/// Tab-separated, one line per entry, in the layout of plain
/// `git diff --name-status` but without path quoting.
pub fn render_name_status(entries: &[ChangeEntry]) -> String {
    entries
        .iter()
        .map(|entry| match &entry.previous_path {
            Some(previous) => format!("{}\t{}\t{}", entry.status, previous, entry.path),
            None => format!("{}\t{}", entry.status, entry.path),
        })
        .collect::<Vec<_>>()
        .join("\n")
}
