//! Artifact rendering and persistence.
//!
//! A snapshot is persisted as two files under the output directory: the
//! structured-text document (see [`crate::codec`]) and a prose digest meant
//! to be pasted into a text interface.

use crate::codec::encode_snapshot;
use crate::error::BeaconError;
use crate::options::BeaconConfig;
use crate::types::Snapshot;
use std::fs;
use std::path::{Path, PathBuf};

/// Paths of the artifacts written by one generator run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    pub snapshot: PathBuf,
    pub digest: PathBuf,
}

fn or_unknown(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("unknown")
}

/// Renders the prose digest for a snapshot.
pub fn format_digest(snapshot: &Snapshot) -> String {
    let scm = &snapshot.source_control;
    let mut out = String::with_capacity(1024 + snapshot.summary.tree.len());

    out.push_str("# Project Snapshot Digest\n");
    out.push_str(&format!("Generated: {}\n\n", snapshot.generated_at));

    out.push_str("## Project\n");
    out.push_str(&format!("- Name: {}\n", snapshot.project.name));
    out.push_str(&format!("- Branch: {}\n", or_unknown(&scm.branch)));
    out.push_str(&format!("- Remote: {}\n\n", or_unknown(&scm.remote_url)));

    out.push_str("## Last Commit\n");
    out.push_str(&format!(
        "- Commit: {} ({})\n",
        or_unknown(&scm.last_commit_hash),
        or_unknown(&scm.last_commit_message)
    ));
    out.push_str(&format!("- Author: {}\n", or_unknown(&scm.last_commit_author)));
    out.push_str(&format!("- Date: {}\n\n", or_unknown(&scm.last_commit_date)));

    out.push_str(&format!(
        "## File Tree ({} files)\n",
        snapshot.summary.file_count
    ));
    out.push_str(&snapshot.summary.tree);
    if !snapshot.summary.tree.ends_with('\n') {
        out.push('\n');
    }
    out.push('\n');

    out.push_str("## Regenerate\n");
    for (name, command) in &snapshot.commands {
        out.push_str(&format!("- {}: {}\n", name, command));
    }
    out.push('\n');

    out.push_str("## Usage\n");
    out.push_str("- Treat this digest and snapshot.yaml as ground truth for the project state.\n");
    out.push_str("- If a file is not inlined in snapshot.yaml, ask for it by its exact path.\n");
    out
}

fn write_file(path: &Path, content: &str) -> Result<(), BeaconError> {
    fs::write(path, content).map_err(|e| BeaconError::io(path, e))
}

/// Writes both artifacts, creating the output directory when absent.
///
/// Existing artifacts are replaced wholesale. The write is not atomic, so a
/// concurrent reader may observe a partially written file.
pub fn write_artifacts(config: &BeaconConfig, snapshot: &Snapshot) -> Result<Artifacts, BeaconError> {
    let out_dir = config.output_path();
    fs::create_dir_all(&out_dir).map_err(|e| BeaconError::io(&out_dir, e))?;

    let artifacts = Artifacts {
        snapshot: config.snapshot_path(),
        digest: config.digest_path(),
    };
    write_file(&artifacts.snapshot, &encode_snapshot(snapshot)?)?;
    write_file(&artifacts.digest, &format_digest(snapshot))?;
    Ok(artifacts)
}
