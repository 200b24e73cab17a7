use crate::error::BeaconError;
use crate::options::BeaconConfig;
use crate::output::{Artifacts, write_artifacts};
use crate::runtime::now_utc;
use crate::tree::render_tree;
use crate::types::{FORMAT_VERSION, FileEntry, ProjectInfo, Snapshot, Summary};
use crate::vcs::VersionControl;
use ignore::WalkBuilder;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// A regular file found by the walk, before classification.
struct Candidate {
    relative: String,
    absolute: PathBuf,
    bytes: u64,
}

struct Walker {
    inner: ignore::Walk,
    root: PathBuf,
    matcher: Option<globset::GlobSet>,
}
impl Walker {
    fn new(config: &BeaconConfig) -> Result<Self, BeaconError> {
        let mut builder = WalkBuilder::new(&config.root);
        builder
            .standard_filters(false)
            .git_ignore(config.respect_gitignore)
            .git_exclude(config.respect_gitignore)
            .hidden(false)
            .follow_links(false);
        let excluded = config.excluded_dirs.clone();
        let output_path = config.output_path();
        builder.filter_entry(move |entry| {
            if entry.depth() == 0 {
                return true;
            }
            let name_excluded = entry
                .file_name()
                .to_str()
                .is_some_and(|name| excluded.contains(name));
            !name_excluded && entry.path() != output_path
        });
        let matcher = if !config.ignore_patterns.is_empty() {
            let mut glob_builder = globset::GlobSetBuilder::new();
            for pattern in &config.ignore_patterns {
                let glob = globset::Glob::new(pattern).map_err(|e| {
                    BeaconError::InvalidPattern(format!("'{}': {}", pattern, e))
                })?;
                glob_builder.add(glob);
            }
            Some(glob_builder.build().map_err(|e| {
                BeaconError::InvalidPattern(format!("failed to build glob set: {}", e))
            })?)
        } else {
            None
        };
        Ok(Self {
            inner: builder.build(),
            root: config.root.clone(),
            matcher,
        })
    }
    /// Collects every regular file, skipping (and logging) entries the walk
    /// or metadata lookup fails on.
    fn collect_candidates(self) -> Vec<Candidate> {
        let mut candidates = Vec::new();
        for result in self.inner {
            let entry = match result {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("skipping unreadable entry: {}", e);
                    continue;
                }
            };
            let Some(file_type) = entry.file_type() else {
                continue;
            };
            // Symlinks are recorded when they resolve to a regular file; linked
            // directories are never descended.
            let linked_file = file_type.is_symlink() && entry.path().is_file();
            if !file_type.is_file() && !linked_file {
                continue;
            }
            let Some(relative) = relative_path(&self.root, entry.path()) else {
                continue;
            };
            if self
                .matcher
                .as_ref()
                .is_some_and(|m| m.is_match(&relative))
            {
                continue;
            }
            let bytes = if linked_file {
                fs::metadata(entry.path()).map(|m| m.len()).map_err(|e| e.to_string())
            } else {
                entry.metadata().map(|m| m.len()).map_err(|e| e.to_string())
            };
            let bytes = match bytes {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::warn!("skipping {}: {}", relative, e);
                    continue;
                }
            };
            candidates.push(Candidate {
                relative,
                absolute: entry.into_path(),
                bytes,
            });
        }
        candidates.sort_by(|a, b| a.relative.cmp(&b.relative));
        candidates
    }
}

/// Forward-slash path of `path` relative to `root`. Non UTF-8 components
/// are decoded lossily.
fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<_> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect();
    Some(parts.join("/"))
}

fn classify(candidate: Candidate, config: &BeaconConfig) -> FileEntry {
    let Candidate {
        relative,
        absolute,
        bytes,
    } = candidate;
    let file_name = relative.rsplit('/').next().unwrap_or(&relative);
    let eligible = config.is_inline_extension(file_name) && bytes <= config.max_inline_bytes;
    let content = if eligible {
        match fs::read(&absolute) {
            Ok(raw) => Some(String::from_utf8_lossy(&raw).into_owned()),
            Err(e) => {
                tracing::warn!("could not inline {}: {}", relative, e);
                None
            }
        }
    } else {
        None
    };
    FileEntry {
        path: relative,
        bytes,
        inline: content.is_some(),
        content,
    }
}

#[cfg(not(feature = "parallel"))]
fn process_files(candidates: Vec<Candidate>, config: &BeaconConfig) -> Vec<FileEntry> {
    candidates
        .into_iter()
        .map(|candidate| classify(candidate, config))
        .collect()
}

#[cfg(feature = "parallel")]
fn process_files(candidates: Vec<Candidate>, config: &BeaconConfig) -> Vec<FileEntry> {
    candidates
        .into_par_iter()
        .map(|candidate| classify(candidate, config))
        .collect()
}

/// Walks `config.root` and returns the file inventory in path order.
///
/// # Errors
///
/// Fails only on an invalid root or an invalid ignore pattern; unreadable
/// entries are logged and skipped.
pub fn collect_files(config: &BeaconConfig) -> Result<Vec<FileEntry>, BeaconError> {
    if !config.root.is_dir() {
        return Err(BeaconError::InvalidPath(format!(
            "{} is not a directory",
            config.root.display()
        )));
    }
    let walker = Walker::new(config)?;
    let candidates = walker.collect_candidates();
    Ok(process_files(candidates, config))
}

fn default_commands() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("generate_snapshot".to_string(), "beacon generate .".to_string()),
        ("serve".to_string(), "beacon serve .".to_string()),
        ("verify_outputs".to_string(), "ls -la dist".to_string()),
    ])
}

fn default_next_actions() -> Vec<String> {
    vec![
        "Review dist/digest.md for accuracy".to_string(),
        "Paste dist/digest.md into a fresh thread when transferring context".to_string(),
    ]
}

/// Builds the in-memory snapshot without writing anything.
pub fn build_snapshot(
    config: &BeaconConfig,
    vcs: &dyn VersionControl,
) -> Result<Snapshot, BeaconError> {
    tracing::debug!("building snapshot of {}", config.root.display());
    let files = collect_files(config)?;
    let root = fs::canonicalize(&config.root).unwrap_or_else(|_| config.root.clone());
    let name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| root.display().to_string());

    Ok(Snapshot {
        format_version: FORMAT_VERSION.to_string(),
        generated_at: now_utc(),
        project: ProjectInfo {
            name,
            root: root.display().to_string(),
        },
        source_control: vcs.repo_info(),
        summary: Summary {
            file_count: files.len(),
            tree: render_tree(&files),
        },
        commands: default_commands(),
        next_actions: default_next_actions(),
        files,
    })
}

/// Builds the snapshot and writes both artifacts.
pub fn generate(
    config: &BeaconConfig,
    vcs: &dyn VersionControl,
) -> Result<Artifacts, BeaconError> {
    let snapshot = build_snapshot(config, vcs)?;
    let artifacts = write_artifacts(config, &snapshot)?;
    tracing::info!(
        "snapshot written: {} files -> {}, {}",
        snapshot.summary.file_count,
        artifacts.snapshot.display(),
        artifacts.digest.display()
    );
    Ok(artifacts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::BeaconBuilder;

    #[test]
    fn unreadable_inline_file_keeps_byte_count() {
        let dir = tempfile::tempdir().unwrap();
        let config = BeaconBuilder::new(dir.path()).build();
        let candidate = Candidate {
            relative: "docs/gone.md".to_string(),
            absolute: dir.path().join("docs/gone.md"),
            bytes: 42,
        };

        let entry = classify(candidate, &config);
        assert_eq!(entry.path, "docs/gone.md");
        assert_eq!(entry.bytes, 42);
        assert!(!entry.inline);
        assert!(entry.content.is_none());
    }
}
