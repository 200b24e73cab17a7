//! # Beacon
//!
//! `beacon` captures a point-in-time snapshot of a project tree (file
//! inventory, git metadata, a prose digest) and serves it read-only over
//! HTTP.
//!
//! The generator ([`generate`]) walks the tree, inlines small text files, and
//! writes `dist/snapshot.yaml` and `dist/digest.md`. The server
//! ([`server::serve`]) republishes those artifacts, plus an optional
//! `GUIDE.md`, and answers a few live git questions on each request.
//!
//! The [`brain`] module keeps a small hand-curated notebook of project state
//! (current step, next steps, recent commands, troubleshooting notes) in
//! `.brain.yml`, using the same structured-text codec.
//!
//! # Features
//!
//! - `parallel` (default): classifies and inlines files in parallel using Rayon.
//!
//! # Example
//!
//! ```no_run
//! use beacon::{BeaconBuilder, GitCli, generate};
//!
//! let config = BeaconBuilder::new(".")
//!     .max_inline_bytes(32 * 1024)
//!     .ignore_patterns(vec!["*.log".into()])
//!     .build();
//! let vcs = GitCli::new(&config.root, &config.checkpoint_pattern);
//!
//! let artifacts = generate(&config, &vcs).expect("failed to write snapshot");
//! println!("snapshot: {}", artifacts.snapshot.display());
//! ```

pub mod brain;
pub mod codec;
mod engine;
mod error;
pub mod handlers;
mod options;
pub mod output;
pub mod runtime;
pub mod server;
mod tree;
mod types;
pub mod vcs;

pub use engine::{build_snapshot, collect_files, generate};
pub use error::BeaconError;
pub use options::{
    BeaconBuilder, BeaconConfig, DEFAULT_BIND_ADDR, DEFAULT_CHECKPOINT_PATTERN, DEFAULT_EXCLUDED_DIRS,
    DEFAULT_INLINE_EXTENSIONS, DEFAULT_MAX_INLINE_BYTES, DIGEST_FILE, GUIDE_FILE, SNAPSHOT_FILE,
};
pub use output::Artifacts;
pub use types::{FORMAT_VERSION, FileEntry, ProjectInfo, Snapshot, SourceControl, Summary};
pub use vcs::{GitCli, NoVcs, VersionControl};
