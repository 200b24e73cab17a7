use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &[
    ".git",
    "dist",
    "target",
    "__pycache__",
    ".idea",
    ".vscode",
    "node_modules",
    ".venv",
    "venv",
];
pub const DEFAULT_INLINE_EXTENSIONS: &[&str] = &[
    "md", "txt", "py", "json", "yml", "yaml", "toml", "sh", "cfg", "ini", "env", "gitignore", "rs",
];
pub const DEFAULT_MAX_INLINE_BYTES: u64 = 64 * 1024;
pub const DEFAULT_CHECKPOINT_PATTERN: &str = "checkpoint-*";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5090";

pub const SNAPSHOT_FILE: &str = "snapshot.yaml";
pub const DIGEST_FILE: &str = "digest.md";
pub const GUIDE_FILE: &str = "GUIDE.md";

/// Settings shared by the generator and the server.
///
/// Paths are resolved against `root`; nothing here is read from ambient
/// process state once the config is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeaconConfig {
    pub root: PathBuf,
    /// Output directory, relative to `root` unless absolute.
    pub output_dir: PathBuf,
    pub excluded_dirs: BTreeSet<String>,
    /// Lower-case extensions without the leading dot.
    pub inline_extensions: BTreeSet<String>,
    pub max_inline_bytes: u64,
    pub ignore_patterns: Vec<String>,
    pub respect_gitignore: bool,
    pub checkpoint_pattern: String,
    pub bind_addr: String,
    pub public_url: Option<String>,
    /// Empty means any origin.
    pub cors_origins: Vec<String>,
    pub auto_generate_on_missing: bool,
}
impl Default for BeaconConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            output_dir: PathBuf::from("dist"),
            excluded_dirs: DEFAULT_EXCLUDED_DIRS.iter().map(|s| s.to_string()).collect(),
            inline_extensions: DEFAULT_INLINE_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            max_inline_bytes: DEFAULT_MAX_INLINE_BYTES,
            ignore_patterns: Vec::new(),
            respect_gitignore: false,
            checkpoint_pattern: DEFAULT_CHECKPOINT_PATTERN.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            public_url: None,
            cors_origins: Vec::new(),
            auto_generate_on_missing: false,
        }
    }
}
impl BeaconConfig {
    pub fn output_path(&self) -> PathBuf {
        self.root.join(&self.output_dir)
    }
    pub fn snapshot_path(&self) -> PathBuf {
        self.output_path().join(SNAPSHOT_FILE)
    }
    pub fn digest_path(&self) -> PathBuf {
        self.output_path().join(DIGEST_FILE)
    }
    pub fn guide_path(&self) -> PathBuf {
        self.root.join(GUIDE_FILE)
    }
    /// Whether a file with this name is eligible for inlining by extension.
    ///
    /// Dotfiles without a further extension (`.gitignore`) match on their
    /// name minus the leading dot.
    pub fn is_inline_extension(&self, file_name: &str) -> bool {
        let ext = match file_name.rsplit_once('.') {
            Some(("", rest)) => rest,
            Some((_, ext)) => ext,
            None => return false,
        };
        self.inline_extensions.contains(&ext.to_ascii_lowercase())
    }
}
#[derive(Debug, Default)]
pub struct BeaconBuilder {
    config: BeaconConfig,
}
impl BeaconBuilder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            config: BeaconConfig {
                root: root.into(),
                ..Default::default()
            },
        }
    }
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }
    pub fn exclude_dir(mut self, name: impl Into<String>) -> Self {
        self.config.excluded_dirs.insert(name.into());
        self
    }
    pub fn inline_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.config.inline_extensions = extensions
            .into_iter()
            .map(|e| e.as_ref().trim_start_matches('.').to_ascii_lowercase())
            .collect();
        self
    }
    pub fn max_inline_bytes(mut self, limit: u64) -> Self {
        self.config.max_inline_bytes = limit;
        self
    }
    pub fn ignore_patterns(mut self, patterns: Vec<String>) -> Self {
        self.config.ignore_patterns = patterns;
        self
    }
    pub fn respect_gitignore(mut self, yes: bool) -> Self {
        self.config.respect_gitignore = yes;
        self
    }
    pub fn checkpoint_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.config.checkpoint_pattern = pattern.into();
        self
    }
    pub fn bind_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.bind_addr = addr.into();
        self
    }
    pub fn public_url(mut self, url: Option<String>) -> Self {
        self.config.public_url = url;
        self
    }
    pub fn cors_origins(mut self, origins: Vec<String>) -> Self {
        self.config.cors_origins = origins;
        self
    }
    pub fn auto_generate_on_missing(mut self, yes: bool) -> Self {
        self.config.auto_generate_on_missing = yes;
        self
    }
    pub fn build(self) -> BeaconConfig {
        self.config
    }
}
