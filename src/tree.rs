//! Internal module for rendering the file inventory as an indented tree.

use crate::types::FileEntry;

pub(crate) const EMPTY_TREE: &str = "(empty tree)";

/// Renders one line per file, in lexicographic path order.
///
/// Each line is indented two spaces per directory level and shows only the
/// file name, e.g. `a/b/c.rs` becomes `    - c.rs`.
pub(crate) fn render_tree(files: &[FileEntry]) -> String {
    let mut paths: Vec<&str> = files.iter().map(|f| f.path.as_str()).collect();
    paths.sort_unstable();

    if paths.is_empty() {
        return EMPTY_TREE.to_string();
    }

    let lines: Vec<String> = paths
        .into_iter()
        .map(|path| {
            let depth = path.matches('/').count();
            let name = path.rsplit('/').next().unwrap_or(path);
            format!("{}- {}", "  ".repeat(depth), name)
        })
        .collect();

    lines.join("\n")
}
