use std::path::{Path, PathBuf};

const WORKSPACE_MARKERS: [&str; 3] = ["WORKSPACE", "WORKSPACE.bazel", "MODULE.bazel"];

/// Walk upwards from `start` to find the bazel workspace root.
pub fn bazel_workspace_root(start: impl AsRef<Path>) -> Option<PathBuf> {
    let start = start.as_ref();
    let mut dir = if start.is_file() { start.parent()? } else { start };

    loop {
        if is_bazel_workspace(dir) {
            return Some(dir.to_path_buf());
        }
        dir = dir.parent()?;
    }
}

pub fn is_bazel_workspace(root: &Path) -> bool {
    WORKSPACE_MARKERS
        .iter()
        .any(|marker| root.join(marker).is_file())
}
