//! Find an image by bare file name under a search root.

use std::path::{Path, PathBuf};

/// Use `name` as-is when it points at an existing file, otherwise search
/// `root` for a file with that name.
pub fn resolve(name: &str, root: &Path) -> Option<PathBuf> {
    let direct = Path::new(name);
    if direct.is_file() {
        return Some(direct.to_path_buf());
    }
    let file_name = direct.file_name()?;
    find_file(root, file_name.to_str()?)
}

/// Depth-first search for the first file named `file_name`.
///
/// Directories that cannot be read (permissions, races with deletion) are
/// skipped. Entries are visited in sorted order so the result is stable.
pub fn find_file(root: &Path, file_name: &str) -> Option<PathBuf> {
    let mut stack = vec![root.to_path_buf()];

    while let Some(dir) = stack.pop() {
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::trace!(dir = %dir.display(), error = %e, "skipping unreadable directory");
                continue;
            }
        };

        let mut paths: Vec<PathBuf> = entries.filter_map(|e| e.ok()).map(|e| e.path()).collect();
        paths.sort();

        if let Some(hit) = paths
            .iter()
            .find(|p| p.is_file() && p.file_name().is_some_and(|n| n == file_name))
        {
            return Some(hit.clone());
        }

        // Reverse so the smallest subdirectory is popped first.
        for path in paths.into_iter().rev() {
            let is_dir = std::fs::symlink_metadata(&path)
                .map(|m| m.is_dir())
                .unwrap_or(false);
            if is_dir {
                stack.push(path);
            }
        }
    }

    None
}
