use std::path::Path;

use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Split a path list into one path per line.
///
/// Blank lines and `#` comments are skipped. Everything else is passed on
/// as-is so the tree builder can reject malformed paths.
pub fn parse_path_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim_end)
        .filter(|line| !line.trim_start().is_empty() && !line.trim_start().starts_with('#'))
        .map(str::to_string)
        .collect()
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

/// Collect the files under `root` as `/`-joined paths that start with the
/// root directory's own name, so the scan renders as a single tree.
pub fn scan_directory(
    root: &Path,
    max_depth: Option<usize>,
    show_hidden: bool,
) -> Result<Vec<String>, String> {
    if !root.is_dir() {
        return Err(format!("Not a directory: {}", root.display()));
    }

    let root_name = root
        .canonicalize()
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| ".".to_string());

    let mut walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name();
    if let Some(depth) = max_depth {
        walker = walker.max_depth(depth);
    }

    let mut paths = Vec::new();
    let iter = walker
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || show_hidden || !is_hidden(entry));

    for entry in iter {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        if entry.file_type().is_dir() {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(root)
            .map_err(|e| format!("Failed to relativize {}: {}", entry.path().display(), e))?;

        let mut path = root_name.clone();
        for component in relative.components() {
            path.push('/');
            path.push_str(&component.as_os_str().to_string_lossy());
        }
        paths.push(path);
    }

    debug!(root = %root.display(), files = paths.len(), "scanned directory");
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    /// Paths ending with '/' create directories; others create empty files.
    fn create_fixture(paths: &[&str]) -> TempDir {
        let tmp = TempDir::new().unwrap();
        for p in paths {
            let full = tmp.path().join(p);
            if p.ends_with('/') {
                fs::create_dir_all(&full).unwrap();
            } else {
                if let Some(parent) = full.parent() {
                    fs::create_dir_all(parent).unwrap();
                }
                fs::write(&full, "").unwrap();
            }
        }
        tmp
    }

    fn strip_root(paths: Vec<String>) -> Vec<String> {
        paths
            .into_iter()
            .map(|p| p.split_once('/').map(|(_, rest)| rest.to_string()).unwrap())
            .collect()
    }

    #[test]
    fn parses_lines_skipping_blanks_and_comments() {
        let text = "# project files\nsrc/main.rs\r\n\n   \nsrc/lib.rs  \n  # indented comment\nREADME.md";
        assert_eq!(
            parse_path_list(text),
            vec!["src/main.rs", "src/lib.rs", "README.md"]
        );
    }

    #[test]
    fn keeps_malformed_lines_for_the_builder() {
        assert_eq!(parse_path_list("a//b\n/c"), vec!["a//b", "/c"]);
    }

    #[test]
    fn scan_lists_files_under_root_name() {
        let tmp = create_fixture(&["src/main.rs", "src/util/mod.rs", "Cargo.toml", "empty/"]);
        let paths = scan_directory(tmp.path(), None, false).unwrap();

        let root_name = tmp
            .path()
            .canonicalize()
            .unwrap()
            .file_name()
            .unwrap()
            .to_string_lossy()
            .into_owned();
        assert!(paths.iter().all(|p| p.starts_with(&format!("{root_name}/"))));
        assert_eq!(
            strip_root(paths),
            vec!["Cargo.toml", "src/main.rs", "src/util/mod.rs"]
        );
    }

    #[test]
    fn scan_skips_hidden_unless_asked() {
        let tmp = create_fixture(&[".git/HEAD", ".env", "a.txt"]);
        assert_eq!(
            strip_root(scan_directory(tmp.path(), None, false).unwrap()),
            vec!["a.txt"]
        );
        assert_eq!(
            strip_root(scan_directory(tmp.path(), None, true).unwrap()),
            vec![".env", ".git/HEAD", "a.txt"]
        );
    }

    #[test]
    fn scan_respects_max_depth() {
        let tmp = create_fixture(&["top.txt", "deep/er/file.txt"]);
        assert_eq!(
            strip_root(scan_directory(tmp.path(), Some(1), false).unwrap()),
            vec!["top.txt"]
        );
    }

    #[test]
    fn scan_rejects_files() {
        let tmp = create_fixture(&["file.txt"]);
        assert!(scan_directory(&tmp.path().join("file.txt"), None, false).is_err());
    }
}
