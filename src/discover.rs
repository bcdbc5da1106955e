//! Candidate file discovery.
//!
//! Walks the scan root for Python sources, skipping version-control,
//! dependency, virtualenv and cache directories, and groups files by their
//! top-level target directory.

use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

use globset::GlobSet;
use walkdir::{DirEntry, WalkDir};

use crate::analysis::registered_extensions;
use crate::error::ConfigError;

/// Directory name used for files directly under the scan root.
pub const ROOT_DIRECTORY: &str = ".";

/// Directories never descended into.
const SKIPPED_DIRS: &[&str] = &[
    "__pycache__",
    ".mypy_cache",
    ".pytest_cache",
    ".tox",
    ".venv",
    "venv",
    "node_modules",
    "site-packages",
    ".eggs",
];

/// A file to analyze.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Filesystem path used for reading.
    pub path: PathBuf,
    /// Path shown in reports, relative to the scan root with `/` separators.
    pub display: String,
    /// Top-level target directory this file is reported under.
    pub directory: String,
}

/// The result of walking a scan root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Discovery {
    /// Sorted by directory, then display path.
    pub candidates: Vec<Candidate>,
    /// Directories to report, including requested targets with no files.
    pub directories: Vec<String>,
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || SKIPPED_DIRS.contains(&&*name)
}

fn has_source_extension(path: &Path) -> bool {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    registered_extensions().iter().any(|e| *e == ext)
}

/// Relative path with `/` separators.
fn display_path(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// First component of a multi-component relative path, otherwise the root.
fn top_level_directory(display: &str) -> String {
    match display.split_once('/') {
        Some((first, _)) => first.to_string(),
        None => ROOT_DIRECTORY.to_string(),
    }
}

/// Whether `target` names a single directory directly under the root.
fn is_top_level_name(target: &str) -> bool {
    if target.contains(['/', '\\']) {
        return false;
    }
    let mut components = Path::new(target).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Walk `start` and collect Python files not matched by `excluded`.
fn walk(root: &Path, start: &Path, excluded: &GlobSet) -> Vec<Candidate> {
    let mut candidates = Vec::new();

    for entry in WalkDir::new(start)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| !is_skipped_dir(e))
    {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                log::warn!("skipping unreadable entry: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_file() || !has_source_extension(entry.path()) {
            continue;
        }

        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        let display = display_path(relative);
        if excluded.is_match(&display) {
            log::debug!("excluded by pattern: {}", display);
            continue;
        }

        candidates.push(Candidate {
            path: entry.path().to_path_buf(),
            directory: top_level_directory(&display),
            display,
        });
    }

    candidates
}

/// Discover candidate files under `root`.
///
/// When `targets` is non-empty only those top-level subdirectories are
/// scanned, and each one is reported even if it holds no files. A target
/// that is not a single directory name under `root` is a configuration
/// error. A file root yields exactly that file.
pub fn discover(
    root: &Path,
    targets: &[String],
    excluded: &GlobSet,
) -> Result<Discovery, ConfigError> {
    if root.is_file() {
        let display = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| root.to_string_lossy().into_owned());
        return Ok(Discovery {
            candidates: vec![Candidate {
                path: root.to_path_buf(),
                display,
                directory: ROOT_DIRECTORY.to_string(),
            }],
            directories: vec![ROOT_DIRECTORY.to_string()],
        });
    }

    let mut candidates = Vec::new();
    let directories = if targets.is_empty() {
        candidates.extend(walk(root, root, excluded));
        candidates
            .iter()
            .map(|c| c.directory.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    } else {
        let mut seen = Vec::new();
        for target in targets {
            if seen.contains(target) {
                continue;
            }
            let dir = root.join(target);
            if !is_top_level_name(target) || !dir.is_dir() {
                return Err(ConfigError::UnknownTarget {
                    name: target.clone(),
                    root: root.display().to_string(),
                });
            }
            let mut found = walk(root, &dir, excluded);
            for candidate in &mut found {
                candidate.directory = target.clone();
            }
            candidates.extend(found);
            seen.push(target.clone());
        }
        seen
    };

    candidates.sort_by(|a, b| (&a.directory, &a.display).cmp(&(&b.directory, &b.display)));
    candidates.dedup_by(|a, b| a.display == b.display);
    log::debug!(
        "discovered {} candidate file(s) in {} director(ies)",
        candidates.len(),
        directories.len()
    );

    Ok(Discovery {
        candidates,
        directories,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use globset::{Glob, GlobSetBuilder};
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    fn displays(discovery: &Discovery) -> Vec<&str> {
        discovery.candidates.iter().map(|c| c.display.as_str()).collect()
    }

    fn no_exclusions() -> GlobSet {
        GlobSet::empty()
    }

    #[test]
    fn test_groups_by_top_level_directory() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        touch(root, "top.py");
        touch(root, "ex1/b.py");
        touch(root, "ex0/pkg/a.py");
        touch(root, "ex0/readme.txt");

        let discovery = discover(root, &[], &no_exclusions()).unwrap();
        assert_eq!(displays(&discovery), vec!["top.py", "ex0/pkg/a.py", "ex1/b.py"]);
        let dirs: Vec<_> = discovery.candidates.iter().map(|c| c.directory.as_str()).collect();
        assert_eq!(dirs, vec![".", "ex0", "ex1"]);
        assert_eq!(discovery.directories, vec![".", "ex0", "ex1"]);
    }

    #[test]
    fn test_skips_cache_and_hidden_dirs() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        touch(root, "pkg/ok.py");
        touch(root, "pkg/__pycache__/ok.py");
        touch(root, ".git/hooks/x.py");
        touch(root, "venv/lib/y.py");
        touch(root, "pkg/node_modules/z.py");

        let discovery = discover(root, &[], &no_exclusions()).unwrap();
        assert_eq!(displays(&discovery), vec!["pkg/ok.py"]);
    }

    #[test]
    fn test_excluded_paths() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        touch(root, "src/a.py");
        touch(root, "src/gen/b_pb2.py");

        let mut builder = GlobSetBuilder::new();
        builder.add(Glob::new("**/gen/**").unwrap());
        let excluded = builder.build().unwrap();

        let discovery = discover(root, &[], &excluded).unwrap();
        assert_eq!(displays(&discovery), vec!["src/a.py"]);
    }

    #[test]
    fn test_targets_narrow_and_keep_order() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        touch(root, "ex0/a.py");
        touch(root, "ex1/b.py");
        fs::create_dir_all(root.join("ex2")).unwrap();

        let targets = vec!["ex2".to_string(), "ex0".to_string()];
        let discovery = discover(root, &targets, &no_exclusions()).unwrap();
        assert_eq!(displays(&discovery), vec!["ex0/a.py"]);
        assert_eq!(discovery.directories, vec!["ex2", "ex0"]);
    }

    #[test]
    fn test_unknown_target() {
        let temp = TempDir::new().unwrap();
        let err = discover(temp.path(), &["nope".to_string()], &no_exclusions()).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownTarget { ref name, .. } if name == "nope"));
    }

    #[test]
    fn test_nested_target_rejected() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        touch(root, "a/b/x.py");

        for target in ["a/b", "a\\b", "./a", "..", "."] {
            let targets = vec!["a".to_string(), target.to_string()];
            let err = discover(root, &targets, &no_exclusions()).unwrap_err();
            assert!(
                matches!(err, ConfigError::UnknownTarget { ref name, .. } if name == target),
                "target {:?} accepted",
                target
            );
        }

        let discovery = discover(root, &["a".to_string()], &no_exclusions()).unwrap();
        assert_eq!(displays(&discovery), vec!["a/b/x.py"]);
    }

    #[test]
    fn test_single_file_root() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "one.py");

        let discovery = discover(&temp.path().join("one.py"), &[], &no_exclusions()).unwrap();
        assert_eq!(displays(&discovery), vec!["one.py"]);
        assert_eq!(discovery.directories, vec!["."]);
    }

    #[test]
    fn test_empty_root() {
        let temp = TempDir::new().unwrap();
        let discovery = discover(temp.path(), &[], &no_exclusions()).unwrap();
        assert!(discovery.candidates.is_empty());
        assert!(discovery.directories.is_empty());
    }
}
