//! Reading and writing serialized units.

use crate::constants::UNIT_EXTENSION;
use crate::error::{RecastError, Result};
use crate::tree::SourceUnit;
use std::path::{Path, PathBuf};

/// Check if a directory name matches any exclusion pattern.
/// A trailing `*` matches by prefix, a leading `*` by suffix.
fn is_excluded(name: &str, excludes: &[String]) -> bool {
    excludes.iter().any(|pattern| {
        if let Some(prefix) = pattern.strip_suffix('*') {
            name.starts_with(prefix)
        } else if let Some(suffix) = pattern.strip_prefix('*') {
            name.ends_with(suffix)
        } else {
            name == pattern
        }
    })
}

/// Collects unit files under `root`, respecting `.gitignore` and skipping
/// excluded folders. A `root` that is a file is returned as is.
///
/// Results are sorted so runs are reproducible.
#[must_use]
pub fn collect_unit_files(root: &Path, exclude: &[String]) -> Vec<PathBuf> {
    use ignore::WalkBuilder;

    if root.is_file() {
        return vec![root.to_path_buf()];
    }

    let excludes = exclude.to_vec();
    let root_for_filter = root.to_path_buf();
    let walker = WalkBuilder::new(root)
        .hidden(false)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .filter_entry(move |entry| {
            if entry.path() == root_for_filter {
                return true;
            }
            if !entry.file_type().is_some_and(|ft| ft.is_dir()) {
                return true;
            }
            // Names that are not valid UTF-8 are kept.
            entry
                .file_name()
                .to_str()
                .map_or(true, |name| !is_excluded(name, &excludes))
        })
        .build();

    let mut files: Vec<PathBuf> = walker
        .filter_map(|result| match result {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!("walk error: {e}");
                None
            }
        })
        .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
        .map(ignore::DirEntry::into_path)
        .filter(|path| path.extension().is_some_and(|ext| ext == UNIT_EXTENSION))
        .collect();
    files.sort();
    files
}

/// Reads one unit from a JSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid unit.
pub fn load_unit(path: &Path) -> Result<SourceUnit> {
    let content = std::fs::read_to_string(path).map_err(|source| RecastError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| RecastError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes one unit as pretty-printed JSON, replacing the file.
///
/// # Errors
///
/// Returns an error if the unit cannot be serialized or the file written.
pub fn save_unit(path: &Path, unit: &SourceUnit) -> Result<()> {
    let mut content = serde_json::to_string_pretty(unit).map_err(|source| RecastError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    content.push('\n');
    std::fs::write(path, content).map_err(|source| RecastError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::build::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_is_excluded_patterns() {
        let excludes = vec!["target".to_owned(), "tmp*".to_owned(), "*.bak".to_owned()];
        assert!(is_excluded("target", &excludes));
        assert!(is_excluded("tmp_data", &excludes));
        assert!(is_excluded("old.bak", &excludes));
        assert!(!is_excluded("src", &excludes));
    }

    #[test]
    fn test_collect_skips_excluded_folders() -> anyhow::Result<()> {
        let dir = tempdir()?;
        fs::create_dir_all(dir.path().join("src/nested"))?;
        fs::create_dir_all(dir.path().join("target"))?;
        fs::write(dir.path().join("src/A.json"), "{}")?;
        fs::write(dir.path().join("src/nested/B.json"), "{}")?;
        fs::write(dir.path().join("src/notes.txt"), "")?;
        fs::write(dir.path().join("target/C.json"), "{}")?;

        let files = collect_unit_files(dir.path(), &["target".to_owned()]);
        let names: Vec<_> = files
            .iter()
            .filter_map(|p| p.file_name()?.to_str())
            .collect();
        assert_eq!(names, vec!["A.json", "B.json"]);
        Ok(())
    }

    #[test]
    fn test_file_root_is_returned() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let file = dir.path().join("Only.json");
        fs::write(&file, "{}")?;
        assert_eq!(collect_unit_files(&file, &[]), vec![file]);
        Ok(())
    }

    #[test]
    fn test_save_then_load() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("T.json");
        let unit = unit("T", vec![class("T", &[], vec![])]);
        save_unit(&path, &unit)?;
        assert_eq!(load_unit(&path)?, unit);
        Ok(())
    }

    #[test]
    fn test_load_errors() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let missing = load_unit(&dir.path().join("missing.json"));
        assert!(matches!(missing, Err(RecastError::Io { .. })));

        let bad = dir.path().join("bad.json");
        fs::write(&bad, "{ not json")?;
        let err = load_unit(&bad).unwrap_err();
        assert!(matches!(err, RecastError::Json { .. }));
        assert!(err.to_string().contains("bad.json"));
        Ok(())
    }
}
