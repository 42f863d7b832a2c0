//! Package directory enumeration.

use std::path::{Path, PathBuf};

use super::error::PackageError;

/// List `*.<extension>` files in `dir`.
///
/// Order is whatever the directory enumeration yields; callers that need
/// a stable order must sort. A missing directory yields an empty list.
pub fn discover_packages(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, PackageError> {
    if !dir.is_dir() {
        tracing::debug!(dir = %dir.display(), "Package directory does not exist yet");
        return Ok(Vec::new());
    }

    let pattern = format!(
        "{}/*.{}",
        glob::Pattern::escape(&dir.to_string_lossy()),
        extension
    );

    let entries = glob::glob(&pattern).map_err(|e| PackageError::ScanFailed {
        path: dir.to_path_buf(),
        reason: e.to_string(),
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) if path.is_file() => paths.push(path),
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(error = %e, "Skipping unreadable package directory entry");
            }
        }
    }

    tracing::debug!(dir = %dir.display(), count = paths.len(), "Discovered packages");
    Ok(paths)
}

/// File base names of package paths, e.g. `"Paris.mbtiles"`.
pub fn package_names(paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .filter_map(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_discover_filters_by_extension() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Paris.mbtiles"), b"").unwrap();
        fs::write(dir.path().join("World.mbtiles"), b"").unwrap();
        fs::write(dir.path().join("notes.txt"), b"").unwrap();
        fs::create_dir(dir.path().join("folder.mbtiles")).unwrap();

        let mut names = package_names(&discover_packages(dir.path(), "mbtiles").unwrap());
        names.sort();

        assert_eq!(names, vec!["Paris.mbtiles", "World.mbtiles"]);
    }

    #[test]
    fn test_discover_missing_dir_is_empty() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("mbtiles");
        assert!(discover_packages(&missing, "mbtiles").unwrap().is_empty());
    }

    #[test]
    fn test_discover_escapes_directory_name() {
        let dir = TempDir::new().unwrap();
        let odd = dir.path().join("maps [offline]");
        fs::create_dir(&odd).unwrap();
        fs::write(odd.join("Rome.mbtiles"), b"").unwrap();

        let found = discover_packages(&odd, "mbtiles").unwrap();
        assert_eq!(package_names(&found), vec!["Rome.mbtiles"]);
    }
}
