//! Input path discovery.
//!
//! Expands the paths given on the command line into the list of files to
//! read. Explicit files keep the order they were given in; directories are
//! walked and their matching files appended in sorted path order.

use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Configuration for input discovery.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// File extensions to pick up from directories (e.g., ["txt", "csv"])
    pub extensions: Vec<String>,
    /// Descend into sub-directories
    pub recursive: bool,
    /// Maximum file size in bytes
    pub max_file_size: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["txt", "csv"].into_iter().map(String::from).collect(),
            recursive: true,
            max_file_size: 256 * 1024 * 1024, // 256MB
        }
    }
}

impl From<&crate::config::InputConfig> for ScanConfig {
    fn from(config: &crate::config::InputConfig) -> Self {
        Self {
            extensions: config.extensions.clone(),
            recursive: config.recursive,
            max_file_size: config.max_file_size,
        }
    }
}

/// Discovers input files.
pub struct InputScanner {
    config: ScanConfig,
}

impl InputScanner {
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    /// Expand files and directories into an ordered file list.
    pub fn collect(&self, paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for path in paths {
            if path.is_file() {
                files.push(path.clone());
            } else if path.is_dir() {
                files.extend(self.walk(path));
            } else {
                return Err(anyhow!("Input path does not exist: {}", path.display()));
            }
        }

        Ok(files)
    }

    /// Check if a directory entry should be read.
    pub fn matches(&self, path: &Path) -> bool {
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if name.starts_with('.') {
                return false;
            }
        }

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        if !self.config.extensions.iter().any(|e| e.eq_ignore_ascii_case(&ext)) {
            return false;
        }

        match path.metadata() {
            Ok(metadata) => metadata.len() <= self.config.max_file_size,
            Err(_) => false,
        }
    }

    fn walk(&self, dir: &Path) -> Vec<PathBuf> {
        let max_depth = if self.config.recursive { usize::MAX } else { 1 };

        let mut found: Vec<PathBuf> = WalkDir::new(dir)
            .max_depth(max_depth)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    debug!("Skipping unreadable entry under {}: {}", dir.display(), e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| self.matches(path))
            .collect();

        found.sort();
        debug!("Found {} input files under {}", found.len(), dir.display());
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_collect_walks_directories_sorted() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.txt"), "x").unwrap();
        fs::write(dir.path().join("a.txt"), "x").unwrap();
        fs::write(dir.path().join("notes.md"), "x").unwrap();
        fs::write(dir.path().join(".hidden.txt"), "x").unwrap();

        let scanner = InputScanner::new(ScanConfig::default());
        let files = scanner.collect(&[dir.path().to_path_buf()]).unwrap();

        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.txt", "b.txt"]);
    }

    #[test]
    fn test_collect_keeps_explicit_order() {
        let dir = TempDir::new().unwrap();
        let second = dir.path().join("2.txt");
        let first = dir.path().join("1.txt");
        fs::write(&second, "x").unwrap();
        fs::write(&first, "x").unwrap();

        let scanner = InputScanner::new(ScanConfig::default());
        let files = scanner.collect(&[second.clone(), first.clone()]).unwrap();

        assert_eq!(files, vec![second, first]);
    }

    #[test]
    fn test_non_recursive_skips_subdirectories() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("deep.txt"), "x").unwrap();
        fs::write(dir.path().join("top.txt"), "x").unwrap();

        let config = ScanConfig {
            recursive: false,
            ..ScanConfig::default()
        };
        let files = InputScanner::new(config)
            .collect(&[dir.path().to_path_buf()])
            .unwrap();

        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("top.txt"));
    }

    #[test]
    fn test_missing_path_is_an_error() {
        let scanner = InputScanner::new(ScanConfig::default());
        assert!(scanner
            .collect(&[PathBuf::from("/definitely/not/here.txt")])
            .is_err());
    }
}
