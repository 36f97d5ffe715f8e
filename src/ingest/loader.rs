//! Asynchronous reading of input files.

use crate::error::PipelineError;
use crate::models::InputFile;
use std::path::{Path, PathBuf};
use tracing::debug;

const BOM: char = '\u{feff}';

/// Read one file into an [`InputFile`], decoding UTF-8 lossily.
pub async fn load_file(path: &Path) -> Result<InputFile, PipelineError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| PipelineError::Read {
            name: path.display().to_string(),
            source,
        })?;

    let text = String::from_utf8_lossy(&bytes);
    let content = text.strip_prefix(BOM).unwrap_or(&text[..]).to_string();
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    debug!("Read {} ({} bytes)", name, bytes.len());
    Ok(InputFile { name, content })
}

/// Read files sequentially, preserving the supplied order.
pub async fn load_files(paths: &[PathBuf]) -> Result<Vec<InputFile>, PipelineError> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        files.push(load_file(path).await?);
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_load_file_strips_bom() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pop.txt");
        fs::write(&path, "\u{feff}2020^A^to_in_001^10\n").unwrap();

        let file = load_file(&path).await.unwrap();
        assert_eq!(file.name, "pop.txt");
        assert_eq!(file.content, "2020^A^to_in_001^10\n");
    }

    #[tokio::test]
    async fn test_load_files_preserves_order() {
        let dir = TempDir::new().unwrap();
        let b = dir.path().join("b.txt");
        let a = dir.path().join("a.txt");
        fs::write(&b, "b").unwrap();
        fs::write(&a, "a").unwrap();

        let files = load_files(&[b, a]).await.unwrap();
        assert_eq!(files[0].content, "b");
        assert_eq!(files[1].content, "a");
    }

    #[tokio::test]
    async fn test_missing_file_reports_name() {
        let err = load_file(Path::new("/no/such/file.txt")).await.unwrap_err();
        assert!(err.to_string().contains("file.txt"));
    }
}
