//! Startup-time document loading.

use std::path::{Path, PathBuf};

use serde_json::Value;

use super::pdf::extract_pdf_text;
use super::{Document, RetrievalError};

/// Extensions read by [`load_documents`] (plain text, markdown and PDF).
pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["txt", "md", "markdown", "pdf"];

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

fn is_supported(path: &Path) -> bool {
    extension(path)
        .map(|e| SUPPORTED_EXTENSIONS.contains(&e.as_str()))
        .unwrap_or(false)
}

fn is_pdf(path: &Path) -> bool {
    extension(path).as_deref() == Some("pdf")
}

/// Reads a text file as-is, or extracts the text of every page of a PDF.
async fn read_content(file: &Path) -> Result<String, RetrievalError> {
    if !is_pdf(file) {
        return tokio::fs::read_to_string(file)
            .await
            .map_err(|e| io_err(file, e));
    }
    let bytes = tokio::fs::read(file).await.map_err(|e| io_err(file, e))?;
    let path = file.display().to_string();
    let task_path = path.clone();
    tokio::task::spawn_blocking(move || extract_pdf_text(&bytes, &task_path))
        .await
        .map_err(|e| RetrievalError::Pdf {
            path,
            message: e.to_string(),
        })?
}

fn io_err(path: &Path, e: std::io::Error) -> RetrievalError {
    RetrievalError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}

/// Loads one [`Document`] per supported file, with `metadata.source` set to the path.
///
/// Directories are walked recursively; unsupported files inside them are skipped.
/// A file named explicitly must have a supported extension. A PDF becomes one
/// document holding the text of all its pages; a PDF with no extractable text
/// (e.g. scanned images) is skipped with a warning. Output is sorted by
/// path so the index is built in a stable order.
pub async fn load_documents(paths: &[PathBuf]) -> Result<Vec<Document>, RetrievalError> {
    let mut files: Vec<PathBuf> = Vec::new();
    let mut pending: Vec<PathBuf> = Vec::new();

    for path in paths {
        let meta = tokio::fs::metadata(path).await.map_err(|e| io_err(path, e))?;
        if meta.is_dir() {
            pending.push(path.clone());
        } else if is_supported(path) {
            files.push(path.clone());
        } else {
            return Err(RetrievalError::Unsupported(path.display().to_string()));
        }
    }

    while let Some(dir) = pending.pop() {
        let mut entries = tokio::fs::read_dir(&dir).await.map_err(|e| io_err(&dir, e))?;
        while let Some(entry) = entries.next_entry().await.map_err(|e| io_err(&dir, e))? {
            let path = entry.path();
            let file_type = entry.file_type().await.map_err(|e| io_err(&path, e))?;
            if file_type.is_dir() {
                pending.push(path);
            } else if is_supported(&path) {
                files.push(path);
            } else {
                tracing::debug!(path = %path.display(), "skipping unsupported file");
            }
        }
    }

    files.sort();
    files.dedup();

    let mut documents = Vec::with_capacity(files.len());
    for file in files {
        let content = read_content(&file).await?;
        if is_pdf(&file) && content.is_empty() {
            tracing::warn!(path = %file.display(), "pdf has no extractable text, skipping");
            continue;
        }
        documents.push(
            Document::new(content).with_metadata("source", Value::from(file.display().to_string())),
        );
    }
    tracing::info!(count = documents.len(), "loaded documents");
    Ok(documents)
}
