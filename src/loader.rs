//! Document loading from the filesystem.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::document::{Document, Page};
use crate::error::{RagError, Result};

/// Reads raw source documents and produces ordered page records.
///
/// External collaborator seam: the pipeline only depends on this trait, so
/// PDF extractors, scrapers, or test fixtures plug in interchangeably.
pub trait DocumentLoader: Send + Sync {
    /// Load all documents, each with its pages in reading order.
    fn load(&self) -> Result<Vec<Document>>;
}

/// Renders document pages as images for human preview.
///
/// UI-only collaborator: the query path never calls it.
pub trait PreviewRenderer: Send + Sync {
    /// Render preview images for a document, returning the image paths.
    fn render_preview(&self, document_id: &str) -> Result<Vec<PathBuf>>;
}

/// Loads plain-text reports from a directory.
///
/// One document per `.txt` file, identified by file stem; form feeds
/// (`\x0c`) separate pages within a file. Files are read in sorted filename
/// order so rebuilds see documents in the same order.
pub struct TextDirectoryLoader {
    dir: PathBuf,
}

impl TextDirectoryLoader {
    /// Create a loader over the given directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

fn load_error(path: &Path, err: &std::io::Error) -> RagError {
    RagError::Load { path: path.display().to_string(), message: err.to_string() }
}

impl DocumentLoader for TextDirectoryLoader {
    fn load(&self) -> Result<Vec<Document>> {
        let dir_entries = fs::read_dir(&self.dir).map_err(|e| load_error(&self.dir, &e))?;

        let mut paths: Vec<PathBuf> = Vec::new();
        for entry in dir_entries {
            let entry = entry.map_err(|e| load_error(&self.dir, &e))?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "txt") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut documents = Vec::with_capacity(paths.len());
        for path in paths {
            let text = fs::read_to_string(&path).map_err(|e| load_error(&path, &e))?;
            let id = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .map(str::to_string)
                .ok_or_else(|| RagError::Load {
                    path: path.display().to_string(),
                    message: "file name is not valid UTF-8".to_string(),
                })?;
            let pages = text
                .split('\x0c')
                .enumerate()
                .map(|(index, page_text)| Page {
                    document_id: id.clone(),
                    index,
                    text: page_text.to_string(),
                })
                .collect();
            documents.push(Document { id, pages });
        }

        info!(document_count = documents.len(), dir = %self.dir.display(), "loaded documents");
        Ok(documents)
    }
}
