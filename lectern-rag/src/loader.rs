//! PDF document loading: one [`Document`] per page.

use std::path::Path;

use tracing::{info, warn};

use crate::document::Document;
use crate::error::{RagError, Result};

/// Load a PDF into one [`Document`] per page.
///
/// `source_file` is set to the file's display name (final path component)
/// and page numbers are 1-based. A page whose text extraction fails is
/// skipped with a warning; the file as a whole only fails when it cannot
/// be parsed at all.
///
/// # Errors
///
/// Returns [`RagError::DocumentLoad`] if the file cannot be read or parsed.
pub fn load_pdf(path: &Path) -> Result<Vec<Document>> {
    let source_file = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());

    let doc = lopdf::Document::load(path).map_err(|e| RagError::DocumentLoad {
        path: path.to_path_buf(),
        message: format!("failed to parse PDF: {e}"),
    })?;

    let mut page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
    page_numbers.sort_unstable();

    let mut documents = Vec::with_capacity(page_numbers.len());
    for page_number in page_numbers {
        match doc.extract_text(&[page_number]) {
            Ok(text) => {
                documents.push(Document {
                    text,
                    source_file: source_file.clone(),
                    page_number: Some(page_number),
                });
            }
            Err(e) => {
                warn!(
                    file = %source_file,
                    page = page_number,
                    error = %e,
                    "skipping page with unextractable text"
                );
            }
        }
    }

    info!(file = %source_file, page_count = documents.len(), "loaded PDF");
    Ok(documents)
}

/// Load every `*.pdf` file in a directory, in file-name order.
///
/// Name-sorted traversal keeps chunk id assignment reproducible across
/// runs on the same corpus.
///
/// # Errors
///
/// Returns [`RagError::DocumentLoad`] if the directory cannot be read or
/// any contained PDF fails to parse.
pub fn load_pdf_dir(dir: &Path) -> Result<Vec<Document>> {
    let entries = std::fs::read_dir(dir).map_err(|e| RagError::DocumentLoad {
        path: dir.to_path_buf(),
        message: format!("failed to read directory: {e}"),
    })?;

    let mut pdf_paths: Vec<_> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().and_then(|e| e.to_str()).is_some_and(|e| e.eq_ignore_ascii_case("pdf")))
        .collect();
    pdf_paths.sort();

    let mut documents = Vec::new();
    for path in &pdf_paths {
        documents.extend(load_pdf(path)?);
    }

    info!(
        dir = %dir.display(),
        file_count = pdf_paths.len(),
        page_count = documents.len(),
        "loaded PDF directory"
    );
    Ok(documents)
}
