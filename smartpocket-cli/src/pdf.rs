use anyhow::{Context, Result, anyhow, bail};
use smartpocket_ingest::join_pages;
use std::fs;
use std::path::{Path, PathBuf};

/// Page separator emitted by pdf-extract.
const FORM_FEED: char = '\u{000C}';

/// Pull the text layer out of a PDF, one page per line block. Pages with no
/// text layer (scans) contribute an empty block.
pub fn pdf_text(path: &Path) -> Result<String> {
    if !path.is_file() {
        bail!("PDF not found: {}", path.display());
    }
    let full = pdf_extract::extract_text(path)
        .map_err(|e| anyhow!("extract text from {}: {e}", path.display()))?;
    Ok(split_pages(&full))
}

fn split_pages(full: &str) -> String {
    let pages = full
        .split(FORM_FEED)
        .map(|p| if p.trim().is_empty() { None } else { Some(p) });
    join_pages(pages)
}

/// Statement text from either a PDF (extracted off the async runtime) or a
/// pre-extracted text file.
pub async fn read_statement(pdf: Option<PathBuf>, text: Option<PathBuf>) -> Result<String> {
    match (pdf, text) {
        (Some(pdf), _) => {
            log::info!("extracting text from {}", pdf.display());
            let out = tokio::task::spawn_blocking(move || pdf_text(&pdf))
                .await
                .context("PDF extraction task failed")??;
            log::debug!("extracted {} chars", out.len());
            Ok(out)
        }
        (None, Some(text)) => {
            fs::read_to_string(&text).with_context(|| format!("read {}", text.display()))
        }
        (None, None) => bail!("pass --pdf <file> or --text <file>"),
    }
}
