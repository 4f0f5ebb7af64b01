//! Page text extraction

use std::path::Path;

/// Errors from loading a document into the viewer
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("I/O: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "pdf")]
    #[error("PDF engine: {0}")]
    Pdf(#[from] mupdf::error::Error),

    #[error("{name} is not a PDF file")]
    NotPdf { name: String },

    #[error("PDF support is not available in this build")]
    EngineUnavailable,

    #[error("{detail}")]
    Generic { detail: String },
}

impl DocumentError {
    pub fn generic(msg: impl Into<String>) -> Self {
        Self::Generic { detail: msg.into() }
    }
}

/// Text lines of one page, top to bottom
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PageText {
    pub lines: Vec<String>,
}

impl PageText {
    pub fn new<S: Into<String>>(lines: impl IntoIterator<Item = S>) -> Self {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }
}

/// Turns a PDF on disk into per-page text.
pub trait PdfTextExtractor: Send {
    fn extract_pages(&self, path: &Path) -> Result<Vec<PageText>, DocumentError>;
}

/// Extraction through mupdf's structured text
#[cfg(feature = "pdf")]
#[derive(Debug, Default, Clone, Copy)]
pub struct MupdfExtractor;

#[cfg(feature = "pdf")]
impl PdfTextExtractor for MupdfExtractor {
    fn extract_pages(&self, path: &Path) -> Result<Vec<PageText>, DocumentError> {
        use mupdf::text_page::TextBlockType;
        use mupdf::{Document, TextPageFlags};

        let doc = Document::open(path.to_string_lossy().as_ref())?;
        let page_count = doc.page_count()?.max(0) as usize;
        let mut pages = Vec::with_capacity(page_count);

        for page_num in 0..page_count {
            let page = doc.load_page(page_num as i32)?;
            let text_page = page.to_text_page(TextPageFlags::empty())?;

            let mut lines = Vec::new();
            for block in text_page.blocks() {
                if block.r#type() != TextBlockType::Text {
                    continue;
                }
                for line in block.lines() {
                    let text: String = line.chars().filter_map(|ch| ch.char()).collect();
                    let text = text.trim_end();
                    if !text.is_empty() {
                        lines.push(text.to_string());
                    }
                }
                // keep paragraph breaks between blocks
                if lines.last().is_some_and(|l| !l.is_empty()) {
                    lines.push(String::new());
                }
            }
            while lines.last().is_some_and(String::is_empty) {
                lines.pop();
            }

            pages.push(PageText { lines });
        }

        Ok(pages)
    }
}

/// Stand-in used when the binary was built without a PDF engine
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableExtractor;

impl PdfTextExtractor for UnavailableExtractor {
    fn extract_pages(&self, _path: &Path) -> Result<Vec<PageText>, DocumentError> {
        Err(DocumentError::EngineUnavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_extractor_reports_engine() {
        let result = UnavailableExtractor.extract_pages(Path::new("policy.pdf"));
        assert!(matches!(result, Err(DocumentError::EngineUnavailable)));
    }

    #[test]
    fn test_page_text_from_strs() {
        let page = PageText::new(["Deductible", "$1,500"]);
        assert_eq!(page.lines, vec!["Deductible".to_string(), "$1,500".to_string()]);
    }
}
