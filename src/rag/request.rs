//! Wire types for the RAG backend

use serde::{Deserialize, Serialize};

/// Unique identifier for backend requests
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RequestId(pub u64);

impl RequestId {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }
}

/// The two question endpoints the backend exposes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Whole-document summary, scoped by file name
    Overview,
    /// Questions about a selected passage
    Highlight,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Overview => "/api/rag/overview",
            Endpoint::Highlight => "/api/rag/highlight",
        }
    }
}

/// Request body sent to either endpoint
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RagRequest {
    pub question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

impl RagRequest {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            file_name: None,
        }
    }

    pub fn for_file(question: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            file_name: Some(file_name.into()),
        }
    }
}

/// Response body returned by either endpoint
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct RagResponse {
    pub answer: String,
    #[serde(default)]
    pub chunks: Vec<SupportingChunk>,
}

impl RagResponse {
    /// Distinct page numbers cited by the supporting chunks, ascending.
    pub fn source_pages(&self) -> Vec<u32> {
        let mut pages: Vec<u32> = self
            .chunks
            .iter()
            .filter_map(|chunk| match chunk {
                SupportingChunk::Passage(passage) => passage.page,
                SupportingChunk::Opaque(_) => None,
            })
            .collect();
        pages.sort_unstable();
        pages.dedup();
        pages
    }
}

/// One retrieved fragment backing an answer.
///
/// The backend treats this list as opaque. Objects carrying the usual
/// retrieval fields are decoded as [`Passage`]; anything else is kept verbatim.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SupportingChunk {
    Passage(Passage),
    Opaque(serde_json::Value),
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Passage {
    #[serde(default)]
    pub chunk: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub pdf: Option<String>,
}
