//! Whole-document overview state

use log::{debug, error, info};

use crate::rag::{BackendError, RagRequest, RagResponse, RequestId, prompt};

pub const OVERVIEW_ERROR: &str =
    "Sorry, something went wrong while generating the overview. Please try again.";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OverviewPhase {
    NoDocument,
    Loading,
    Ready(String),
    Failed(String),
}

/// Overview for the currently loaded document.
///
/// Only the most recent request is tracked; replies to anything older are
/// dropped so a quick re-upload cannot be overwritten by a slow first reply.
#[derive(Clone, Debug)]
pub struct OverviewSession {
    phase: OverviewPhase,
    file_name: Option<String>,
    pending: Option<RequestId>,
    source_pages: Vec<u32>,
}

impl Default for OverviewSession {
    fn default() -> Self {
        Self::new()
    }
}

impl OverviewSession {
    #[must_use]
    pub fn new() -> Self {
        Self {
            phase: OverviewPhase::NoDocument,
            file_name: None,
            pending: None,
            source_pages: Vec::new(),
        }
    }

    /// Start over for a freshly loaded file and return the request to send.
    pub fn begin(&mut self, file_name: &str, id: RequestId) -> RagRequest {
        info!("Requesting overview for {file_name}");
        self.phase = OverviewPhase::Loading;
        self.file_name = Some(file_name.to_string());
        self.pending = Some(id);
        self.source_pages.clear();

        RagRequest::for_file(prompt::overview_question(file_name), file_name)
    }

    /// Apply a settled request. Returns false when the reply was stale.
    pub fn resolve(&mut self, id: RequestId, result: Result<RagResponse, BackendError>) -> bool {
        if self.pending != Some(id) {
            debug!("Discarding stale overview reply {}", id.0);
            return false;
        }
        self.pending = None;

        match result {
            Ok(response) => {
                self.source_pages = response.source_pages();
                self.phase = OverviewPhase::Ready(response.answer);
            }
            Err(e) => {
                error!("Overview request failed: {e}");
                self.phase = OverviewPhase::Failed(OVERVIEW_ERROR.to_string());
            }
        }
        true
    }

    pub fn phase(&self) -> &OverviewPhase {
        &self.phase
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.phase == OverviewPhase::Loading
    }

    pub fn text(&self) -> Option<&str> {
        match &self.phase {
            OverviewPhase::Ready(text) => Some(text),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.phase {
            OverviewPhase::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn source_pages(&self) -> &[u32] {
        &self.source_pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer(text: &str) -> Result<RagResponse, BackendError> {
        Ok(RagResponse {
            answer: text.to_string(),
            chunks: vec![],
        })
    }

    #[test]
    fn test_starts_without_document() {
        let session = OverviewSession::new();
        assert_eq!(session.phase(), &OverviewPhase::NoDocument);
        assert!(session.file_name().is_none());
    }

    #[test]
    fn test_begin_then_ready() {
        let mut session = OverviewSession::new();
        let request = session.begin("policy.pdf", RequestId::new(1));

        assert!(session.is_loading());
        assert_eq!(session.file_name(), Some("policy.pdf"));
        assert_eq!(request.file_name.as_deref(), Some("policy.pdf"));

        assert!(session.resolve(RequestId::new(1), answer("This is a Summary of Benefits...")));
        assert_eq!(session.text(), Some("This is a Summary of Benefits..."));
        assert!(!session.is_loading());
    }

    #[test]
    fn test_failure_uses_fixed_message() {
        let mut session = OverviewSession::new();
        session.begin("policy.pdf", RequestId::new(7));
        session.resolve(
            RequestId::new(7),
            Err(BackendError::Status {
                endpoint: "/api/rag/overview",
                status: 500,
            }),
        );

        assert_eq!(session.error(), Some(OVERVIEW_ERROR));
        assert!(!session.is_loading());
    }

    #[test]
    fn test_reupload_restarts_loading() {
        let mut session = OverviewSession::new();
        session.begin("a.pdf", RequestId::new(1));
        session.resolve(RequestId::new(1), answer("A"));

        session.begin("b.pdf", RequestId::new(2));
        assert!(session.is_loading());
        assert_eq!(session.file_name(), Some("b.pdf"));
        assert!(session.text().is_none());
    }

    #[test]
    fn test_stale_reply_is_discarded() {
        let mut session = OverviewSession::new();
        session.begin("a.pdf", RequestId::new(1));
        session.begin("b.pdf", RequestId::new(2));

        assert!(!session.resolve(RequestId::new(1), answer("overview of a")));
        assert!(session.is_loading());

        assert!(session.resolve(RequestId::new(2), answer("overview of b")));
        assert_eq!(session.text(), Some("overview of b"));
    }
}
