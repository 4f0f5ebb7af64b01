//! Conversation about the current text selection

use std::collections::HashSet;

use log::{debug, error};

use crate::rag::{BackendError, RagRequest, RagResponse, RequestId, prompt};

pub const HIGHLIGHT_APOLOGY: &str =
    "Sorry, I couldn't get an answer about this passage right now. Please try again.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    /// Pages cited by the backend for this reply
    pub sources: Vec<u32>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            sources: Vec::new(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            sources: Vec::new(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HighlightPhase {
    Idle,
    AwaitingAnswer,
    Conversing,
}

/// Selected text plus the append-only conversation about it.
///
/// Replacing or clearing the selection discards the conversation along with
/// every request still in flight for it.
#[derive(Clone, Debug)]
pub struct HighlightSession {
    selected: Option<String>,
    messages: Vec<ChatMessage>,
    phase: HighlightPhase,
    in_flight: HashSet<RequestId>,
}

impl Default for HighlightSession {
    fn default() -> Self {
        Self::new()
    }
}

impl HighlightSession {
    #[must_use]
    pub fn new() -> Self {
        Self {
            selected: None,
            messages: Vec::new(),
            phase: HighlightPhase::Idle,
            in_flight: HashSet::new(),
        }
    }

    /// A new selection replaces the previous conversation.
    /// Returns the request explaining the passage, or None for blank text.
    pub fn select(&mut self, text: &str, id: RequestId) -> Option<RagRequest> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        self.selected = Some(text.to_string());
        self.messages.clear();
        self.in_flight.clear();
        self.in_flight.insert(id);
        self.phase = HighlightPhase::AwaitingAnswer;

        Some(RagRequest::new(prompt::highlight_question(text)))
    }

    pub fn clear(&mut self) {
        self.selected = None;
        self.messages.clear();
        self.in_flight.clear();
        self.phase = HighlightPhase::Idle;
    }

    /// Record the user's question right away and return the request for it.
    /// Blank questions and questions without a selection change nothing.
    pub fn follow_up(&mut self, question: &str, id: RequestId) -> Option<RagRequest> {
        let question = question.trim();
        if question.is_empty() {
            return None;
        }
        let selected = self.selected.as_deref()?;

        let request = RagRequest::new(prompt::follow_up_question(selected, question));
        self.messages.push(ChatMessage::user(question));
        self.in_flight.insert(id);

        Some(request)
    }

    /// Append the assistant reply (or apology). Returns false when the
    /// request belonged to a conversation that has since been discarded.
    pub fn resolve(&mut self, id: RequestId, result: Result<RagResponse, BackendError>) -> bool {
        if !self.in_flight.remove(&id) {
            debug!("Discarding highlight reply {} for a replaced selection", id.0);
            return false;
        }

        let message = match result {
            Ok(response) => ChatMessage {
                role: Role::Assistant,
                sources: response.source_pages(),
                content: response.answer,
            },
            Err(e) => {
                error!("Highlight request failed: {e}");
                ChatMessage::assistant(HIGHLIGHT_APOLOGY)
            }
        };

        self.messages.push(message);
        self.phase = HighlightPhase::Conversing;
        true
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn phase(&self) -> HighlightPhase {
        self.phase
    }

    /// True while any reply for this conversation is outstanding
    pub fn is_waiting(&self) -> bool {
        !self.in_flight.is_empty()
    }
}
