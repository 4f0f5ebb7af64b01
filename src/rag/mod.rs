//! RAG backend access

mod client;
pub mod prompt;
mod request;
mod service;

pub use client::{BackendClient, BackendError, RagBackend};
pub use request::{Endpoint, Passage, RagRequest, RagResponse, RequestId, SupportingChunk};
pub use service::{DEFAULT_WORKERS, RagReply, RagService};
