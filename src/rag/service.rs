//! Backend service - runs questions on worker threads so the UI loop never blocks

use std::sync::Arc;

use flume::{Receiver, Sender};
use log::{debug, warn};

use super::client::{BackendError, RagBackend};
use super::request::{Endpoint, RagRequest, RagResponse, RequestId};

pub const DEFAULT_WORKERS: usize = 2;

/// Work sent to backend workers
#[derive(Debug)]
enum Job {
    Ask {
        id: RequestId,
        endpoint: Endpoint,
        request: RagRequest,
    },
    Shutdown,
}

/// A settled backend call
#[derive(Debug)]
pub struct RagReply {
    pub id: RequestId,
    pub endpoint: Endpoint,
    pub result: Result<RagResponse, BackendError>,
}

/// Issues backend calls off the UI thread and hands back replies on poll.
///
/// Calls are fire-and-observe: nothing in flight can be cancelled, and
/// callers decide whether a reply is still relevant by its [`RequestId`].
pub struct RagService {
    request_tx: Sender<Job>,
    response_rx: Receiver<RagReply>,
    next_request_id: u64,
    num_workers: usize,
}

impl RagService {
    #[must_use]
    pub fn new(backend: Arc<dyn RagBackend>) -> Self {
        Self::with_workers(backend, DEFAULT_WORKERS)
    }

    #[must_use]
    pub fn with_workers(backend: Arc<dyn RagBackend>, num_workers: usize) -> Self {
        let (request_tx, request_rx) = flume::unbounded();
        let (response_tx, response_rx) = flume::unbounded();

        for _ in 0..num_workers.max(1) {
            let rx = request_rx.clone();
            let tx = response_tx.clone();
            let backend = backend.clone();

            std::thread::spawn(move || {
                rag_worker(backend, rx, tx);
            });
        }

        Self {
            request_tx,
            response_rx,
            next_request_id: 1,
            num_workers: num_workers.max(1),
        }
    }

    /// Reserve the id for the next request
    pub fn next_id(&mut self) -> RequestId {
        let id = RequestId::new(self.next_request_id);
        self.next_request_id += 1;
        id
    }

    /// Queue a question for the backend
    pub fn send(&self, id: RequestId, endpoint: Endpoint, request: RagRequest) {
        debug!("Queueing {:?} request {}", endpoint, id.0);
        if self
            .request_tx
            .send(Job::Ask {
                id,
                endpoint,
                request,
            })
            .is_err()
        {
            warn!("Backend workers are gone, dropping request {}", id.0);
        }
    }

    /// Drain every reply that has settled since the last poll
    pub fn poll_replies(&self) -> Vec<RagReply> {
        let mut replies = vec![];
        while let Ok(reply) = self.response_rx.try_recv() {
            replies.push(reply);
        }
        replies
    }

    pub fn shutdown(&self) {
        for _ in 0..self.num_workers {
            let _ = self.request_tx.send(Job::Shutdown);
        }
    }
}

impl Drop for RagService {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn rag_worker(backend: Arc<dyn RagBackend>, rx: Receiver<Job>, tx: Sender<RagReply>) {
    while let Ok(job) = rx.recv() {
        match job {
            Job::Ask {
                id,
                endpoint,
                request,
            } => {
                let result = backend.ask(endpoint, &request);
                if tx.send(RagReply { id, endpoint, result }).is_err() {
                    break;
                }
            }
            Job::Shutdown => break,
        }
    }
}
