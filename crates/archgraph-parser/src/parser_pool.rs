//! Thread-safe parser pool for tree-sitter parsers
//!
//! Tree-sitter parsers are not `Sync`, so each worker thread owns one and
//! requests are fed through a shared channel. Async callers never block the
//! runtime while a large file is being parsed.

use crate::error::ParseError;
use std::path::PathBuf;
use std::sync::mpsc::{Receiver, Sender};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;
use tree_sitter::{Language, Parser, Tree};

/// A parsing request sent to the parser pool
#[derive(Debug)]
pub struct ParseRequest {
    pub content: String,
    pub path: PathBuf,
}

/// Result of a parsing operation
#[derive(Debug)]
pub struct ParseResult {
    pub tree: Tree,
    pub path: PathBuf,
    pub content: String,
}

/// Internal message for the parser worker
struct WorkerRequest {
    request: ParseRequest,
    response_sender: oneshot::Sender<Result<ParseResult, ParseError>>,
}

/// Pool of parser threads sharing one grammar.
#[derive(Clone)]
pub struct ParserPool {
    sender: Sender<WorkerRequest>,
}

impl ParserPool {
    /// Create a new parser pool with the specified number of worker threads
    pub fn new(num_workers: usize, language: Language) -> Self {
        let (sender, receiver) = std::sync::mpsc::channel::<WorkerRequest>();
        let receiver = Arc::new(Mutex::new(receiver));

        for i in 0..num_workers.max(1) {
            let receiver = Arc::clone(&receiver);
            let language = language.clone();
            std::thread::spawn(move || {
                Self::worker_thread(i, receiver, language);
            });
        }

        Self { sender }
    }

    /// Worker thread function that processes parsing requests
    fn worker_thread(worker_id: usize, receiver: Arc<Mutex<Receiver<WorkerRequest>>>, language: Language) {
        tracing::debug!("Parser worker {} started", worker_id);

        let mut parser = Parser::new();
        let language_error = parser.set_language(&language).err().map(|e| e.to_string());

        loop {
            let next = match receiver.lock() {
                Ok(rx) => rx.recv(),
                Err(_) => break,
            };
            let Ok(WorkerRequest { request, response_sender }) = next else {
                break;
            };

            let result = match &language_error {
                Some(e) => Err(ParseError::Language(e.clone())),
                None => match parser.parse(&request.content, None) {
                    Some(tree) => Ok(ParseResult {
                        tree,
                        path: request.path,
                        content: request.content,
                    }),
                    None => Err(ParseError::NoTree(request.path)),
                },
            };

            if response_sender.send(result).is_err() {
                tracing::warn!("Failed to send parse result back to caller");
            }
        }

        tracing::debug!("Parser worker {} shutting down", worker_id);
    }

    fn submit(&self, request: ParseRequest) -> Result<oneshot::Receiver<Result<ParseResult, ParseError>>, ParseError> {
        let (response_sender, response_receiver) = oneshot::channel();
        self.sender
            .send(WorkerRequest {
                request,
                response_sender,
            })
            .map_err(|_| ParseError::PoolClosed)?;
        Ok(response_receiver)
    }

    /// Parse content synchronously. Must not be called from an async task.
    pub fn parse_blocking(&self, request: ParseRequest) -> Result<ParseResult, ParseError> {
        self.submit(request)?
            .blocking_recv()
            .map_err(|_| ParseError::PoolClosed)?
    }

    /// Parse content without blocking the async runtime.
    pub async fn parse(&self, request: ParseRequest) -> Result<ParseResult, ParseError> {
        self.submit(request)?
            .await
            .map_err(|_| ParseError::PoolClosed)?
    }
}

/// Default worker count, one per core (at least 2).
pub fn default_worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get().max(2))
        .unwrap_or(2)
}

pub fn rust_parser_pool(num_workers: usize) -> ParserPool {
    ParserPool::new(num_workers, tree_sitter_rust::LANGUAGE.into())
}

pub fn create_rust_parser_pool() -> ParserPool {
    rust_parser_pool(default_worker_count())
}
