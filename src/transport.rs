//! Chat transport: sends the conversation to the backend and exposes the
//! reply as a stream of text chunks.
//!
//! The backend answers with plain UTF-8 text and no framing, so chunks are
//! just whatever the network delivers, decoded without splitting characters.

use std::path::PathBuf;
use std::pin::Pin;
use std::time::Instant;

use async_trait::async_trait;
use chrono::Utc;
use futures::{Stream, StreamExt};
use log::{debug, warn};
use reqwest::StatusCode;

use crate::config::Config;
use crate::errors::{ChatError, ChatResult};
use crate::logging::log_api_call;
use crate::models::{ApiCallLog, ChatRequest};

/// Decoded text fragments of a reply, in arrival order.
pub type ChunkStream = Pin<Box<dyn Stream<Item = ChatResult<String>> + Send>>;

/// Issues a chat request and returns the reply body as a chunk stream.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn open(&self, request: &ChatRequest) -> ChatResult<ChunkStream>;
}

/// Incremental UTF-8 decoder. Bytes of a character split across network
/// chunks are held back until the rest arrives; invalid bytes become U+FFFD.
#[derive(Debug, Default)]
pub struct Utf8ChunkDecoder {
    pending: Vec<u8>,
}

impl Utf8ChunkDecoder {
    pub fn decode(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);
        let mut out = String::new();
        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(text) => {
                    out.push_str(text);
                    self.pending.clear();
                    break;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&self.pending[..valid]));
                    match e.error_len() {
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            self.pending.drain(..valid + len);
                        }
                        None => {
                            // incomplete trailing sequence
                            self.pending.drain(..valid);
                            break;
                        }
                    }
                }
            }
        }
        out
    }

    /// Flushes bytes left over at end of stream.
    pub fn finish(&mut self) -> String {
        let tail = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        tail
    }
}

/// POSTs the request as JSON to the configured endpoint.
#[derive(Clone)]
pub struct HttpChatTransport {
    http: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
    api_log: Option<PathBuf>,
}

impl std::fmt::Debug for HttpChatTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpChatTransport")
            .field("api_url", &self.api_url)
            .field("api_log", &self.api_log)
            .finish()
    }
}

impl HttpChatTransport {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: api_url.into(),
            api_key: None,
            api_log: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let mut transport = Self::new(config.api_url.clone());
        transport.api_key = config.api_key.clone();
        transport.api_log = config.api_log.clone();
        transport
    }

    /// Sends `Authorization: Bearer <key>` with every request.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_api_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.api_log = Some(path.into());
        self
    }

    fn record(&self, request: &ChatRequest, status: u16, started: Instant) {
        let Some(path) = &self.api_log else {
            return;
        };
        let entry = ApiCallLog {
            timestamp: Utc::now(),
            endpoint: self.api_url.clone(),
            request_summary: request.summary(),
            response_status: status,
            response_time_ms: started.elapsed().as_millis(),
        };
        if let Err(e) = log_api_call(&entry, path) {
            warn!("Failed to write API call log: {}", e);
        }
    }
}

#[async_trait]
impl ChatTransport for HttpChatTransport {
    async fn open(&self, request: &ChatRequest) -> ChatResult<ChunkStream> {
        let started = Instant::now();
        debug!("POST {} ({})", self.api_url, request.summary());

        let mut rb = self.http.post(&self.api_url).json(request);
        if let Some(key) = &self.api_key {
            rb = rb.bearer_auth(key);
        }

        let response = match rb.send().await {
            Ok(response) => response,
            Err(e) => {
                self.record(request, 0, started);
                return Err(ChatError::network_error(format!("Request failed: {}", e)));
            }
        };

        let status = response.status();
        self.record(request, status.as_u16(), started);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::Status {
                status: status.as_u16(),
                body,
            });
        }
        if status == StatusCode::NO_CONTENT {
            return Err(ChatError::MissingBody);
        }

        let byte_stream = response.bytes_stream();
        let out = async_stream::try_stream! {
            let mut decoder = Utf8ChunkDecoder::default();

            futures::pin_mut!(byte_stream);
            while let Some(chunk) = byte_stream.next().await {
                let chunk = chunk.map_err(|e| ChatError::stream_error(e.to_string()))?;
                let text = decoder.decode(&chunk);
                if !text.is_empty() {
                    yield text;
                }
            }

            let tail = decoder.finish();
            if !tail.is_empty() {
                yield tail;
            }
        };

        Ok(Box::pin(out))
    }
}
