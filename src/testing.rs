//! Recording fakes for the API and chat seams.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Result};
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value as JsonValue;
use teloxide::types::ChatId;
use tracing::subscriber::DefaultGuard;

use crate::handlers::chat::ChatTransport;
use crate::vietqr::types::ResponseEnvelope;
use crate::vietqr::ApiTransport;

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: &'static str,
    pub url: String,
    pub body: Option<JsonValue>,
}

/// Answers every request with the same envelope and records what was sent.
#[derive(Clone)]
pub struct MockTransport {
    reply: ResponseEnvelope,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::replying(ResponseEnvelope {
            code: "00".to_string(),
            desc: "ok".to_string(),
            data: None,
            error: None,
        })
    }

    pub fn replying(reply: ResponseEnvelope) -> Self {
        Self {
            reply,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    pub fn last_call(&self) -> Option<RecordedCall> {
        self.calls.lock().last().cloned()
    }
}

impl ApiTransport for MockTransport {
    async fn get(&self, url: &str) -> ResponseEnvelope {
        self.calls.lock().push(RecordedCall {
            method: "GET",
            url: url.to_string(),
            body: None,
        });
        self.reply.clone()
    }

    async fn post<B>(&self, url: &str, body: &B) -> ResponseEnvelope
    where
        B: Serialize + Sync,
    {
        self.calls.lock().push(RecordedCall {
            method: "POST",
            url: url.to_string(),
            body: serde_json::to_value(body).ok(),
        });
        self.reply.clone()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    Text(String),
    Image {
        path: PathBuf,
        caption: String,
        bytes: Vec<u8>,
    },
}

/// Chat fake that keeps every outgoing message. Image sends can be made to fail.
#[derive(Clone, Default)]
pub struct RecordingChat {
    sent: Arc<Mutex<Vec<(ChatId, Sent)>>>,
    fail_images: bool,
}

impl RecordingChat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_images() -> Self {
        Self {
            fail_images: true,
            ..Self::default()
        }
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent
            .lock()
            .iter()
            .filter_map(|(_, sent)| match sent {
                Sent::Text(text) => Some(text.clone()),
                Sent::Image { .. } => None,
            })
            .collect()
    }

    pub fn images(&self) -> Vec<Sent> {
        self.sent
            .lock()
            .iter()
            .filter(|(_, sent)| matches!(sent, Sent::Image { .. }))
            .map(|(_, sent)| sent.clone())
            .collect()
    }
}

impl ChatTransport for RecordingChat {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<()> {
        self.sent.lock().push((chat_id, Sent::Text(text.to_string())));
        Ok(())
    }

    async fn send_image_file(&self, chat_id: ChatId, path: &Path, caption: &str) -> Result<()> {
        if self.fail_images {
            return Err(anyhow!("chat rejected the photo"));
        }
        let bytes = std::fs::read(path)?;
        self.sent.lock().push((
            chat_id,
            Sent::Image {
                path: path.to_path_buf(),
                caption: caption.to_string(),
                bytes,
            },
        ));
        Ok(())
    }
}

/// Buffer that collects formatted log lines written on the current thread.
#[derive(Clone, Default)]
pub struct LogCapture {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    /// Installs a thread-local subscriber writing into the buffer until the guard drops.
    pub fn install(&self) -> DefaultGuard {
        let writer = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock()).into_owned()
    }

    pub fn count(&self, needle: &str) -> usize {
        self.contents().matches(needle).count()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
