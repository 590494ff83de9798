use crate::error::{Result, VidscribeError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// One chunk of encoded audio handed to a recognizer.
#[derive(Debug, Clone, Copy)]
pub struct AudioChunk<'a> {
    /// Position of the chunk in the plan.
    pub index: usize,
    /// Encoded audio bytes (a slice of the full stream).
    pub bytes: &'a [u8],
    /// Media type of the container, e.g. `audio/webm`.
    pub media_type: &'a str,
    /// File extension used when the service wants a file name.
    pub extension: &'a str,
    /// Forced language code. `None` lets the service auto-detect.
    pub language: Option<&'a str>,
}

impl AudioChunk<'_> {
    /// File name sent alongside the upload.
    pub fn file_name(&self) -> String {
        format!("chunk-{}.{}", self.index, self.extension)
    }
}

/// Trait for speech recognition of a single audio chunk.
///
/// This trait allows swapping implementations (remote service vs mock).
/// Errors are returned to the caller as is; implementations never retry.
#[async_trait]
pub trait Recognizer: Send + Sync {
    /// Recognize one chunk and return its text.
    async fn recognize(&self, chunk: AudioChunk<'_>) -> Result<String>;

    /// Name of the model doing the recognition.
    fn model_name(&self) -> &str;
}

/// Implement Recognizer for Arc<T> to allow sharing across requests.
#[async_trait]
impl<T: Recognizer + ?Sized> Recognizer for Arc<T> {
    async fn recognize(&self, chunk: AudioChunk<'_>) -> Result<String> {
        (**self).recognize(chunk).await
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

/// A call observed by `MockRecognizer`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub index: usize,
    pub length: usize,
    pub media_type: String,
    pub language: Option<String>,
}

/// Mock recognizer for testing.
///
/// Replies with scripted responses in call order, then with the default
/// response once the script runs out.
#[derive(Debug, Default)]
pub struct MockRecognizer {
    model_name: String,
    default_response: String,
    script: Mutex<VecDeque<std::result::Result<String, String>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockRecognizer {
    /// Create a new mock recognizer with default settings
    pub fn new(model_name: &str) -> Self {
        Self {
            model_name: model_name.to_string(),
            default_response: "mock transcription".to_string(),
            ..Self::default()
        }
    }

    /// Configure the response used when the script is exhausted
    pub fn with_response(mut self, response: &str) -> Self {
        self.default_response = response.to_string();
        self
    }

    /// Queue a successful response
    pub fn then_text(self, text: &str) -> Self {
        self.push(Ok(text.to_string()));
        self
    }

    /// Queue a failure
    pub fn then_failure(self, message: &str) -> Self {
        self.push(Err(message.to_string()));
        self
    }

    fn push(&self, entry: std::result::Result<String, String>) {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(entry);
        }
    }

    /// Calls received so far.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    /// Number of calls received so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|calls| calls.len()).unwrap_or(0)
    }
}

#[async_trait]
impl Recognizer for MockRecognizer {
    async fn recognize(&self, chunk: AudioChunk<'_>) -> Result<String> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedCall {
                index: chunk.index,
                length: chunk.bytes.len(),
                media_type: chunk.media_type.to_string(),
                language: chunk.language.map(str::to_string),
            });
        }

        let next = self.script.lock().ok().and_then(|mut s| s.pop_front());
        match next {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(VidscribeError::Recognition {
                chunk: chunk.index,
                message,
            }),
            None => Ok(self.default_response.clone()),
        }
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
