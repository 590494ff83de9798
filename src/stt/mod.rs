//! Speech recognition of audio chunks.

pub mod openai;
pub mod recognizer;

pub use openai::OpenAiRecognizer;
pub use recognizer::{AudioChunk, MockRecognizer, RecordedCall, Recognizer};
