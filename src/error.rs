use std::io;
use thiserror::Error;

/// Errors surfaced by the confidence engine.
///
/// Scoring is all-or-nothing: no partial score map is ever returned alongside
/// an error, and nothing is retried internally.
#[derive(Debug, Error)]
pub enum ConfidenceError {
    /// Caller violated an input contract (empty option set, single-option
    /// distinctiveness, blank text, absent correct answer, mismatched
    /// embedding dimensions).
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// The ONNX model file could not be located.
    #[error("model file not found: {0}")]
    ModelNotFound(String),
    /// The tokenizer JSON is missing.
    #[error("tokenizer missing: {0}")]
    TokenizerMissing(String),
    /// Configuration is inconsistent (e.g., unknown backend mode).
    #[error("invalid engine config: {0}")]
    InvalidConfig(String),
    /// Low-level IO failures while touching the filesystem.
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    /// The embedding backend failed to produce vectors (tokenizer errors,
    /// ONNX session failures, malformed model output).
    #[error("embedding failure: {0}")]
    Inference(String),
}
