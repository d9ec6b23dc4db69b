use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Runtime configuration for a [`ConfidenceEngine`](crate::ConfidenceEngine):
/// which embedding backend to use and how to run it.
///
/// # Example
/// ```no_run
/// use confidence::{ConfidenceEngine, EngineConfig};
/// use std::path::PathBuf;
///
/// let cfg = EngineConfig {
///     model_path: PathBuf::from("models/all-MiniLM-L6-v2/onnx/model.onnx"),
///     tokenizer_path: PathBuf::from("models/all-MiniLM-L6-v2/tokenizer.json"),
///     ..Default::default()
/// };
///
/// let engine = ConfidenceEngine::from_config(&cfg).unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    /// Backend selector: `"onnx"` runs the local model, `"stub"` generates
    /// deterministic hash-derived vectors (no model files needed; intended
    /// for tests and model-free environments).
    pub mode: String,
    /// Friendly label surfaced on every [`Embedding`](crate::Embedding).
    /// Embeddings are only comparable when produced under the same model
    /// configuration.
    pub model_name: String,
    /// Local path of the ONNX model file.
    pub model_path: PathBuf,
    /// Local path of the matching `tokenizer.json`.
    pub tokenizer_path: PathBuf,
    /// Token budget per text. Longer inputs are truncated to this length
    /// before inference; truncation is the documented behavior, not an error.
    pub max_sequence_length: usize,
    /// Capacity of the per-engine LRU memo of embed results, keyed by exact
    /// input text. Embedding is a pure function of its input, so the memo is
    /// observably transparent. `0` disables it.
    pub embed_cache_size: usize,
    /// Compute device (currently only `"cpu"` is implemented; the field keeps
    /// the config forward-compatible).
    pub device: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            mode: "onnx".into(),
            model_name: "all-MiniLM-L6-v2".into(),
            model_path: PathBuf::from("./models/all-MiniLM-L6-v2/onnx/model.onnx"),
            tokenizer_path: PathBuf::from("./models/all-MiniLM-L6-v2/tokenizer.json"),
            max_sequence_length: 256,
            embed_cache_size: 1024,
            device: "cpu".into(),
        }
    }
}

impl EngineConfig {
    /// Config for the deterministic stub backend. No model assets required.
    pub fn stub() -> Self {
        Self {
            mode: "stub".into(),
            model_name: "stub-384".into(),
            ..Default::default()
        }
    }
}
