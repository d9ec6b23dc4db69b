use lru::LruCache;
use std::cell::RefCell;
use std::num::NonZeroUsize;
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::normalize::l2_normalize_in_place;
use crate::onnx::OnnxBackend;
use crate::stub::stub_vector;
use crate::types::Embedding;
use crate::ConfidenceError;

enum Backend {
    Onnx(OnnxBackend),
    Stub,
}

/// The scoring engine: owns the embedding backend handle and exposes
/// [`embed`](Self::embed) plus the scoring operations (`score_all`,
/// `distinctiveness`, `relevance`, `semantic_similarity`).
///
/// Construct once at process start and reuse; construction loads the
/// tokenizer and model, after which no call touches disk or network. The
/// engine is `!Sync` because the ONNX session requires exclusive access to
/// run; use one engine per thread for parallel scoring.
pub struct ConfidenceEngine {
    model_name: String,
    backend: Backend,
    // Memo of normalized vectors keyed by exact input text. Embedding is a
    // pure function of its input, so hits are observably identical to
    // recomputation.
    embed_cache: Option<RefCell<LruCache<String, Vec<f32>>>>,
}

impl std::fmt::Debug for ConfidenceEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfidenceEngine")
            .field("model_name", &self.model_name)
            .field(
                "backend",
                match self.backend {
                    Backend::Onnx(_) => &"onnx",
                    Backend::Stub => &"stub",
                },
            )
            .finish_non_exhaustive()
    }
}

impl ConfidenceEngine {
    /// Build an engine from `cfg`, loading model assets for the `"onnx"`
    /// backend or none at all for `"stub"`.
    pub fn from_config(cfg: &EngineConfig) -> Result<Self, ConfidenceError> {
        let backend = match cfg.mode.as_str() {
            "onnx" => Backend::Onnx(OnnxBackend::load(cfg)?),
            "stub" => Backend::Stub,
            other => {
                return Err(ConfidenceError::InvalidConfig(format!(
                    "unknown backend mode '{other}' (expected \"onnx\" or \"stub\")"
                )))
            }
        };

        let embed_cache = NonZeroUsize::new(cfg.embed_cache_size)
            .map(|cap| RefCell::new(LruCache::new(cap)));

        info!(
            mode = %cfg.mode,
            model = %cfg.model_name,
            cache = cfg.embed_cache_size,
            "confidence engine ready"
        );

        Ok(Self {
            model_name: cfg.model_name.clone(),
            backend,
            embed_cache,
        })
    }

    /// Name of the model behind this engine's embeddings.
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Embed a batch of texts, preserving input order and length.
    ///
    /// All texts go through the backend in a single inference pass; batching
    /// is guaranteed to match per-text embedding elementwise (padding is
    /// masked out of the pooling), so callers may group texts freely. Every
    /// returned vector is L2-normalized to unit length.
    ///
    /// Fails with [`ConfidenceError::InvalidInput`] on an empty slice or any
    /// blank (whitespace-only) text; backend failures surface as
    /// [`ConfidenceError::Inference`].
    pub fn embed<T: AsRef<str>>(&self, texts: &[T]) -> Result<Vec<Embedding>, ConfidenceError> {
        if texts.is_empty() {
            return Err(ConfidenceError::InvalidInput(
                "cannot embed an empty batch of texts".into(),
            ));
        }
        for text in texts {
            if text.as_ref().trim().is_empty() {
                return Err(ConfidenceError::InvalidInput(
                    "cannot embed blank text".into(),
                ));
            }
        }

        let mut vectors: Vec<Option<Vec<f32>>> = vec![None; texts.len()];

        if let Some(cache) = &self.embed_cache {
            let mut cache = cache.borrow_mut();
            for (slot, text) in vectors.iter_mut().zip(texts) {
                if let Some(hit) = cache.get(text.as_ref()) {
                    *slot = Some(hit.clone());
                }
            }
        }

        let miss_indices: Vec<usize> = vectors
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.is_none().then_some(i))
            .collect();

        debug!(
            batch = texts.len(),
            misses = miss_indices.len(),
            "embedding batch"
        );

        if !miss_indices.is_empty() {
            let miss_texts: Vec<&str> = miss_indices.iter().map(|&i| texts[i].as_ref()).collect();
            let raw = match &self.backend {
                Backend::Onnx(model) => model.embed_batch(&miss_texts)?,
                Backend::Stub => miss_texts.iter().map(|t| stub_vector(t)).collect(),
            };
            if raw.len() != miss_texts.len() {
                return Err(ConfidenceError::Inference(format!(
                    "backend returned {} embeddings for {} inputs",
                    raw.len(),
                    miss_texts.len()
                )));
            }

            for (&i, mut vector) in miss_indices.iter().zip(raw) {
                l2_normalize_in_place(&mut vector);
                if let Some(cache) = &self.embed_cache {
                    cache
                        .borrow_mut()
                        .put(texts[i].as_ref().to_owned(), vector.clone());
                }
                vectors[i] = Some(vector);
            }
        }

        let mut embeddings = Vec::with_capacity(texts.len());
        for vector in vectors {
            let vector = vector.ok_or_else(|| {
                ConfidenceError::Inference("embedding slot left unfilled".into())
            })?;
            embeddings.push(Embedding {
                dim: vector.len(),
                model_name: self.model_name.clone(),
                vector,
            });
        }
        Ok(embeddings)
    }
}
