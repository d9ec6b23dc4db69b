use once_cell::sync::OnceCell;
use onnxruntime::environment::Environment;
use onnxruntime::ndarray::{Array, Array2};
use onnxruntime::session::Session;
use std::cell::RefCell;
use tokenizers::Tokenizer;

use crate::config::EngineConfig;
use crate::ConfidenceError;

/// Floor for the mean-pooling divisor. A text that tokenizes to zero
/// non-padding tokens would otherwise divide by zero; the floor keeps the
/// computation total and finite instead of raising.
const MIN_POOL_DENOM: f32 = 1e-9;

static ORT_ENV: OnceCell<Environment> = OnceCell::new();

fn ort_environment() -> Result<&'static Environment, ConfidenceError> {
    ORT_ENV.get_or_try_init(|| {
        Environment::builder()
            .with_name("confidence")
            .build()
            .map_err(|e| ConfidenceError::Inference(e.to_string()))
    })
}

/// Local embedding backend: a sentence-transformer ONNX model plus its
/// tokenizer, loaded once at engine construction and reused for every call.
///
/// The session needs `&mut` to run, so it lives behind a `RefCell` and the
/// backend is deliberately `!Sync`. Callers that want parallel scoring build
/// one engine per thread or serialize externally.
pub(crate) struct OnnxBackend {
    tokenizer: Tokenizer,
    session: RefCell<Session<'static>>,
    max_sequence_length: usize,
}

impl OnnxBackend {
    pub(crate) fn load(cfg: &EngineConfig) -> Result<Self, ConfidenceError> {
        if cfg.max_sequence_length == 0 {
            return Err(ConfidenceError::InvalidConfig(
                "max_sequence_length must be at least 1".into(),
            ));
        }
        if !cfg.model_path.exists() {
            return Err(ConfidenceError::ModelNotFound(
                cfg.model_path.display().to_string(),
            ));
        }
        if !cfg.tokenizer_path.exists() {
            return Err(ConfidenceError::TokenizerMissing(
                cfg.tokenizer_path.display().to_string(),
            ));
        }

        let tokenizer = Tokenizer::from_file(&cfg.tokenizer_path)
            .map_err(|e| ConfidenceError::Inference(e.to_string()))?;

        let env = ort_environment()?;
        let session = env
            .new_session_builder()
            .map_err(|e| ConfidenceError::Inference(e.to_string()))?
            .with_model_from_file(cfg.model_path.clone())
            .map_err(|e| ConfidenceError::Inference(e.to_string()))?;

        Ok(Self {
            tokenizer,
            session: RefCell::new(session),
            max_sequence_length: cfg.max_sequence_length,
        })
    }

    /// Embed a batch of texts in one inference pass: tokenize, truncate to
    /// the configured token budget, pad to the longest sequence in the batch,
    /// run the model, then mean-pool token states under the attention mask.
    ///
    /// Padding rows carry a zero mask, so batching texts of different lengths
    /// produces the same pooled vectors as embedding each text alone.
    /// Vectors are returned unnormalized; the engine normalizes.
    pub(crate) fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, ConfidenceError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let (encoded, max_len) = self.encode_texts(texts)?;
        let (input_ids, attn_mask) = build_padded_arrays(encoded, max_len)?;
        let token_states = self.execute_session(input_ids, &attn_mask)?;
        mean_pool(&token_states, &attn_mask)
    }

    fn encode_texts(&self, texts: &[&str]) -> Result<(Vec<EncodedText>, usize), ConfidenceError> {
        let mut encoded = Vec::with_capacity(texts.len());
        let mut max_len = 0usize;

        for text in texts {
            let encoding = self
                .tokenizer
                .encode(*text, true)
                .map_err(|e| ConfidenceError::Inference(e.to_string()))?;
            let mut ids: Vec<i64> = encoding.get_ids().iter().map(|&x| x as i64).collect();
            let mut mask: Vec<i64> = encoding
                .get_attention_mask()
                .iter()
                .map(|&x| x as i64)
                .collect();
            // Over-budget texts are truncated, never rejected.
            if ids.len() > self.max_sequence_length {
                ids.truncate(self.max_sequence_length);
                mask.truncate(self.max_sequence_length);
            }
            max_len = max_len.max(ids.len());
            encoded.push(EncodedText { ids, mask });
        }

        Ok((encoded, max_len))
    }

    fn execute_session(
        &self,
        input_ids: Array2<i64>,
        attn_mask: &Array2<i64>,
    ) -> Result<Vec<f32>, ConfidenceError> {
        let (batch, seq_len) = input_ids.dim();
        let mut guard = self.session.borrow_mut();
        let session_ref = &mut *guard;
        let mut runtime_inputs = Vec::with_capacity(session_ref.inputs.len());
        let mut input_ids_tensor = Some(input_ids);
        let mut attn_mask_tensor = Some(attn_mask.clone());

        for input in &session_ref.inputs {
            match input.name.as_str() {
                "input_ids" => {
                    let tensor = input_ids_tensor.take().ok_or_else(|| {
                        ConfidenceError::InvalidConfig(
                            "model requested `input_ids` multiple times".into(),
                        )
                    })?;
                    runtime_inputs.push(tensor.into_dyn());
                }
                "attention_mask" => {
                    let tensor = attn_mask_tensor.take().ok_or_else(|| {
                        ConfidenceError::InvalidConfig(
                            "model requested `attention_mask` multiple times".into(),
                        )
                    })?;
                    runtime_inputs.push(tensor.into_dyn());
                }
                "token_type_ids" => {
                    let tensor = Array::from_elem((batch, seq_len), 0_i64);
                    runtime_inputs.push(tensor.into_dyn());
                }
                other => {
                    return Err(ConfidenceError::Inference(format!(
                        "unsupported model input '{other}'"
                    )))
                }
            }
        }

        if runtime_inputs.is_empty() {
            return Err(ConfidenceError::Inference(
                "model did not declare any inputs".into(),
            ));
        }

        let outputs = session_ref
            .run::<i64, f32, _>(runtime_inputs)
            .map_err(|e| ConfidenceError::Inference(e.to_string()))?;
        // First output is the token-level hidden state tensor
        // [batch, seq_len, hidden] for sentence-transformer exports.
        let output_tensor = outputs
            .into_iter()
            .next()
            .ok_or_else(|| ConfidenceError::Inference("model returned no outputs".into()))?;

        Ok(output_tensor.iter().copied().collect())
    }
}

struct EncodedText {
    ids: Vec<i64>,
    mask: Vec<i64>,
}

fn build_padded_arrays(
    encoded: Vec<EncodedText>,
    max_len: usize,
) -> Result<(Array2<i64>, Array2<i64>), ConfidenceError> {
    let seq_len = max_len.max(1);
    let batch = encoded.len();
    let mut id_storage = Vec::with_capacity(batch * seq_len);
    let mut mask_storage = Vec::with_capacity(batch * seq_len);

    for EncodedText { ids, mask } in encoded {
        if ids.len() != mask.len() {
            return Err(ConfidenceError::Inference(
                "tokenizer produced mismatched id/mask lengths".into(),
            ));
        }
        let pad = seq_len.saturating_sub(ids.len());
        id_storage.extend(ids);
        mask_storage.extend(mask);
        if pad > 0 {
            id_storage.extend(std::iter::repeat(0).take(pad));
            mask_storage.extend(std::iter::repeat(0).take(pad));
        }
    }

    let input_ids = Array::from_shape_vec((batch, seq_len), id_storage)
        .map_err(|e| ConfidenceError::Inference(e.to_string()))?;
    let attn_mask = Array::from_shape_vec((batch, seq_len), mask_storage)
        .map_err(|e| ConfidenceError::Inference(e.to_string()))?;
    Ok((input_ids, attn_mask))
}

/// Mean-pool token hidden states into one vector per batch row, weighting
/// each token by its attention mask so padding contributes nothing. The
/// divisor is the non-padding token count floored at [`MIN_POOL_DENOM`].
fn mean_pool(token_states: &[f32], attn_mask: &Array2<i64>) -> Result<Vec<Vec<f32>>, ConfidenceError> {
    let (batch, seq_len) = attn_mask.dim();
    if batch == 0 {
        return Ok(Vec::new());
    }
    let cells = batch * seq_len;
    if cells == 0 || token_states.is_empty() || !token_states.len().is_multiple_of(cells) {
        return Err(ConfidenceError::Inference(format!(
            "model output of {} values does not factor into {} x {} token states",
            token_states.len(),
            batch,
            seq_len
        )));
    }
    let hidden = token_states.len() / cells;

    let mut pooled = Vec::with_capacity(batch);
    for b in 0..batch {
        let mut sum = vec![0f32; hidden];
        let mut token_count = 0f32;
        for t in 0..seq_len {
            if attn_mask[[b, t]] == 0 {
                continue;
            }
            token_count += 1.0;
            let base = (b * seq_len + t) * hidden;
            for (dst, src) in sum.iter_mut().zip(&token_states[base..base + hidden]) {
                *dst += src;
            }
        }
        let denom = token_count.max(MIN_POOL_DENOM);
        for value in &mut sum {
            *value /= denom;
        }
        pooled.push(sum);
    }
    Ok(pooled)
}
