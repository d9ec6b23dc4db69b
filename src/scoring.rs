//! Option scoring: distinctiveness, relevance, and the weighted confidence
//! composition over a full option set.

use std::collections::HashMap;
use tracing::debug;

use crate::engine::ConfidenceEngine;
use crate::similarity::cosine;
use crate::types::Embedding;
use crate::ConfidenceError;

/// Weights for the designated correct answer: semantic similarity to itself
/// and relevance to the question dominate, distinctiveness matters less.
const CORRECT_WEIGHTS: (f32, f32, f32) = (0.4, 0.4, 0.2);
/// Weights for distractors: dissimilarity from the correct answer and
/// distinctiveness from the other options carry equal weight.
const DISTRACTOR_WEIGHTS: (f32, f32, f32) = (0.3, 0.4, 0.3);

/// Relevance from a question/option cosine similarity: peaks at 1.0 when the
/// similarity is 0.5 and falls off linearly toward both extremes. An option
/// nearly identical to the question is a giveaway or a leak; one with no
/// relation is implausible. Moderate relatedness is the target.
///
/// Similarity is clamped to `[0, 1]` first: cosine can go negative for some
/// text pairs, and the formula's intended output range is `[0.5, 1.0]`.
fn relevance_from_similarity(sim: f32) -> f32 {
    let sim = sim.clamp(0.0, 1.0);
    1.0 - (0.5 - sim).abs()
}

/// Per-option distinctiveness over batch embeddings: `1 - mean(cosine to
/// every other option)`. Requires at least 2 embeddings so the mean has a
/// non-empty denominator.
fn distinctiveness_from_embeddings(
    embeddings: &[Embedding],
) -> Result<Vec<f32>, ConfidenceError> {
    let n = embeddings.len();
    if n < 2 {
        return Err(ConfidenceError::InvalidInput(format!(
            "distinctiveness needs at least 2 options, got {n}"
        )));
    }

    let mut scores = Vec::with_capacity(n);
    for i in 0..n {
        let mut total = 0f32;
        for j in 0..n {
            if i != j {
                total += cosine(&embeddings[i], &embeddings[j])?;
            }
        }
        scores.push(1.0 - total / (n - 1) as f32);
    }
    Ok(scores)
}

impl ConfidenceEngine {
    /// Cosine similarity of two texts, embedded in one batch.
    pub fn semantic_similarity(&self, a: &str, b: &str) -> Result<f32, ConfidenceError> {
        let embeddings = self.embed(&[a, b])?;
        cosine(&embeddings[0], &embeddings[1])
    }

    /// How topically related `option` is to `question`: `1 - |0.5 - sim|`
    /// with the similarity clamped to `[0, 1]`, so the score peaks at
    /// moderate relatedness and bottoms out at 0.5 for both extremes.
    pub fn relevance(&self, question: &str, option: &str) -> Result<f32, ConfidenceError> {
        Ok(relevance_from_similarity(
            self.semantic_similarity(question, option)?,
        ))
    }

    /// Score each option by how dissimilar it is, on average, to all other
    /// options. Returned scores align index-for-index with `options`.
    ///
    /// Fewer than 2 options is an input-contract violation, not a degenerate
    /// mean.
    pub fn distinctiveness<T: AsRef<str>>(
        &self,
        options: &[T],
    ) -> Result<Vec<f32>, ConfidenceError> {
        if options.len() < 2 {
            return Err(ConfidenceError::InvalidInput(format!(
                "distinctiveness needs at least 2 options, got {}",
                options.len()
            )));
        }
        let embeddings = self.embed(options)?;
        distinctiveness_from_embeddings(&embeddings)
    }

    /// Score every option of a multiple-choice question, keyed by option
    /// text.
    ///
    /// Each option blends three sub-scores: similarity to the correct answer
    /// (rewarded for the answer itself, penalized for distractors), relevance
    /// to the question, and distinctiveness from the other options. The
    /// correct answer is weighted 0.4/0.4/0.2, distractors 0.3/0.4/0.3. The
    /// question and all options are embedded in one batch; the correct
    /// answer reuses the embedding of the option it matches.
    ///
    /// `correct_answer` must be string-equal (case-sensitive, untrimmed) to a
    /// member of `options`, and `options` needs at least 2 entries; anything
    /// else fails with [`ConfidenceError::InvalidInput`] and no partial map.
    /// If two option slots hold identical text, the later slot's score wins
    /// the key.
    pub fn score_all<T: AsRef<str>>(
        &self,
        question: &str,
        options: &[T],
        correct_answer: &str,
    ) -> Result<HashMap<String, f32>, ConfidenceError> {
        if options.len() < 2 {
            return Err(ConfidenceError::InvalidInput(format!(
                "scoring needs at least 2 options, got {}",
                options.len()
            )));
        }
        let correct_idx = options
            .iter()
            .position(|o| o.as_ref() == correct_answer)
            .ok_or_else(|| {
                ConfidenceError::InvalidInput(format!(
                    "correct answer {correct_answer:?} is not present in the options"
                ))
            })?;

        let mut texts: Vec<&str> = Vec::with_capacity(options.len() + 1);
        texts.push(question);
        texts.extend(options.iter().map(AsRef::as_ref));
        let embeddings = self.embed(&texts)?;
        let (question_emb, option_embs) = embeddings
            .split_first()
            .ok_or_else(|| ConfidenceError::Inference("embed returned no vectors".into()))?;
        let correct_emb = &option_embs[correct_idx];

        // Computed once from the same batch embeddings and reused for every
        // option.
        let distinctiveness = distinctiveness_from_embeddings(option_embs)?;

        debug!(options = options.len(), "scoring option set");

        let mut scores = HashMap::with_capacity(options.len());
        for (i, option) in options.iter().enumerate() {
            let option = option.as_ref();
            let sem = cosine(&option_embs[i], correct_emb)?;
            let is_correct = option == correct_answer;
            // Distractors are rewarded for being far from the correct
            // answer, the answer for being close to itself.
            let semantic_score = if is_correct { sem } else { 1.0 - sem };
            let relevance = relevance_from_similarity(cosine(question_emb, &option_embs[i])?);

            let (w_sem, w_rel, w_dist) = if is_correct {
                CORRECT_WEIGHTS
            } else {
                DISTRACTOR_WEIGHTS
            };
            let confidence =
                w_sem * semantic_score + w_rel * relevance + w_dist * distinctiveness[i];

            scores.insert(option.to_owned(), confidence);
        }
        Ok(scores)
    }
}
