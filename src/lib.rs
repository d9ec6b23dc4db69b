//! Confidence scoring for multiple-choice question options.
//!
//! Given a question, an ordered set of candidate options, and the designated
//! correct answer, this crate assigns each option a confidence score that
//! estimates how well the correct answer fits the question and how well the
//! distractors work as plausible-but-wrong alternatives. Everything runs on
//! semantic embeddings: texts become unit-length vectors, and the scores are
//! blends of three cosine-similarity signals.
//!
//! - **Semantic**: similarity to the correct answer. Rewarded for the answer
//!   itself, penalized for distractors (a distractor too close to the answer
//!   is a bad distractor).
//! - **Relevance**: similarity to the question, peaking at moderate values.
//!   An option that restates the question leaks the answer; one with no
//!   relation at all fools nobody.
//! - **Distinctiveness**: average dissimilarity from the other options.
//!
//! Two embedding backends are available:
//!
//! - **ONNX mode** - Runs a sentence-transformer model locally. Requires the
//!   model and tokenizer files on disk.
//! - **Stub mode** - Deterministic hash-derived vectors. No model files;
//!   intended for tests and environments without model assets.
//!
//! The engine is constructed once (loading the model) and reused; scoring
//! calls are synchronous, pure, and never touch disk or network. Upstream
//! concerns such as question generation, PDF extraction, and HTTP serving
//! live outside this crate and hand in plain strings.
//!
//! ## Quick example
//!
//! ```no_run
//! use confidence::{ConfidenceEngine, EngineConfig};
//!
//! let engine = ConfidenceEngine::from_config(&EngineConfig::default()).unwrap();
//!
//! let scores = engine
//!     .score_all(
//!         "What is the boiling point of water at sea level?",
//!         &["100°C", "0°C", "50°C", "212°C"],
//!         "100°C",
//!     )
//!     .unwrap();
//!
//! for (option, score) in &scores {
//!     println!("{option}: {score:.3}");
//! }
//! ```

pub mod config;
pub mod error;
pub mod similarity;
pub mod types;

mod engine;
mod normalize;
mod onnx;
mod scoring;
mod stub;

pub use crate::config::EngineConfig;
pub use crate::engine::ConfidenceEngine;
pub use crate::error::ConfidenceError;
pub use crate::types::Embedding;
