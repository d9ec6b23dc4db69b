use serde::{Deserialize, Serialize};

/// A unit-L2-normalized embedding of one input text.
///
/// Two embeddings are only comparable when produced under the same model
/// configuration; [`cosine`](crate::similarity::cosine) rejects dimension
/// mismatches.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Embedding {
    /// Unit-length vector values.
    pub vector: Vec<f32>,
    /// Name of the model used to produce the vector.
    pub model_name: String,
    /// Dimension of `vector`.
    pub dim: usize,
}

impl Embedding {
    /// L2 norm of the vector. Expected to be 1.0 within floating-point
    /// tolerance for anything produced by the engine.
    pub fn l2_norm(&self) -> f32 {
        self.vector.iter().map(|x| x * x).sum::<f32>().sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedding_l2_norm() {
        let e = Embedding {
            vector: vec![0.6, 0.8],
            model_name: "test".into(),
            dim: 2,
        };
        assert!((e.l2_norm() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn embedding_serde_roundtrip() {
        let e = Embedding {
            vector: vec![0.1, 0.2, 0.3, 0.4],
            model_name: "all-MiniLM-L6-v2".into(),
            dim: 4,
        };

        let serialized = serde_json::to_string(&e).unwrap();
        let deserialized: Embedding = serde_json::from_str(&serialized).unwrap();

        assert_eq!(e, deserialized);
    }

    #[test]
    fn embedding_clone_eq() {
        let e = Embedding {
            vector: vec![1.0, 0.0],
            model_name: "test".into(),
            dim: 2,
        };
        assert_eq!(e, e.clone());
    }
}
