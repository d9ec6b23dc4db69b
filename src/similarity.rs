use crate::types::Embedding;
use crate::ConfidenceError;

/// Cosine similarity of two unit-length embeddings, i.e. their dot product.
///
/// Symmetric in its arguments; `cosine(a, a)` is 1.0 within floating-point
/// tolerance. The mathematical range is `[-1, 1]`; for related natural
/// language text it usually lands in `[0, 1]`.
///
/// Embeddings from different model configurations are not comparable; a
/// dimension mismatch is rejected with [`ConfidenceError::InvalidInput`].
pub fn cosine(a: &Embedding, b: &Embedding) -> Result<f32, ConfidenceError> {
    if a.vector.len() != b.vector.len() {
        return Err(ConfidenceError::InvalidInput(format!(
            "embedding dimension mismatch: {} vs {}",
            a.vector.len(),
            b.vector.len()
        )));
    }
    Ok(a.vector.iter().zip(&b.vector).map(|(x, y)| x * y).sum())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(vector: Vec<f32>) -> Embedding {
        let dim = vector.len();
        Embedding {
            vector,
            model_name: "test".into(),
            dim,
        }
    }

    #[test]
    fn cosine_orthogonal_vectors() {
        let a = unit(vec![1.0, 0.0]);
        let b = unit(vec![0.0, 1.0]);
        assert!((cosine(&a, &b).unwrap()).abs() < 1e-6);
    }

    #[test]
    fn cosine_identical_vectors() {
        let a = unit(vec![0.6, 0.8]);
        assert!((cosine(&a, &a).unwrap() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_opposite_vectors() {
        let a = unit(vec![1.0, 0.0]);
        let b = unit(vec![-1.0, 0.0]);
        assert!((cosine(&a, &b).unwrap() + 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_is_symmetric() {
        let a = unit(vec![0.6, 0.8]);
        let b = unit(vec![0.8, 0.6]);
        let ab = cosine(&a, &b).unwrap();
        let ba = cosine(&b, &a).unwrap();
        assert!((ab - ba).abs() < 1e-7);
    }

    #[test]
    fn cosine_known_value() {
        // 45 degrees between axis-aligned and diagonal unit vectors.
        let a = unit(vec![1.0, 0.0]);
        let inv_sqrt2 = std::f32::consts::FRAC_1_SQRT_2;
        let b = unit(vec![inv_sqrt2, inv_sqrt2]);
        assert!((cosine(&a, &b).unwrap() - inv_sqrt2).abs() < 1e-6);
    }

    #[test]
    fn cosine_rejects_dimension_mismatch() {
        let a = unit(vec![1.0, 0.0]);
        let b = unit(vec![1.0, 0.0, 0.0]);
        let err = cosine(&a, &b).unwrap_err();
        assert!(matches!(err, ConfidenceError::InvalidInput(_)));
        assert!(err.to_string().contains("dimension mismatch"));
    }
}
