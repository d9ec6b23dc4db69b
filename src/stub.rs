use fxhash::hash64;

/// Dimension of stub vectors, matching the default MiniLM-class model so
/// stub-backed tests exercise realistic vector widths.
pub(crate) const STUB_DIM: usize = 384;

/// Deterministic stand-in for model inference: sinusoid values derived from a
/// hash of the input text. Reproducible vectors at minimal CPU cost, used by
/// the `"stub"` backend mode. The caller normalizes, as it does for real
/// model output.
pub(crate) fn stub_vector(text: &str) -> Vec<f32> {
    let mut h = hash64(text.as_bytes());
    if h == 0 {
        // An all-zero seed would produce the zero vector, which cannot be
        // unit-normalized. Any fixed odd constant works.
        h = 0x9E37_79B9_7F4A_7C15;
    }
    let mut v = vec![0f32; STUB_DIM];
    for (idx, value) in v.iter_mut().enumerate() {
        *value = ((h >> (idx % 32)) as f32 * 0.0001).sin();
    }
    v
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stub_vector_has_expected_dim() {
        assert_eq!(stub_vector("hello world").len(), STUB_DIM);
    }

    #[test]
    fn stub_vector_is_deterministic() {
        assert_eq!(stub_vector("same text"), stub_vector("same text"));
    }

    #[test]
    fn stub_vector_differs_across_texts() {
        assert_ne!(stub_vector("hello"), stub_vector("world"));
    }

    #[test]
    fn stub_vector_is_never_all_zero() {
        for text in ["", "a", "100°C", "What is the boiling point of water?"] {
            let v = stub_vector(text);
            assert!(
                v.iter().any(|&x| x != 0.0),
                "stub vector for {text:?} must be normalizable"
            );
        }
    }

    #[test]
    fn stub_vector_values_in_sin_range() {
        for (i, &val) in stub_vector("range check").iter().enumerate() {
            assert!(
                (-1.0..=1.0).contains(&val),
                "value at index {i} is {val}, outside [-1, 1]"
            );
        }
    }

    #[test]
    fn stub_vector_unicode() {
        let v = stub_vector("Hello 世界 🌍");
        assert_eq!(v.len(), STUB_DIM);
        assert!(v.iter().any(|&x| x != 0.0));
    }
}
