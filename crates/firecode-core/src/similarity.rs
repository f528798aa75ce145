//! Cosine similarity over insert-time normalized vectors

/// Reasons a vector cannot be admitted into the index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorDefect {
    /// Contains NaN or infinity
    NonFinite,
    /// All components are zero; no direction to normalize
    ZeroMagnitude,
}

impl VectorDefect {
    /// Human-readable reason for error messages
    pub fn reason(&self) -> &'static str {
        match self {
            Self::NonFinite => "contains a non-finite component",
            Self::ZeroMagnitude => "zero magnitude",
        }
    }
}

/// Normalize `v` to unit length in place.
///
/// After this, `dot(a, b)` between two normalized vectors is their cosine
/// similarity, so queries skip the per-comparison normalization.
pub fn normalize(v: &mut [f32]) -> Result<(), VectorDefect> {
    if v.iter().any(|x| !x.is_finite()) {
        return Err(VectorDefect::NonFinite);
    }

    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm == 0.0 {
        return Err(VectorDefect::ZeroMagnitude);
    }

    for x in v.iter_mut() {
        *x /= norm;
    }
    Ok(())
}

/// Dot product of two equal-length vectors
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_produces_unit_length() {
        let mut v = vec![3.0, 4.0];
        normalize(&mut v).unwrap();
        assert!((dot(&v, &v) - 1.0).abs() < 1e-6);
        assert!((v[0] - 0.6).abs() < 1e-6);
        assert!((v[1] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn normalize_rejects_zero_vector() {
        let mut v = vec![0.0, 0.0, 0.0];
        assert_eq!(normalize(&mut v), Err(VectorDefect::ZeroMagnitude));
    }

    #[test]
    fn normalize_rejects_nan() {
        let mut v = vec![1.0, f32::NAN];
        assert_eq!(normalize(&mut v), Err(VectorDefect::NonFinite));
    }

    #[test]
    fn dot_of_orthogonal_vectors_is_zero() {
        assert_eq!(dot(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
    }
}
