//! Cosine similarity over embedding vectors.

use super::embedding::Embedding;

/// Cosine similarity of two vectors, in `[-1.0, 1.0]`
///
/// Zero-norm vectors and length mismatches yield `0.0`.
pub fn cosine(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 || !denom.is_finite() {
        return 0.0;
    }

    (dot / denom).clamp(-1.0, 1.0)
}

/// Pairwise similarity matrix; entry `[i][j]` compares `a[i]` with `b[j]`
pub fn cosine_similarity(a: &[Embedding], b: &[Embedding]) -> Vec<Vec<f32>> {
    a.iter()
        .map(|row| b.iter().map(|col| cosine(row, col)).collect())
        .collect()
}

/// Index of the largest value, first occurrence on ties
///
/// NaN entries are skipped; `None` when nothing is comparable.
pub fn argmax(values: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;

    for (i, &value) in values.iter().enumerate() {
        if value.is_nan() {
            continue;
        }
        match best {
            Some((_, max)) if value <= max => {}
            _ => best = Some((i, value)),
        }
    }

    best.map(|(i, _)| i)
}

/// Column index of the maximum in `matrix[row]`
pub fn argmax_row(matrix: &[Vec<f32>], row: usize) -> Option<usize> {
    matrix.get(row).and_then(|values| argmax(values))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f32, expected: f32) {
        assert!(
            (actual - expected).abs() < 1e-6,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_cosine_identical() {
        let v = vec![1.0, 2.0, 3.0];
        assert_close(cosine(&v, &v), 1.0);
    }

    #[test]
    fn test_cosine_orthogonal() {
        assert_close(cosine(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
    }

    #[test]
    fn test_cosine_opposite() {
        assert_close(cosine(&[1.0, 0.0], &[-1.0, 0.0]), -1.0);
    }

    #[test]
    fn test_cosine_ignores_magnitude() {
        assert_close(cosine(&[1.0, 1.0], &[10.0, 10.0]), 1.0);
    }

    #[test]
    fn test_zero_vector_is_zero() {
        assert_eq!(cosine(&[0.0, 0.0, 0.0], &[1.0, 2.0, 3.0]), 0.0);
        assert_eq!(cosine(&[0.0, 0.0], &[0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_length_mismatch_is_zero() {
        assert_eq!(cosine(&[1.0, 2.0], &[1.0]), 0.0);
        assert_eq!(cosine(&[], &[]), 0.0);
    }

    #[test]
    fn test_symmetric_and_bounded() {
        let vectors: Vec<Embedding> = vec![
            vec![0.3, -1.2, 4.0, 0.0],
            vec![-0.7, 0.1, 0.0, 2.5],
            vec![1e-3, 1e3, -1e-3, 7.0],
            vec![0.0, 0.0, 0.0, 0.0],
            vec![-2.0, -2.0, -2.0, -2.0],
        ];

        for a in &vectors {
            for b in &vectors {
                let ab = cosine(a, b);
                assert_eq!(ab, cosine(b, a));
                assert!((-1.0..=1.0).contains(&ab));
            }
        }
    }

    #[test]
    fn test_matrix_shape() {
        let a = vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 1.0]];
        let b = vec![vec![1.0, 0.0], vec![0.0, 1.0]];

        let matrix = cosine_similarity(&a, &b);
        assert_eq!(matrix.len(), 3);
        assert!(matrix.iter().all(|row| row.len() == 2));
        assert_close(matrix[0][0], 1.0);
        assert_close(matrix[0][1], 0.0);
        assert_close(matrix[2][0], matrix[2][1]);
    }

    #[test]
    fn test_argmax_first_occurrence_wins() {
        assert_eq!(argmax(&[0.2, 0.9, 0.9, 0.1]), Some(1));
        assert_eq!(argmax(&[0.0, 0.0]), Some(0));
    }

    #[test]
    fn test_argmax_skips_nan() {
        assert_eq!(argmax(&[f32::NAN, -0.5, f32::NAN]), Some(1));
        assert_eq!(argmax(&[f32::NAN]), None);
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn test_argmax_row() {
        let matrix = vec![vec![0.1, 0.7, 0.3], vec![-1.0, -0.5, -0.9]];
        assert_eq!(argmax_row(&matrix, 0), Some(1));
        assert_eq!(argmax_row(&matrix, 1), Some(1));
        assert_eq!(argmax_row(&matrix, 2), None);
    }
}
