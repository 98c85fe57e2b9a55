//! Squared Euclidean distance kernels for t-SNE.
//!
//! Both the Gaussian kernel of the input space and the Student-t kernel of the
//! embedding space operate on squared Euclidean distances. This module
//! provides:
//!
//! - A SIMD squared distance between two contiguous vectors
//! - An array-view wrapper that falls back to copying non-contiguous rows
//! - The dense N × N pairwise squared distance matrix, computed row-parallel

use ndarray::parallel::prelude::{IndexedParallelIterator, IntoParallelIterator, ParallelIterator};
use ndarray::{Array2, ArrayView1, ArrayView2, Axis};
use tracing::warn;
use wide::f64x4;

/// Computes the squared Euclidean distance between vectors using SIMD
/// operations.
///
/// Processes vectors in chunks of 4 elements and handles the remainder
/// sequentially.
///
/// # Arguments
/// * `a` - First vector
/// * `b` - Second vector
///
/// # Panics
/// * If vectors have different lengths (debug builds only)
pub fn simd_squared_euclidean_distance(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len(), "Vectors must have the same length");

    let a_chunks = a.chunks_exact(4);
    let a_remainder = a_chunks.remainder();

    let b_chunks = b.chunks_exact(4);
    let b_remainder = b_chunks.remainder();

    let mut sum_sq = f64x4::splat(0.0);
    for (a_chunk, b_chunk) in a_chunks.zip(b_chunks) {
        let diff = f64x4::new([a_chunk[0], a_chunk[1], a_chunk[2], a_chunk[3]])
            - f64x4::new([b_chunk[0], b_chunk[1], b_chunk[2], b_chunk[3]]);
        sum_sq += diff * diff;
    }

    let mut total_sum_sq: f64 = sum_sq.as_array_ref().iter().sum();

    for (a, b) in a_remainder.iter().zip(b_remainder) {
        let diff = a - b;
        total_sum_sq += diff * diff;
    }

    total_sum_sq
}

/// Computes the squared Euclidean distance between array views, using the
/// SIMD path when both views are contiguous.
///
/// # Arguments
/// * `a` - First vector as array view
/// * `b` - Second vector as array view
pub fn array_squared_euclidean_distance(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    match (a.as_slice(), b.as_slice()) {
        (Some(a), Some(b)) => simd_squared_euclidean_distance(a, b),
        (Some(a), None) => {
            warn!("b is non-contiguous, requiring allocation to compute distance");
            simd_squared_euclidean_distance(a, &b.to_vec())
        }
        (None, Some(b)) => {
            warn!("a is non-contiguous, requiring allocation to compute distance");
            simd_squared_euclidean_distance(&a.to_vec(), b)
        }
        (None, None) => {
            warn!("both a and b are non-contiguous, requiring allocation to compute distance");
            simd_squared_euclidean_distance(&a.to_vec(), &b.to_vec())
        }
    }
}

/// Computes the Euclidean distance between array views.
pub fn array_euclidean_distance(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    array_squared_euclidean_distance(a, b).sqrt()
}

/// Computes the dense matrix of squared Euclidean distances between all rows
/// of `x`.
///
/// Rows of the output are filled in parallel. The diagonal is zero and the
/// result is exactly symmetric, since `(a - b)^2` and `(b - a)^2` round
/// identically.
///
/// # Arguments
/// * `x` - Data matrix where each row is a point
///
/// # Returns
/// An `n × n` matrix where entry `(i, j)` is `||x_i - x_j||^2`
pub fn pairwise_squared_distances(x: ArrayView2<f64>) -> Array2<f64> {
    let n = x.nrows();

    // Copy once up front so every row reaches the SIMD path
    let x = x.as_standard_layout();
    let mut distances = Array2::zeros((n, n));

    distances
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each(|(i, mut row)| {
            let row_i = x.row(i);
            for (j, distance) in row.iter_mut().enumerate() {
                if i != j {
                    *distance = array_squared_euclidean_distance(row_i, x.row(j));
                }
            }
        });

    distances
}

#[cfg(test)]
mod tests {
    mod pairwise {
        use crate::distance::pairwise_squared_distances;
        use approx::assert_abs_diff_eq;
        use ndarray::{array, Array2};

        #[test]
        fn test_pairwise_squared_distances() {
            let x = array![[0.0, 0.0], [3.0, 4.0], [1.0, 1.0]];
            let expected = array![[0.0, 25.0, 2.0], [25.0, 0.0, 13.0], [2.0, 13.0, 0.0]];

            let result = pairwise_squared_distances(x.view());
            assert_eq!(result, expected);
        }

        #[test]
        fn test_pairwise_non_contiguous() {
            // Transposed view has non-contiguous rows
            let base = array![[0.0, 1.0, 5.0], [0.0, 1.0, 2.0]];
            let x = base.t();

            let result = pairwise_squared_distances(x);
            assert_abs_diff_eq!(result[[0, 1]], 2.0);
            assert_abs_diff_eq!(result[[0, 2]], 29.0);
            assert_abs_diff_eq!(result[[1, 2]], 17.0);
        }

        #[test]
        fn test_pairwise_symmetric_zero_diagonal() {
            let x = Array2::from_shape_fn((7, 11), |(i, j)| ((i * 31 + j * 17) % 13) as f64 / 3.0);
            let result = pairwise_squared_distances(x.view());

            for i in 0..7 {
                assert_eq!(result[[i, i]], 0.0, "diagonal entry {i} is not zero");
                for j in 0..7 {
                    assert_eq!(result[[i, j]], result[[j, i]], "asymmetry at ({i}, {j})");
                }
            }
        }

        #[test]
        fn test_pairwise_empty_and_single() {
            let empty = Array2::<f64>::zeros((0, 4));
            assert_eq!(pairwise_squared_distances(empty.view()).shape(), &[0, 0]);

            let single = array![[1.0, 2.0, 3.0]];
            assert_eq!(pairwise_squared_distances(single.view()), array![[0.0]]);
        }
    }

    /// Property tests for the SIMD squared distance kernel
    mod squared_euclidean {
        use crate::distance::simd_squared_euclidean_distance;
        use quickcheck::{Arbitrary, Gen, TestResult};
        use quickcheck_macros::quickcheck;

        /// Test type for QuickCheck property testing of vector pairs.
        ///
        /// Generates pairs of vectors with same length containing only
        /// moderate finite values.
        #[derive(Clone, Debug)]
        struct VecPair(Vec<f64>, Vec<f64>);

        impl Arbitrary for VecPair {
            fn arbitrary(g: &mut Gen) -> VecPair {
                let len = u8::arbitrary(g) as usize;
                let value = |g: &mut Gen| f64::from(i16::arbitrary(g)) / 64.0;
                let a: Vec<_> = (0..len).map(|_| value(g)).collect();
                let b: Vec<_> = (0..len).map(|_| value(g)).collect();
                VecPair(a, b)
            }
        }

        /// Reference implementation of the squared Euclidean distance.
        fn standard_squared_euclidean_distance(a: &[f64], b: &[f64]) -> f64 {
            a.iter()
                .zip(b.iter())
                .map(|(a_i, b_i)| (a_i - b_i).powi(2))
                .sum()
        }

        #[quickcheck]
        fn non_negative(pair: VecPair) -> bool {
            let VecPair(a, b) = pair;
            simd_squared_euclidean_distance(&a, &b) >= 0.0
        }

        #[quickcheck]
        fn zero_when_equal(pair: VecPair) -> bool {
            let VecPair(a, _) = pair;
            simd_squared_euclidean_distance(&a, &a) == 0.0
        }

        #[quickcheck]
        fn distance_symmetry(pair: VecPair) -> bool {
            let VecPair(a, b) = pair;
            simd_squared_euclidean_distance(&a, &b) == simd_squared_euclidean_distance(&b, &a)
        }

        #[quickcheck]
        fn correctness(pair: VecPair) -> TestResult {
            let VecPair(a, b) = pair;
            let simd_result = simd_squared_euclidean_distance(&a, &b);
            let standard_result = standard_squared_euclidean_distance(&a, &b);
            let difference = (simd_result - standard_result).abs();

            if difference > 1e-9 * standard_result.max(1.0) {
                TestResult::error(format!("difference is {difference}"))
            } else {
                TestResult::passed()
            }
        }
    }
}
