//! PCA pre-reduction of the feature matrix.
//!
//! Pairwise distances dominate the cost of calibration, so features are first
//! projected onto their top principal directions. The decomposition is an SVD
//! of the centered data, which yields the eigenvectors of `Xᵗ·X` as real
//! directions already sorted by descending variance.

use crate::{PcaSolver, TsneError};
use ndarray::{s, Array2, ArrayView2};
use petal_decomposition::{DecompositionError, Pca, RandomizedPca, RandomizedPcaBuilder};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use rand_pcg::Mcg128Xsl64;
use std::cmp::min;
use tracing::debug;

/// Projects `x` onto its top `n_components` principal directions.
///
/// When the centered data has fewer than `n_components` non-trivial
/// directions (fewer samples than components), the missing directions carry
/// zero variance and their columns are zero.
///
/// # Arguments
/// * `x` - Input data matrix where each row is a sample
/// * `n_components` - Number of principal components to keep
/// * `solver` - Decomposition strategy
/// * `randomized_threshold` - Feature count above which `PcaSolver::Auto`
///   switches to randomized SVD
/// * `maybe_seed` - Optional random seed for randomized SVD
///
/// # Returns
/// An `n × n_components` matrix of projected samples
///
/// # Errors
/// * `TsneError::InvalidPcaDimensions` if `n_components` is zero or exceeds
///   the feature count
/// * `TsneError::Pca` if the decomposition fails
pub fn reduce(
    x: ArrayView2<f64>,
    n_components: usize,
    solver: PcaSolver,
    randomized_threshold: usize,
    maybe_seed: Option<u64>,
) -> Result<Array2<f64>, TsneError> {
    let (n, dim) = x.dim();
    if n_components == 0 || n_components > dim {
        return Err(TsneError::InvalidPcaDimensions {
            requested: n_components,
            available: dim,
        });
    }

    let mut reduced = Array2::zeros((n, n_components));
    if n < 2 {
        debug!("Fewer than two samples, PCA projection is zero");
        return Ok(reduced);
    }

    let fitted = min(n_components, n);
    let randomized = match solver {
        PcaSolver::Exact => false,
        PcaSolver::Randomized => fitted < min(n, dim),
        PcaSolver::Auto => dim > randomized_threshold && fitted < min(n, dim),
    };

    let projected = if randomized {
        fit_randomized(x, fitted, maybe_seed)?
    } else {
        fit_exact(x, fitted)?
    };

    let k = min(projected.ncols(), n_components);
    reduced
        .slice_mut(s![.., ..k])
        .assign(&projected.slice(s![.., ..k]));

    debug!(
        "Applied {} PCA, the dimensionality becomes {n_components}",
        if randomized { "randomized" } else { "exact" }
    );

    Ok(reduced)
}

/// Full SVD decomposition.
fn fit_exact(x: ArrayView2<f64>, n_components: usize) -> Result<Array2<f64>, DecompositionError> {
    let mut pca = Pca::new(n_components);
    pca.fit(&x)?;
    pca.transform(&x)
}

/// Randomized SVD, seeded for reproducibility when a seed is given.
fn fit_randomized(
    x: ArrayView2<f64>,
    n_components: usize,
    maybe_seed: Option<u64>,
) -> Result<Array2<f64>, DecompositionError> {
    match maybe_seed {
        None => {
            let mut pca: RandomizedPca<f64, Mcg128Xsl64> = RandomizedPca::new(n_components);
            pca.fit_transform(&x)
        }
        Some(seed) => {
            let mut pca =
                RandomizedPcaBuilder::with_rng(SmallRng::seed_from_u64(seed), n_components)
                    .build();
            pca.fit_transform(&x)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::reduce;
    use crate::{PcaSolver, TsneError};
    use approx::assert_abs_diff_eq;
    use ndarray::{Array2, Axis};
    use ndarray_rand::RandomExt;
    use rand::distributions::Uniform;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn random_data(n: usize, dim: usize, seed: u64) -> Array2<f64> {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut x = Array2::random_using((n, dim), Uniform::new(-1.0, 1.0), &mut rng);

        // Stretch the leading features so the spectrum is well separated
        for (j, mut column) in x.axis_iter_mut(Axis(1)).enumerate() {
            column *= 1.5_f64.powi((dim - j) as i32);
        }
        x
    }

    #[test]
    fn test_reduce_shape() {
        let x = random_data(40, 12, 7);
        let reduced = reduce(x.view(), 5, PcaSolver::Exact, 500, None).unwrap();
        assert_eq!(reduced.shape(), &[40, 5]);
    }

    #[test]
    fn test_reduce_uncorrelated_descending_columns() {
        let x = random_data(60, 10, 11);
        let reduced = reduce(x.view(), 4, PcaSolver::Exact, 500, None).unwrap();

        // Projected columns are centered, so Yᵗ·Y is the scaled covariance
        let mean = reduced.mean_axis(Axis(0)).unwrap();
        mean.iter().for_each(|&m| assert_abs_diff_eq!(m, 0.0, epsilon = 1e-9));

        let covariance = reduced.t().dot(&reduced);
        let scale = covariance[[0, 0]];
        for i in 0..4 {
            for j in 0..4 {
                if i != j {
                    assert!(
                        covariance[[i, j]].abs() < 1e-8 * scale,
                        "columns {i} and {j} are correlated: {}",
                        covariance[[i, j]]
                    );
                }
            }
        }

        for i in 1..4 {
            assert!(
                covariance[[i, i]] <= covariance[[i - 1, i - 1]],
                "variance of column {i} exceeds column {}",
                i - 1
            );
        }
    }

    #[test]
    fn test_reduce_rejects_too_many_components() {
        let x = random_data(10, 3, 1);
        let result = reduce(x.view(), 4, PcaSolver::Exact, 500, None);
        assert!(matches!(
            result,
            Err(TsneError::InvalidPcaDimensions {
                requested: 4,
                available: 3
            })
        ));

        let result = reduce(x.view(), 0, PcaSolver::Exact, 500, None);
        assert!(matches!(
            result,
            Err(TsneError::InvalidPcaDimensions { requested: 0, .. })
        ));
    }

    #[test]
    fn test_reduce_pads_rank_deficient() {
        let x = random_data(4, 8, 3);
        let reduced = reduce(x.view(), 6, PcaSolver::Exact, 500, None).unwrap();
        assert_eq!(reduced.shape(), &[4, 6]);

        // At most n - 1 = 3 directions carry variance once centered
        let spread = reduced.column(2).iter().fold(0.0_f64, |acc, &v| acc.max(v.abs()));
        assert!(spread > 1e-6, "third component carries no variance");
        reduced
            .column(3)
            .iter()
            .for_each(|&v| assert_abs_diff_eq!(v, 0.0, epsilon = 1e-9));

        // Columns beyond the sample count are padding
        for column in reduced.columns().into_iter().skip(4) {
            column.iter().for_each(|&v| assert_abs_diff_eq!(v, 0.0));
        }
    }

    #[test]
    fn test_reduce_single_sample() {
        let x = random_data(1, 5, 2);
        let reduced = reduce(x.view(), 3, PcaSolver::Auto, 500, None).unwrap();
        assert_eq!(reduced, Array2::<f64>::zeros((1, 3)));
    }

    #[test]
    fn test_reduce_randomized_seeded() {
        let x = random_data(50, 30, 5);
        let a = reduce(x.view(), 3, PcaSolver::Randomized, 500, Some(42)).unwrap();
        let b = reduce(x.view(), 3, PcaSolver::Randomized, 500, Some(42)).unwrap();
        assert_eq!(a.shape(), &[50, 3]);
        assert_eq!(a, b);

        // The leading direction matches the exact solution up to sign
        let exact = reduce(x.view(), 3, PcaSolver::Exact, 500, None).unwrap();
        let variance = |m: &Array2<f64>| m.column(0).mapv(|v| v * v).sum();
        assert_abs_diff_eq!(variance(&a), variance(&exact), epsilon = 1e-3 * variance(&exact));
    }
}
