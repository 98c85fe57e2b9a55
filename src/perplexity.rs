//! Perplexity calibration of the per-point Gaussian kernels.
//!
//! For every point, a binary search finds the kernel precision `beta` (inverse
//! variance) whose conditional neighbor distribution has Shannon entropy
//! `log(perplexity)`. Rows are independent and calibrated in parallel.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, ArrayViewMut1, Zip};
use tracing::debug;

/// Result of calibrating every row of the distance matrix.
pub struct Calibration {
    /// Conditional probabilities `p(j | i)`, one row per point, zero diagonal
    pub conditional: Array2<f64>,

    /// Calibrated kernel precision for each point
    pub betas: Array1<f64>,

    /// Number of rows whose search stopped at the try limit
    pub unconverged: usize,
}

/// Search bounds for a single precision search.
#[derive(Debug, Clone, Copy)]
pub struct SearchParameters {
    /// Target perplexity, the effective number of neighbors
    pub perplexity: f64,

    /// Accepted absolute deviation of the entropy from `log(perplexity)`
    pub tolerance: f64,

    /// Maximum number of bisection steps per point
    pub max_tries: usize,
}

/// Calibrates conditional neighbor distributions for all points.
///
/// # Arguments
/// * `distances` - Squared pairwise distance matrix (`n × n`)
/// * `params` - Target perplexity and search limits
///
/// # Returns
/// A `Calibration` holding the `n × n` conditional matrix, whose rows each sum
/// to one (or are all zero when a point has no neighbors), and the precisions
pub fn calibrate(distances: ArrayView2<f64>, params: SearchParameters) -> Calibration {
    let n = distances.nrows();
    let target_entropy = params.perplexity.ln();
    let mut conditional = Array2::zeros((n, n));
    let mut betas = Array1::ones(n);

    let converged = Zip::indexed(conditional.rows_mut())
        .and(distances.rows())
        .and(&mut betas)
        .par_map_collect(|i, row, distances_i, beta| {
            if i % 500 == 0 {
                debug!("Computing P-values for point {i} of {n}...");
            }
            let (found, converged) = calibrate_row(i, distances_i, row, target_entropy, params);
            *beta = found;
            converged
        });

    let unconverged = converged.iter().filter(|&&c| !c).count();

    Calibration {
        conditional,
        betas,
        unconverged,
    }
}

/// Binary-searches the precision for point `i` and writes its conditional
/// distribution into `row`.
///
/// # Returns
/// The final precision and whether the entropy reached the tolerance band
fn calibrate_row(
    i: usize,
    distances: ArrayView1<f64>,
    mut row: ArrayViewMut1<f64>,
    target_entropy: f64,
    params: SearchParameters,
) -> (f64, bool) {
    let neighbors: Vec<f64> = distances
        .iter()
        .enumerate()
        .filter(|&(j, _)| j != i)
        .map(|(_, &d)| d)
        .collect();

    // No neighbors: the row stays all zero
    let Some(offset) = neighbors.iter().copied().min_by(f64::total_cmp) else {
        return (1.0, true);
    };

    let mut probabilities = vec![0.0; neighbors.len()];
    let mut beta = 1.0;
    let mut beta_min: Option<f64> = None;
    let mut beta_max: Option<f64> = None;

    let mut diff = entropy(&neighbors, offset, beta, &mut probabilities) - target_entropy;
    let mut tries = 0;

    while diff.abs() > params.tolerance && tries < params.max_tries {
        if diff > 0.0 {
            // Distribution too flat, sharpen the kernel
            beta_min = Some(beta);
            beta = match beta_max {
                None => beta * 2.0,
                Some(max) => (beta + max) / 2.0,
            };
        } else {
            beta_max = Some(beta);
            beta = match beta_min {
                None => beta / 2.0,
                Some(min) => (beta + min) / 2.0,
            };
        }

        diff = entropy(&neighbors, offset, beta, &mut probabilities) - target_entropy;
        tries += 1;
    }

    let others = (0..distances.len()).filter(|&j| j != i);
    for (j, &p) in others.zip(&probabilities) {
        row[j] = p;
    }

    (beta, diff.abs() <= params.tolerance)
}

/// Evaluates the Gaussian kernel at precision `beta` and returns the entropy
/// of the induced distribution, leaving the normalized probabilities in
/// `probabilities`.
///
/// Distances are offset by their minimum before exponentiation. The common
/// factor `exp(-offset * beta)` cancels in both the entropy
/// `log(sum_j exp(-d_j * beta)) + beta * sum_j(d_j * p_j) / sum_j(p_j)` and
/// the normalized row, and the kernel sum stays at least one.
fn entropy(distances: &[f64], offset: f64, beta: f64, probabilities: &mut [f64]) -> f64 {
    let mut sum = 0.0;
    let mut weighted = 0.0;
    for (p, &d) in probabilities.iter_mut().zip(distances) {
        let shifted = d - offset;
        *p = (-shifted * beta).exp();
        sum += *p;
        weighted += shifted * *p;
    }

    for p in probabilities.iter_mut() {
        *p /= sum;
    }

    sum.ln() + beta * weighted / sum
}

#[cfg(test)]
mod tests {
    use super::{calibrate, entropy, Calibration, SearchParameters};
    use crate::distance::pairwise_squared_distances;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array2, ArrayView1};
    use ndarray_rand::RandomExt;
    use rand::distributions::Uniform;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn params(perplexity: f64) -> SearchParameters {
        SearchParameters {
            perplexity,
            tolerance: 1e-5,
            max_tries: 50,
        }
    }

    /// Two clusters of ten points in three dimensions, five units apart.
    fn two_clusters() -> Array2<f64> {
        let mut rng = SmallRng::seed_from_u64(17);
        let mut x = Array2::random_using((20, 3), Uniform::new(-0.5, 0.5), &mut rng);
        for i in 10..20 {
            x.row_mut(i).mapv_inplace(|v| v + 5.0);
        }
        x
    }

    fn calibrate_points(x: &Array2<f64>, perplexity: f64) -> Calibration {
        let distances = pairwise_squared_distances(x.view());
        calibrate(distances.view(), params(perplexity))
    }

    fn effective_neighbors(row: ArrayView1<f64>) -> f64 {
        let h: f64 = row
            .iter()
            .filter(|&&p| p > 0.0)
            .map(|&p| -p * p.ln())
            .sum();
        h.exp()
    }

    #[test]
    fn test_entropy_matches_unshifted_formula() {
        let distances: [f64; 4] = [0.3, 1.2, 2.5, 0.7];
        let beta = 0.8;

        let weights: Vec<f64> = distances.iter().map(|d| (-d * beta).exp()).collect();
        let sum: f64 = weights.iter().sum();
        let weighted: f64 = distances.iter().zip(&weights).map(|(d, w)| d * w).sum();
        let expected = sum.ln() + beta * weighted / sum;

        let mut probabilities = [0.0; 4];
        let h = entropy(&distances, 0.3, beta, &mut probabilities);

        assert_abs_diff_eq!(h, expected, epsilon = 1e-12);
        for (p, w) in probabilities.iter().zip(&weights) {
            assert_abs_diff_eq!(*p, w / sum, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_rows_sum_to_one_with_zero_diagonal() {
        let x = two_clusters();
        let calibration = calibrate_points(&x, 5.0);

        for (i, row) in calibration.conditional.rows().into_iter().enumerate() {
            assert_eq!(row[i], 0.0, "self-probability of point {i} is not zero");
            assert_abs_diff_eq!(row.sum(), 1.0, epsilon = 1e-6);
            assert!(row.iter().all(|&p| p >= 0.0), "negative entry in row {i}");
        }
    }

    #[test]
    fn test_reaches_target_perplexity() {
        let x = two_clusters();
        let calibration = calibrate_points(&x, 5.0);

        assert_eq!(calibration.unconverged, 0);
        for row in calibration.conditional.rows() {
            assert_abs_diff_eq!(effective_neighbors(row), 5.0, epsilon = 1e-3);
        }
    }

    #[test]
    fn test_perplexity_monotonicity() {
        let x = two_clusters();
        let narrow = calibrate_points(&x, 3.0);
        let wide = calibrate_points(&x, 8.0);

        for i in 0..x.nrows() {
            let narrow_size = effective_neighbors(narrow.conditional.row(i));
            let wide_size = effective_neighbors(wide.conditional.row(i));
            assert!(
                wide_size >= narrow_size,
                "point {i}: neighborhood shrank from {narrow_size} to {wide_size}"
            );
            assert!(
                wide.betas[i] <= narrow.betas[i],
                "point {i}: precision grew from {} to {}",
                narrow.betas[i],
                wide.betas[i]
            );
        }
    }

    #[test]
    fn test_neighbors_stay_in_cluster() {
        let x = two_clusters();
        let calibration = calibrate_points(&x, 3.0);

        let row = calibration.conditional.row(0);
        let within: f64 = row.iter().take(10).sum();
        assert!(within > 0.999, "only {within} of the mass stays in the cluster");
    }

    #[test]
    fn test_single_point_has_empty_row() {
        let distances = array![[0.0]];
        let calibration = calibrate(distances.view(), params(30.0));

        assert_eq!(calibration.conditional, array![[0.0]]);
        assert_eq!(calibration.unconverged, 0);
    }

    #[test]
    fn test_unreachable_perplexity_is_best_effort() {
        // Three points cannot have thirty effective neighbors
        let distances = array![[0.0, 1.0, 4.0], [1.0, 0.0, 1.0], [4.0, 1.0, 0.0]];
        let calibration = calibrate(distances.view(), params(30.0));

        assert_eq!(calibration.unconverged, 3);
        for row in calibration.conditional.rows() {
            assert!(row.iter().all(|p| p.is_finite()), "non-finite row {row}");
            assert_abs_diff_eq!(row.sum(), 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_distant_points_do_not_underflow() {
        // exp(-d) underflows for every neighbor at the initial precision
        let distances = array![[0.0, 5000.0, 5001.0], [5000.0, 0.0, 9000.0], [5001.0, 9000.0, 0.0]];
        let calibration = calibrate(distances.view(), params(1.5));

        for row in calibration.conditional.rows() {
            assert!(row.iter().all(|p| p.is_finite()), "non-finite row {row}");
            assert_abs_diff_eq!(row.sum(), 1.0, epsilon = 1e-9);
        }
    }
}
