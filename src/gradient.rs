//! t-SNE gradient calculation.
//!
//! This module computes the Student-t affinities of the current embedding,
//! the gradient of the Kullback-Leibler divergence between the input
//! affinities `P` and the embedding affinities `Q`, and the divergence itself.
//! The gradient pulls together points whose input affinity exceeds their
//! embedding affinity and pushes apart the rest.

use crate::distance::array_squared_euclidean_distance;
use ndarray::parallel::prelude::{IndexedParallelIterator, IntoParallelIterator, ParallelIterator};
use ndarray::{Array2, ArrayView2, Axis, Zip};

/// Lower bound on every embedding affinity.
pub const Q_FLOOR: f64 = 1e-12;

/// Student-t affinities of an embedding.
pub struct StudentT {
    /// Unnormalized kernel `1 / (1 + ||y_i - y_j||^2)` with a zero diagonal
    pub num: Array2<f64>,

    /// Normalized affinities, floored at [`Q_FLOOR`]
    pub q: Array2<f64>,
}

/// Computes the Student-t (one degree of freedom) affinities of `y`.
///
/// # Arguments
/// * `y` - Current embedding coordinates as an n × d matrix
pub fn student_t_affinities(y: ArrayView2<f64>) -> StudentT {
    let n = y.nrows();
    let mut num = Array2::zeros((n, n));

    num.axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each(|(i, mut row)| {
            let y_i = y.row(i);
            for (j, kernel) in row.iter_mut().enumerate() {
                if i != j {
                    *kernel = 1.0 / (1.0 + array_squared_euclidean_distance(y_i, y.row(j)));
                }
            }
        });

    let total = num.sum();
    let mut q = if total > 0.0 {
        &num / total
    } else {
        Array2::zeros((n, n))
    };
    q.par_mapv_inplace(|v| v.max(Q_FLOOR));

    StudentT { num, q }
}

/// Calculates the gradient of the Kullback-Leibler divergence for the current
/// embedding.
///
/// For each point, `dY_i = 4 * sum_j (p_ij - q_ij) * num_ij * (y_i - y_j)`.
/// Rows only read the shared inputs, so they are reduced in parallel.
///
/// # Arguments
/// * `y` - Current embedding coordinates as an n × d matrix
/// * `p` - Joint input affinities (`n × n`)
/// * `affinities` - Student-t affinities of `y`
///
/// # Returns
/// An n × d gradient matrix
pub fn tsne_grad(y: ArrayView2<f64>, p: ArrayView2<f64>, affinities: &StudentT) -> Array2<f64> {
    let (n, dim) = y.dim();
    let mut grad = Array2::zeros((n, dim));

    Zip::indexed(grad.rows_mut()).par_for_each(|i, mut grad_i| {
        let y_i = y.row(i);
        for j in 0..n {
            if i == j {
                continue;
            }

            let w = (p[[i, j]] - affinities.q[[i, j]]) * affinities.num[[i, j]];
            for d in 0..dim {
                grad_i[d] += w * (y_i[d] - y[[j, d]]);
            }
        }
        grad_i *= 4.0;
    });

    grad
}

/// Kullback-Leibler divergence `sum(P * log(P / Q))`.
pub fn kl_divergence(p: ArrayView2<f64>, q: ArrayView2<f64>) -> f64 {
    Zip::from(p)
        .and(q)
        .fold(0.0, |cost, &p, &q| cost + p * (p / q).ln())
}
