//! Symmetric joint affinities of the input space.

use ndarray::{Array2, ArrayView2};

/// Lower bound on every joint probability, keeping `log(P / Q)` finite.
pub const P_FLOOR: f64 = 1e-21;

/// Builds the joint probability matrix `P` from conditional probabilities.
///
/// NaN entries are treated as zero. The conditional matrix is symmetrized as
/// `C + Cᵗ` and normalized to sum to one, then scaled by `exaggeration` and
/// floored at [`P_FLOOR`]. A matrix without mass (a single point) is left
/// unnormalized, so every entry ends at the floor.
///
/// # Arguments
/// * `conditional` - Row-stochastic conditional probabilities (`n × n`)
/// * `exaggeration` - Early exaggeration multiplier
pub fn joint_probabilities(conditional: ArrayView2<f64>, exaggeration: f64) -> Array2<f64> {
    let conditional = conditional.mapv(|p| if p.is_nan() { 0.0 } else { p });
    let mut p = &conditional + &conditional.t();

    let total = p.sum();
    if total > 0.0 {
        p /= total;
    }

    p.par_mapv_inplace(|v| (v * exaggeration).max(P_FLOOR));
    p
}

/// Removes early exaggeration from `P`, restoring the floor on entries the
/// division pushed below it.
pub fn relax_exaggeration(p: &mut Array2<f64>, exaggeration: f64) {
    p.par_mapv_inplace(|v| (v / exaggeration).max(P_FLOOR));
}
