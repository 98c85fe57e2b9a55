//! Momentum gradient descent with adaptive gains for t-SNE embeddings.
//!
//! Each coordinate carries a gain that grows while its gradient keeps flipping
//! direction relative to the current velocity and shrinks while they agree.

use crate::TsneError;
use ndarray::{Array2, ArrayView2, ArrayViewMut2, Axis, Zip};

/// Step parameters of one gradient descent update.
#[derive(Debug, Clone, Copy)]
pub struct StepParameters {
    /// Velocity retention for this iteration
    pub momentum: f64,

    /// Base step size (eta)
    pub learning_rate: f64,

    /// Lower bound on every gain
    pub min_gain: f64,
}

/// Updates embedding coordinates with one momentum step.
///
/// Per coordinate:
/// - the gain increases by 0.2 where the gradient sign disagrees with the
///   velocity sign and decays by a factor of 0.8 otherwise, then is clamped to
///   `min_gain`
/// - `velocity = momentum * velocity - learning_rate * gain * grad`
/// - `y += velocity`
///
/// # Arguments
/// * `y` - Current embedding coordinates to update
/// * `grad` - Gradient for this iteration
/// * `velocity` - Momentum buffer
/// * `gains` - Per-coordinate adaptive gains
/// * `params` - Momentum, learning rate and gain floor
pub fn update_embedding_gains(
    y: ArrayViewMut2<f64>,
    grad: ArrayView2<f64>,
    velocity: ArrayViewMut2<f64>,
    gains: ArrayViewMut2<f64>,
    params: StepParameters,
) {
    let StepParameters {
        momentum,
        learning_rate,
        min_gain,
    } = params;

    Zip::from(y)
        .and(grad)
        .and(velocity)
        .and(gains)
        .par_for_each(|y, &grad, velocity, gain| {
            if (grad > 0.0) == (*velocity > 0.0) {
                *gain *= 0.8;
            } else {
                *gain += 0.2;
            }
            *gain = gain.max(min_gain);
            *velocity = momentum * *velocity - learning_rate * (*gain * grad);
            *y += *velocity;
        });
}

/// Subtracts the column means from `y`.
///
/// # Errors
/// * `TsneError::EmptyArrayMean` if `y` has no rows
pub fn center_columns(y: &mut Array2<f64>) -> Result<(), TsneError> {
    let mean = y.mean_axis(Axis(0)).ok_or(TsneError::EmptyArrayMean)?;
    *y -= &mean;
    Ok(())
}
