//! Iteration schedule of the t-SNE optimizer.
//!
//! Two settings change with the iteration count:
//! 1. Momentum starts low while the embedding is still random and switches to
//!    a higher value once the layout has settled
//! 2. Early exaggeration of `P` lasts for a fixed number of iterations and is
//!    then removed once, irreversibly

/// Iteration-dependent optimizer settings.
#[derive(Debug, Clone, Copy)]
pub struct Schedule {
    /// Momentum used before `momentum_switch_iter`
    pub initial_momentum: f64,

    /// Momentum used from `momentum_switch_iter` on
    pub final_momentum: f64,

    /// First iteration using `final_momentum`
    pub momentum_switch_iter: usize,

    /// Number of iterations optimized against the exaggerated `P`
    pub exaggeration_iterations: usize,
}

impl Schedule {
    /// Momentum for iteration `itr` (0-based).
    pub fn momentum(&self, itr: usize) -> f64 {
        if itr < self.momentum_switch_iter {
            self.initial_momentum
        } else {
            self.final_momentum
        }
    }

    /// Whether exaggeration is removed after iteration `itr` (0-based).
    ///
    /// Never true when `exaggeration_iterations` is zero, since `P` is then
    /// built without exaggeration.
    pub fn ends_exaggeration(&self, itr: usize) -> bool {
        self.exaggeration_iterations > 0 && itr + 1 == self.exaggeration_iterations
    }
}
