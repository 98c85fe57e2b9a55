//! Placement of items from their embedding coordinates.
//!
//! A one-dimensional embedding orders items along a line. The helpers here
//! shift one embedding column to start at zero and round it, producing a
//! short sortable prefix for naming each item's output file.

use ndarray::{Array1, ArrayView, Dimension};

/// Shifts `coordinates` so the smallest is zero and rounds to one decimal.
///
/// Multi-dimensional embeddings are flattened in row-major order. Ties round
/// to even. Returns an empty array for empty input.
pub fn offsets<D: Dimension>(coordinates: ArrayView<f64, D>) -> Array1<f64> {
    let Some(min) = coordinates.iter().copied().min_by(f64::total_cmp) else {
        return Array1::zeros(0);
    };

    coordinates
        .iter()
        .map(|&v| ((v - min) * 10.0).round_ties_even() / 10.0)
        .collect()
}

/// Output file name for an item placed at `offset`.
pub fn file_name(offset: f64, source_name: &str) -> String {
    format!("{offset:.1}_{source_name}")
}
