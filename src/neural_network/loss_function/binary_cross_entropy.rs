use ndarray::{Array2, Zip};

/// Mean binary cross-entropy over the examples of a batch:
/// `-1/m * Σ[Y * log(AL) + (1 - Y) * log(1 - AL)]`.
///
/// Predictions are not clipped; an `AL` of exactly 0 or 1 yields an infinite or NaN cost.
///
/// # Parameters
///
/// - `al` - Output activations with shape (1, m)
/// - `y` - Labels (0 or 1) with shape (1, m)
///
/// # Returns
///
/// * `f64` - The unregularized cost
pub fn cost(al: &Array2<f64>, y: &Array2<f64>) -> f64 {
    let m = y.ncols() as f64;
    let mut total = 0.0;
    Zip::from(al).and(y).for_each(|&a, &t| {
        total += t * a.ln() + (1.0 - t) * (1.0 - a).ln();
    });
    -total / m
}

/// Derivative of the cost with respect to `AL`, the seed of backpropagation:
/// `dAL = -(Y / AL - (1 - Y) / (1 - AL))`.
///
/// The `1/m` factor is applied later, in the linear backward step.
pub fn output_gradient(al: &Array2<f64>, y: &Array2<f64>) -> Array2<f64> {
    Zip::from(al)
        .and(y)
        .map_collect(|&a, &t| -(t / a - (1.0 - t) / (1.0 - a)))
}

/// L2 penalty added to the cost: `lambda / (2m) * Σ W²`.
pub fn l2_penalty(squared_weight_sum: f64, lambda: f64, m: usize) -> f64 {
    lambda / (2.0 * m as f64) * squared_weight_sum
}
