use crate::error::ModelError;
use ndarray::{Array2, Zip};

/// Fraction of positions where `predictions` equals `actual`.
///
/// # Parameters
///
/// - `predictions` - Predicted labels, e.g. the output of [`crate::neural_network::Network::predict`]
/// - `actual` - True labels with the same shape
///
/// # Returns
///
/// - `Ok(f64)` - Accuracy in the range \[0.0, 1.0\]
/// - `Err(ModelError::InputValidationError)` - If the shapes differ or the inputs are empty
///
/// # Example
/// ```rust
/// use feedforward::metric::accuracy;
/// use ndarray::array;
///
/// let predicted = array![[1.0, 0.0, 1.0, 1.0]];
/// let actual = array![[1.0, 0.0, 0.0, 1.0]];
/// assert_eq!(accuracy(&predicted, &actual).unwrap(), 0.75);
/// ```
pub fn accuracy(predictions: &Array2<f64>, actual: &Array2<f64>) -> Result<f64, ModelError> {
    if predictions.dim() != actual.dim() {
        return Err(ModelError::InputValidationError(format!(
            "Input arrays must have the same shape. Predicted: {:?}, Actual: {:?}",
            predictions.dim(),
            actual.dim()
        )));
    }
    if actual.is_empty() {
        return Err(ModelError::InputValidationError(
            "Input arrays must not be empty".to_string(),
        ));
    }

    let mut correct = 0usize;
    Zip::from(predictions).and(actual).for_each(|&p, &a| {
        if p == a {
            correct += 1;
        }
    });

    Ok(correct as f64 / actual.len() as f64)
}
