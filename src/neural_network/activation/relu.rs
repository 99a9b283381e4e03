use super::{ActivationFunction, map_elementwise};
use ndarray::{Array2, Zip};

/// ReLU (Rectified Linear Unit) activation.
///
/// Forward passes positive values through and clamps everything else to zero.
/// The derivative is taken as 0 at `Z == 0`. NaN passes through unchanged.
///
/// # Example
/// ```rust
/// use feedforward::neural_network::{ActivationFunction, ReLU};
/// use ndarray::array;
///
/// let z = array![[-1.0, 0.0, 2.0]];
/// assert_eq!(ReLU.forward(&z), array![[0.0, 0.0, 2.0]]);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ReLU;

impl ActivationFunction for ReLU {
    fn forward(&self, z: &Array2<f64>) -> Array2<f64> {
        map_elementwise(z, |x| if x > 0.0 || x.is_nan() { x } else { 0.0 })
    }

    fn backward(&self, da: &Array2<f64>, z: &Array2<f64>) -> Array2<f64> {
        let mut dz = da.clone();
        Zip::from(&mut dz).and(z).for_each(|g, &zv| {
            if zv <= 0.0 {
                *g = 0.0;
            }
        });
        dz
    }

    fn name(&self) -> &'static str {
        "relu"
    }
}
