use super::{ActivationFunction, map_elementwise};
use ndarray::{Array2, Zip};

/// Logistic sigmoid, `1 / (1 + e^-x)`.
#[inline]
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Sigmoid activation.
///
/// Backward recomputes `s = sigmoid(Z)` from the cached pre-activation and
/// returns `dA * s * (1 - s)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sigmoid;

impl ActivationFunction for Sigmoid {
    fn forward(&self, z: &Array2<f64>) -> Array2<f64> {
        map_elementwise(z, sigmoid)
    }

    fn backward(&self, da: &Array2<f64>, z: &Array2<f64>) -> Array2<f64> {
        let mut dz = da.clone();
        Zip::from(&mut dz).and(z).for_each(|g, &zv| {
            let s = sigmoid(zv);
            *g *= s * (1.0 - s);
        });
        dz
    }

    fn name(&self) -> &'static str {
        "sigmoid"
    }
}
