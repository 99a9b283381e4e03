use super::{ActivationFunction, map_elementwise};
use ndarray::{Array2, Zip};

/// Hyperbolic tangent activation.
#[derive(Debug, Clone, Copy, Default)]
pub struct Tanh;

impl ActivationFunction for Tanh {
    fn forward(&self, z: &Array2<f64>) -> Array2<f64> {
        map_elementwise(z, f64::tanh)
    }

    // dZ = dA * (1 - tanh(Z)^2)
    fn backward(&self, da: &Array2<f64>, z: &Array2<f64>) -> Array2<f64> {
        let mut dz = da.clone();
        Zip::from(&mut dz).and(z).for_each(|g, &zv| {
            let t = zv.tanh();
            *g *= 1.0 - t * t;
        });
        dz
    }

    fn name(&self) -> &'static str {
        "tanh"
    }
}
