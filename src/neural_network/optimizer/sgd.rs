use super::{Optimizer, apply_update, check_gradients, update_mask};
use crate::error::ModelError;
use crate::neural_network::{Gradients, ParameterState};
use ndarray::Array1;

/// Plain gradient descent: `W -= lr * dW`, `b -= lr * db`.
///
/// Stateless; the learning rate is supplied on every step by the training loop.
#[derive(Debug, Clone, Copy, Default)]
pub struct GradientDescent;

impl GradientDescent {
    pub fn new() -> Self {
        GradientDescent
    }
}

impl Optimizer for GradientDescent {
    fn step(
        &mut self,
        params: &mut ParameterState,
        grads: &Gradients,
        learning_rate: f64,
        keep_masks: Option<&[Array1<bool>]>,
    ) -> Result<(), ModelError> {
        check_gradients(params, grads)?;

        let num_layers = params.len();
        for (idx, (layer, grad)) in params.layers_mut().iter_mut().zip(grads.iter()).enumerate() {
            let keep = update_mask(keep_masks, idx + 1, num_layers);
            apply_update(layer, &grad.d_weights, &grad.d_bias, learning_rate, keep);
        }
        Ok(())
    }
}
