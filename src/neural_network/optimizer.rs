use crate::error::ModelError;
use crate::neural_network::{
    Gradients, HyperParameters, LayerParameters, OptimizationStrategy, ParameterState,
};
use ndarray::{Array1, Array2, Axis, Zip};

/// Adam optimizer with per-layer moment estimates
pub mod adam;
/// Plain gradient descent
pub mod sgd;

pub use adam::*;
pub use sgd::*;

/// Defines the interface for parameter update rules.
pub trait Optimizer {
    /// Applies one update to every layer using the gradients of the current mini-batch.
    ///
    /// # Parameters
    ///
    /// - `params` - Parameters to mutate in place
    /// - `grads` - Gradients produced by the backward pass on the same batch
    /// - `learning_rate` - Step size for this update
    /// - `keep_masks` - Dropout keep masks of `A[0..L-1]` from the forward pass, if dropout is on.
    ///   For every hidden layer `l`, only the rows of `W[l]`/`b[l]` whose unit was kept in
    ///   `A[l]` are updated; the output layer is always updated in full.
    ///
    /// # Returns
    ///
    /// - `Ok(())` - If all layers were updated
    /// - `Err(ModelError::ProcessingError)` - If `grads` does not match `params` layer for layer
    fn step(
        &mut self,
        params: &mut ParameterState,
        grads: &Gradients,
        learning_rate: f64,
        keep_masks: Option<&[Array1<bool>]>,
    ) -> Result<(), ModelError>;
}

impl OptimizationStrategy {
    /// Creates a fresh optimizer for a training run over `params`.
    pub fn build(self, params: &ParameterState, hps: &HyperParameters) -> Box<dyn Optimizer> {
        match self {
            OptimizationStrategy::Plain => Box::new(GradientDescent::new()),
            OptimizationStrategy::Adam => Box::new(Adam::new(
                params,
                hps.beta1,
                hps.beta2,
                hps.adam_epsilon,
            )),
        }
    }
}

/// Checks that gradients and parameters line up layer for layer.
pub(crate) fn check_gradients(
    params: &ParameterState,
    grads: &Gradients,
) -> Result<(), ModelError> {
    if params.len() != grads.len() {
        return Err(ModelError::ProcessingError(format!(
            "Gradients cover {} layers but the network has {}",
            grads.len(),
            params.len()
        )));
    }
    for (l, (p, g)) in params.iter().zip(grads.iter()).enumerate() {
        if p.weights.dim() != g.d_weights.dim() || p.bias.dim() != g.d_bias.dim() {
            return Err(ModelError::ProcessingError(format!(
                "Layer {} gradient shapes {:?}/{:?} do not match parameters {:?}/{:?}",
                l + 1,
                g.d_weights.dim(),
                g.d_bias.dim(),
                p.weights.dim(),
                p.bias.dim()
            )));
        }
    }
    Ok(())
}

/// Keep mask governing the update of network layer `layer` (1-based), if any.
///
/// Hidden layer `l` is restricted to the units kept in `A[l]`; the output layer
/// (`l == num_layers`) has no mask.
pub(crate) fn update_mask(
    keep_masks: Option<&[Array1<bool>]>,
    layer: usize,
    num_layers: usize,
) -> Option<&Array1<bool>> {
    if layer < num_layers {
        keep_masks.and_then(|masks| masks.get(layer))
    } else {
        None
    }
}

/// `W -= lr * dW_update`, `b -= lr * db_update`, restricted to the kept rows when a
/// mask is given.
pub(crate) fn apply_update(
    layer: &mut LayerParameters,
    w_update: &Array2<f64>,
    b_update: &Array2<f64>,
    learning_rate: f64,
    keep: Option<&Array1<bool>>,
) {
    match keep {
        None => {
            layer.weights.scaled_add(-learning_rate, w_update);
            layer.bias.scaled_add(-learning_rate, b_update);
        }
        Some(keep) => {
            Zip::from(layer.weights.axis_iter_mut(Axis(0)))
                .and(w_update.axis_iter(Axis(0)))
                .and(keep)
                .for_each(|mut w_row, u_row, &kept| {
                    if kept {
                        w_row.scaled_add(-learning_rate, &u_row);
                    }
                });
            Zip::from(layer.bias.axis_iter_mut(Axis(0)))
                .and(b_update.axis_iter(Axis(0)))
                .and(keep)
                .for_each(|mut b_row, u_row, &kept| {
                    if kept {
                        b_row.scaled_add(-learning_rate, &u_row);
                    }
                });
        }
    }
}
