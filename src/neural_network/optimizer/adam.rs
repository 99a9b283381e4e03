use super::{Optimizer, apply_update, check_gradients, update_mask};
use crate::error::ModelError;
use crate::neural_network::{Gradients, ParameterState};
use ndarray::{Array1, Array2};

/// Adam optimizer implementation.
///
/// Keeps exponentially weighted first (`V`) and second (`S`) moment estimates of every
/// layer's gradients for the whole training run, and a global step counter `t` that
/// starts at 1 and advances once per mini-batch, after all layers are updated.
///
/// # Fields
///
/// - `beta1` - Decay rate of the first moment estimates
/// - `beta2` - Decay rate of the second moment estimates
/// - `epsilon` - Added to `sqrt(S_corrected)` in the denominator
/// - `t` - Current step, used for bias correction
/// - `states` - Moment estimates per layer, indexed like the parameters
#[derive(Debug, Clone)]
pub struct Adam {
    beta1: f64,
    beta2: f64,
    epsilon: f64,
    t: u64,
    states: Vec<AdamStates>,
}

impl Adam {
    /// Creates an optimizer with zeroed moments shaped like `params` and `t = 1`.
    pub fn new(params: &ParameterState, beta1: f64, beta2: f64, epsilon: f64) -> Self {
        let states = params
            .iter()
            .map(|layer| AdamStates::new(layer.weights.dim(), layer.bias.dim()))
            .collect();
        Adam {
            beta1,
            beta2,
            epsilon,
            t: 1,
            states,
        }
    }

    /// Step counter that the next update will use for bias correction
    pub fn step_count(&self) -> u64 {
        self.t
    }

    /// Moment estimates of network layer `layer` (1-based)
    pub fn states(&self, layer: usize) -> &AdamStates {
        &self.states[layer - 1]
    }
}

impl Optimizer for Adam {
    fn step(
        &mut self,
        params: &mut ParameterState,
        grads: &Gradients,
        learning_rate: f64,
        keep_masks: Option<&[Array1<bool>]>,
    ) -> Result<(), ModelError> {
        check_gradients(params, grads)?;
        if self.states.len() != params.len() {
            return Err(ModelError::ProcessingError(format!(
                "Adam holds moments for {} layers but the network has {}",
                self.states.len(),
                params.len()
            )));
        }

        let num_layers = params.len();
        let (beta1, beta2, epsilon, t) = (self.beta1, self.beta2, self.epsilon, self.t);

        for (idx, ((layer, grad), state)) in params
            .layers_mut()
            .iter_mut()
            .zip(grads.iter())
            .zip(self.states.iter_mut())
            .enumerate()
        {
            let (w_update, b_update) =
                state.update(&grad.d_weights, &grad.d_bias, beta1, beta2, epsilon, t);
            let keep = update_mask(keep_masks, idx + 1, num_layers);
            apply_update(layer, &w_update, &b_update, learning_rate, keep);
        }

        self.t += 1;
        Ok(())
    }
}

/// First and second moment estimates of one layer.
///
/// # Fields
///
/// - `v_weights` / `v_bias` - Moving averages of the gradients
/// - `s_weights` / `s_bias` - Moving averages of the squared gradients
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdamStates {
    pub v_weights: Array2<f64>,
    pub v_bias: Array2<f64>,
    pub s_weights: Array2<f64>,
    pub s_bias: Array2<f64>,
}

impl AdamStates {
    /// Creates zeroed moments for a layer with the given weight and bias shapes
    pub fn new(dims_weights: (usize, usize), dims_bias: (usize, usize)) -> Self {
        AdamStates {
            v_weights: Array2::zeros(dims_weights),
            v_bias: Array2::zeros(dims_bias),
            s_weights: Array2::zeros(dims_weights),
            s_bias: Array2::zeros(dims_bias),
        }
    }

    /// Folds the current gradients into the moments and returns the bias-corrected
    /// update directions `(V_w / (sqrt(S_w) + eps), V_b / (sqrt(S_b) + eps))`.
    ///
    /// The learning rate is not applied here.
    pub fn update(
        &mut self,
        grad_weights: &Array2<f64>,
        grad_bias: &Array2<f64>,
        beta1: f64,
        beta2: f64,
        epsilon: f64,
        t: u64,
    ) -> (Array2<f64>, Array2<f64>) {
        let v_correction = 1.0 - beta1.powf(t as f64);
        let s_correction = 1.0 - beta2.powf(t as f64);

        let AdamStates {
            v_weights,
            v_bias,
            s_weights,
            s_bias,
        } = self;

        rayon::join(
            || {
                update_moments(v_weights, s_weights, grad_weights, beta1, beta2);
                corrected_direction(v_weights, s_weights, v_correction, s_correction, epsilon)
            },
            || {
                update_moments(v_bias, s_bias, grad_bias, beta1, beta2);
                corrected_direction(v_bias, s_bias, v_correction, s_correction, epsilon)
            },
        )
    }
}

/// `V = beta1*V + (1-beta1)*g`, `S = beta2*S + (1-beta2)*g²`, in place.
fn update_moments(
    v: &mut Array2<f64>,
    s: &mut Array2<f64>,
    g: &Array2<f64>,
    beta1: f64,
    beta2: f64,
) {
    ndarray::Zip::from(v)
        .and(s)
        .and(g)
        .for_each(|v, s, &g| {
            *v = beta1 * *v + (1.0 - beta1) * g;
            *s = beta2 * *s + (1.0 - beta2) * g * g;
        });
}

fn corrected_direction(
    v: &Array2<f64>,
    s: &Array2<f64>,
    v_correction: f64,
    s_correction: f64,
    epsilon: f64,
) -> Array2<f64> {
    ndarray::Zip::from(v)
        .and(s)
        .map_collect(|&v, &s| (v / v_correction) / ((s / s_correction).sqrt() + epsilon))
}
