use crate::error::ModelError;
use crate::neural_network::Network;
use ndarray::{Array1, Array2, Axis};
use rand::Rng;

/// Values recorded by a training forward pass and consumed by the backward pass
/// that immediately follows it on the same mini-batch.
///
/// # Fields
///
/// - `activations` - `A[0..L]`: the (possibly dropout-masked) input followed by every layer's output
/// - `pre_activations` - `Z[1..L]`, stored zero-indexed (entry `i` is layer `i + 1`)
/// - `keep_masks` - Per-unit keep masks for `A[0..L-1]` when dropout was applied
#[derive(Debug, Clone)]
pub struct TrainingCache {
    activations: Vec<Array2<f64>>,
    pre_activations: Vec<Array2<f64>>,
    keep_masks: Option<Vec<Array1<bool>>>,
}

impl TrainingCache {
    /// Output of the last layer, `AL`
    pub fn output(&self) -> &Array2<f64> {
        &self.activations[self.activations.len() - 1]
    }

    /// Number of examples the pass ran on
    pub fn batch_size(&self) -> usize {
        self.activations[0].ncols()
    }

    /// Cached `A[layer]`, with `layer` in `0..L` (0 is the network input).
    pub fn activation(&self, layer: usize) -> &Array2<f64> {
        &self.activations[layer]
    }

    /// Number of parameterized layers the pass ran through (`L - 1`)
    pub fn num_layers(&self) -> usize {
        self.pre_activations.len()
    }

    /// Cached `Z[layer]`, with `layer` in `1..L`.
    pub fn pre_activation(&self, layer: usize) -> &Array2<f64> {
        &self.pre_activations[layer - 1]
    }

    /// Keep mask sampled for `A[layer]` (`layer` in `0..L-1`), `None` without dropout.
    pub fn keep_mask(&self, layer: usize) -> Option<&Array1<bool>> {
        self.keep_masks.as_ref().map(|masks| &masks[layer])
    }

    pub(crate) fn keep_masks(&self) -> Option<&[Array1<bool>]> {
        self.keep_masks.as_deref()
    }
}

/// Applies inverted dropout to `a` in place and returns the keep mask.
///
/// One draw per unit (row): the unit is dropped across the whole batch when the draw
/// exceeds `keep_prob`. Afterwards every entry is divided by `keep_prob`.
fn apply_dropout<R: Rng>(a: &mut Array2<f64>, keep_prob: f64, rng: &mut R) -> Array1<bool> {
    let keep: Array1<bool> = (0..a.nrows())
        .map(|_| rng.random::<f64>() <= keep_prob)
        .collect();

    for (mut row, &kept) in a.axis_iter_mut(Axis(0)).zip(keep.iter()) {
        if !kept {
            row.fill(0.0);
        }
    }
    a.mapv_inplace(|v| v / keep_prob);

    keep
}

impl Network {
    /// Inference pass: `Z = W·A_prev + b`, then the layer's activation, for layers `1..L`.
    ///
    /// Nothing is cached and dropout is never applied.
    ///
    /// # Parameters
    ///
    /// * `x` - Features with shape (input_dim, examples)
    ///
    /// # Returns
    ///
    /// - `Ok(Array2<f64>)` - Output activations with shape (output_dim, examples)
    /// - `Err(ModelError::NotFitted)` - If the network has no parameters
    /// - `Err(ModelError::InputValidationError)` - If `x` has the wrong number of rows or no columns
    pub fn predict_forward(&self, x: &Array2<f64>) -> Result<Array2<f64>, ModelError> {
        let params = self.parameters()?;
        self.check_features(x)?;

        let mut a = x.to_owned();
        for (layer, activation) in params.iter().zip(self.activations()) {
            let z = layer.weights.dot(&a) + &layer.bias;
            a = activation.forward(&z);
        }
        Ok(a)
    }

    /// Training pass: the same chain as [`Network::predict_forward`], caching every `Z` and
    /// `A` for the backward pass.
    ///
    /// With `keep_prob = Some(p)`, inverted dropout is applied to `A[l-1]` before it feeds
    /// layer `l`, for every `l` in `1..L`; the final output itself is never masked.
    ///
    /// The returned cache is only meaningful for the backward pass on this same batch with
    /// these same parameters.
    ///
    /// # Parameters
    ///
    /// - `x` - Features of the mini-batch with shape (input_dim, examples)
    /// - `keep_prob` - Retention probability, or `None` to disable dropout
    /// - `rng` - Random source for the dropout masks
    ///
    /// # Returns
    ///
    /// - `Ok(TrainingCache)` - Cached activations, pre-activations and masks
    /// - `Err(ModelError)` - If the network has no parameters or `x` is malformed
    pub fn train_forward<R: Rng>(
        &self,
        x: &Array2<f64>,
        keep_prob: Option<f64>,
        rng: &mut R,
    ) -> Result<TrainingCache, ModelError> {
        let params = self.parameters()?;
        self.check_features(x)?;

        let num_layers = params.len();
        let mut activations = Vec::with_capacity(num_layers + 1);
        let mut pre_activations = Vec::with_capacity(num_layers);
        let mut keep_masks = keep_prob.map(|_| Vec::with_capacity(num_layers));

        let mut a_prev = x.to_owned();
        for (layer, activation) in params.iter().zip(self.activations()) {
            if let (Some(p), Some(masks)) = (keep_prob, keep_masks.as_mut()) {
                masks.push(apply_dropout(&mut a_prev, p, rng));
            }

            let z = layer.weights.dot(&a_prev) + &layer.bias;
            let a = activation.forward(&z);
            pre_activations.push(z);
            activations.push(std::mem::replace(&mut a_prev, a));
        }
        activations.push(a_prev);

        Ok(TrainingCache {
            activations,
            pre_activations,
            keep_masks,
        })
    }
}
