use crate::error::ModelError;
use crate::neural_network::loss_function::output_gradient;
use crate::neural_network::{Gradients, LayerGradients, Network, ParameterState, TrainingCache};
use ndarray::{Array2, Axis};

impl Network {
    /// Backward pass: gradients of the binary cross-entropy cost with respect to every
    /// layer's weights and biases.
    ///
    /// The error seed `dAL = -(Y/AL - (1-Y)/(1-AL))` is propagated from layer `L-1` down to
    /// layer 1. For each layer:
    ///
    /// - `dZ = g'(dA, Z)` via the layer's activation
    /// - `dW = dZ · A_prev^T / m`, plus `lambda · W / m` when regularizing
    /// - `db = Σ_examples dZ / m`
    /// - `dA_prev = W^T · dZ`
    ///
    /// `cache` must come from [`Network::train_forward`] on this same batch with the current
    /// parameters. A cache from a different batch size or a differently shaped network is
    /// rejected; any other staleness is not detectable and produces meaningless gradients.
    ///
    /// # Parameters
    ///
    /// - `cache` - Values recorded by the preceding training forward pass
    /// - `y` - Labels of the batch with shape (1, m)
    /// - `lambda` - L2 strength, or `None` to disable weight decay
    ///
    /// # Returns
    ///
    /// - `Ok(Gradients)` - `dW`, `db` for layers `1..L`
    /// - `Err(ModelError::ProcessingError)` - If the cache does not belong to a batch of `y`'s size
    ///   or to a network with these layer shapes
    pub fn backward(
        &self,
        cache: &TrainingCache,
        y: &Array2<f64>,
        lambda: Option<f64>,
    ) -> Result<Gradients, ModelError> {
        let params = self.parameters()?;

        if cache.batch_size() != y.ncols() || cache.output().dim() != y.dim() {
            return Err(ModelError::ProcessingError(format!(
                "Training cache holds output of shape {:?}, labels have shape {:?}; \
                 train_forward must run on the same batch before backward",
                cache.output().dim(),
                y.dim()
            )));
        }

        check_cache_layers(cache, params)?;

        let m = y.ncols() as f64;
        let num_layers = params.len();
        let mut layers = Vec::with_capacity(num_layers);

        let mut da = output_gradient(cache.output(), y);

        for l in (1..=num_layers).rev() {
            let layer = params.layer(l);
            let activation = self.activations()[l - 1];

            let dz = activation.backward(&da, cache.pre_activation(l));
            let (d_weights, d_bias, da_prev) =
                linear_backward(&dz, cache.activation(l - 1), &layer.weights, m, lambda);

            layers.push(LayerGradients { d_weights, d_bias });
            da = da_prev;
        }
        layers.reverse();

        Ok(Gradients { layers })
    }
}

/// Checks that every cached `A[l-1]` and `Z[l]` fits the weights of layer `l`.
fn check_cache_layers(cache: &TrainingCache, params: &ParameterState) -> Result<(), ModelError> {
    if cache.num_layers() != params.len() {
        return Err(ModelError::ProcessingError(format!(
            "Training cache covers {} layers but the network has {}",
            cache.num_layers(),
            params.len()
        )));
    }
    for (idx, layer) in params.iter().enumerate() {
        let l = idx + 1;
        if cache.activation(l - 1).nrows() != layer.inputs()
            || cache.pre_activation(l).nrows() != layer.units()
        {
            return Err(ModelError::ProcessingError(format!(
                "Training cache for layer {} holds A_prev {:?} and Z {:?}, weights are {:?}",
                l,
                cache.activation(l - 1).dim(),
                cache.pre_activation(l).dim(),
                layer.weights.dim()
            )));
        }
    }
    Ok(())
}

/// Gradients of one linear step `Z = W·A_prev + b` given `dZ`.
///
/// Returns `(dW, db, dA_prev)`.
fn linear_backward(
    dz: &Array2<f64>,
    a_prev: &Array2<f64>,
    weights: &Array2<f64>,
    m: f64,
    lambda: Option<f64>,
) -> (Array2<f64>, Array2<f64>, Array2<f64>) {
    let mut d_weights = dz.dot(&a_prev.t()) / m;
    if let Some(lambda) = lambda {
        d_weights.scaled_add(lambda / m, weights);
    }

    let d_bias = dz.sum_axis(Axis(1)).insert_axis(Axis(1)) / m;
    let da_prev = weights.t().dot(dz);

    (d_weights, d_bias, da_prev)
}
