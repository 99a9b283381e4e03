use crate::error::ModelError;
use crate::neural_network::NetworkDefinition;
use ndarray::Array2;
use rand::Rng;
use rand_distr::StandardNormal;

/// Weights and bias of one dense layer.
///
/// # Fields
///
/// - `weights` - Weight matrix with shape (units, units of previous layer)
/// - `bias` - Bias column with shape (units, 1)
#[derive(Debug, Clone, PartialEq)]
pub struct LayerParameters {
    pub weights: Array2<f64>,
    pub bias: Array2<f64>,
}

impl LayerParameters {
    /// Number of units of this layer (rows of the weight matrix)
    pub fn units(&self) -> usize {
        self.weights.nrows()
    }

    /// Number of inputs this layer consumes (columns of the weight matrix)
    pub fn inputs(&self) -> usize {
        self.weights.ncols()
    }
}

/// Trainable state of a network.
///
/// Layers are stored zero-indexed: entry `i` holds the parameters of network layer
/// `i + 1`, since the input layer (layer 0) carries no parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterState {
    layers: Vec<LayerParameters>,
}

impl ParameterState {
    /// He initialization: weights drawn from `N(0, 1)` and scaled by
    /// `sqrt(2 / units of previous layer)`, biases set to zero.
    ///
    /// # Parameters
    ///
    /// - `definition` - Architecture the parameters are created for
    /// - `rng` - Random source for the weight draws
    ///
    /// # Returns
    ///
    /// * `Self` - Freshly initialized parameters
    pub fn he_initialized<R: Rng>(definition: &NetworkDefinition, rng: &mut R) -> Self {
        let dims = definition.dimensions();
        let layers = dims
            .windows(2)
            .map(|pair| {
                let (fan_in, units) = (pair[0], pair[1]);
                let scale = (2.0 / fan_in as f64).sqrt();
                let weights = Array2::from_shape_simple_fn((units, fan_in), || {
                    rng.sample::<f64, _>(StandardNormal) * scale
                });
                LayerParameters {
                    weights,
                    bias: Array2::zeros((units, 1)),
                }
            })
            .collect();

        ParameterState { layers }
    }

    /// All-zero weights and biases shaped for `definition`.
    pub fn zeros(definition: &NetworkDefinition) -> Self {
        let layers = definition
            .dimensions()
            .windows(2)
            .map(|pair| LayerParameters {
                weights: Array2::zeros((pair[1], pair[0])),
                bias: Array2::zeros((pair[1], 1)),
            })
            .collect();

        ParameterState { layers }
    }

    /// Builds a parameter state from explicit per-layer values.
    ///
    /// # Errors
    ///
    /// - `ModelError::InputValidationError` - If the list is empty, a bias is not a single column
    ///   matching its weight rows, or consecutive layers do not chain
    pub fn from_layers(layers: Vec<LayerParameters>) -> Result<Self, ModelError> {
        if layers.is_empty() {
            return Err(ModelError::InputValidationError(
                "Parameter state needs at least one layer".to_string(),
            ));
        }

        for (i, layer) in layers.iter().enumerate() {
            if layer.bias.dim() != (layer.units(), 1) {
                return Err(ModelError::InputValidationError(format!(
                    "Layer {} bias has shape {:?}, expected ({}, 1)",
                    i + 1,
                    layer.bias.dim(),
                    layer.units()
                )));
            }
        }

        for (i, pair) in layers.windows(2).enumerate() {
            if pair[1].inputs() != pair[0].units() {
                return Err(ModelError::InputValidationError(format!(
                    "Layer {} expects {} inputs but layer {} has {} units",
                    i + 2,
                    pair[1].inputs(),
                    i + 1,
                    pair[0].units()
                )));
            }
        }

        Ok(ParameterState { layers })
    }

    /// Checks that every layer has the shape `definition` prescribes.
    pub(crate) fn check_matches(&self, definition: &NetworkDefinition) -> Result<(), ModelError> {
        let dims = definition.dimensions();
        if self.layers.len() != dims.len() - 1 {
            return Err(ModelError::InputValidationError(format!(
                "Parameter state has {} layers, network expects {}",
                self.layers.len(),
                dims.len() - 1
            )));
        }
        for (i, (layer, pair)) in self.layers.iter().zip(dims.windows(2)).enumerate() {
            if layer.weights.dim() != (pair[1], pair[0]) {
                return Err(ModelError::InputValidationError(format!(
                    "Layer {} weights have shape {:?}, expected ({}, {})",
                    i + 1,
                    layer.weights.dim(),
                    pair[1],
                    pair[0]
                )));
            }
        }
        Ok(())
    }

    /// Number of parameterized layers (`L - 1`)
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Parameters of network layer `layer` (1-based, `1..=len()`).
    ///
    /// # Panics
    ///
    /// Panics if `layer` is 0 or greater than `len()`.
    pub fn layer(&self, layer: usize) -> &LayerParameters {
        &self.layers[layer - 1]
    }

    /// Iterates over the layers in forward order.
    pub fn iter(&self) -> std::slice::Iter<'_, LayerParameters> {
        self.layers.iter()
    }

    pub(crate) fn layers_mut(&mut self) -> &mut [LayerParameters] {
        &mut self.layers
    }

    /// Sum of all squared weights, `Σ_l sum(W[l]²)`. Biases are not included.
    pub fn squared_weight_sum(&self) -> f64 {
        self.layers
            .iter()
            .map(|l| l.weights.iter().map(|w| w * w).sum::<f64>())
            .sum()
    }
}

/// Gradients of the cost with respect to every layer's parameters.
///
/// Indexed like [`ParameterState`]: entry `i` belongs to network layer `i + 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct Gradients {
    pub(crate) layers: Vec<LayerGradients>,
}

/// `dW` and `db` of one layer
#[derive(Debug, Clone, PartialEq)]
pub struct LayerGradients {
    pub d_weights: Array2<f64>,
    pub d_bias: Array2<f64>,
}

impl Gradients {
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Gradients of network layer `layer` (1-based).
    ///
    /// # Panics
    ///
    /// Panics if `layer` is 0 or greater than `len()`.
    pub fn layer(&self, layer: usize) -> &LayerGradients {
        &self.layers[layer - 1]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LayerGradients> {
        self.layers.iter()
    }
}
