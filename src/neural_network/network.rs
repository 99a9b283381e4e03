use crate::error::ModelError;
use crate::neural_network::{ActivationFunction, ActivationKind, ParameterState};
use ndarray::Array2;

/// Architecture of a dense feed-forward network.
///
/// `dimensions[0]` is the input width; `dimensions[l]` for `l >= 1` is the width of
/// layer `l`, whose activation is `layer_kinds[l - 1]`. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkDefinition {
    dimensions: Vec<usize>,
    layer_kinds: Vec<ActivationKind>,
}

impl NetworkDefinition {
    /// Creates a validated architecture.
    ///
    /// # Parameters
    ///
    /// - `dimensions` - Layer widths including the input layer
    /// - `layer_kinds` - One activation per non-input layer
    ///
    /// # Errors
    ///
    /// - `ModelError::InputValidationError` - If `layer_kinds.len() != dimensions.len() - 1`,
    ///   fewer than two layers are given, or any width is zero
    pub fn new(
        dimensions: Vec<usize>,
        layer_kinds: Vec<ActivationKind>,
    ) -> Result<Self, ModelError> {
        if dimensions.len() < 2 {
            return Err(ModelError::InputValidationError(format!(
                "A network needs an input and at least one layer, got {} dimension(s)",
                dimensions.len()
            )));
        }
        if layer_kinds.len() != dimensions.len() - 1 {
            return Err(ModelError::InputValidationError(format!(
                "Layer specification incorrect: {} dimensions need {} activations, got {}",
                dimensions.len(),
                dimensions.len() - 1,
                layer_kinds.len()
            )));
        }
        if let Some(pos) = dimensions.iter().position(|&d| d == 0) {
            return Err(ModelError::InputValidationError(format!(
                "Layer {} has zero width",
                pos
            )));
        }

        Ok(NetworkDefinition {
            dimensions,
            layer_kinds,
        })
    }

    /// Layer widths including the input layer (length `L`)
    pub fn dimensions(&self) -> &[usize] {
        &self.dimensions
    }

    /// Activation kinds of layers `1..L` (length `L - 1`)
    pub fn layer_kinds(&self) -> &[ActivationKind] {
        &self.layer_kinds
    }

    /// Total number of layers `L`, input layer included
    pub fn num_layers(&self) -> usize {
        self.dimensions.len()
    }

    pub fn input_dim(&self) -> usize {
        self.dimensions[0]
    }

    pub fn output_dim(&self) -> usize {
        self.dimensions[self.dimensions.len() - 1]
    }

    /// Number of trainable parameters (weights plus biases)
    pub fn param_count(&self) -> usize {
        self.dimensions
            .windows(2)
            .map(|pair| pair[0] * pair[1] + pair[1])
            .sum()
    }
}

/// A dense multilayer perceptron trained with hand-written backpropagation.
///
/// The network owns its architecture, the activation strategies resolved from it, and
/// (after [`Network::train`] or [`Network::set_parameters`]) its parameters.
///
/// # Example
/// ```rust
/// use feedforward::prelude::*;
/// use ndarray::array;
///
/// let x = array![[0.0, 0.2, 4.0, 4.2], [0.1, 0.0, 3.9, 4.1]];
/// let y = array![[0.0, 0.0, 1.0, 1.0]];
///
/// let mut net = Network::new(vec![2, 4, 1], vec![ActivationKind::ReLU, ActivationKind::Sigmoid]).unwrap();
///
/// let mut hps = HyperParameters::default();
/// hps.num_epochs = 200;
/// hps.initial_learning_rate = 0.1;
///
/// let report = net.train(&x, &y, Some(&hps)).unwrap();
/// assert_eq!(report.costs.len(), 200);
///
/// let predictions = net.predict(&x).unwrap();
/// let acc = accuracy(&predictions, &y).unwrap();
/// assert!((0.0..=1.0).contains(&acc));
/// ```
pub struct Network {
    definition: NetworkDefinition,
    activations: Vec<&'static dyn ActivationFunction>,
    parameters: Option<ParameterState>,
}

impl Network {
    /// Builds a network from layer widths and per-layer activations.
    ///
    /// Activations are resolved to their strategy objects here, once. The network has no
    /// parameters until it is trained or given parameters explicitly.
    ///
    /// # Errors
    ///
    /// - `ModelError::InputValidationError` - See [`NetworkDefinition::new`]
    pub fn new(
        dimensions: Vec<usize>,
        layer_kinds: Vec<ActivationKind>,
    ) -> Result<Self, ModelError> {
        Ok(Self::from_definition(NetworkDefinition::new(
            dimensions,
            layer_kinds,
        )?))
    }

    pub fn from_definition(definition: NetworkDefinition) -> Self {
        let activations = definition
            .layer_kinds()
            .iter()
            .map(|kind| kind.resolve())
            .collect();
        Network {
            definition,
            activations,
            parameters: None,
        }
    }

    pub fn definition(&self) -> &NetworkDefinition {
        &self.definition
    }

    pub(crate) fn activations(&self) -> &[&'static dyn ActivationFunction] {
        &self.activations
    }

    /// Current parameters.
    ///
    /// # Errors
    ///
    /// - `ModelError::NotFitted` - If the network was never trained nor given parameters
    pub fn parameters(&self) -> Result<&ParameterState, ModelError> {
        self.parameters.as_ref().ok_or(ModelError::NotFitted)
    }

    /// Replaces the parameters, e.g. with values deserialized by the caller.
    ///
    /// # Errors
    ///
    /// - `ModelError::InputValidationError` - If any layer's shape disagrees with the architecture
    pub fn set_parameters(&mut self, parameters: ParameterState) -> Result<(), ModelError> {
        parameters.check_matches(&self.definition)?;
        self.parameters = Some(parameters);
        Ok(())
    }

    pub(crate) fn install_parameters(&mut self, parameters: ParameterState) {
        self.parameters = Some(parameters);
    }

    pub(crate) fn parameters_mut(&mut self) -> Result<&mut ParameterState, ModelError> {
        self.parameters.as_mut().ok_or(ModelError::NotFitted)
    }

    /// Checks that `x` has one row per input feature and at least one example.
    pub(crate) fn check_features(&self, x: &Array2<f64>) -> Result<(), ModelError> {
        if x.nrows() != self.definition.input_dim() {
            return Err(ModelError::InputValidationError(format!(
                "Number of features does not match the network input, x rows: {}, expected: {}",
                x.nrows(),
                self.definition.input_dim()
            )));
        }
        if x.ncols() == 0 {
            return Err(ModelError::InputValidationError(
                "Input contains no examples".to_string(),
            ));
        }
        Ok(())
    }

    /// Prints a layer-by-layer summary of the architecture
    pub fn summary(&self) {
        println!("Network summary");
        println!("{:<8} {:<10} {:<10} {:<10}", "Layer", "Units", "Activation", "Params");
        println!("{}", "-".repeat(41));
        println!("{:<8} {:<10} {:<10} {:<10}", 0, self.definition.input_dim(), "input", 0);
        for (l, (pair, act)) in self
            .definition
            .dimensions()
            .windows(2)
            .zip(self.activations.iter())
            .enumerate()
        {
            println!(
                "{:<8} {:<10} {:<10} {:<10}",
                l + 1,
                pair[1],
                act.name(),
                pair[0] * pair[1] + pair[1]
            );
        }
        println!("{}", "-".repeat(41));
        println!("Total params: {}", self.definition.param_count());
    }
}

impl std::fmt::Debug for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Network")
            .field("definition", &self.definition)
            .field("fitted", &self.parameters.is_some())
            .finish()
    }
}
