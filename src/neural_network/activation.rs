use crate::error::ModelError;
use ndarray::Array2;
use std::fmt;
use std::str::FromStr;

/// Rectified linear unit
pub mod relu;
/// Logistic sigmoid
pub mod sigmoid;
/// Hyperbolic tangent
pub mod tanh;

pub use relu::*;
pub use sigmoid::*;
pub use tanh::*;

/// Element count at which elementwise activation maps switch to rayon.
/// Below this the thread-pool overhead dominates.
const ACTIVATION_PARALLEL_THRESHOLD: usize = 10_000;

/// Applies `f` elementwise to a copy of `z`, in parallel for large matrices.
fn map_elementwise(z: &Array2<f64>, f: impl Fn(f64) -> f64 + Sync + Send) -> Array2<f64> {
    let mut out = z.clone();
    if out.len() >= ACTIVATION_PARALLEL_THRESHOLD {
        out.par_mapv_inplace(f);
    } else {
        out.mapv_inplace(f);
    }
    out
}

/// Strategy object for one activation kind.
///
/// Both methods are pure and shape-preserving. `backward` receives the upstream
/// gradient `dA` and the cached pre-activation `Z` and returns `dZ`.
pub trait ActivationFunction: Send + Sync {
    /// Computes `A = g(Z)`.
    fn forward(&self, z: &Array2<f64>) -> Array2<f64>;

    /// Computes `dZ = dA * g'(Z)`.
    fn backward(&self, da: &Array2<f64>, z: &Array2<f64>) -> Array2<f64>;

    /// Lower-case name of the activation, as accepted by [`ActivationKind::from_str`].
    fn name(&self) -> &'static str;
}

/// Activation kinds a layer can be configured with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivationKind {
    Sigmoid,
    ReLU,
    Tanh,
}

impl ActivationKind {
    /// Resolves the kind into its strategy object.
    ///
    /// The returned reference points at a stateless static instance, so a network can
    /// resolve every layer once and keep the result for its whole lifetime.
    pub fn resolve(self) -> &'static dyn ActivationFunction {
        match self {
            ActivationKind::Sigmoid => &Sigmoid,
            ActivationKind::ReLU => &ReLU,
            ActivationKind::Tanh => &Tanh,
        }
    }
}

impl fmt::Display for ActivationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.resolve().name())
    }
}

impl FromStr for ActivationKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sigmoid" => Ok(ActivationKind::Sigmoid),
            "relu" => Ok(ActivationKind::ReLU),
            "tanh" => Ok(ActivationKind::Tanh),
            other => Err(ModelError::InputValidationError(format!(
                "Unknown activation function '{}', expected one of: sigmoid, relu, tanh",
                other
            ))),
        }
    }
}
