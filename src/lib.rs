//! A from-scratch dense feed-forward neural network trainer.
//!
//! The crate implements a multilayer perceptron for binary classification with
//! hand-coded forward and backward propagation (no automatic differentiation),
//! mini-batch training with plain gradient descent or Adam, L2 weight decay and
//! inverted dropout.
//!
//! # Data layout
//!
//! - Scalars are `f64`, matrices are [`ndarray::Array2`].
//! - Features `X` have shape `(features, examples)`: one column per example.
//! - Labels `Y` have shape `(1, examples)` and hold 0 or 1.
//! - Layer `l` has weights of shape `(dimensions[l], dimensions[l - 1])` and a bias
//!   column of shape `(dimensions[l], 1)`.
//!
//! # Logging
//!
//! Training progress is emitted through [`tracing`] at `info` level; install any
//! subscriber to see it. The crate never installs one itself.
//!
//! # Example
//! ```rust
//! use feedforward::prelude::*;
//! use ndarray::array;
//!
//! let x = array![[0.0, 0.5, 5.0, 5.5], [0.5, 0.0, 5.5, 5.0]];
//! let y = array![[0.0, 0.0, 1.0, 1.0]];
//!
//! let mut net = Network::new(
//!     vec![2, 3, 1],
//!     vec![ActivationKind::Tanh, ActivationKind::Sigmoid],
//! )
//! .unwrap();
//!
//! let mut hps = HyperParameters::default();
//! hps.num_epochs = 50;
//! hps.optimization_strategy = OptimizationStrategy::Adam;
//! hps.initial_learning_rate = 0.01;
//!
//! let report = net.train(&x, &y, Some(&hps)).unwrap();
//! println!("final cost: {:?}", report.final_cost());
//!
//! let predictions = net.predict(&x).unwrap();
//! println!("accuracy: {}", accuracy(&predictions, &y).unwrap());
//! ```

/// Error type shared by every fallible operation of the crate.
pub mod error;

/// Evaluation metrics for binary predictions.
///
/// - **accuracy**: fraction of predictions equal to the true labels
pub mod metric;

/// Components of the dense network and its training engine.
///
/// # Core Components
///
/// ## Activations
/// - **ActivationKind**: `Sigmoid`, `ReLU`, `Tanh`, resolved once per layer into an
///   [`neural_network::ActivationFunction`] strategy exposing `forward` and `backward`
///
/// ## Network
/// - **NetworkDefinition**: layer widths and per-layer activations
/// - **Network**: definition plus parameters; `train`, `predict`, `predict_proba`
/// - **ParameterState** / **Gradients**: per-layer weights, biases and their gradients
///
/// ## Propagation
/// - **train_forward** returns a [`neural_network::TrainingCache`] consumed by **backward**
/// - **predict_forward** runs inference without caching or dropout
///
/// ## Optimization
/// - **GradientDescent** and **Adam** behind the [`neural_network::Optimizer`] trait
/// - **HyperParameters**: mini-batch size, L2, dropout, learning-rate schedule, Adam constants
/// - **random_mini_batches**: seeded shuffle and partition of the training set
pub mod neural_network;

/// A convenience module that re-exports the most commonly used types of this crate.
pub mod prelude;

pub use error::ModelError;
