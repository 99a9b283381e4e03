pub use crate::error::ModelError;
pub use crate::metric::accuracy;
pub use crate::neural_network::{
    ActivationFunction, ActivationKind, HyperParameters, LayerParameters, LearningRateSchedule,
    Network, NetworkDefinition, OptimizationStrategy, ParameterState, TrainingReport,
};
