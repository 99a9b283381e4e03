use crate::error::ModelError;
use std::fmt;
use std::sync::Arc;

/// Parameter update rule used during training
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OptimizationStrategy {
    /// Plain (mini-batch stochastic) gradient descent
    #[default]
    Plain,
    /// Adam: bias-corrected first and second moment estimates
    Adam,
}

/// How the learning rate evolves from one epoch to the next.
///
/// The schedule is queried at the end of every epoch with that epoch's index; its result is
/// the learning rate used for the following epoch.
#[derive(Clone, Default)]
pub enum LearningRateSchedule {
    /// `max(min_learning_rate, initial_learning_rate / (1 + learning_rate_decay * epoch))`
    #[default]
    InverseTime,
    /// Caller-supplied function of the epoch index
    Custom(Arc<dyn Fn(usize) -> f64 + Send + Sync>),
}

impl LearningRateSchedule {
    /// Wraps a closure as a custom schedule
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(usize) -> f64 + Send + Sync + 'static,
    {
        LearningRateSchedule::Custom(Arc::new(f))
    }

    /// Learning rate after `epoch` has finished.
    pub fn learning_rate(&self, epoch: usize, hps: &HyperParameters) -> f64 {
        match self {
            LearningRateSchedule::InverseTime => {
                let decayed =
                    hps.initial_learning_rate / (1.0 + hps.learning_rate_decay * epoch as f64);
                decayed.max(hps.min_learning_rate)
            }
            LearningRateSchedule::Custom(f) => f(epoch),
        }
    }
}

impl fmt::Debug for LearningRateSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LearningRateSchedule::InverseTime => f.write_str("InverseTime"),
            LearningRateSchedule::Custom(_) => f.write_str("Custom(<fn>)"),
        }
    }
}

/// Hyperparameters of one training run.
///
/// Passed explicitly to [`crate::neural_network::Network::train`]; the network keeps no copy.
///
/// # Fields
///
/// - `mini_batch_size` - Examples per gradient step, must be > 0
/// - `regularize` / `lambda` - Enable L2 weight decay and its strength (>= 0)
/// - `dropout` / `keep_prob` - Enable inverted dropout and its retention probability in [0, 1]
/// - `optimization_strategy` - Plain gradient descent or Adam
/// - `initial_learning_rate`, `learning_rate_decay`, `min_learning_rate` - Inputs of the default schedule
/// - `learning_rate_schedule` - Default inverse-time decay or a custom function
/// - `beta1`, `beta2`, `adam_epsilon` - Adam constants
/// - `num_epochs` - Number of passes over the training set
/// - `seed` - Seed for initialization, dropout masks and the per-epoch shuffle
#[derive(Debug, Clone)]
pub struct HyperParameters {
    pub mini_batch_size: usize,

    pub regularize: bool,
    pub lambda: f64,

    pub dropout: bool,
    pub keep_prob: f64,

    pub optimization_strategy: OptimizationStrategy,

    pub initial_learning_rate: f64,
    pub learning_rate_decay: f64,
    pub min_learning_rate: f64,
    pub learning_rate_schedule: LearningRateSchedule,

    pub beta1: f64,
    pub beta2: f64,
    pub adam_epsilon: f64,

    pub num_epochs: usize,
    pub seed: u64,
}

impl Default for HyperParameters {
    /// Default training configuration.
    ///
    /// # Default Values
    ///
    /// - `mini_batch_size`: `256`
    /// - `regularize`: `false`, `lambda`: `1.0`
    /// - `dropout`: `false`, `keep_prob`: `0.9`
    /// - `optimization_strategy`: `Plain`
    /// - `initial_learning_rate`: `0.075`, `learning_rate_decay`: `0.0009`, `min_learning_rate`: `0.001`
    /// - `beta1`: `0.9`, `beta2`: `0.999`, `adam_epsilon`: `1e-8`
    /// - `num_epochs`: `10000`
    /// - `seed`: `0`
    fn default() -> Self {
        HyperParameters {
            mini_batch_size: 256,
            regularize: false,
            lambda: 1.0,
            dropout: false,
            keep_prob: 0.9,
            optimization_strategy: OptimizationStrategy::Plain,
            initial_learning_rate: 0.075,
            learning_rate_decay: 0.0009,
            min_learning_rate: 0.001,
            learning_rate_schedule: LearningRateSchedule::InverseTime,
            beta1: 0.9,
            beta2: 0.999,
            adam_epsilon: 1e-8,
            num_epochs: 10000,
            seed: 0,
        }
    }
}

impl HyperParameters {
    /// L2 strength if regularization is enabled
    pub fn l2_lambda(&self) -> Option<f64> {
        self.regularize.then_some(self.lambda)
    }

    /// Retention probability if dropout is enabled
    pub fn dropout_keep_prob(&self) -> Option<f64> {
        self.dropout.then_some(self.keep_prob)
    }

    /// Learning rate to use after `epoch` has finished
    pub fn learning_rate_after(&self, epoch: usize) -> f64 {
        self.learning_rate_schedule.learning_rate(epoch, self)
    }

    /// Validates the values of the configuration.
    ///
    /// A `keep_prob` of exactly 0 is accepted; it propagates as NaN/Inf through the
    /// activations rather than being rejected.
    ///
    /// # Errors
    ///
    /// - `ModelError::InputValidationError` - If the mini-batch size is 0, `lambda` or a learning
    ///   rate parameter is negative or non-finite, `keep_prob` is outside [0, 1] while dropout is
    ///   enabled, a beta is outside [0, 1), or epsilon is not positive and finite
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.mini_batch_size == 0 {
            return Err(ModelError::InputValidationError(
                "mini_batch_size must be greater than 0".to_string(),
            ));
        }
        validate_non_negative(self.lambda, "lambda")?;
        validate_non_negative(self.initial_learning_rate, "initial_learning_rate")?;
        validate_non_negative(self.learning_rate_decay, "learning_rate_decay")?;
        validate_non_negative(self.min_learning_rate, "min_learning_rate")?;

        if self.dropout && !(0.0..=1.0).contains(&self.keep_prob) {
            return Err(ModelError::InputValidationError(format!(
                "keep_prob must be in range [0, 1], got {}",
                self.keep_prob
            )));
        }

        if self.optimization_strategy == OptimizationStrategy::Adam {
            validate_decay_rate(self.beta1, "beta1")?;
            validate_decay_rate(self.beta2, "beta2")?;
            if !(self.adam_epsilon > 0.0 && self.adam_epsilon.is_finite()) {
                return Err(ModelError::InputValidationError(format!(
                    "adam_epsilon must be positive and finite, got {}",
                    self.adam_epsilon
                )));
            }
        }
        Ok(())
    }
}

fn validate_non_negative(value: f64, param_name: &str) -> Result<(), ModelError> {
    if !(value >= 0.0 && value.is_finite()) {
        return Err(ModelError::InputValidationError(format!(
            "{} must be non-negative and finite, got {}",
            param_name, value
        )));
    }
    Ok(())
}

fn validate_decay_rate(value: f64, param_name: &str) -> Result<(), ModelError> {
    if !((0.0..1.0).contains(&value) && value.is_finite()) {
        return Err(ModelError::InputValidationError(format!(
            "{} must be in range [0, 1) and finite, got {}",
            param_name, value
        )));
    }
    Ok(())
}
