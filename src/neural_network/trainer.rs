use crate::error::ModelError;
use crate::metric::accuracy;
use crate::neural_network::loss_function::{cost, l2_penalty};
use crate::neural_network::{HyperParameters, Network, ParameterState, random_mini_batches};
use ndarray::Array2;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Result of a training run.
///
/// # Fields
///
/// - `costs` - Cost of every mini-batch, in processing order (`num_epochs * batches per epoch` entries)
/// - `final_learning_rate` - Learning rate the schedule produced after the last epoch
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingReport {
    pub costs: Vec<f64>,
    pub final_learning_rate: f64,
}

impl TrainingReport {
    /// Cost of the last mini-batch processed, if any
    pub fn final_cost(&self) -> Option<f64> {
        self.costs.last().copied()
    }
}

/// Whether the training loop reports progress after `epoch`.
///
/// Reports happen on epochs 0, 1 and 2, on exact powers of ten, and whenever `epoch` is a
/// multiple of `num_epochs / 100`. That quotient is taken in floating point, so runs shorter
/// than 100 epochs compare against a fractional interval: with 50 epochs every epoch
/// reports (interval 0.5), with 30 epochs only epochs that happen to divide evenly by 0.3 do.
pub fn should_report(epoch: usize, num_epochs: usize) -> bool {
    if epoch <= 2 || is_power_of_ten(epoch) {
        return true;
    }
    let interval = num_epochs as f64 / 100.0;
    epoch as f64 % interval == 0.0
}

fn is_power_of_ten(mut n: usize) -> bool {
    if n == 0 {
        return false;
    }
    while n % 10 == 0 {
        n /= 10;
    }
    n == 1
}

impl Network {
    /// Trains the network on labeled data with mini-batch gradient descent or Adam.
    ///
    /// Parameters are re-initialized (He initialization, zero biases) at the start of every
    /// call, then every epoch shuffles the data with the configured seed, runs
    /// forward → cost → backward → update on each mini-batch in order, and finally advances
    /// the learning-rate schedule. There is no early stopping: all `num_epochs` epochs run.
    ///
    /// # Parameters
    ///
    /// - `x` - Features with shape (input_dim, m)
    /// - `y` - Binary labels with shape (1, m)
    /// - `hyper_params` - Training configuration, `None` for [`HyperParameters::default`]
    ///
    /// # Returns
    ///
    /// - `Ok(TrainingReport)` - Per-mini-batch cost trace and the final learning rate
    /// - `Err(ModelError::InputValidationError)` - If the example counts differ, `y` is not a
    ///   single row, `x` has the wrong number of features, the network output is wider than one
    ///   unit, or the hyperparameters are invalid
    ///
    /// # Numerical edge cases
    ///
    /// Saturated outputs (`AL` exactly 0 or 1) and `keep_prob = 0` are not guarded; they show up
    /// as NaN/Inf in the cost trace and parameters.
    pub fn train(
        &mut self,
        x: &Array2<f64>,
        y: &Array2<f64>,
        hyper_params: Option<&HyperParameters>,
    ) -> Result<TrainingReport, ModelError> {
        let default_hps = HyperParameters::default();
        let hps = hyper_params.unwrap_or(&default_hps);
        hps.validate()?;
        self.check_labels(x, y)?;

        let mut rng = StdRng::seed_from_u64(hps.seed);
        let params = ParameterState::he_initialized(self.definition(), &mut rng);
        let mut optimizer = hps.optimization_strategy.build(&params, hps);
        self.install_parameters(params);

        let keep_prob = hps.dropout_keep_prob();
        let lambda = hps.l2_lambda();
        let mut learning_rate = hps.initial_learning_rate;
        let mut costs = Vec::new();

        tracing::debug!(
            examples = x.ncols(),
            epochs = hps.num_epochs,
            mini_batch_size = hps.mini_batch_size,
            strategy = ?hps.optimization_strategy,
            "starting training"
        );

        for epoch in 0..hps.num_epochs {
            for batch in random_mini_batches(x, y, hps.mini_batch_size, hps.seed)? {
                let cache = self.train_forward(&batch.x, keep_prob, &mut rng)?;
                costs.push(self.compute_cost(cache.output(), &batch.y, lambda)?);

                let grads = self.backward(&cache, &batch.y, lambda)?;
                optimizer.step(
                    self.parameters_mut()?,
                    &grads,
                    learning_rate,
                    cache.keep_masks(),
                )?;
            }

            learning_rate = hps.learning_rate_after(epoch);

            if should_report(epoch, hps.num_epochs) {
                let train_accuracy = accuracy(&self.predict(x)?, y)?;
                let cost = costs.last().copied().unwrap_or(f64::NAN);
                tracing::info!(epoch, cost, train_accuracy, learning_rate, "training progress");
            }
        }

        tracing::debug!(
            updates = costs.len(),
            final_learning_rate = learning_rate,
            "training finished"
        );

        Ok(TrainingReport {
            costs,
            final_learning_rate: learning_rate,
        })
    }

    /// Binary predictions: 1 where the output activation is strictly greater than 0.5, else 0.
    ///
    /// # Errors
    ///
    /// - `ModelError::NotFitted` - If the network was never trained nor given parameters
    /// - `ModelError::InputValidationError` - If `x` has the wrong number of rows or no columns
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array2<f64>, ModelError> {
        Ok(self
            .predict_forward(x)?
            .mapv(|a| if a > 0.5 { 1.0 } else { 0.0 }))
    }

    /// Output activations before thresholding; an alias of [`Network::predict_forward`].
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>, ModelError> {
        self.predict_forward(x)
    }

    /// Binary cross-entropy of `al` against `y`, plus `lambda / (2m) * Σ W²` when `lambda`
    /// is given (`m` being the number of examples in `y`).
    ///
    /// # Errors
    ///
    /// - `ModelError::InputValidationError` - If `al` and `y` differ in shape or are empty
    /// - `ModelError::NotFitted` - If `lambda` is given and the network has no parameters
    pub fn compute_cost(
        &self,
        al: &Array2<f64>,
        y: &Array2<f64>,
        lambda: Option<f64>,
    ) -> Result<f64, ModelError> {
        if al.dim() != y.dim() || y.is_empty() {
            return Err(ModelError::InputValidationError(format!(
                "Predictions of shape {:?} cannot be scored against labels of shape {:?}",
                al.dim(),
                y.dim()
            )));
        }

        let mut total = cost(al, y);
        if let Some(lambda) = lambda {
            total += l2_penalty(self.parameters()?.squared_weight_sum(), lambda, y.ncols());
        }
        Ok(total)
    }

    /// Validates the data handed to [`Network::train`].
    fn check_labels(&self, x: &Array2<f64>, y: &Array2<f64>) -> Result<(), ModelError> {
        if x.ncols() != y.ncols() {
            return Err(ModelError::InputValidationError(format!(
                "Number of examples in x {:?} not equal to number in y {:?}",
                x.dim(),
                y.dim()
            )));
        }
        if y.nrows() != 1 {
            return Err(ModelError::InputValidationError(format!(
                "Shape of y {:?} must have exactly one row",
                y.dim()
            )));
        }
        if self.definition().output_dim() != 1 {
            return Err(ModelError::InputValidationError(format!(
                "Binary training needs a single output unit, network has {}",
                self.definition().output_dim()
            )));
        }
        self.check_features(x)
    }
}
