use crate::error::ModelError;
use ndarray::{Array2, Axis};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// One mini-batch: a column subset of the features and the matching labels.
#[derive(Debug, Clone, PartialEq)]
pub struct MiniBatch {
    pub x: Array2<f64>,
    pub y: Array2<f64>,
}

impl MiniBatch {
    /// Number of examples (columns) in the batch
    pub fn len(&self) -> usize {
        self.x.ncols()
    }

    pub fn is_empty(&self) -> bool {
        self.x.ncols() == 0
    }
}

/// Shuffles the examples of `(x, y)` and partitions them into mini-batches.
///
/// The permutation comes from a fresh `StdRng` seeded with `seed`, so the same seed always
/// yields the same batches. There are `m / mini_batch_size` full batches, followed by one
/// smaller batch holding the remainder when `m` is not a multiple of `mini_batch_size`.
///
/// # Parameters
///
/// - `x` - Features with shape (features, m)
/// - `y` - Labels with shape (label rows, m)
/// - `mini_batch_size` - Examples per full batch
/// - `seed` - Seed of the shuffle
///
/// # Returns
///
/// - `Ok(Vec<MiniBatch>)` - `ceil(m / mini_batch_size)` batches covering every example exactly once
/// - `Err(ModelError::InputValidationError)` - If the batch size is 0 or `x` and `y` disagree on `m`
///
/// # Example
/// ```rust
/// use feedforward::neural_network::random_mini_batches;
/// use ndarray::Array2;
///
/// let x = Array2::<f64>::zeros((3, 10));
/// let y = Array2::<f64>::zeros((1, 10));
/// let batches = random_mini_batches(&x, &y, 4, 0).unwrap();
/// let sizes: Vec<usize> = batches.iter().map(|b| b.len()).collect();
/// assert_eq!(sizes, vec![4, 4, 2]);
/// ```
pub fn random_mini_batches(
    x: &Array2<f64>,
    y: &Array2<f64>,
    mini_batch_size: usize,
    seed: u64,
) -> Result<Vec<MiniBatch>, ModelError> {
    if mini_batch_size == 0 {
        return Err(ModelError::InputValidationError(
            "Batch size must be greater than 0".to_string(),
        ));
    }

    let m = x.ncols();
    if y.ncols() != m {
        return Err(ModelError::InputValidationError(format!(
            "Number of examples in x ({}) not equal to number in y ({})",
            m,
            y.ncols()
        )));
    }

    let mut permutation: Vec<usize> = (0..m).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    permutation.shuffle(&mut rng);

    let batches = permutation
        .chunks(mini_batch_size)
        .map(|indices| MiniBatch {
            x: x.select(Axis(1), indices),
            y: y.select(Axis(1), indices),
        })
        .collect();

    Ok(batches)
}
