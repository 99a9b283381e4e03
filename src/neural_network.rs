/// Module that contains the activation functions and their derivatives
pub mod activation;
/// Module that contains the backward propagation engine
pub mod backward;
/// Module that contains the forward propagation engine and its training cache
pub mod forward;
/// Module that contains training hyperparameters and the learning-rate schedule
pub mod hyper_parameters;
/// Module that contains the cost function
pub mod loss_function;
/// Module that contains mini-batch partitioning
pub mod mini_batch;
/// Module that contains the network definition and the network itself
pub mod network;
/// Module that contains the parameter update rules
pub mod optimizer;
/// Module that contains weights, biases and gradients
pub mod parameter;
/// Module that contains the training loop
pub mod trainer;

pub use activation::*;
pub use forward::*;
pub use hyper_parameters::*;
pub use mini_batch::*;
pub use network::*;
pub use optimizer::*;
pub use parameter::*;
pub use trainer::*;
