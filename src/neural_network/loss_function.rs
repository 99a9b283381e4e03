/// Binary cross-entropy cost paired with a sigmoid output layer
pub mod binary_cross_entropy;

pub use binary_cross_entropy::*;
