/// Error types that can occur while building, training or querying a network
///
/// # Variants
///
/// - `NotFitted` - Indicates that the network has no parameters yet (neither trained nor loaded)
/// - `InputValidationError` - Indicates a configuration problem: mismatched architecture, badly shaped data or invalid hyperparameters
/// - `ProcessingError` - Indicates that the forward/backward/update protocol was driven out of order
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    NotFitted,
    InputValidationError(String),
    ProcessingError(String),
}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelError::NotFitted => {
                write!(
                    f,
                    "Network has no parameters. Train it or load parameters before predicting."
                )
            }
            ModelError::InputValidationError(msg) => write!(f, "Input validation error: {}", msg),
            ModelError::ProcessingError(msg) => write!(f, "Processing error: {}", msg),
        }
    }
}

/// Implements the standard error trait for ModelError
impl std::error::Error for ModelError {}
