/// Errors raised while validating measurements or computing derived metrics.
///
/// All variants are recoverable: the caller re-prompts for input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CalculationError {
    /// A required field is missing or could not be parsed as a number.
    #[error("invalid input: {0}")]
    InputValidation(String),
    /// A field was supplied without the field it depends on.
    #[error("missing dependent field: {0}")]
    DependentField(String),
    /// A divisor is zero, a radicand is negative, or a result is not finite.
    #[error("cannot compute {0}")]
    Domain(String),
}

pub type CalculationResult<T> = std::result::Result<T, CalculationError>;

#[derive(Debug, thiserror::Error)]
pub enum EchoError {
    #[error(transparent)]
    Calculation(#[from] CalculationError),
    #[error("invalid text: {0}")]
    InvalidText(#[from] echo_types::TextError),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("patient not found: {0}")]
    PatientNotFound(String),

    #[error("failed to read store file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to write store file: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to create store directory: {0}")]
    StoreDirCreation(std::io::Error),
    #[error("failed to serialize store: {0}")]
    Serialization(serde_json::Error),
    #[error("store schema mismatch at {path}: {source}")]
    Deserialization {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl EchoError {
    /// True for errors caused by the submitted data rather than by the system.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            EchoError::Calculation(_) | EchoError::InvalidText(_)
        )
    }
}

pub type EchoResult<T> = std::result::Result<T, EchoError>;
