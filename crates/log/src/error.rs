use thiserror::Error;

pub type CallLogResult<A> = Result<A, CallLogError>;

#[derive(Debug, Error)]
pub enum CallLogError {
    #[error("the wrapped callable has no name")]
    EmptyName,

    #[error("invalid parameter name {0:?} in the signature of {1}")]
    InvalidParameter(String, String),

    #[error("parameter {0} is declared more than once in the signature of {1}")]
    DuplicateParameter(String, String),

    #[error("default value given for unknown parameter {0} of {1}")]
    UnknownParameter(String, String),

    #[error("parameter {0} of {1} has no default but follows a parameter with one")]
    NonTrailingDefault(String, String),

    #[error("the signature of {name} declares {expected} parameters but the callable takes {actual}")]
    ArityMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("invalid logger config: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    ConfigFormat(#[from] serde_yaml::Error),
}
