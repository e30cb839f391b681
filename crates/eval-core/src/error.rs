use thiserror::Error;

#[derive(Error, Debug)]
pub enum EvalError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Empty input: {0}")]
    EmptyInput(String),

    #[error("Model has not been fitted")]
    ModelNotFitted,
}
