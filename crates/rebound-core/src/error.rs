use thiserror::Error;

use rebound_model::ModelError;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("config error: {0}")]
    Config(String),

    #[error("model error: {0}")]
    Model(#[from] ModelError),
}

pub type CoreResult<T> = Result<T, CoreError>;
