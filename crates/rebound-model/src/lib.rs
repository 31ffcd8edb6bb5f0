mod error;
pub use error::{ModelError, ModelResult};

mod kind;
pub use kind::BackoffCategory;

mod strategy;
pub use strategy::{BackoffStrategy, JitterStrategy};
