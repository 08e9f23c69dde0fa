//! Error types for fluid operations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FluidError {
    #[error("invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("non-physical condition: {what}")]
    NonPhysical { what: &'static str },
}

pub type FluidResult<T> = Result<T, FluidError>;
