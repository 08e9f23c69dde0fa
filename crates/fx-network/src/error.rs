//! Error types for network operations.

use fx_fluids::FluidError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NetError {
    #[error("invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("port mapping rejected: {what}")]
    PortMapping { what: String },

    #[error("admittance matrix is singular: {what}")]
    SingularSystem { what: &'static str },

    #[error("link error: {message}")]
    Link { message: String },

    #[error(transparent)]
    Fluid(#[from] FluidError),
}

pub type NetResult<T> = Result<T, NetError>;
