//! Error types for the distributed interface.

use fx_fluids::FluidError;
use fx_network::NetError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InterfaceError {
    /// Rejected at initialization; fatal.
    #[error("invalid configuration: {what}")]
    Config { what: &'static str },

    /// Inbound payload content that cannot be applied; fails the tick.
    #[error("invalid interface data: {what}")]
    InvalidData { what: &'static str },

    #[error(transparent)]
    Fluid(#[from] FluidError),
}

pub type InterfaceResult<T> = Result<T, InterfaceError>;

impl From<InterfaceError> for NetError {
    fn from(e: InterfaceError) -> Self {
        NetError::Link {
            message: e.to_string(),
        }
    }
}
