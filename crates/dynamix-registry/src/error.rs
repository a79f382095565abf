//! Registry and host errors.

use dynamix_dynamics::EngineError;
use thiserror::Error;

use crate::host::SlotId;

/// Errors from [`ProcessorRegistry`](crate::ProcessorRegistry).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// No entry with this ID.
    #[error("unknown processor '{0}'")]
    UnknownProcessor(String),

    /// An entry with this ID already exists.
    #[error("processor '{0}' is already registered")]
    Duplicate(String),

    /// The processor could not be built.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Errors from a [`NativeHost`](crate::NativeHost).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// The registry has no processor with this ID.
    #[error("unknown processor '{0}'")]
    UnknownProcessor(String),

    /// The slot holds nothing.
    #[error("slot {0} is not loaded")]
    NotLoaded(SlotId),

    /// `load` targeted a slot that already holds a processor.
    #[error("slot {0} is already loaded")]
    AlreadyLoaded(SlotId),

    /// The processor rejected a call.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl From<RegistryError> for HostError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::UnknownProcessor(id) | RegistryError::Duplicate(id) => {
                HostError::UnknownProcessor(id)
            }
            RegistryError::Engine(err) => HostError::Engine(err),
        }
    }
}
