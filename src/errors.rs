//! Error types for the actor pool

use crate::handle::ActorId;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    #[error("Pool is empty and the factory failed to create an actor")]
    FactoryFailed,

    #[error("Pooled actor {0} was destroyed outside the pool")]
    Stale(ActorId),

    #[error("Pool has already been initialized")]
    AlreadyInitialized,

    #[error("Actor does not support returning itself to the pool")]
    ReturnUnsupported,

    #[error("Actor has not been activated by any pool")]
    Unlinked,

    #[error("Owning pool no longer exists")]
    PoolDropped,

    #[error("Actor {0} is not active in this pool")]
    NotActive(ActorId),
}

pub type PoolResult<T> = Result<T, PoolError>;
