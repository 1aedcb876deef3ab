//! Lifecycle capability for pooled actors
//!
//! Actors opt in by returning `Some(self)` from [`Actor::as_poolable`]. Actors
//! that don't are pooled by identity only and receive no callbacks.

use crate::errors::{PoolError, PoolResult};
use crate::handle::ActorId;

use parking_lot::Mutex;
use std::fmt;
use std::sync::Weak;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// An entity that can live in an [`ActorPool`](crate::ActorPool)
pub trait Actor: Send + Sync + 'static {
    /// Expose the lifecycle capability, if this actor implements it
    fn as_poolable(&self) -> Option<&dyn Poolable> {
        None
    }
}

/// Activation callbacks driven by the pool
///
/// Callbacks run with the pool unlocked, so an implementation may call back
/// into the pool (for example to return itself from `activate`).
pub trait Poolable: Send + Sync {
    /// The actor was handed out by `acquire`
    fn activate(&self, link: PoolLink);

    /// The actor was put back into the available set
    fn deactivate(&self);

    /// Ask the owning pool to take this actor back
    fn request_return(&self) -> PoolResult<()> {
        Err(PoolError::ReturnUnsupported)
    }
}

/// Pool side of a [`PoolLink`]
pub(crate) trait ReturnToPool: Send + Sync {
    fn return_actor(&self, id: ActorId) -> PoolResult<()>;
}

/// Weak back-reference from an active actor to the pool that activated it
///
/// The link never keeps the pool alive.
#[derive(Clone)]
pub struct PoolLink {
    actor: ActorId,
    pool: Weak<dyn ReturnToPool>,
}

impl PoolLink {
    pub(crate) fn new(actor: ActorId, pool: Weak<dyn ReturnToPool>) -> Self {
        Self { actor, pool }
    }

    /// Identity of the actor this link was issued for
    pub fn actor_id(&self) -> ActorId {
        self.actor
    }

    /// Whether the owning pool still exists
    pub fn is_alive(&self) -> bool {
        self.pool.strong_count() > 0
    }

    /// Release the linked actor back to its pool
    pub fn return_to_pool(&self) -> PoolResult<()> {
        let pool = self.pool.upgrade().ok_or(PoolError::PoolDropped)?;
        pool.return_actor(self.actor)
    }
}

impl fmt::Debug for PoolLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolLink")
            .field("actor", &self.actor)
            .field("alive", &self.is_alive())
            .finish()
    }
}

/// Ready-made bookkeeping for [`Poolable`] implementations
///
/// # Examples
///
/// ```
/// use esox_actorpool::{Actor, PoolLink, PoolResult, PoolSlot, Poolable};
///
/// #[derive(Default)]
/// struct Projectile {
///     slot: PoolSlot,
/// }
///
/// impl Poolable for Projectile {
///     fn activate(&self, link: PoolLink) {
///         self.slot.on_activate(link);
///     }
///
///     fn deactivate(&self) {
///         self.slot.on_deactivate();
///     }
///
///     fn request_return(&self) -> PoolResult<()> {
///         self.slot.request_return()
///     }
/// }
///
/// impl Actor for Projectile {
///     fn as_poolable(&self) -> Option<&dyn Poolable> {
///         Some(self)
///     }
/// }
/// ```
#[derive(Default)]
pub struct PoolSlot {
    link: Mutex<Option<PoolLink>>,
    active: AtomicBool,
    activations: AtomicUsize,
    deactivations: AtomicUsize,
}

impl PoolSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_activate(&self, link: PoolLink) {
        *self.link.lock() = Some(link);
        self.active.store(true, Ordering::Release);
        self.activations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn on_deactivate(&self) {
        self.active.store(false, Ordering::Release);
        self.deactivations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Link from the most recent activation
    pub fn link(&self) -> Option<PoolLink> {
        self.link.lock().clone()
    }

    pub fn activation_count(&self) -> usize {
        self.activations.load(Ordering::Relaxed)
    }

    pub fn deactivation_count(&self) -> usize {
        self.deactivations.load(Ordering::Relaxed)
    }

    /// Return the owning actor through the stored link
    pub fn request_return(&self) -> PoolResult<()> {
        // The pool calls `on_deactivate` while returning; the slot lock must be free by then.
        let link = self.link().ok_or(PoolError::Unlinked)?;
        link.return_to_pool()
    }
}

impl fmt::Debug for PoolSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolSlot")
            .field("active", &self.is_active())
            .field("activations", &self.activation_count())
            .field("deactivations", &self.deactivation_count())
            .finish()
    }
}
