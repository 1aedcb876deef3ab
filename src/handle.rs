//! Actor identities and non-owning handles

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

static NEXT_ACTOR_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identity of an actor, stable across host and observers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ActorId(u64);

impl ActorId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Allocate an id that no other actor in this process has
    pub fn next() -> Self {
        Self(NEXT_ACTOR_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "actor#{}", self.0)
    }
}

/// Non-owning reference to an actor held by a [`World`](crate::World)
///
/// The handle stays comparable after the actor is destroyed; it just stops
/// being valid. Equality and hashing use the [`ActorId`] only.
///
/// # Examples
///
/// ```
/// use esox_actorpool::{Actor, World};
///
/// struct Crate;
/// impl Actor for Crate {}
///
/// let world = World::new();
/// let handle = world.spawn(Crate);
/// assert!(handle.is_valid());
///
/// world.destroy(handle.id());
/// assert!(!handle.is_valid());
/// ```
pub struct ActorHandle<A> {
    id: ActorId,
    actor: Weak<A>,
}

impl<A> ActorHandle<A> {
    pub(crate) fn new(id: ActorId, actor: &Arc<A>) -> Self {
        Self {
            id,
            actor: Arc::downgrade(actor),
        }
    }

    /// A handle that never refers to a live actor
    pub fn invalid(id: ActorId) -> Self {
        Self {
            id,
            actor: Weak::new(),
        }
    }

    pub fn id(&self) -> ActorId {
        self.id
    }

    /// Whether the owning world still keeps the actor alive
    pub fn is_valid(&self) -> bool {
        self.actor.strong_count() > 0
    }

    /// Borrow the actor for the duration of the returned `Arc`
    pub fn get(&self) -> Option<Arc<A>> {
        self.actor.upgrade()
    }
}

impl<A> Clone for ActorHandle<A> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            actor: Weak::clone(&self.actor),
        }
    }
}

impl<A> PartialEq for ActorHandle<A> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<A> Eq for ActorHandle<A> {}

impl<A> Hash for ActorHandle<A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<A> fmt::Debug for ActorHandle<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActorHandle")
            .field("id", &self.id)
            .field("valid", &self.is_valid())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_handle() {
        let handle: ActorHandle<u32> = ActorHandle::invalid(ActorId::new(7));
        assert!(!handle.is_valid());
        assert!(handle.get().is_none());
        assert_eq!(handle.id().get(), 7);
    }

    #[test]
    fn test_equality_ignores_liveness() {
        let actor = Arc::new(5u32);
        let live = ActorHandle::new(ActorId::new(1), &actor);
        let dead: ActorHandle<u32> = ActorHandle::invalid(ActorId::new(1));
        assert_eq!(live, dead);

        drop(actor);
        assert!(!live.is_valid());
    }

    #[test]
    fn test_next_is_unique() {
        let a = ActorId::next();
        let b = ActorId::next();
        assert_ne!(a, b);
    }

    #[test]
    fn test_display() {
        assert_eq!(ActorId::new(42).to_string(), "actor#42");
    }
}
