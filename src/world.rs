//! Minimal actor store that owns actors on behalf of a session
//!
//! Pools only ever see weak [`ActorHandle`]s; whoever owns the `World` decides
//! when an actor dies.

use crate::handle::{ActorHandle, ActorId};

use dashmap::DashMap;
use std::sync::Arc;

/// Ids come from [`ActorId::next`], so actors from different worlds never
/// share an identity.
pub struct World<A> {
    actors: DashMap<ActorId, Arc<A>>,
}

impl<A> World<A> {
    pub fn new() -> Self {
        Self {
            actors: DashMap::new(),
        }
    }

    /// Take ownership of `actor` and return a handle to it
    pub fn spawn(&self, actor: A) -> ActorHandle<A> {
        let id = ActorId::next();
        let actor = Arc::new(actor);
        let handle = ActorHandle::new(id, &actor);
        self.actors.insert(id, actor);
        tracing::trace!(%id, "spawned actor");
        handle
    }

    /// Drop the world's reference; outstanding handles become invalid
    pub fn destroy(&self, id: ActorId) -> bool {
        let removed = self.actors.remove(&id).is_some();
        if removed {
            tracing::debug!(%id, "destroyed actor");
        }
        removed
    }

    pub fn get(&self, id: ActorId) -> Option<Arc<A>> {
        self.actors.get(&id).map(|entry| Arc::clone(entry.value()))
    }

    /// Handle for an actor this world already owns
    pub fn handle(&self, id: ActorId) -> Option<ActorHandle<A>> {
        self.actors.get(&id).map(|entry| ActorHandle::new(id, entry.value()))
    }

    pub fn contains(&self, id: ActorId) -> bool {
        self.actors.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }
}

impl<A> Default for World<A> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_assigns_unique_ids() {
        let world = World::new();
        let a = world.spawn("a");
        let b = world.spawn("b");
        assert_ne!(a.id(), b.id());
        assert_eq!(world.len(), 2);
        assert_eq!(*world.get(b.id()).unwrap(), "b");
    }

    #[test]
    fn test_ids_unique_across_worlds() {
        let first = World::new();
        let second = World::new();
        let a = first.spawn(1u8);
        let b = second.spawn(2u8);
        assert_ne!(a.id(), b.id());
        assert_ne!(a, b);
    }

    #[test]
    fn test_destroy_invalidates_handles() {
        let world = World::new();
        let handle = world.spawn(10u8);
        assert!(world.destroy(handle.id()));
        assert!(!world.destroy(handle.id()));
        assert!(!handle.is_valid());
        assert!(world.handle(handle.id()).is_none());
        assert!(world.is_empty());
    }
}
