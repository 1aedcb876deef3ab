//! Push-model change tracking and observer-side mirrors
//!
//! The host marks fields dirty as it mutates them and drains them into a
//! [`PoolDelta`]. Observers apply deltas to a [`PoolReplica`], which fires
//! [`PoolObserver`] hooks for fields whose contents actually changed.

use crate::pool::ActorPool;
use crate::handle::ActorId;
use crate::lifecycle::Actor;

use crossbeam::channel::{Receiver, Sender, unbounded};

/// Value wrapper that remembers whether it changed since the last drain
#[derive(Debug, Clone, Default)]
pub struct Replicated<T> {
    value: T,
    dirty: bool,
}

impl<T> Replicated<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            dirty: false,
        }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    /// Mutate the value and mark it dirty
    pub fn modify<R>(&mut self, f: impl FnOnce(&mut T) -> R) -> R {
        self.dirty = true;
        f(&mut self.value)
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clear the dirty flag, returning the value if it was set
    pub fn take_dirty(&mut self) -> Option<&T> {
        if std::mem::take(&mut self.dirty) {
            Some(&self.value)
        } else {
            None
        }
    }
}

/// Changed pool fields, as actor ids
///
/// `None` means the field was not touched since the previous delta.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoolDelta {
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub available: Option<Vec<ActorId>>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub active: Option<Vec<ActorId>>,
}

impl PoolDelta {
    pub fn is_empty(&self) -> bool {
        self.available.is_none() && self.active.is_none()
    }
}

/// Change notifications on the observing side
///
/// Both hooks default to doing nothing.
pub trait PoolObserver {
    fn on_pool_changed(&mut self, _available: &[ActorId]) {}

    fn on_active_changed(&mut self, _active: &[ActorId]) {}
}

impl PoolObserver for () {}

/// Observer-side copy of a host pool's membership
#[derive(Debug, Default)]
pub struct PoolReplica<O = ()> {
    available: Vec<ActorId>,
    active: Vec<ActorId>,
    observer: O,
}

impl<O: PoolObserver> PoolReplica<O> {
    pub fn new(observer: O) -> Self {
        Self {
            available: Vec::new(),
            active: Vec::new(),
            observer,
        }
    }

    /// Apply a delta received from the host
    ///
    /// Returns `true` if any field changed.
    pub fn apply(&mut self, delta: PoolDelta) -> bool {
        let mut changed = false;

        if let Some(available) = delta.available
            && available != self.available
        {
            self.available = available;
            self.observer.on_pool_changed(&self.available);
            changed = true;
        }

        if let Some(active) = delta.active
            && active != self.active
        {
            self.active = active;
            self.observer.on_active_changed(&self.active);
            changed = true;
        }

        changed
    }

    pub fn available(&self) -> &[ActorId] {
        &self.available
    }

    pub fn active(&self) -> &[ActorId] {
        &self.active
    }

    pub fn pool_num(&self) -> usize {
        self.available.len()
    }

    pub fn active_num(&self) -> usize {
        self.active.len()
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }
}

/// Create an in-process transport between a host pool and a replica
pub fn channel() -> (DeltaSender, DeltaReceiver) {
    let (tx, rx) = unbounded();
    (DeltaSender { tx }, DeltaReceiver { rx })
}

#[derive(Debug, Clone)]
pub struct DeltaSender {
    tx: Sender<PoolDelta>,
}

impl DeltaSender {
    /// Send the pool's pending changes, if any
    ///
    /// Returns `false` when nothing was dirty or the receiver is gone.
    pub fn flush<A: Actor>(&self, pool: &ActorPool<A>) -> bool {
        match pool.collect_delta() {
            Some(delta) => self.send(delta),
            None => false,
        }
    }

    pub fn send(&self, delta: PoolDelta) -> bool {
        if self.tx.send(delta).is_err() {
            tracing::warn!("replica disconnected, dropping pool delta");
            return false;
        }
        true
    }
}

#[derive(Debug)]
pub struct DeltaReceiver {
    rx: Receiver<PoolDelta>,
}

impl DeltaReceiver {
    /// Apply every queued delta to `replica`, returning how many were applied
    pub fn drain_into<O: PoolObserver>(&self, replica: &mut PoolReplica<O>) -> usize {
        let mut applied = 0;
        while let Ok(delta) = self.rx.try_recv() {
            replica.apply(delta);
            applied += 1;
        }
        applied
    }

    /// Block until the next delta arrives; `None` once the sender is gone
    pub fn recv(&self) -> Option<PoolDelta> {
        self.rx.recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Counting {
        pool_changes: usize,
        active_changes: usize,
    }

    impl PoolObserver for Counting {
        fn on_pool_changed(&mut self, _available: &[ActorId]) {
            self.pool_changes += 1;
        }

        fn on_active_changed(&mut self, _active: &[ActorId]) {
            self.active_changes += 1;
        }
    }

    fn ids(raw: &[u64]) -> Vec<ActorId> {
        raw.iter().copied().map(ActorId::new).collect()
    }

    #[test]
    fn test_replicated_dirty_cycle() {
        let mut field = Replicated::new(vec![1]);
        assert!(field.take_dirty().is_none());

        field.modify(|v| v.push(2));
        assert!(field.is_dirty());
        assert_eq!(field.take_dirty(), Some(&vec![1, 2]));
        assert!(!field.is_dirty());
    }

    #[test]
    fn test_replica_fires_only_touched_hooks() {
        let mut replica = PoolReplica::new(Counting::default());
        let changed = replica.apply(PoolDelta {
            available: Some(ids(&[1, 2])),
            active: None,
        });

        assert!(changed);
        assert_eq!(replica.observer().pool_changes, 1);
        assert_eq!(replica.observer().active_changes, 0);
        assert_eq!(replica.pool_num(), 2);
    }

    #[test]
    fn test_replica_skips_identical_values() {
        let mut replica = PoolReplica::new(Counting::default());
        let delta = PoolDelta {
            available: Some(ids(&[1])),
            active: Some(ids(&[2])),
        };
        replica.apply(delta.clone());
        assert!(!replica.apply(delta));

        assert_eq!(replica.observer().pool_changes, 1);
        assert_eq!(replica.observer().active_changes, 1);
    }

    #[test]
    fn test_channel_drains_in_order() {
        let (tx, rx) = channel();
        let mut replica = PoolReplica::new(());
        tx.send(PoolDelta {
            available: Some(ids(&[1, 2])),
            active: Some(vec![]),
        });
        tx.send(PoolDelta {
            available: Some(ids(&[1])),
            active: Some(ids(&[2])),
        });

        assert_eq!(rx.drain_into(&mut replica), 2);
        assert_eq!(replica.available(), ids(&[1]).as_slice());
        assert_eq!(replica.active(), ids(&[2]).as_slice());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_delta_omits_untouched_fields() {
        let delta = PoolDelta {
            available: None,
            active: Some(ids(&[4])),
        };
        let json = serde_json::to_string(&delta).unwrap();
        assert_eq!(json, r#"{"active":[4]}"#);

        let back: PoolDelta = serde_json::from_str(&json).unwrap();
        assert_eq!(back, delta);
    }
}
