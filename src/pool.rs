//! Core actor pool implementation

use crate::authority::Authority;
use crate::config::PoolConfiguration;
use crate::errors::{PoolError, PoolResult};
use crate::handle::{ActorHandle, ActorId};
use crate::lifecycle::{Actor, PoolLink, ReturnToPool};
use crate::metrics::{MetricsExporter, MetricsTracker, PoolMetrics};
use crate::replication::{PoolDelta, Replicated};

use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

/// Producer of new actors, invoked by `initialize` and by `acquire` when the
/// pool is exhausted
///
/// Returning `None` (or an already-invalid handle) is a failed creation.
pub trait ActorFactory<A>: Send + Sync {
    fn make_actor(&self) -> Option<ActorHandle<A>>;
}

impl<A, F> ActorFactory<A> for F
where
    F: Fn() -> Option<ActorHandle<A>> + Send + Sync,
{
    fn make_actor(&self) -> Option<ActorHandle<A>> {
        self()
    }
}

struct PoolState<A> {
    available: Replicated<Vec<ActorHandle<A>>>,
    active: Replicated<Vec<ActorHandle<A>>>,
    /// Claimed by a release whose `deactivate` callback is still running
    returning: Vec<ActorId>,
}

impl<A> PoolState<A> {
    fn new() -> Self {
        Self {
            available: Replicated::new(Vec::new()),
            active: Replicated::new(Vec::new()),
            returning: Vec::new(),
        }
    }

    fn is_active_id(&self, id: ActorId) -> bool {
        self.active.get().iter().any(|h| h.id() == id)
    }

    fn mark_all_dirty(&mut self) {
        self.available.mark_dirty();
        self.active.mark_dirty();
    }
}

struct PoolShared<A: Actor> {
    state: Mutex<PoolState<A>>,
    factory: Box<dyn ActorFactory<A>>,
    config: PoolConfiguration,
    metrics: MetricsTracker,
    initialized: AtomicBool,
    this: Weak<PoolShared<A>>,
}

/// Replicated pool of reusable actors
///
/// Keeps two disjoint ordered sets of handles: available (idle) and active
/// (checked out). Lifecycle-aware actors are deactivated when they enter the
/// available set and activated when handed out. Every mutation marks the
/// affected set dirty for [`collect_delta`](Self::collect_delta).
///
/// Cloning is cheap and yields another handle to the same pool.
///
/// # Examples
///
/// ```
/// use esox_actorpool::{Actor, ActorPool, NetRole, PoolConfiguration, World};
/// use std::sync::Arc;
///
/// struct Crate;
/// impl Actor for Crate {}
///
/// let world = Arc::new(World::new());
/// let spawner = Arc::clone(&world);
/// let pool = ActorPool::new(
///     move || Some(spawner.spawn(Crate)),
///     PoolConfiguration::new().with_pool_size(4),
/// );
///
/// pool.begin_play(&NetRole::DedicatedServer).unwrap();
/// assert_eq!(pool.pool_num(), 4);
///
/// let actor = pool.acquire().unwrap();
/// assert_eq!(pool.active_num(), 1);
///
/// pool.release(&actor);
/// assert_eq!(pool.pool_num(), 4);
/// assert_eq!(pool.active_num(), 0);
/// ```
pub struct ActorPool<A: Actor> {
    shared: Arc<PoolShared<A>>,
}

impl<A: Actor> ActorPool<A> {
    /// Create an empty pool around a factory closure
    pub fn new<F>(factory: F, config: PoolConfiguration) -> Self
    where
        F: Fn() -> Option<ActorHandle<A>> + Send + Sync + 'static,
    {
        Self::from_factory(factory, config)
    }

    /// Create an empty pool around any [`ActorFactory`]
    pub fn from_factory<F>(factory: F, config: PoolConfiguration) -> Self
    where
        F: ActorFactory<A> + 'static,
    {
        let shared = Arc::new_cyclic(|this| PoolShared {
            state: Mutex::new(PoolState::new()),
            factory: Box::new(factory),
            config,
            metrics: MetricsTracker::new(),
            initialized: AtomicBool::new(false),
            this: Weak::clone(this),
        });
        Self { shared }
    }

    /// Startup routine: fill the pool if configured to and allowed by `authority`
    ///
    /// Returns `Ok(None)` when initialization was skipped, otherwise the number
    /// of actors pooled.
    pub fn begin_play(&self, authority: &impl Authority) -> PoolResult<Option<usize>> {
        let config = &self.shared.config;
        if !config.initialize_on_start {
            return Ok(None);
        }

        if authority.has_authority() || config.spawn_on_non_authority {
            self.initialize().map(Some)
        } else {
            tracing::debug!("no authority, waiting for replicated pool state");
            Ok(None)
        }
    }

    /// Fill the available set with up to `pool_size` fresh actors
    ///
    /// Factory failures are skipped, so the pool may end up smaller than
    /// configured. May only run once per pool.
    pub fn initialize(&self) -> PoolResult<usize> {
        self.shared.initialize()
    }

    /// Take an actor out of the pool, creating one if none is available
    ///
    /// Fails with [`PoolError::NotActive`] when the actor returned itself to
    /// the pool from inside its `activate` callback.
    pub fn acquire(&self) -> PoolResult<ActorHandle<A>> {
        self.shared.acquire()
    }

    /// Take an actor out of the pool, or `None` if none could be produced
    pub fn try_acquire(&self) -> Option<ActorHandle<A>> {
        self.acquire().ok()
    }

    /// Put an actor back into the available set
    ///
    /// Handles that were never active are adopted. Returns `false` without
    /// side effects for invalid handles, for handles already available and
    /// for handles another caller is currently releasing.
    pub fn release(&self, handle: &ActorHandle<A>) -> bool {
        self.shared.release(handle)
    }

    /// Per-frame hook; the pool has no per-frame work of its own
    pub fn tick(&self, delta: Duration) {
        tracing::trace!(?delta, "pool tick");
    }

    /// Number of available actors
    pub fn pool_num(&self) -> usize {
        self.shared.state.lock().available.get().len()
    }

    /// Number of active actors
    pub fn active_num(&self) -> usize {
        self.shared.state.lock().active.get().len()
    }

    pub fn is_available(&self, handle: &ActorHandle<A>) -> bool {
        self.shared.state.lock().available.get().contains(handle)
    }

    pub fn is_active(&self, handle: &ActorHandle<A>) -> bool {
        self.shared.state.lock().active.get().contains(handle)
    }

    pub fn is_initialized(&self) -> bool {
        self.shared.initialized.load(Ordering::Acquire)
    }

    pub fn config(&self) -> &PoolConfiguration {
        &self.shared.config
    }

    /// Drain the fields changed since the previous call
    pub fn collect_delta(&self) -> Option<PoolDelta> {
        let mut state = self.shared.state.lock();
        let delta = PoolDelta {
            available: state.available.take_dirty().map(|handles| ids(handles)),
            active: state.active.take_dirty().map(|handles| ids(handles)),
        };
        (!delta.is_empty()).then_some(delta)
    }

    /// Full state, for observers joining late; leaves dirty flags untouched
    pub fn snapshot(&self) -> PoolDelta {
        let state = self.shared.state.lock();
        PoolDelta {
            available: Some(ids(state.available.get())),
            active: Some(ids(state.active.get())),
        }
    }

    /// Get pool metrics
    pub fn get_metrics(&self) -> PoolMetrics {
        let (active, available) = {
            let state = self.shared.state.lock();
            (state.active.get().len(), state.available.get().len())
        };
        self.shared.metrics.get_metrics(active, available)
    }

    /// Export metrics
    pub fn export_metrics(&self) -> HashMap<String, String> {
        self.get_metrics().export()
    }

    /// Export metrics in Prometheus format
    pub fn export_metrics_prometheus(
        &self,
        pool_name: &str,
        tags: Option<&HashMap<String, String>>,
    ) -> String {
        let metrics = self.get_metrics();
        MetricsExporter::export_prometheus(&metrics, pool_name, tags)
    }
}

impl<A: Actor> Clone for ActorPool<A> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<A: Actor> fmt::Debug for ActorPool<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.state.lock();
        f.debug_struct("ActorPool")
            .field("available", &state.available.get().len())
            .field("active", &state.active.get().len())
            .field("config", &self.shared.config)
            .finish()
    }
}

fn ids<A>(handles: &[ActorHandle<A>]) -> Vec<ActorId> {
    handles.iter().map(ActorHandle::id).collect()
}

impl<A: Actor> PoolShared<A> {
    fn initialize(&self) -> PoolResult<usize> {
        if self.initialized.swap(true, Ordering::AcqRel) {
            return Err(PoolError::AlreadyInitialized);
        }

        let requested = self.config.effective_pool_size();
        let mut created: Vec<ActorHandle<A>> = Vec::with_capacity(requested);
        for _ in 0..requested {
            let Some(handle) = self.create_actor() else {
                continue;
            };
            if created.contains(&handle) {
                tracing::warn!(id = %handle.id(), "factory returned an actor twice");
                continue;
            }
            if let Some(actor) = handle.get()
                && let Some(poolable) = actor.as_poolable()
            {
                poolable.deactivate();
            }
            created.push(handle);
        }

        let pooled = self.state.lock().available.modify(|available| {
            let before = available.len();
            for handle in created {
                if !available.contains(&handle) {
                    available.push(handle);
                }
            }
            available.len() - before
        });

        if pooled < requested {
            tracing::warn!(requested, pooled, "pool initialized below requested size");
        } else {
            tracing::debug!(pooled, "pool initialized");
        }
        Ok(pooled)
    }

    fn acquire(&self) -> PoolResult<ActorHandle<A>> {
        let pooled = {
            let mut state = self.state.lock();
            let popped = self.pop_available(&mut state)?;
            if let Some(handle) = &popped {
                state.active.modify(|active| active.push(handle.clone()));
                state.mark_all_dirty();
            }
            popped
        };

        let handle = match pooled {
            Some(handle) => handle,
            None => {
                let handle = self.create_actor().ok_or(PoolError::FactoryFailed)?;
                MetricsTracker::record(&self.metrics.created_on_demand);
                let mut state = self.state.lock();
                state.active.modify(|active| active.push(handle.clone()));
                state.mark_all_dirty();
                handle
            }
        };

        MetricsTracker::record(&self.metrics.total_acquired);
        if let Some(actor) = handle.get()
            && let Some(poolable) = actor.as_poolable()
        {
            poolable.activate(self.link_for(handle.id()));

            // The actor may have returned itself from inside `activate`.
            if !self.state.lock().is_active_id(handle.id()) {
                tracing::debug!(id = %handle.id(), "actor left the active set during activation");
                return Err(PoolError::NotActive(handle.id()));
            }
        }

        tracing::debug!(id = %handle.id(), "actor acquired");
        Ok(handle)
    }

    /// Pop the most recently pooled handle, skipping destroyed actors when configured to
    fn pop_available(&self, state: &mut PoolState<A>) -> PoolResult<Option<ActorHandle<A>>> {
        while !state.available.get().is_empty() {
            let Some(handle) = state.available.modify(Vec::pop) else {
                break;
            };
            if handle.is_valid() {
                return Ok(Some(handle));
            }

            MetricsTracker::record(&self.metrics.stale_discarded);
            tracing::warn!(id = %handle.id(), "pooled actor was destroyed externally");
            if !self.config.discard_stale_on_acquire {
                return Err(PoolError::Stale(handle.id()));
            }
        }
        Ok(None)
    }

    fn release(&self, handle: &ActorHandle<A>) -> bool {
        let Some(actor) = handle.get() else {
            tracing::debug!(id = %handle.id(), "ignoring release of invalid actor");
            return false;
        };

        {
            let mut state = self.state.lock();
            if state.available.get().contains(handle) || state.returning.contains(&handle.id()) {
                tracing::debug!(id = %handle.id(), "actor already in pool");
                return false;
            }
            state.active.modify(|active| active.retain(|h| h != handle));
            state.returning.push(handle.id());
        }

        if let Some(poolable) = actor.as_poolable() {
            poolable.deactivate();
        }

        {
            let mut state = self.state.lock();
            state.returning.retain(|id| *id != handle.id());
            state.available.modify(|available| available.push(handle.clone()));
        }

        MetricsTracker::record(&self.metrics.total_released);
        tracing::debug!(id = %handle.id(), "actor released");
        true
    }

    fn create_actor(&self) -> Option<ActorHandle<A>> {
        match self.factory.make_actor() {
            Some(handle) if handle.is_valid() => Some(handle),
            _ => {
                MetricsTracker::record(&self.metrics.factory_failures);
                tracing::warn!("actor factory produced no valid actor");
                None
            }
        }
    }

    fn link_for(&self, id: ActorId) -> PoolLink {
        let pool: Weak<dyn ReturnToPool> = Weak::clone(&self.this) as Weak<dyn ReturnToPool>;
        PoolLink::new(id, pool)
    }
}

impl<A: Actor> ReturnToPool for PoolShared<A> {
    fn return_actor(&self, id: ActorId) -> PoolResult<()> {
        let handle = {
            let state = self.state.lock();
            state.active.get().iter().find(|h| h.id() == id).cloned()
        };

        match handle {
            Some(handle) if self.release(&handle) => Ok(()),
            _ => Err(PoolError::NotActive(id)),
        }
    }
}
