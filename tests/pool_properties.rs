//! Property tests for pool membership and lifecycle invariants.

use std::collections::HashSet;
use std::sync::Arc;

use esox_actorpool::{
    Actor, ActorHandle, ActorPool, PoolConfiguration, PoolLink, PoolSlot, Poolable, World,
};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Test actor
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Probe {
    slot: PoolSlot,
}

impl Poolable for Probe {
    fn activate(&self, link: PoolLink) {
        assert!(!self.slot.is_active(), "activated twice without deactivation");
        self.slot.on_activate(link);
    }

    fn deactivate(&self) {
        self.slot.on_deactivate();
    }
}

impl Actor for Probe {
    fn as_poolable(&self) -> Option<&dyn Poolable> {
        Some(self)
    }
}

#[derive(Debug, Clone)]
enum Op {
    Acquire,
    Release(usize),
    Destroy(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => Just(Op::Acquire),
        3 => any::<usize>().prop_map(Op::Release),
        1 => any::<usize>().prop_map(Op::Destroy),
    ]
}

fn probe_pool(size: usize) -> (Arc<World<Probe>>, ActorPool<Probe>) {
    let world = Arc::new(World::new());
    let spawner = Arc::clone(&world);
    let pool = ActorPool::new(
        move || Some(spawner.spawn(Probe::default())),
        PoolConfiguration::new().with_pool_size(size),
    );
    (world, pool)
}

fn assert_disjoint(pool: &ActorPool<Probe>) {
    let snapshot = pool.snapshot();
    let available = snapshot.available.unwrap();
    let active = snapshot.active.unwrap();

    let available_set: HashSet<_> = available.iter().collect();
    let active_set: HashSet<_> = active.iter().collect();
    assert_eq!(available_set.len(), available.len(), "duplicate in available");
    assert_eq!(active_set.len(), active.len(), "duplicate in active");
    assert!(available_set.is_disjoint(&active_set));
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn membership_stays_disjoint(
        size in 1usize..6,
        ops in proptest::collection::vec(op(), 1..60),
    ) {
        let (world, pool) = probe_pool(size);
        pool.initialize().unwrap();
        let mut seen: Vec<ActorHandle<Probe>> = Vec::new();

        for op in ops {
            match op {
                Op::Acquire => {
                    let handle = pool.acquire().unwrap();
                    prop_assert!(!pool.is_available(&handle));
                    if !seen.contains(&handle) {
                        seen.push(handle);
                    }
                }
                Op::Release(i) if !seen.is_empty() => {
                    let handle = &seen[i % seen.len()];
                    let accepted = pool.release(handle);
                    if handle.is_valid() {
                        prop_assert!(pool.is_available(handle));
                        prop_assert!(!pool.is_active(handle));
                    } else {
                        prop_assert!(!accepted);
                    }
                }
                Op::Destroy(i) if !seen.is_empty() => {
                    world.destroy(seen[i % seen.len()].id());
                }
                _ => {}
            }
            assert_disjoint(&pool);
        }
    }

    #[test]
    fn activations_balance_with_accepted_releases(
        size in 1usize..5,
        ops in proptest::collection::vec(prop_oneof![Just(true), Just(false)], 1..40),
    ) {
        let (_world, pool) = probe_pool(size);
        pool.initialize().unwrap();
        let mut held: Vec<ActorHandle<Probe>> = Vec::new();
        let mut all: Vec<ActorHandle<Probe>> = Vec::new();
        let mut accepted = 0usize;

        for acquire in ops {
            if acquire || held.is_empty() {
                let handle = pool.acquire().unwrap();
                if !all.contains(&handle) {
                    all.push(handle.clone());
                }
                held.push(handle);
            } else {
                let handle = held.remove(0);
                if pool.release(&handle) {
                    accepted += 1;
                }
            }
        }

        let activations: usize = all.iter().map(|h| h.get().unwrap().slot.activation_count()).sum();
        let metrics = pool.get_metrics();
        prop_assert_eq!(activations, metrics.total_acquired);
        prop_assert_eq!(accepted, metrics.total_released);

        for handle in &all {
            let probe = handle.get().unwrap();
            prop_assert_eq!(probe.slot.is_active(), held.contains(handle));
        }
    }

    #[test]
    fn round_trip_restores_sizes(size in 1usize..8, rounds in 1usize..10) {
        let (_world, pool) = probe_pool(size);
        pool.initialize().unwrap();

        for _ in 0..rounds {
            let handle = pool.acquire().unwrap();
            pool.release(&handle);
            prop_assert_eq!(pool.pool_num(), size);
            prop_assert_eq!(pool.active_num(), 0);
        }
    }

    #[test]
    fn growth_past_configured_size(size in 1usize..8) {
        let (world, pool) = probe_pool(size);
        pool.initialize().unwrap();

        let handles: Vec<_> = (0..=size).map(|_| pool.acquire().unwrap()).collect();
        prop_assert_eq!(pool.active_num(), size + 1);
        prop_assert_eq!(pool.pool_num(), 0);
        prop_assert_eq!(world.len(), size + 1);

        let last = &handles[size];
        prop_assert!(handles[..size].iter().all(|h| h != last));
        prop_assert_eq!(last.get().unwrap().slot.deactivation_count(), 0);
    }
}
