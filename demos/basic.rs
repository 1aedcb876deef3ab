//! Basic usage examples for ActorPool

use esox_actorpool::{Actor, ActorPool, NetRole, PoolConfiguration, World};
use std::sync::Arc;

struct Crate;

impl Actor for Crate {}

fn main() {
    println!("=== Esox ActorPool - Basic Examples ===\n");

    // Example 1: Pool filled at startup
    startup_pool();

    // Example 2: Growing past the configured size
    on_demand_growth();

    // Example 3: Clients wait for replication
    client_startup();

    // Example 4: Metrics
    metrics();
}

fn crate_pool(size: usize) -> ActorPool<Crate> {
    let world = Arc::new(World::new());
    ActorPool::new(
        move || Some(world.spawn(Crate)),
        PoolConfiguration::new().with_pool_size(size),
    )
}

fn startup_pool() {
    println!("1. Startup Pool:");
    let pool = crate_pool(3);
    let pooled = pool.begin_play(&NetRole::Standalone).unwrap();
    println!("   Pooled at startup: {:?}", pooled);

    let actor = pool.acquire().unwrap();
    println!("   Acquired {}", actor.id());
    println!("   Available: {}, Active: {}", pool.pool_num(), pool.active_num());

    pool.release(&actor);
    println!("   After release - Available: {}\n", pool.pool_num());
}

fn on_demand_growth() {
    println!("2. On-demand Growth:");
    let pool = crate_pool(2);
    pool.initialize().unwrap();

    let handles: Vec<_> = (0..3).map(|_| pool.acquire().unwrap()).collect();
    println!("   Acquired {} actors from a pool of 2", handles.len());
    println!("   Active: {}, Available: {}\n", pool.active_num(), pool.pool_num());
}

fn client_startup() {
    println!("3. Client Startup:");
    let pool = crate_pool(5);
    let pooled = pool.begin_play(&NetRole::Client).unwrap();
    println!("   Pooled on client: {:?}", pooled);
    println!("   Initialized: {}\n", pool.is_initialized());
}

fn metrics() {
    println!("4. Metrics:");
    let pool = crate_pool(4);
    pool.initialize().unwrap();
    let a = pool.acquire().unwrap();
    let _b = pool.acquire().unwrap();
    pool.release(&a);

    for (key, value) in pool.export_metrics() {
        println!("     {}: {}", key, value);
    }
}
