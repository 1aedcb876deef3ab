// Esox ActorPool - demo host
// Runs a simulated server tick loop that acquires and releases pooled
// actors while a client replica mirrors the pool over an in-process channel.
//
// Run with: RUST_LOG=debug cargo run

use esox_actorpool::replication::{self, PoolReplica};
use esox_actorpool::{
    Actor, ActorHandle, ActorId, ActorPool, NetRole, PoolConfiguration, PoolLink, PoolObserver, PoolResult,
    PoolSlot, Poolable, World,
};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const FRAME: Duration = Duration::from_millis(16);

#[derive(Default)]
struct Turret {
    slot: PoolSlot,
}

impl Poolable for Turret {
    fn activate(&self, link: PoolLink) {
        self.slot.on_activate(link);
    }

    fn deactivate(&self) {
        self.slot.on_deactivate();
    }

    fn request_return(&self) -> PoolResult<()> {
        self.slot.request_return()
    }
}

impl Actor for Turret {
    fn as_poolable(&self) -> Option<&dyn Poolable> {
        Some(self)
    }
}

/// Client-side reaction to replicated membership changes
#[derive(Default)]
struct Visibility {
    updates: usize,
}

impl PoolObserver for Visibility {
    fn on_pool_changed(&mut self, available: &[ActorId]) {
        self.updates += 1;
        tracing::info!(hidden = available.len(), "client: pooled turrets hidden");
    }

    fn on_active_changed(&mut self, active: &[ActorId]) {
        self.updates += 1;
        tracing::info!(visible = active.len(), "client: active turrets shown");
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let world = Arc::new(World::new());
    let spawner = Arc::clone(&world);
    let host = ActorPool::new(
        move || Some(spawner.spawn(Turret::default())),
        PoolConfiguration::new().with_pool_size(4),
    );

    let pooled = host.begin_play(&NetRole::DedicatedServer)?;
    tracing::info!(?pooled, "host pool ready");

    let (tx, rx) = replication::channel();
    // Late joiner: full state first, then deltas.
    tx.send(host.snapshot());
    host.collect_delta();

    let client = tokio::task::spawn_blocking(move || {
        let mut replica = PoolReplica::new(Visibility::default());
        while let Some(delta) = rx.recv() {
            replica.apply(delta);
        }
        replica
    });

    let mut interval = tokio::time::interval(FRAME);
    let mut deployed: Vec<ActorHandle<Turret>> = Vec::new();
    for frame in 0..12u32 {
        interval.tick().await;
        host.tick(FRAME);

        match frame % 4 {
            3 => {
                if let Some(turret) = deployed.pop().and_then(|h| h.get()) {
                    // Destroyed turrets ask to go back on their own.
                    turret.request_return()?;
                }
                for handle in deployed.drain(..) {
                    host.release(&handle);
                }
            }
            _ => deployed.push(host.acquire()?),
        }

        tx.flush(&host);
    }

    drop(tx);
    let replica = client.await?;

    tracing::info!(
        host_available = host.pool_num(),
        host_active = host.active_num(),
        client_available = replica.pool_num(),
        client_active = replica.active_num(),
        client_updates = replica.observer().updates,
        world_actors = world.len(),
        "simulation finished"
    );
    println!("{}", host.export_metrics_prometheus("turrets", None));
    Ok(())
}
