//! # Esox ActorPool
//!
//! Replicated pool of reusable actors for tick-driven networked simulations.
//!
//! ## Features
//!
//! - Two disjoint membership sets (available / active) with LIFO reuse
//! - On-demand creation through a pluggable factory when the pool runs dry
//! - Optional lifecycle callbacks (`activate`, `deactivate`, `request_return`)
//! - Weak actor-to-pool links so actors can return themselves
//! - Push-model dirty tracking and deltas for host-to-observer replication
//! - Observer-side replicas with change hooks
//! - Authority-gated startup initialization
//! - Metrics with Prometheus text export
//!
//! ## Quick Start
//!
//! ```rust
//! use esox_actorpool::{Actor, ActorPool, NetRole, PoolConfiguration, World};
//! use std::sync::Arc;
//!
//! struct Bullet;
//! impl Actor for Bullet {}
//!
//! let world = Arc::new(World::new());
//! let spawner = Arc::clone(&world);
//! let pool = ActorPool::new(move || Some(spawner.spawn(Bullet)), PoolConfiguration::default());
//! pool.begin_play(&NetRole::Standalone).unwrap();
//!
//! let bullet = pool.acquire().unwrap();
//! // ... fire it ...
//! pool.release(&bullet);
//! assert_eq!(pool.pool_num(), 10);
//! ```

mod authority;
mod config;
mod errors;
mod handle;
mod lifecycle;
mod metrics;
mod pool;
pub mod replication;
mod world;

pub use authority::{Authority, NetRole};
pub use config::PoolConfiguration;
pub use errors::{PoolError, PoolResult};
pub use handle::{ActorHandle, ActorId};
pub use lifecycle::{Actor, PoolLink, PoolSlot, Poolable};
pub use metrics::{MetricsExporter, PoolMetrics};
pub use pool::{ActorFactory, ActorPool};
pub use replication::{PoolDelta, PoolObserver, PoolReplica, Replicated};
pub use world::World;
