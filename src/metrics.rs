//! Metrics collection and export for actor pools

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Metrics data for a pool
///
/// # Examples
///
/// ```
/// use esox_actorpool::{Actor, ActorPool, PoolConfiguration, World};
/// use std::sync::Arc;
///
/// struct Crate;
/// impl Actor for Crate {}
///
/// let world = Arc::new(World::new());
/// let spawner = Arc::clone(&world);
/// let pool = ActorPool::new(move || Some(spawner.spawn(Crate)), PoolConfiguration::new().with_pool_size(3));
/// pool.initialize().unwrap();
///
/// let _actor = pool.acquire().unwrap();
/// let metrics = pool.get_metrics();
/// assert_eq!(metrics.total_acquired, 1);
/// assert_eq!(metrics.active_actors, 1);
/// assert_eq!(metrics.available_actors, 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PoolMetrics {
    /// Total actors handed out by `acquire`
    pub total_acquired: usize,

    /// Total releases accepted
    pub total_released: usize,

    /// Actors created because the pool was empty
    pub created_on_demand: usize,

    /// Factory calls that produced no valid actor
    pub factory_failures: usize,

    /// Pooled handles dropped because their actor was destroyed
    pub stale_discarded: usize,

    /// Current active actors
    pub active_actors: usize,

    /// Current available actors
    pub available_actors: usize,

    /// Share of tracked actors that are active (0.0 to 1.0)
    pub utilization: f64,
}

impl PoolMetrics {
    /// Export metrics as a HashMap
    pub fn export(&self) -> HashMap<String, String> {
        let mut metrics = HashMap::new();
        metrics.insert("total_acquired".to_string(), self.total_acquired.to_string());
        metrics.insert("total_released".to_string(), self.total_released.to_string());
        metrics.insert("created_on_demand".to_string(), self.created_on_demand.to_string());
        metrics.insert("factory_failures".to_string(), self.factory_failures.to_string());
        metrics.insert("stale_discarded".to_string(), self.stale_discarded.to_string());
        metrics.insert("active_actors".to_string(), self.active_actors.to_string());
        metrics.insert("available_actors".to_string(), self.available_actors.to_string());
        metrics.insert("utilization".to_string(), format!("{:.2}", self.utilization));
        metrics
    }
}

/// Metrics exporter for Prometheus format
pub struct MetricsExporter;

impl MetricsExporter {
    /// Export metrics in Prometheus exposition format
    ///
    /// # Examples
    ///
    /// ```
    /// use esox_actorpool::{Actor, ActorPool, PoolConfiguration};
    /// use std::collections::HashMap;
    ///
    /// struct Crate;
    /// impl Actor for Crate {}
    ///
    /// let pool = ActorPool::<Crate>::new(|| None, PoolConfiguration::default());
    ///
    /// let mut tags = HashMap::new();
    /// tags.insert("map".to_string(), "arena".to_string());
    ///
    /// let output = pool.export_metrics_prometheus("projectiles", Some(&tags));
    /// assert!(output.contains("actorpool_actors_active"));
    /// assert!(output.contains("map=\"arena\""));
    /// ```
    pub fn export_prometheus(
        metrics: &PoolMetrics,
        pool_name: &str,
        tags: Option<&HashMap<String, String>>,
    ) -> String {
        let mut output = String::new();
        let labels = Self::format_labels(pool_name, tags);

        // Gauge metrics
        Self::write_metric(&mut output, "actorpool_actors_active", "gauge", "Current active actors", &labels, metrics.active_actors);
        Self::write_metric(&mut output, "actorpool_actors_available", "gauge", "Current available actors", &labels, metrics.available_actors);
        output.push_str("# HELP actorpool_utilization Pool utilization ratio\n");
        output.push_str("# TYPE actorpool_utilization gauge\n");
        output.push_str(&format!("actorpool_utilization{{{}}} {:.2}\n", labels, metrics.utilization));

        // Counter metrics
        Self::write_metric(&mut output, "actorpool_acquired_total", "counter", "Total actors acquired", &labels, metrics.total_acquired);
        Self::write_metric(&mut output, "actorpool_released_total", "counter", "Total actors released", &labels, metrics.total_released);
        Self::write_metric(&mut output, "actorpool_created_on_demand_total", "counter", "Actors created because the pool was empty", &labels, metrics.created_on_demand);
        Self::write_metric(&mut output, "actorpool_factory_failures_total", "counter", "Factory calls that produced no actor", &labels, metrics.factory_failures);
        Self::write_metric(&mut output, "actorpool_stale_discarded_total", "counter", "Destroyed actors dropped from the pool", &labels, metrics.stale_discarded);

        output
    }

    fn write_metric(output: &mut String, name: &str, kind: &str, help: &str, labels: &str, value: usize) {
        output.push_str(&format!("# HELP {} {}\n", name, help));
        output.push_str(&format!("# TYPE {} {}\n", name, kind));
        output.push_str(&format!("{}{{{}}} {}\n", name, labels, value));
    }

    fn format_labels(pool_name: &str, tags: Option<&HashMap<String, String>>) -> String {
        let mut labels = vec![format!("pool=\"{}\"", pool_name)];

        if let Some(tags) = tags {
            let mut tags: Vec<_> = tags.iter().collect();
            tags.sort();
            for (key, value) in tags {
                labels.push(format!("{}=\"{}\"", key, value));
            }
        }

        labels.join(",")
    }
}

/// Internal metrics tracker
#[derive(Default)]
pub(crate) struct MetricsTracker {
    pub total_acquired: AtomicUsize,
    pub total_released: AtomicUsize,
    pub created_on_demand: AtomicUsize,
    pub factory_failures: AtomicUsize,
    pub stale_discarded: AtomicUsize,
}

impl MetricsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_metrics(&self, active: usize, available: usize) -> PoolMetrics {
        let tracked = active + available;
        let utilization = if tracked > 0 {
            active as f64 / tracked as f64
        } else {
            0.0
        };

        PoolMetrics {
            total_acquired: self.total_acquired.load(Ordering::Relaxed),
            total_released: self.total_released.load(Ordering::Relaxed),
            created_on_demand: self.created_on_demand.load(Ordering::Relaxed),
            factory_failures: self.factory_failures.load(Ordering::Relaxed),
            stale_discarded: self.stale_discarded.load(Ordering::Relaxed),
            active_actors: active,
            available_actors: available,
            utilization,
        }
    }
}
