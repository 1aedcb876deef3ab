//! Pool configuration options

/// Configuration for actor pool behavior
///
/// # Examples
///
/// ```
/// use esox_actorpool::PoolConfiguration;
///
/// let config = PoolConfiguration::new()
///     .with_pool_size(32)
///     .with_spawn_on_non_authority(true);
///
/// assert_eq!(config.pool_size, 32);
/// assert!(config.initialize_on_start);
/// assert!(config.spawn_on_non_authority);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PoolConfiguration {
    /// Whether `begin_play` fills the pool automatically
    pub initialize_on_start: bool,

    /// Number of actors created by `initialize` (at least 1)
    pub pool_size: usize,

    /// Allow `begin_play` to fill the pool without authority
    pub spawn_on_non_authority: bool,

    /// Drop pooled handles whose actor was destroyed instead of handing them out
    pub discard_stale_on_acquire: bool,
}

impl Default for PoolConfiguration {
    fn default() -> Self {
        Self {
            initialize_on_start: true,
            pool_size: 10,
            spawn_on_non_authority: false,
            discard_stale_on_acquire: true,
        }
    }
}

impl PoolConfiguration {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of actors created on initialization
    ///
    /// Values below 1 are clamped to 1.
    ///
    /// ```
    /// use esox_actorpool::PoolConfiguration;
    ///
    /// let config = PoolConfiguration::new().with_pool_size(0);
    /// assert_eq!(config.pool_size, 1);
    /// ```
    pub fn with_pool_size(mut self, size: usize) -> Self {
        self.pool_size = size.max(1);
        self
    }

    /// Enable or disable initialization in `begin_play`
    pub fn with_initialize_on_start(mut self, enabled: bool) -> Self {
        self.initialize_on_start = enabled;
        self
    }

    /// Allow initialization on non-authoritative replicas
    pub fn with_spawn_on_non_authority(mut self, enabled: bool) -> Self {
        self.spawn_on_non_authority = enabled;
        self
    }

    /// Report destroyed pooled actors instead of skipping past them
    ///
    /// `acquire` then consumes the stale entry and fails with
    /// [`PoolError::Stale`](crate::PoolError::Stale) rather than trying the
    /// next available actor.
    pub fn with_stale_handles(mut self) -> Self {
        self.discard_stale_on_acquire = false;
        self
    }

    /// Pool size with the lower bound applied, for configurations built by hand
    /// or deserialized.
    pub(crate) fn effective_pool_size(&self) -> usize {
        self.pool_size.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PoolConfiguration::default();
        assert!(config.initialize_on_start);
        assert_eq!(config.pool_size, 10);
        assert!(!config.spawn_on_non_authority);
        assert!(config.discard_stale_on_acquire);
    }

    #[test]
    fn test_effective_size_clamps_literal_zero() {
        let config = PoolConfiguration {
            pool_size: 0,
            ..Default::default()
        };
        assert_eq!(config.effective_pool_size(), 1);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_partial() {
        let config: PoolConfiguration =
            serde_json::from_str(r#"{"pool_size": 4, "spawn_on_non_authority": true}"#).unwrap();
        assert_eq!(config.pool_size, 4);
        assert!(config.spawn_on_non_authority);
        assert!(config.initialize_on_start);
    }
}
