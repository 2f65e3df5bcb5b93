//! Configuration Module
//!
//! Cache manager options, store selection and the demo service settings.
//! Values can be deserialized from any serde source or loaded from
//! environment variables.

use std::env;

use serde::Deserialize;

/// Base freshness window used when none (or zero) is configured.
pub const DEFAULT_EXPIRY: u64 = 300;

/// Default capacity of the local store.
pub const DEFAULT_MAX_ENTRIES: usize = 1000;

/// Default key prefix for the Redis store.
pub const DEFAULT_NAMESPACE: &str = "scache";

// == Cache Config ==
/// Options fixed at manager construction.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Base freshness window in seconds (0 falls back to the default)
    #[serde(default = "default_expiry")]
    pub expiry: u64,
    /// Freshness window granted to stale data when recomputation fails, 0 disables
    #[serde(default)]
    pub failover_expiry: u64,
    /// Re-hash explicit `cache_key` values instead of using them verbatim
    #[serde(default)]
    pub hash: bool,
    /// Store backend selection
    #[serde(default)]
    pub store: StoreConfig,
    /// Periodic reset schedule
    #[serde(default)]
    pub reset: Option<ResetConfig>,
}

impl CacheConfig {
    /// Loads cache options from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_EXPIRY` - Base expiry in seconds (default: 300)
    /// - `CACHE_FAILOVER_EXPIRY` - Failover expiry in seconds (default: 0)
    /// - `CACHE_HASH_KEYS` - Hash explicit keys (default: false)
    /// - `CACHE_MAX_ENTRIES` - Local store capacity (default: 1000)
    /// - `CACHE_MAX_AGE` - Local store max age in seconds (default: none)
    /// - `REDIS_URL` - Selects the Redis store when set
    /// - `REDIS_NAMESPACE` - Redis key prefix (default: "scache")
    /// - `CACHE_RESET_INTERVAL` - Reset interval in ms (default: no reset)
    /// - `CACHE_FIRST_RESET` - Delay before the first reset in ms
    pub fn from_env() -> Self {
        let store = match env::var("REDIS_URL") {
            Ok(url) if !url.is_empty() => StoreConfig::Redis(RedisConfig {
                url,
                namespace: env::var("REDIS_NAMESPACE")
                    .unwrap_or_else(|_| DEFAULT_NAMESPACE.to_string()),
                ttl: None,
            }),
            _ => StoreConfig::Local {
                max_entries: env_parse("CACHE_MAX_ENTRIES").unwrap_or(DEFAULT_MAX_ENTRIES),
                max_age: env_parse("CACHE_MAX_AGE"),
            },
        };

        let reset = env_parse::<u64>("CACHE_RESET_INTERVAL").map(|interval_ms| ResetConfig {
            interval_ms,
            first_reset_ms: env_parse("CACHE_FIRST_RESET"),
        });

        Self {
            expiry: env_parse("CACHE_EXPIRY").unwrap_or(DEFAULT_EXPIRY),
            failover_expiry: env_parse("CACHE_FAILOVER_EXPIRY").unwrap_or(0),
            hash: env_parse("CACHE_HASH_KEYS").unwrap_or(false),
            store,
            reset,
        }
    }

    /// Base expiry with the zero fallback applied.
    pub fn effective_expiry(&self) -> u64 {
        if self.expiry == 0 {
            DEFAULT_EXPIRY
        } else {
            self.expiry
        }
    }

    /// Sets the base expiry.
    pub fn with_expiry(mut self, expiry: u64) -> Self {
        self.expiry = expiry;
        self
    }

    /// Sets the failover expiry.
    pub fn with_failover_expiry(mut self, failover_expiry: u64) -> Self {
        self.failover_expiry = failover_expiry;
        self
    }

    /// Enables hashing of explicit keys.
    pub fn with_hash(mut self, hash: bool) -> Self {
        self.hash = hash;
        self
    }

    /// Replaces the store selection.
    pub fn with_store(mut self, store: StoreConfig) -> Self {
        self.store = store;
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            expiry: DEFAULT_EXPIRY,
            failover_expiry: 0,
            hash: false,
            store: StoreConfig::default(),
            reset: None,
        }
    }
}

// == Store Config ==
/// Which store backend the manager constructs.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StoreConfig {
    /// Bounded in-process LRU store
    Local {
        #[serde(default = "default_max_entries")]
        max_entries: usize,
        /// Seconds after which the store forgets an entry
        #[serde(default)]
        max_age: Option<u64>,
    },
    /// Remote Redis store
    Redis(RedisConfig),
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::Local {
            max_entries: DEFAULT_MAX_ENTRIES,
            max_age: None,
        }
    }
}

/// Connection options for the Redis store.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RedisConfig {
    /// Connection URL, e.g. `redis://127.0.0.1:6379`
    pub url: String,
    /// Prefix applied to every key
    #[serde(default = "default_namespace")]
    pub namespace: String,
    /// Redis-side TTL in seconds
    #[serde(default)]
    pub ttl: Option<u64>,
}

/// Schedule for the periodic reset task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ResetConfig {
    /// Interval between resets in milliseconds
    pub interval_ms: u64,
    /// Delay before the first reset; defaults to the interval
    #[serde(default)]
    pub first_reset_ms: Option<u64>,
}

// == Service Config ==
/// Settings for the demo HTTP service.
#[derive(Debug, Clone)]
pub struct Config {
    /// Cache manager options
    pub cache: CacheConfig,
    /// HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Loads the service configuration from environment variables.
    ///
    /// `SERVER_PORT` sets the HTTP port (default: 3000); cache options are
    /// read by [`CacheConfig::from_env`].
    pub fn from_env() -> Self {
        Self {
            cache: CacheConfig::from_env(),
            server_port: env_parse("SERVER_PORT").unwrap_or(3000),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache: CacheConfig::default(),
            server_port: 3000,
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

fn default_expiry() -> u64 {
    DEFAULT_EXPIRY
}

fn default_max_entries() -> usize {
    DEFAULT_MAX_ENTRIES
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.cache.expiry, 300);
        assert_eq!(config.cache.failover_expiry, 0);
        assert!(!config.cache.hash);
        assert!(config.cache.reset.is_none());
        assert_eq!(config.server_port, 3000);
        assert_eq!(
            config.cache.store,
            StoreConfig::Local {
                max_entries: 1000,
                max_age: None
            }
        );
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        for var in [
            "CACHE_EXPIRY",
            "CACHE_FAILOVER_EXPIRY",
            "CACHE_HASH_KEYS",
            "CACHE_MAX_ENTRIES",
            "CACHE_MAX_AGE",
            "REDIS_URL",
            "CACHE_RESET_INTERVAL",
            "CACHE_FIRST_RESET",
            "SERVER_PORT",
        ] {
            env::remove_var(var);
        }

        let config = Config::from_env();
        assert_eq!(config.cache.expiry, 300);
        assert_eq!(config.cache.failover_expiry, 0);
        assert!(matches!(config.cache.store, StoreConfig::Local { .. }));
        assert!(config.cache.reset.is_none());
        assert_eq!(config.server_port, 3000);
    }

    #[test]
    fn test_zero_expiry_falls_back_to_default() {
        let config = CacheConfig::default().with_expiry(0);
        assert_eq!(config.effective_expiry(), DEFAULT_EXPIRY);
        assert_eq!(config.with_expiry(60).effective_expiry(), 60);
    }

    #[test]
    fn test_deserialize_local_options() {
        let json = r#"{"expiry": 120, "failover_expiry": 30, "hash": true}"#;
        let config: CacheConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.expiry, 120);
        assert_eq!(config.failover_expiry, 30);
        assert!(config.hash);
        assert_eq!(config.store, StoreConfig::default());
    }

    #[test]
    fn test_deserialize_redis_options() {
        let json = r#"{
            "store": {"backend": "redis", "url": "redis://127.0.0.1:6379"},
            "reset": {"interval_ms": 10000, "first_reset_ms": 1000}
        }"#;
        let config: CacheConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.expiry, DEFAULT_EXPIRY);
        assert_eq!(
            config.store,
            StoreConfig::Redis(RedisConfig {
                url: "redis://127.0.0.1:6379".to_string(),
                namespace: "scache".to_string(),
                ttl: None,
            })
        );
        assert_eq!(
            config.reset,
            Some(ResetConfig {
                interval_ms: 10000,
                first_reset_ms: Some(1000)
            })
        );
    }
}
