//! Service configuration.
//!
//! Admission capacity and decay interval default to the fixed values the service has
//! always used (10 slots, one second); they are configurable only so isolated tests
//! and benchmarks can shrink them.

use crate::admission::{DEFAULT_CAPACITY, DEFAULT_DECAY_INTERVAL};
use crate::error::ConfigError;
use crate::fetcher::DEFAULT_HTTP_TIMEOUT;
use crate::resolver::DEFAULT_UPSTREAM;
use std::time::Duration;

/// Validated configuration for one service instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    upstream: String,
    http_timeout: Duration,
    capacity: usize,
    decay_interval: Duration,
}

impl SearchConfig {
    pub fn builder() -> SearchConfigBuilder {
        SearchConfigBuilder::new()
    }

    /// Base URL of the lookup API, without trailing slash.
    pub fn upstream(&self) -> &str {
        &self.upstream
    }

    /// Client-side timeout applied to each upstream call.
    pub fn http_timeout(&self) -> Duration {
        self.http_timeout
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn decay_interval(&self) -> Duration {
        self.decay_interval
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            upstream: DEFAULT_UPSTREAM.to_owned(),
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            capacity: DEFAULT_CAPACITY,
            decay_interval: DEFAULT_DECAY_INTERVAL,
        }
    }
}

/// Builder for [`SearchConfig`]; unset fields keep their defaults.
#[derive(Debug, Clone, Default)]
pub struct SearchConfigBuilder {
    upstream: Option<String>,
    http_timeout: Option<Duration>,
    capacity: Option<usize>,
    decay_interval: Option<Duration>,
}

impl SearchConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upstream(mut self, base_url: impl Into<String>) -> Self {
        self.upstream = Some(base_url.into());
        self
    }

    pub fn http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = Some(timeout);
        self
    }

    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    pub fn decay_interval(mut self, interval: Duration) -> Self {
        self.decay_interval = Some(interval);
        self
    }

    pub fn build(self) -> Result<SearchConfig, ConfigError> {
        let defaults = SearchConfig::default();

        let upstream = match self.upstream {
            Some(url) => {
                let trimmed = url.trim().trim_end_matches('/');
                let scheme_ok = trimmed.starts_with("http://") || trimmed.starts_with("https://");
                let has_host = trimmed.split_once("://").is_some_and(|(_, host)| !host.is_empty());
                if !scheme_ok || !has_host {
                    return Err(ConfigError::InvalidUpstream(url));
                }
                trimmed.to_owned()
            }
            None => defaults.upstream,
        };

        let http_timeout = self.http_timeout.unwrap_or(defaults.http_timeout);
        if http_timeout.is_zero() {
            return Err(ConfigError::ZeroHttpTimeout);
        }

        let capacity = self.capacity.unwrap_or(defaults.capacity);
        if capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }

        let decay_interval = self.decay_interval.unwrap_or(defaults.decay_interval);
        if decay_interval.is_zero() {
            return Err(ConfigError::ZeroDecayInterval);
        }

        Ok(SearchConfig { upstream, http_timeout, capacity, decay_interval })
    }
}
