#![forbid(unsafe_code)]

//! Navigator configuration.
//!
//! Defaults suit interactive UIs. Hosts can override individual values
//! through `with_*` builders or through environment variables:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `NAVSTACK_DESTROY_GRACE_MS` | [`NavConfig::destroy_grace`] |
//! | `NAVSTACK_TRANSITION_MS` | [`NavConfig::transition_duration`] |
//! | `NAVSTACK_REDUCED_MOTION` | [`NavConfig::reduced_motion`] |
//! | `NAVSTACK_QUEUE_CAPACITY` | [`NavConfig::queue_capacity`] |
//! | `NAVSTACK_MAX_EVENTS` | [`NavConfig::max_events`] |
//!
//! Unparseable values are logged and ignored.

use std::fmt;
use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub const ENV_DESTROY_GRACE_MS: &str = "NAVSTACK_DESTROY_GRACE_MS";
pub const ENV_TRANSITION_MS: &str = "NAVSTACK_TRANSITION_MS";
pub const ENV_REDUCED_MOTION: &str = "NAVSTACK_REDUCED_MOTION";
pub const ENV_QUEUE_CAPACITY: &str = "NAVSTACK_QUEUE_CAPACITY";
pub const ENV_MAX_EVENTS: &str = "NAVSTACK_MAX_EVENTS";

/// Default bound on the undrained event log.
pub const DEFAULT_MAX_EVENTS: usize = 256;

/// Tunables for a navigator and its bundled transition drivers.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct NavConfig {
    /// Delay between a use-once instance finishing its hide and its
    /// destruction.
    pub destroy_grace: Duration,
    /// Length of show/hide fades for time-based drivers.
    pub transition_duration: Duration,
    /// Complete every visual transition immediately.
    pub reduced_motion: bool,
    /// Routed `Replacement` pushes keep the replaced panel in the stack.
    pub replace_keeps_current: bool,
    /// Routed `Replacement` pushes swap the stack without waiting for the
    /// old top to finish hiding.
    pub replace_instant: bool,
    /// Upper bound on the root's pending queue. `None` is unbounded.
    pub queue_capacity: Option<usize>,
    /// Undrained navigation events kept before the oldest is dropped
    /// (0 = unlimited).
    pub max_events: usize,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            destroy_grace: Duration::from_millis(500),
            transition_duration: Duration::from_millis(200),
            reduced_motion: false,
            replace_keeps_current: false,
            replace_instant: false,
            queue_capacity: None,
            max_events: DEFAULT_MAX_EVENTS,
        }
    }
}

impl NavConfig {
    #[must_use]
    pub fn with_destroy_grace(mut self, grace: Duration) -> Self {
        self.destroy_grace = grace;
        self
    }

    #[must_use]
    pub fn with_transition_duration(mut self, duration: Duration) -> Self {
        self.transition_duration = duration;
        self
    }

    #[must_use]
    pub fn with_reduced_motion(mut self, enabled: bool) -> Self {
        self.reduced_motion = enabled;
        self
    }

    #[must_use]
    pub fn with_replace_keeps_current(mut self, keep: bool) -> Self {
        self.replace_keeps_current = keep;
        self
    }

    #[must_use]
    pub fn with_replace_instant(mut self, instant: bool) -> Self {
        self.replace_instant = instant;
        self
    }

    #[must_use]
    pub fn with_queue_capacity(mut self, capacity: Option<usize>) -> Self {
        self.queue_capacity = capacity;
        self
    }

    #[must_use]
    pub fn with_max_events(mut self, max_events: usize) -> Self {
        self.max_events = max_events;
        self
    }

    /// Defaults overridden by the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Defaults overridden through a custom environment lookup (for tests).
    #[must_use]
    pub fn from_env_with<F>(get_env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(ms) = env_u64(&get_env, ENV_DESTROY_GRACE_MS) {
            config.destroy_grace = Duration::from_millis(ms);
        }
        if let Some(ms) = env_u64(&get_env, ENV_TRANSITION_MS) {
            config.transition_duration = Duration::from_millis(ms);
        }
        if let Some(enabled) = env_bool(&get_env, ENV_REDUCED_MOTION) {
            config.reduced_motion = enabled;
        }
        if let Some(capacity) = env_u64(&get_env, ENV_QUEUE_CAPACITY) {
            config.queue_capacity = usize::try_from(capacity).ok().filter(|&c| c > 0);
        }
        if let Some(max) = env_u64(&get_env, ENV_MAX_EVENTS) {
            config.max_events = usize::try_from(max).unwrap_or(usize::MAX);
        }
        config
    }

    /// Check that the configuration is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.queue_capacity == Some(0) {
            return Err(ConfigError::ZeroQueueCapacity);
        }
        Ok(())
    }
}

fn env_u64<F>(get_env: &F, key: &str) -> Option<u64>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = get_env(key)?;
    match raw.trim().parse::<u64>() {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(key, value = %raw, error = %err, "ignoring invalid navstack setting");
            None
        }
    }
}

fn env_bool<F>(get_env: &F, key: &str) -> Option<bool>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = get_env(key)?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => {
            tracing::warn!(key, value = %raw, "ignoring invalid navstack setting");
            None
        }
    }
}

/// Invalid configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A bounded queue must hold at least one panel.
    ZeroQueueCapacity,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroQueueCapacity => f.write_str("queue capacity must be at least 1"),
        }
    }
}

impl std::error::Error for ConfigError {}
