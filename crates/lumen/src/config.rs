/*!
Session and buffer configuration.

Both structs derive `serde` with `#[serde(default)]` so hosts can persist a
partial document and get defaults for the rest. Setters consume and return
`self`:

```ignore
let session = SessionConfig::default()
    .availability_timeout(Duration::from_millis(500))
    .event_capacity(1000);
let buffer = BufferConfig::default().max_depth(64);
```
*/

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::{LumenError, LumenResult};

const DEFAULT_AVAILABILITY_TIMEOUT_MS: u64 = 250;
const DEFAULT_EVENT_CAPACITY: usize = 5000;
const DEFAULT_MAX_DEPTH: usize = 100;
const DEFAULT_MAX_NODES: usize = 50_000;

/// Dispatcher-wide settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[must_use]
pub struct SessionConfig {
  /// Upper bound on a provider availability check, in milliseconds.
  pub availability_timeout_ms: u64,
  /// Events buffered per subscriber before the oldest are dropped.
  pub event_capacity: usize,
}

impl Default for SessionConfig {
  fn default() -> Self {
    Self {
      availability_timeout_ms: DEFAULT_AVAILABILITY_TIMEOUT_MS,
      event_capacity: DEFAULT_EVENT_CAPACITY,
    }
  }
}

impl SessionConfig {
  pub fn availability_timeout(mut self, timeout: Duration) -> Self {
    self.availability_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
    self
  }

  pub const fn event_capacity(mut self, capacity: usize) -> Self {
    self.event_capacity = capacity;
    self
  }

  pub const fn availability_timeout_duration(&self) -> Duration {
    Duration::from_millis(self.availability_timeout_ms)
  }

  /// Parse a JSON document, then validate it.
  pub fn from_json(json: &str) -> LumenResult<Self> {
    let config: Self = serde_json::from_str(json)?;
    config.validate()?;
    Ok(config)
  }

  pub fn validate(&self) -> LumenResult<()> {
    if self.availability_timeout_ms == 0 {
      return Err(LumenError::InvalidConfig("availability_timeout_ms must be positive".into()));
    }
    if self.event_capacity == 0 {
      return Err(LumenError::InvalidConfig("event_capacity must be positive".into()));
    }
    Ok(())
  }
}

/// Virtual buffer build limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[must_use]
pub struct BufferConfig {
  /// Traversal stops descending below this depth.
  pub max_depth: usize,
  /// Traversal stops visiting after this many nodes.
  pub max_nodes: usize,
  /// Build pool threads. `0` lets the pool pick.
  pub workers: usize,
}

impl Default for BufferConfig {
  fn default() -> Self {
    Self {
      max_depth: DEFAULT_MAX_DEPTH,
      max_nodes: DEFAULT_MAX_NODES,
      workers: 1,
    }
  }
}

impl BufferConfig {
  pub const fn max_depth(mut self, depth: usize) -> Self {
    self.max_depth = depth;
    self
  }

  pub const fn max_nodes(mut self, nodes: usize) -> Self {
    self.max_nodes = nodes;
    self
  }

  pub const fn workers(mut self, workers: usize) -> Self {
    self.workers = workers;
    self
  }

  pub fn from_json(json: &str) -> LumenResult<Self> {
    let config: Self = serde_json::from_str(json)?;
    config.validate()?;
    Ok(config)
  }

  pub fn validate(&self) -> LumenResult<()> {
    if self.max_depth == 0 {
      return Err(LumenError::InvalidConfig("max_depth must be positive".into()));
    }
    if self.max_nodes == 0 {
      return Err(LumenError::InvalidConfig("max_nodes must be positive".into()));
    }
    Ok(())
  }
}
