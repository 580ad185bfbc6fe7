use std::time::Duration;
use url::Url;
use crate::{Error, Result};
use crate::backoff::BackoffPolicy;
use crate::negotiation::DEFAULT_NAMESPACES;
use crate::transport::{parse_signaling_base, Resolution, SessionOptions};

#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Signaling endpoint base URL
    pub signaling_url: String,

    /// First backoff delay
    pub base_delay: Duration,

    /// Backoff delay cap
    pub max_delay: Duration,

    /// Maximum backoff reconnects before giving up
    pub max_attempts: u32,

    /// Pause before trying the next stream format
    pub format_retry_delay: Duration,

    /// Namespaces tried for each stream id, first is primary
    pub namespaces: Vec<String>,

    /// Options for every opened session
    pub session: SessionOptions,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        ManagerConfig {
            signaling_url: "http://127.0.0.1:80/index/api/webrtc".to_string(),
            base_delay: Duration::from_millis(2000),
            max_delay: Duration::from_millis(30000),
            max_attempts: 10,
            format_retry_delay: Duration::from_millis(500),
            namespaces: DEFAULT_NAMESPACES.iter().map(|s| s.to_string()).collect(),
            session: SessionOptions::default(),
        }
    }
}

impl ManagerConfig {
    /// Create config builder
    pub fn builder() -> ManagerConfigBuilder {
        ManagerConfigBuilder::new()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.signaling_base()?;

        if self.max_attempts == 0 {
            return Err(Error::config("max_attempts must be at least 1"));
        }

        if self.base_delay.is_zero() {
            return Err(Error::config("base_delay must be positive"));
        }

        if self.max_delay < self.base_delay {
            return Err(Error::config("max_delay must not be below base_delay"));
        }

        if self.namespaces.is_empty() || self.namespaces.iter().any(|ns| ns.trim().is_empty()) {
            return Err(Error::config("namespaces must be non-empty"));
        }

        Ok(())
    }

    /// Parsed signaling base URL
    pub fn signaling_base(&self) -> Result<Url> {
        parse_signaling_base(&self.signaling_url)
    }

    pub fn backoff_policy(&self) -> BackoffPolicy {
        BackoffPolicy::new(self.base_delay, self.max_delay)
    }
}

/// Builder for ManagerConfig
pub struct ManagerConfigBuilder {
    config: ManagerConfig,
}

impl ManagerConfigBuilder {
    /// Create new builder
    pub fn new() -> Self {
        ManagerConfigBuilder {
            config: ManagerConfig::default(),
        }
    }

    /// Set signaling endpoint
    pub fn signaling_url(mut self, url: impl Into<String>) -> Self {
        self.config.signaling_url = url.into();
        self
    }

    /// Set backoff delays
    pub fn backoff(mut self, base_delay: Duration, max_delay: Duration) -> Self {
        self.config.base_delay = base_delay;
        self.config.max_delay = max_delay;
        self
    }

    pub fn max_attempts(mut self, max: u32) -> Self {
        self.config.max_attempts = max;
        self
    }

    pub fn format_retry_delay(mut self, delay: Duration) -> Self {
        self.config.format_retry_delay = delay;
        self
    }

    /// Replace the namespace set
    pub fn namespaces<I, S>(mut self, namespaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.namespaces = namespaces.into_iter().map(Into::into).collect();
        self
    }

    pub fn video_enabled(mut self, enabled: bool) -> Self {
        self.config.session.video_enabled = enabled;
        self
    }

    pub fn audio_enabled(mut self, enabled: bool) -> Self {
        self.config.session.audio_enabled = enabled;
        self
    }

    pub fn recv_only(mut self, recv_only: bool) -> Self {
        self.config.session.recv_only = recv_only;
        self
    }

    pub fn resolution(mut self, width: u32, height: u32) -> Self {
        self.config.session.resolution = Resolution { width, height };
        self
    }

    /// Build configuration
    pub fn build(self) -> Result<ManagerConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for ManagerConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
