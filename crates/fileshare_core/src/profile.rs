use std::num::NonZeroUsize;
use std::time::Duration;

pub const DEFAULT_CONCURRENCY_LIMIT: usize = 3;
pub const CONSTRAINED_INTER_BATCH_DELAY: Duration = Duration::from_millis(500);

const MOBILE_AGENT_MARKERS: [&str; 5] = ["android", "iphone", "ipad", "ipod", "mobile"];

/// Concurrency budget and pacing for one upload session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformProfile {
    concurrency_limit: NonZeroUsize,
    inter_batch_delay: Duration,
}

impl PlatformProfile {
    /// A limit of zero is raised to one.
    pub fn new(concurrency_limit: usize, inter_batch_delay: Duration) -> Self {
        Self {
            concurrency_limit: NonZeroUsize::new(concurrency_limit).unwrap_or(NonZeroUsize::MIN),
            inter_batch_delay,
        }
    }

    pub fn standard() -> Self {
        Self::new(DEFAULT_CONCURRENCY_LIMIT, Duration::ZERO)
    }

    pub fn constrained() -> Self {
        Self::new(1, CONSTRAINED_INTER_BATCH_DELAY)
    }

    pub fn concurrency_limit(&self) -> usize {
        self.concurrency_limit.get()
    }

    pub fn inter_batch_delay(&self) -> Duration {
        self.inter_batch_delay
    }

    /// Replaces the concurrency budget, keeping the pacing.
    pub fn with_concurrency_limit(self, limit: usize) -> Self {
        Self::new(limit, self.inter_batch_delay)
    }
}

/// Environment facts the profile is derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentSignals {
    pub user_agent: String,
    pub available_parallelism: usize,
}

impl EnvironmentSignals {
    pub fn is_mobile_agent(&self) -> bool {
        let agent = self.user_agent.to_ascii_lowercase();
        MOBILE_AGENT_MARKERS
            .iter()
            .any(|marker| agent.contains(marker))
    }

    pub fn is_constrained(&self) -> bool {
        self.is_mobile_agent() || self.available_parallelism <= 1
    }
}

/// Picks the profile for an environment: one transfer at a time with pacing
/// on constrained agents, otherwise the default budget with no delay.
pub fn detect(signals: &EnvironmentSignals) -> PlatformProfile {
    if signals.is_constrained() {
        PlatformProfile::constrained()
    } else {
        PlatformProfile::standard()
    }
}
