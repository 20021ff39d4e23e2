use std::num::NonZeroUsize;

use fileshare_core::{detect, EnvironmentSignals, PlatformProfile};
use fileshare_logging::share_debug;

use crate::ClientSettings;

/// Collects the signals the platform profile is derived from.
pub fn probe_environment(settings: &ClientSettings) -> EnvironmentSignals {
    EnvironmentSignals {
        user_agent: settings.user_agent.clone(),
        available_parallelism: std::thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1),
    }
}

/// Profile for a new session, honoring a configured concurrency override.
pub fn session_profile(settings: &ClientSettings) -> PlatformProfile {
    let signals = probe_environment(settings);
    let detected = detect(&signals);
    let profile = match settings.concurrency_override {
        Some(limit) => detected.with_concurrency_limit(limit),
        None => detected,
    };
    share_debug!(
        "platform profile: limit={} delay={:?} (constrained={})",
        profile.concurrency_limit(),
        profile.inter_batch_delay(),
        signals.is_constrained()
    );
    profile
}
