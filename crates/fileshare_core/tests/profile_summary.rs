use std::time::Duration;

use fileshare_core::{
    detect, EnvironmentSignals, NoticeKind, PlatformProfile, SessionSummary,
    CONSTRAINED_INTER_BATCH_DELAY, DEFAULT_CONCURRENCY_LIMIT,
};
use pretty_assertions::assert_eq;

fn signals(user_agent: &str, cores: usize) -> EnvironmentSignals {
    EnvironmentSignals {
        user_agent: user_agent.to_string(),
        available_parallelism: cores,
    }
}

#[test]
fn desktop_agent_gets_standard_budget() {
    let profile = detect(&signals("fileshare/0.1 (X11; Linux x86_64)", 8));
    assert_eq!(profile.concurrency_limit(), DEFAULT_CONCURRENCY_LIMIT);
    assert_eq!(profile.inter_batch_delay(), Duration::ZERO);
}

#[test]
fn mobile_agent_is_serialized_with_pacing() {
    let agent = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) Mobile/15E148";
    let profile = detect(&signals(agent, 6));
    assert_eq!(profile.concurrency_limit(), 1);
    assert_eq!(profile.inter_batch_delay(), CONSTRAINED_INTER_BATCH_DELAY);
    assert!(profile.inter_batch_delay() > Duration::ZERO);
}

#[test]
fn single_core_host_is_constrained() {
    let profile = detect(&signals("fileshare/0.1", 1));
    assert_eq!(profile, PlatformProfile::constrained());
}

#[test]
fn detection_is_repeatable() {
    let env = signals("Android 14", 4);
    assert_eq!(detect(&env), detect(&env));
}

#[test]
fn zero_limit_is_raised_to_one() {
    let profile = PlatformProfile::new(0, Duration::ZERO);
    assert_eq!(profile.concurrency_limit(), 1);

    let overridden = PlatformProfile::constrained().with_concurrency_limit(4);
    assert_eq!(overridden.concurrency_limit(), 4);
    assert_eq!(overridden.inter_batch_delay(), CONSTRAINED_INTER_BATCH_DELAY);
}

#[test]
fn summary_notice_distinguishes_outcomes() {
    let full = SessionSummary {
        success_count: 3,
        failed_count: 0,
        archived: false,
    };
    assert_eq!(full.notice().kind, NoticeKind::Success);
    assert_eq!(full.notice().text, "3 files uploaded successfully");

    let partial = SessionSummary {
        success_count: 2,
        failed_count: 1,
        archived: false,
    };
    assert_eq!(partial.notice().kind, NoticeKind::Partial);
    assert_eq!(partial.notice().text, "Uploaded 2/3 files, 1 failed");

    let none = SessionSummary {
        success_count: 0,
        failed_count: 1,
        archived: false,
    };
    assert_eq!(none.notice().kind, NoticeKind::Failure);
    assert_eq!(none.notice().text, "All 1 upload failed");
}

#[test]
fn archive_summary_counts_whole_batch() {
    let accepted = SessionSummary::archive(501, true);
    assert!(accepted.archived);
    assert_eq!(accepted.total(), 501);
    assert_eq!(accepted.notice().kind, NoticeKind::Success);

    let rejected = SessionSummary::archive(501, false);
    assert_eq!(rejected.failed_count, 501);
    assert_eq!(rejected.notice().kind, NoticeKind::Failure);
    assert!(!rejected.is_complete_success());
}
