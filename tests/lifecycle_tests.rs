//! End-to-end tests for token issuance, validation, and sweeping.

use csrf_guard::{
    create_issuer, create_receiver, csrf_config, CsrfConfig, CsrfIssuer, CsrfReceiver,
    InMemoryMetrics, MockClock, MockTokenCodec, RejectReason, TokenStore, ValidationOutcome,
    GENERIC_REJECTION_MESSAGE,
};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

const T0: u64 = 1_700_000_000_000;

fn mock_issuer() -> (Arc<MockTokenCodec>, Arc<MockClock>, CsrfIssuer) {
    let codec = Arc::new(MockTokenCodec::new());
    let clock = Arc::new(MockClock::new(T0));
    let issuer = CsrfIssuer::with_components(CsrfConfig::default(), codec.clone(), clock.clone());
    (codec, clock, issuer)
}

#[test]
fn test_first_validation_succeeds() {
    let issuer = CsrfIssuer::default();

    for _ in 0..32 {
        let token = issuer.issue().unwrap();
        assert_eq!(issuer.validate(Some(token.expose()), true), ValidationOutcome::accepted());
    }
}

#[test]
fn test_replay_is_rejected() {
    let issuer = CsrfIssuer::default();
    let token = issuer.issue().unwrap();

    assert!(issuer.validate_token(token.expose()).valid);

    let replay = issuer.validate_token(token.expose());
    assert!(!replay.valid);
    assert_eq!(replay.reason, Some(RejectReason::AlreadyUsed));
}

#[test]
fn test_every_replay_in_grace_window_is_already_used() {
    let (_, clock, issuer) = mock_issuer();
    let token = issuer.issue().unwrap();

    assert!(issuer.validate_token(token.expose()).valid);
    for _ in 0..5 {
        clock.advance(Duration::from_millis(500));
        assert_eq!(
            issuer.validate_token(token.expose()),
            ValidationOutcome::rejected(RejectReason::AlreadyUsed)
        );
    }

    clock.advance(Duration::from_secs(3));
    assert_eq!(
        issuer.validate_token(token.expose()).reason,
        Some(RejectReason::Expired)
    );
    assert_eq!(
        issuer.validate_token(token.expose()).reason,
        Some(RejectReason::Invalid)
    );
}

#[test]
fn test_expired_regardless_of_use() {
    let (_, clock, issuer) = mock_issuer();

    let untouched = issuer.issue_with_ttl(Duration::from_secs(60)).unwrap();
    let consumed = issuer.issue_with_ttl(Duration::from_secs(60)).unwrap();
    assert!(issuer.validate_token(consumed.expose()).valid);

    clock.advance(Duration::from_secs(61));

    assert_eq!(
        issuer.validate(Some(untouched.expose()), true).reason,
        Some(RejectReason::Expired)
    );
    assert_eq!(
        issuer.validate(Some(consumed.expose()), false).reason,
        Some(RejectReason::Expired)
    );
}

#[test]
fn test_missing_inputs() {
    let issuer = CsrfIssuer::default();

    assert_eq!(
        issuer.validate(Some(""), true),
        ValidationOutcome::rejected(RejectReason::Missing)
    );
    assert_eq!(
        issuer.validate(None, true),
        ValidationOutcome::rejected(RejectReason::Missing)
    );
}

#[test]
fn test_concurrent_consumption_has_single_winner() {
    const N: usize = 16;

    for _ in 0..20 {
        let issuer = Arc::new(create_issuer(CsrfConfig::default()));
        let token = issuer.issue().unwrap().into_string();
        let barrier = Arc::new(Barrier::new(N));

        let outcomes: Vec<ValidationOutcome> = thread::scope(|scope| {
            let handles: Vec<_> = (0..N)
                .map(|_| {
                    let issuer = issuer.clone();
                    let barrier = barrier.clone();
                    let token = token.as_str();
                    scope.spawn(move || {
                        barrier.wait();
                        issuer.validate(Some(token), true)
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let accepted = outcomes.iter().filter(|o| o.valid).count();
        let replays = outcomes
            .iter()
            .filter(|o| o.reason == Some(RejectReason::AlreadyUsed))
            .count();

        assert_eq!(accepted, 1);
        assert_eq!(replays, N - 1);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_consumption_across_tasks() {
    const N: usize = 32;
    let receiver = Arc::new(create_receiver(CsrfConfig::default()));
    receiver.accept("shared-form-token").unwrap();

    let tasks: Vec<_> = (0..N)
        .map(|_| {
            let receiver = receiver.clone();
            tokio::spawn(async move { receiver.validate_token("shared-form-token") })
        })
        .collect();

    let outcomes: Vec<ValidationOutcome> = futures::future::join_all(tasks)
        .await
        .into_iter()
        .map(|r| r.unwrap())
        .collect();

    let accepted = outcomes.iter().filter(|o| o.valid).count();
    let replays = outcomes
        .iter()
        .filter(|o| o.reason == Some(RejectReason::AlreadyUsed))
        .count();
    assert_eq!(accepted, 1);
    assert_eq!(replays, N - 1);
}

#[test]
fn test_sweep_removes_expired_tokens() {
    const K: usize = 25;
    let (_, clock, issuer) = mock_issuer();

    let expired: Vec<String> = (0..K)
        .map(|_| {
            issuer
                .issue_with_ttl(Duration::from_secs(60))
                .unwrap()
                .into_string()
        })
        .collect();
    let survivor = issuer.issue_with_ttl(Duration::from_secs(3600)).unwrap();

    clock.advance(Duration::from_secs(61));
    let report = issuer.sweep_now();

    assert_eq!(report.removed, K);
    for token in &expired {
        assert!(issuer.lifecycle().store().get(token).is_none());
    }
    assert!(issuer.inspect(survivor.expose()).is_some());
}

#[test]
fn test_reference_scenario() {
    let (codec, clock, issuer) = mock_issuer();
    codec.set_next_token("abc123");

    let token = issuer.issue_with_ttl(Duration::from_secs(60 * 60)).unwrap();
    assert_eq!(token.expose(), "abc123");

    clock.advance(Duration::from_secs(30 * 60));
    assert_eq!(issuer.validate(Some("abc123"), true), ValidationOutcome::accepted());

    clock.advance(Duration::from_secs(1));
    assert_eq!(
        issuer.validate(Some("abc123"), true),
        ValidationOutcome::rejected(RejectReason::AlreadyUsed)
    );

    assert_eq!(
        issuer.validate(Some("zzz999"), true),
        ValidationOutcome::rejected(RejectReason::Invalid)
    );
}

#[test]
fn test_gone_token_can_be_reissued() {
    let (codec, clock, issuer) = mock_issuer();
    codec.set_next_token("abc123").set_next_token("abc123");

    issuer.issue_with_ttl(Duration::from_secs(60)).unwrap();
    assert!(issuer.validate_token("abc123").valid);

    clock.advance(Duration::from_secs(10));
    issuer.sweep_now();
    assert!(issuer.inspect("abc123").is_none());

    issuer.issue_with_ttl(Duration::from_secs(60)).unwrap();
    assert!(issuer.validate_token("abc123").valid);
}

#[test]
fn test_public_message_hides_reason() {
    let (_, clock, issuer) = mock_issuer();
    let token = issuer.issue_with_ttl(Duration::from_secs(1)).unwrap();
    clock.advance(Duration::from_secs(2));

    let expired = issuer.validate_token(token.expose());
    let unknown = issuer.validate_token("never-issued");
    let missing = issuer.validate(None, true);

    for outcome in [expired, unknown, missing] {
        assert_eq!(outcome.public_message(), Some(GENERIC_REJECTION_MESSAGE));
        let err = outcome.into_result().unwrap_err();
        assert_eq!(err.to_string(), GENERIC_REJECTION_MESSAGE);
    }
}

#[test]
fn test_sides_do_not_share_state() {
    let clock = Arc::new(MockClock::new(T0));
    let codec = Arc::new(MockTokenCodec::new());
    codec.set_next_token("handoff-token");

    let issuer = CsrfIssuer::with_components(CsrfConfig::default(), codec, clock.clone());
    let receiver = CsrfReceiver::with_clock(CsrfConfig::default(), clock);

    let token = issuer.issue().unwrap();
    assert_eq!(
        receiver.validate_token(token.expose()).reason,
        Some(RejectReason::Invalid)
    );

    receiver.accept(token.expose()).unwrap();
    assert!(receiver.validate_token(token.expose()).valid);
    assert!(issuer.validate_token(token.expose()).valid);
}

#[test]
fn test_configured_grace_window() {
    let config = csrf_config()
        .grace_period(Duration::from_secs(30))
        .build()
        .unwrap();
    let clock = Arc::new(MockClock::new(T0));
    let receiver = CsrfReceiver::with_clock(config, clock.clone());
    receiver.accept("graceful").unwrap();

    assert!(receiver.validate_token("graceful").valid);

    clock.advance(Duration::from_secs(29));
    receiver.sweep_now();
    assert_eq!(
        receiver.validate(Some("graceful"), false).reason,
        Some(RejectReason::AlreadyUsed)
    );
}

#[tokio::test(start_paused = true)]
async fn test_background_sweeper_lifecycle() {
    let clock = Arc::new(MockClock::new(T0));
    let metrics = Arc::new(InMemoryMetrics::new());
    let config = csrf_config()
        .sweep_interval(Duration::from_secs(600))
        .build()
        .unwrap();
    let receiver = CsrfReceiver::with_clock(config, clock.clone()).with_metrics(metrics.clone());

    receiver
        .accept_with_ttl("short", Duration::from_secs(60))
        .unwrap();
    receiver.accept("long").unwrap();
    receiver.start_sweeper().unwrap();

    clock.advance(Duration::from_secs(120));
    tokio::time::sleep(Duration::from_secs(601)).await;

    assert_eq!(receiver.live_tokens(), 1);
    assert_eq!(metrics.sum_where("csrf_swept_tokens_total", "side", "receiver"), 1.0);

    assert!(receiver.stop());
    assert!(receiver.validate_token("long").valid);
}
