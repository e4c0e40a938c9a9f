//! # Integration Tests
//!
//! Cross-crate and end-to-end tests.
//!
//! Covers:
//! - wire contract snapshots
//! - config -> gateway -> dispatcher -> aggregate flows with the mock gateway
//! - shared rate limiting across concurrent envelopes

#[cfg(test)]
mod contract_tests {
    use contracts::{DispatchResult, Envelope, RecipientId};
    use serde_json::json;

    #[test]
    fn test_envelope_wire_shape() {
        let envelope = Envelope::new(
            vec!["+15148887777".into(), "+15148887779".into()],
            "SMS Message.",
        )
        .unwrap();
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({"to": ["+15148887777", "+15148887779"], "body": "SMS Message."})
        );
    }

    #[test]
    fn test_dispatch_result_wire_shape() {
        let failure = DispatchResult::failure(RecipientId::from("+1A"), "rate limit timeout");
        assert_eq!(
            serde_json::to_value(&failure).unwrap(),
            json!({"recipient": "+1A", "status": "failure", "reason": "rate limit timeout"})
        );
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;
    use std::time::Duration;

    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{Classification, ContractError, GatewayClient, Route};
    use dispatcher::{
        aggregate, AnyGateway, DispatcherBuilder, EnvelopeParser, MockGateway, MockGatewayConfig,
        RateLimiter,
    };
    use observability::OutcomeStatsAggregator;
    use tokio::time::Instant;

    const MOCK_CONFIG: &str = r#"
[rate_limit]
limit_for_period = 18
refresh_period_ms = 1500
acquire_timeout_ms = 1500

[gateway]
name = "sms"
kind = "mock"
params = { fail_recipients = "+1A", failure_reason = "invalid phone number" }

[routing]
partial_failure = "failure"
"#;

    /// End-to-end: config -> AnyGateway -> Dispatcher -> aggregate -> routing
    #[tokio::test]
    async fn test_e2e_partial_failure() {
        let blueprint = ConfigLoader::load_from_str(MOCK_CONFIG, ConfigFormat::Toml).unwrap();
        let gateway = Arc::new(AnyGateway::from_config(&blueprint.gateway).await.unwrap());
        let dispatcher = DispatcherBuilder::new(Arc::clone(&gateway))
            .rate_limit(&blueprint.rate_limit)
            .build()
            .unwrap();

        let envelope = EnvelopeParser::parse_str(r#"{"to":["+1A","+1B"],"body":"hi"}"#).unwrap();
        let results = dispatcher.dispatch(&envelope).await;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].recipient, "+1A");
        assert!(!results[0].is_success());
        assert_eq!(results[0].outcome.detail(), "invalid phone number");
        assert_eq!(results[1].recipient, "+1B");
        assert!(results[1].is_success());

        let outcome = aggregate(&results);
        assert_eq!(outcome.classification, Classification::PartialFailure);
        assert_eq!(outcome.attributes["status.+1A"], "invalid phone number");
        assert_eq!(outcome.attributes["status.+1B"], results[1].outcome.detail());
        assert_eq!(outcome.attributes["status.count.success"], "1");
        assert_eq!(outcome.attributes["status.count.failure"], "1");

        assert_eq!(blueprint.routing.route(outcome.classification), Route::Failure);
        assert_eq!(gateway.name(), "sms");
    }

    #[tokio::test]
    async fn test_malformed_unit_never_reaches_gateway() {
        let gateway = Arc::new(MockGateway::new("mock"));
        let dispatcher = DispatcherBuilder::new(Arc::clone(&gateway)).build().unwrap();

        let mut dispatched = 0;
        for raw in [r#"{"body": "x"}"#, r#"{"to": "+1A", "body": "x"}"#, r#"{"to": ["+1A"]}"#] {
            match EnvelopeParser::parse_str(raw) {
                Ok(envelope) => {
                    dispatcher.dispatch(&envelope).await;
                    dispatched += 1;
                }
                Err(e) => assert!(matches!(e, ContractError::MalformedEnvelope { .. })),
            }
        }

        assert_eq!(dispatched, 0);
        assert_eq!(gateway.call_count(), 0);
        assert_eq!(dispatcher.metrics().envelopes, 0);
    }

    /// Concurrent envelopes share one limiter; no window issues more than the limit
    #[tokio::test(start_paused = true)]
    async fn test_concurrent_envelopes_share_limiter() {
        let gateway = Arc::new(MockGateway::new("mock"));
        let limiter = Arc::new(RateLimiter::new(18, Duration::from_millis(1500)).unwrap());
        let dispatcher = DispatcherBuilder::new(Arc::clone(&gateway))
            .shared_limiter(limiter, Duration::from_secs(10))
            .build()
            .unwrap();
        let start = Instant::now();

        let mut handles = Vec::new();
        for e in 0..5 {
            let to: Vec<String> = (0..10).map(|r| format!("+1{e}{r:02}")).collect();
            let raw = serde_json::json!({"to": to, "body": "hi"});
            let envelope = EnvelopeParser::parse(&raw).unwrap();
            let dispatcher = dispatcher.clone();
            handles.push(tokio::spawn(async move {
                dispatcher.dispatch_and_aggregate(&envelope).await
            }));
        }

        let mut stats = OutcomeStatsAggregator::new();
        for handle in handles {
            let outcome = handle.await.unwrap();
            assert_eq!(outcome.per_recipient.len(), 10);
            assert_eq!(outcome.classification, Classification::AllSucceeded);
            stats.update(&outcome, 0.0);
        }
        assert_eq!(stats.recipients_succeeded, 50);

        let mut per_window: BTreeMap<u128, u32> = BTreeMap::new();
        for call in gateway.calls() {
            *per_window.entry((call.at - start).as_millis() / 1500).or_default() += 1;
        }
        assert_eq!(per_window.values().sum::<u32>(), 50);
        assert!(per_window.values().all(|&n| n <= 18), "{per_window:?}");
        assert_eq!(dispatcher.metrics().permits_granted, 50);
    }

    #[tokio::test(start_paused = true)]
    async fn test_limiter_timeouts_still_produce_full_attributes() {
        let gateway = Arc::new(MockGateway::new("mock"));
        let limiter = Arc::new(RateLimiter::new(1, Duration::from_secs(60)).unwrap());
        let dispatcher = DispatcherBuilder::new(Arc::clone(&gateway))
            .shared_limiter(limiter, Duration::from_millis(1500))
            .build()
            .unwrap();

        let first = EnvelopeParser::parse_str(r#"{"to":["+1A"],"body":"hi"}"#).unwrap();
        let second = EnvelopeParser::parse_str(r#"{"to":["+1B","+1C"],"body":"hi"}"#).unwrap();

        let ok = dispatcher.dispatch_and_aggregate(&first).await;
        let starved = dispatcher.dispatch_and_aggregate(&second).await;

        assert_eq!(ok.classification, Classification::AllSucceeded);
        assert_eq!(starved.classification, Classification::AllFailed);
        assert_eq!(starved.attributes["status.+1B"], "rate limit timeout");
        assert_eq!(starved.attributes["status.+1C"], "rate limit timeout");
        assert_eq!(starved.attributes["status.count.failure"], "2");
        assert_eq!(gateway.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_rate_limit_calls_gateway_for_every_recipient() {
        let mut blueprint = ConfigLoader::load_from_str(MOCK_CONFIG, ConfigFormat::Toml).unwrap();
        blueprint.rate_limit.enabled = false;
        blueprint.rate_limit.limit_for_period = 1;

        let gateway = Arc::new(MockGateway::with_config(
            "mock",
            MockGatewayConfig::failing(["+1A"]),
        ));
        let dispatcher = DispatcherBuilder::new(Arc::clone(&gateway))
            .rate_limit(&blueprint.rate_limit)
            .build()
            .unwrap();

        let to: Vec<String> = (0..100).map(|i| format!("+2{i:03}")).collect();
        let envelope = EnvelopeParser::parse(&serde_json::json!({"to": to, "body": "hi"})).unwrap();
        let start = Instant::now();
        let outcome = dispatcher.dispatch_and_aggregate(&envelope).await;

        assert_eq!(gateway.call_count(), 100);
        assert_eq!(outcome.success_count(), 100);
        assert_eq!(Instant::now(), start);
    }

    #[tokio::test]
    async fn test_file_gateway_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let outbox = dir.path().join("outbox.jsonl");
        let toml = format!(
            "[gateway]\nkind = \"file\"\nname = \"outbox\"\nparams = {{ path = {:?} }}\n",
            outbox.display().to_string()
        );
        let blueprint = ConfigLoader::load_from_str(&toml, ConfigFormat::Toml).unwrap();
        let gateway = Arc::new(AnyGateway::from_config(&blueprint.gateway).await.unwrap());
        let dispatcher = DispatcherBuilder::new(gateway)
            .rate_limit(&blueprint.rate_limit)
            .build()
            .unwrap();

        let envelope = EnvelopeParser::parse_str(r#"{"to":["+1A","+1B"],"body":"hi"}"#).unwrap();
        let outcome = dispatcher.dispatch_and_aggregate(&envelope).await;

        assert_eq!(outcome.classification, Classification::AllSucceeded);
        assert_eq!(outcome.attributes["status.+1A"], "outbox-1");
        let written = std::fs::read_to_string(&outbox).unwrap();
        assert_eq!(written.lines().count(), 2);
    }
}
