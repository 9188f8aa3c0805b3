mod helpers;

use dnsmux_application::{ClientOptions, DnsClient, QueryContext};
use dnsmux_domain::{DomainError, DomainStrategy, Question, RCode, RecordType, DEFAULT_TTL};
use helpers::{MockLookupTransport, MockRawTransport, RecordingCache};
use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

fn make_client(cache: &Arc<RecordingCache>) -> DnsClient {
    DnsClient::new(ClientOptions::default(), cache.clone())
}

fn ips(list: &[&str]) -> Vec<IpAddr> {
    list.iter().map(|s| s.parse().unwrap()).collect()
}

// ── raw transport ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_raw_pinned_strategy_queries_one_family() {
    let client = make_client(&Arc::new(RecordingCache::new()));
    let transport = MockRawTransport::new();
    transport.set_answer(RecordType::A, &["10.0.0.1"], 60);
    transport.set_answer(RecordType::AAAA, &["2001:db8::1"], 60);

    let result = client
        .lookup(&QueryContext::new(), &transport, "example.com", DomainStrategy::UseIPv4)
        .await
        .unwrap();

    assert_eq!(result, ips(&["10.0.0.1"]));
    assert_eq!(transport.queried_types(), vec![RecordType::A]);
}

#[tokio::test]
async fn test_raw_dual_merges_in_strategy_order() {
    let client = DnsClient::without_cache();
    let transport = MockRawTransport::new();
    transport.set_answer(RecordType::A, &["10.0.0.1"], 60);
    transport.set_answer(RecordType::AAAA, &["2001:db8::1"], 60);

    let prefer_v6 = client
        .lookup(&QueryContext::new(), &transport, "example.com.", DomainStrategy::PreferIPv6)
        .await
        .unwrap();
    assert_eq!(prefer_v6, ips(&["2001:db8::1", "10.0.0.1"]));

    let as_is = client
        .lookup(&QueryContext::new(), &transport, "example.com", DomainStrategy::AsIs)
        .await
        .unwrap();
    assert_eq!(as_is, ips(&["10.0.0.1", "2001:db8::1"]));
    assert_eq!(
        transport.queried_types(),
        vec![RecordType::A, RecordType::A, RecordType::AAAA, RecordType::AAAA]
    );
}

#[tokio::test]
async fn test_raw_dual_partial_failure_still_succeeds() {
    let client = DnsClient::without_cache();
    let transport = MockRawTransport::new();
    transport.set_answer(RecordType::A, &["10.0.0.1"], 60);
    transport.set_error(RecordType::AAAA, DomainError::Transport("timeout".into()));

    let result = client
        .lookup(&QueryContext::new(), &transport, "example.com", DomainStrategy::AsIs)
        .await
        .unwrap();

    assert_eq!(result, ips(&["10.0.0.1"]));
    assert_eq!(transport.exchange_count(), 2);
}

#[tokio::test]
async fn test_raw_dual_both_failing_surfaces_ipv4_error() {
    let client = DnsClient::without_cache();
    let transport = MockRawTransport::new();
    transport.set_rcode(RecordType::A, RCode::ServFail);
    transport.set_error(RecordType::AAAA, DomainError::Transport("timeout".into()));

    let err = client
        .lookup(&QueryContext::new(), &transport, "example.com", DomainStrategy::AsIs)
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::Rcode(RCode::ServFail)));
}

#[tokio::test]
async fn test_raw_dual_empty_families_report_no_data() {
    let client = DnsClient::without_cache();
    let transport = MockRawTransport::new();

    let err = client
        .lookup(&QueryContext::new(), &transport, "example.com", DomainStrategy::PreferIPv4)
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::NoData));
}

#[tokio::test]
async fn test_raw_lookup_reuses_cached_families() {
    let cache = Arc::new(RecordingCache::new());
    let client = make_client(&cache);
    let transport = MockRawTransport::new();
    transport.set_answer(RecordType::A, &["10.0.0.1"], 60);
    transport.set_rcode(RecordType::AAAA, RCode::NXDomain);

    for _ in 0..2 {
        let result = client
            .lookup(&QueryContext::new(), &transport, "example.com", DomainStrategy::AsIs)
            .await
            .unwrap();
        assert_eq!(result, ips(&["10.0.0.1"]));
    }

    assert_eq!(transport.exchange_count(), 2);
    let (aaaa, _) = cache
        .entry(&Question::internet("example.com", RecordType::AAAA))
        .unwrap();
    assert_eq!(aaaa.rcode, RCode::NXDomain);
}

// ── resolve-only transport ─────────────────────────────────────────────────

#[tokio::test]
async fn test_resolve_only_name_error_is_negatively_cached_per_family() {
    let cache = Arc::new(RecordingCache::new());
    let client = make_client(&cache);
    let transport = MockLookupTransport::failing(DomainError::Rcode(RCode::NXDomain));

    let before = Instant::now();
    let err = client
        .lookup(&QueryContext::new(), &transport, "missing.example.", DomainStrategy::AsIs)
        .await
        .unwrap_err();

    assert!(err.is_nxdomain());
    assert_eq!(
        transport.last_lookup(),
        Some(("missing.example".to_string(), DomainStrategy::AsIs))
    );

    for record_type in [RecordType::A, RecordType::AAAA] {
        let question = Question::internet("missing.example.", record_type);
        let (message, expires_at) = cache.entry(&question).unwrap();
        assert_eq!(message.rcode, RCode::NXDomain);
        assert!(message.answers.is_empty());
        assert_eq!(message.questions, vec![question]);
        assert!(expires_at.unwrap() >= before + Duration::from_secs(u64::from(DEFAULT_TTL)));
    }

    let err = client
        .lookup(&QueryContext::new(), &transport, "missing.example", DomainStrategy::AsIs)
        .await
        .unwrap_err();
    assert!(err.is_nxdomain());
    assert_eq!(transport.lookup_count(), 1);
}

#[tokio::test]
async fn test_resolve_only_success_is_split_by_family() {
    let cache = Arc::new(RecordingCache::new());
    let client = make_client(&cache);
    let transport = MockLookupTransport::new(&["10.0.0.1", "2001:db8::1", "10.0.0.2"]);

    let result = client
        .lookup(&QueryContext::new(), &transport, "example.com", DomainStrategy::AsIs)
        .await
        .unwrap();
    assert_eq!(result, ips(&["10.0.0.1", "2001:db8::1", "10.0.0.2"]));

    let (v4, _) = cache
        .entry(&Question::internet("example.com", RecordType::A))
        .unwrap();
    assert_eq!(v4.to_addresses().unwrap(), ips(&["10.0.0.1", "10.0.0.2"]));
    assert!(v4.answers.iter().all(|a| a.ttl == DEFAULT_TTL));

    let (v6, _) = cache
        .entry(&Question::internet("example.com", RecordType::AAAA))
        .unwrap();
    assert_eq!(v6.to_addresses().unwrap(), ips(&["2001:db8::1"]));
}

#[tokio::test]
async fn test_resolve_only_pinned_strategy_stores_one_family() {
    let cache = Arc::new(RecordingCache::new());
    let client = make_client(&cache);
    let transport = MockLookupTransport::new(&["10.0.0.1"]);

    client
        .lookup(&QueryContext::new(), &transport, "example.com", DomainStrategy::UseIPv4)
        .await
        .unwrap();

    assert_eq!(cache.len(), 1);
    assert!(cache
        .entry(&Question::internet("example.com", RecordType::A))
        .is_some());
}

#[tokio::test]
async fn test_resolve_only_soft_error_without_cache_is_not_stored() {
    let cache = Arc::new(RecordingCache::new());
    let client = DnsClient::new(
        ClientOptions {
            disable_cache: true,
            disable_expire: false,
        },
        cache.clone(),
    );
    let transport = MockLookupTransport::failing(DomainError::Rcode(RCode::Refused));

    let err = client
        .lookup(&QueryContext::new(), &transport, "example.com", DomainStrategy::AsIs)
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::Rcode(RCode::Refused)));
    assert_eq!(cache.store_count(), 0);
    assert_eq!(cache.load_count(), 0);
}

#[tokio::test]
async fn test_resolve_only_hard_error_is_never_cached() {
    let cache = Arc::new(RecordingCache::new());
    let client = make_client(&cache);
    let transport = MockLookupTransport::failing(DomainError::TransportTimeout {
        server: "system".into(),
    });

    let err = client
        .lookup(&QueryContext::new(), &transport, "example.com", DomainStrategy::AsIs)
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::TransportTimeout { .. }));
    assert_eq!(cache.len(), 0);
}

#[tokio::test]
async fn test_resolve_only_dual_cache_hit_on_one_family() {
    let cache = Arc::new(RecordingCache::new());
    let client = make_client(&cache);
    let transport = MockLookupTransport::new(&["10.0.0.1"]);

    client
        .lookup(&QueryContext::new(), &transport, "example.com", DomainStrategy::UseIPv4)
        .await
        .unwrap();

    let result = client
        .lookup(&QueryContext::new(), &transport, "example.com", DomainStrategy::PreferIPv6)
        .await
        .unwrap();

    assert_eq!(result, ips(&["10.0.0.1"]));
    assert_eq!(transport.lookup_count(), 1);
}

#[tokio::test]
async fn test_resolve_only_dual_with_one_negative_family_goes_to_network() {
    let cache = Arc::new(RecordingCache::new());
    let client = make_client(&cache);
    let transport = MockLookupTransport::failing(DomainError::Rcode(RCode::NXDomain));

    let _ = client
        .lookup(&QueryContext::new(), &transport, "example.com", DomainStrategy::UseIPv6)
        .await;
    let _ = client
        .lookup(&QueryContext::new(), &transport, "example.com", DomainStrategy::AsIs)
        .await;

    assert_eq!(transport.lookup_count(), 2);
}

#[tokio::test]
async fn test_resolve_only_context_disable_cache() {
    let cache = Arc::new(RecordingCache::new());
    let client = make_client(&cache);
    let transport = MockLookupTransport::new(&["10.0.0.1"]);
    let ctx = QueryContext::new().with_disable_cache(true);

    client
        .lookup(&ctx, &transport, "example.com", DomainStrategy::AsIs)
        .await
        .unwrap();

    assert_eq!(cache.len(), 0);
}
