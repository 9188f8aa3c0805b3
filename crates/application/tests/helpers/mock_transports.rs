#![allow(dead_code)]

use async_trait::async_trait;
use dnsmux_application::{ports::DnsTransport, QueryContext};
use dnsmux_domain::{DnsRecord, DomainError, DomainStrategy, Message, RCode, RecordType};
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Id the mock stamps on responses, so tests can check the client rewrites it.
pub const UPSTREAM_ID: u16 = 0xBEEF;

#[derive(Clone)]
enum RawReply {
    Answer(Vec<IpAddr>, u32),
    Rcode(RCode),
    Fail(DomainError),
}

/// Raw transport answering per record type. Unconfigured types get an
/// empty NOERROR response.
#[derive(Clone, Default)]
pub struct MockRawTransport {
    replies: Arc<Mutex<HashMap<RecordType, RawReply>>>,
    requests: Arc<Mutex<Vec<Message>>>,
}

impl MockRawTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_answer(&self, record_type: RecordType, ips: &[&str], ttl: u32) {
        let ips = ips.iter().map(|ip| ip.parse().unwrap()).collect();
        self.replies
            .lock()
            .unwrap()
            .insert(record_type, RawReply::Answer(ips, ttl));
    }

    pub fn set_rcode(&self, record_type: RecordType, rcode: RCode) {
        self.replies
            .lock()
            .unwrap()
            .insert(record_type, RawReply::Rcode(rcode));
    }

    pub fn set_error(&self, record_type: RecordType, error: DomainError) {
        self.replies
            .lock()
            .unwrap()
            .insert(record_type, RawReply::Fail(error));
    }

    pub fn exchange_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn queried_types(&self) -> Vec<RecordType> {
        let mut types: Vec<_> = self
            .requests
            .lock()
            .unwrap()
            .iter()
            .map(|m| m.questions[0].record_type)
            .collect();
        types.sort_by_key(|t| t.to_u16());
        types
    }
}

#[async_trait]
impl DnsTransport for MockRawTransport {
    fn name(&self) -> &str {
        "mock-raw"
    }

    fn is_raw(&self) -> bool {
        true
    }

    async fn start(&self) -> Result<(), DomainError> {
        Ok(())
    }

    fn reset(&self) {}

    async fn close(&self) -> Result<(), DomainError> {
        Ok(())
    }

    async fn exchange(
        &self,
        _ctx: &QueryContext,
        message: &Message,
    ) -> Result<Message, DomainError> {
        self.requests.lock().unwrap().push(message.clone());
        let question = message.questions[0].clone();
        let reply = self
            .replies
            .lock()
            .unwrap()
            .get(&question.record_type)
            .cloned();

        let mut response = match reply {
            None => Message::response_to(message, RCode::NoError),
            Some(RawReply::Rcode(rcode)) => Message::response_to(message, rcode),
            Some(RawReply::Fail(e)) => return Err(e),
            Some(RawReply::Answer(ips, ttl)) => {
                let answers = ips
                    .into_iter()
                    .map(|ip| DnsRecord::from_address(question.name.clone(), ip, ttl))
                    .collect();
                Message::response_to(message, RCode::NoError).with_answers(answers)
            }
        };
        response.id = UPSTREAM_ID;
        Ok(response)
    }

    async fn lookup(
        &self,
        _ctx: &QueryContext,
        _domain: &str,
        _strategy: DomainStrategy,
    ) -> Result<Vec<IpAddr>, DomainError> {
        Err(DomainError::Unsupported {
            transport: "mock-raw".into(),
            operation: "lookup",
        })
    }
}

/// Resolve-only transport returning one fixed result for every lookup.
#[derive(Clone)]
pub struct MockLookupTransport {
    result: Arc<Mutex<Result<Vec<IpAddr>, DomainError>>>,
    lookups: Arc<Mutex<Vec<(String, DomainStrategy)>>>,
    exchanges: Arc<AtomicUsize>,
}

impl MockLookupTransport {
    pub fn new(ips: &[&str]) -> Self {
        let ips = ips.iter().map(|ip| ip.parse().unwrap()).collect();
        Self {
            result: Arc::new(Mutex::new(Ok(ips))),
            lookups: Arc::new(Mutex::new(Vec::new())),
            exchanges: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing(error: DomainError) -> Self {
        let transport = Self::new(&[]);
        transport.set_error(error);
        transport
    }

    pub fn set_error(&self, error: DomainError) {
        *self.result.lock().unwrap() = Err(error);
    }

    pub fn lookup_count(&self) -> usize {
        self.lookups.lock().unwrap().len()
    }

    pub fn last_lookup(&self) -> Option<(String, DomainStrategy)> {
        self.lookups.lock().unwrap().last().cloned()
    }

    pub fn exchange_count(&self) -> usize {
        self.exchanges.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DnsTransport for MockLookupTransport {
    fn name(&self) -> &str {
        "mock-lookup"
    }

    fn is_raw(&self) -> bool {
        false
    }

    async fn start(&self) -> Result<(), DomainError> {
        Ok(())
    }

    fn reset(&self) {}

    async fn close(&self) -> Result<(), DomainError> {
        Ok(())
    }

    async fn exchange(
        &self,
        _ctx: &QueryContext,
        _message: &Message,
    ) -> Result<Message, DomainError> {
        self.exchanges.fetch_add(1, Ordering::SeqCst);
        Err(DomainError::NoRawSupport)
    }

    async fn lookup(
        &self,
        _ctx: &QueryContext,
        domain: &str,
        strategy: DomainStrategy,
    ) -> Result<Vec<IpAddr>, DomainError> {
        self.lookups
            .lock()
            .unwrap()
            .push((domain.to_string(), strategy));
        let result = self.result.lock().unwrap().clone();
        let result = result?;
        Ok(result
            .into_iter()
            .filter(|ip| match strategy {
                DomainStrategy::UseIPv4 => ip.is_ipv4(),
                DomainStrategy::UseIPv6 => ip.is_ipv6(),
                _ => true,
            })
            .collect())
    }
}
