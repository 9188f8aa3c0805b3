#![allow(dead_code)]

use async_trait::async_trait;
use dnsmux_application::{ports::DnsTransport, QueryContext};
use dnsmux_domain::{DnsRecord, DomainError, DomainStrategy, Message, RCode};
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Default)]
pub struct Counters {
    pub calls: AtomicUsize,
    /// Attempts that ran their full delay without being cancelled.
    pub finished: AtomicUsize,
    pub starts: AtomicUsize,
    pub resets: AtomicUsize,
    pub closes: AtomicUsize,
}

/// Transport that answers both shapes after a fixed delay with a
/// preconfigured outcome, honoring cancellation while it waits.
pub struct ScriptedTransport {
    name: String,
    raw: bool,
    delay: Duration,
    outcome: Result<Vec<IpAddr>, DomainError>,
    start_error: Option<DomainError>,
    close_error: Option<DomainError>,
    pub counters: Arc<Counters>,
    last_message: Mutex<Option<Message>>,
}

impl ScriptedTransport {
    pub fn succeeding(name: &str, raw: bool, ips: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            raw,
            delay: Duration::ZERO,
            outcome: Ok(ips.iter().map(|ip| ip.parse().unwrap()).collect()),
            start_error: None,
            close_error: None,
            counters: Arc::new(Counters::default()),
            last_message: Mutex::new(None),
        }
    }

    pub fn failing(name: &str, raw: bool, error: DomainError) -> Self {
        Self {
            outcome: Err(error),
            ..Self::succeeding(name, raw, &[])
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_start_error(mut self, error: DomainError) -> Self {
        self.start_error = Some(error);
        self
    }

    pub fn with_close_error(mut self, error: DomainError) -> Self {
        self.close_error = Some(error);
        self
    }

    pub fn calls(&self) -> usize {
        self.counters.calls.load(Ordering::SeqCst)
    }

    pub fn finished(&self) -> usize {
        self.counters.finished.load(Ordering::SeqCst)
    }

    pub fn last_message(&self) -> Option<Message> {
        self.last_message.lock().unwrap().clone()
    }

    async fn run(&self, ctx: &QueryContext) -> Result<Vec<IpAddr>, DomainError> {
        self.counters.calls.fetch_add(1, Ordering::SeqCst);
        tokio::select! {
            _ = ctx.cancelled() => Err(DomainError::Cancelled),
            _ = tokio::time::sleep(self.delay) => {
                self.counters.finished.fetch_add(1, Ordering::SeqCst);
                self.outcome.clone()
            }
        }
    }
}

#[async_trait]
impl DnsTransport for ScriptedTransport {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_raw(&self) -> bool {
        self.raw
    }

    async fn start(&self) -> Result<(), DomainError> {
        self.counters.starts.fetch_add(1, Ordering::SeqCst);
        self.start_error.clone().map_or(Ok(()), Err)
    }

    fn reset(&self) {
        self.counters.resets.fetch_add(1, Ordering::SeqCst);
    }

    async fn close(&self) -> Result<(), DomainError> {
        self.counters.closes.fetch_add(1, Ordering::SeqCst);
        self.close_error.clone().map_or(Ok(()), Err)
    }

    async fn exchange(
        &self,
        ctx: &QueryContext,
        message: &Message,
    ) -> Result<Message, DomainError> {
        *self.last_message.lock().unwrap() = Some(message.clone());
        let addresses = self.run(ctx).await?;
        let name = message.questions[0].name.clone();
        let answers = addresses
            .into_iter()
            .map(|ip| DnsRecord::from_address(name.clone(), ip, 60))
            .collect();
        Ok(Message::response_to(message, RCode::NoError).with_answers(answers))
    }

    async fn lookup(
        &self,
        ctx: &QueryContext,
        _domain: &str,
        _strategy: DomainStrategy,
    ) -> Result<Vec<IpAddr>, DomainError> {
        self.run(ctx).await
    }
}
