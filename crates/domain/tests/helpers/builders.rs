#![allow(dead_code)]
use dnsmux_domain::{DnsRecord, Message, Question, RCode, RecordType};
use std::net::IpAddr;

pub struct MessageBuilder {
    question: Question,
    rcode: RCode,
    answers: Vec<DnsRecord>,
}

impl MessageBuilder {
    pub fn new(domain: &str, record_type: RecordType) -> Self {
        Self {
            question: Question::internet(domain, record_type),
            rcode: RCode::NoError,
            answers: Vec::new(),
        }
    }

    pub fn rcode(mut self, rcode: RCode) -> Self {
        self.rcode = rcode;
        self
    }

    pub fn answer(mut self, ip: &str, ttl: u32) -> Self {
        let address: IpAddr = ip.parse().unwrap();
        self.answers.push(DnsRecord::from_address(
            self.question.name.clone(),
            address,
            ttl,
        ));
        self
    }

    pub fn build(self) -> Message {
        Message::response_for(self.question, self.rcode).with_answers(self.answers)
    }
}
