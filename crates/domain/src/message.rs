use crate::{DnsRecord, DomainError, Question, RCode};
use ipnetwork::IpNetwork;
use std::net::IpAddr;

/// A DNS request or response.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Message {
    pub id: u16,

    pub is_response: bool,

    pub recursion_desired: bool,

    pub rcode: RCode,

    pub questions: Vec<Question>,

    pub answers: Vec<DnsRecord>,

    /// EDNS client-subnet prefix to announce when the message is encoded.
    pub client_subnet: Option<IpNetwork>,
}

impl Message {
    /// Recursive query carrying a single question.
    pub fn query(id: u16, question: Question) -> Self {
        Self {
            id,
            recursion_desired: true,
            questions: vec![question],
            ..Self::default()
        }
    }

    /// Empty response to `request`: same id and questions, given rcode.
    pub fn response_to(request: &Message, rcode: RCode) -> Self {
        Self {
            id: request.id,
            is_response: true,
            recursion_desired: request.recursion_desired,
            rcode,
            questions: request.questions.clone(),
            ..Self::default()
        }
    }

    /// Empty response for a single question with no request id.
    pub fn response_for(question: Question, rcode: RCode) -> Self {
        Self {
            is_response: true,
            rcode,
            questions: vec![question],
            ..Self::default()
        }
    }

    pub fn with_answers(mut self, answers: Vec<DnsRecord>) -> Self {
        self.answers = answers;
        self
    }

    /// The question, when the message carries exactly one.
    pub fn single_question(&self) -> Option<&Question> {
        match self.questions.as_slice() {
            [question] => Some(question),
            _ => None,
        }
    }

    pub fn min_ttl(&self) -> Option<u32> {
        self.answers.iter().map(|answer| answer.ttl).min()
    }

    /// Extracts A/AAAA addresses, classifying the outcome:
    /// a non-success rcode becomes `DomainError::Rcode`, and a successful
    /// answer without records becomes `DomainError::NoData`.
    pub fn to_addresses(&self) -> Result<Vec<IpAddr>, DomainError> {
        if !self.rcode.is_success() {
            return Err(DomainError::Rcode(self.rcode));
        }
        if self.answers.is_empty() {
            return Err(DomainError::NoData);
        }
        Ok(self.answers.iter().filter_map(DnsRecord::address).collect())
    }
}
