//! DNS message codec
//!
//! Converts between the domain `Message` and RFC 1035 wire bytes using
//! `hickory-proto`. Names in the header, question and address answers are
//! compressed by the hickory encoder. Two sections are appended by hand
//! after the hickory pass:
//! - answers whose RDATA is opaque to dnsmux, written uncompressed
//! - the EDNS0 OPT record when the message carries a client subnet

use super::client_subnet::encode_client_subnet_opt;
use super::record_type_map::RecordTypeMapper;
use dnsmux_domain::{fqdn, DnsRecord, DomainError, Message, Question, RecordData};
use hickory_proto::op::{Message as WireMessage, MessageType, OpCode, Query};
use hickory_proto::rr::rdata::{A, AAAA};
use hickory_proto::rr::{Name, RData, Record};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder, NameEncoding};
use std::str::FromStr;

const HEADER_LEN: usize = 12;
const ANCOUNT_OFFSET: usize = 6;
const ARCOUNT_OFFSET: usize = 10;

pub struct MessageCodec;

impl MessageCodec {
    pub fn encode(message: &Message) -> Result<Vec<u8>, DomainError> {
        let message_type = if message.is_response {
            MessageType::Response
        } else {
            MessageType::Query
        };

        let mut wire = WireMessage::new(message.id, message_type, OpCode::Query);
        wire.set_recursion_desired(message.recursion_desired);
        wire.set_response_code(RecordTypeMapper::rcode_to_hickory(message.rcode));

        for question in &message.questions {
            wire.add_query(Self::to_query(question)?);
        }

        let mut opaque = Vec::new();
        for answer in &message.answers {
            let rdata = match &answer.data {
                RecordData::A(v4) => RData::A(A(*v4)),
                RecordData::AAAA(v6) => RData::AAAA(AAAA(*v6)),
                RecordData::Opaque(_) => {
                    opaque.push(answer);
                    continue;
                }
            };
            wire.add_answer(Record::from_rdata(parse_name(&answer.name)?, answer.ttl, rdata));
        }

        let mut buf = Vec::with_capacity(512);
        let mut encoder = BinEncoder::new(&mut buf);
        wire.emit(&mut encoder).map_err(|e| {
            DomainError::InvalidDnsResponse(format!("Failed to serialize DNS message: {}", e))
        })?;

        for record in opaque {
            append_opaque_record(&mut buf, record)?;
            bump_count(&mut buf, ANCOUNT_OFFSET);
        }

        if let Some(subnet) = message.client_subnet {
            buf.extend_from_slice(&encode_client_subnet_opt(subnet));
            bump_count(&mut buf, ARCOUNT_OFFSET);
        }

        Ok(buf)
    }

    pub fn decode(bytes: &[u8]) -> Result<Message, DomainError> {
        let wire = WireMessage::from_vec(bytes).map_err(|e| {
            DomainError::InvalidDnsResponse(format!("Failed to parse DNS message: {}", e))
        })?;

        // A successful parse guarantees a complete header.
        let id = u16::from_be_bytes([bytes[0], bytes[1]]);
        let is_response = bytes[2] & 0x80 != 0;
        let recursion_desired = bytes[2] & 0x01 != 0;

        let questions = wire
            .queries()
            .iter()
            .map(|query| {
                Question::new(
                    fqdn(&query.name().to_utf8()),
                    RecordTypeMapper::from_hickory(query.query_type()),
                    RecordTypeMapper::class_from_hickory(query.query_class()),
                )
            })
            .collect();

        let answers = wire
            .answers()
            .iter()
            .map(Self::from_record)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Message {
            id,
            is_response,
            recursion_desired,
            rcode: RecordTypeMapper::rcode_from_hickory(wire.response_code()),
            questions,
            answers,
            client_subnet: None,
        })
    }

    fn to_query(question: &Question) -> Result<Query, DomainError> {
        let mut query = Query::new();
        query.set_name(parse_name(&question.name)?);
        query.set_query_type(RecordTypeMapper::to_hickory(question.record_type));
        query.set_query_class(RecordTypeMapper::class_to_hickory(question.class));
        Ok(query)
    }

    fn from_record(record: &Record) -> Result<DnsRecord, DomainError> {
        let data = match record.data() {
            RData::A(a) => RecordData::A(a.0),
            RData::AAAA(aaaa) => RecordData::AAAA(aaaa.0),
            other => {
                let mut rdata = Vec::new();
                let mut encoder = BinEncoder::new(&mut rdata);
                // Pointers would dangle once the RDATA is moved to another message.
                encoder.set_name_encoding(NameEncoding::Uncompressed);
                other.emit(&mut encoder).map_err(|e| {
                    DomainError::InvalidDnsResponse(format!("Failed to read record data: {}", e))
                })?;
                RecordData::Opaque(rdata.into())
            }
        };

        Ok(DnsRecord {
            name: fqdn(&record.name().to_utf8()).into(),
            record_type: RecordTypeMapper::from_hickory(record.record_type()),
            class: RecordTypeMapper::class_from_hickory(record.dns_class()),
            ttl: record.ttl(),
            data,
        })
    }
}

fn parse_name(name: &str) -> Result<Name, DomainError> {
    Name::from_str(&fqdn(name)).map_err(|e| {
        DomainError::InvalidDomainName(format!("Invalid domain '{}': {}", name, e))
    })
}

fn append_opaque_record(buf: &mut Vec<u8>, record: &DnsRecord) -> Result<(), DomainError> {
    let RecordData::Opaque(rdata) = &record.data else {
        return Ok(());
    };
    let rdata_len = u16::try_from(rdata.len()).map_err(|_| {
        DomainError::InvalidDnsResponse(format!("Record data too large for {}", record.name))
    })?;

    for label in record.name.split('.').filter(|label| !label.is_empty()) {
        let len = u8::try_from(label.len())
            .ok()
            .filter(|len| *len <= 63)
            .ok_or_else(|| DomainError::InvalidDomainName(record.name.to_string()))?;
        buf.push(len);
        buf.extend_from_slice(label.as_bytes());
    }
    buf.push(0);
    buf.extend_from_slice(&record.record_type.to_u16().to_be_bytes());
    buf.extend_from_slice(&record.class.to_u16().to_be_bytes());
    buf.extend_from_slice(&record.ttl.to_be_bytes());
    buf.extend_from_slice(&rdata_len.to_be_bytes());
    buf.extend_from_slice(rdata);
    Ok(())
}

fn bump_count(buf: &mut [u8], offset: usize) {
    debug_assert!(buf.len() >= HEADER_LEN);
    let count = u16::from_be_bytes([buf[offset], buf[offset + 1]]).saturating_add(1);
    buf[offset..offset + 2].copy_from_slice(&count.to_be_bytes());
}
