//! Mapping between dnsmux domain types and their `hickory_proto` counterparts.

use dnsmux_domain::{DnsClass, RCode, RecordType};
use hickory_proto::op::ResponseCode;
use hickory_proto::rr::{DNSClass, RecordType as HickoryRecordType};

pub struct RecordTypeMapper;

impl RecordTypeMapper {
    /// Total in both directions: unknown codes travel as their numeric value.
    pub fn to_hickory(record_type: RecordType) -> HickoryRecordType {
        HickoryRecordType::from(record_type.to_u16())
    }

    pub fn from_hickory(hickory_type: HickoryRecordType) -> RecordType {
        RecordType::from_u16(u16::from(hickory_type))
    }

    pub fn class_to_hickory(class: DnsClass) -> DNSClass {
        DNSClass::from(class.to_u16())
    }

    pub fn class_from_hickory(class: DNSClass) -> DnsClass {
        DnsClass::from_u16(u16::from(class))
    }

    pub fn rcode_to_hickory(rcode: RCode) -> ResponseCode {
        rcode.to_u16().into()
    }

    pub fn rcode_from_hickory(rcode: ResponseCode) -> RCode {
        RCode::from_u16(u16::from(rcode))
    }
}
