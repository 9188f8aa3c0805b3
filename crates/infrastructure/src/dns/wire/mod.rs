mod client_subnet;
mod message_codec;
mod record_type_map;

pub use client_subnet::encode_client_subnet_opt;
pub use message_codec::MessageCodec;
pub use record_type_map::RecordTypeMapper;
