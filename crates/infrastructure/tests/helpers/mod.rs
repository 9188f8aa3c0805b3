mod scripted_transport;

pub use scripted_transport::*;
