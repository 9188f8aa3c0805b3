mod mock_cache;
mod mock_transports;

pub use mock_cache::*;
pub use mock_transports::*;
