use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientConfig {
    /// Skip the result cache entirely
    #[serde(default)]
    pub disable_cache: bool,

    /// Keep cached entries until evicted, ignoring record TTLs
    #[serde(default)]
    pub disable_expire: bool,

    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            disable_cache: false,
            disable_expire: false,
            cache_capacity: default_cache_capacity(),
        }
    }
}

fn default_cache_capacity() -> usize {
    1024
}
