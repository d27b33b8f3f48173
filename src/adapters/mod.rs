// Adapters layer: concrete implementations for external systems (http, local files).

pub mod http;
pub mod storage;
