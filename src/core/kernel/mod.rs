/// Transport kernel shared by the client library.
///
/// The kernel contains only transport and normalization logic, no knowledge
/// of individual backend operations:
///
/// - `RestClient`: unified HTTP client interface with typed responses
/// - `envelope`: response normalization across the two backend wire
///   conventions (bare payloads vs. `{success, message, data, timestamp}`
///   envelopes)
/// - `TokenStore`: session credential holder bridging memory and a
///   persistent cache
/// - `ws`: the realtime notification session
///
/// Everything is trait-based where a seam matters (`RestClient`,
/// `TokenCache`) so client modules stay generic and testable.
pub mod envelope;
pub mod rest;
pub mod token;
pub mod ws;

// Re-export key types for convenience
pub use rest::{ReqwestRest, RestClient, RestClientBuilder, RestClientConfig};
pub use token::{FileTokenCache, NoopTokenCache, TokenCache, TokenStore};
pub use ws::{ChannelState, RealtimeConnection};
