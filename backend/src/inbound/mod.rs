//! Inbound adapters translating HTTP and WebSocket traffic into domain
//! calls while keeping framework details at the edge.

pub mod http;
pub mod ws;
