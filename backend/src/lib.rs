//! Restroom check and incident tracking backend.
//!
//! Hexagonal layout: [`domain`] holds the gating rules, services and ports;
//! [`inbound`] adapts HTTP and WebSocket traffic onto them; [`outbound`]
//! implements the ports against PostgreSQL, memory, CSV files and a mail
//! relay.

pub mod config;
pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod seed;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
