//! HTTP surface of the relay: a readiness probe, an outbound send
//! endpoint, and the inbound event sink. Routes stay thin; everything
//! interesting happens in `zaprelay-dispatch`.

pub mod routes;
pub mod state;

pub use {routes::router, state::GatewayState};
