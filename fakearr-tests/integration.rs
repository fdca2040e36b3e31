//! Integration tests for Fakearr
//!
//! Drive the full router the way a download client or indexer manager would,
//! and check synthesized files with registry decoders (`serde_bencode`,
//! `roxmltree`) that share no code with the writers.

#[path = "integration/decoders.rs"]
mod decoders;
#[path = "integration/http_endpoints.rs"]
mod http_endpoints;
#[path = "integration/live_server.rs"]
mod live_server;
#[path = "integration/newznab_flow.rs"]
mod newznab_flow;
#[path = "integration/synthesis_properties.rs"]
mod synthesis_properties;
