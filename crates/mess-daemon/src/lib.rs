//! mess-daemon library surface.
//!
//! `main.rs` stays thin; everything the scenario tests need (router
//! construction, shared state, the response envelope, bootstrap) is
//! exported here.

pub mod api_types;
pub mod bootstrap;
pub mod routes;
pub mod state;
