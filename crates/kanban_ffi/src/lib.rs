//! Flutter-facing bindings for the board store.
//!
//! Functions under `api` are synchronous and never panic; every failure is
//! reported through a response envelope.

pub mod api;
