//! HTTP and WebSocket front end for `holdem_table`.
//!
//! The binary wires a [`holdem_table::table::TableManager`] into an axum
//! router; this library half exposes the pieces so tests can drive the
//! router without binding a socket.

pub mod api;
pub mod config;
pub mod logging;
