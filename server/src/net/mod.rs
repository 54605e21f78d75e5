//! Transport layer: the TCP accept loop and per-connection I/O.

pub mod connection;
pub mod listener;
