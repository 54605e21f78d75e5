//! Hubbub — a concurrent, connection-oriented TCP chat server.
//!
//! Clients speak a newline-delimited text protocol: claim a nickname with
//! `HELLO <nick>`, then broadcast with `MSG <text>`, send direct messages
//! with `PRIV <nick> <text>`, list users with `USERS`, and leave with
//! `QUIT`. The server routes messages between sessions through a shared
//! registry; each session runs independent read and write loops so one slow
//! client never stalls the rest.

pub mod config;
pub mod engine;
pub mod error;
pub mod net;
pub mod protocol;
pub mod server;
